//! Contract bindings for the reads discovery performs

use alloy::sol;

sol! {
    /// Collateral-backed bridge router.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IHypCollateral {
        /// Underlying ERC-20 held as collateral
        function wrappedToken() external view returns (address);
        /// Remote domains with an enrolled router
        function domains() external view returns (uint32[] memory);
        /// Enrolled router for a remote domain, left-padded to 32 bytes
        function routers(uint32 domain) external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20Metadata {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_erc20_selectors() {
        assert_eq!(
            IERC20Metadata::decimalsCall::SELECTOR,
            [0x31, 0x3c, 0xe5, 0x67]
        );
        assert_eq!(IERC20Metadata::symbolCall::SELECTOR, [0x95, 0xd8, 0x9b, 0x41]);
    }

    #[test]
    fn test_routers_call_encoding() {
        let call = IHypCollateral::routersCall { domain: 42161 };
        let data = call.abi_encode();
        // selector + one static word
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &IHypCollateral::routersCall::SELECTOR);
        assert_eq!(&data[32..36], &42161u32.to_be_bytes());
    }
}
