//! Chain endpoint probing
//!
//! Checks that an RPC endpoint responds and reports which chain it serves.

use std::time::Duration;

use alloy::providers::{DynProvider, Provider};
use serde::{Deserialize, Serialize};
use warp_core::ChainId;

/// Result of probing one chain's RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    /// Configured chain (bridge domain) id
    pub chain_id: ChainId,

    /// Endpoint is reachable and responding
    pub is_online: bool,

    /// Latest block number reported by the endpoint
    pub block_number: Option<u64>,

    /// `eth_chainId` reported by the endpoint
    pub rpc_chain_id: Option<u64>,
}

impl ChainStatus {
    pub fn offline(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            is_online: false,
            block_number: None,
            rpc_chain_id: None,
        }
    }

    /// Whether the endpoint reports the chain id it is configured for.
    ///
    /// Bridge domain ids usually equal the EVM chain id, but not always, so a
    /// mismatch is only logged.
    pub fn chain_id_matches(&self) -> bool {
        self.rpc_chain_id == Some(u64::from(self.chain_id))
    }
}

/// Probe an endpoint. Never fails; an unreachable endpoint is reported offline.
pub async fn probe_chain(provider: &DynProvider, chain_id: ChainId, timeout: Duration) -> ChainStatus {
    let block_number = match tokio::time::timeout(timeout, provider.get_block_number()).await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            tracing::debug!(chain_id, error = %e, "chain probe failed");
            return ChainStatus::offline(chain_id);
        }
        Err(_) => {
            tracing::debug!(chain_id, "chain probe timed out");
            return ChainStatus::offline(chain_id);
        }
    };

    let rpc_chain_id = tokio::time::timeout(timeout, provider.get_chain_id())
        .await
        .ok()
        .and_then(|r| r.ok());

    let status = ChainStatus {
        chain_id,
        is_online: true,
        block_number: Some(block_number),
        rpc_chain_id,
    };

    if !status.chain_id_matches() {
        tracing::warn!(
            chain_id,
            rpc_chain_id = ?status.rpc_chain_id,
            "RPC endpoint reports a different chain id"
        );
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_status() {
        let status = ChainStatus::offline(10);
        assert!(!status.is_online);
        assert_eq!(status.block_number, None);
        assert!(!status.chain_id_matches());
    }

    #[test]
    fn test_chain_id_matches() {
        let status = ChainStatus {
            chain_id: 42161,
            is_online: true,
            block_number: Some(100),
            rpc_chain_id: Some(42161),
        };
        assert!(status.chain_id_matches());

        let other = ChainStatus {
            rpc_chain_id: Some(1),
            ..status
        };
        assert!(!other.chain_id_matches());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(ChainStatus::offline(1)).unwrap();
        assert_eq!(json["chainId"], 1);
        assert_eq!(json["isOnline"], false);
    }
}
