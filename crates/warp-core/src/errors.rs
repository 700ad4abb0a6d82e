//! Error types for warp route discovery

use thiserror::Error;

use crate::ChainId;

/// Core errors shared across the workspace
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Chain transport errors. These are propagated unmodified to the caller of a
/// discovery pass.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("No RPC endpoint configured for chain {chain_id}")]
    UnknownChain { chain_id: ChainId },

    #[error("Invalid RPC URL for chain {chain_id}: {url} ({reason})")]
    InvalidRpcUrl {
        chain_id: ChainId,
        url: String,
        reason: String,
    },

    #[error("RPC call {call} on chain {chain_id} failed: {message}")]
    Rpc {
        chain_id: ChainId,
        call: &'static str,
        message: String,
    },

    #[error("RPC call {call} on chain {chain_id} timed out after {secs}s")]
    Timeout {
        chain_id: ChainId,
        call: &'static str,
        secs: u64,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

impl ChainError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownChain { .. } => "unknown_chain",
            Self::InvalidRpcUrl { .. } => "invalid_rpc_url",
            Self::Rpc { .. } => "rpc_error",
            Self::Timeout { .. } => "rpc_timeout",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownChain { .. } | Self::InvalidRpcUrl { .. } => 500,
            Self::Rpc { .. } => 502,
            Self::Timeout { .. } => 504,
        }
    }
}
