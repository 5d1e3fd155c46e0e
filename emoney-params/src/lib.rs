//! e-Money network parameters and constants
//!
//! This crate provides the chain-level constants shared by the key,
//! transaction and client layers: bech32 prefix, BIP-44 coin type,
//! native fee token, default fee/gas/memo, and per-network chain ids.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod hd;
pub mod network;

pub use hd::{bip44_path, validate_bip44_path, Bip44Path, FULL_FUNDRAISER_PATH};
pub use network::{Network, NetworkType};

/// Bech32 human-readable prefix for e-Money account addresses
pub const BECH32_PREFIX: &str = "emoney";

/// BIP-44 coin type registered for Cosmos-SDK chains
pub const COIN_TYPE: u32 = 118;

/// Native fee token denomination
pub const FEE_DENOM: &str = "ungm";

/// Fee attached to client transactions unless overridden (in `ungm`)
pub const DEFAULT_FEE_AMOUNT: u128 = 250_000;

/// Gas limit attached to client transactions unless overridden
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;

/// Memo attached to client transactions unless overridden
pub const DEFAULT_MEMO: &str = "ByClient";

/// Default REST (gRPC-gateway) endpoint of a local node
pub const DEFAULT_REST_URL: &str = "http://localhost:1317";

/// Default gRPC endpoint of a local node
pub const DEFAULT_GRPC_URL: &str = "http://127.0.0.1:9090";

/// Default Tendermint RPC endpoint of a local node
pub const DEFAULT_RPC_URL: &str = "http://localhost:26657";

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Derivation path is malformed or not a BIP-44 account path
    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
