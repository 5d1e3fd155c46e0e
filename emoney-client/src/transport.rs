//! Node capabilities the pipeline depends on
//!
//! REST and gRPC both implement [`Transport`]; pipeline components are
//! generic over the narrower capability they need.

use async_trait::async_trait;
use emoney_core::Coin;

use crate::types::{AccountInfo, AtomicSwap, BroadcastMode, BroadcastOutcome};
use crate::Result;

/// Submits encoded transaction bytes
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Submit `tx_bytes` and wait as long as `mode` requires
    async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome>;
}

/// Reports chain identity and progress
#[async_trait]
pub trait ChainStatus: Send + Sync {
    /// Latest committed block height
    async fn latest_height(&self) -> Result<u64>;

    /// Network identifier reported by the node
    async fn chain_id(&self) -> Result<String>;
}

/// Read-only state lookups
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Account number and sequence; `NotFound` when the address never transacted
    async fn account(&self, address: &str) -> Result<AccountInfo>;

    /// Balance of a single denomination
    async fn balance(&self, address: &str, denom: &str) -> Result<Coin>;

    /// Balances of every denomination held
    async fn balances(&self, address: &str) -> Result<Vec<Coin>>;

    /// Atomic swap by 32-byte id
    async fn atomic_swap(&self, swap_id: &[u8]) -> Result<AtomicSwap>;
}

/// Full node capability: submit, status and query
pub trait Transport: TxSubmitter + ChainStatus + ChainQuery {}

impl<T: TxSubmitter + ChainStatus + ChainQuery + ?Sized> Transport for T {}
