//! Read-only lookups
//!
//! Idempotent by construction; nothing here retries beyond what the
//! transport does.

use std::sync::Arc;

use emoney_core::swap::SWAP_ID_LENGTH;
use emoney_core::{validate_denom, AccAddress, Coin};

use crate::transport::{ChainQuery, ChainStatus, Transport};
use crate::types::{AccountInfo, AtomicSwap};
use crate::Result;

/// Typed queries against one transport
pub struct QueryFacade<Q: ?Sized = dyn Transport> {
    inner: Arc<Q>,
}

impl<Q: ?Sized> Clone for QueryFacade<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Q: ChainQuery + ChainStatus + ?Sized> QueryFacade<Q> {
    /// Create a facade over `inner`
    pub fn new(inner: Arc<Q>) -> Self {
        Self { inner }
    }

    /// Account number and sequence
    pub async fn get_account(&self, address: &str) -> Result<AccountInfo> {
        AccAddress::from_bech32(address)?;
        self.inner.account(address).await
    }

    /// Balance of one denomination; zero when the address holds none
    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<Coin> {
        AccAddress::from_bech32(address)?;
        validate_denom(denom)?;
        self.inner.balance(address, denom).await
    }

    /// Every non-zero balance
    pub async fn get_balances(&self, address: &str) -> Result<Vec<Coin>> {
        AccAddress::from_bech32(address)?;
        self.inner.balances(address).await
    }

    /// Atomic swap by its 32-byte id
    pub async fn get_swap_by_id(&self, swap_id: &[u8]) -> Result<AtomicSwap> {
        if swap_id.len() != SWAP_ID_LENGTH {
            return Err(emoney_core::Error::Validation(format!(
                "swap id must be {SWAP_ID_LENGTH} bytes, got {}",
                swap_id.len()
            ))
            .into());
        }
        self.inner.atomic_swap(swap_id).await
    }

    /// Chain id reported by the node
    pub async fn get_chain_id(&self) -> Result<String> {
        self.inner.chain_id().await
    }

    /// Latest block height
    pub async fn get_height(&self) -> Result<u64> {
        self.inner.latest_height().await
    }
}
