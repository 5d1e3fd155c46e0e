//! Account resolution
//!
//! The sequence changes every time a transaction from the address is
//! included, so it is fetched fresh for every build and never cached.
//! Callers submitting concurrently from one address must serialize those
//! submissions themselves; two flows that resolve the same sequence will
//! see one of them rejected by the chain.

use std::sync::Arc;

use emoney_core::AccAddress;
use tracing::debug;

use crate::transport::{ChainQuery, Transport};
use crate::types::AccountInfo;
use crate::Result;

/// Resolves account number and sequence for an address
pub struct AccountResolver<Q: ?Sized = dyn Transport> {
    query: Arc<Q>,
}

impl<Q: ?Sized> Clone for AccountResolver<Q> {
    fn clone(&self) -> Self {
        Self {
            query: Arc::clone(&self.query),
        }
    }
}

impl<Q: ChainQuery + ?Sized> AccountResolver<Q> {
    /// Create a resolver over `query`
    pub fn new(query: Arc<Q>) -> Self {
        Self { query }
    }

    /// Current account number and sequence.
    ///
    /// `NotFound` when the address has never received funds.
    pub async fn resolve(&self, address: &str) -> Result<AccountInfo> {
        AccAddress::from_bech32(address)?;
        let account = self.query.account(address).await?;
        debug!(
            address,
            account_number = account.account_number,
            sequence = account.sequence,
            "Resolved account"
        );
        Ok(account)
    }
}
