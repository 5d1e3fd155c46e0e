//! Broadcaster
//!
//! Submits encoded bytes exactly once. A non-zero result code comes back as
//! a normal [`BroadcastOutcome`]; only transport failures are errors.

use std::sync::Arc;

use emoney_core::tx_hash;
use tracing::{info, warn};

use crate::transport::{Transport, TxSubmitter};
use crate::types::{BroadcastMode, BroadcastOutcome};
use crate::Result;

/// Default Tendermint `max_tx_bytes`
pub const MAX_TX_BYTES: usize = 1024 * 1024;

/// Reject bytes the node would refuse outright
pub fn validate_tx_bytes(tx_bytes: &[u8]) -> Result<()> {
    if tx_bytes.is_empty() {
        return Err(emoney_core::Error::Validation("transaction bytes are empty".to_string()).into());
    }
    if tx_bytes.len() > MAX_TX_BYTES {
        return Err(emoney_core::Error::Validation(format!(
            "transaction is {} bytes, maximum is {MAX_TX_BYTES}",
            tx_bytes.len()
        ))
        .into());
    }
    Ok(())
}

/// Submits transactions through a [`TxSubmitter`]
pub struct Broadcaster<S: ?Sized = dyn Transport> {
    submitter: Arc<S>,
}

impl<S: ?Sized> Clone for Broadcaster<S> {
    fn clone(&self) -> Self {
        Self {
            submitter: Arc::clone(&self.submitter),
        }
    }
}

impl<S: TxSubmitter + ?Sized> Broadcaster<S> {
    /// Create a broadcaster over `submitter`
    pub fn new(submitter: Arc<S>) -> Self {
        Self { submitter }
    }

    /// Submit `tx_bytes` once. No retry.
    pub async fn broadcast(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
        validate_tx_bytes(tx_bytes)?;
        let expected_hash = tx_hash(tx_bytes);
        info!(
            tx_hash = %expected_hash,
            mode = %mode,
            bytes = tx_bytes.len(),
            "Broadcasting transaction"
        );

        let outcome = self.submitter.submit(tx_bytes, mode).await?;

        if outcome.is_ok() {
            info!(
                tx_hash = %outcome.hash,
                height = outcome.height,
                gas_used = outcome.gas_used,
                "Transaction accepted"
            );
        } else {
            warn!(
                tx_hash = %outcome.hash,
                code = outcome.code,
                codespace = %outcome.codespace,
                stage = ?outcome.failed_stage,
                raw_log = %outcome.raw_log,
                "Transaction rejected by chain"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxStage;
    use crate::Error;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        submitted: Mutex<Vec<(Vec<u8>, BroadcastMode)>>,
        code: u32,
    }

    #[async_trait]
    impl TxSubmitter for Recorder {
        async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
            self.submitted.lock().push((tx_bytes.to_vec(), mode));
            Ok(BroadcastOutcome {
                code: self.code,
                hash: tx_hash(tx_bytes),
                failed_stage: (self.code != 0).then_some(TxStage::CheckTx),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_broadcast_submits_once() {
        let recorder = Arc::new(Recorder::default());
        let broadcaster = Broadcaster::new(recorder.clone());
        let outcome = broadcaster.broadcast(b"tx", BroadcastMode::Sync).await.unwrap();

        assert!(outcome.is_ok());
        assert_eq!(outcome.hash, tx_hash(b"tx"));
        assert_eq!(*recorder.submitted.lock(), vec![(b"tx".to_vec(), BroadcastMode::Sync)]);
    }

    #[tokio::test]
    async fn test_nonzero_code_is_not_an_error() {
        let recorder = Arc::new(Recorder {
            code: 32,
            ..Default::default()
        });
        let outcome = Broadcaster::new(recorder)
            .broadcast(b"tx", BroadcastMode::Commit)
            .await
            .unwrap();
        assert_eq!(outcome.code, 32);
        assert_eq!(outcome.failed_stage, Some(TxStage::CheckTx));
    }

    #[tokio::test]
    async fn test_guard_rejects_before_submit() {
        let recorder = Arc::new(Recorder::default());
        let broadcaster = Broadcaster::new(recorder.clone());

        let err = broadcaster.broadcast(&[], BroadcastMode::Async).await.unwrap_err();
        assert!(matches!(err, Error::Core(emoney_core::Error::Validation(_))));
        let oversized = vec![0u8; MAX_TX_BYTES + 1];
        assert!(broadcaster.broadcast(&oversized, BroadcastMode::Async).await.is_err());
        assert!(recorder.submitted.lock().is_empty());
    }
}
