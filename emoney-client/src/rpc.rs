//! Tendermint JSON-RPC transport
//!
//! Talks to the node's RPC port (default `:26657`). This is the only path
//! where the commit result reports CheckTx and DeliverTx separately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::broadcast::validate_tx_bytes;
use crate::rest::{json_i64, json_u64, parse_swap};
use crate::transport::{ChainStatus, TxSubmitter};
use crate::types::{infer_failed_stage, AtomicSwap, BroadcastMode, BroadcastOutcome, TxStage};
use crate::{Error, Result};

/// ABCI query path of the swap-by-id querier
pub const SWAP_QUERY_PATH: &str = "custom/bep3/swap";

/// Result of `broadcast_tx_async` / `broadcast_tx_sync`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultBroadcastTx {
    /// CheckTx code (always 0 for async)
    #[serde(default, deserialize_with = "de::u32_lenient")]
    pub code: u32,
    /// Response data
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub data: String,
    /// CheckTx log
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub log: String,
    /// Module of a non-zero code
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub codespace: String,
    /// Transaction hash
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub hash: String,
}

impl ResultBroadcastTx {
    /// Normalize for the given mode
    pub fn into_outcome(self, mode: BroadcastMode) -> BroadcastOutcome {
        BroadcastOutcome {
            failed_stage: infer_failed_stage(self.code, 0, mode),
            code: self.code,
            codespace: self.codespace,
            hash: self.hash,
            raw_log: self.log,
            height: 0,
            gas_wanted: 0,
            gas_used: 0,
        }
    }
}

/// ABCI result of one processing stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TxResult {
    /// Result code, 0 = success
    #[serde(default, deserialize_with = "de::u32_lenient")]
    pub code: u32,
    /// Response data
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub data: String,
    /// Log output
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub log: String,
    /// Module of a non-zero code
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub codespace: String,
    /// Gas requested
    #[serde(default, deserialize_with = "de::i64_lenient")]
    pub gas_wanted: i64,
    /// Gas consumed
    #[serde(default, deserialize_with = "de::i64_lenient")]
    pub gas_used: i64,
}

/// Result of `broadcast_tx_commit`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultBroadcastTxCommit {
    /// Mempool admission result
    #[serde(default)]
    pub check_tx: TxResult,
    /// Block execution result; empty when CheckTx failed
    #[serde(default, alias = "tx_result")]
    pub deliver_tx: TxResult,
    /// Transaction hash, possibly empty on CheckTx failure
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub hash: String,
    /// Inclusion height, 0 when not included
    #[serde(default, deserialize_with = "de::u64_lenient")]
    pub height: u64,
}

impl From<ResultBroadcastTxCommit> for BroadcastOutcome {
    /// Surfaces the code and log of whichever stage failed.
    fn from(result: ResultBroadcastTxCommit) -> Self {
        if result.check_tx.code != 0 {
            return BroadcastOutcome {
                code: result.check_tx.code,
                codespace: result.check_tx.codespace,
                hash: result.hash,
                raw_log: result.check_tx.log,
                height: 0,
                gas_wanted: result.check_tx.gas_wanted,
                gas_used: result.check_tx.gas_used,
                failed_stage: Some(TxStage::CheckTx),
            };
        }

        let deliver = result.deliver_tx;
        BroadcastOutcome {
            failed_stage: (deliver.code != 0).then_some(TxStage::DeliverTx),
            code: deliver.code,
            codespace: deliver.codespace,
            hash: result.hash,
            raw_log: deliver.log,
            height: result.height,
            gas_wanted: deliver.gas_wanted,
            gas_used: deliver.gas_used,
        }
    }
}

/// Subset of the `status` result
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    /// Node identity
    pub node_info: NodeInfo,
    /// Sync progress
    pub sync_info: SyncInfo,
}

/// Node identity
#[derive(Debug, Clone, Deserialize)]
pub struct NodeInfo {
    /// Chain id
    pub network: String,
    /// Moniker
    #[serde(default)]
    pub moniker: String,
}

/// Sync progress
#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfo {
    /// Latest committed height
    #[serde(deserialize_with = "de::u64_lenient")]
    pub latest_block_height: u64,
    /// Whether the node is still catching up
    #[serde(default)]
    pub catching_up: bool,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciResponse,
}

#[derive(Deserialize)]
struct AbciResponse {
    #[serde(default, deserialize_with = "de::u32_lenient")]
    code: u32,
    #[serde(default, deserialize_with = "de::string_or_null")]
    log: String,
    #[serde(default, deserialize_with = "de::string_or_null")]
    value: String,
}

/// Client for the Tendermint JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct TendermintRpc {
    url: String,
    http: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl TendermintRpc {
    /// Create a client for `url` (e.g. `http://localhost:26657`)
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            url: url.into(),
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// RPC URL
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "Tendermint RPC call");

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed: RpcResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::Transport(format!(
                    "HTTP {status} from {method}: {}",
                    text.trim()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = parsed.error {
            let message = match error.data {
                Value::String(data) if !data.is_empty() => format!("{}: {data}", error.message),
                _ => error.message,
            };
            return Err(Error::Rpc {
                code: error.code,
                message,
            });
        }
        parsed
            .result
            .ok_or_else(|| Error::Transport(format!("{method} returned no result")))
    }

    /// Submit without waiting for CheckTx
    pub async fn broadcast_tx_async(&self, tx: &[u8]) -> Result<ResultBroadcastTx> {
        validate_tx_bytes(tx)?;
        self.call("broadcast_tx_async", json!({ "tx": BASE64.encode(tx) }))
            .await
    }

    /// Submit and wait for CheckTx
    pub async fn broadcast_tx_sync(&self, tx: &[u8]) -> Result<ResultBroadcastTx> {
        validate_tx_bytes(tx)?;
        self.call("broadcast_tx_sync", json!({ "tx": BASE64.encode(tx) }))
            .await
    }

    /// Submit and wait for the tx to be committed in a block
    pub async fn broadcast_tx_commit(&self, tx: &[u8]) -> Result<ResultBroadcastTxCommit> {
        validate_tx_bytes(tx)?;
        self.call("broadcast_tx_commit", json!({ "tx": BASE64.encode(tx) }))
            .await
    }

    /// Node identity and sync state
    pub async fn status(&self) -> Result<NodeStatus> {
        self.call("status", json!({})).await
    }

    /// Raw ABCI query; returns the response value (possibly empty)
    pub async fn abci_query(&self, path: &str, data: &[u8]) -> Result<Vec<u8>> {
        if path.trim().is_empty() {
            return Err(emoney_core::Error::Validation("ABCI query path is empty".to_string()).into());
        }

        let result: AbciQueryResult = self
            .call(
                "abci_query",
                json!({
                    "path": path,
                    "data": hex::encode(data),
                    "height": "0",
                    "prove": false,
                }),
            )
            .await?;

        let response = result.response;
        if response.code != 0 {
            if response.log.to_ascii_lowercase().contains("not found") {
                return Err(Error::NotFound(response.log));
            }
            return Err(Error::Rpc {
                code: i64::from(response.code),
                message: response.log,
            });
        }
        if response.value.is_empty() {
            return Ok(Vec::new());
        }
        BASE64
            .decode(&response.value)
            .map_err(|e| Error::Transport(format!("invalid ABCI value: {e}")))
    }

    /// Atomic swap by id through the legacy querier
    pub async fn atomic_swap(&self, swap_id: &[u8]) -> Result<AtomicSwap> {
        let params = serde_json::to_vec(&json!({ "swap_id": hex::encode_upper(swap_id) }))?;
        let value = self.abci_query(SWAP_QUERY_PATH, &params).await?;
        if value.is_empty() {
            return Err(Error::NotFound(format!(
                "atomic swap {}",
                hex::encode_upper(swap_id)
            )));
        }
        parse_swap(&serde_json::from_slice(&value)?, swap_id)
    }
}

#[async_trait]
impl TxSubmitter for TendermintRpc {
    async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
        match mode {
            BroadcastMode::Async => Ok(self.broadcast_tx_async(tx_bytes).await?.into_outcome(mode)),
            BroadcastMode::Sync => Ok(self.broadcast_tx_sync(tx_bytes).await?.into_outcome(mode)),
            BroadcastMode::Commit => Ok(self.broadcast_tx_commit(tx_bytes).await?.into()),
        }
    }
}

#[async_trait]
impl ChainStatus for TendermintRpc {
    async fn latest_height(&self) -> Result<u64> {
        Ok(self.status().await?.sync_info.latest_block_height)
    }

    async fn chain_id(&self) -> Result<String> {
        Ok(self.status().await?.node_info.network)
    }
}

mod de {
    use super::*;
    use serde::de::Error as _;

    pub fn u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(0);
        }
        json_u64(&value).ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {value}")))
    }

    pub fn u32_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
        let value = u64_lenient(deserializer)?;
        u32::try_from(value).map_err(D::Error::custom)
    }

    pub fn i64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(0);
        }
        json_i64(&value).ok_or_else(|| D::Error::custom(format!("expected integer, got {value}")))
    }

    pub fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_check_tx_failure() {
        let result: ResultBroadcastTxCommit = serde_json::from_value(json!({
            "check_tx": {
                "code": 5,
                "data": null,
                "log": "insufficient funds",
                "codespace": "sdk",
                "gas_wanted": "100000",
                "gas_used": "20000"
            },
            "deliver_tx": {"code": 0, "data": null, "log": "", "gas_wanted": "0", "gas_used": "0"},
            "hash": "",
            "height": "0"
        }))
        .unwrap();

        let outcome = BroadcastOutcome::from(result);
        assert_eq!(outcome.code, 5);
        assert_eq!(outcome.failed_stage, Some(TxStage::CheckTx));
        assert_eq!(outcome.raw_log, "insufficient funds");
        assert_eq!(outcome.codespace, "sdk");
        assert_eq!(outcome.hash, "");
        assert_eq!(outcome.height, 0);
    }

    #[test]
    fn test_commit_deliver_tx_failure() {
        let result: ResultBroadcastTxCommit = serde_json::from_value(json!({
            "check_tx": {"code": 0, "log": "[]", "gas_wanted": "100000", "gas_used": "30000"},
            "tx_result": {
                "code": 11,
                "log": "out of gas",
                "codespace": "sdk",
                "gas_wanted": "100000",
                "gas_used": "100001"
            },
            "hash": "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855",
            "height": "88"
        }))
        .unwrap();

        let outcome = BroadcastOutcome::from(result);
        assert_eq!(outcome.code, 11);
        assert_eq!(outcome.failed_stage, Some(TxStage::DeliverTx));
        assert_eq!(outcome.raw_log, "out of gas");
        assert_eq!(outcome.height, 88);
        assert_eq!(outcome.gas_used, 100_001);
        assert!(!outcome.hash.is_empty());
    }

    #[test]
    fn test_commit_success() {
        let result: ResultBroadcastTxCommit = serde_json::from_value(json!({
            "check_tx": {"code": 0},
            "deliver_tx": {"code": 0, "log": "[{\"events\":[]}]", "gas_used": 61000},
            "hash": "AB",
            "height": 12
        }))
        .unwrap();
        let outcome = BroadcastOutcome::from(result);
        assert!(outcome.is_ok());
        assert_eq!(outcome.failed_stage, None);
        assert_eq!(outcome.height, 12);
        assert_eq!(outcome.gas_used, 61_000);
    }

    #[test]
    fn test_sync_result_outcome() {
        let result: ResultBroadcastTx = serde_json::from_value(json!({
            "code": 32,
            "data": "",
            "log": "account sequence mismatch",
            "codespace": "sdk",
            "hash": "FF"
        }))
        .unwrap();
        let outcome = result.into_outcome(BroadcastMode::Sync);
        assert_eq!(outcome.failed_stage, Some(TxStage::CheckTx));
        assert_eq!(outcome.hash, "FF");
    }

    #[test]
    fn test_status_parse() {
        let status: NodeStatus = serde_json::from_value(json!({
            "node_info": {"network": "localnet_reuse", "moniker": "node0", "version": "0.34"},
            "sync_info": {"latest_block_height": "1204", "catching_up": false}
        }))
        .unwrap();
        assert_eq!(status.node_info.network, "localnet_reuse");
        assert_eq!(status.sync_info.latest_block_height, 1204);
    }

    #[tokio::test]
    async fn test_local_guards_run_before_network() {
        // Nothing listens on this port; the guards must fail first.
        let rpc = TendermintRpc::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = rpc.broadcast_tx_sync(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Core(emoney_core::Error::Validation(_))));

        let err = rpc.abci_query(" ", b"{}").await.unwrap_err();
        assert!(matches!(err, Error::Core(emoney_core::Error::Validation(_))));
    }
}
