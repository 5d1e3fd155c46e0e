//! REST gateway transport
//!
//! JSON over the node's HTTP API. The gateway renders 64-bit integers as
//! strings, so numeric fields are read with [`json_u64`]/[`json_i64`].

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use emoney_core::{Coin, SwapStatus};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::proto_types as proto;
use crate::transport::{ChainQuery, ChainStatus, TxSubmitter};
use crate::types::{AccountInfo, AtomicSwap, BroadcastMode, BroadcastOutcome, SwapDirection};
use crate::{Error, Result};

/// gRPC `NotFound` code as echoed by the gateway
const GRPC_NOT_FOUND: i64 = 5;

/// Transport over the REST gateway
#[derive(Debug, Clone)]
pub struct RestTransport {
    base_url: String,
    http: reqwest::Client,
}

impl RestTransport {
    /// Create a transport for `base_url` (e.g. `http://localhost:1317`)
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Gateway base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        read_json(response, path).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        read_json(response, path).await
    }
}

async fn read_json(response: reqwest::Response, path: &str) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    let body: Option<Value> = serde_json::from_str(&text).ok();
    let code = body.as_ref().and_then(|b| b.get("code")).and_then(json_i64);
    let message = body
        .as_ref()
        .and_then(|b| b.get("message").or_else(|| b.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string());

    if status == StatusCode::NOT_FOUND || code == Some(GRPC_NOT_FOUND) {
        let message = if message.is_empty() {
            path.to_string()
        } else {
            message
        };
        return Err(Error::NotFound(message));
    }
    match code {
        Some(code) => Err(Error::Rpc { code, message }),
        None => Err(Error::Transport(format!("HTTP {status} from {path}: {message}"))),
    }
}

#[async_trait]
impl TxSubmitter for RestTransport {
    async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
        let body = json!({
            "tx_bytes": BASE64.encode(tx_bytes),
            "mode": mode.rest_name(),
        });
        let response = self.post_json("/cosmos/tx/v1beta1/txs", &body).await?;
        parse_tx_response(&response, mode)
    }
}

#[async_trait]
impl ChainStatus for RestTransport {
    async fn latest_height(&self) -> Result<u64> {
        let block = self
            .get_json("/cosmos/base/tendermint/v1beta1/blocks/latest")
            .await?;
        parse_latest_height(&block)
    }

    async fn chain_id(&self) -> Result<String> {
        let info = self
            .get_json("/cosmos/base/tendermint/v1beta1/node_info")
            .await?;
        parse_network(&info)
    }
}

#[async_trait]
impl ChainQuery for RestTransport {
    async fn account(&self, address: &str) -> Result<AccountInfo> {
        let value = self
            .get_json(&format!("/cosmos/auth/v1beta1/accounts/{address}"))
            .await?;
        parse_account(&value)
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        let value = self
            .get_json(&format!(
                "/cosmos/bank/v1beta1/balances/{address}/by_denom?denom={denom}"
            ))
            .await?;
        parse_balance(&value, denom)
    }

    async fn balances(&self, address: &str) -> Result<Vec<Coin>> {
        let value = self
            .get_json(&format!("/cosmos/bank/v1beta1/balances/{address}"))
            .await?;
        parse_balances(&value)
    }

    async fn atomic_swap(&self, swap_id: &[u8]) -> Result<AtomicSwap> {
        let value = self
            .get_json(&format!("/bep3/swap/{}", hex::encode_upper(swap_id)))
            .await?;
        parse_swap(&value, swap_id)
    }
}

pub(crate) fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn json_string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn field_i64(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(json_i64).unwrap_or_default()
}

/// Hex first (amino `HexBytes`), then base64 (proto JSON `bytes`)
fn decode_bytes(encoded: &str) -> Result<Vec<u8>> {
    hex::decode(encoded)
        .or_else(|_| BASE64.decode(encoded))
        .map_err(|_| Error::Transport(format!("'{encoded}' is neither hex nor base64")))
}

pub(crate) fn parse_tx_response(value: &Value, mode: BroadcastMode) -> Result<BroadcastOutcome> {
    let tx = value
        .get("tx_response")
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::Transport("broadcast response has no tx_response".to_string()))?;

    let code = match tx.get("code").and_then(json_u64) {
        Some(code) => u32::try_from(code)
            .map_err(|_| Error::Transport(format!("result code {code} out of range")))?,
        None => 0,
    };

    let response = proto::TxResponse {
        height: field_i64(tx, "height"),
        txhash: json_string(tx, "txhash"),
        codespace: json_string(tx, "codespace"),
        code,
        data: json_string(tx, "data"),
        raw_log: json_string(tx, "raw_log"),
        info: json_string(tx, "info"),
        gas_wanted: field_i64(tx, "gas_wanted"),
        gas_used: field_i64(tx, "gas_used"),
        timestamp: json_string(tx, "timestamp"),
    };
    Ok(BroadcastOutcome::from_tx_response(response, mode))
}

fn base_account(account: &Value) -> Option<&Value> {
    if account.get("account_number").is_some() {
        return Some(account);
    }
    if let Some(base) = account.get("base_account") {
        return Some(base);
    }
    account
        .get("base_vesting_account")
        .and_then(|v| v.get("base_account"))
}

pub(crate) fn parse_account(value: &Value) -> Result<AccountInfo> {
    let account = value
        .get("account")
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::NotFound("account".to_string()))?;
    let base = base_account(account).ok_or_else(|| {
        Error::Transport(format!(
            "unsupported account type {}",
            json_string(account, "@type")
        ))
    })?;

    let pub_key = match base
        .get("pub_key")
        .and_then(|k| k.get("key"))
        .and_then(Value::as_str)
    {
        Some(key) => Some(
            BASE64
                .decode(key)
                .map_err(|e| Error::Transport(format!("invalid pub_key: {e}")))?,
        ),
        None => None,
    };

    Ok(AccountInfo {
        address: json_string(base, "address"),
        account_number: base
            .get("account_number")
            .and_then(json_u64)
            .unwrap_or_default(),
        sequence: base.get("sequence").and_then(json_u64).unwrap_or_default(),
        pub_key,
    })
}

pub(crate) fn parse_balance(value: &Value, denom: &str) -> Result<Coin> {
    match value.get("balance").filter(|v| !v.is_null()) {
        Some(balance) => Ok(serde_json::from_value(balance.clone())?),
        None => Ok(Coin {
            denom: denom.to_string(),
            amount: 0,
        }),
    }
}

pub(crate) fn parse_balances(value: &Value) -> Result<Vec<Coin>> {
    match value.get("balances") {
        Some(balances) if !balances.is_null() => Ok(serde_json::from_value(balances.clone())?),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn parse_latest_height(value: &Value) -> Result<u64> {
    value
        .pointer("/block/header/height")
        .and_then(json_u64)
        .ok_or_else(|| Error::Transport("latest block has no header height".to_string()))
}

pub(crate) fn parse_network(value: &Value) -> Result<String> {
    value
        .pointer("/default_node_info/network")
        .and_then(Value::as_str)
        .filter(|network| !network.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Transport("node info has no network".to_string()))
}

/// Accepts `{"height": .., "result": swap}` or a bare swap object.
pub(crate) fn parse_swap(value: &Value, swap_id: &[u8]) -> Result<AtomicSwap> {
    let swap = match value.get("result") {
        Some(result) => result,
        None => value,
    };
    if swap.is_null() || swap.as_object().map_or(true, |o| o.is_empty()) {
        return Err(Error::NotFound(format!(
            "atomic swap {}",
            hex::encode_upper(swap_id)
        )));
    }

    let amount = match swap.get("amount") {
        Some(amount) if !amount.is_null() => serde_json::from_value(amount.clone())?,
        _ => Vec::new(),
    };
    let status = match swap.get("status") {
        Some(Value::String(s)) => s.parse::<SwapStatus>()?,
        Some(Value::Number(n)) => SwapStatus::from_i32(n.as_i64().unwrap_or_default() as i32),
        _ => SwapStatus::Null,
    };
    let direction = match swap.get("direction") {
        Some(Value::String(s)) => SwapDirection::parse_lenient(s),
        Some(Value::Number(n)) => SwapDirection::from_i32(n.as_i64().unwrap_or_default() as i32),
        _ => SwapDirection::Unspecified,
    };

    Ok(AtomicSwap {
        id: swap_id.to_vec(),
        amount,
        random_number_hash: decode_bytes(&json_string(swap, "random_number_hash"))?,
        expire_timestamp: field_i64(swap, "expire_timestamp"),
        timestamp: field_i64(swap, "timestamp"),
        sender: json_string(swap, "sender"),
        recipient: json_string(swap, "recipient"),
        sender_other_chain: json_string(swap, "sender_other_chain"),
        recipient_other_chain: json_string(swap, "recipient_other_chain"),
        closed_block: field_i64(swap, "closed_block"),
        status,
        cross_chain: swap
            .get("cross_chain")
            .and_then(Value::as_bool)
            .unwrap_or_default(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxStage;

    const ALICE: &str = "emoney1lagqmceycrfpkyu7y6ayrk6jyvru5mkrezacpw";

    #[test]
    fn test_parse_tx_response_with_string_numbers() {
        let value = json!({
            "tx_response": {
                "height": "0",
                "txhash": "9F86D081884C7D659A2FEAA0C55AD015A3BF4F1B2B0B822CD15D6C15B0F00A08",
                "codespace": "sdk",
                "code": 32,
                "raw_log": "account sequence mismatch, expected 4, got 3",
                "gas_wanted": "100000",
                "gas_used": "0"
            }
        });
        let outcome = parse_tx_response(&value, BroadcastMode::Commit).unwrap();
        assert_eq!(outcome.code, 32);
        assert_eq!(outcome.failed_stage, Some(TxStage::CheckTx));
        assert_eq!(outcome.gas_wanted, 100_000);
        assert!(outcome.raw_log.contains("sequence mismatch"));
    }

    #[test]
    fn test_parse_tx_response_requires_body() {
        assert!(matches!(
            parse_tx_response(&json!({}), BroadcastMode::Sync),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn test_parse_tx_response_rejects_out_of_range_code() {
        let response = |code: Value| json!({ "tx_response": { "code": code, "txhash": "AB" } });

        let err = parse_tx_response(&response(json!("4294967296")), BroadcastMode::Sync).unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m.contains("4294967296")));

        let outcome = parse_tx_response(&response(json!(4_294_967_295u64)), BroadcastMode::Sync).unwrap();
        assert_eq!(outcome.code, u32::MAX);
        assert_eq!(outcome.failed_stage, Some(TxStage::CheckTx));
    }

    #[test]
    fn test_parse_base_account() {
        let value = json!({
            "account": {
                "@type": "/cosmos.auth.v1beta1.BaseAccount",
                "address": ALICE,
                "pub_key": {
                    "@type": "/cosmos.crypto.secp256k1.PubKey",
                    "key": "A3lr7yXvbS2GvF5ufu7AvVcbNOwEQAhJHzqBdjZmWMVb"
                },
                "account_number": "12",
                "sequence": "4"
            }
        });
        let account = parse_account(&value).unwrap();
        assert_eq!(account.address, ALICE);
        assert_eq!(account.account_number, 12);
        assert_eq!(account.sequence, 4);
        assert_eq!(account.pub_key.map(|k| k.len()), Some(33));
    }

    #[test]
    fn test_parse_nested_accounts() {
        let module = json!({
            "account": {
                "@type": "/cosmos.auth.v1beta1.ModuleAccount",
                "base_account": {"address": ALICE, "pub_key": null, "account_number": "1", "sequence": "0"},
                "name": "bep3"
            }
        });
        assert_eq!(parse_account(&module).unwrap().account_number, 1);

        let vesting = json!({
            "account": {
                "@type": "/cosmos.vesting.v1beta1.ContinuousVestingAccount",
                "base_vesting_account": {
                    "base_account": {"address": ALICE, "account_number": "9", "sequence": "2"}
                }
            }
        });
        let account = parse_account(&vesting).unwrap();
        assert_eq!((account.account_number, account.sequence), (9, 2));
        assert!(account.pub_key.is_none());
    }

    #[test]
    fn test_parse_balances() {
        let one = json!({"balance": {"denom": "ungm", "amount": "1500"}});
        assert_eq!(
            parse_balance(&one, "ungm").unwrap(),
            Coin::new(1500, "ungm").unwrap()
        );
        assert_eq!(parse_balance(&json!({}), "eeur").unwrap().amount, 0);

        let all = json!({
            "balances": [
                {"denom": "eeur", "amount": "10"},
                {"denom": "ungm", "amount": "20"}
            ],
            "pagination": {"next_key": null, "total": "2"}
        });
        let coins = parse_balances(&all).unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[1].amount, 20);
    }

    #[test]
    fn test_parse_status() {
        let block = json!({"block": {"header": {"chain_id": "localnet_reuse", "height": "57"}}});
        assert_eq!(parse_latest_height(&block).unwrap(), 57);
        let info = json!({"default_node_info": {"network": "localnet_reuse"}});
        assert_eq!(parse_network(&info).unwrap(), "localnet_reuse");
        assert!(parse_network(&json!({"default_node_info": {"network": ""}})).is_err());
    }

    #[test]
    fn test_parse_swap() {
        let id = [7u8; 32];
        let value = json!({
            "height": "100",
            "result": {
                "amount": [{"denom": "ungm", "amount": "50000"}],
                "random_number_hash": "AB".repeat(32),
                "expire_timestamp": "1700003600",
                "timestamp": "1700000000",
                "sender": ALICE,
                "recipient": ALICE,
                "sender_other_chain": "0xabc",
                "recipient_other_chain": "0xdef",
                "closed_block": "0",
                "status": "Open",
                "cross_chain": true,
                "direction": "Outgoing"
            }
        });
        let swap = parse_swap(&value, &id).unwrap();
        assert_eq!(swap.id, id.to_vec());
        assert_eq!(swap.status, SwapStatus::Open);
        assert_eq!(swap.direction, SwapDirection::Outgoing);
        assert_eq!(swap.random_number_hash, vec![0xAB; 32]);
        assert_eq!(swap.expire_timestamp, 1_700_003_600);
        assert_eq!(swap.amount, vec![Coin::new(50_000, "ungm").unwrap()]);
        assert!(swap.cross_chain);
    }

    #[test]
    fn test_parse_swap_missing_is_not_found() {
        let err = parse_swap(&json!({"height": "1", "result": null}), &[1u8; 32]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_rest_transport_trims_base_url() {
        let transport = RestTransport::new("http://node:1317/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://node:1317");
    }
}
