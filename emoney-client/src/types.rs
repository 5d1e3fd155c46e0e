//! Response and selector types shared by every transport

use std::fmt;
use std::str::FromStr;

use emoney_core::{Coin, SwapStatus};
use serde::{Deserialize, Serialize};

use crate::proto_types as proto;
use crate::{Error, Result};

/// How long a broadcast waits before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return as soon as the node has the bytes
    Async,
    /// Return after CheckTx
    #[default]
    Sync,
    /// Return after the tx is included and executed
    Commit,
}

impl BroadcastMode {
    /// `cosmos.tx.v1beta1.BroadcastMode` value (Commit is `BLOCK`)
    pub const fn grpc_value(self) -> i32 {
        match self {
            BroadcastMode::Async => proto::broadcast_mode::ASYNC,
            BroadcastMode::Sync => proto::broadcast_mode::SYNC,
            BroadcastMode::Commit => proto::broadcast_mode::BLOCK,
        }
    }

    /// JSON name used by the REST gateway
    pub const fn rest_name(self) -> &'static str {
        match self {
            BroadcastMode::Async => "BROADCAST_MODE_ASYNC",
            BroadcastMode::Sync => "BROADCAST_MODE_SYNC",
            BroadcastMode::Commit => "BROADCAST_MODE_BLOCK",
        }
    }

    /// Tendermint JSON-RPC method
    pub const fn rpc_method(self) -> &'static str {
        match self {
            BroadcastMode::Async => "broadcast_tx_async",
            BroadcastMode::Sync => "broadcast_tx_sync",
            BroadcastMode::Commit => "broadcast_tx_commit",
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastMode::Async => write!(f, "async"),
            BroadcastMode::Sync => write!(f, "sync"),
            BroadcastMode::Commit => write!(f, "commit"),
        }
    }
}

impl FromStr for BroadcastMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "async" => Ok(BroadcastMode::Async),
            "sync" => Ok(BroadcastMode::Sync),
            "commit" | "block" => Ok(BroadcastMode::Commit),
            other => Err(Error::Config(format!("unknown broadcast mode '{other}'"))),
        }
    }
}

/// Which node API carries queries and broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// JSON over the REST gateway
    #[default]
    Rest,
    /// Protobuf over gRPC
    Grpc,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Rest => write!(f, "rest"),
            TransportKind::Grpc => write!(f, "grpc"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "http" => Ok(TransportKind::Rest),
            "grpc" => Ok(TransportKind::Grpc),
            other => Err(Error::Config(format!("unknown transport '{other}'"))),
        }
    }
}

/// Processing stage that rejected a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStage {
    /// Mempool admission, before execution
    CheckTx,
    /// Block execution
    DeliverTx,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStage::CheckTx => write!(f, "CheckTx"),
            TxStage::DeliverTx => write!(f, "DeliverTx"),
        }
    }
}

/// Normalized node response to a broadcast.
///
/// A non-zero `code` is a chain-side rejection, not a transport error.
/// `hash` may be empty when the tx failed CheckTx.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    /// Result code, 0 = accepted
    pub code: u32,
    /// Module that produced a non-zero code
    pub codespace: String,
    /// Uppercase hex transaction hash
    pub hash: String,
    /// Human-readable log of the failing (or final) stage
    pub raw_log: String,
    /// Inclusion height, 0 when not (yet) included
    pub height: u64,
    /// Gas requested
    pub gas_wanted: i64,
    /// Gas consumed
    pub gas_used: i64,
    /// Stage that rejected the tx, when `code != 0`
    pub failed_stage: Option<TxStage>,
}

impl BroadcastOutcome {
    /// The chain accepted the transaction at the stage the mode waited for
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Build from a REST/gRPC `TxResponse`.
    ///
    /// For `BLOCK` mode a rejection at height 0 never reached a block, so it
    /// is attributed to CheckTx; otherwise DeliverTx.
    pub fn from_tx_response(response: proto::TxResponse, mode: BroadcastMode) -> Self {
        let height = response.height.max(0) as u64;
        Self {
            failed_stage: infer_failed_stage(response.code, height, mode),
            code: response.code,
            codespace: response.codespace,
            hash: response.txhash,
            raw_log: response.raw_log,
            height,
            gas_wanted: response.gas_wanted,
            gas_used: response.gas_used,
        }
    }
}

pub(crate) fn infer_failed_stage(code: u32, height: u64, mode: BroadcastMode) -> Option<TxStage> {
    if code == 0 {
        return None;
    }
    match mode {
        BroadcastMode::Commit if height > 0 => Some(TxStage::DeliverTx),
        _ => Some(TxStage::CheckTx),
    }
}

/// On-chain account state needed to sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Bech32 address
    pub address: String,
    /// Assigned once at account creation
    pub account_number: u64,
    /// Next nonce
    pub sequence: u64,
    /// Compressed secp256k1 key, absent until the account has signed
    pub pub_key: Option<Vec<u8>>,
}

/// Direction of a swap relative to this chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Unset
    #[default]
    Unspecified,
    /// Value coming into this chain
    Incoming,
    /// Value leaving this chain
    Outgoing,
}

impl SwapDirection {
    /// Map the protobuf enum value
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => SwapDirection::Incoming,
            2 => SwapDirection::Outgoing,
            _ => SwapDirection::Unspecified,
        }
    }

    pub(crate) fn parse_lenient(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized
            .strip_prefix("swap_direction_")
            .unwrap_or(&normalized)
        {
            "incoming" | "1" => SwapDirection::Incoming,
            "outgoing" | "2" => SwapDirection::Outgoing,
            _ => SwapDirection::Unspecified,
        }
    }
}

/// Atomic swap as stored by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicSwap {
    /// Swap id the lookup was made with
    pub id: Vec<u8>,
    /// Locked amount
    pub amount: Vec<Coin>,
    /// `SHA256(random_number || timestamp)`
    pub random_number_hash: Vec<u8>,
    /// Unix time after which the swap can be refunded
    pub expire_timestamp: i64,
    /// Creation timestamp fed into the hash
    pub timestamp: i64,
    /// Creator on this chain
    pub sender: String,
    /// Beneficiary on this chain
    pub recipient: String,
    /// Creator on the other chain
    pub sender_other_chain: String,
    /// Beneficiary on the other chain
    pub recipient_other_chain: String,
    /// Block that claimed or refunded the swap, 0 while open
    pub closed_block: i64,
    /// Lifecycle state
    pub status: SwapStatus,
    /// Whether the swap spans two chains
    pub cross_chain: bool,
    /// Direction relative to this chain
    pub direction: SwapDirection,
}

impl AtomicSwap {
    pub(crate) fn from_proto(id: &[u8], swap: proto::AtomicSwap) -> Result<Self> {
        let amount = swap
            .amount
            .iter()
            .map(Coin::from_proto)
            .collect::<emoney_core::Result<Vec<_>>>()?;
        Ok(Self {
            id: id.to_vec(),
            amount,
            random_number_hash: swap.random_number_hash,
            expire_timestamp: swap.expire_timestamp,
            timestamp: swap.timestamp,
            sender: swap.sender,
            recipient: swap.recipient,
            sender_other_chain: swap.sender_other_chain,
            recipient_other_chain: swap.recipient_other_chain,
            closed_block: swap.closed_block,
            status: SwapStatus::from_i32(swap.status),
            cross_chain: swap.cross_chain,
            direction: SwapDirection::from_i32(swap.direction),
        })
    }
}
