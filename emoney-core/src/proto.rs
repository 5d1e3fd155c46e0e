//! Cosmos-SDK protobuf wire types used by the direct signing mode
//!
//! These types mirror `cosmos.tx.v1beta1`, `cosmos.base.v1beta1`,
//! `cosmos.crypto.secp256k1`, `cosmos.bank.v1beta1` and the `bep3.v1`
//! atomic-swap messages. They are defined by hand so building does not
//! require `protoc`; only the fields the client reads or writes are present,
//! and unknown fields are skipped on decode.

#![allow(missing_docs)] // Proto fields don't need individual docs

use prost::Message;

/// `google.protobuf.Any`
#[derive(Clone, PartialEq, Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

/// `cosmos.base.v1beta1.Coin`
#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct Coin {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(string, tag = "2")]
    pub amount: String,
}

// ============================================================================
// cosmos.tx.v1beta1
// ============================================================================

/// Body of a transaction: messages, memo, timeout.
#[derive(Clone, PartialEq, Message)]
pub struct TxBody {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<Any>,
    #[prost(string, tag = "2")]
    pub memo: String,
    #[prost(uint64, tag = "3")]
    pub timeout_height: u64,
}

/// Signer infos plus fee.
#[derive(Clone, PartialEq, Message)]
pub struct AuthInfo {
    #[prost(message, repeated, tag = "1")]
    pub signer_infos: Vec<SignerInfo>,
    #[prost(message, optional, tag = "2")]
    pub fee: Option<Fee>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignerInfo {
    #[prost(message, optional, tag = "1")]
    pub public_key: Option<Any>,
    #[prost(message, optional, tag = "2")]
    pub mode_info: Option<ModeInfo>,
    #[prost(uint64, tag = "3")]
    pub sequence: u64,
}

/// Only the `single` arm of the `sum` oneof is used (no multisig).
#[derive(Clone, PartialEq, Message)]
pub struct ModeInfo {
    #[prost(message, optional, tag = "1")]
    pub single: Option<ModeInfoSingle>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ModeInfoSingle {
    /// `cosmos.tx.signing.v1beta1.SignMode`
    #[prost(int32, tag = "1")]
    pub mode: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Fee {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(uint64, tag = "2")]
    pub gas_limit: u64,
    #[prost(string, tag = "3")]
    pub payer: String,
    #[prost(string, tag = "4")]
    pub granter: String,
}

/// Canonical bytes signed in direct mode.
#[derive(Clone, PartialEq, Message)]
pub struct SignDoc {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info_bytes: Vec<u8>,
    #[prost(string, tag = "3")]
    pub chain_id: String,
    #[prost(uint64, tag = "4")]
    pub account_number: u64,
}

/// Wire encoding of a direct-mode transaction.
#[derive(Clone, PartialEq, Message)]
pub struct TxRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info_bytes: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub signatures: Vec<Vec<u8>>,
}

/// `cosmos.tx.signing.v1beta1.SignMode` values
pub mod sign_mode {
    pub const DIRECT: i32 = 1;
    pub const LEGACY_AMINO_JSON: i32 = 127;
}

// ============================================================================
// cosmos.crypto.secp256k1
// ============================================================================

pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

#[derive(Clone, PartialEq, Message)]
pub struct PubKey {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

// ============================================================================
// Application messages
// ============================================================================

/// `cosmos.bank.v1beta1.MsgSend`
#[derive(Clone, PartialEq, Message)]
pub struct MsgSend {
    #[prost(string, tag = "1")]
    pub from_address: String,
    #[prost(string, tag = "2")]
    pub to_address: String,
    #[prost(message, repeated, tag = "3")]
    pub amount: Vec<Coin>,
}

/// `bep3.v1.MsgCreateAtomicSwap`
#[derive(Clone, PartialEq, Message)]
pub struct MsgCreateAtomicSwap {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(string, tag = "2")]
    pub to: String,
    #[prost(string, tag = "3")]
    pub recipient_other_chain: String,
    #[prost(string, tag = "4")]
    pub sender_other_chain: String,
    #[prost(bytes = "vec", tag = "5")]
    pub random_number_hash: Vec<u8>,
    #[prost(int64, tag = "6")]
    pub timestamp: i64,
    #[prost(message, repeated, tag = "7")]
    pub amount: Vec<Coin>,
    #[prost(int64, tag = "8")]
    pub time_span_min: i64,
}

/// `bep3.v1.MsgClaimAtomicSwap`
#[derive(Clone, PartialEq, Message)]
pub struct MsgClaimAtomicSwap {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(bytes = "vec", tag = "2")]
    pub swap_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub random_number: Vec<u8>,
}

/// `bep3.v1.MsgRefundAtomicSwap`
#[derive(Clone, PartialEq, Message)]
pub struct MsgRefundAtomicSwap {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(bytes = "vec", tag = "2")]
    pub swap_id: Vec<u8>,
}
