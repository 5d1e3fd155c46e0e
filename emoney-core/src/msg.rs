//! Application messages
//!
//! A message only has to expose validation and its signer to the pipeline
//! ([`Msg`]). The wire encodings live behind [`RegisteredMsg`] and are
//! reached through an explicit [`crate::MsgRegistry`].

use std::any::Any as StdAny;
use std::fmt;

use prost::Message;
use serde_json::{json, Value};

use crate::address::validate_address;
use crate::coin::{validate_coins, Coin};
use crate::proto;
use crate::swap::{RANDOM_NUMBER_HASH_LENGTH, RANDOM_NUMBER_LENGTH, SWAP_ID_LENGTH};
use crate::{Error, Result};

/// Maximum length of an address on the counterparty chain
pub const MAX_OTHER_CHAIN_ADDR_LENGTH: usize = 64;

/// Opaque application message carried by a transaction
pub trait Msg: fmt::Debug + Send + Sync + 'static {
    /// Protobuf type URL, e.g. `/cosmos.bank.v1beta1.MsgSend`
    fn type_url(&self) -> &'static str;

    /// Structural validation; never touches the network
    fn validate_basic(&self) -> Result<()>;

    /// Bech32 address that must sign this message
    fn signer(&self) -> &str;

    /// Downcast hook used by the codec registry
    fn as_any(&self) -> &dyn StdAny;
}

/// A message type with known wire encodings
pub trait RegisteredMsg: Msg + Sized {
    /// Protobuf type URL
    const TYPE_URL: &'static str;
    /// Amino JSON type name
    const AMINO_NAME: &'static str;

    /// Protobuf encoding of the message body
    fn to_proto_bytes(&self) -> Vec<u8>;

    /// Amino JSON `value` object (without the `type` wrapper)
    fn amino_value(&self) -> Value;
}

macro_rules! impl_msg {
    ($ty:ty, $signer:ident) => {
        impl Msg for $ty {
            fn type_url(&self) -> &'static str {
                <$ty as RegisteredMsg>::TYPE_URL
            }

            fn validate_basic(&self) -> Result<()> {
                self.validate()
            }

            fn signer(&self) -> &str {
                &self.$signer
            }

            fn as_any(&self) -> &dyn StdAny {
                self
            }
        }
    };
}

fn coins_amino(coins: &[Coin]) -> Value {
    Value::Array(coins.iter().map(Coin::amino_json).collect())
}

fn coins_proto(coins: &[Coin]) -> Vec<proto::Coin> {
    coins.iter().map(Coin::to_proto).collect()
}

fn check_len(field: &str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::Validation(format!(
            "{field} must be {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

fn check_other_chain(field: &str, address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(Error::Validation(format!("{field} cannot be blank")));
    }
    if address.len() > MAX_OTHER_CHAIN_ADDR_LENGTH {
        return Err(Error::Validation(format!(
            "{field} is {} characters, maximum is {MAX_OTHER_CHAIN_ADDR_LENGTH}",
            address.len()
        )));
    }
    Ok(())
}

// ============================================================================
// Bank
// ============================================================================

/// Transfer coins between two accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgSend {
    /// Sender (signer)
    pub from_address: String,
    /// Recipient
    pub to_address: String,
    /// Coins to transfer
    pub amount: Vec<Coin>,
}

impl MsgSend {
    /// Create a transfer
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Vec<Coin>) -> Self {
        Self {
            from_address: from.into(),
            to_address: to.into(),
            amount,
        }
    }

    fn validate(&self) -> Result<()> {
        validate_address("from_address", &self.from_address)?;
        validate_address("to_address", &self.to_address)?;
        validate_coins(&self.amount)
    }
}

impl RegisteredMsg for MsgSend {
    const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";
    const AMINO_NAME: &'static str = "cosmos-sdk/MsgSend";

    fn to_proto_bytes(&self) -> Vec<u8> {
        proto::MsgSend {
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            amount: coins_proto(&self.amount),
        }
        .encode_to_vec()
    }

    fn amino_value(&self) -> Value {
        json!({
            "amount": coins_amino(&self.amount),
            "from_address": self.from_address,
            "to_address": self.to_address,
        })
    }
}

impl_msg!(MsgSend, from_address);

// ============================================================================
// Atomic swaps
// ============================================================================

/// Lock coins in a hashed time-locked swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgCreateAtomicSwap {
    /// Swap creator (signer)
    pub from: String,
    /// Recipient on this chain (usually the deputy)
    pub to: String,
    /// Recipient address on the counterparty chain
    pub recipient_other_chain: String,
    /// Sender address on the counterparty chain
    pub sender_other_chain: String,
    /// `SHA256(random_number || timestamp)`
    pub random_number_hash: Vec<u8>,
    /// Unix seconds used in the hash
    pub timestamp: i64,
    /// Coins locked in the swap
    pub amount: Vec<Coin>,
    /// Lifetime of the swap in minutes
    pub time_span_min: i64,
}

impl MsgCreateAtomicSwap {
    fn validate(&self) -> Result<()> {
        validate_address("from", &self.from)?;
        validate_address("to", &self.to)?;
        check_other_chain("recipient_other_chain", &self.recipient_other_chain)?;
        check_other_chain("sender_other_chain", &self.sender_other_chain)?;
        check_len(
            "random_number_hash",
            &self.random_number_hash,
            RANDOM_NUMBER_HASH_LENGTH,
        )?;
        if self.timestamp <= 0 {
            return Err(Error::Validation("timestamp must be positive".to_string()));
        }
        if self.time_span_min <= 0 {
            return Err(Error::Validation("time span must be positive".to_string()));
        }
        validate_coins(&self.amount)
    }
}

impl RegisteredMsg for MsgCreateAtomicSwap {
    const TYPE_URL: &'static str = "/bep3.v1.MsgCreateAtomicSwap";
    const AMINO_NAME: &'static str = "bep3/MsgCreateAtomicSwap";

    fn to_proto_bytes(&self) -> Vec<u8> {
        proto::MsgCreateAtomicSwap {
            from: self.from.clone(),
            to: self.to.clone(),
            recipient_other_chain: self.recipient_other_chain.clone(),
            sender_other_chain: self.sender_other_chain.clone(),
            random_number_hash: self.random_number_hash.clone(),
            timestamp: self.timestamp,
            amount: coins_proto(&self.amount),
            time_span_min: self.time_span_min,
        }
        .encode_to_vec()
    }

    fn amino_value(&self) -> Value {
        json!({
            "amount": coins_amino(&self.amount),
            "from": self.from,
            "random_number_hash": hex::encode_upper(&self.random_number_hash),
            "recipient_other_chain": self.recipient_other_chain,
            "sender_other_chain": self.sender_other_chain,
            "time_span_min": self.time_span_min.to_string(),
            "timestamp": self.timestamp.to_string(),
            "to": self.to,
        })
    }
}

impl_msg!(MsgCreateAtomicSwap, from);

/// Claim an open swap by revealing its random number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgClaimAtomicSwap {
    /// Claimant (signer)
    pub from: String,
    /// Swap identifier
    pub swap_id: Vec<u8>,
    /// Secret whose hash locks the swap
    pub random_number: Vec<u8>,
}

impl MsgClaimAtomicSwap {
    fn validate(&self) -> Result<()> {
        validate_address("from", &self.from)?;
        check_len("swap_id", &self.swap_id, SWAP_ID_LENGTH)?;
        check_len("random_number", &self.random_number, RANDOM_NUMBER_LENGTH)
    }
}

impl RegisteredMsg for MsgClaimAtomicSwap {
    const TYPE_URL: &'static str = "/bep3.v1.MsgClaimAtomicSwap";
    const AMINO_NAME: &'static str = "bep3/MsgClaimAtomicSwap";

    fn to_proto_bytes(&self) -> Vec<u8> {
        proto::MsgClaimAtomicSwap {
            from: self.from.clone(),
            swap_id: self.swap_id.clone(),
            random_number: self.random_number.clone(),
        }
        .encode_to_vec()
    }

    fn amino_value(&self) -> Value {
        json!({
            "from": self.from,
            "random_number": hex::encode_upper(&self.random_number),
            "swap_id": hex::encode_upper(&self.swap_id),
        })
    }
}

impl_msg!(MsgClaimAtomicSwap, from);

/// Return the coins of an expired swap to its creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgRefundAtomicSwap {
    /// Refund requester (signer)
    pub from: String,
    /// Swap identifier
    pub swap_id: Vec<u8>,
}

impl MsgRefundAtomicSwap {
    fn validate(&self) -> Result<()> {
        validate_address("from", &self.from)?;
        check_len("swap_id", &self.swap_id, SWAP_ID_LENGTH)
    }
}

impl RegisteredMsg for MsgRefundAtomicSwap {
    const TYPE_URL: &'static str = "/bep3.v1.MsgRefundAtomicSwap";
    const AMINO_NAME: &'static str = "bep3/MsgRefundAtomicSwap";

    fn to_proto_bytes(&self) -> Vec<u8> {
        proto::MsgRefundAtomicSwap {
            from: self.from.clone(),
            swap_id: self.swap_id.clone(),
        }
        .encode_to_vec()
    }

    fn amino_value(&self) -> Value {
        json!({
            "from": self.from,
            "swap_id": hex::encode_upper(&self.swap_id),
        })
    }
}

impl_msg!(MsgRefundAtomicSwap, from);
