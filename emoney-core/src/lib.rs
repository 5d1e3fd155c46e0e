//! e-Money transaction core
//!
//! This crate implements the offline half of the transaction pipeline:
//! key derivation, message validation, envelope building, signing in the
//! direct and legacy amino-JSON modes, wire encoding, and atomic-swap
//! identifiers. Nothing here performs network I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod builder;
pub mod coin;
pub mod encoder;
pub mod error;
pub mod keys;
pub mod msg;
pub mod proto;
pub mod registry;
pub mod signer;
pub mod swap;

pub use address::{AccAddress, ADDRESS_LENGTH};
pub use builder::{TxBuilder, UnsignedTx, MAX_MEMO_CHARACTERS};
pub use coin::{normalize_coins, validate_coins, validate_denom, Coin, Fee};
pub use encoder::{tx_hash, TxEncoder};
pub use error::{Error, ErrorKind, Result};
pub use keys::{verify_signature, KeyManager};
pub use msg::{
    Msg, MsgClaimAtomicSwap, MsgCreateAtomicSwap, MsgRefundAtomicSwap, MsgSend, RegisteredMsg,
};
pub use registry::MsgRegistry;
pub use signer::{SignMode, SignedTx, SignerData, TxSignature, TxSigner};
pub use swap::{
    calc_random_number_hash, calc_swap_id, generate_secure_random_number, SwapStatus,
};
