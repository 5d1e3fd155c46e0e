//! e-Money transaction client
//!
//! Resolves accounts, signs and broadcasts transactions over REST or gRPC,
//! polls for block height and wraps the read-only queries a wallet needs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::result_large_err)]

pub mod account;
pub mod broadcast;
pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod grpc;
pub mod logging;
pub mod poller;
pub mod proto_types;
pub mod query;
pub mod rest;
pub mod rpc;
pub mod transport;
pub mod types;

pub use account::AccountResolver;
pub use broadcast::{validate_tx_bytes, Broadcaster, MAX_TX_BYTES};
pub use cancel::CancelToken;
pub use client::Client;
pub use config::{ClientConfig, RetryConfig};
pub use error::{Error, Result};
pub use grpc::GrpcTransport;
pub use logging::init_logging;
pub use poller::{HeightPoller, DEFAULT_POLL_INTERVAL};
pub use query::QueryFacade;
pub use rest::RestTransport;
pub use rpc::{NodeStatus, ResultBroadcastTx, ResultBroadcastTxCommit, TendermintRpc, TxResult};
pub use transport::{ChainQuery, ChainStatus, Transport, TxSubmitter};
pub use types::{
    AccountInfo, AtomicSwap, BroadcastMode, BroadcastOutcome, SwapDirection, TransportKind,
    TxStage,
};
