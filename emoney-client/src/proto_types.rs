//! Cosmos SDK gRPC proto type definitions
//!
//! Hand-written prost messages and tonic clients for the handful of query
//! and broadcast services this crate calls. Only the fields the client
//! reads are declared; prost skips the rest on decode.
//!
//! ## Services
//!
//! - `cosmos.tx.v1beta1.Service/BroadcastTx`
//! - `cosmos.auth.v1beta1.Query/Account`
//! - `cosmos.bank.v1beta1.Query/{Balance,AllBalances}`
//! - `cosmos.base.tendermint.v1beta1.Service/{GetLatestBlock,GetNodeInfo}`
//! - `bep3.v1.Query/AtomicSwap`

#![allow(missing_docs)] // Proto fields don't need individual docs

use prost::Message;

pub use emoney_core::proto::{Any, Coin};

/// `cosmos.tx.v1beta1.BroadcastMode`
pub mod broadcast_mode {
    pub const UNSPECIFIED: i32 = 0;
    pub const BLOCK: i32 = 1;
    pub const SYNC: i32 = 2;
    pub const ASYNC: i32 = 3;
}

/// Account type URLs understood by [`crate::grpc::GrpcTransport`]
pub mod account_type {
    pub const BASE_ACCOUNT: &str = "/cosmos.auth.v1beta1.BaseAccount";
    pub const MODULE_ACCOUNT: &str = "/cosmos.auth.v1beta1.ModuleAccount";
    pub const CONTINUOUS_VESTING_ACCOUNT: &str = "/cosmos.vesting.v1beta1.ContinuousVestingAccount";
    pub const DELAYED_VESTING_ACCOUNT: &str = "/cosmos.vesting.v1beta1.DelayedVestingAccount";
    pub const PERIODIC_VESTING_ACCOUNT: &str = "/cosmos.vesting.v1beta1.PeriodicVestingAccount";
}

#[derive(Clone, PartialEq, Message)]
pub struct BroadcastTxRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub tx_bytes: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub mode: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct BroadcastTxResponse {
    #[prost(message, optional, tag = "1")]
    pub tx_response: Option<TxResponse>,
}

/// `cosmos.base.abci.v1beta1.TxResponse`
#[derive(Clone, PartialEq, Message)]
pub struct TxResponse {
    #[prost(int64, tag = "1")]
    pub height: i64,
    #[prost(string, tag = "2")]
    pub txhash: String,
    #[prost(string, tag = "3")]
    pub codespace: String,
    #[prost(uint32, tag = "4")]
    pub code: u32,
    #[prost(string, tag = "5")]
    pub data: String,
    #[prost(string, tag = "6")]
    pub raw_log: String,
    #[prost(string, tag = "8")]
    pub info: String,
    #[prost(int64, tag = "9")]
    pub gas_wanted: i64,
    #[prost(int64, tag = "10")]
    pub gas_used: i64,
    #[prost(string, tag = "12")]
    pub timestamp: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAccountRequest {
    #[prost(string, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAccountResponse {
    #[prost(message, optional, tag = "1")]
    pub account: Option<Any>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BaseAccount {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(message, optional, tag = "2")]
    pub pub_key: Option<Any>,
    #[prost(uint64, tag = "3")]
    pub account_number: u64,
    #[prost(uint64, tag = "4")]
    pub sequence: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ModuleAccount {
    #[prost(message, optional, tag = "1")]
    pub base_account: Option<BaseAccount>,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct BaseVestingAccount {
    #[prost(message, optional, tag = "1")]
    pub base_account: Option<BaseAccount>,
}

/// Continuous, delayed and periodic vesting accounts share this prefix.
#[derive(Clone, PartialEq, Message)]
pub struct VestingAccount {
    #[prost(message, optional, tag = "1")]
    pub base_vesting_account: Option<BaseVestingAccount>,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryBalanceRequest {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(string, tag = "2")]
    pub denom: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryBalanceResponse {
    #[prost(message, optional, tag = "1")]
    pub balance: Option<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAllBalancesRequest {
    #[prost(string, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAllBalancesResponse {
    #[prost(message, repeated, tag = "1")]
    pub balances: Vec<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetLatestBlockRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct GetLatestBlockResponse {
    #[prost(message, optional, tag = "2")]
    pub block: Option<Block>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Block {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Header {
    #[prost(string, tag = "2")]
    pub chain_id: String,
    #[prost(int64, tag = "3")]
    pub height: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetNodeInfoRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct GetNodeInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub default_node_info: Option<DefaultNodeInfo>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DefaultNodeInfo {
    #[prost(string, tag = "4")]
    pub network: String,
    #[prost(string, tag = "5")]
    pub version: String,
    #[prost(string, tag = "7")]
    pub moniker: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAtomicSwapRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub swap_id: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryAtomicSwapResponse {
    #[prost(message, optional, tag = "1")]
    pub atomic_swap: Option<AtomicSwap>,
}

/// `bep3.v1.AtomicSwap`
#[derive(Clone, PartialEq, Message)]
pub struct AtomicSwap {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(bytes = "vec", tag = "2")]
    pub random_number_hash: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub expire_timestamp: i64,
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
    #[prost(string, tag = "5")]
    pub sender: String,
    #[prost(string, tag = "6")]
    pub recipient: String,
    #[prost(string, tag = "7")]
    pub sender_other_chain: String,
    #[prost(string, tag = "8")]
    pub recipient_other_chain: String,
    #[prost(int64, tag = "9")]
    pub closed_block: i64,
    #[prost(int32, tag = "10")]
    pub status: i32,
    #[prost(bool, tag = "11")]
    pub cross_chain: bool,
    #[prost(int32, tag = "12")]
    pub direction: i32,
}

/// Generated-style client for `cosmos.tx.v1beta1.Service`.
pub mod tx_service_client {
    #![allow(unused_variables, dead_code, clippy::wildcard_imports, clippy::let_unit_value)]

    use super::*;
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    /// Transaction service client.
    #[derive(Debug, Clone)]
    pub struct TxServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl TxServiceClient<tonic::transport::Channel> {
        /// Create a new client from a channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            let inner = tonic::client::Grpc::new(channel);
            Self { inner }
        }
    }

    impl<T> TxServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        /// Create client with a custom transport.
        pub fn with_inner(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Create client with origin URI.
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        /// Submit signed transaction bytes.
        pub async fn broadcast_tx(
            &mut self,
            request: impl tonic::IntoRequest<BroadcastTxRequest>,
        ) -> std::result::Result<tonic::Response<BroadcastTxResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/cosmos.tx.v1beta1.Service/BroadcastTx");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("cosmos.tx.v1beta1.Service", "BroadcastTx"));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Generated-style client for `cosmos.auth.v1beta1.Query`.
pub mod auth_query_client {
    #![allow(unused_variables, dead_code, clippy::wildcard_imports, clippy::let_unit_value)]

    use super::*;
    use tonic::codegen::*;

    /// Auth query client.
    #[derive(Debug, Clone)]
    pub struct AuthQueryClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl AuthQueryClient<tonic::transport::Channel> {
        /// Create a new client from a channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            let inner = tonic::client::Grpc::new(channel);
            Self { inner }
        }
    }

    impl<T> AuthQueryClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        /// Create client with a custom transport.
        pub fn with_inner(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Account by address, packed as `Any`.
        pub async fn account(
            &mut self,
            request: impl tonic::IntoRequest<QueryAccountRequest>,
        ) -> std::result::Result<tonic::Response<QueryAccountResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/cosmos.auth.v1beta1.Query/Account");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("cosmos.auth.v1beta1.Query", "Account"));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Generated-style client for `cosmos.bank.v1beta1.Query`.
pub mod bank_query_client {
    #![allow(unused_variables, dead_code, clippy::wildcard_imports, clippy::let_unit_value)]

    use super::*;
    use tonic::codegen::*;

    /// Bank query client.
    #[derive(Debug, Clone)]
    pub struct BankQueryClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl BankQueryClient<tonic::transport::Channel> {
        /// Create a new client from a channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            let inner = tonic::client::Grpc::new(channel);
            Self { inner }
        }
    }

    impl<T> BankQueryClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        /// Create client with a custom transport.
        pub fn with_inner(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Balance of one denomination.
        pub async fn balance(
            &mut self,
            request: impl tonic::IntoRequest<QueryBalanceRequest>,
        ) -> std::result::Result<tonic::Response<QueryBalanceResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/cosmos.bank.v1beta1.Query/Balance");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("cosmos.bank.v1beta1.Query", "Balance"));
            self.inner.unary(req, path, codec).await
        }

        /// Balances of every denomination.
        pub async fn all_balances(
            &mut self,
            request: impl tonic::IntoRequest<QueryAllBalancesRequest>,
        ) -> std::result::Result<tonic::Response<QueryAllBalancesResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/cosmos.bank.v1beta1.Query/AllBalances");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("cosmos.bank.v1beta1.Query", "AllBalances"));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Generated-style client for `cosmos.base.tendermint.v1beta1.Service`.
pub mod tendermint_service_client {
    #![allow(unused_variables, dead_code, clippy::wildcard_imports, clippy::let_unit_value)]

    use super::*;
    use tonic::codegen::*;

    /// Node status client.
    #[derive(Debug, Clone)]
    pub struct TendermintServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl TendermintServiceClient<tonic::transport::Channel> {
        /// Create a new client from a channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            let inner = tonic::client::Grpc::new(channel);
            Self { inner }
        }
    }

    impl<T> TendermintServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        /// Create client with a custom transport.
        pub fn with_inner(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Latest committed block.
        pub async fn get_latest_block(
            &mut self,
            request: impl tonic::IntoRequest<GetLatestBlockRequest>,
        ) -> std::result::Result<tonic::Response<GetLatestBlockResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/cosmos.base.tendermint.v1beta1.Service/GetLatestBlock",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "cosmos.base.tendermint.v1beta1.Service",
                "GetLatestBlock",
            ));
            self.inner.unary(req, path, codec).await
        }

        /// Node identity, including the network (chain id).
        pub async fn get_node_info(
            &mut self,
            request: impl tonic::IntoRequest<GetNodeInfoRequest>,
        ) -> std::result::Result<tonic::Response<GetNodeInfoResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/cosmos.base.tendermint.v1beta1.Service/GetNodeInfo",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "cosmos.base.tendermint.v1beta1.Service",
                "GetNodeInfo",
            ));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Generated-style client for `bep3.v1.Query`.
pub mod swap_query_client {
    #![allow(unused_variables, dead_code, clippy::wildcard_imports, clippy::let_unit_value)]

    use super::*;
    use tonic::codegen::*;

    /// Atomic swap query client.
    #[derive(Debug, Clone)]
    pub struct SwapQueryClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl SwapQueryClient<tonic::transport::Channel> {
        /// Create a new client from a channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            let inner = tonic::client::Grpc::new(channel);
            Self { inner }
        }
    }

    impl<T> SwapQueryClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        /// Create client with a custom transport.
        pub fn with_inner(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Atomic swap by id.
        pub async fn atomic_swap(
            &mut self,
            request: impl tonic::IntoRequest<QueryAtomicSwapRequest>,
        ) -> std::result::Result<tonic::Response<QueryAtomicSwapResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/bep3.v1.Query/AtomicSwap");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("bep3.v1.Query", "AtomicSwap"));
            self.inner.unary(req, path, codec).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_account_round_trip_through_any() {
        let account = BaseAccount {
            address: "emoney1lagqmceycrfpkyu7y6ayrk6jyvru5mkrezacpw".to_string(),
            pub_key: None,
            account_number: 7,
            sequence: 3,
        };
        let module = ModuleAccount {
            base_account: Some(account.clone()),
            name: "bep3".to_string(),
        };
        let decoded = ModuleAccount::decode(module.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.base_account, Some(account));
    }

    #[test]
    fn test_tx_response_skips_unknown_fields() {
        // field 7 (logs) and 11 (tx) are not declared
        let mut bytes = TxResponse {
            height: 5,
            txhash: "AB".to_string(),
            code: 0,
            ..Default::default()
        }
        .encode_to_vec();
        bytes.extend_from_slice(&[0x3a, 0x00]); // field 7, empty length-delimited
        let decoded = TxResponse::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.height, 5);
        assert_eq!(decoded.txhash, "AB");
    }
}
