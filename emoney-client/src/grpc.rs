//! gRPC transport
//!
//! One long-lived [`Channel`] is created by [`GrpcTransport::connect`] and
//! cloned into a service client for every call. Clones of the transport
//! share the channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emoney_core::Coin;
use prost::Message;
use tokio::sync::Mutex;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, error, info, warn};

use crate::config::{jitter_duration, ClientConfig, RetryConfig};
use crate::proto_types::{self as proto, account_type};
use crate::transport::{ChainQuery, ChainStatus, TxSubmitter};
use crate::types::{AccountInfo, AtomicSwap, BroadcastMode, BroadcastOutcome};
use crate::{Error, Result};

use proto::auth_query_client::AuthQueryClient;
use proto::bank_query_client::BankQueryClient;
use proto::swap_query_client::SwapQueryClient;
use proto::tendermint_service_client::TendermintServiceClient;
use proto::tx_service_client::TxServiceClient;

/// Transport over the node's gRPC server
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    endpoint: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    retry: RetryConfig,
    channel: Arc<Mutex<Option<Channel>>>,
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GrpcTransport>();
};

impl GrpcTransport {
    /// Create an unconnected transport with default timeouts
    pub fn new(endpoint: impl Into<String>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            endpoint: endpoint.into(),
            connect_timeout: defaults.connect_timeout,
            request_timeout: defaults.request_timeout,
            retry: defaults.retry,
            channel: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an unconnected transport from client configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.grpc_url.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
            retry: config.retry.clone(),
            channel: Arc::new(Mutex::new(None)),
        }
    }

    /// Get current endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if a channel has been established
    pub fn is_connected(&self) -> bool {
        self.channel
            .try_lock()
            .map(|g| g.is_some())
            .unwrap_or(false)
    }

    /// Connect to the gRPC server with retry
    pub async fn connect(&self) -> Result<()> {
        let mut attempt = 0;
        let mut backoff = self.retry.initial_backoff;

        loop {
            match self.try_connect().await {
                Ok(channel) => {
                    info!("Connected to gRPC endpoint {}", self.endpoint);
                    *self.channel.lock().await = Some(channel);
                    return Ok(());
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        error!("Failed to connect after {} attempts: {}", attempt, e);
                        return Err(e);
                    }

                    warn!(
                        "Connection attempt {} failed, retrying in {:?}: {}",
                        attempt, backoff, e
                    );
                    tokio::time::sleep(jitter_duration(backoff)).await;
                    backoff = self.retry.next_backoff(backoff);
                }
            }
        }
    }

    /// Drop the shared channel
    pub async fn disconnect(&self) {
        *self.channel.lock().await = None;
        info!("Disconnected from gRPC endpoint {}", self.endpoint);
    }

    async fn try_connect(&self) -> Result<Channel> {
        debug!("Connecting to {}", self.endpoint);

        let mut endpoint = Endpoint::from_shared(self.endpoint.clone()).map_err(|e| {
            Error::Connection(format!(
                "Invalid endpoint URL format '{}': {}. Expected format: http://host:port",
                self.endpoint, e
            ))
        })?;
        endpoint = endpoint
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);

        if self.endpoint.trim_start().starts_with("https://") {
            let mut tls_config = ClientTlsConfig::new();
            if let Some(host) = extract_host(&self.endpoint) {
                debug!("Using hostname for TLS SNI: {}", host);
                tls_config = tls_config.domain_name(host);
            }
            endpoint = endpoint
                .tls_config(tls_config)
                .map_err(|e| Error::Connection(format!("TLS configuration failed: {}", e)))?;
        }

        endpoint.connect().await.map_err(|e| {
            Error::Connection(format!("Transport connection failed to {}: {}", self.endpoint, e))
        })
    }

    async fn channel(&self) -> Result<Channel> {
        let guard = self.channel.lock().await;
        Ok(guard
            .as_ref()
            .ok_or_else(|| Error::Connection("Not connected".to_string()))?
            .clone())
    }
}

fn extract_host(url: &str) -> Option<String> {
    let without_proto = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    without_proto
        .split([':', '/'])
        .next()
        .filter(|host| !host.is_empty())
        .map(|s| s.to_string())
}

fn unpack_account(any: proto::Any) -> Result<AccountInfo> {
    let base = match any.type_url.as_str() {
        account_type::BASE_ACCOUNT => Some(proto::BaseAccount::decode(any.value.as_slice())?),
        account_type::MODULE_ACCOUNT => {
            proto::ModuleAccount::decode(any.value.as_slice())?.base_account
        }
        account_type::CONTINUOUS_VESTING_ACCOUNT
        | account_type::DELAYED_VESTING_ACCOUNT
        | account_type::PERIODIC_VESTING_ACCOUNT => {
            proto::VestingAccount::decode(any.value.as_slice())?
                .base_vesting_account
                .and_then(|v| v.base_account)
        }
        other => {
            return Err(Error::Transport(format!("unsupported account type {other}")));
        }
    }
    .ok_or_else(|| Error::Transport(format!("{} has no base account", any.type_url)))?;

    let pub_key = match base.pub_key {
        Some(key) => Some(emoney_core::proto::PubKey::decode(key.value.as_slice())?.key),
        None => None,
    };

    Ok(AccountInfo {
        address: base.address,
        account_number: base.account_number,
        sequence: base.sequence,
        pub_key,
    })
}

#[async_trait]
impl TxSubmitter for GrpcTransport {
    async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
        let mut client = TxServiceClient::new(self.channel().await?);
        let request = tonic::Request::new(proto::BroadcastTxRequest {
            tx_bytes: tx_bytes.to_vec(),
            mode: mode.grpc_value(),
        });

        let response = client.broadcast_tx(request).await?.into_inner();
        let tx_response = response
            .tx_response
            .ok_or_else(|| Error::Transport("broadcast response has no tx_response".to_string()))?;
        Ok(BroadcastOutcome::from_tx_response(tx_response, mode))
    }
}

#[async_trait]
impl ChainStatus for GrpcTransport {
    async fn latest_height(&self) -> Result<u64> {
        let mut client = TendermintServiceClient::new(self.channel().await?);
        let response = client
            .get_latest_block(tonic::Request::new(proto::GetLatestBlockRequest {}))
            .await?
            .into_inner();

        let height = response
            .block
            .and_then(|b| b.header)
            .map(|h| h.height)
            .ok_or_else(|| Error::Transport("latest block has no header".to_string()))?;
        u64::try_from(height).map_err(|_| Error::Transport(format!("negative height {height}")))
    }

    async fn chain_id(&self) -> Result<String> {
        let mut client = TendermintServiceClient::new(self.channel().await?);
        let response = client
            .get_node_info(tonic::Request::new(proto::GetNodeInfoRequest {}))
            .await?
            .into_inner();

        response
            .default_node_info
            .map(|info| info.network)
            .filter(|network| !network.is_empty())
            .ok_or_else(|| Error::Transport("node info has no network".to_string()))
    }
}

#[async_trait]
impl ChainQuery for GrpcTransport {
    async fn account(&self, address: &str) -> Result<AccountInfo> {
        let mut client = AuthQueryClient::new(self.channel().await?);
        let response = client
            .account(tonic::Request::new(proto::QueryAccountRequest {
                address: address.to_string(),
            }))
            .await?
            .into_inner();

        let any = response
            .account
            .ok_or_else(|| Error::NotFound(format!("account {address}")))?;
        unpack_account(any)
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        let mut client = BankQueryClient::new(self.channel().await?);
        let response = client
            .balance(tonic::Request::new(proto::QueryBalanceRequest {
                address: address.to_string(),
                denom: denom.to_string(),
            }))
            .await?
            .into_inner();

        match response.balance {
            Some(coin) => Ok(Coin::from_proto(&coin)?),
            None => Ok(Coin {
                denom: denom.to_string(),
                amount: 0,
            }),
        }
    }

    async fn balances(&self, address: &str) -> Result<Vec<Coin>> {
        let mut client = BankQueryClient::new(self.channel().await?);
        let response = client
            .all_balances(tonic::Request::new(proto::QueryAllBalancesRequest {
                address: address.to_string(),
            }))
            .await?
            .into_inner();

        Ok(response
            .balances
            .iter()
            .map(Coin::from_proto)
            .collect::<emoney_core::Result<Vec<_>>>()?)
    }

    async fn atomic_swap(&self, swap_id: &[u8]) -> Result<AtomicSwap> {
        let mut client = SwapQueryClient::new(self.channel().await?);
        let response = client
            .atomic_swap(tonic::Request::new(proto::QueryAtomicSwapRequest {
                swap_id: swap_id.to_vec(),
            }))
            .await?
            .into_inner();

        let swap = response.atomic_swap.ok_or_else(|| {
            Error::NotFound(format!("atomic swap {}", hex::encode_upper(swap_id)))
        })?;
        AtomicSwap::from_proto(swap_id, swap)
    }
}
