//! Client configuration
//!
//! Defaults come from [`emoney_params`]; [`ClientConfig::from_env`] overlays
//! `EMONEY_*` environment variables.

use std::env;
use std::time::Duration;

use emoney_core::{Coin, SignMode};
use emoney_params::{Network, NetworkType};
use rand::Rng;

use crate::types::TransportKind;
use crate::{Error, Result};

/// Retry configuration for establishing connections
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_attempts: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Backoff that follows `current`, capped at `max_backoff`
    pub fn next_backoff(&self, current: Duration) -> Duration {
        std::cmp::min(
            Duration::from_millis((current.as_millis() as f64 * self.backoff_multiplier) as u64),
            self.max_backoff,
        )
    }
}

pub(crate) fn jitter_duration(duration: Duration) -> Duration {
    let millis = duration.as_millis() as u64;
    if millis == 0 {
        return duration;
    }
    let jitter = rand::thread_rng().gen_range(0.8..1.2);
    let jittered = (millis as f64 * jitter) as u64;
    Duration::from_millis(jittered.max(1))
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Network constants (prefix, fee denom, defaults)
    pub network: Network,
    /// REST gateway base URL
    pub rest_url: String,
    /// gRPC endpoint URL
    pub grpc_url: String,
    /// Tendermint RPC URL
    pub rpc_url: String,
    /// Chain id override; resolved from the node when `None`
    pub chain_id: Option<String>,
    /// Default fee attached when the caller gives none
    pub fee: Coin,
    /// Default gas limit
    pub gas_limit: u64,
    /// Memo attached to every transaction unless overridden
    pub memo: String,
    /// Signing and encoding mode
    pub sign_mode: SignMode,
    /// API used for queries and broadcasts
    pub transport: TransportKind,
    /// Height poll interval
    pub poll_interval: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect retry policy (broadcasts are never retried)
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_network(NetworkType::default())
    }
}

impl ClientConfig {
    /// Defaults for a network
    pub fn for_network(network_type: NetworkType) -> Self {
        let network = Network::from_type(network_type);
        Self {
            rest_url: emoney_params::DEFAULT_REST_URL.to_string(),
            grpc_url: emoney_params::DEFAULT_GRPC_URL.to_string(),
            rpc_url: emoney_params::DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            fee: Coin {
                denom: network.fee_denom.to_string(),
                amount: network.default_fee_amount,
            },
            gas_limit: network.default_gas_limit,
            memo: network.default_memo.to_string(),
            sign_mode: SignMode::default(),
            transport: TransportKind::default(),
            poll_interval: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            network,
        }
    }

    /// Defaults overlaid with `EMONEY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let network_type = match lookup("EMONEY_NETWORK") {
            Some(value) => value
                .parse::<NetworkType>()
                .map_err(|e| Error::Config(e.to_string()))?,
            None => NetworkType::default(),
        };
        let mut config = Self::for_network(network_type);

        if let Some(url) = lookup("EMONEY_REST_URL") {
            config.rest_url = url;
        }
        if let Some(url) = lookup("EMONEY_GRPC_URL") {
            config.grpc_url = url;
        }
        if let Some(url) = lookup("EMONEY_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(chain_id) = lookup("EMONEY_CHAIN_ID") {
            config.chain_id = Some(chain_id);
        }
        if let Some(denom) = lookup("EMONEY_FEE_DENOM") {
            if denom != config.network.fee_denom {
                return Err(Error::Config(format!(
                    "EMONEY_FEE_DENOM must be the native fee token {}, got {denom}",
                    config.network.fee_denom
                )));
            }
        }
        if let Some(amount) = lookup("EMONEY_FEE_AMOUNT") {
            config.fee.amount = parse_var("EMONEY_FEE_AMOUNT", &amount)?;
        }
        if let Some(gas) = lookup("EMONEY_GAS_LIMIT") {
            config.gas_limit = parse_var("EMONEY_GAS_LIMIT", &gas)?;
            if config.gas_limit == 0 {
                return Err(Error::Config("EMONEY_GAS_LIMIT must be positive".to_string()));
            }
        }
        if let Some(memo) = lookup("EMONEY_MEMO") {
            config.memo = memo;
        }
        if let Some(mode) = lookup("EMONEY_SIGN_MODE") {
            config.sign_mode = mode
                .parse()
                .map_err(|e: emoney_core::Error| Error::Config(e.to_string()))?;
        }
        if let Some(transport) = lookup("EMONEY_TRANSPORT") {
            config.transport = transport.parse()?;
        }

        Ok(config)
    }

    /// Pin the chain id instead of asking the node
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Set the signing and encoding mode
    pub fn with_sign_mode(mut self, mode: SignMode) -> Self {
        self.sign_mode = mode;
        self
    }

    /// Select REST or gRPC
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the default memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Replace the default fee amount and gas limit
    pub fn with_fee(mut self, amount: u128, gas_limit: u64) -> Self {
        self.fee.amount = amount;
        self.gas_limit = gas_limit;
        self
    }

    /// Set the height poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.network.network_type, NetworkType::Localnet);
        assert_eq!(config.rest_url, "http://localhost:1317");
        assert_eq!(config.fee, Coin::new(250_000, "ungm").unwrap());
        assert_eq!(config.gas_limit, 100_000);
        assert_eq!(config.memo, "ByClient");
        assert_eq!(config.sign_mode, SignMode::Direct);
        assert_eq!(config.transport, TransportKind::Rest);
        assert!(config.chain_id.is_none());
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_env_overlay() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("EMONEY_NETWORK", "mainnet"),
            ("EMONEY_GRPC_URL", "http://node:9090"),
            ("EMONEY_CHAIN_ID", "emoney-3"),
            ("EMONEY_FEE_AMOUNT", "1000"),
            ("EMONEY_GAS_LIMIT", "200000"),
            ("EMONEY_MEMO", ""),
            ("EMONEY_SIGN_MODE", "legacy"),
            ("EMONEY_TRANSPORT", "grpc"),
        ]))
        .unwrap();

        assert_eq!(config.network.network_type, NetworkType::Mainnet);
        assert_eq!(config.grpc_url, "http://node:9090");
        assert_eq!(config.chain_id.as_deref(), Some("emoney-3"));
        assert_eq!(config.fee.amount, 1000);
        assert_eq!(config.gas_limit, 200_000);
        assert_eq!(config.memo, "");
        assert_eq!(config.sign_mode, SignMode::LegacyAminoJson);
        assert_eq!(config.transport, TransportKind::Grpc);
    }

    #[test]
    fn test_env_rejects_malformed_values() {
        for vars in [
            [("EMONEY_NETWORK", "moonnet")],
            [("EMONEY_FEE_AMOUNT", "-5")],
            [("EMONEY_GAS_LIMIT", "0")],
            [("EMONEY_SIGN_MODE", "textual")],
            [("EMONEY_TRANSPORT", "udp")],
            [("EMONEY_FEE_DENOM", "eeur")],
        ] {
            let err = ClientConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{vars:?} gave {err:?}");
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig {
            max_backoff: Duration::from_millis(300),
            ..Default::default()
        };
        assert_eq!(
            retry.next_backoff(Duration::from_millis(100)),
            Duration::from_millis(200)
        );
        assert_eq!(
            retry.next_backoff(Duration::from_millis(200)),
            Duration::from_millis(300)
        );
    }

    #[test]
    fn test_jitter_stays_in_range() {
        for _ in 0..50 {
            let d = jitter_duration(Duration::from_millis(1000));
            assert!(d >= Duration::from_millis(800) && d <= Duration::from_millis(1200));
        }
        assert_eq!(jitter_duration(Duration::ZERO), Duration::ZERO);
    }
}
