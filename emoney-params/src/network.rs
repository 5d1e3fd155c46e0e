//! e-Money network definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    Error, BECH32_PREFIX, COIN_TYPE, DEFAULT_FEE_AMOUNT, DEFAULT_GAS_LIMIT, DEFAULT_MEMO,
    FEE_DENOM,
};

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Mainnet
    Mainnet,
    /// Public testnet
    Testnet,
    /// Single-node local chain (development)
    #[default]
    Localnet,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(NetworkType::Mainnet),
            "testnet" | "test" => Ok(NetworkType::Testnet),
            "localnet" | "local" => Ok(NetworkType::Localnet),
            other => Err(Error::InvalidNetwork(other.to_string())),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone)]
pub struct Network {
    /// Network type
    pub network_type: NetworkType,
    /// Human-readable name
    pub name: &'static str,
    /// Chain id, when pinned. `None` means it is read from the node.
    pub chain_id: Option<&'static str>,
    /// Bech32 account prefix
    pub bech32_prefix: &'static str,
    /// Coin type (BIP-44)
    pub coin_type: u32,
    /// Native fee token
    pub fee_denom: &'static str,
    /// Default fee amount in `fee_denom`
    pub default_fee_amount: u128,
    /// Default gas limit
    pub default_gas_limit: u64,
    /// Default memo
    pub default_memo: &'static str,
}

impl Network {
    /// Get mainnet parameters
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            name: "mainnet",
            chain_id: Some("emoney-3"),
            bech32_prefix: BECH32_PREFIX,
            coin_type: COIN_TYPE,
            fee_denom: FEE_DENOM,
            default_fee_amount: DEFAULT_FEE_AMOUNT,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            default_memo: DEFAULT_MEMO,
        }
    }

    /// Get testnet parameters
    ///
    /// Testnets are relaunched under new chain ids, so the id is
    /// always read from the node.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            name: "testnet",
            chain_id: None,
            bech32_prefix: BECH32_PREFIX,
            coin_type: COIN_TYPE,
            fee_denom: FEE_DENOM,
            default_fee_amount: DEFAULT_FEE_AMOUNT,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            default_memo: DEFAULT_MEMO,
        }
    }

    /// Get localnet parameters
    pub const fn localnet() -> Self {
        Self {
            network_type: NetworkType::Localnet,
            name: "localnet",
            chain_id: Some("localnet_reuse"),
            bech32_prefix: BECH32_PREFIX,
            coin_type: COIN_TYPE,
            fee_denom: FEE_DENOM,
            default_fee_amount: DEFAULT_FEE_AMOUNT,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            default_memo: DEFAULT_MEMO,
        }
    }

    /// Get network by type
    pub const fn from_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Localnet => Self::localnet(),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::localnet()
    }
}
