//! Coins and transaction fees

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use emoney_params::Network;

use crate::proto;
use crate::{Error, Result};

/// A single denomination amount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `ungm`
    pub denom: String,
    /// Amount in base units
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    /// Create a coin, validating the denomination
    pub fn new(amount: u128, denom: impl Into<String>) -> Result<Self> {
        let coin = Self {
            denom: denom.into(),
            amount,
        };
        validate_denom(&coin.denom)?;
        Ok(coin)
    }

    /// Validate denomination and require a non-zero amount
    pub fn validate_positive(&self) -> Result<()> {
        validate_denom(&self.denom)?;
        if self.amount == 0 {
            return Err(Error::InvalidAmount(format!(
                "amount of {} must be positive",
                self.denom
            )));
        }
        Ok(())
    }

    /// Amino-JSON rendering (`amount` as string)
    pub fn amino_json(&self) -> Value {
        json!({ "amount": self.amount.to_string(), "denom": self.denom })
    }

    pub(crate) fn to_proto(&self) -> proto::Coin {
        proto::Coin {
            denom: self.denom.clone(),
            amount: self.amount.to_string(),
        }
    }

    /// Parse a protobuf coin (amount carried as a decimal string)
    pub fn from_proto(coin: &proto::Coin) -> Result<Self> {
        let amount = coin.amount.parse::<u128>().map_err(|_| {
            Error::InvalidAmount(format!("'{}' is not a valid amount", coin.amount))
        })?;
        Ok(Self {
            denom: coin.denom.clone(),
            amount,
        })
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = Error;

    /// Parse `"<amount><denom>"`, e.g. `"1000ungm"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidAmount(format!("'{s}' has no denomination")))?;
        let (amount, denom) = s.split_at(split);
        let amount = amount
            .parse::<u128>()
            .map_err(|_| Error::InvalidAmount(format!("'{s}' has no valid amount")))?;
        Coin::new(amount, denom)
    }
}

/// Check a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`
pub fn validate_denom(denom: &str) -> Result<()> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if !first_ok || !rest_ok || denom.len() < 3 || denom.len() > 128 {
        return Err(Error::InvalidAmount(format!("invalid denom: '{denom}'")));
    }
    Ok(())
}

/// Validate a non-empty list of positive coins with unique, sorted denoms
pub fn validate_coins(coins: &[Coin]) -> Result<()> {
    if coins.is_empty() {
        return Err(Error::InvalidAmount("coins must not be empty".to_string()));
    }
    for coin in coins {
        coin.validate_positive()?;
    }
    for pair in coins.windows(2) {
        if pair[0].denom >= pair[1].denom {
            return Err(Error::InvalidAmount(format!(
                "denoms must be sorted and unique: '{}' then '{}'",
                pair[0].denom, pair[1].denom
            )));
        }
    }
    Ok(())
}

/// Sort coins by denomination, merging duplicate denominations
pub fn normalize_coins(mut coins: Vec<Coin>) -> Result<Vec<Coin>> {
    coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    let mut merged: Vec<Coin> = Vec::with_capacity(coins.len());
    for coin in coins {
        match merged.last_mut() {
            Some(last) if last.denom == coin.denom => {
                last.amount = last.amount.checked_add(coin.amount).ok_or_else(|| {
                    Error::InvalidAmount(format!("amount overflow for {}", coin.denom))
                })?;
            }
            _ => merged.push(coin),
        }
    }
    Ok(merged)
}

/// Transaction fee: coins paid plus the gas limit they buy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Fee coins (zero or one entry in the native fee token)
    pub amount: Vec<Coin>,
    /// Gas limit
    pub gas_limit: u64,
}

impl Fee {
    /// Create a fee from a single coin
    pub fn new(amount: Coin, gas_limit: u64) -> Self {
        Self {
            amount: vec![amount],
            gas_limit,
        }
    }

    /// The network's default fee and gas limit
    pub fn default_for(network: &Network) -> Self {
        Self {
            amount: vec![Coin {
                denom: network.fee_denom.to_string(),
                amount: network.default_fee_amount,
            }],
            gas_limit: network.default_gas_limit,
        }
    }

    /// Validate gas and fee coins against the native fee token
    pub fn validate(&self, fee_denom: &str) -> Result<()> {
        if self.gas_limit == 0 {
            return Err(Error::Validation("gas limit must be positive".to_string()));
        }
        for coin in &self.amount {
            validate_denom(&coin.denom)?;
            if coin.denom != fee_denom {
                return Err(Error::Validation(format!(
                    "fee must be paid in {fee_denom}, got {}",
                    coin.denom
                )));
            }
        }
        if self.amount.len() > 1 {
            return Err(Error::Validation(
                "fee must contain at most one coin".to_string(),
            ));
        }
        Ok(())
    }

    /// Amino-JSON rendering used in legacy sign docs and StdTx
    pub fn amino_json(&self) -> Value {
        json!({
            "amount": self.amount.iter().map(Coin::amino_json).collect::<Vec<_>>(),
            "gas": self.gas_limit.to_string(),
        })
    }

    pub(crate) fn to_proto(&self) -> proto::Fee {
        proto::Fee {
            amount: self.amount.iter().map(Coin::to_proto).collect(),
            gas_limit: self.gas_limit,
            payer: String::new(),
            granter: String::new(),
        }
    }
}

mod amount_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
