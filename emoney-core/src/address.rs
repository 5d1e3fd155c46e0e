//! Account addresses
//!
//! An account address is the 20-byte RIPEMD160(SHA256(compressed pubkey))
//! digest, rendered as bech32 with the `emoney` prefix.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use emoney_params::BECH32_PREFIX;

use crate::{Error, Result};

/// Length of an account address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// e-Money account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccAddress([u8; ADDRESS_LENGTH]);

impl AccAddress {
    /// Wrap raw address bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a compressed secp256k1 public key
    pub fn from_public_key(compressed: &[u8; 33]) -> Self {
        let sha = Sha256::digest(compressed);
        let rip = Ripemd160::digest(sha);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&rip);
        Self(bytes)
    }

    /// Parse a bech32 address with the default `emoney` prefix
    pub fn from_bech32(address: &str) -> Result<Self> {
        Self::from_bech32_with_prefix(address, BECH32_PREFIX)
    }

    /// Parse a bech32 address, requiring the given prefix
    pub fn from_bech32_with_prefix(address: &str, prefix: &str) -> Result<Self> {
        if address.is_empty() {
            return Err(Error::InvalidAddress("address is empty".to_string()));
        }

        let (hrp, data) = bech32::decode(address)
            .map_err(|e| Error::InvalidAddress(format!("{address}: {e}")))?;

        if hrp.as_str() != prefix {
            return Err(Error::InvalidAddress(format!(
                "{address}: expected prefix '{prefix}', got '{}'",
                hrp.as_str()
            )));
        }

        let bytes: [u8; ADDRESS_LENGTH] = data.as_slice().try_into().map_err(|_| {
            Error::InvalidAddress(format!(
                "{address}: expected {ADDRESS_LENGTH} bytes, got {}",
                data.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Render as bech32 with an explicit prefix
    pub fn to_bech32(&self, prefix: &str) -> Result<String> {
        let hrp = Hrp::parse(prefix)
            .map_err(|e| Error::InvalidAddress(format!("bad prefix '{prefix}': {e}")))?;
        bech32::encode::<Bech32>(hrp, &self.0)
            .map_err(|e| Error::InvalidAddress(format!("bech32 encoding failed: {e}")))
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The default prefix is a valid HRP and the payload is 20 bytes,
        // so encoding cannot fail here.
        let hrp = Hrp::parse(BECH32_PREFIX).map_err(|_| fmt::Error)?;
        let encoded = bech32::encode::<Bech32>(hrp, &self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccAddress({self})")
    }
}

impl FromStr for AccAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl Serialize for AccAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_bech32(&s).map_err(serde::de::Error::custom)
    }
}

/// Validate a bech32 account address string, naming the field on failure.
pub fn validate_address(field: &str, address: &str) -> Result<AccAddress> {
    AccAddress::from_bech32(address)
        .map_err(|e| Error::InvalidAddress(format!("{field}: {e}")))
}
