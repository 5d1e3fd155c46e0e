//! Atomic swap identifiers
//!
//! Pure helpers that must agree byte-for-byte with the ledger's own
//! computation, or swap lookups by id come back empty.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::AccAddress;
use crate::{Error, Result};

/// Length of the secret random number
pub const RANDOM_NUMBER_LENGTH: usize = 32;
/// Length of `SHA256(random_number || timestamp)`
pub const RANDOM_NUMBER_HASH_LENGTH: usize = 32;
/// Length of a swap id
pub const SWAP_ID_LENGTH: usize = 32;

/// Generate a fresh 32-byte secret for a new swap
pub fn generate_secure_random_number() -> [u8; RANDOM_NUMBER_LENGTH] {
    let mut bytes = [0u8; RANDOM_NUMBER_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// `SHA256(random_number || big-endian u64 timestamp)`
///
/// The random number must be exactly 32 bytes, the length a claim reveals.
pub fn calc_random_number_hash(random_number: &[u8], timestamp: i64) -> Result<[u8; 32]> {
    if random_number.len() != RANDOM_NUMBER_LENGTH {
        return Err(Error::Validation(format!(
            "random number must be {RANDOM_NUMBER_LENGTH} bytes, got {}",
            random_number.len()
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(random_number);
    hasher.update((timestamp as u64).to_be_bytes());
    Ok(hasher.finalize().into())
}

/// `SHA256(random_number_hash || sender address bytes || lowercase(sender_other_chain))`
pub fn calc_swap_id(
    random_number_hash: &[u8],
    sender: &str,
    sender_other_chain: &str,
) -> Result<[u8; 32]> {
    if random_number_hash.len() != RANDOM_NUMBER_HASH_LENGTH {
        return Err(Error::Validation(format!(
            "random number hash must be {RANDOM_NUMBER_HASH_LENGTH} bytes, got {}",
            random_number_hash.len()
        )));
    }
    let sender = AccAddress::from_bech32(sender)?;

    let mut hasher = Sha256::new();
    hasher.update(random_number_hash);
    hasher.update(sender.as_bytes());
    hasher.update(sender_other_chain.to_lowercase().as_bytes());
    Ok(hasher.finalize().into())
}

/// Lifecycle state of an atomic swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwapStatus {
    /// Unset
    #[default]
    Null,
    /// Created and claimable
    Open,
    /// Claimed
    Completed,
    /// Past its time span; refundable
    Expired,
}

impl SwapStatus {
    /// Map the protobuf enum value
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => SwapStatus::Open,
            2 => SwapStatus::Completed,
            3 => SwapStatus::Expired,
            _ => SwapStatus::Null,
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapStatus::Null => "NULL",
            SwapStatus::Open => "Open",
            SwapStatus::Completed => "Completed",
            SwapStatus::Expired => "Expired",
        };
        f.write_str(name)
    }
}

impl FromStr for SwapStatus {
    type Err = Error;

    /// Accepts names (`"Open"`, `"SWAP_STATUS_OPEN"`) and numeric values.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized
            .strip_prefix("swap_status_")
            .unwrap_or(&normalized);
        match normalized {
            "null" | "unspecified" | "" | "0" => Ok(SwapStatus::Null),
            "open" | "1" => Ok(SwapStatus::Open),
            "completed" | "2" => Ok(SwapStatus::Completed),
            "expired" | "3" => Ok(SwapStatus::Expired),
            other => Err(Error::Validation(format!("unknown swap status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "emoney1lagqmceycrfpkyu7y6ayrk6jyvru5mkrezacpw";

    #[test]
    fn test_random_number_hash_layout() {
        let rn = [0x11u8; 32];
        let ts = 1_600_000_000i64;
        let mut expected = Sha256::new();
        expected.update(rn);
        expected.update(1_600_000_000u64.to_be_bytes());
        let expected: [u8; 32] = expected.finalize().into();
        assert_eq!(calc_random_number_hash(&rn, ts).unwrap(), expected);
    }

    #[test]
    fn test_random_number_must_be_32_bytes() {
        for len in [0usize, 4, 31, 33] {
            let err = calc_random_number_hash(&vec![0xAA; len], 5).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "length {len} accepted");
        }
        assert!(calc_random_number_hash(&[0xAA; 32], 5).is_ok());
    }

    #[test]
    fn test_swap_id_lowercases_other_chain() {
        let hash = [3u8; 32];
        let upper = calc_swap_id(&hash, ALICE, "0xABCDEF").unwrap();
        let lower = calc_swap_id(&hash, ALICE, "0xabcdef").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_swap_id_depends_on_each_input() {
        let hash = [3u8; 32];
        let base = calc_swap_id(&hash, ALICE, "0xabc").unwrap();
        assert_ne!(base, calc_swap_id(&[4u8; 32], ALICE, "0xabc").unwrap());
        assert_ne!(
            base,
            calc_swap_id(&hash, "emoney15qdefkmwswysgg4qxgqpqr35k3m49pkxeyrqj5", "0xabc").unwrap()
        );
        assert_ne!(base, calc_swap_id(&hash, ALICE, "0xabd").unwrap());
    }

    #[test]
    fn test_swap_id_input_validation() {
        assert!(calc_swap_id(&[0u8; 31], ALICE, "x").is_err());
        assert!(calc_swap_id(&[0u8; 32], "notanaddress", "x").is_err());
    }

    #[test]
    fn test_generate_secure_random_number() {
        let a = generate_secure_random_number();
        let b = generate_secure_random_number();
        assert_ne!(a, b);
    }

    #[test]
    fn test_swap_status_parse() {
        assert_eq!("Open".parse::<SwapStatus>().unwrap(), SwapStatus::Open);
        assert_eq!(
            "SWAP_STATUS_COMPLETED".parse::<SwapStatus>().unwrap(),
            SwapStatus::Completed
        );
        assert_eq!("3".parse::<SwapStatus>().unwrap(), SwapStatus::Expired);
        assert_eq!(SwapStatus::from_i32(1), SwapStatus::Open);
        assert_eq!(SwapStatus::from_i32(42), SwapStatus::Null);
        assert!("closed".parse::<SwapStatus>().is_err());
    }
}
