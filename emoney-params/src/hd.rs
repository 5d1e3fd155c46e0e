//! HD derivation path constants and validation

use crate::{Error, Result, COIN_TYPE};

/// Default account path: first account, external chain, first index.
pub const FULL_FUNDRAISER_PATH: &str = "m/44'/118'/0'/0/0";

/// BIP-44 purpose field
pub const BIP44_PURPOSE: u32 = 44;

const HARDENED_OFFSET: u32 = 1 << 31;

/// Parsed BIP-44 path `m / purpose' / coin_type' / account' / change / index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bip44Path {
    /// Coin type (hardened)
    pub coin_type: u32,
    /// Account (hardened)
    pub account: u32,
    /// Change chain: 0 external, 1 internal
    pub change: u32,
    /// Address index
    pub index: u32,
}

/// Build a BIP-44 path for the Cosmos coin type.
///
/// Purpose, coin type and account are hardened; change and index are not.
pub fn bip44_path(account: u32, index: u32) -> String {
    format!("m/{}'/{}'/{}'/0/{}", BIP44_PURPOSE, COIN_TYPE, account, index)
}

/// Check that `path` is a five-level BIP-44 path with the expected hardening.
pub fn validate_bip44_path(path: &str) -> Result<Bip44Path> {
    let invalid = |reason: &str| Error::InvalidDerivationPath(format!("{path}: {reason}"));

    let mut parts = path.trim().split('/');
    if parts.next() != Some("m") {
        return Err(invalid("must start with 'm'"));
    }

    let mut levels = Vec::with_capacity(5);
    for part in parts {
        let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
            Some(d) => (d, true),
            None => (part, false),
        };
        let value: u32 = digits
            .parse()
            .map_err(|_| invalid(&format!("bad component '{part}'")))?;
        if value >= HARDENED_OFFSET {
            return Err(invalid(&format!("component '{part}' out of range")));
        }
        levels.push((value, hardened));
    }

    if levels.len() != 5 {
        return Err(invalid("expected 5 levels"));
    }
    if levels[0] != (BIP44_PURPOSE, true) {
        return Err(invalid("purpose must be 44'"));
    }
    if !levels[1].1 || !levels[2].1 {
        return Err(invalid("coin type and account must be hardened"));
    }
    if levels[3].1 || levels[4].1 {
        return Err(invalid("change and index must not be hardened"));
    }
    if levels[3].0 > 1 {
        return Err(invalid("change must be 0 or 1"));
    }

    Ok(Bip44Path {
        coin_type: levels[1].0,
        account: levels[2].0,
        change: levels[3].0,
        index: levels[4].0,
    })
}
