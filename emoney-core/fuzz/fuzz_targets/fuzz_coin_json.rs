//! Fuzz test for coin JSON decoding
//!
//! Node responses carry amounts as decimal strings; malformed ones must
//! error, never panic.

#![no_main]

use emoney_core::{validate_coins, Coin};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(coins) = serde_json::from_slice::<Vec<Coin>>(data) {
        let _ = validate_coins(&coins);
    }
    if let Ok(coin) = serde_json::from_slice::<Coin>(data) {
        let _ = coin.validate_positive();
    }
});
