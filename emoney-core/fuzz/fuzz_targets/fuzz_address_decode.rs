//! Fuzz test for bech32 address decoding
//!
//! Ensures address parser handles malformed input gracefully

#![no_main]

use emoney_core::AccAddress;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(address) = AccAddress::from_bech32(s) {
            // Anything accepted must re-encode to an accepted address
            let encoded = address.to_string();
            assert!(AccAddress::from_bech32(&encoded).is_ok());
        }
    }
});
