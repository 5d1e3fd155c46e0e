//! Fuzz test for mnemonic parsing
//!
//! Ensures mnemonic parser handles arbitrary input gracefully

#![no_main]

use emoney_core::KeyManager;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Should never panic, only return Err for invalid input
        let _ = KeyManager::from_mnemonic(s, "fuzz");

        if let Some((mnemonic, path)) = s.split_once('|') {
            let _ = KeyManager::from_mnemonic_with_path(mnemonic, "fuzz", path);
        }
    }
});
