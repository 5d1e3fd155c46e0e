//! Key derivation and management
//!
//! Implements BIP-39/BIP-32/BIP-44 HD key derivation for e-Money accounts
//! on the secp256k1 curve. The private key never leaves [`KeyManager`];
//! callers only see the public key, the address and signatures.

use std::fmt;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use rand::RngCore;
use secp256k1::{ecdsa::Signature, All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use emoney_params::{validate_bip44_path, FULL_FUNDRAISER_PATH};

use crate::address::AccAddress;
use crate::{Error, Result};

/// BIP-39 passphrase used for every derivation
const BIP39_PASSPHRASE: &str = "";

/// Length of a compact `r || s` signature
pub const SIGNATURE_LENGTH: usize = 64;

/// Signing identity derived from a mnemonic
#[derive(Clone)]
pub struct KeyManager {
    label: String,
    path: String,
    secret: Zeroizing<[u8; 32]>,
    public_key: PublicKey,
    address: AccAddress,
    secp: Secp256k1<All>,
}

impl KeyManager {
    /// Derive an identity on the default path `m/44'/118'/0'/0/0`.
    ///
    /// `label` is a human name only and does not affect derivation.
    pub fn from_mnemonic(mnemonic: &str, label: &str) -> Result<Self> {
        Self::from_mnemonic_with_path(mnemonic, label, FULL_FUNDRAISER_PATH)
    }

    /// Derive an identity on an explicit BIP-44 path
    pub fn from_mnemonic_with_path(mnemonic: &str, label: &str, path: &str) -> Result<Self> {
        validate_bip44_path(path)?;

        let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        let seed = Zeroizing::new(mnemonic.to_seed(BIP39_PASSPHRASE));

        let derivation_path: DerivationPath = path
            .replace('h', "'")
            .parse()
            .map_err(|e| Error::KeyDerivation(format!("{path}: {e}")))?;
        let xprv = XPrv::derive_from_path(&seed[..], &derivation_path)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        let secret = Zeroizing::new(xprv.to_bytes());

        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&secret[..])
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = AccAddress::from_public_key(&public_key.serialize());

        tracing::debug!(label, path, address = %address, "Derived signing identity");

        Ok(Self {
            label: label.to_string(),
            path: path.to_string(),
            secret,
            public_key,
            address,
            secp,
        })
    }

    /// Generate new random mnemonic
    ///
    /// # Arguments
    /// * `word_count` - Number of words in mnemonic (12, 18, or 24). Defaults to 24.
    pub fn generate_mnemonic(word_count: Option<u32>) -> Result<String> {
        // 12 words = 16 bytes, 18 words = 24 bytes, 24 words = 32 bytes
        let entropy_size = match word_count.unwrap_or(24) {
            12 => 16,
            18 => 24,
            _ => 32,
        };

        let mut entropy = Zeroizing::new(vec![0u8; entropy_size]);
        rand::thread_rng().fill_bytes(&mut entropy);

        let mnemonic =
            Mnemonic::from_entropy(&entropy).map_err(|e| Error::KeyDerivation(e.to_string()))?;
        Ok(mnemonic.to_string())
    }

    /// Human label of the identity
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Derivation path used
    pub fn derivation_path(&self) -> &str {
        &self.path
    }

    /// Account address
    pub fn address(&self) -> &AccAddress {
        &self.address
    }

    /// 33-byte compressed public key
    pub fn public_key(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// Sign arbitrary canonical bytes.
    ///
    /// SHA-256 digest, RFC-6979 deterministic ECDSA, 64-byte low-S `r || s`.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(payload);
        let message =
            Message::from_slice(&digest).map_err(|e| Error::Signing(e.to_string()))?;
        let secret_key =
            SecretKey::from_slice(&self.secret[..]).map_err(|e| Error::Signing(e.to_string()))?;
        let signature = self.secp.sign_ecdsa(&message, &secret_key);
        Ok(signature.serialize_compact().to_vec())
    }

    /// Verify a compact signature produced by [`KeyManager::sign`]
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.public_key(), payload, signature)
    }
}

/// Verify a compact secp256k1 signature over `SHA256(payload)`.
pub fn verify_signature(public_key: &[u8], payload: &[u8], signature: &[u8]) -> bool {
    let secp = Secp256k1::verification_only();
    let Ok(public_key) = PublicKey::from_slice(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_compact(signature) else {
        return false;
    };
    let digest = Sha256::digest(payload);
    let Ok(message) = Message::from_slice(&digest) else {
        return false;
    };
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("label", &self.label)
            .field("path", &self.path)
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}
