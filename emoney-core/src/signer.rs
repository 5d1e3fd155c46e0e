//! Transaction signing
//!
//! One [`SignMode`] value selects both the canonical sign bytes and, later,
//! the wire encoding. The mode is recorded inside [`SignedTx`] so the encoder
//! cannot pair a signature with the other encoding.

use std::fmt;
use std::str::FromStr;

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::builder::UnsignedTx;
use crate::keys::KeyManager;
use crate::proto;
use crate::registry::MsgRegistry;
use crate::{Error, Result};

/// Signing and encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignMode {
    /// Protobuf `SignDoc`, encoded as `TxRaw`
    #[default]
    Direct,
    /// Sorted amino JSON `StdSignDoc`, encoded as amino JSON `StdTx`
    LegacyAminoJson,
}

impl SignMode {
    /// `cosmos.tx.signing.v1beta1.SignMode` value
    pub const fn proto_value(self) -> i32 {
        match self {
            SignMode::Direct => proto::sign_mode::DIRECT,
            SignMode::LegacyAminoJson => proto::sign_mode::LEGACY_AMINO_JSON,
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignMode::Direct => write!(f, "direct"),
            SignMode::LegacyAminoJson => write!(f, "legacy-amino-json"),
        }
    }
}

impl FromStr for SignMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "direct" | "sign-mode-direct" => Ok(SignMode::Direct),
            "legacy" | "amino" | "amino-json" | "legacy-amino-json"
            | "sign-mode-legacy-amino-json" => Ok(SignMode::LegacyAminoJson),
            other => Err(Error::Validation(format!("unknown sign mode '{other}'"))),
        }
    }
}

/// Chain-assigned data bound into the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    /// Chain id
    pub chain_id: String,
    /// Account number (immutable per account)
    pub account_number: u64,
    /// Account sequence (nonce)
    pub sequence: u64,
}

/// Signature attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSignature {
    /// 33-byte compressed public key
    pub public_key: Vec<u8>,
    /// Mode the signature was produced under
    pub mode: SignMode,
    /// 64-byte `r || s`
    pub signature: Vec<u8>,
    /// Sequence the signature commits to
    pub sequence: u64,
}

/// Envelope plus signatures, ready for encoding
#[derive(Debug)]
pub struct SignedTx {
    tx: UnsignedTx,
    mode: SignMode,
    signatures: Vec<TxSignature>,
    // Exact bytes committed to in direct mode; empty in legacy mode.
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
}

impl SignedTx {
    /// Mode the transaction was signed under
    pub fn mode(&self) -> SignMode {
        self.mode
    }

    /// Unsigned envelope
    pub fn tx(&self) -> &UnsignedTx {
        &self.tx
    }

    /// Attached signatures
    pub fn signatures(&self) -> &[TxSignature] {
        &self.signatures
    }

    pub(crate) fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub(crate) fn auth_info_bytes(&self) -> &[u8] {
        &self.auth_info_bytes
    }
}

struct SignPayload {
    sign_bytes: Vec<u8>,
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
}

/// Computes sign bytes and attaches signatures
#[derive(Debug, Clone, Copy)]
pub struct TxSigner<'r> {
    registry: &'r MsgRegistry,
}

impl<'r> TxSigner<'r> {
    /// Create a signer using the given codec registry
    pub fn new(registry: &'r MsgRegistry) -> Self {
        Self { registry }
    }

    /// Sign an envelope for one signer.
    ///
    /// Fails with a signing error when no identity is supplied or the
    /// identity does not own the messages.
    pub fn sign(
        &self,
        tx: UnsignedTx,
        identity: Option<&KeyManager>,
        signer_data: &SignerData,
        mode: SignMode,
    ) -> Result<SignedTx> {
        let identity = identity.ok_or_else(Error::missing_keys)?;

        let address = identity.address().to_string();
        if tx.signer() != address {
            return Err(Error::Signing(format!(
                "messages must be signed by {}, identity is {address}",
                tx.signer()
            )));
        }

        let public_key = identity.public_key();
        let payload = self.payload(&tx, &public_key, signer_data, mode)?;
        let signature = identity.sign(&payload.sign_bytes)?;

        tracing::debug!(
            address = %address,
            mode = %mode,
            account_number = signer_data.account_number,
            sequence = signer_data.sequence,
            sign_bytes_len = payload.sign_bytes.len(),
            "Signed transaction"
        );

        Ok(SignedTx {
            tx,
            mode,
            signatures: vec![TxSignature {
                public_key: public_key.to_vec(),
                mode,
                signature,
                sequence: signer_data.sequence,
            }],
            body_bytes: payload.body_bytes,
            auth_info_bytes: payload.auth_info_bytes,
        })
    }

    /// Canonical bytes a signer must sign for this envelope and mode
    pub fn sign_bytes(
        &self,
        tx: &UnsignedTx,
        public_key: &[u8],
        signer_data: &SignerData,
        mode: SignMode,
    ) -> Result<Vec<u8>> {
        Ok(self.payload(tx, public_key, signer_data, mode)?.sign_bytes)
    }

    fn payload(
        &self,
        tx: &UnsignedTx,
        public_key: &[u8],
        signer_data: &SignerData,
        mode: SignMode,
    ) -> Result<SignPayload> {
        match mode {
            SignMode::Direct => self.direct_payload(tx, public_key, signer_data),
            SignMode::LegacyAminoJson => Ok(SignPayload {
                sign_bytes: self.legacy_sign_bytes(tx, signer_data)?,
                body_bytes: Vec::new(),
                auth_info_bytes: Vec::new(),
            }),
        }
    }

    fn direct_payload(
        &self,
        tx: &UnsignedTx,
        public_key: &[u8],
        signer_data: &SignerData,
    ) -> Result<SignPayload> {
        let messages = tx
            .msgs()
            .iter()
            .map(|msg| self.registry.to_any(msg.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let body_bytes = proto::TxBody {
            messages,
            memo: tx.memo().to_string(),
            timeout_height: tx.timeout_height(),
        }
        .encode_to_vec();

        let auth_info_bytes = proto::AuthInfo {
            signer_infos: vec![proto::SignerInfo {
                public_key: Some(proto::Any {
                    type_url: proto::SECP256K1_PUBKEY_TYPE_URL.to_string(),
                    value: proto::PubKey {
                        key: public_key.to_vec(),
                    }
                    .encode_to_vec(),
                }),
                mode_info: Some(proto::ModeInfo {
                    single: Some(proto::ModeInfoSingle {
                        mode: SignMode::Direct.proto_value(),
                    }),
                }),
                sequence: signer_data.sequence,
            }],
            fee: Some(tx.fee().to_proto()),
        }
        .encode_to_vec();

        let sign_bytes = proto::SignDoc {
            body_bytes: body_bytes.clone(),
            auth_info_bytes: auth_info_bytes.clone(),
            chain_id: signer_data.chain_id.clone(),
            account_number: signer_data.account_number,
        }
        .encode_to_vec();

        Ok(SignPayload {
            sign_bytes,
            body_bytes,
            auth_info_bytes,
        })
    }

    /// Amino JSON messages of an envelope, in order
    pub fn amino_msgs(&self, tx: &UnsignedTx) -> Result<Vec<Value>> {
        tx.msgs()
            .iter()
            .map(|msg| self.registry.to_amino_json(msg.as_ref()))
            .collect()
    }

    fn legacy_sign_bytes(&self, tx: &UnsignedTx, signer_data: &SignerData) -> Result<Vec<u8>> {
        let mut doc = json!({
            "account_number": signer_data.account_number.to_string(),
            "chain_id": signer_data.chain_id,
            "fee": tx.fee().amino_json(),
            "memo": tx.memo(),
            "msgs": self.amino_msgs(tx)?,
            "sequence": signer_data.sequence.to_string(),
        });
        // omitempty, as in the SDK's StdSignDoc
        if tx.timeout_height() > 0 {
            doc["timeout_height"] = Value::String(tx.timeout_height().to_string());
        }
        canonical_json(&doc)
    }
}

/// Compact JSON with recursively sorted keys and `<`, `>`, `&` escaped.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>> {
    let compact = serde_json::to_string(&sort_keys(value))?;
    let escaped = compact
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    Ok(escaped.into_bytes())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
