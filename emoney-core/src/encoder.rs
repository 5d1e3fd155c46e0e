//! Wire encoding of signed transactions

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use prost::Message;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::registry::MsgRegistry;
use crate::signer::{SignMode, SignedTx, TxSigner};
use crate::{proto, Error, Result};

/// Amino type of a legacy transaction
pub const STD_TX_AMINO_NAME: &str = "cosmos-sdk/StdTx";
/// Amino type of a secp256k1 public key
pub const SECP256K1_PUBKEY_AMINO_NAME: &str = "tendermint/PubKeySecp256k1";

/// Turns a [`SignedTx`] into broadcastable bytes
#[derive(Debug, Clone, Copy)]
pub struct TxEncoder<'r> {
    registry: &'r MsgRegistry,
}

impl<'r> TxEncoder<'r> {
    /// Create an encoder using the given codec registry
    pub fn new(registry: &'r MsgRegistry) -> Self {
        Self { registry }
    }

    /// Encode in the mode the transaction was signed under.
    ///
    /// Direct: protobuf `TxRaw`. Legacy: amino JSON `StdTx`.
    pub fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>> {
        match tx.mode() {
            SignMode::Direct => Ok(self.encode_direct(tx)),
            SignMode::LegacyAminoJson => self.encode_legacy(tx),
        }
    }

    /// Encode, rejecting a mode other than the signing mode
    pub fn encode_as(&self, tx: &SignedTx, mode: SignMode) -> Result<Vec<u8>> {
        if tx.mode() != mode {
            return Err(Error::ModeMismatch {
                signed: tx.mode(),
                requested: mode,
            });
        }
        self.encode(tx)
    }

    fn encode_direct(&self, tx: &SignedTx) -> Vec<u8> {
        proto::TxRaw {
            body_bytes: tx.body_bytes().to_vec(),
            auth_info_bytes: tx.auth_info_bytes().to_vec(),
            signatures: tx
                .signatures()
                .iter()
                .map(|s| s.signature.clone())
                .collect(),
        }
        .encode_to_vec()
    }

    fn encode_legacy(&self, tx: &SignedTx) -> Result<Vec<u8>> {
        let msgs = TxSigner::new(self.registry).amino_msgs(tx.tx())?;
        let signatures: Vec<_> = tx
            .signatures()
            .iter()
            .map(|s| {
                json!({
                    "pub_key": {
                        "type": SECP256K1_PUBKEY_AMINO_NAME,
                        "value": BASE64.encode(&s.public_key),
                    },
                    "signature": BASE64.encode(&s.signature),
                })
            })
            .collect();

        let mut std_tx = json!({
            "type": STD_TX_AMINO_NAME,
            "value": {
                "fee": tx.tx().fee().amino_json(),
                "memo": tx.tx().memo(),
                "msg": msgs,
                "signatures": signatures,
            },
        });
        if tx.tx().timeout_height() > 0 {
            std_tx["value"]["timeout_height"] = json!(tx.tx().timeout_height().to_string());
        }
        Ok(serde_json::to_vec(&std_tx)?)
    }
}

/// Tendermint transaction hash: uppercase hex SHA-256 of the encoded bytes
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TxBuilder;
    use crate::coin::Coin;
    use crate::keys::KeyManager;
    use crate::msg::MsgSend;
    use crate::signer::SignerData;

    const MNEMONIC: &str = "play witness auto coast domain win tiny dress glare bamboo rent mule delay exact arctic vacuum laptop hidden siren sudden six tired fragile penalty";
    const BOB: &str = "emoney15qdefkmwswysgg4qxgqpqr35k3m49pkxeyrqj5";

    fn signed(registry: &MsgRegistry, mode: SignMode) -> SignedTx {
        let key = KeyManager::from_mnemonic(MNEMONIC, "k").unwrap();
        let mut builder = TxBuilder::new(registry);
        builder.add_msg(MsgSend::new(
            key.address().to_string(),
            BOB,
            vec![Coin::new(1000, "ungm").unwrap()],
        ));
        let data = SignerData {
            chain_id: "localnet_reuse".to_string(),
            account_number: 1,
            sequence: 0,
        };
        TxSigner::new(registry)
            .sign(builder.build().unwrap(), Some(&key), &data, mode)
            .unwrap()
    }

    #[test]
    fn test_direct_encoding_is_tx_raw() {
        let registry = MsgRegistry::standard();
        let tx = signed(&registry, SignMode::Direct);
        let bytes = TxEncoder::new(&registry).encode(&tx).unwrap();

        let raw = proto::TxRaw::decode(bytes.as_slice()).unwrap();
        assert_eq!(raw.signatures, vec![tx.signatures()[0].signature.clone()]);
        let body = proto::TxBody::decode(raw.body_bytes.as_slice()).unwrap();
        assert_eq!(body.memo, "ByClient");
        assert_eq!(body.messages[0].type_url, "/cosmos.bank.v1beta1.MsgSend");
    }

    #[test]
    fn test_legacy_encoding_is_std_tx() {
        let registry = MsgRegistry::standard();
        let tx = signed(&registry, SignMode::LegacyAminoJson);
        let bytes = TxEncoder::new(&registry).encode(&tx).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], STD_TX_AMINO_NAME);
        assert_eq!(value["value"]["msg"][0]["type"], "cosmos-sdk/MsgSend");
        assert_eq!(value["value"]["fee"]["gas"], "100000");
        let sig = &value["value"]["signatures"][0];
        assert_eq!(sig["pub_key"]["type"], SECP256K1_PUBKEY_AMINO_NAME);
        assert_eq!(
            BASE64.decode(sig["signature"].as_str().unwrap()).unwrap(),
            tx.signatures()[0].signature
        );
    }

    #[test]
    fn test_legacy_std_tx_carries_timeout_height() {
        let registry = MsgRegistry::standard();
        let key = KeyManager::from_mnemonic(MNEMONIC, "k").unwrap();
        let data = SignerData {
            chain_id: "localnet_reuse".to_string(),
            account_number: 1,
            sequence: 0,
        };
        let encode = |height: u64| {
            let mut builder = TxBuilder::new(&registry);
            builder
                .add_msg(MsgSend::new(
                    key.address().to_string(),
                    BOB,
                    vec![Coin::new(1000, "ungm").unwrap()],
                ))
                .with_timeout_height(height);
            let tx = TxSigner::new(&registry)
                .sign(builder.build().unwrap(), Some(&key), &data, SignMode::LegacyAminoJson)
                .unwrap();
            let bytes = TxEncoder::new(&registry).encode(&tx).unwrap();
            serde_json::from_slice::<serde_json::Value>(&bytes).unwrap()
        };

        assert_eq!(encode(250)["value"]["timeout_height"], "250");
        assert!(encode(0)["value"].get("timeout_height").is_none());
    }

    #[test]
    fn test_mode_mismatch_rejected_locally() {
        let registry = MsgRegistry::standard();
        let encoder = TxEncoder::new(&registry);

        let direct = signed(&registry, SignMode::Direct);
        assert!(matches!(
            encoder.encode_as(&direct, SignMode::LegacyAminoJson),
            Err(Error::ModeMismatch {
                signed: SignMode::Direct,
                requested: SignMode::LegacyAminoJson
            })
        ));
        assert!(encoder.encode_as(&direct, SignMode::Direct).is_ok());

        let legacy = signed(&registry, SignMode::LegacyAminoJson);
        assert!(encoder.encode_as(&legacy, SignMode::Direct).is_err());
    }

    #[test]
    fn test_tx_hash_format() {
        let hash = tx_hash(b"");
        assert_eq!(
            hash,
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }
}
