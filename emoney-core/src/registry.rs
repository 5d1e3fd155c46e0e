//! Message codec registry
//!
//! Maps a message type URL to its amino name and encoders. A registry is
//! built explicitly and handed to the builder, signer and encoder; there is
//! no process-wide table.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::msg::{
    Msg, MsgClaimAtomicSwap, MsgCreateAtomicSwap, MsgRefundAtomicSwap, MsgSend, RegisteredMsg,
};
use crate::proto;
use crate::{Error, Result};

type ProtoEncoder = fn(&dyn Msg) -> Result<Vec<u8>>;
type AminoEncoder = fn(&dyn Msg) -> Result<Value>;

#[derive(Clone, Copy)]
struct MsgCodec {
    amino_name: &'static str,
    encode_proto: ProtoEncoder,
    encode_amino: AminoEncoder,
}

/// Table from message type URL to its encoders
#[derive(Clone, Default)]
pub struct MsgRegistry {
    codecs: HashMap<&'static str, MsgCodec>,
}

impl MsgRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with bank transfers and atomic-swap messages
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register::<MsgSend>()
            .register::<MsgCreateAtomicSwap>()
            .register::<MsgClaimAtomicSwap>()
            .register::<MsgRefundAtomicSwap>();
        registry
    }

    /// Register a message type
    pub fn register<M: RegisteredMsg>(&mut self) -> &mut Self {
        self.codecs.insert(
            M::TYPE_URL,
            MsgCodec {
                amino_name: M::AMINO_NAME,
                encode_proto: encode_proto::<M>,
                encode_amino: encode_amino::<M>,
            },
        );
        self
    }

    /// Whether a type URL is registered
    pub fn contains(&self, type_url: &str) -> bool {
        self.codecs.contains_key(type_url)
    }

    /// Registered type URLs, sorted
    pub fn type_urls(&self) -> Vec<&'static str> {
        let mut urls: Vec<_> = self.codecs.keys().copied().collect();
        urls.sort_unstable();
        urls
    }

    /// Amino name of a registered type URL
    pub fn amino_name(&self, type_url: &str) -> Option<&'static str> {
        self.codecs.get(type_url).map(|codec| codec.amino_name)
    }

    /// Pack a message as a protobuf `Any`
    pub fn to_any(&self, msg: &dyn Msg) -> Result<proto::Any> {
        let codec = self.codec(msg)?;
        Ok(proto::Any {
            type_url: msg.type_url().to_string(),
            value: (codec.encode_proto)(msg)?,
        })
    }

    /// Amino JSON `{"type": ..., "value": ...}` rendering of a message
    pub fn to_amino_json(&self, msg: &dyn Msg) -> Result<Value> {
        let codec = self.codec(msg)?;
        Ok(json!({
            "type": codec.amino_name,
            "value": (codec.encode_amino)(msg)?,
        }))
    }

    fn codec(&self, msg: &dyn Msg) -> Result<&MsgCodec> {
        self.codecs
            .get(msg.type_url())
            .ok_or_else(|| Error::UnregisteredMessage(msg.type_url().to_string()))
    }
}

impl std::fmt::Debug for MsgRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsgRegistry")
            .field("type_urls", &self.type_urls())
            .finish()
    }
}

fn downcast<M: RegisteredMsg>(msg: &dyn Msg) -> Result<&M> {
    msg.as_any().downcast_ref::<M>().ok_or_else(|| {
        Error::Encoding(format!(
            "message with type URL {} is not the registered Rust type",
            M::TYPE_URL
        ))
    })
}

fn encode_proto<M: RegisteredMsg>(msg: &dyn Msg) -> Result<Vec<u8>> {
    Ok(downcast::<M>(msg)?.to_proto_bytes())
}

fn encode_amino<M: RegisteredMsg>(msg: &dyn Msg) -> Result<Value> {
    Ok(downcast::<M>(msg)?.amino_value())
}
