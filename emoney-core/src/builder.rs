//! Unsigned transaction envelopes
//!
//! The builder validates every message and the fee before anything is
//! signed or sent. It never contacts the network.

use emoney_params::Network;

use crate::coin::{Coin, Fee};
use crate::msg::Msg;
use crate::registry::MsgRegistry;
use crate::{Error, Result};

/// Maximum memo length in characters accepted by the chain
pub const MAX_MEMO_CHARACTERS: usize = 256;

/// Messages, fee, gas and memo awaiting a signature
#[derive(Debug)]
pub struct UnsignedTx {
    msgs: Vec<Box<dyn Msg>>,
    fee: Fee,
    memo: String,
    timeout_height: u64,
}

impl UnsignedTx {
    /// Messages in submission order
    pub fn msgs(&self) -> &[Box<dyn Msg>] {
        &self.msgs
    }

    /// Fee and gas limit
    pub fn fee(&self) -> &Fee {
        &self.fee
    }

    /// Memo, possibly empty
    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Block height after which the tx is invalid (0 = none)
    pub fn timeout_height(&self) -> u64 {
        self.timeout_height
    }

    /// The single address that signs every message
    pub fn signer(&self) -> &str {
        // build() guarantees at least one message
        self.msgs.first().map(|m| m.signer()).unwrap_or_default()
    }
}

/// Transaction builder
#[derive(Debug)]
pub struct TxBuilder<'r> {
    registry: &'r MsgRegistry,
    network: Network,
    msgs: Vec<Box<dyn Msg>>,
    fee: Option<Coin>,
    gas_limit: Option<u64>,
    memo: String,
    timeout_height: u64,
}

impl<'r> TxBuilder<'r> {
    /// Create a builder for the default (local) network
    pub fn new(registry: &'r MsgRegistry) -> Self {
        Self::with_network(registry, Network::default())
    }

    /// Create a builder for the given network
    pub fn with_network(registry: &'r MsgRegistry, network: Network) -> Self {
        Self {
            registry,
            memo: network.default_memo.to_string(),
            network,
            msgs: Vec::new(),
            fee: None,
            gas_limit: None,
            timeout_height: 0,
        }
    }

    /// Number of messages added so far
    pub fn msg_count(&self) -> usize {
        self.msgs.len()
    }

    /// Append a message
    pub fn add_msg(&mut self, msg: impl Msg) -> &mut Self {
        self.msgs.push(Box::new(msg));
        self
    }

    /// Append already boxed messages
    pub fn add_msgs(&mut self, msgs: impl IntoIterator<Item = Box<dyn Msg>>) -> &mut Self {
        self.msgs.extend(msgs);
        self
    }

    /// Override the fee coin (must be the native fee token)
    pub fn with_fee(&mut self, fee: Coin) -> &mut Self {
        self.fee = Some(fee);
        self
    }

    /// Override the gas limit
    pub fn with_gas_limit(&mut self, gas_limit: u64) -> &mut Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Replace the memo (empty is allowed)
    pub fn with_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.memo = memo.into();
        self
    }

    /// Set a timeout height
    pub fn with_timeout_height(&mut self, height: u64) -> &mut Self {
        self.timeout_height = height;
        self
    }

    /// Validate and produce the unsigned envelope.
    ///
    /// The first failing message aborts the build with its own error.
    pub fn build(self) -> Result<UnsignedTx> {
        if self.msgs.is_empty() {
            return Err(Error::EmptyMessages);
        }

        for (index, msg) in self.msgs.iter().enumerate() {
            if !self.registry.contains(msg.type_url()) {
                return Err(Error::UnregisteredMessage(msg.type_url().to_string()));
            }
            msg.validate_basic().map_err(|e| {
                tracing::debug!(index, type_url = msg.type_url(), error = %e, "Message failed validation");
                e
            })?;
        }

        let signer = self.msgs[0].signer();
        if let Some(other) = self.msgs.iter().find(|m| m.signer() != signer) {
            return Err(Error::Validation(format!(
                "all messages must share one signer: {signer} vs {}",
                other.signer()
            )));
        }

        let fee = Fee {
            amount: vec![self.fee.unwrap_or_else(|| Coin {
                denom: self.network.fee_denom.to_string(),
                amount: self.network.default_fee_amount,
            })],
            gas_limit: self.gas_limit.unwrap_or(self.network.default_gas_limit),
        };
        fee.validate(self.network.fee_denom)?;

        if self.memo.chars().count() > MAX_MEMO_CHARACTERS {
            return Err(Error::Validation(format!(
                "memo is {} characters, maximum is {MAX_MEMO_CHARACTERS}",
                self.memo.chars().count()
            )));
        }

        Ok(UnsignedTx {
            msgs: self.msgs,
            fee,
            memo: self.memo,
            timeout_height: self.timeout_height,
        })
    }
}
