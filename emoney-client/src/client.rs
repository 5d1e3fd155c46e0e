//! End-to-end transaction client
//!
//! Runs the pipeline for one transaction per call:
//! keys → build → resolve account → chain id → sign → encode → broadcast.
//! Validation and the missing-keys check happen before any network call.
//!
//! The client holds no per-address lock. Submissions from the same address
//! must be serialized by the caller, otherwise two transactions can be
//! signed against one sequence and the chain rejects the second.

use std::sync::Arc;
use std::time::Duration;

use emoney_core::{
    Coin, KeyManager, Msg, MsgRegistry, SignerData, TxBuilder, TxEncoder, TxSigner, UnsignedTx,
};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::account::AccountResolver;
use crate::broadcast::Broadcaster;
use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::grpc::GrpcTransport;
use crate::poller::HeightPoller;
use crate::query::QueryFacade;
use crate::rest::RestTransport;
use crate::rpc::{ResultBroadcastTx, ResultBroadcastTxCommit, TendermintRpc};
use crate::transport::Transport;
use crate::types::{BroadcastMode, BroadcastOutcome, TransportKind};
use crate::Result;

/// Transaction client bound to one node
///
/// Cheap to clone; clones share the transport, gRPC channel and cached
/// chain id.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    keys: Option<KeyManager>,
    registry: Arc<MsgRegistry>,
    transport: Arc<dyn Transport>,
    grpc: Option<GrpcTransport>,
    rpc: TendermintRpc,
    chain_id: Arc<OnceCell<String>>,
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.config.transport)
            .field("address", &self.keys.as_ref().map(|k| k.address().to_string()))
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the configured transport.
    ///
    /// For gRPC this establishes the shared channel (with retry) before
    /// returning.
    pub async fn connect(config: ClientConfig, keys: Option<KeyManager>) -> Result<Self> {
        let mut grpc = None;
        let transport: Arc<dyn Transport> = match config.transport {
            TransportKind::Rest => Arc::new(RestTransport::new(
                config.rest_url.clone(),
                config.request_timeout,
            )?),
            TransportKind::Grpc => {
                let channel_owner = GrpcTransport::from_config(&config);
                channel_owner.connect().await?;
                grpc = Some(channel_owner.clone());
                Arc::new(channel_owner)
            }
        };

        let mut client = Self::with_transport(config, keys, transport)?;
        client.grpc = grpc;
        info!(
            transport = %client.config.transport,
            address = ?client.keys.as_ref().map(|k| k.address().to_string()),
            "Client ready"
        );
        Ok(client)
    }

    /// Create a client over an existing transport
    pub fn with_transport(
        config: ClientConfig,
        keys: Option<KeyManager>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let rpc = TendermintRpc::new(config.rpc_url.clone(), config.request_timeout)?;
        Ok(Self {
            keys,
            registry: Arc::new(MsgRegistry::standard()),
            transport,
            grpc: None,
            rpc,
            chain_id: Arc::new(OnceCell::new()),
            config,
        })
    }

    /// Replace the message codec registry
    pub fn with_registry(mut self, registry: MsgRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Drop the gRPC channel, if any
    pub async fn disconnect(&self) {
        if let Some(grpc) = &self.grpc {
            grpc.disconnect().await;
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Signing identity, if configured
    pub fn keys(&self) -> Option<&KeyManager> {
        self.keys.as_ref()
    }

    /// Bech32 address of the signing identity
    pub fn address(&self) -> Result<String> {
        Ok(self.identity()?.address().to_string())
    }

    /// Message codec registry
    pub fn registry(&self) -> &MsgRegistry {
        &self.registry
    }

    /// Read-only queries over this client's transport
    pub fn query(&self) -> QueryFacade {
        QueryFacade::new(Arc::clone(&self.transport))
    }

    /// Account resolver over this client's transport
    pub fn resolver(&self) -> AccountResolver {
        AccountResolver::new(Arc::clone(&self.transport))
    }

    /// Broadcaster over this client's transport
    pub fn broadcaster(&self) -> Broadcaster {
        Broadcaster::new(Arc::clone(&self.transport))
    }

    /// Height poller using the configured interval
    pub fn poller(&self) -> HeightPoller {
        HeightPoller::with_interval(Arc::clone(&self.transport), self.config.poll_interval)
    }

    /// Tendermint RPC client for the configured RPC URL
    pub fn rpc(&self) -> &TendermintRpc {
        &self.rpc
    }

    /// Chain id: the configured override, else the node's, fetched once
    pub async fn chain_id(&self) -> Result<String> {
        if let Some(chain_id) = &self.config.chain_id {
            return Ok(chain_id.clone());
        }
        if let Some(chain_id) = self.chain_id.get() {
            return Ok(chain_id.clone());
        }

        let chain_id = self.transport.chain_id().await?;
        if let Some(expected) = self.config.network.chain_id {
            if expected != chain_id {
                warn!(
                    expected,
                    reported = %chain_id,
                    network = %self.config.network.network_type,
                    "Node reports an unexpected chain id"
                );
            }
        }
        Ok(self.chain_id.get_or_init(|| chain_id).clone())
    }

    fn identity(&self) -> Result<&KeyManager> {
        Ok(self
            .keys
            .as_ref()
            .ok_or_else(emoney_core::Error::missing_keys)?)
    }

    fn build(&self, msgs: Vec<Box<dyn Msg>>, fee: Coin) -> Result<UnsignedTx> {
        let mut builder = TxBuilder::with_network(&self.registry, self.config.network.clone());
        builder
            .add_msgs(msgs)
            .with_fee(fee)
            .with_gas_limit(self.config.gas_limit)
            .with_memo(self.config.memo.clone());
        Ok(builder.build()?)
    }

    fn sign_and_encode(
        &self,
        keys: &KeyManager,
        tx: UnsignedTx,
        signer_data: &SignerData,
    ) -> Result<Vec<u8>> {
        let signed =
            TxSigner::new(&self.registry).sign(tx, Some(keys), signer_data, self.config.sign_mode)?;
        Ok(TxEncoder::new(&self.registry).encode(&signed)?)
    }

    /// Build, sign and encode without touching the network
    pub fn sign_tx(&self, msgs: Vec<Box<dyn Msg>>, signer_data: &SignerData) -> Result<Vec<u8>> {
        let keys = self.identity()?;
        let tx = self.build(msgs, self.config.fee.clone())?;
        self.sign_and_encode(keys, tx, signer_data)
    }

    /// Broadcast one message with the default fee
    pub async fn broadcast(&self, msg: impl Msg, mode: BroadcastMode) -> Result<BroadcastOutcome> {
        self.broadcast_with_fee(vec![Box::new(msg) as Box<dyn Msg>], self.config.fee.clone(), mode)
            .await
    }

    /// Broadcast messages with an explicit fee.
    ///
    /// A chain-side rejection is returned as an outcome with `code != 0`.
    pub async fn broadcast_with_fee(
        &self,
        msgs: Vec<Box<dyn Msg>>,
        fee: Coin,
        mode: BroadcastMode,
    ) -> Result<BroadcastOutcome> {
        let keys = self.identity()?;
        let tx = self.build(msgs, fee)?;

        let address = keys.address().to_string();
        let account = self.resolver().resolve(&address).await?;
        let chain_id = self.chain_id().await?;
        let signer_data = SignerData {
            chain_id,
            account_number: account.account_number,
            sequence: account.sequence,
        };
        debug!(
            address = %address,
            account_number = signer_data.account_number,
            sequence = signer_data.sequence,
            chain_id = %signer_data.chain_id,
            "Signing transaction"
        );

        let tx_bytes = self.sign_and_encode(keys, tx, &signer_data)?;
        self.broadcaster().broadcast(&tx_bytes, mode).await
    }

    /// Broadcast messages and wait for block inclusion
    pub async fn post_tx(&self, msgs: Vec<Box<dyn Msg>>) -> Result<BroadcastOutcome> {
        self.broadcast_with_fee(msgs, self.config.fee.clone(), BroadcastMode::Commit)
            .await
    }

    /// Submit pre-encoded bytes over Tendermint RPC, waiting for commit
    pub async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTxCommit> {
        self.rpc.broadcast_tx_commit(tx_bytes).await
    }

    /// Submit pre-encoded bytes over Tendermint RPC, waiting for CheckTx
    pub async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.rpc.broadcast_tx_sync(tx_bytes).await
    }

    /// Submit pre-encoded bytes over Tendermint RPC without waiting
    pub async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.rpc.broadcast_tx_async(tx_bytes).await
    }

    /// Wait until the chain reaches `target`
    pub async fn wait_for_height(&self, target: u64, timeout: Duration) -> Result<u64> {
        self.poller().wait_for_height(target, timeout).await
    }

    /// Wait until the chain reaches `target` or `cancel` fires
    pub async fn wait_for_height_cancellable(
        &self,
        target: u64,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<u64> {
        self.poller()
            .wait_for_height_cancellable(target, timeout, cancel)
            .await
    }

    /// Wait for the block after the current one
    pub async fn wait_for_next_block(&self, timeout: Duration) -> Result<u64> {
        let current = self.transport.latest_height().await?;
        self.wait_for_height(current.saturating_add(1), timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountInfo, AtomicSwap};
    use crate::transport::{ChainQuery, ChainStatus, TxSubmitter};
    use crate::Error;
    use async_trait::async_trait;
    use emoney_core::{MsgSend, SignMode};

    const MNEMONIC: &str = "play witness auto coast domain win tiny dress glare bamboo rent mule delay exact arctic vacuum laptop hidden siren sudden six tired fragile penalty";
    const BOB: &str = "emoney15qdefkmwswysgg4qxgqpqr35k3m49pkxeyrqj5";

    struct Unreachable;

    #[async_trait]
    impl TxSubmitter for Unreachable {
        async fn submit(&self, _: &[u8], _: BroadcastMode) -> Result<BroadcastOutcome> {
            Err(Error::Connection("unreachable".to_string()))
        }
    }

    #[async_trait]
    impl ChainStatus for Unreachable {
        async fn latest_height(&self) -> Result<u64> {
            Err(Error::Connection("unreachable".to_string()))
        }
        async fn chain_id(&self) -> Result<String> {
            Err(Error::Connection("unreachable".to_string()))
        }
    }

    #[async_trait]
    impl ChainQuery for Unreachable {
        async fn account(&self, _: &str) -> Result<AccountInfo> {
            Err(Error::Connection("unreachable".to_string()))
        }
        async fn balance(&self, _: &str, _: &str) -> Result<Coin> {
            Err(Error::Connection("unreachable".to_string()))
        }
        async fn balances(&self, _: &str) -> Result<Vec<Coin>> {
            Err(Error::Connection("unreachable".to_string()))
        }
        async fn atomic_swap(&self, _: &[u8]) -> Result<AtomicSwap> {
            Err(Error::Connection("unreachable".to_string()))
        }
    }

    fn client(keys: Option<KeyManager>, config: ClientConfig) -> Client {
        Client::with_transport(config, keys, Arc::new(Unreachable)).unwrap()
    }

    #[test]
    fn test_sign_tx_offline_in_both_modes() {
        let keys = KeyManager::from_mnemonic(MNEMONIC, "alice").unwrap();
        let msg = || -> Vec<Box<dyn Msg>> {
            vec![Box::new(MsgSend::new(
                "emoney1lagqmceycrfpkyu7y6ayrk6jyvru5mkrezacpw",
                BOB,
                vec![Coin::new(5, "ungm").unwrap()],
            )) as Box<dyn Msg>]
        };
        let data = SignerData {
            chain_id: "localnet_reuse".to_string(),
            account_number: 0,
            sequence: 0,
        };

        let direct = client(Some(keys.clone()), ClientConfig::default());
        let bytes = direct.sign_tx(msg(), &data).unwrap();
        assert!(!bytes.is_empty());
        assert_ne!(bytes[0], b'{');

        let legacy = client(
            Some(keys),
            ClientConfig::default().with_sign_mode(SignMode::LegacyAminoJson),
        );
        let bytes = legacy.sign_tx(msg(), &data).unwrap();
        assert_eq!(bytes[0], b'{');
    }

    #[test]
    fn test_address_requires_keys() {
        let err = client(None, ClientConfig::default()).address().unwrap_err();
        assert_eq!(err.kind(), emoney_core::ErrorKind::Signing);
    }

    #[tokio::test]
    async fn test_chain_id_override_skips_node() {
        let client = client(None, ClientConfig::default().with_chain_id("emoney-3"));
        assert_eq!(client.chain_id().await.unwrap(), "emoney-3");
    }

    #[tokio::test]
    async fn test_chain_id_errors_propagate() {
        let client = client(None, ClientConfig::default());
        assert!(matches!(client.chain_id().await, Err(Error::Connection(_))));
    }
}
