//! In-memory node shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use emoney_client::{
    AccountInfo, AtomicSwap, BroadcastMode, BroadcastOutcome, ChainQuery, ChainStatus, Client,
    ClientConfig, Error, Result, TxStage, TxSubmitter,
};
use emoney_core::{proto, Coin, KeyManager, MsgSend, RegisteredMsg};
use parking_lot::Mutex;
use prost::Message;
use serde_json::Value;

pub const MNEMONIC: &str = "play witness auto coast domain win tiny dress glare bamboo rent mule delay exact arctic vacuum laptop hidden siren sudden six tired fragile penalty";
pub const ALICE: &str = "emoney1lagqmceycrfpkyu7y6ayrk6jyvru5mkrezacpw";
pub const BOB: &str = "emoney15qdefkmwswysgg4qxgqpqr35k3m49pkxeyrqj5";
pub const CHAIN_ID: &str = "localnet_reuse";

/// `ungm` held by ALICE in a fresh node
pub const GENESIS_BALANCE: u128 = 1_000_000_000;

/// Bank transfer carried by a submitted tx
struct Transfer {
    from: String,
    to: String,
    amount: Vec<Coin>,
}

/// Ledger effects of a submitted tx: fee plus any bank transfers
struct Effects {
    fee: Vec<Coin>,
    transfers: Vec<Transfer>,
}

/// Records every call and behaves like a single-validator chain.
///
/// Only ALICE has an account. An accepted tx bumps her sequence, charges
/// her the fee and applies its `MsgSend` transfers; in commit mode it
/// also advances the height. A DeliverTx failure still charges the fee.
pub struct MockNode {
    pub account_number: u64,
    sequence: AtomicU64,
    height: AtomicU64,
    /// Added to the height after every height query
    height_step: AtomicU64,
    reject: Mutex<Option<(u32, TxStage)>>,
    ledger: Mutex<HashMap<String, BTreeMap<String, u128>>>,
    swaps: Mutex<HashMap<Vec<u8>, AtomicSwap>>,
    submitted: Mutex<Vec<(Vec<u8>, BroadcastMode)>>,
    pub submit_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub height_calls: AtomicUsize,
    pub chain_id_calls: AtomicUsize,
}

impl MockNode {
    pub fn new(account_number: u64, sequence: u64, height: u64) -> Self {
        let node = Self {
            account_number,
            sequence: AtomicU64::new(sequence),
            height: AtomicU64::new(height),
            height_step: AtomicU64::new(0),
            reject: Mutex::new(None),
            ledger: Mutex::new(HashMap::new()),
            swaps: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            submit_calls: AtomicUsize::new(0),
            account_calls: AtomicUsize::new(0),
            height_calls: AtomicUsize::new(0),
            chain_id_calls: AtomicUsize::new(0),
        };
        node.set_balances(ALICE, vec![Coin::new(GENESIS_BALANCE, "ungm").unwrap()]);
        node
    }

    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn advance_per_query(&self, step: u64) {
        self.height_step.store(step, Ordering::SeqCst);
    }

    /// Reject the next submissions with `code` at `stage`
    pub fn reject_with(&self, code: u32, stage: TxStage) {
        *self.reject.lock() = Some((code, stage));
    }

    /// Replace every balance of `address`
    pub fn set_balances(&self, address: &str, coins: Vec<Coin>) {
        let holdings = coins.into_iter().map(|c| (c.denom, c.amount)).collect();
        self.ledger.lock().insert(address.to_string(), holdings);
    }

    /// Balance of one denomination straight from the ledger
    pub fn balance_of(&self, address: &str, denom: &str) -> u128 {
        self.ledger
            .lock()
            .get(address)
            .and_then(|h| h.get(denom))
            .copied()
            .unwrap_or_default()
    }

    pub fn insert_swap(&self, swap: AtomicSwap) {
        self.swaps.lock().insert(swap.id.clone(), swap);
    }

    pub fn submitted(&self) -> Vec<(Vec<u8>, BroadcastMode)> {
        self.submitted.lock().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
            + self.account_calls.load(Ordering::SeqCst)
            + self.height_calls.load(Ordering::SeqCst)
            + self.chain_id_calls.load(Ordering::SeqCst)
    }

    fn include(&self, mode: BroadcastMode) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        match mode {
            BroadcastMode::Commit => self.height.fetch_add(1, Ordering::SeqCst) + 1,
            _ => 0,
        }
    }
}

fn covers(holdings: &BTreeMap<String, u128>, coins: &[Coin]) -> bool {
    coins
        .iter()
        .all(|c| holdings.get(&c.denom).copied().unwrap_or_default() >= c.amount)
}

fn debit(holdings: &mut BTreeMap<String, u128>, coins: &[Coin]) {
    for coin in coins {
        if let Some(held) = holdings.get_mut(&coin.denom) {
            *held -= coin.amount;
        }
    }
}

fn credit(holdings: &mut BTreeMap<String, u128>, coins: &[Coin]) {
    for coin in coins {
        *holdings.entry(coin.denom.clone()).or_default() += coin.amount;
    }
}

fn proto_coins(coins: &[proto::Coin]) -> Vec<Coin> {
    coins.iter().map(|c| Coin::from_proto(c).unwrap()).collect()
}

fn amino_coins(coins: &Value) -> Vec<Coin> {
    coins
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|c| Coin {
                    denom: c["denom"].as_str().unwrap().to_string(),
                    amount: c["amount"].as_str().unwrap().parse().unwrap(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a direct-mode `TxRaw` or a legacy amino-JSON `StdTx`
fn effects(tx_bytes: &[u8]) -> Effects {
    if tx_bytes.first() == Some(&b'{') {
        let std_tx: Value = serde_json::from_slice(tx_bytes).unwrap();
        let value = &std_tx["value"];
        let transfers = value["msg"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|m| m["type"] == <MsgSend as RegisteredMsg>::AMINO_NAME)
            .map(|m| Transfer {
                from: m["value"]["from_address"].as_str().unwrap().to_string(),
                to: m["value"]["to_address"].as_str().unwrap().to_string(),
                amount: amino_coins(&m["value"]["amount"]),
            })
            .collect();
        return Effects {
            fee: amino_coins(&value["fee"]["amount"]),
            transfers,
        };
    }

    let raw = proto::TxRaw::decode(tx_bytes).unwrap();
    let body = proto::TxBody::decode(raw.body_bytes.as_slice()).unwrap();
    let auth = proto::AuthInfo::decode(raw.auth_info_bytes.as_slice()).unwrap();
    let transfers = body
        .messages
        .iter()
        .filter(|any| any.type_url == <MsgSend as RegisteredMsg>::TYPE_URL)
        .map(|any| {
            let send = proto::MsgSend::decode(any.value.as_slice()).unwrap();
            Transfer {
                from: send.from_address,
                to: send.to_address,
                amount: proto_coins(&send.amount),
            }
        })
        .collect();
    Effects {
        fee: auth.fee.map(|f| proto_coins(&f.amount)).unwrap_or_default(),
        transfers,
    }
}

#[async_trait]
impl TxSubmitter for MockNode {
    async fn submit(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<BroadcastOutcome> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().push((tx_bytes.to_vec(), mode));
        let hash = format!("{:064X}", self.submit_calls.load(Ordering::SeqCst));
        let effects = effects(tx_bytes);
        let check_tx_rejection = |code: u32, raw_log: &str| BroadcastOutcome {
            code,
            codespace: "sdk".to_string(),
            raw_log: raw_log.to_string(),
            failed_stage: Some(TxStage::CheckTx),
            ..Default::default()
        };

        let injected = *self.reject.lock();
        if let Some((code, TxStage::CheckTx)) = injected {
            return Ok(check_tx_rejection(code, "account sequence mismatch"));
        }

        let mut ledger = self.ledger.lock();
        let payer = ledger.entry(ALICE.to_string()).or_default();
        if !covers(payer, &effects.fee) {
            return Ok(check_tx_rejection(13, "insufficient fee"));
        }
        debit(payer, &effects.fee);

        let deliver_failure = match injected {
            Some((code, TxStage::DeliverTx)) => Some((code, "injected failure")),
            _ => effects
                .transfers
                .iter()
                .any(|t| !covers(ledger.get(&t.from).unwrap_or(&BTreeMap::new()), &t.amount))
                .then_some((5, "insufficient funds")),
        };
        if deliver_failure.is_none() {
            for transfer in &effects.transfers {
                if let Some(from) = ledger.get_mut(&transfer.from) {
                    debit(from, &transfer.amount);
                }
                credit(ledger.entry(transfer.to.clone()).or_default(), &transfer.amount);
            }
        }
        drop(ledger);

        let height = self.include(mode);
        match deliver_failure {
            // Sync and async only report CheckTx, which passed
            Some((code, raw_log)) if mode == BroadcastMode::Commit => Ok(BroadcastOutcome {
                code,
                codespace: "sdk".to_string(),
                hash,
                raw_log: raw_log.to_string(),
                height,
                failed_stage: Some(TxStage::DeliverTx),
                ..Default::default()
            }),
            _ => Ok(BroadcastOutcome {
                hash,
                height,
                gas_wanted: 200_000,
                gas_used: 61_000,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl ChainStatus for MockNode {
    async fn latest_height(&self) -> Result<u64> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.height_step.load(Ordering::SeqCst);
        Ok(self.height.fetch_add(step, Ordering::SeqCst))
    }

    async fn chain_id(&self) -> Result<String> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CHAIN_ID.to_string())
    }
}

#[async_trait]
impl ChainQuery for MockNode {
    async fn account(&self, address: &str) -> Result<AccountInfo> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if address != ALICE {
            return Err(Error::NotFound(format!("account {address} not found")));
        }
        Ok(AccountInfo {
            address: address.to_string(),
            account_number: self.account_number,
            sequence: self.sequence(),
            pub_key: None,
        })
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        Ok(Coin {
            denom: denom.to_string(),
            amount: self.balance_of(address, denom),
        })
    }

    async fn balances(&self, address: &str) -> Result<Vec<Coin>> {
        Ok(self
            .ledger
            .lock()
            .get(address)
            .map(|holdings| {
                holdings
                    .iter()
                    .filter(|(_, amount)| **amount > 0)
                    .map(|(denom, amount)| Coin {
                        denom: denom.clone(),
                        amount: *amount,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn atomic_swap(&self, swap_id: &[u8]) -> Result<AtomicSwap> {
        self.swaps
            .lock()
            .get(swap_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("swap {} not found", hex::encode(swap_id))))
    }
}

pub fn alice_keys() -> KeyManager {
    KeyManager::from_mnemonic(MNEMONIC, "alice").unwrap()
}

pub fn client_with(node: &Arc<MockNode>, config: ClientConfig) -> Client {
    Client::with_transport(config, Some(alice_keys()), node.clone()).unwrap()
}
