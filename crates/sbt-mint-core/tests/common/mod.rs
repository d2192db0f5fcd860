#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, B256, U256};

use sbt_mint_core::{
    ContractReference, DisplayPort, MintControlState, MintTransaction, NetworkDescriptor,
    PortError, ProviderError, ProviderEvent, ProviderEventKind, PublicChainPort, SignerHandle,
    StatusMessage, TxReceipt, WalletPort, WalletSessionController, UNRECOGNIZED_CHAIN_CODE,
};

pub type TestController =
    WalletSessionController<ScriptedWallet, ScriptedChain, RecordingDisplay>;

pub fn account_a() -> Address {
    "0x1234000000000000000000000000000000005678"
        .parse()
        .expect("account a")
}

pub fn account_b() -> Address {
    "0x9999000000000000000000000000000000001111"
        .parse()
        .expect("account b")
}

pub fn new_controller(wallet: ScriptedWallet) -> TestController {
    WalletSessionController::new(
        wallet,
        ScriptedChain::with_supply(7),
        RecordingDisplay::default(),
    )
}

#[derive(Debug)]
pub struct WalletScript {
    pub available: bool,
    pub selected: Option<Address>,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub known_chains: Vec<u64>,
    pub request_accounts_error: Option<ProviderError>,
    pub switch_error: Option<ProviderError>,
    pub add_chain_error: Option<ProviderError>,
    pub signer_error: Option<ProviderError>,
    pub send_error: Option<ProviderError>,
    pub wait_error: Option<ProviderError>,
    pub receipt_status: u64,
    pub balance: U256,
    pub subscribed: bool,
    pub events: Vec<ProviderEvent>,
    pub calls: Vec<&'static str>,
    pub added_networks: Vec<NetworkDescriptor>,
    pub sent: Vec<MintTransaction>,
}

impl Default for WalletScript {
    fn default() -> Self {
        Self {
            available: true,
            selected: None,
            accounts: vec![account_a()],
            chain_id: 1,
            known_chains: vec![1, 8453],
            request_accounts_error: None,
            switch_error: None,
            add_chain_error: None,
            signer_error: None,
            send_error: None,
            wait_error: None,
            receipt_status: 1,
            balance: U256::ZERO,
            subscribed: false,
            events: Vec::new(),
            calls: Vec::new(),
            added_networks: Vec::new(),
            sent: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedWallet {
    pub script: Mutex<WalletScript>,
}

impl ScriptedWallet {
    pub fn new(script: WalletScript) -> Self {
        Self {
            script: Mutex::new(script),
        }
    }

    pub fn absent() -> Self {
        Self::new(WalletScript {
            available: false,
            ..WalletScript::default()
        })
    }

    pub fn calls(&self, method: &str) -> usize {
        self.script
            .lock()
            .expect("wallet script")
            .calls
            .iter()
            .filter(|c| **c == method)
            .count()
    }

    pub fn edit(&self, f: impl FnOnce(&mut WalletScript)) {
        f(&mut self.script.lock().expect("wallet script"));
    }

    pub fn push_event(&self, kind: ProviderEventKind) {
        let mut g = self.script.lock().expect("wallet script");
        let sequence = g.events.len() as u64 + 1;
        g.events.push(ProviderEvent { sequence, kind });
    }

    fn record(&self, method: &'static str) -> std::sync::MutexGuard<'_, WalletScript> {
        let mut g = self.script.lock().expect("wallet script");
        g.calls.push(method);
        g
    }
}

fn fail(err: &Option<ProviderError>) -> Result<(), PortError> {
    match err {
        Some(e) => Err(PortError::Provider(e.clone())),
        None => Ok(()),
    }
}

impl WalletPort for ScriptedWallet {
    fn is_available(&self) -> bool {
        self.script.lock().expect("wallet script").available
    }

    fn selected_account(&self) -> Option<Address> {
        self.script.lock().expect("wallet script").selected
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let g = self.record("eth_requestAccounts");
        fail(&g.request_accounts_error)?;
        Ok(g.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        Ok(self.record("eth_chainId").chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.record("wallet_switchEthereumChain");
        fail(&g.switch_error)?;
        if !g.known_chains.contains(&chain_id) {
            return Err(ProviderError::with_code(
                UNRECOGNIZED_CHAIN_CODE,
                "Unrecognized chain ID. Try adding the chain using wallet_addEthereumChain first.",
            )
            .into());
        }
        g.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        let mut g = self.record("wallet_addEthereumChain");
        fail(&g.add_chain_error)?;
        g.known_chains.push(network.chain_id);
        g.chain_id = network.chain_id;
        g.added_networks.push(network.clone());
        Ok(())
    }

    async fn signer(&self) -> Result<SignerHandle, PortError> {
        let g = self.record("signer");
        fail(&g.signer_error)?;
        let address = g
            .accounts
            .first()
            .copied()
            .ok_or_else(|| PortError::Policy("no accounts".to_owned()))?;
        Ok(SignerHandle {
            address,
            chain_id: g.chain_id,
        })
    }

    async fn send_transaction(&self, tx: &MintTransaction) -> Result<B256, PortError> {
        let mut g = self.record("eth_sendTransaction");
        fail(&g.send_error)?;
        g.sent.push(tx.clone());
        Ok(keccak256(tx.to_rpc_json().to_string()))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        let g = self.record("eth_getTransactionReceipt");
        fail(&g.wait_error)?;
        Ok(TxReceipt {
            transaction_hash: tx_hash,
            status: g.receipt_status,
            block_number: Some(1),
        })
    }

    async fn balance(&self, _account: Address) -> Result<U256, PortError> {
        Ok(self.record("eth_getBalance").balance)
    }

    fn subscribe(&self) -> Result<(), PortError> {
        self.record("subscribe").subscribed = true;
        Ok(())
    }

    fn unsubscribe(&self) -> Result<(), PortError> {
        self.record("unsubscribe").subscribed = false;
        Ok(())
    }

    async fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        Ok(std::mem::take(
            &mut self.script.lock().expect("wallet script").events,
        ))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedChain {
    pub supply: Mutex<Option<U256>>,
    pub owned: Mutex<Option<U256>>,
    pub total_supply_calls: AtomicUsize,
}

impl ScriptedChain {
    pub fn with_supply(supply: u64) -> Self {
        Self {
            supply: Mutex::new(Some(U256::from(supply))),
            owned: Mutex::new(Some(U256::ZERO)),
            total_supply_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn supply_calls(&self) -> usize {
        self.total_supply_calls.load(Ordering::SeqCst)
    }
}

impl PublicChainPort for ScriptedChain {
    async fn total_supply(&self, _contract: &ContractReference) -> Result<U256, PortError> {
        self.total_supply_calls.fetch_add(1, Ordering::SeqCst);
        self.supply
            .lock()
            .expect("chain script")
            .ok_or_else(|| PortError::Transport("connection refused".to_owned()))
    }

    async fn balance_of(
        &self,
        _contract: &ContractReference,
        _owner: Address,
    ) -> Result<U256, PortError> {
        self.owned
            .lock()
            .expect("chain script")
            .ok_or_else(|| PortError::Transport("connection refused".to_owned()))
    }
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub statuses: Vec<StatusMessage>,
    pub controls: Vec<MintControlState>,
    pub supply: Option<U256>,
    pub owned: Option<U256>,
    pub account: Option<Address>,
    pub last_transaction: Option<B256>,
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub inner: Mutex<Recorded>,
}

impl RecordingDisplay {
    pub fn last_status(&self) -> Option<StatusMessage> {
        self.inner
            .lock()
            .expect("display")
            .statuses
            .last()
            .cloned()
    }

    pub fn status_texts(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("display")
            .statuses
            .iter()
            .map(|s| s.text.clone())
            .collect()
    }

    pub fn supply(&self) -> Option<U256> {
        self.inner.lock().expect("display").supply
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.lock().expect("display").account
    }

    pub fn last_control(&self) -> Option<MintControlState> {
        self.inner.lock().expect("display").controls.last().copied()
    }
}

impl DisplayPort for RecordingDisplay {
    fn show_status(&self, status: StatusMessage) {
        self.inner.lock().expect("display").statuses.push(status);
    }

    fn set_mint_control(&self, state: MintControlState) {
        self.inner.lock().expect("display").controls.push(state);
    }

    fn set_total_supply(&self, supply: U256) {
        self.inner.lock().expect("display").supply = Some(supply);
    }

    fn set_owned_count(&self, count: Option<U256>) {
        self.inner.lock().expect("display").owned = count;
    }

    fn set_account(&self, account: Option<Address>) {
        self.inner.lock().expect("display").account = account;
    }

    fn set_last_transaction(&self, tx_hash: Option<B256>) {
        self.inner.lock().expect("display").last_transaction = tx_hash;
    }
}
