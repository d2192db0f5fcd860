use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{keccak256, Address, B256, U256};
use serde_json::Value;
use tracing::{debug, warn};

use sbt_mint_core::domain::{format_chain_id, parse_chain_id};
use sbt_mint_core::{
    MintTransaction, NetworkDescriptor, PortError, ProviderError, ProviderEvent,
    ProviderEventKind, SignerHandle, TxReceipt, WalletPort, UNRECOGNIZED_CHAIN_CODE,
};

use crate::MintAdapterConfig;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    config: MintAdapterConfig,
    state: Arc<Mutex<ProviderState>>,
    #[cfg(target_arch = "wasm32")]
    hooks: Arc<Mutex<BrowserHooks>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug)]
struct ProviderState {
    accounts: Vec<Address>,
    selected: Option<Address>,
    chain_id: u64,
    subscribed: bool,
    event_seq: u64,
    events: Vec<ProviderEvent>,
    /// Proxy mode: `accounts` and `chain_id` hold the last polled values.
    synced: bool,
    sim: SimulatedWallet,
}

/// In-memory wallet answering the request vocabulary in deterministic mode.
#[derive(Debug)]
struct SimulatedWallet {
    authorized: bool,
    known_chains: Vec<u64>,
    balance: U256,
    nonce: u64,
    next_receipt_status: u64,
    receipts: HashMap<B256, u64>,
    scripted_failures: Vec<(String, ProviderError)>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            accounts: vec![Address::with_last_byte(1)],
            selected: None,
            chain_id: 1,
            subscribed: false,
            event_seq: 0,
            events: Vec::new(),
            synced: false,
            sim: SimulatedWallet {
                authorized: false,
                known_chains: vec![1],
                balance: U256::from(1_000_000_000_000_000_000u64),
                nonce: 0,
                next_receipt_status: 1,
                receipts: HashMap::new(),
                scripted_failures: Vec::new(),
            },
        }
    }
}

impl ProviderState {
    fn push_event(&mut self, kind: ProviderEventKind) {
        if !self.subscribed {
            return;
        }
        self.event_seq = self.event_seq.saturating_add(1);
        let sequence = self.event_seq;
        self.events.push(ProviderEvent { sequence, kind });
    }

    /// Records a polled wallet snapshot and queues a notification for each
    /// field that moved. The first snapshot only sets the baseline.
    fn observe(&mut self, accounts: Vec<Address>, chain_id: u64) {
        if self.synced {
            if self.accounts != accounts {
                self.push_event(ProviderEventKind::AccountsChanged(accounts.clone()));
            }
            if self.chain_id != chain_id {
                self.push_event(ProviderEventKind::ChainChanged(chain_id));
            }
        }
        self.synced = true;
        self.selected = accounts.first().copied();
        self.accounts = accounts;
        self.chain_id = chain_id;
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct BrowserHooks {
    accounts_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    chain_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(MintAdapterConfig::from_env())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: MintAdapterConfig) -> Self {
        // In the browser the injected provider is the only runtime; its
        // absence is reported to the user rather than simulated.
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider().is_ok() {
            ProviderMode::Browser
        } else {
            ProviderMode::Disabled("window.ethereum missing".to_owned())
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            ProviderMode::Proxy(ProxyRuntime {
                base_url: base_url.clone(),
                client: crate::jsonrpc::build_client(config.rpc_timeout_ms),
            })
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        Self::from_parts(mode, config)
    }

    /// In-memory wallet regardless of configuration.
    pub fn deterministic(config: MintAdapterConfig) -> Self {
        Self::from_parts(ProviderMode::Deterministic, config)
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::from_parts(
            ProviderMode::Disabled(reason.into()),
            MintAdapterConfig::default(),
        )
    }

    fn from_parts(mode: ProviderMode, config: MintAdapterConfig) -> Self {
        debug!(mode = mode_name(&mode), "eip1193 adapter initialized");
        Self {
            mode,
            config,
            state: Arc::new(Mutex::new(ProviderState::default())),
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        mode_name(&self.mode)
    }

    pub fn pending_event_count(&self) -> usize {
        self.lock_state().map(|g| g.events.len()).unwrap_or(0)
    }

    /// A proxied wallet has no push channel: while subscribed, every drain
    /// polls it and turns differences into notifications.
    pub fn polls_for_events(&self) -> bool {
        let proxied = match &self.mode {
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => true,
            _ => false,
        };
        proxied && self.lock_state().map(|g| g.subscribed).unwrap_or(false)
    }

    async fn poll_wallet_state(&self) -> Result<(), PortError> {
        let accounts = self.rpc("eth_accounts", serde_json::json!([])).await?;
        let accounts = parse_accounts("eth_accounts", &accounts)?;
        let chain_id = self.rpc("eth_chainId", serde_json::json!([])).await?;
        let chain_id = json_chain_id_to_u64(&chain_id)?;
        self.lock_state()?.observe(accounts, chain_id);
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Policy(format!("provider lock poisoned: {e}")))
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.accounts = accounts.clone();
        g.selected = accounts.first().copied();
        g.push_event(ProviderEventKind::AccountsChanged(accounts));
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.chain_id = chain_id;
        g.push_event(ProviderEventKind::ChainChanged(chain_id));
        Ok(())
    }

    /// Next deterministic call of `method` fails with `error`.
    pub fn debug_fail_next(&self, method: &str, error: ProviderError) -> Result<(), PortError> {
        self.lock_state()?
            .sim
            .scripted_failures
            .push((method.to_owned(), error));
        Ok(())
    }

    pub fn debug_set_receipt_status(&self, status: u64) -> Result<(), PortError> {
        self.lock_state()?.sim.next_receipt_status = status;
        Ok(())
    }

    pub fn debug_set_balance(&self, balance: U256) -> Result<(), PortError> {
        self.lock_state()?.sim.balance = balance;
        Ok(())
    }

    pub fn debug_add_known_chain(&self, chain_id: u64) -> Result<(), PortError> {
        self.lock_state()?.sim.known_chains.push(chain_id);
        Ok(())
    }

    /// Marks the simulated wallet as previously authorized so it exposes a
    /// selected account at startup.
    pub fn debug_authorize(&self) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.sim.authorized = true;
        g.selected = g.accounts.first().copied();
        Ok(())
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, PortError> {
        match &self.mode {
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => self.simulate(method, &params),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => {
                crate::jsonrpc::call(&proxy.client, &proxy.base_url, method, params).await
            }
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => self.wasm_request(method, params).await,
        }
    }

    fn simulate(&self, method: &str, params: &Value) -> Result<Value, PortError> {
        let mut g = self.lock_state()?;
        if let Some(pos) = g
            .sim
            .scripted_failures
            .iter()
            .position(|(m, _)| m == method)
        {
            let (_, err) = g.sim.scripted_failures.remove(pos);
            return Err(PortError::Provider(err));
        }

        match method {
            "eth_requestAccounts" => {
                g.sim.authorized = true;
                g.selected = g.accounts.first().copied();
                Ok(accounts_json(&g.accounts))
            }
            "eth_accounts" => {
                if g.sim.authorized {
                    Ok(accounts_json(&g.accounts))
                } else {
                    Ok(serde_json::json!([]))
                }
            }
            "eth_chainId" => Ok(Value::String(format_chain_id(g.chain_id))),
            "wallet_switchEthereumChain" => {
                let chain_id = chain_id_param(params)?;
                if !g.sim.known_chains.contains(&chain_id) {
                    return Err(PortError::Provider(ProviderError::with_code(
                        UNRECOGNIZED_CHAIN_CODE,
                        format!(
                            "Unrecognized chain ID \"{}\". Try adding the chain using wallet_addEthereumChain first.",
                            format_chain_id(chain_id)
                        ),
                    )));
                }
                if g.chain_id != chain_id {
                    g.chain_id = chain_id;
                    g.push_event(ProviderEventKind::ChainChanged(chain_id));
                }
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let chain_id = chain_id_param(params)?;
                if !g.sim.known_chains.contains(&chain_id) {
                    g.sim.known_chains.push(chain_id);
                }
                if g.chain_id != chain_id {
                    g.chain_id = chain_id;
                    g.push_event(ProviderEventKind::ChainChanged(chain_id));
                }
                Ok(Value::Null)
            }
            "eth_sendTransaction" => {
                let tx = params
                    .get(0)
                    .ok_or_else(|| PortError::Validation("missing transaction object".to_owned()))?;
                let value = tx
                    .get("value")
                    .and_then(Value::as_str)
                    .map(U256::from_str)
                    .transpose()
                    .map_err(|e| PortError::Validation(format!("invalid tx value: {e}")))?
                    .unwrap_or_default();
                if value > g.sim.balance {
                    return Err(PortError::Provider(ProviderError::with_code(
                        -32000,
                        "insufficient funds for gas * price + value",
                    )));
                }
                g.sim.balance -= value;
                g.sim.nonce += 1;
                let hash = keccak256(format!("{}:{}", g.sim.nonce, tx));
                let status = g.sim.next_receipt_status;
                g.sim.receipts.insert(hash, status);
                Ok(Value::String(hash.to_string()))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = params
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("missing tx hash".to_owned()))?
                    .parse()
                    .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))?;
                Ok(match g.sim.receipts.get(&hash) {
                    Some(status) => serde_json::json!({
                        "transactionHash": hash.to_string(),
                        "status": format!("{status:#x}"),
                        "blockNumber": format!("{:#x}", g.sim.nonce),
                    }),
                    None => Value::Null,
                })
            }
            "eth_getBalance" => Ok(Value::String(format!("{:#x}", g.sim.balance))),
            _ => Err(PortError::NotImplemented(
                "method not supported by the deterministic wallet",
            )),
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        use serde::Serialize;
        use wasm_bindgen::JsCast;

        let provider = browser_provider()?;
        let request_fn = get_prop(&provider, "request")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or(PortError::NotImplemented(
                "window.ethereum.request is unavailable",
            ))?;

        let request = serde_json::json!({
            "method": method,
            "params": params,
        });
        // Plain JS objects, not Maps: wallets reject Map parameters.
        let request_js = request
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| PortError::Validation(format!("failed to encode wasm request: {e}")))?;
        let promise_js = request_fn.call1(&provider, &request_js).map_err(|e| {
            PortError::Transport(format!("provider request dispatch failed: {e:?}"))
        })?;
        let promise = promise_js.dyn_into::<js_sys::Promise>().map_err(|_| {
            PortError::Validation("provider request did not return Promise".to_owned())
        })?;
        let result_js = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| PortError::Provider(provider_error_from_js(&e)))?;
        serde_wasm_bindgen::from_value(result_js)
            .map_err(|e| PortError::Validation(format!("failed to decode wasm response: {e}")))
    }

    #[cfg(target_arch = "wasm32")]
    fn refresh_browser_snapshot(&self) {
        if let Err(e) = self.read_browser_snapshot() {
            debug!(error = %e, "provider snapshot unavailable");
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn read_browser_snapshot(&self) -> Result<(), PortError> {
        if !matches!(self.mode, ProviderMode::Browser) {
            return Ok(());
        }
        let provider = browser_provider()?;
        let selected = get_prop(&provider, "selectedAddress")?;
        let chain = get_prop(&provider, "chainId")?;

        let mut g = self.lock_state()?;
        g.selected = selected.as_string().and_then(|s| s.parse().ok());
        if let Some(chain_id) = chain.as_string().and_then(|s| parse_chain_id(&s)) {
            g.chain_id = chain_id;
        }
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn register_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{closure::Closure, JsCast, JsValue};

        let provider = browser_provider()?;
        let on_fn = provider_fn(&provider, &["on", "addListener"])?;

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Policy(format!("provider hooks lock poisoned: {e}")))?;
        if hooks.accounts_changed.is_some() && hooks.chain_changed.is_some() {
            return Ok(());
        }

        let state_for_accounts = Arc::clone(&self.state);
        let accounts_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let mut accounts = Vec::new();
            if js_sys::Array::is_array(&value) {
                for item in js_sys::Array::from(&value).iter() {
                    if let Some(addr) = item.as_string().and_then(|s| s.parse::<Address>().ok()) {
                        accounts.push(addr);
                    }
                }
            }
            if let Ok(mut g) = state_for_accounts.lock() {
                g.accounts = accounts.clone();
                g.selected = accounts.first().copied();
                g.push_event(ProviderEventKind::AccountsChanged(accounts));
            }
        });

        let state_for_chain = Arc::clone(&self.state);
        let chain_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let Some(chain_id) = value.as_string().and_then(|s| parse_chain_id(&s)) else {
                return;
            };
            if let Ok(mut g) = state_for_chain.lock() {
                g.chain_id = chain_id;
                g.push_event(ProviderEventKind::ChainChanged(chain_id));
            }
        });

        on_fn
            .call2(
                &provider,
                &JsValue::from_str("accountsChanged"),
                accounts_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register accountsChanged failed: {e:?}")))?;
        on_fn
            .call2(
                &provider,
                &JsValue::from_str("chainChanged"),
                chain_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register chainChanged failed: {e:?}")))?;

        hooks.accounts_changed = Some(accounts_cb);
        hooks.chain_changed = Some(chain_cb);
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn remove_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{JsCast, JsValue};

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Policy(format!("provider hooks lock poisoned: {e}")))?;
        let accounts_cb = hooks.accounts_changed.take();
        let chain_cb = hooks.chain_changed.take();
        if accounts_cb.is_none() && chain_cb.is_none() {
            return Ok(());
        }

        let provider = browser_provider()?;
        let remove_fn = provider_fn(&provider, &["removeListener", "off"])?;
        for (event, cb) in [("accountsChanged", accounts_cb), ("chainChanged", chain_cb)] {
            if let Some(cb) = cb {
                remove_fn
                    .call2(
                        &provider,
                        &JsValue::from_str(event),
                        cb.as_ref().unchecked_ref(),
                    )
                    .map_err(|e| {
                        PortError::Transport(format!("remove {event} listener failed: {e:?}"))
                    })?;
            }
        }
        Ok(())
    }
}

impl WalletPort for Eip1193Adapter {
    fn is_available(&self) -> bool {
        match &self.mode {
            ProviderMode::Disabled(_) => false,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => browser_provider().is_ok(),
            _ => true,
        }
    }

    fn selected_account(&self) -> Option<Address> {
        #[cfg(target_arch = "wasm32")]
        self.refresh_browser_snapshot();
        self.lock_state().ok().and_then(|g| g.selected)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self.rpc("eth_requestAccounts", serde_json::json!([])).await?;
        let accounts = parse_accounts("eth_requestAccounts", &result)?;
        {
            let mut g = self.lock_state()?;
            g.accounts = accounts.clone();
            g.selected = accounts.first().copied();
        }
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        let result = self.rpc("eth_chainId", serde_json::json!([])).await?;
        let chain_id = json_chain_id_to_u64(&result)?;
        self.lock_state()?.chain_id = chain_id;
        Ok(chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        self.rpc(
            "wallet_switchEthereumChain",
            serde_json::json!([{ "chainId": format_chain_id(chain_id) }]),
        )
        .await?;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        self.rpc(
            "wallet_addEthereumChain",
            serde_json::json!([network.add_chain_params()]),
        )
        .await?;
        Ok(())
    }

    async fn signer(&self) -> Result<SignerHandle, PortError> {
        let result = self.rpc("eth_accounts", serde_json::json!([])).await?;
        let address = parse_accounts("eth_accounts", &result)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                PortError::Policy("no provider accounts available; unlock/connect wallet".to_owned())
            })?;
        let chain_id = self.chain_id().await?;
        Ok(SignerHandle { address, chain_id })
    }

    async fn send_transaction(&self, tx: &MintTransaction) -> Result<B256, PortError> {
        let result = self
            .rpc("eth_sendTransaction", serde_json::json!([tx.to_rpc_json()]))
            .await?;
        let hash = result.as_str().ok_or_else(|| {
            PortError::Validation("eth_sendTransaction must return tx hash".to_owned())
        })?;
        hash.parse::<B256>()
            .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        let started = web_time::Instant::now();
        let mut polls: u32 = 0;
        loop {
            let result = self
                .rpc(
                    "eth_getTransactionReceipt",
                    serde_json::json!([tx_hash.to_string()]),
                )
                .await?;
            if !result.is_null() {
                let receipt = parse_receipt(&result)?;
                debug!(
                    %tx_hash,
                    status = receipt.status,
                    polls,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "receipt available"
                );
                return Ok(receipt);
            }
            polls = polls.saturating_add(1);
            if let Some(max) = self.config.receipt_max_polls {
                if polls >= max {
                    return Err(PortError::Transport(format!(
                        "receipt for {tx_hash} not available after {polls} polls"
                    )));
                }
            }
            sleep_ms(self.config.receipt_poll_interval_ms).await;
        }
    }

    async fn balance(&self, account: Address) -> Result<U256, PortError> {
        let result = self
            .rpc(
                "eth_getBalance",
                serde_json::json!([account.to_string(), "latest"]),
            )
            .await?;
        let raw = result.as_str().ok_or_else(|| {
            PortError::Validation("eth_getBalance must return a quantity".to_owned())
        })?;
        U256::from_str(raw).map_err(|e| PortError::Validation(format!("invalid balance: {e}")))
    }

    fn subscribe(&self) -> Result<(), PortError> {
        match &self.mode {
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => self.register_browser_hooks()?,
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => debug!("proxied wallet notifications are polled on drain"),
            ProviderMode::Deterministic => {}
        }
        self.lock_state()?.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&self) -> Result<(), PortError> {
        #[cfg(target_arch = "wasm32")]
        self.remove_browser_hooks()?;
        let mut g = self.lock_state()?;
        g.subscribed = false;
        g.synced = false;
        g.events.clear();
        Ok(())
    }

    async fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        if self.polls_for_events() {
            if let Err(e) = self.poll_wallet_state().await {
                warn!(error = %e, "polling proxied wallet failed");
            }
        }
        Ok(std::mem::take(&mut self.lock_state()?.events))
    }
}

fn mode_name(mode: &ProviderMode) -> &'static str {
    match mode {
        ProviderMode::Disabled(_) => "disabled",
        ProviderMode::Deterministic => "deterministic",
        #[cfg(not(target_arch = "wasm32"))]
        ProviderMode::Proxy(_) => "proxy",
        #[cfg(target_arch = "wasm32")]
        ProviderMode::Browser => "browser",
    }
}

fn accounts_json(accounts: &[Address]) -> Value {
    Value::Array(
        accounts
            .iter()
            .map(|a| Value::String(a.to_string()))
            .collect(),
    )
}

fn parse_accounts(method: &str, value: &Value) -> Result<Vec<Address>, PortError> {
    let arr = value
        .as_array()
        .ok_or_else(|| PortError::Validation(format!("{method}: array expected")))?;
    arr.iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| PortError::Validation(format!("{method}: string expected")))?
                .parse::<Address>()
                .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
        })
        .collect()
}

fn chain_id_param(params: &Value) -> Result<u64, PortError> {
    params
        .get(0)
        .and_then(|p| p.get("chainId"))
        .ok_or_else(|| PortError::Validation("missing chainId parameter".to_owned()))
        .and_then(json_chain_id_to_u64)
}

fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id(s).ok_or_else(|| PortError::Validation(format!("invalid chain id: {s}")))
}

fn parse_quantity(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_str).and_then(parse_chain_id)
}

fn parse_receipt(value: &Value) -> Result<TxReceipt, PortError> {
    let transaction_hash: B256 = value
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| PortError::Validation("receipt missing transactionHash".to_owned()))?
        .parse()
        .map_err(|e| PortError::Validation(format!("invalid receipt hash: {e}")))?;
    let status = parse_quantity(value.get("status"))
        .ok_or_else(|| PortError::Validation("receipt missing status".to_owned()))?;
    Ok(TxReceipt {
        transaction_hash,
        status,
        block_number: parse_quantity(value.get("blockNumber")),
    })
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep_ms(ms: u64) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
                .ok()
        });
        if scheduled.is_none() {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn provider_fn(
    provider: &wasm_bindgen::JsValue,
    names: &[&str],
) -> Result<js_sys::Function, PortError> {
    use wasm_bindgen::JsCast;

    names
        .iter()
        .find_map(|name| {
            get_prop(provider, name)
                .ok()
                .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
        })
        .ok_or_else(|| PortError::Validation(format!("provider does not expose {names:?}")))
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

/// Rejections from injected wallets are plain objects (`{code, message}`),
/// ethers-style errors (`reason`) or bare strings.
#[cfg(target_arch = "wasm32")]
fn provider_error_from_js(value: &wasm_bindgen::JsValue) -> ProviderError {
    let text = |key: &str| get_prop(value, key).ok().and_then(|v| v.as_string());
    let code = get_prop(value, "code")
        .ok()
        .and_then(|v| v.as_f64())
        .map(|n| n as i64);
    let mut err = ProviderError {
        code,
        reason: text("reason"),
        message: text("message"),
    };
    if err.reason.is_none() && err.message.is_none() {
        err.message = value.as_string().or_else(|| Some(format!("{value:?}")));
    }
    err
}
