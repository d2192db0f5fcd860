use alloy::primitives::{utils::format_ether, Address, U256};
use tracing::{debug, info, warn};

use crate::domain::{
    truncate_address, ContractHandle, Deployment, MintTransaction, ProviderEventKind, Session,
    SessionHandles, StatusMessage, TxReceipt,
};
use crate::errors::parse_error;
use crate::ports::{
    DisplayPort, PortError, ProviderError, PublicChainPort, WalletPort, UNRECOGNIZED_CHAIN_CODE,
};
use crate::state_machine::{control_transition, ControlAction, MintControlState};

pub const WALLET_MISSING_MESSAGE: &str = "Please install MetaMask!";
pub const TX_FAILED_MESSAGE: &str = "Transaction failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    WalletMissing,
    Connected(Address),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintOutcome {
    /// No contract handle yet: a connection was attempted instead.
    ConnectAttempted(ConnectOutcome),
    /// The control does not accept clicks in its current state.
    Ignored(MintControlState),
    Minted(TxReceipt),
    Failed(String),
}

/// Owns the session and sequences every user-facing operation against the
/// wallet, the public node and the display.
pub struct WalletSessionController<W, R, D>
where
    W: WalletPort,
    R: PublicChainPort,
    D: DisplayPort,
{
    pub wallet: W,
    pub public_chain: R,
    pub display: D,
    deployment: Deployment,
    session: Session,
    control: MintControlState,
}

impl<W, R, D> WalletSessionController<W, R, D>
where
    W: WalletPort,
    R: PublicChainPort,
    D: DisplayPort,
{
    pub fn new(wallet: W, public_chain: R, display: D) -> Self {
        Self::with_deployment(wallet, public_chain, display, Deployment::default())
    }

    pub fn with_deployment(wallet: W, public_chain: R, display: D, deployment: Deployment) -> Self {
        Self {
            wallet,
            public_chain,
            display,
            deployment,
            session: Session::default(),
            control: MintControlState::Disconnected,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn control(&self) -> MintControlState {
        self.control
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Page-load sequence: supply, notification streams, then a silent
    /// reconnect when the wallet already exposes an account.
    pub async fn initialize(&mut self) {
        self.display.set_mint_control(self.control);
        self.fetch_public_supply().await;

        if !self.wallet.is_available() {
            debug!("no wallet provider present at startup");
            return;
        }
        if let Err(e) = self.wallet.subscribe() {
            warn!(error = %e, "wallet notification subscription failed");
        }
        if self.wallet.selected_account().is_some() {
            self.connect().await;
        }
    }

    pub fn teardown(&mut self) {
        if let Err(e) = self.wallet.unsubscribe() {
            warn!(error = %e, "wallet notification unsubscribe failed");
        }
    }

    /// Best effort: failures are logged and the displayed value is kept.
    pub async fn fetch_public_supply(&self) -> Option<U256> {
        match self.public_chain.total_supply(&self.deployment.contract).await {
            Ok(supply) => {
                self.display.set_total_supply(supply);
                Some(supply)
            }
            Err(e) => {
                warn!(error = %e, "could not fetch supply");
                None
            }
        }
    }

    pub async fn fetch_owned_count(&self) -> Option<U256> {
        let owner = self.session.account()?;
        match self.public_chain.balance_of(&self.deployment.contract, owner).await {
            Ok(count) => {
                self.display.set_owned_count(Some(count));
                Some(count)
            }
            Err(e) => {
                warn!(error = %e, %owner, "could not fetch token balance");
                None
            }
        }
    }

    pub async fn connect(&mut self) -> ConnectOutcome {
        if !self.wallet.is_available() {
            self.display.show_status(StatusMessage::error(WALLET_MISSING_MESSAGE));
            return ConnectOutcome::WalletMissing;
        }

        match self.establish_session().await {
            Ok((account, handles)) => {
                self.session.establish(account, handles);
                self.apply(ControlAction::Connect);
                self.display.set_account(Some(account));
                self.display.show_status(StatusMessage::info(format!(
                    "Connected: {}",
                    truncate_address(&account)
                )));
                info!(%account, chain_id = handles.connection.chain_id, "wallet connected");
                ConnectOutcome::Connected(account)
            }
            Err(e) => {
                warn!(error = %e, "wallet connection failed");
                let message = parse_error(&e.to_provider_error());
                self.display.show_status(StatusMessage::error(format!(
                    "Connection failed: {message}"
                )));
                ConnectOutcome::Failed(message)
            }
        }
    }

    // Nothing is written to the session until every step has succeeded.
    async fn establish_session(&self) -> Result<(Address, SessionHandles), PortError> {
        let accounts = self.wallet.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| PortError::Validation("wallet returned no accounts".to_owned()))?;
        self.ensure_network().await?;
        let signer = self.wallet.signer().await?;
        Ok((account, SessionHandles::derive(self.deployment.contract, signer)))
    }

    async fn ensure_network(&self) -> Result<(), PortError> {
        let network = &self.deployment.network;
        match self.wallet.switch_chain(network.chain_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.provider_code() == Some(UNRECOGNIZED_CHAIN_CODE) => {
                info!(chain_id = network.chain_id, "wallet does not know the chain, adding it");
                self.wallet.add_chain(network).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn mint(&mut self) -> MintOutcome {
        let Some(contract) = self.session.contract().copied() else {
            return MintOutcome::ConnectAttempted(self.connect().await);
        };
        if !self.control.is_enabled() {
            debug!(state = ?self.control, "mint control is disabled");
            return MintOutcome::Ignored(self.control);
        }

        // The fee must never be paid on another chain.
        let contract = match self.ensure_required_chain(contract).await {
            Ok(contract) => contract,
            Err(e) => {
                warn!(error = %e, "mint aborted before sending");
                let message = parse_error(&e.to_provider_error());
                self.display.show_status(StatusMessage::error(format!("Mint failed: {message}")));
                return MintOutcome::Failed(message);
            }
        };

        self.apply(ControlAction::SubmitMint);
        self.display.show_status(StatusMessage::info("Sending transaction..."));

        let tx = contract.mint_transaction(self.deployment.mint_fee);
        match self.submit_mint(&tx).await {
            Ok(receipt) => {
                info!(tx_hash = %receipt.transaction_hash, "mint confirmed");
                self.display.show_status(StatusMessage::info("Successfully minted your SBT!"));
                self.apply(ControlAction::MintConfirmed);
                self.fetch_public_supply().await;
                MintOutcome::Minted(receipt)
            }
            Err(e) => {
                warn!(error = %e, "mint failed");
                let message = parse_error(&e.to_provider_error());
                self.display.show_status(StatusMessage::error(format!("Mint failed: {message}")));
                self.apply(ControlAction::MintFailed);
                MintOutcome::Failed(message)
            }
        }
    }

    /// Switches the wallet back when it left the required chain after
    /// connecting, then re-derives the handles for the live chain.
    async fn ensure_required_chain(
        &mut self,
        contract: ContractHandle,
    ) -> Result<ContractHandle, PortError> {
        let required = self.deployment.network.chain_id;
        let current = self.wallet.chain_id().await?;
        if current == required && contract.signer.chain_id == required {
            return Ok(contract);
        }

        info!(current, required, "wallet left the required chain, switching back");
        self.ensure_network().await?;
        let signer = self.wallet.signer().await?;
        if signer.chain_id != required {
            return Err(PortError::Policy(format!(
                "wallet is on chain {} instead of {required}",
                signer.chain_id
            )));
        }
        let handles = SessionHandles::derive(self.deployment.contract, signer);
        self.session.establish(signer.address, handles);
        Ok(handles.contract)
    }

    async fn submit_mint(&self, tx: &MintTransaction) -> Result<TxReceipt, PortError> {
        let tx_hash = self.wallet.send_transaction(tx).await?;
        self.display.set_last_transaction(Some(tx_hash));
        self.display.show_status(StatusMessage::info("Waiting for confirmation..."));

        let receipt = self.wallet.wait_for_receipt(tx_hash).await?;
        if !receipt.is_success() {
            return Err(ProviderError::with_message(TX_FAILED_MESSAGE).into());
        }
        Ok(receipt)
    }

    /// Shows the account's native balance. Silent when there is no session
    /// or the wallet cannot answer.
    pub async fn display_balance(&self) -> Option<String> {
        let account = self.session.account()?;
        self.session.connection()?;
        let wei = match self.wallet.balance(account).await {
            Ok(wei) => wei,
            Err(e) => {
                debug!(error = %e, "balance lookup failed");
                return None;
            }
        };
        let ether: f64 = format_ether(wei).parse().ok()?;
        let text = format!("{ether:.6}");
        self.display.show_status(StatusMessage::info(format!("Balance: {text} ETH")));
        Some(text)
    }

    /// Applies every queued wallet notification in order.
    pub async fn pump_events(&mut self) -> usize {
        let events = match self.wallet.drain_events().await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "draining wallet notifications failed");
                return 0;
            }
        };
        let count = events.len();
        for event in events {
            debug!(sequence = event.sequence, "wallet notification");
            match event.kind {
                ProviderEventKind::AccountsChanged(accounts) => {
                    self.handle_accounts_changed(&accounts).await
                }
                ProviderEventKind::ChainChanged(chain_id) => self.handle_chain_changed(chain_id),
            }
        }
        count
    }

    pub async fn handle_accounts_changed(&mut self, accounts: &[Address]) {
        let Some(&account) = accounts.first() else {
            self.disconnect();
            self.display.show_status(StatusMessage::info("Wallet disconnected"));
            return;
        };
        if self.session.account() == Some(account) {
            return;
        }

        // Handles bound to the previous account must not sign for the new one.
        if self.session.handles().is_some() {
            match self.wallet.signer().await {
                Ok(signer) => self.session.establish(
                    account,
                    SessionHandles::derive(self.deployment.contract, signer),
                ),
                Err(e) => {
                    warn!(error = %e, %account, "re-deriving signer failed");
                    let message = parse_error(&e.to_provider_error());
                    self.disconnect();
                    self.display.show_status(StatusMessage::error(format!(
                        "Connection failed: {message}"
                    )));
                    return;
                }
            }
        } else {
            self.session.set_account(account);
        }

        self.display.set_account(Some(account));
        self.display.set_owned_count(None);
        self.display.show_status(StatusMessage::info(format!(
            "Switched to: {}",
            truncate_address(&account)
        )));
    }

    pub fn handle_chain_changed(&mut self, chain_id: u64) {
        let network = &self.deployment.network;
        let status = if chain_id != network.chain_id {
            StatusMessage::error(format!("Please switch to {} network", network.chain_name))
        } else {
            StatusMessage::info(format!("Connected to {} network", network.chain_name))
        };
        self.display.show_status(status);
    }

    fn disconnect(&mut self) {
        self.session.clear();
        self.apply(ControlAction::Disconnect);
        self.display.set_account(None);
        self.display.set_owned_count(None);
    }

    fn apply(&mut self, action: ControlAction) {
        match control_transition(self.control, action) {
            Ok((to, transition)) => {
                debug!(
                    from = ?transition.from,
                    to = ?transition.to,
                    reason = transition.reason,
                    "mint control transition"
                );
                self.control = to;
                self.display.set_mint_control(to);
            }
            Err(e) => warn!(error = %e, "ignoring mint control transition"),
        }
    }
}
