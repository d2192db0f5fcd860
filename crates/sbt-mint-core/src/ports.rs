use std::fmt;

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use crate::domain::{
    ContractReference, MintTransaction, NetworkDescriptor, ProviderEvent, SignerHandle,
    StatusMessage, TxReceipt,
};
use crate::state_machine::MintControlState;

/// EIP-1193 `4001`.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3326 `4902`: the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Normalized shape of whatever a wallet or node throws back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderError {
    pub code: Option<i64>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl ProviderError {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            reason: None,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .reason
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown provider error");
        match self.code {
            Some(code) => write!(f, "{text} (code {code})"),
            None => f.write_str(text),
        }
    }
}

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("{0}")]
    Provider(ProviderError),
}

impl PortError {
    pub fn provider_code(&self) -> Option<i64> {
        match self {
            Self::Provider(e) => e.code,
            _ => None,
        }
    }

    pub fn to_provider_error(&self) -> ProviderError {
        match self {
            Self::Provider(e) => e.clone(),
            // Lands on the "network" entry of the friendly-message table.
            Self::Transport(detail) => {
                ProviderError::with_message(format!("network error: {detail}"))
            }
            other => ProviderError::with_message(other.to_string()),
        }
    }
}

impl From<ProviderError> for PortError {
    fn from(e: ProviderError) -> Self {
        Self::Provider(e)
    }
}

/// Injected wallet: the EIP-1193 request vocabulary plus its two
/// notification streams.
#[allow(async_fn_in_trait)]
pub trait WalletPort {
    fn is_available(&self) -> bool;
    /// Account the wallet already exposes without prompting, if any.
    fn selected_account(&self) -> Option<Address>;
    async fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    async fn chain_id(&self) -> Result<u64, PortError>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError>;
    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError>;
    async fn signer(&self) -> Result<SignerHandle, PortError>;
    async fn send_transaction(&self, tx: &MintTransaction) -> Result<B256, PortError>;
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError>;
    async fn balance(&self, account: Address) -> Result<U256, PortError>;
    fn subscribe(&self) -> Result<(), PortError>;
    fn unsubscribe(&self) -> Result<(), PortError>;
    /// Notifications received since the last drain. Wallets without a push
    /// channel may poll here.
    async fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError>;
}

/// Read-only access to the contract through a public node, no wallet needed.
#[allow(async_fn_in_trait)]
pub trait PublicChainPort {
    async fn total_supply(&self, contract: &ContractReference) -> Result<U256, PortError>;
    async fn balance_of(
        &self,
        contract: &ContractReference,
        owner: Address,
    ) -> Result<U256, PortError>;
}

/// Whatever renders the widget.
pub trait DisplayPort {
    fn show_status(&self, status: StatusMessage);
    fn set_mint_control(&self, state: MintControlState);
    fn set_total_supply(&self, supply: U256);
    fn set_owned_count(&self, count: Option<U256>);
    fn set_account(&self, account: Option<Address>);
    fn set_last_transaction(&self, tx_hash: Option<B256>);
}
