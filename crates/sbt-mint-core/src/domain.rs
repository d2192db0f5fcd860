use alloy::primitives::{address, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::CONTRACT_ABI;

pub const SBT_CONTRACT_ADDRESS: Address = address!("B8EeEd4EC90D0C9B2e35345b0f938F1168065329");
pub const BASE_CHAIN_ID: u64 = 8453;
pub const BASE_RPC_URL: &str = "https://mainnet.base.org";
pub const BASE_EXPLORER_URL: &str = "https://basescan.org";

/// Fee attached to every `mint()` call, in ether.
pub const MINT_FEE_ETHER: &str = "0.000001";
/// [`MINT_FEE_ETHER`] in wei.
pub const MINT_FEE_WEI: U256 = U256::from_limbs([1_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Error,
}

/// Single status line shown under the mint control. Overwritten on every
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network the wallet must be on. Only used to ask the wallet to switch to
/// (or register) the required chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    pub fn base() -> Self {
        Self {
            chain_id: BASE_CHAIN_ID,
            chain_name: "Base".to_owned(),
            native_currency: NativeCurrency {
                name: "ETH".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec![BASE_RPC_URL.to_owned()],
            block_explorer_urls: vec![BASE_EXPLORER_URL.to_owned()],
        }
    }

    pub fn chain_id_hex(&self) -> String {
        format_chain_id(self.chain_id)
    }

    /// Parameter object for `wallet_addEthereumChain` (EIP-3085).
    pub fn add_chain_params(&self) -> Value {
        serde_json::json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": self.native_currency,
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        })
    }

    pub fn explorer_tx_url(&self, tx_hash: B256) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

/// Fixed remote contract: address plus its human-readable interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractReference {
    pub address: Address,
    pub abi: &'static [&'static str],
}

impl ContractReference {
    pub const fn soulbound_token() -> Self {
        Self {
            address: SBT_CONTRACT_ADDRESS,
            abi: CONTRACT_ABI,
        }
    }
}

/// Everything the controller needs to know about where it mints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract: ContractReference,
    pub network: NetworkDescriptor,
    pub mint_fee: U256,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            contract: ContractReference::soulbound_token(),
            network: NetworkDescriptor::base(),
            mint_fee: MINT_FEE_WEI,
        }
    }
}

/// Wallet connection as of its last chain check. `mint` re-checks the live
/// chain before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub chain_id: u64,
}

/// Account the wallet signs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerHandle {
    pub address: Address,
    pub chain_id: u64,
}

/// Contract reference bound to a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractHandle {
    pub contract: ContractReference,
    pub signer: SignerHandle,
}

impl ContractHandle {
    pub fn bind(contract: ContractReference, signer: SignerHandle) -> Self {
        Self { contract, signer }
    }

    pub fn mint_transaction(&self, fee: U256) -> MintTransaction {
        MintTransaction {
            from: self.signer.address,
            to: self.contract.address,
            value: fee,
            data: crate::contract::mint_calldata(),
        }
    }
}

/// The three derived handles. Held as one value so they are only ever set
/// or cleared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandles {
    pub connection: ConnectionHandle,
    pub signer: SignerHandle,
    pub contract: ContractHandle,
}

impl SessionHandles {
    pub fn derive(contract: ContractReference, signer: SignerHandle) -> Self {
        Self {
            connection: ConnectionHandle {
                chain_id: signer.chain_id,
            },
            signer,
            contract: ContractHandle::bind(contract, signer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    handles: Option<SessionHandles>,
    account: Option<Address>,
}

impl Session {
    pub fn establish(&mut self, account: Address, handles: SessionHandles) {
        self.account = Some(account);
        self.handles = Some(handles);
    }

    pub fn set_account(&mut self, account: Address) {
        self.account = Some(account);
    }

    pub fn clear(&mut self) {
        self.handles = None;
        self.account = None;
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_none() && self.account.is_none()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn handles(&self) -> Option<&SessionHandles> {
        self.handles.as_ref()
    }

    pub fn connection(&self) -> Option<&ConnectionHandle> {
        self.handles.as_ref().map(|h| &h.connection)
    }

    pub fn signer(&self) -> Option<&SignerHandle> {
        self.handles.as_ref().map(|h| &h.signer)
    }

    pub fn contract(&self) -> Option<&ContractHandle> {
        self.handles.as_ref().map(|h| &h.contract)
    }
}

/// Payload for `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintTransaction {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl MintTransaction {
    pub fn to_rpc_json(&self) -> Value {
        serde_json::json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "value": format!("{:#x}", self.value),
            "data": self.data.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub status: u64,
    pub block_number: Option<u64>,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEventKind {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
}

/// `0x1234...abcd`: first 6 and last 4 characters of the checksummed address.
pub fn truncate_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_address_keeps_prefix_and_suffix() {
        let addr: Address = "0x1234000000000000000000000000000000005678"
            .parse()
            .expect("address");
        assert_eq!(truncate_address(&addr), "0x1234...5678");
    }

    #[test]
    fn base_chain_id_is_0x2105() {
        assert_eq!(NetworkDescriptor::base().chain_id_hex(), "0x2105");
        assert_eq!(parse_chain_id("0x2105"), Some(BASE_CHAIN_ID));
        assert_eq!(parse_chain_id("8453"), Some(BASE_CHAIN_ID));
        assert_eq!(parse_chain_id("base"), None);
    }

    #[test]
    fn add_chain_params_use_wallet_field_names() {
        let params = NetworkDescriptor::base().add_chain_params();
        assert_eq!(params["chainId"], "0x2105");
        assert_eq!(params["chainName"], "Base");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], BASE_RPC_URL);
        assert_eq!(params["blockExplorerUrls"][0], BASE_EXPLORER_URL);
    }

    #[test]
    fn mint_fee_constant_matches_ether_string() {
        let parsed = alloy::primitives::utils::parse_ether(MINT_FEE_ETHER).expect("parse fee");
        assert_eq!(parsed, MINT_FEE_WEI);
    }

    #[test]
    fn session_handles_are_set_and_cleared_together() {
        let signer = SignerHandle {
            address: Address::repeat_byte(0x11),
            chain_id: BASE_CHAIN_ID,
        };
        let mut session = Session::default();
        assert!(session.is_empty());
        session.establish(
            signer.address,
            SessionHandles::derive(ContractReference::soulbound_token(), signer),
        );
        assert!(session.connection().is_some());
        assert!(session.signer().is_some());
        assert_eq!(
            session.contract().map(|c| c.signer.address),
            Some(signer.address)
        );
        session.clear();
        assert!(session.is_empty());
        assert!(session.contract().is_none());
    }
}
