pub mod contract;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod state_machine;

pub use controller::{ConnectOutcome, MintOutcome, WalletSessionController};
pub use domain::{
    truncate_address, ConnectionHandle, ContractHandle, ContractReference, Deployment,
    MintTransaction, NativeCurrency, NetworkDescriptor, ProviderEvent, ProviderEventKind, Session,
    SessionHandles, Severity, SignerHandle, StatusMessage, TxReceipt, BASE_CHAIN_ID,
    MINT_FEE_WEI,
};
pub use errors::{parse_error, ERROR_MESSAGES, UNKNOWN_ERROR};
pub use ports::{
    DisplayPort, PortError, ProviderError, PublicChainPort, WalletPort, UNRECOGNIZED_CHAIN_CODE,
    USER_REJECTED_CODE,
};
pub use state_machine::{
    control_transition, ControlAction, MintControlState, StateTransition, TransitionError,
};
