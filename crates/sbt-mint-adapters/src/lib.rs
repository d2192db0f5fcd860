pub mod config;
pub mod eip1193;
mod jsonrpc;
pub mod public_rpc;
pub mod view;

pub use config::{ConfigError, MintAdapterConfig, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
pub use jsonrpc::provider_error_from_json;
pub use public_rpc::PublicRpcAdapter;
pub use view::{SharedView, ViewSnapshot};
