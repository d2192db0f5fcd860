use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use sbt_mint_core::domain::BASE_RPC_URL;

pub const ENV_RUNTIME_PROFILE: &str = "SBT_MINT_RUNTIME_PROFILE";
pub const ENV_EIP1193_PROXY_URL: &str = "SBT_MINT_EIP1193_PROXY_URL";
pub const ENV_PUBLIC_RPC_URL: &str = "SBT_MINT_PUBLIC_RPC_URL";
pub const ENV_RPC_TIMEOUT_MS: &str = "SBT_MINT_RPC_TIMEOUT_MS";
pub const ENV_RECEIPT_POLL_INTERVAL_MS: &str = "SBT_MINT_RECEIPT_POLL_INTERVAL_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

impl FromStr for RuntimeProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_RUNTIME_PROFILE,
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintAdapterConfig {
    pub runtime_profile: RuntimeProfile,
    /// HTTP endpoint speaking the EIP-1193 request vocabulary as JSON-RPC.
    /// Native builds only.
    pub eip1193_proxy_url: Option<String>,
    pub public_rpc_url: String,
    pub rpc_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    /// `None` polls until the receipt shows up.
    pub receipt_max_polls: Option<u32>,
}

impl Default for MintAdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            public_rpc_url: BASE_RPC_URL.to_owned(),
            rpc_timeout_ms: 15_000,
            receipt_poll_interval_ms: 2_000,
            receipt_max_polls: None,
        }
    }
}

impl MintAdapterConfig {
    /// Environment overrides on top of [`Default`]. Invalid values are
    /// logged and the defaults kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok()).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring invalid adapter configuration");
            Self::default()
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_RUNTIME_PROFILE) {
            cfg.runtime_profile = raw.parse()?;
        }
        if let Some(url) = lookup(ENV_EIP1193_PROXY_URL).filter(|s| !s.trim().is_empty()) {
            cfg.eip1193_proxy_url = Some(url.trim().to_owned());
        }
        if let Some(url) = lookup(ENV_PUBLIC_RPC_URL).filter(|s| !s.trim().is_empty()) {
            cfg.public_rpc_url = url.trim().to_owned();
        }
        if let Some(raw) = lookup(ENV_RPC_TIMEOUT_MS) {
            cfg.rpc_timeout_ms = parse_millis(ENV_RPC_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RECEIPT_POLL_INTERVAL_MS) {
            cfg.receipt_poll_interval_ms = parse_millis(ENV_RECEIPT_POLL_INTERVAL_MS, &raw)?;
        }
        Ok(cfg)
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
        })
}
