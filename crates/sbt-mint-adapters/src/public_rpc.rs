use alloy::primitives::{Address, Bytes, U256};
use tracing::debug;

use sbt_mint_core::contract::{
    balance_of_calldata, decode_balance_of, decode_total_supply, total_supply_calldata,
};
use sbt_mint_core::{ContractReference, PortError, PublicChainPort};

use crate::MintAdapterConfig;

/// Read-only contract queries against a public node over JSON-RPC.
#[derive(Debug, Clone)]
pub struct PublicRpcAdapter {
    url: String,
    client: reqwest::Client,
}

impl Default for PublicRpcAdapter {
    fn default() -> Self {
        Self::with_config(&MintAdapterConfig::from_env())
    }
}

impl PublicRpcAdapter {
    pub fn with_config(config: &MintAdapterConfig) -> Self {
        Self {
            url: config.public_rpc_url.clone(),
            client: crate::jsonrpc::build_client(config.rpc_timeout_ms),
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self::with_config(&MintAdapterConfig {
            public_rpc_url: url.into(),
            ..MintAdapterConfig::default()
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, PortError> {
        let params = serde_json::json!([
            {
                "to": to.to_string(),
                "data": data.to_string(),
            },
            "latest"
        ]);
        let result = crate::jsonrpc::call(&self.client, &self.url, "eth_call", params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| PortError::Validation(format!("eth_call returned {result}")))?;
        raw.parse::<Bytes>()
            .map_err(|e| PortError::Validation(format!("invalid eth_call result: {e}")))
    }
}

impl PublicChainPort for PublicRpcAdapter {
    async fn total_supply(&self, contract: &ContractReference) -> Result<U256, PortError> {
        let data = self.eth_call(contract.address, total_supply_calldata()).await?;
        let supply = decode_total_supply(&data)
            .map_err(|e| PortError::Validation(format!("totalSupply decode failed: {e}")))?;
        debug!(%supply, url = %self.url, "total supply fetched");
        Ok(supply)
    }

    async fn balance_of(
        &self,
        contract: &ContractReference,
        owner: Address,
    ) -> Result<U256, PortError> {
        let data = self.eth_call(contract.address, balance_of_calldata(owner)).await?;
        decode_balance_of(&data)
            .map_err(|e| PortError::Validation(format!("balanceOf decode failed: {e}")))
    }
}
