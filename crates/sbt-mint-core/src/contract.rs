use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

alloy::sol! {
    interface ISoulboundToken {
        function mint() external payable;
        function MINT_FEE() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// Human-readable interface of the soul-bound token contract.
pub const CONTRACT_ABI: &[&str] = &[
    "function mint() external payable",
    "function MINT_FEE() view returns (uint256)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address) view returns (uint256)",
];

pub fn mint_calldata() -> Bytes {
    Bytes::from(ISoulboundToken::mintCall {}.abi_encode())
}

pub fn total_supply_calldata() -> Bytes {
    Bytes::from(ISoulboundToken::totalSupplyCall {}.abi_encode())
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    Bytes::from(ISoulboundToken::balanceOfCall { owner }.abi_encode())
}

pub fn decode_total_supply(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    Ok(ISoulboundToken::totalSupplyCall::abi_decode_returns(data, true)?._0)
}

pub fn decode_balance_of(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    Ok(ISoulboundToken::balanceOfCall::abi_decode_returns(data, true)?._0)
}
