//! Chain access for the tree registry.
//!
//! The registry only ever talks to the chain through three seams:
//! [`RpcTransport`] (raw JSON-RPC, backed by an injected wallet in the browser
//! or a scripted double in tests), [`WalletProvider`] (authorization, accounts,
//! balance) and [`TreeContract`] (the address + ABI bound tree NFT contract).
//!
//! Everything here runs on a single-threaded executor, so the traits do not
//! require `Send` futures.

mod abi;
mod error;
mod rpc;
mod units;

pub use abi::TreeAbi;
pub use alloy_primitives::U256;
pub use error::{ChainError, Result};
pub use rpc::{ReceiptPolling, RpcTreeContract, RpcWallet};
pub use units::{format_balance, parse_address, parse_quantity};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tn_api_types::{ContractAddress, MintReceipt, MintRequest, TokenIdMode, TreeRecord, WalletAddress};

/// A JSON-RPC endpoint in the EIP-1193 `request({ method, params })` shape.
#[async_trait(?Send)]
pub trait RpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Suspend the caller between receipt polls.
    async fn pause(&self, duration: Duration);
}

#[async_trait(?Send)]
pub trait WalletProvider {
    type Contract: TreeContract;

    /// Ask the wallet to authorize this page. May wait on the user.
    async fn enable(&self) -> Result<()>;

    async fn accounts(&self) -> Result<Vec<WalletAddress>>;

    /// Balance of the configured asset in base units.
    async fn balance_of(&self, account: &WalletAddress) -> Result<U256>;

    fn bind_contract(&self, address: &ContractAddress) -> Result<Self::Contract>;
}

#[async_trait(?Send)]
pub trait TreeContract {
    fn address(&self) -> &ContractAddress;

    fn token_id_mode(&self) -> TokenIdMode;

    /// Send `mint` and wait until the transaction is mined.
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt>;

    async fn total_minted_trees(&self) -> Result<u64>;

    async fn tree_info(&self, index: u64) -> Result<TreeRecord>;
}
