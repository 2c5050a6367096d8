use alloy_primitives::{U256, hex};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Duration;
use tn_api_types::{
    BalanceAsset, ContractAddress, MintReceipt, MintRequest, TokenIdMode, TreeRecord, WalletAddress,
};
use tracing::{debug, info};

use crate::abi::TreeAbi;
use crate::error::{ChainError, Result};
use crate::units::{parse_address, parse_quantity};
use crate::{RpcTransport, TreeContract, WalletProvider};

mod erc20 {
    alloy_sol_types::sol! {
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// How long to wait for a mint to be mined.
///
/// `max_attempts: None` keeps polling until the node answers with a receipt.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
}

/// Wallet provider backed by any JSON-RPC transport.
pub struct RpcWallet<T> {
    transport: Rc<T>,
    abi: Rc<TreeAbi>,
    balance_asset: BalanceAsset,
    polling: ReceiptPolling,
}

impl<T: RpcTransport> RpcWallet<T> {
    pub fn new(transport: T, abi: TreeAbi, balance_asset: BalanceAsset) -> Self {
        Self {
            transport: Rc::new(transport),
            abi: Rc::new(abi),
            balance_asset,
            polling: ReceiptPolling::default(),
        }
    }

    pub fn with_receipt_polling(mut self, polling: ReceiptPolling) -> Self {
        self.polling = polling;
        self
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> WalletProvider for RpcWallet<T> {
    type Contract = RpcTreeContract<T>;

    async fn enable(&self) -> Result<()> {
        self.transport
            .request("eth_requestAccounts", json!([]))
            .await?;
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<WalletAddress>> {
        let value = self.transport.request("eth_accounts", json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(value)?;
        Ok(accounts.into_iter().map(WalletAddress).collect())
    }

    async fn balance_of(&self, account: &WalletAddress) -> Result<U256> {
        match &self.balance_asset {
            BalanceAsset::Native => {
                let value = self
                    .transport
                    .request("eth_getBalance", json!([account.0, "latest"]))
                    .await?;
                parse_quantity(as_str(&value)?)
            }
            BalanceAsset::Erc20 { token } => {
                let owner = parse_address(&account.0)?;
                let data = erc20::balanceOfCall { owner }.abi_encode();
                let output = eth_call(self.transport.as_ref(), token, &data).await?;
                let decoded = erc20::balanceOfCall::abi_decode_returns(&output, true)
                    .map_err(|err| ChainError::Abi(err.to_string()))?;
                Ok(decoded._0)
            }
        }
    }

    fn bind_contract(&self, address: &ContractAddress) -> Result<RpcTreeContract<T>> {
        parse_address(&address.0)?;

        Ok(RpcTreeContract {
            transport: Rc::clone(&self.transport),
            address: address.clone(),
            abi: Rc::clone(&self.abi),
            polling: self.polling,
        })
    }
}

/// The tree contract reached through `eth_call` / `eth_sendTransaction`.
pub struct RpcTreeContract<T> {
    transport: Rc<T>,
    address: ContractAddress,
    abi: Rc<TreeAbi>,
    polling: ReceiptPolling,
}

impl<T: RpcTransport> RpcTreeContract<T> {
    async fn wait_for_receipt(&self, tx_hash: String) -> Result<MintReceipt> {
        let mut attempts: u32 = 0;
        loop {
            let value = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if !value.is_null() {
                let receipt: RpcReceipt = serde_json::from_value(value)?;
                let succeeded = match receipt.status.as_deref() {
                    Some(status) => !parse_quantity(status)?.is_zero(),
                    None => true,
                };
                if !succeeded {
                    return Err(ChainError::Reverted {
                        tx_hash: receipt.transaction_hash,
                    });
                }

                let block_number = receipt
                    .block_number
                    .as_deref()
                    .map(parse_quantity)
                    .transpose()?
                    .and_then(|number| u64::try_from(number).ok());

                return Ok(MintReceipt {
                    tx_hash: receipt.transaction_hash,
                    block_number,
                });
            }

            attempts += 1;
            if let Some(max_attempts) = self.polling.max_attempts {
                if attempts >= max_attempts {
                    return Err(ChainError::ReceiptTimeout { tx_hash, attempts });
                }
            }

            debug!(%tx_hash, attempts, "mint not mined yet");
            self.transport.pause(self.polling.interval).await;
        }
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> TreeContract for RpcTreeContract<T> {
    fn address(&self) -> &ContractAddress {
        &self.address
    }

    fn token_id_mode(&self) -> TokenIdMode {
        self.abi.token_id_mode()
    }

    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt> {
        let data = self.abi.encode_mint(request)?;
        let value = self
            .transport
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": request.owner.0,
                    "to": self.address.0,
                    "data": hex::encode_prefixed(&data),
                }]),
            )
            .await?;

        let tx_hash = as_str(&value)?.to_owned();
        info!(%tx_hash, owner = %request.owner, "mint transaction sent");
        self.wait_for_receipt(tx_hash).await
    }

    async fn total_minted_trees(&self) -> Result<u64> {
        let data = self.abi.encode_total_minted_trees()?;
        let output = eth_call(self.transport.as_ref(), &self.address, &data).await?;
        self.abi.decode_total_minted_trees(&output)
    }

    async fn tree_info(&self, index: u64) -> Result<TreeRecord> {
        let data = self.abi.encode_tree_info(index)?;
        let output = eth_call(self.transport.as_ref(), &self.address, &data).await?;
        self.abi.decode_tree_info(&output)
    }
}

async fn eth_call<T: RpcTransport + ?Sized>(
    transport: &T,
    to: &ContractAddress,
    data: &[u8],
) -> Result<Vec<u8>> {
    let value = transport
        .request(
            "eth_call",
            json!([{ "to": to.0, "data": hex::encode_prefixed(data) }, "latest"]),
        )
        .await?;

    hex::decode(as_str(&value)?)
        .map_err(|err| ChainError::InvalidResponse(format!("eth_call returned non-hex data: {err}")))
}

fn as_str(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse(format!("expected a string, got {value}")))
}
