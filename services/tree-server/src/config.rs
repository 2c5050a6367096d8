use anyhow::{Context, ensure};
use std::path::PathBuf;
use tn_api_types::{AppConfig, BalanceAsset, ContractAddress, MAX_BALANCE_DECIMALS, TokenIdMode};
use tn_chain_client::{TreeAbi, parse_address};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "docs";
const DEFAULT_ABI_PATH: &str = "contract/Tree.abi.json";

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
    pub(crate) static_dir: PathBuf,
    pub(crate) abi_path: PathBuf,
    pub(crate) app: AppConfig,
}

impl ServerConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from `lookup`; blank values count as unset.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let mut app = AppConfig::default();

        if let Some(raw) = var("TREE_CONTRACT_ADDRESS") {
            parse_address(&raw).context("TREE_CONTRACT_ADDRESS")?;
            app.contract_address = ContractAddress(raw);
        }

        if let Some(raw) = var("TREE_TOKEN_ID_MODE") {
            app.token_id_mode = raw.parse::<TokenIdMode>().map_err(anyhow::Error::msg).context("TREE_TOKEN_ID_MODE")?;
        }

        if let Some(raw) = var("TREE_TOKEN_URI") {
            app.token_uri = raw;
        }

        if let Some(raw) = var("TREE_BALANCE_TOKEN") {
            app.balance_asset = if raw.eq_ignore_ascii_case("native") {
                BalanceAsset::Native
            } else {
                parse_address(&raw).context("TREE_BALANCE_TOKEN")?;
                BalanceAsset::Erc20 {
                    token: ContractAddress(raw),
                }
            };
        }

        if let Some(raw) = var("TREE_BALANCE_DECIMALS") {
            let decimals: u32 = raw
                .parse()
                .with_context(|| format!("TREE_BALANCE_DECIMALS must be an integer, got '{raw}'"))?;
            ensure!(
                decimals <= MAX_BALANCE_DECIMALS,
                "TREE_BALANCE_DECIMALS must be at most {MAX_BALANCE_DECIMALS}"
            );
            app.balance_decimals = decimals;
        }

        Ok(Self {
            port,
            static_dir: var("TREE_STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_owned()).into(),
            abi_path: var("TREE_ABI_PATH").unwrap_or_else(|| DEFAULT_ABI_PATH.to_owned()).into(),
            app,
        })
    }

    /// Load the contract ABI and check it can serve the configured token id mode.
    pub(crate) fn load_abi(&self) -> anyhow::Result<TreeAbi> {
        let json = std::fs::read_to_string(&self.abi_path)
            .with_context(|| format!("failed to read contract abi {}", self.abi_path.display()))?;
        TreeAbi::from_json(&json, self.app.token_id_mode)
            .with_context(|| format!("contract abi {} is not usable", self.abi_path.display()))
    }
}
