use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tree NFT contract deployed on Alfajores.
pub const DEFAULT_TREE_CONTRACT: &str = "0x0cc968a21B00F76407F167b0d4D9EAE893FF9FbE";

/// cUSD stable token on Alfajores.
pub const ALFAJORES_CUSD: &str = "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1";

pub const DEFAULT_TOKEN_URI: &str = "https://ipfs";

pub const DEFAULT_BALANCE_DECIMALS: u32 = 18;

/// Largest decimals value whose scale, 10^decimals, still fits in 256 bits.
pub const MAX_BALANCE_DECIMALS: u32 = 77;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContractAddress(pub String);

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One planted tree as stored by the contract.
///
/// Field order is the column order of the registry table and the positional
/// order of `getTreeInfo` outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeRecord {
    pub species: String,
    pub age: String,
    pub location: String,
    pub proof_of_plant: String,
    pub proof_of_life: String,
}

impl TreeRecord {
    pub fn columns(&self) -> [&str; 5] {
        [
            &self.species,
            &self.age,
            &self.location,
            &self.proof_of_plant,
            &self.proof_of_life,
        ]
    }
}

/// How the contract's `mint` assigns token ids.
///
/// `Implicit` contracts derive the id on-chain; `Explicit` contracts take it as
/// the second argument and the client passes the current total supply.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenIdMode {
    #[default]
    Implicit,
    Explicit,
}

impl fmt::Display for TokenIdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenIdMode::Implicit => f.write_str("implicit"),
            TokenIdMode::Explicit => f.write_str("explicit"),
        }
    }
}

impl FromStr for TokenIdMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "implicit" => Ok(TokenIdMode::Implicit),
            "explicit" => Ok(TokenIdMode::Explicit),
            other => Err(format!("unknown token id mode '{other}'; expected implicit or explicit")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintRequest {
    pub owner: WalletAddress,
    pub token_id: Option<u64>,
    pub tree: TreeRecord,
    pub token_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Which balance the page shows next to the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BalanceAsset {
    Native,
    Erc20 { token: ContractAddress },
}

impl Default for BalanceAsset {
    fn default() -> Self {
        BalanceAsset::Erc20 {
            token: ContractAddress(ALFAJORES_CUSD.to_owned()),
        }
    }
}

/// Client configuration published by the server at `/app-config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub contract_address: ContractAddress,
    pub token_id_mode: TokenIdMode,
    pub token_uri: String,
    pub balance_asset: BalanceAsset,
    pub balance_decimals: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract_address: ContractAddress(DEFAULT_TREE_CONTRACT.to_owned()),
            token_id_mode: TokenIdMode::default(),
            token_uri: DEFAULT_TOKEN_URI.to_owned(),
            balance_asset: BalanceAsset::default(),
            balance_decimals: DEFAULT_BALANCE_DECIMALS,
        }
    }
}

impl AppConfig {
    /// Reject values the client cannot act on.
    pub fn validate(&self) -> Result<(), String> {
        if self.balance_decimals > MAX_BALANCE_DECIMALS {
            return Err(format!(
                "balanceDecimals must be at most {MAX_BALANCE_DECIMALS}, got {}",
                self.balance_decimals
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_mode_parses_case_insensitively() {
        assert_eq!("Explicit".parse::<TokenIdMode>(), Ok(TokenIdMode::Explicit));
        assert_eq!(" implicit ".parse::<TokenIdMode>(), Ok(TokenIdMode::Implicit));
        assert!("derived".parse::<TokenIdMode>().is_err());
    }

    #[test]
    fn partial_app_config_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"tokenIdMode":"explicit","balanceAsset":{"kind":"native"}}"#)
                .unwrap();

        assert_eq!(config.token_id_mode, TokenIdMode::Explicit);
        assert_eq!(config.balance_asset, BalanceAsset::Native);
        assert_eq!(config.contract_address.0, DEFAULT_TREE_CONTRACT);
        assert_eq!(config.balance_decimals, 18);
    }

    #[test]
    fn oversized_balance_decimals_fail_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.balance_decimals = MAX_BALANCE_DECIMALS;
        assert!(config.validate().is_ok());

        config.balance_decimals = 78;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tree_record_columns_follow_table_order() {
        let tree = TreeRecord {
            species: "Oak".into(),
            age: "3".into(),
            location: "Nairobi".into(),
            proof_of_plant: "ipfs://plant".into(),
            proof_of_life: "ipfs://life".into(),
        };

        assert_eq!(
            tree.columns(),
            ["Oak", "3", "Nairobi", "ipfs://plant", "ipfs://life"]
        );
    }
}
