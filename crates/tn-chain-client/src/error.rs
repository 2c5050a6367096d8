use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    #[error("wallet provider does not support {0}")]
    ProviderUnavailable(String),

    #[error("wallet session is not connected")]
    NotConnected,

    #[error("no account found")]
    NoAccount,

    #[error("request rejected by wallet: {0}")]
    Rejected(String),

    #[error("json-rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("abi error: {0}")]
    Abi(String),

    #[error("contract abi does not match configuration: {0}")]
    AbiMismatch(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("no receipt for transaction {tx_hash} after {attempts} polls")]
    ReceiptTimeout { tx_hash: String, attempts: u32 },
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::InvalidResponse(err.to_string())
    }
}

impl From<alloy_dyn_abi::Error> for ChainError {
    fn from(err: alloy_dyn_abi::Error) -> Self {
        ChainError::Abi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
