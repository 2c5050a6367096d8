use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tn_api_types::{ContractAddress, WalletAddress};
use tn_chain_client::{ChainError, Result, U256, WalletProvider};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletAddress),
    AlreadyConnected,
    /// Another connect is still waiting on the wallet.
    InProgress,
    ProviderMissing,
}

/// One page's wallet connection.
///
/// Initialized at most once: after a successful [`Session::connect`] the
/// account and contract handle stay fixed until the session is dropped.
pub struct Session<W: WalletProvider> {
    provider: Option<W>,
    contract_address: ContractAddress,
    account: RefCell<Option<WalletAddress>>,
    contract: RefCell<Option<Rc<W::Contract>>>,
    initialized: Cell<bool>,
    connecting: Cell<bool>,
}

impl<W: WalletProvider> Session<W> {
    pub fn new(provider: Option<W>, contract_address: ContractAddress) -> Self {
        Self {
            provider,
            contract_address,
            account: RefCell::new(None),
            contract: RefCell::new(None),
            initialized: Cell::new(false),
            connecting: Cell::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.account.borrow().clone()
    }

    pub fn contract(&self) -> Option<Rc<W::Contract>> {
        self.contract.borrow().clone()
    }

    pub async fn connect(&self) -> Result<ConnectOutcome> {
        let Some(provider) = &self.provider else {
            warn!("no compatible wallet provider found; install the CeloExtensionWallet");
            return Ok(ConnectOutcome::ProviderMissing);
        };

        if self.initialized.get() {
            info!("wallet session already initialized");
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        if self.connecting.replace(true) {
            info!("wallet connection already in progress");
            return Ok(ConnectOutcome::InProgress);
        }
        let authorized = self.authorize(provider).await;
        self.connecting.set(false);
        let (account, contract) = authorized?;

        *self.account.borrow_mut() = Some(account.clone());
        *self.contract.borrow_mut() = Some(Rc::new(contract));
        self.initialized.set(true);

        info!(%account, contract = %self.contract_address, "wallet session initialized");
        Ok(ConnectOutcome::Connected(account))
    }

    async fn authorize(&self, provider: &W) -> Result<(WalletAddress, W::Contract)> {
        provider.enable().await?;

        let accounts = provider.accounts().await?;
        let Some(account) = accounts.into_iter().next() else {
            return Err(ChainError::NoAccount);
        };

        let contract = provider.bind_contract(&self.contract_address)?;
        Ok((account, contract))
    }

    /// Balance of the active account in base units.
    pub async fn balance(&self) -> Result<U256> {
        let (Some(provider), Some(account)) = (&self.provider, self.account()) else {
            return Err(ChainError::NotConnected);
        };
        provider.balance_of(&account).await
    }
}
