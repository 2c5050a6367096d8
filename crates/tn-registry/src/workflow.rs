use std::cell::RefCell;
use tn_api_types::{AppConfig, MintReceipt, MintRequest, TokenIdMode, TreeRecord, WalletAddress};
use tn_chain_client::{ChainError, Result, TreeContract, WalletProvider, format_balance};
use tracing::{error, info, warn};

use crate::session::{ConnectOutcome, Session};
use crate::trees::load_trees;
use crate::view::{MintState, RegistryView, mint_view};

/// The page's registration workflow: connect on load, mint on submit, keep
/// the tree table and balance in sync.
///
/// Failures are logged and reflected in the view; none escape to the caller.
pub struct Registry<W: WalletProvider, V: RegistryView> {
    session: Session<W>,
    view: V,
    token_uri: String,
    balance_decimals: u32,
    mint_state: RefCell<MintState>,
}

impl<W: WalletProvider, V: RegistryView> Registry<W, V> {
    pub fn new(session: Session<W>, view: V, config: &AppConfig) -> Self {
        Self {
            session,
            view,
            token_uri: config.token_uri.clone(),
            balance_decimals: config.balance_decimals,
            mint_state: RefCell::new(MintState::Idle),
        }
    }

    pub fn session(&self) -> &Session<W> {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn mint_state(&self) -> MintState {
        self.mint_state.borrow().clone()
    }

    pub async fn on_load(&self) {
        match self.session.connect().await {
            Ok(ConnectOutcome::ProviderMissing | ConnectOutcome::InProgress) => return,
            Ok(_) => {}
            Err(err) => {
                error!(%err, "wallet connection failed");
                return;
            }
        }

        self.refresh_balance().await;
        self.refresh_trees().await;
    }

    pub async fn refresh_balance(&self) -> Option<String> {
        let display = self
            .session
            .balance()
            .await
            .and_then(|amount| format_balance(amount, self.balance_decimals));
        match display {
            Ok(display) => {
                self.view.show_balance(&display);
                Some(display)
            }
            Err(err) => {
                error!(%err, "failed to read balance");
                None
            }
        }
    }

    pub async fn refresh_trees(&self) -> Option<u64> {
        let Some(contract) = self.session.contract() else {
            warn!("tree registry requested before the wallet session was initialized");
            return None;
        };

        match load_trees(contract.as_ref(), &self.view).await {
            Ok(total) => Some(total),
            Err(err) => {
                error!(%err, "failed to load minted trees");
                None
            }
        }
    }

    /// Handle one form submission and return the state it settled in.
    ///
    /// A settled `Succeeded` or `Failed` state keeps its banner on screen and
    /// accepts the next submission like `Idle` does.
    pub async fn submit(&self, tree: TreeRecord) -> MintState {
        if matches!(*self.mint_state.borrow(), MintState::Minting) {
            warn!("mint already in progress; ignoring submission");
            return MintState::Minting;
        }

        self.transition(MintState::Minting);

        match self.mint(tree).await {
            Ok((account, receipt)) => {
                info!(
                    tx_hash = %receipt.tx_hash,
                    block = ?receipt.block_number,
                    %account,
                    "tree minted"
                );
                self.transition(MintState::Succeeded { account });
                self.refresh_trees().await;
                self.refresh_balance().await;
            }
            Err(err) => {
                error!(%err, "failed to mint tree");
                self.transition(MintState::Failed);
            }
        }

        self.mint_state()
    }

    async fn mint(&self, tree: TreeRecord) -> Result<(WalletAddress, MintReceipt)> {
        let (Some(contract), Some(account)) = (self.session.contract(), self.session.account())
        else {
            return Err(ChainError::NotConnected);
        };

        let token_id = match contract.token_id_mode() {
            TokenIdMode::Implicit => None,
            TokenIdMode::Explicit => Some(contract.total_minted_trees().await?),
        };

        let request = MintRequest {
            owner: account.clone(),
            token_id,
            tree,
            token_uri: self.token_uri.clone(),
        };
        let receipt = contract.mint(&request).await?;
        Ok((account, receipt))
    }

    fn transition(&self, next: MintState) {
        self.view.show_mint(&mint_view(&next));
        *self.mint_state.borrow_mut() = next;
    }
}
