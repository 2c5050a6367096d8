//! In-memory wallet, contract and view used by the workflow tests.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tn_api_types::{
    ContractAddress, MintReceipt, MintRequest, TokenIdMode, TreeRecord, WalletAddress,
};
use tn_chain_client::{ChainError, Result, TreeContract, U256, WalletProvider};

use crate::view::{MintView, RegistryView, TreeRow};

pub(crate) fn account() -> WalletAddress {
    WalletAddress("0x1111111111111111111111111111111111111111".to_owned())
}

pub(crate) fn contract_address() -> ContractAddress {
    ContractAddress("0x0cc968a21B00F76407F167b0d4D9EAE893FF9FbE".to_owned())
}

pub(crate) fn tree(species: &str) -> TreeRecord {
    TreeRecord {
        species: species.to_owned(),
        age: "7".to_owned(),
        location: "Kakamega".to_owned(),
        proof_of_plant: format!("ipfs://{species}/plant"),
        proof_of_life: format!("ipfs://{species}/life"),
    }
}

/// Chain state shared by the mock wallet and the contracts it binds.
#[derive(Default)]
pub(crate) struct Chain {
    pub(crate) accounts: RefCell<Vec<WalletAddress>>,
    pub(crate) trees: RefCell<Vec<TreeRecord>>,
    pub(crate) balance: Cell<U256>,
    pub(crate) token_id_mode: Cell<TokenIdMode>,
    pub(crate) fail_enable: Cell<bool>,
    pub(crate) fail_mint: Cell<bool>,
    pub(crate) fail_balance: Cell<bool>,
    pub(crate) fail_tree_at: Cell<Option<u64>>,
    pub(crate) enable_calls: Cell<u32>,
    pub(crate) bind_calls: Cell<u32>,
    pub(crate) total_calls: Cell<u32>,
    pub(crate) info_calls: RefCell<Vec<u64>>,
    pub(crate) mints: RefCell<Vec<MintRequest>>,
}

impl Chain {
    pub(crate) fn with_accounts(accounts: Vec<WalletAddress>) -> Rc<Self> {
        let chain = Rc::new(Chain::default());
        *chain.accounts.borrow_mut() = accounts;
        chain
    }
}

pub(crate) struct MockWallet(pub(crate) Rc<Chain>);

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    type Contract = MockContract;

    async fn enable(&self) -> Result<()> {
        self.0.enable_calls.set(self.0.enable_calls.get() + 1);
        // The wallet prompt is pending here; overlapping connects observe it.
        tokio::task::yield_now().await;
        if self.0.fail_enable.get() {
            return Err(ChainError::Rejected("User rejected the request.".to_owned()));
        }
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<WalletAddress>> {
        Ok(self.0.accounts.borrow().clone())
    }

    async fn balance_of(&self, _account: &WalletAddress) -> Result<U256> {
        if self.0.fail_balance.get() {
            return Err(ChainError::Transport("balance unavailable".to_owned()));
        }
        Ok(self.0.balance.get())
    }

    fn bind_contract(&self, address: &ContractAddress) -> Result<MockContract> {
        self.0.bind_calls.set(self.0.bind_calls.get() + 1);
        Ok(MockContract {
            chain: Rc::clone(&self.0),
            address: address.clone(),
        })
    }
}

pub(crate) struct MockContract {
    chain: Rc<Chain>,
    address: ContractAddress,
}

#[async_trait(?Send)]
impl TreeContract for MockContract {
    fn address(&self) -> &ContractAddress {
        &self.address
    }

    fn token_id_mode(&self) -> TokenIdMode {
        self.chain.token_id_mode.get()
    }

    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt> {
        // Give other submissions a chance to run while this one is pending.
        tokio::task::yield_now().await;

        self.chain.mints.borrow_mut().push(request.clone());
        if self.chain.fail_mint.get() {
            return Err(ChainError::Rejected("User denied transaction signature".to_owned()));
        }

        let mut trees = self.chain.trees.borrow_mut();
        trees.push(request.tree.clone());
        Ok(MintReceipt {
            tx_hash: format!("0x{:064x}", trees.len()),
            block_number: Some(trees.len() as u64),
        })
    }

    async fn total_minted_trees(&self) -> Result<u64> {
        self.chain.total_calls.set(self.chain.total_calls.get() + 1);
        Ok(self.chain.trees.borrow().len() as u64)
    }

    async fn tree_info(&self, index: u64) -> Result<TreeRecord> {
        self.chain.info_calls.borrow_mut().push(index);
        if self.chain.fail_tree_at.get() == Some(index) {
            return Err(ChainError::Transport(format!("getTreeInfo({index}) failed")));
        }
        self.chain
            .trees
            .borrow()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| ChainError::InvalidResponse(format!("no tree at index {index}")))
    }
}

#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) balance: RefCell<Option<String>>,
    pub(crate) mint_views: RefCell<Vec<MintView>>,
    pub(crate) rows: RefCell<Vec<TreeRow>>,
    pub(crate) clears: Cell<u32>,
}

impl RegistryView for RecordingView {
    fn show_balance(&self, display: &str) {
        *self.balance.borrow_mut() = Some(display.to_owned());
    }

    fn show_mint(&self, view: &MintView) {
        self.mint_views.borrow_mut().push(view.clone());
    }

    fn clear_trees(&self) {
        self.clears.set(self.clears.get() + 1);
        self.rows.borrow_mut().clear();
    }

    fn append_tree(&self, row: &TreeRow) {
        self.rows.borrow_mut().push(row.clone());
    }
}
