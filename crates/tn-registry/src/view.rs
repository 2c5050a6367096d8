use tn_api_types::{TreeRecord, WalletAddress};

pub const MINT_LABEL: &str = "Mint";
pub const MINTING_LABEL: &str = "Minting...";
pub const MINT_ERROR_MESSAGE: &str = "An error occurred while minting the tree.";

/// Mint form state.
///
/// `Succeeded` and `Failed` are idle states that keep their banner: the
/// button is enabled and the next submission is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintState {
    #[default]
    Idle,
    Minting,
    Succeeded {
        account: WalletAddress,
    },
    Failed,
}

/// What the mint controls should look like for a given [`MintState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintView {
    pub button_label: &'static str,
    pub button_disabled: bool,
    pub success: Option<String>,
    pub error: Option<String>,
}

pub fn mint_view(state: &MintState) -> MintView {
    match state {
        MintState::Idle => MintView {
            button_label: MINT_LABEL,
            button_disabled: false,
            success: None,
            error: None,
        },
        MintState::Minting => MintView {
            button_label: MINTING_LABEL,
            button_disabled: true,
            success: None,
            error: None,
        },
        MintState::Succeeded { account } => MintView {
            button_label: MINT_LABEL,
            button_disabled: false,
            success: Some(format!("Tree successfully minted! {account}")),
            error: None,
        },
        MintState::Failed => MintView {
            button_label: MINT_LABEL,
            button_disabled: false,
            success: None,
            error: Some(MINT_ERROR_MESSAGE.to_owned()),
        },
    }
}

/// One rendered registry row: species, age, location, proofOfPlant, proofOfLife.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow(pub [String; 5]);

impl From<&TreeRecord> for TreeRow {
    fn from(tree: &TreeRecord) -> Self {
        TreeRow(tree.columns().map(str::to_owned))
    }
}

/// Output sinks the workflow writes to.
pub trait RegistryView {
    fn show_balance(&self, display: &str);

    fn show_mint(&self, view: &MintView);

    fn clear_trees(&self);

    fn append_tree(&self, row: &TreeRow);
}
