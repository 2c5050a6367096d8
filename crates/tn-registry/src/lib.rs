//! Tree registry workflow.
//!
//! [`Session`] owns the wallet connection and the bound tree contract,
//! [`Registry`] drives minting and listing on top of it, and every UI effect
//! goes through a [`RegistryView`] so the browser and the tests share the same
//! workflow code.

mod session;
mod trees;
mod view;
mod workflow;

#[cfg(test)]
mod testing;

pub use session::{ConnectOutcome, Session};
pub use trees::load_trees;
pub use view::{
    MINT_ERROR_MESSAGE, MINT_LABEL, MINTING_LABEL, MintState, MintView, RegistryView, TreeRow,
    mint_view,
};
pub use workflow::Registry;
