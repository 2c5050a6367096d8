use tn_chain_client::{Result, TreeContract};
use tracing::debug;

use crate::view::{RegistryView, TreeRow};

/// Rebuild the rendered registry from the contract.
///
/// Rows are fetched one index at a time and appended in index order. A failed
/// read stops the loop; rows appended before it stay on screen.
pub async fn load_trees<C, V>(contract: &C, view: &V) -> Result<u64>
where
    C: TreeContract + ?Sized,
    V: RegistryView + ?Sized,
{
    view.clear_trees();

    let total = contract.total_minted_trees().await?;
    debug!(total, contract = %contract.address(), "loading minted trees");

    for index in 0..total {
        let tree = contract.tree_info(index).await?;
        view.append_tree(&TreeRow::from(&tree));
    }

    Ok(total)
}
