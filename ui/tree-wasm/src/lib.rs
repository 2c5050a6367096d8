//! TreeNFT registry WASM front-end.
//!
//! Binds the page, connects the injected wallet and hands everything else to
//! the shared registry workflow.

pub mod config;
pub mod dom;
pub mod events;
pub mod logging;
pub mod provider;

use std::rc::Rc;
use tn_chain_client::{RpcWallet, TreeAbi};
use tn_registry::{Registry, Session};
use tracing::error;
use wasm_bindgen::prelude::*;

use crate::dom::Elements;
use crate::provider::InjectedProvider;

const TREE_ABI: &str = include_str!("../../../contract/Tree.abi.json");

pub type PageRegistry = Registry<RpcWallet<InjectedProvider>, Elements>;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let elements = Elements::bind()?;
    let config = config::load().await;

    let abi = TreeAbi::from_json(TREE_ABI, config.token_id_mode).map_err(|err| {
        error!(%err, mode = %config.token_id_mode, "bundled contract abi rejected");
        JsValue::from_str(&err.to_string())
    })?;

    let wallet = InjectedProvider::detect()
        .map(|provider| RpcWallet::new(provider, abi, config.balance_asset.clone()));
    let session = Session::new(wallet, config.contract_address.clone());
    let registry: Rc<PageRegistry> = Rc::new(Registry::new(session, elements.clone(), &config));

    events::bind_events(&elements, Rc::clone(&registry))?;

    registry.on_load().await;
    Ok(())
}
