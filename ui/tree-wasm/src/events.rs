//! Event binding.
//!
//! Async handlers are spawned with `wasm_bindgen_futures::spawn_local`.

use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::PageRegistry;
use crate::dom::Elements;

/// Bind the mint form. Call once after init.
pub fn bind_events(els: &Elements, registry: Rc<PageRegistry>) -> Result<(), JsValue> {
    let form = els.clone();
    let on_submit = Closure::wrap(Box::new(move |event: web_sys::Event| {
        event.prevent_default();

        let tree = form.tree_form();
        let registry = Rc::clone(&registry);
        wasm_bindgen_futures::spawn_local(async move {
            registry.submit(tree).await;
        });
    }) as Box<dyn FnMut(_)>);

    els.mint_form
        .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    Ok(())
}
