//! DOM element bindings.
//!
//! All fields are resolved once at startup. `Elements` is also the registry's
//! output sink.

use tn_api_types::TreeRecord;
use tn_registry::{MintView, RegistryView, TreeRow};
use tracing::error;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
};

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

fn by_id_typed<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

macro_rules! get_typed {
    ($document:expr, $ty:ty, $id:expr) => {
        by_id_typed::<$ty>(&$document, $id)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

fn set_banner(el: &HtmlElement, text: Option<&str>) {
    let display = match text {
        Some(text) => {
            el.set_text_content(Some(text));
            "block"
        }
        None => "none",
    };
    let _ = el.style().set_property("display", display);
}

/// Clone-friendly: every field is a handle to a live DOM node.
#[derive(Clone)]
pub struct Elements {
    document: Document,

    // Form
    pub mint_form: HtmlFormElement,
    pub species: HtmlInputElement,
    pub age: HtmlInputElement,
    pub location: HtmlInputElement,
    pub proof_of_plant: HtmlInputElement,
    pub proof_of_life: HtmlInputElement,
    pub mint_button: HtmlButtonElement,

    // Output
    pub balance: HtmlElement,
    pub success_alert: HtmlElement,
    pub error_alert: HtmlElement,
    pub tree_table_body: Element,
}

impl Elements {
    pub fn bind() -> Result<Elements, JsValue> {
        let document = document()?;

        Ok(Elements {
            mint_form: get_typed!(document, HtmlFormElement, "mintForm"),
            species: get_typed!(document, HtmlInputElement, "species"),
            age: get_typed!(document, HtmlInputElement, "age"),
            location: get_typed!(document, HtmlInputElement, "location"),
            proof_of_plant: get_typed!(document, HtmlInputElement, "proofOfPlant"),
            proof_of_life: get_typed!(document, HtmlInputElement, "proofOfLife"),
            mint_button: get_typed!(document, HtmlButtonElement, "mintButton"),

            balance: get_typed!(document, HtmlElement, "balance"),
            success_alert: get_typed!(document, HtmlElement, "successAlert"),
            error_alert: get_typed!(document, HtmlElement, "errorAlert"),
            tree_table_body: get_typed!(document, Element, "treeInfoTableBody"),

            document,
        })
    }

    /// Current form values, as typed.
    pub fn tree_form(&self) -> TreeRecord {
        TreeRecord {
            species: self.species.value(),
            age: self.age.value(),
            location: self.location.value(),
            proof_of_plant: self.proof_of_plant.value(),
            proof_of_life: self.proof_of_life.value(),
        }
    }

    fn build_row(&self, row: &TreeRow) -> Result<Element, JsValue> {
        let tr = self.document.create_element("tr")?;
        for cell in &row.0 {
            let td = self.document.create_element("td")?;
            td.set_text_content(Some(cell));
            tr.append_child(&td)?;
        }
        Ok(tr)
    }
}

impl RegistryView for Elements {
    fn show_balance(&self, display: &str) {
        self.balance.set_text_content(Some(display));
    }

    fn show_mint(&self, view: &MintView) {
        self.mint_button.set_text_content(Some(view.button_label));
        self.mint_button.set_disabled(view.button_disabled);
        set_banner(&self.success_alert, view.success.as_deref());
        set_banner(&self.error_alert, view.error.as_deref());
    }

    fn clear_trees(&self) {
        self.tree_table_body.set_text_content(Some(""));
    }

    fn append_tree(&self, row: &TreeRow) {
        let appended = self
            .build_row(row)
            .and_then(|tr| self.tree_table_body.append_child(&tr));
        if let Err(err) = appended {
            error!(?err, species = %row.0[0], "failed to render tree row");
        }
    }
}
