pub mod ast;
pub mod convert;
pub mod ir;
pub mod report;
pub mod serializer;
pub mod sql;

use wasm_bindgen::prelude::*;

pub use convert::{Conversion, ConvertError, Converter, convert};

use report::Report;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert SQL DDL to a document schema report (JSON)
#[wasm_bindgen(js_name = "sqlToDocumentSchema")]
pub fn sql_to_document_schema(source: &str) -> Result<String, JsValue> {
    Report::from_source(&Converter::default(), source)
        .to_json(true)
        .map_err(|e| js_sys::Error::new(&e.to_string()).into())
}
