//! Error type for the browser-facing surface of the crate.
//!
//! A container selector that matches nothing is deliberately not an error;
//! the controller goes inert and logs a warning instead.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SnowError {
    #[error("no global `window` exists")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("2d drawing context unavailable")]
    NoContext,

    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for SnowError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SnowError> for JsValue {
    fn from(err: SnowError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
