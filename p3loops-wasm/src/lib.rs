use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Engine { pub(crate) inner: p3loops::PathEngine }

impl Engine {
    pub fn rs_new() -> Engine { Engine { inner: p3loops::PathEngine::new() } }
    pub fn rs_engine(&self) -> &p3loops::PathEngine { &self.inner }
}

pub use api::{init_logging, set_panic_hook};
