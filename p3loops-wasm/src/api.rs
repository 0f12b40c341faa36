use crate::error;
use crate::interop::{from_js, to_js};
use crate::Engine;
use p3loops::geometry::holonomy::TransitionTable;
use p3loops::model::{EdgeSpec, PointSpec, Side};
use p3loops::{json, EngineConfig};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Routes engine `tracing` events to the browser console. Safe to call more than once.
#[wasm_bindgen]
pub fn init_logging() {
    let _ = tracing_wasm::try_set_as_global_default();
}

fn point(side: &str, t: f64) -> Result<PointSpec, JsValue> {
    match side.parse::<Side>() {
        Ok(side) => Ok(PointSpec::boundary(side, t)),
        Err(e) => Err(error::from_path_error(&e)),
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        crate::Engine::rs_new()
    }
    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    // Editing
    pub fn select_start(&mut self, side: &str, t: f64) -> JsValue {
        let side = match side.parse::<Side>() { Ok(s) => s, Err(e) => return error::from_path_error(&e) };
        error::result(self.inner.select_start(side, t), |_| self.snapshot())
    }
    pub fn add_first_edge(&mut self, from_side: &str, from_t: f64, to_side: &str, to_t: f64) -> JsValue {
        let from = match point(from_side, from_t) { Ok(p) => p, Err(e) => return e };
        let to = match point(to_side, to_t) { Ok(p) => p, Err(e) => return e };
        error::result(self.inner.add_first_edge(from, to), |_| self.snapshot())
    }
    pub fn add_edge(&mut self, side: &str, t: f64) -> JsValue {
        let to = match point(side, t) { Ok(p) => p, Err(e) => return e };
        error::result(self.inner.add_edge(to), |_| self.snapshot())
    }
    /// Extends the path into the `index`-th entry of `available_next_segments()`.
    pub fn add_segment(&mut self, index: u32) -> JsValue {
        let segs = self.inner.available_next_segments();
        let Some(seg) = segs.get(index as usize) else {
            return error::invalid_segment(index, segs.len());
        };
        error::result(self.inner.add_segment(seg), |_| self.snapshot())
    }
    pub fn remove_last_edge(&mut self) -> bool {
        self.inner.remove_last_edge()
    }
    pub fn close_loop(&mut self) -> JsValue {
        error::result(self.inner.close_loop(), |_| self.snapshot())
    }
    /// `ok` with the closing edge as `{from, to}`, or the blocking error.
    pub fn can_close_loop(&self) -> JsValue {
        error::result(self.inner.can_close_loop(), |edge| {
            to_js(&json::edge_spec(self.inner.state(), &edge))
        })
    }
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // Queries
    pub fn snapshot(&self) -> JsValue {
        to_js(&self.inner.snapshot())
    }
    pub fn phase(&self) -> String {
        format!("{:?}", self.inner.phase())
    }
    pub fn edge_count(&self) -> u32 {
        self.inner.edges().len() as u32
    }
    pub fn last_error(&self) -> JsValue {
        match self.inner.last_error() {
            Some(e) => error::describe(e),
            None => JsValue::NULL,
        }
    }
    pub fn holonomy(&self) -> JsValue {
        to_js(&self.inner.holonomy())
    }
    pub fn preview(&self, side: &str) -> JsValue {
        match side.parse::<Side>() {
            Ok(side) => error::ok(to_js(&self.inner.preview(side))),
            Err(e) => error::from_path_error(&e),
        }
    }
    pub fn open_end(&self) -> JsValue {
        to_js(&self.inner.snapshot().open_end)
    }
    pub fn available_next_segments(&self) -> JsValue {
        to_js(&self.inner.available_next_segments())
    }
    /// Without a depth, explores to the configured default.
    pub fn move_tree(&self, max_depth: Option<u32>) -> JsValue {
        match max_depth {
            Some(d) => to_js(&self.inner.explore(d as usize)),
            None => to_js(&self.inner.move_tree()),
        }
    }

    // Import / export
    pub fn to_specs(&self) -> JsValue {
        to_js(&self.inner.to_specs())
    }
    pub fn load_specs(&mut self, v: JsValue) -> JsValue {
        let specs: Vec<EdgeSpec> = match from_js(v) {
            Ok(s) => s,
            Err(msg) => return error::json_parse(msg),
        };
        error::result(self.inner.load_specs(&specs), |_| self.snapshot())
    }
    pub fn from_json(&mut self, v: JsValue) -> JsValue {
        match from_js::<serde_json::Value>(v) {
            Ok(val) => error::result(self.inner.from_json_value(val), |_| self.snapshot()),
            Err(msg) => error::json_parse(msg),
        }
    }

    // Configuration
    pub fn set_transition_table(&mut self, v: JsValue) -> JsValue {
        let val = match from_js::<serde_json::Value>(v) {
            Ok(val) => val,
            Err(msg) => return error::json_parse(msg),
        };
        let r = TransitionTable::from_json_value(val).and_then(|t| self.inner.set_table(t));
        error::result(r, |_| self.holonomy())
    }
    pub fn set_tolerance(&mut self, tol: f64) -> JsValue {
        error::result(self.inner.set_tolerance(tol), |_| JsValue::NULL)
    }
    pub fn set_config(&mut self, v: JsValue) -> JsValue {
        let cfg: EngineConfig = match from_js(v) {
            Ok(c) => c,
            Err(msg) => return error::json_parse(msg),
        };
        error::result(self.inner.set_config(cfg), |_| to_js(self.inner.config()))
    }
}
