#![cfg(target_arch = "wasm32")]

use js_sys::Reflect;
use p3loops_wasm::Engine;
use serde_json::{json, Value};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn get(v: &JsValue, k: &str) -> JsValue {
    Reflect::get(v, &JsValue::from_str(k)).unwrap_or(JsValue::UNDEFINED)
}
fn is_ok(v: &JsValue) -> bool { get(v, "ok").as_bool().unwrap_or(false) }
fn as_json(v: JsValue) -> Value { serde_wasm_bindgen::from_value(v).unwrap() }

#[wasm_bindgen_test]
fn build_and_close_loop() {
    let mut eng = Engine::new();
    assert!(is_ok(&eng.add_first_edge("north", 0.1, "south", 0.5)));
    assert!(is_ok(&eng.add_edge("n", 0.05)));
    assert_eq!(eng.edge_count(), 2);

    let closing = eng.can_close_loop();
    assert!(is_ok(&closing));
    let edge = as_json(get(&closing, "value"));
    assert_eq!(edge["to"], json!({"side": "east", "t": 0.1}));

    let r = eng.close_loop();
    assert!(is_ok(&r));
    let snap = as_json(get(&r, "value"));
    assert_eq!(snap["phase"], "Closed");
    assert_eq!(snap["closed"], true);
    assert_eq!(snap["edges"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(snap["holonomy"], json!({"translation": [-1, -2], "rotation": 1}));
    assert!(snap["openEnd"].is_null());
}

#[wasm_bindgen_test]
fn segments_drive_the_path() {
    let mut eng = Engine::new();
    eng.add_first_edge("north", 0.25, "south", 0.75);
    let segs = as_json(eng.available_next_segments());
    let segs = segs.as_array().cloned().unwrap_or_default();
    assert_eq!(segs.len(), 4);
    assert!(is_ok(&eng.add_segment(0)));
    assert_eq!(eng.edge_count(), 2);
    assert!(eng.remove_last_edge());
    assert_eq!(eng.edge_count(), 1);
}

#[wasm_bindgen_test]
fn specs_roundtrip_through_js() {
    let mut a = Engine::new();
    a.add_first_edge("north", 0.1, "south", 0.5);
    a.add_edge("west", 0.5);
    let specs = a.to_specs();
    let mut b = Engine::new();
    assert!(is_ok(&b.load_specs(specs)));
    assert_eq!(as_json(b.snapshot())["edges"], as_json(a.snapshot())["edges"]);
}

#[wasm_bindgen_test]
fn move_tree_is_plain_data() {
    let mut eng = Engine::new();
    eng.add_first_edge("north", 0.25, "south", 0.75);
    let tree = as_json(eng.move_tree(Some(1)));
    let nodes = tree["nodes"].as_array().cloned().unwrap_or_default();
    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes[0]["status"], "expanded");
    assert_eq!(nodes[1]["status"], "horizon");
}

#[wasm_bindgen_test]
fn preview_and_table() {
    let mut eng = Engine::new();
    let r = eng.preview("east");
    assert!(is_ok(&r));
    assert_eq!(as_json(get(&r, "value")), json!({"translation": [0, 0], "rotation": 1}));

    let table = serde_wasm_bindgen::to_value(&json!({
        "north": {"translation": [0, 0], "rotation": 2},
        "east": {"translation": [0, 0], "rotation": 1},
        "south": {"translation": [-1, -2], "rotation": 2},
        "west": {"translation": [-2, -1], "rotation": 1}
    }))
    .unwrap();
    assert!(is_ok(&eng.set_transition_table(table)));
}

#[wasm_bindgen_test]
fn logging_init_is_idempotent() {
    p3loops_wasm::init_logging();
    p3loops_wasm::init_logging();
    p3loops_wasm::set_panic_hook();
}
