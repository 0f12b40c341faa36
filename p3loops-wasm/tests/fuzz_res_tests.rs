#![cfg(target_arch = "wasm32")]

use js_sys::Reflect;
use p3loops_wasm::Engine;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_ok(v: &JsValue) -> bool { Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false) }

const SIDES: [&str; 6] = ["north", "east", "south", "west", "n", "bogus"];

#[wasm_bindgen_test]
fn fuzz_edits_never_abort() {
    let mut eng = Engine::new();

    // Simple LCG
    let mut seed: u64 = 0x1234_5678_ABCD_EF01;
    let mut rnd = || { seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1); (seed >> 16) as u32 };

    for _ in 0..400u32 {
        let op = rnd() % 9;
        let ver_before = eng.version();
        let side = SIDES[(rnd() % SIDES.len() as u32) as usize];
        let t = (rnd() % 80) as f64 / 64.0 - 0.1;
        let res = match op {
            0 => eng.add_first_edge(side, t, SIDES[(rnd() % 4) as usize], 1.0 - t),
            1 | 2 => eng.add_edge(side, t),
            3 | 4 => eng.add_segment(rnd() % 6),
            5 => { eng.remove_last_edge(); JsValue::NULL }
            6 => eng.close_loop(),
            7 => eng.select_start(side, t),
            _ => eng.preview(side),
        };
        if !res.is_null() && !is_ok(&res) {
            assert_eq!(eng.version(), ver_before, "failed op {} mutated state", op);
        }
        // The snapshot must always be readable.
        assert!(!eng.snapshot().is_null());
    }
}
