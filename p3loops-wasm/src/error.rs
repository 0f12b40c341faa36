use crate::interop::{new_obj, set_kv};
use p3loops::error::PathError;
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    set_kv(&root, "error", &error_obj(code, &message.into(), data));
    root.into()
}

fn error_obj(code: &str, message: &str, data: Option<JsValue>) -> JsValue {
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(message));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    e.into()
}

fn path_error_data(e: &PathError) -> Option<JsValue> {
    let idx = e.edge_index()?;
    let d = new_obj();
    set_kv(&d, "edgeIndex", &JsValue::from_f64(idx as f64));
    Some(d.into())
}

/// `{ code, message, data? }` without the result wrapper.
pub fn describe(e: &PathError) -> JsValue {
    error_obj(e.code(), &e.to_string(), path_error_data(e))
}

pub fn from_path_error(e: &PathError) -> JsValue {
    err(e.code(), e.to_string(), path_error_data(e))
}

#[inline]
pub fn json_parse(msg: String) -> JsValue {
    err("json_parse", msg, None)
}

#[inline]
pub fn invalid_segment(index: u32, available: usize) -> JsValue {
    let d = new_obj();
    set_kv(&d, "index", &JsValue::from_f64(index as f64));
    set_kv(&d, "available", &JsValue::from_f64(available as f64));
    err("invalid_segment", "no such candidate segment", Some(d.into()))
}

pub fn result<T>(r: Result<T, PathError>, value: impl FnOnce(T) -> JsValue) -> JsValue {
    match r {
        Ok(v) => ok(value(v)),
        Err(e) => from_path_error(&e),
    }
}
