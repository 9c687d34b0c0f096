//! Tests for the public API ergonomics

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use jsrun::{JsError, JsValue, Runtime, RuntimeOptions};

// ═══════════════════════════════════════════════════════════════════════════════
// JsValue Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_from_conversions() {
    assert_eq!(JsValue::from("text"), JsValue::from(String::from("text")));
    assert_eq!(JsValue::from(true), JsValue::Boolean(true));
    assert_eq!(JsValue::from(2.5), JsValue::Number(2.5));
    assert_eq!(JsValue::from(7), JsValue::Number(7.0));
}

#[test]
fn test_is_callable() {
    let mut runtime = Runtime::new();
    let func = runtime.eval("function f() {} f;").unwrap();
    assert!(func.is_callable());
    assert!(!JsValue::Number(1.0).is_callable());
    assert!(!runtime.eval("({});").unwrap().is_callable());
}

#[test]
fn test_as_object() {
    let mut runtime = Runtime::new();
    assert!(runtime.eval("({ a: 1 });").unwrap().as_object().is_some());
    assert!(JsValue::Undefined.as_object().is_none());
    assert!(JsValue::from("text").as_object().is_none());
}

#[test]
fn test_to_js_string_rendering() {
    assert_eq!(JsValue::Undefined.to_js_string().as_str(), "undefined");
    assert_eq!(JsValue::Null.to_js_string().as_str(), "null");
    assert_eq!(JsValue::Number(1.5).to_js_string().as_str(), "1.5");
    assert_eq!(JsValue::Number(-0.0).to_js_string().as_str(), "0");
    assert_eq!(JsValue::Boolean(false).to_js_string().as_str(), "false");
}

#[test]
fn test_strict_equals_semantics() {
    assert!(!JsValue::Number(f64::NAN).strict_equals(&JsValue::Number(f64::NAN)));
    assert!(JsValue::Number(0.0).strict_equals(&JsValue::Number(-0.0)));
    assert!(!JsValue::Number(1.0).strict_equals(&JsValue::from("1")));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runtime Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_globals_persist_across_evals() {
    let mut runtime = Runtime::new();
    runtime.eval("var total = 0;").unwrap();
    runtime
        .eval("function bump(n) { total = total + n; return total; }")
        .unwrap();
    runtime.eval("bump(4);").unwrap();
    assert_eq!(runtime.eval("bump(6);").unwrap(), JsValue::Number(10.0));
}

#[test]
fn test_call_function_with_json_arguments() {
    let mut runtime = Runtime::new();
    runtime
        .eval("function add(a, b) { return a + b; }")
        .unwrap();
    let result = runtime.call_function("add", &[json!(19), json!(23)]).unwrap();
    assert_eq!(result, json!(42));
}

#[test]
fn test_call_function_round_trips_structures() {
    let mut runtime = Runtime::new();
    runtime
        .eval("function describe(x) { return { seen: x, count: x.items.length }; }")
        .unwrap();
    let result = runtime
        .call_function("describe", &[json!({ "items": [1, 2, 3] })])
        .unwrap();
    assert_eq!(result, json!({ "seen": { "items": [1, 2, 3] }, "count": 3 }));
}

#[test]
fn test_call_function_maps_undefined_to_null() {
    let mut runtime = Runtime::new();
    runtime.eval("function noop() {}").unwrap();
    assert_eq!(runtime.call_function("noop", &[]).unwrap(), json!(null));
}

#[test]
fn test_call_function_maps_function_results_to_null() {
    let mut runtime = Runtime::new();
    runtime
        .eval("function give() { return function() {}; }")
        .unwrap();
    assert_eq!(runtime.call_function("give", &[]).unwrap(), json!(null));
}

#[test]
fn test_call_function_fractional_numbers() {
    let mut runtime = Runtime::new();
    runtime.eval("function half(n) { return n / 2; }").unwrap();
    assert_eq!(runtime.call_function("half", &[json!(5)]).unwrap(), json!(2.5));
}

#[test]
fn test_eval_simple_rendering() {
    let mut runtime = Runtime::new();
    assert_eq!(runtime.eval_simple("1 + 1;").unwrap(), "2");
    assert_eq!(runtime.eval_simple("'quoted';").unwrap(), "quoted");
    assert_eq!(runtime.eval_simple("({});").unwrap(), "[object Object]");
    assert_eq!(runtime.eval_simple("var x;").unwrap(), "undefined");
}

struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl std::io::Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_output_accumulates_across_evals() {
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = Runtime::new();
    runtime.set_output(Box::new(SharedSink(Rc::clone(&buffer))));
    runtime.eval("console.log('first');").unwrap();
    runtime.eval("console.log('second', 2);").unwrap();
    let text = String::from_utf8(buffer.borrow().clone()).unwrap();
    assert_eq!(text, "first\nsecond 2\n");
}

#[test]
fn test_close_stops_later_evals() {
    let mut runtime = Runtime::new();
    runtime.eval("var x = 1;").unwrap();
    runtime.close();
    let result = runtime.eval("x;");
    assert!(matches!(result, Err(JsError::UnexpectedState(_))));
}

#[test]
fn test_options_configure_depth() {
    let options = RuntimeOptions {
        max_depth: 16,
        ..RuntimeOptions::default()
    };
    let mut runtime = Runtime::with_options(options);
    let result = runtime.eval(
        "function down(n) { if (n === 0) { return 0; } return down(n - 1); } down(50);",
    );
    assert!(result.is_err());
}

#[test]
fn test_options_deserialize_from_json() {
    let options: RuntimeOptions = serde_json::from_str(r#"{ "max_depth": 64 }"#).unwrap();
    assert_eq!(options.max_depth, 64);
    assert_eq!(options.max_eval_len, RuntimeOptions::default().max_eval_len);
}
