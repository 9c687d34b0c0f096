//! Integration tests for the engine, organized by feature
//!
//! These tests exercise the engine through the public `Runtime` API.

mod api;
mod apply_call;
mod arguments;
mod basics;
mod dynamic;
mod errors;
mod function;

use jsrun::{JsError, JsValue, Runtime};

/// Helper to evaluate a script in a fresh runtime.
#[allow(clippy::expect_used)]
pub fn eval(source: &str) -> JsValue {
    eval_result(source).expect("eval failed")
}

/// Helper to evaluate and return the Result for error testing.
pub fn eval_result(source: &str) -> Result<JsValue, JsError> {
    let mut runtime = Runtime::new();
    runtime.eval(source)
}
