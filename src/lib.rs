//! A small JavaScript engine built around first-class function objects
//!
//! # Example
//!
//! ```
//! use jsrun::{Runtime, JsValue};
//!
//! let mut runtime = Runtime::new();
//! let result = runtime.eval("1 + 2 * 3;").unwrap();
//! assert_eq!(result, JsValue::Number(7.0));
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod string_dict;
pub mod value;

pub use error::JsError;
pub use interpreter::{CallKind, EngineState, Interpreter};
pub use value::{CheapClone, JsString, JsValue};

use std::io::Write;

use serde::Deserialize;

/// Default cap on the byte length of a single `eval` source.
pub const DEFAULT_MAX_EVAL_LEN: usize = 1 << 20;

/// Engine limits, deserializable from embedder configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Nested call depth at which script overflows with a `RangeError`.
    pub max_depth: usize,
    /// Maximum script source length accepted by `eval`, in bytes.
    pub max_eval_len: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_depth: interpreter::DEFAULT_MAX_DEPTH,
            max_eval_len: DEFAULT_MAX_EVAL_LEN,
        }
    }
}

/// The main runtime for executing scripts
pub struct Runtime {
    interpreter: Interpreter,
    max_eval_len: usize,
}

impl Runtime {
    /// Create a new runtime instance with default limits
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    pub fn with_options(options: RuntimeOptions) -> Self {
        Self {
            interpreter: Interpreter::with_max_depth(options.max_depth),
            max_eval_len: options.max_eval_len,
        }
    }

    /// Evaluate a script in the persistent global scope and return the
    /// value of its last expression statement.
    ///
    /// Globals declared here stay visible to later `eval` calls.
    pub fn eval(&mut self, source: &str) -> Result<JsValue, JsError> {
        if self.interpreter.state() != EngineState::Running {
            return Err(JsError::unexpected_state("script engine is not running"));
        }
        if source.len() > self.max_eval_len {
            return Err(JsError::range_error(
                "script source exceeds the configured length limit",
            ));
        }
        let unit = compiler::compile(source, &mut self.interpreter.string_dict)?;
        self.interpreter.run_program(&unit)
    }

    /// Evaluate a script and render the result as display text.
    ///
    /// This is a convenience method for embedders that only need output
    /// text; functions render as their source.
    pub fn eval_simple(&mut self, source: &str) -> Result<String, JsError> {
        let value = self.eval(source)?;
        Ok(interpreter::builtins::global::display_value(&value))
    }

    /// Call a global function by name with JSON arguments
    ///
    /// Arguments are converted into engine values, the result back into
    /// JSON; `undefined` and functions map to `null`.
    ///
    /// # Example
    ///
    /// ```
    /// use jsrun::Runtime;
    /// use serde_json::json;
    ///
    /// let mut runtime = Runtime::new();
    /// runtime.eval("function add(a, b) { return a + b; }").unwrap();
    /// let result = runtime.call_function("add", &[json!(1), json!(2)]).unwrap();
    /// assert_eq!(result, json!(3));
    /// ```
    pub fn call_function(
        &mut self,
        name: &str,
        args: &[serde_json::Value],
    ) -> Result<serde_json::Value, JsError> {
        let key = self.interpreter.key(name);
        let func = self
            .interpreter
            .global
            .borrow()
            .get_property(&key)
            .unwrap_or_default();

        let mut js_args = Vec::new();
        if js_args.try_reserve_exact(args.len()).is_err() {
            return Err(JsError::OutOfMemory);
        }
        for arg in args {
            js_args.push(interpreter::builtins::json_to_js_value(
                &mut self.interpreter,
                arg,
            ));
        }

        let result = self
            .interpreter
            .invoke(&func, &JsValue::Undefined, CallKind::Call, &js_args)?;
        interpreter::builtins::js_value_to_json(&result)
    }

    /// Install a sink for `console.log` output
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.interpreter.output = sink;
    }

    /// Shut the engine down and release the builtin roots.
    ///
    /// Later `eval` calls fail with `UnexpectedState`; closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        self.interpreter.close();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
