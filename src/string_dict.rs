//! String dictionary for deduplicating JsString instances.
//!
//! Identifiers and string literals are interned here so that identical
//! strings share one `Rc<str>` allocation and compare cheaply.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString};

/// A dictionary for deduplicating JsString instances.
pub struct StringDict {
    /// Map from string content to shared JsString instance.
    /// Using Box<str> as key to avoid double-indirection through Rc.
    strings: FxHashMap<Box<str>, JsString>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with common strings.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    /// Returns a cheap clone of the shared JsString instance.
    pub fn get_or_insert(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let js_str = JsString::from(s);
        self.strings.insert(s.into(), js_str.cheap_clone());
        js_str
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

/// Strings that appear frequently in scripts and in the runtime itself.
const COMMON_STRINGS: &[&str] = &[
    // Object properties
    "length",
    "prototype",
    "constructor",
    "name",
    // Function machinery
    "arguments",
    "callee",
    "anonymous",
    // Common methods
    "toString",
    "valueOf",
    "hasOwnProperty",
    "apply",
    "call",
    "log",
    // Type names
    "undefined",
    "null",
    "boolean",
    "number",
    "string",
    "object",
    "function",
    // Built-in constructors and globals
    "Object",
    "Function",
    "String",
    "Number",
    "Boolean",
    "console",
    "globalThis",
    "NaN",
    "Infinity",
    "isNaN",
    "parseFloat",
    // Common identifiers
    "this",
    "i",
    "j",
    "k",
    "x",
    "y",
    "n",
    "a",
    "b",
    "c",
    "f",
    "g",
    "obj",
    "key",
    "value",
    "result",
];
