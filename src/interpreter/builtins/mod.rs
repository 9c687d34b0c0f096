//! Builtin objects and the standard library bootstrap.

pub mod function;
pub mod global;
pub mod object;

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::JsError;
use crate::value::{CheapClone, JsObject, JsObjectRef, JsValue, Property, PropertyKey};

use super::Interpreter;

/// Wire the standard library into a fresh engine.
///
/// The Object prototype exists first as a bare object, then the Function
/// prototype/constructor pair is built and cross-linked by hand; every
/// native function created after that point finds its prototype through
/// the stored constructor.
pub fn init_standard_library(interp: &mut Interpreter) {
    object::create_object_prototype(interp);
    function::init_function_builtins(interp);
    object::init_object_builtins(interp);
    global::init_global(interp);
}

/// Build an engine value from JSON. Arrays become index-keyed objects with
/// a `length` property, like array literals.
pub fn json_to_js_value(interp: &mut Interpreter, json: &serde_json::Value) -> JsValue {
    match json {
        serde_json::Value::Null => JsValue::Null,
        serde_json::Value::Bool(b) => JsValue::Boolean(*b),
        serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => JsValue::String(interp.intern(s)),
        serde_json::Value::Array(items) => {
            let obj = JsObject::with_prototype(interp.object_prototype.cheap_clone()).into_ref();
            for (i, item) in items.iter().enumerate() {
                let value = json_to_js_value(interp, item);
                obj.borrow_mut()
                    .set_property(PropertyKey::Index(i as u32), value);
            }
            let length = interp.key("length");
            obj.borrow_mut().define_property(
                length,
                Property::with_attributes(JsValue::Number(items.len() as f64), true, false, false),
            );
            JsValue::Object(obj)
        }
        serde_json::Value::Object(map) => {
            let obj = JsObject::with_prototype(interp.object_prototype.cheap_clone()).into_ref();
            for (name, value) in map {
                let js_value = json_to_js_value(interp, value);
                let key = interp.key(name);
                obj.borrow_mut().set_property(key, js_value);
            }
            JsValue::Object(obj)
        }
    }
}

/// Render an engine value as JSON. `undefined` maps to null, functions to
/// null, non-finite numbers to null; circular structures are an error.
pub fn js_value_to_json(value: &JsValue) -> Result<serde_json::Value, JsError> {
    let mut visited = FxHashSet::default();
    value_to_json(value, &mut visited)
}

fn value_to_json(
    value: &JsValue,
    visited: &mut FxHashSet<usize>,
) -> Result<serde_json::Value, JsError> {
    Ok(match value {
        JsValue::Undefined | JsValue::Null => serde_json::Value::Null,
        JsValue::Boolean(b) => serde_json::Value::Bool(*b),
        JsValue::Number(n) => number_to_json(*n),
        JsValue::String(s) => serde_json::Value::String(s.to_string()),
        JsValue::Object(obj) => object_to_json(obj, visited)?,
    })
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        return serde_json::Value::Number(serde_json::Number::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn object_to_json(
    obj: &JsObjectRef,
    visited: &mut FxHashSet<usize>,
) -> Result<serde_json::Value, JsError> {
    let id = Rc::as_ptr(obj) as usize;
    if !visited.insert(id) {
        return Err(JsError::type_error("Converting circular structure to JSON"));
    }

    let result = {
        let borrowed = obj.borrow();
        if borrowed.is_callable() {
            Ok(serde_json::Value::Null)
        } else if let Some(length) = indexed_view_length(&borrowed) {
            let mut items = Vec::new();
            for i in 0..length {
                let element = borrowed
                    .get_property(&PropertyKey::Index(i))
                    .unwrap_or_default();
                items.push(value_to_json(&element, visited)?);
            }
            Ok(serde_json::Value::Array(items))
        } else {
            let mut map = serde_json::Map::new();
            for (key, prop) in borrowed.properties.iter() {
                if !prop.enumerable || prop.value.is_callable() {
                    continue;
                }
                map.insert(key.to_string(), value_to_json(&prop.value, visited)?);
            }
            Ok(serde_json::Value::Object(map))
        }
    };

    visited.remove(&id);
    result
}

/// Objects built by array literals (and the JSON bridge) carry their
/// element count in a non-enumerable `length` property; that is how an
/// array is told apart from a plain object here.
fn indexed_view_length(obj: &JsObject) -> Option<u32> {
    let prop = obj.get_own_property(&PropertyKey::from("length"))?;
    if prop.enumerable {
        return None;
    }
    Some(prop.value.to_uint32())
}
