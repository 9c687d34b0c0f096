//! Global object population: value constants, the global functions, the
//! primitive constructors and the console.

use std::io::Write;

use crate::error::JsError;
use crate::interpreter::{CallKind, Interpreter, NativeProc};
use crate::value::{
    CheapClone, ExoticObject, FunctionObject, JsObject, JsValue, Property, PropertyMap,
};

use super::function::create_native_function;

pub fn init_global(interp: &mut Interpreter) {
    let undefined_key = interp.key("undefined");
    interp.global.borrow_mut().define_property(
        undefined_key,
        Property::with_attributes(JsValue::Undefined, false, false, false),
    );
    let nan_key = interp.key("NaN");
    interp.global.borrow_mut().define_property(
        nan_key,
        Property::with_attributes(JsValue::Number(f64::NAN), false, false, false),
    );
    let infinity_key = interp.key("Infinity");
    interp.global.borrow_mut().define_property(
        infinity_key,
        Property::with_attributes(JsValue::Number(f64::INFINITY), false, false, false),
    );
    let global_this_key = interp.key("globalThis");
    let global_ref = interp.global.cheap_clone();
    interp.global.borrow_mut().define_property(
        global_this_key,
        Property::with_attributes(JsValue::Object(global_ref), true, false, true),
    );

    let global = interp.global.cheap_clone();
    interp.register_method(&global, "isNaN", global_is_nan, 1);
    interp.register_method(&global, "parseFloat", global_parse_float, 1);

    register_constructor(interp, "String", construct_string);
    register_constructor(interp, "Number", construct_number);
    register_constructor(interp, "Boolean", construct_boolean);

    init_console(interp);
}

fn register_constructor(interp: &mut Interpreter, name: &str, proc: NativeProc) {
    let constructor =
        create_native_function(interp, Some(name), proc, 1, FunctionObject::CONSTRUCTOR);
    let key = interp.key(name);
    interp.global.borrow_mut().define_property(
        key,
        Property::with_attributes(JsValue::Object(constructor), true, false, true),
    );
}

fn init_console(interp: &mut Interpreter) {
    let console = JsObject::with_prototype(interp.object_prototype.cheap_clone()).into_ref();
    interp.register_method(&console, "log", console_log, 0);
    let console_key = interp.key("console");
    interp.global.borrow_mut().define_property(
        console_key,
        Property::with_attributes(JsValue::Object(console), true, false, true),
    );
}

fn global_is_nan(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = match args.first() {
        Some(arg) => interp.to_number_value(arg)?,
        None => f64::NAN,
    };
    Ok(JsValue::Boolean(n.is_nan()))
}

/// `parseFloat` reads the longest leading decimal literal, with optional
/// sign, fraction and exponent; no digits at all gives NaN.
fn global_parse_float(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let text = match args.first() {
        Some(arg) => interp.to_string_value(arg)?,
        None => return Ok(JsValue::Number(f64::NAN)),
    };
    let trimmed = text.as_str().trim_start();
    let len = float_prefix_len(trimmed);
    let parsed = trimmed
        .get(..len)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN);
    Ok(JsValue::Number(parsed))
}

/// Length of the longest leading slice that parses as a decimal number.
/// A trailing `.`, `e` or sign that never gains digits is left out.
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut saw_digit = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    while matches!(bytes.get(i), Some(b'0'..=b'9')) {
        i += 1;
        saw_digit = true;
    }
    if matches!(bytes.get(i), Some(b'.')) {
        let mut j = i + 1;
        let mut frac = false;
        while matches!(bytes.get(j), Some(b'0'..=b'9')) {
            j += 1;
            frac = true;
        }
        if frac || saw_digit {
            i = j;
            saw_digit = saw_digit || frac;
        }
    }
    if !saw_digit {
        return 0;
    }
    let mut end = i;
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let mut exp = false;
        while matches!(bytes.get(j), Some(b'0'..=b'9')) {
            j += 1;
            exp = true;
        }
        if exp {
            end = j;
        }
    }
    end
}

fn construct_string(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(arg) => JsValue::String(interp.to_string_value(arg)?),
        None => JsValue::String(interp.intern("")),
    };
    finish_primitive(interp, kind, value)
}

fn construct_number(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(arg) => JsValue::Number(interp.to_number_value(arg)?),
        None => JsValue::Number(0.0),
    };
    finish_primitive(interp, kind, value)
}

fn construct_boolean(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = JsValue::Boolean(args.first().map(JsValue::to_boolean).unwrap_or(false));
    finish_primitive(interp, kind, value)
}

/// Calling a primitive constructor coerces; constructing wraps the
/// coerced value in an object.
fn finish_primitive(
    interp: &mut Interpreter,
    kind: CallKind,
    value: JsValue,
) -> Result<JsValue, JsError> {
    if kind != CallKind::Construct {
        return Ok(value);
    }
    let obj = JsObject {
        prototype: Some(interp.object_prototype.cheap_clone()),
        extensible: true,
        properties: PropertyMap::default(),
        exotic: ExoticObject::Primitive(value),
    }
    .into_ref();
    Ok(JsValue::Object(obj))
}

/// `console.log` writes space-joined renderings of its arguments to the
/// engine's output sink.
fn console_log(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&display_value(arg));
    }
    let _ = writeln!(interp.output, "{line}");
    Ok(JsValue::Undefined)
}

/// Rendering for display output: functions show their source, everything
/// else uses the plain string coercion.
pub(crate) fn display_value(value: &JsValue) -> String {
    if let JsValue::Object(obj) = value {
        if obj.borrow().is_callable() {
            return super::function::render_function_source(obj);
        }
    }
    value.to_js_string().to_string()
}
