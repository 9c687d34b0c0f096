//! The `Function` constructor, `Function.prototype`, and the factories
//! every other builtin goes through to become callable.

use std::rc::Rc;

use crate::compiler::{self, CompiledUnit, FunctionCode};
use crate::error::JsError;
use crate::interpreter::{arguments, CallKind, Interpreter, NativeProc, Scope};
use crate::value::{
    CheapClone, ExoticObject, FunctionKind, FunctionObject, InterpretedFunction, JsObject,
    JsObjectRef, JsString, JsValue, NativeFunction, Property, PropertyKey, PropertyMap,
};

/// Shared construction path for builtin functions. The declared arity is
/// folded into the low flag bits and exposed as `length`.
fn raw_native_function(
    interp: &mut Interpreter,
    name: Option<&str>,
    proc: NativeProc,
    arity: u32,
    flags: u32,
    prototype: JsObjectRef,
) -> JsObjectRef {
    let name = name.map(|n| interp.intern(n));
    JsObject {
        prototype: Some(prototype),
        extensible: true,
        properties: PropertyMap::default(),
        exotic: ExoticObject::Function(FunctionObject {
            name,
            flags: flags | (arity & FunctionObject::ARG_MASK),
            length: arity,
            kind: FunctionKind::Native(NativeFunction { proc }),
        }),
    }
    .into_ref()
}

/// Build the `Function.prototype`/`Function` pair and cross-link them by
/// hand. Both must exist before any other builtin function is created;
/// everything after this point goes through [`create_native_function`].
pub fn init_function_builtins(interp: &mut Interpreter) {
    let object_prototype = interp.object_prototype.cheap_clone();
    let prototype = raw_native_function(
        interp,
        Some("prototype"),
        function_prototype_proc,
        0,
        FunctionObject::METHOD,
        object_prototype,
    );
    let constructor = raw_native_function(
        interp,
        Some("Function"),
        construct_function,
        1,
        FunctionObject::CONSTRUCTOR,
        prototype.cheap_clone(),
    );

    let prototype_key = interp.key("prototype");
    constructor.borrow_mut().define_property(
        prototype_key,
        Property::data_readonly(JsValue::Object(prototype.cheap_clone())),
    );
    let constructor_key = interp.key("constructor");
    prototype.borrow_mut().define_property(
        constructor_key,
        Property::with_attributes(JsValue::Object(constructor.cheap_clone()), true, false, true),
    );

    interp.function_prototype = prototype.cheap_clone();
    interp.function_constructor = constructor.cheap_clone();

    interp.register_method(&prototype, "apply", function_apply, 2);
    interp.register_method(&prototype, "call", function_call, 1);
    interp.register_method(&prototype, "toString", function_to_string, 0);

    let function_key = interp.key("Function");
    interp.global.borrow_mut().define_property(
        function_key,
        Property::with_attributes(JsValue::Object(constructor), true, false, true),
    );
}

/// Create a builtin function. Its prototype link comes from the stored
/// constructor's `prototype` property.
pub fn create_native_function(
    interp: &mut Interpreter,
    name: Option<&str>,
    proc: NativeProc,
    arity: u32,
    flags: u32,
) -> JsObjectRef {
    let prototype_key = PropertyKey::from("prototype");
    let prototype = interp
        .function_constructor
        .borrow()
        .get_property(&prototype_key)
        .and_then(|value| value.as_object().map(CheapClone::cheap_clone))
        .unwrap_or_else(|| interp.object_prototype.cheap_clone());
    raw_native_function(interp, name, proc, arity, flags, prototype)
}

/// Create a function object from compiled source. `scope` is the captured
/// chain for nested functions and `None` for functions instantiated at
/// global level. Each one gets a fresh prototype object linked back to it
/// through `constructor`.
pub fn create_source_function(
    interp: &mut Interpreter,
    unit: &Rc<CompiledUnit>,
    code: &Rc<FunctionCode>,
    scope: Option<Rc<Scope>>,
) -> JsObjectRef {
    let length = code.params.len() as u32;
    let func = JsObject {
        prototype: Some(interp.function_prototype.cheap_clone()),
        extensible: true,
        properties: PropertyMap::default(),
        exotic: ExoticObject::Function(FunctionObject {
            name: code.name.clone(),
            flags: FunctionObject::CONSTRUCTOR,
            length,
            kind: FunctionKind::Interpreted(InterpretedFunction {
                unit: unit.cheap_clone(),
                code: code.cheap_clone(),
                scope,
            }),
        }),
    }
    .into_ref();

    let proto = JsObject::with_prototype(interp.object_prototype.cheap_clone()).into_ref();
    let constructor_key = interp.key("constructor");
    proto.borrow_mut().define_property(
        constructor_key,
        Property::with_attributes(JsValue::Object(func.cheap_clone()), true, false, true),
    );
    let prototype_key = interp.key("prototype");
    func.borrow_mut().define_property(
        prototype_key,
        Property::with_attributes(JsValue::Object(proto), true, false, false),
    );
    func
}

/// `Function.prototype` is itself callable; it ignores its arguments and
/// returns `undefined`.
fn function_prototype_proc(
    _interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Undefined)
}

fn expect_function(value: &JsValue) -> Result<JsObjectRef, JsError> {
    match value.as_object() {
        Some(obj) if obj.borrow().is_callable() => Ok(obj.cheap_clone()),
        _ => Err(JsError::type_error("Function expected")),
    }
}

/// `apply` and `call` coerce an explicit receiver to an object up front;
/// `undefined` and `null` fall through to the default receiver.
fn bind_receiver(
    interp: &mut Interpreter,
    this_arg: Option<&JsValue>,
) -> Result<JsValue, JsError> {
    match this_arg {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => Ok(JsValue::Undefined),
        Some(value) => Ok(JsValue::Object(interp.to_object(value)?)),
    }
}

/// Read an indexed collection into a plain argument vector. Reads go
/// through the interpreter so live arguments objects work as sources.
fn indexed_to_vec(interp: &mut Interpreter, obj: &JsObjectRef) -> Result<Vec<JsValue>, JsError> {
    let length_key = PropertyKey::from("length");
    let length = interp.get_property_value(obj, &length_key)?.to_uint32();
    let mut items = Vec::new();
    if items.try_reserve_exact(length as usize).is_err() {
        return Err(JsError::OutOfMemory);
    }
    for i in 0..length {
        items.push(interp.get_property_value(obj, &PropertyKey::Index(i))?);
    }
    Ok(items)
}

/// `Function.prototype.apply(thisArg, argArray)`.
fn function_apply(
    interp: &mut Interpreter,
    this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let func = expect_function(this_value)?;
    let receiver = bind_receiver(interp, args.first())?;
    let call_args = match args.get(1) {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => Vec::new(),
        Some(JsValue::Object(obj)) => indexed_to_vec(interp, obj)?,
        Some(_) => return Err(JsError::type_error("Array expected")),
    };
    interp.invoke(&JsValue::Object(func), &receiver, CallKind::Call, &call_args)
}

/// `Function.prototype.call(thisArg, ...)`.
fn function_call(
    interp: &mut Interpreter,
    this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let func = expect_function(this_value)?;
    let receiver = bind_receiver(interp, args.first())?;
    let rest = args.get(1..).unwrap_or_default();
    interp.invoke(&JsValue::Object(func), &receiver, CallKind::Call, rest)
}

/// `Function.prototype.toString()`: the exact source slice for script
/// functions, a fixed `[native code]` rendering for builtins.
fn function_to_string(
    _interp: &mut Interpreter,
    this_value: &JsValue,
    _kind: CallKind,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let func = expect_function(this_value)?;
    Ok(JsValue::String(JsString::from(render_function_source(
        &func,
    ))))
}

/// Source rendering shared by `toString` and display output.
pub(crate) fn render_function_source(func: &JsObjectRef) -> String {
    let borrowed = func.borrow();
    let Some(function) = borrowed.as_function() else {
        return String::new();
    };
    match &function.kind {
        FunctionKind::Interpreted(closure) => {
            closure.unit.source_text(closure.code.span).to_string()
        }
        FunctionKind::Native(_) => {
            let name = function.name().unwrap_or("");
            format!("\nfunction {name}() {{\n    [native code]\n}}\n")
        }
    }
}

/// The live `arguments` of a function's innermost active call, or `null`
/// when no call of it is on the control stack.
pub(crate) fn live_arguments_for(
    interp: &mut Interpreter,
    func: &JsObjectRef,
) -> Result<JsValue, JsError> {
    let index = interp
        .frames
        .iter()
        .rposition(|frame| Rc::ptr_eq(&frame.function, func));
    let Some(index) = index else {
        return Ok(JsValue::Null);
    };
    let Some(frame_id) = interp.frame_id_at(index) else {
        return Ok(JsValue::Null);
    };
    let obj = arguments::ensure_arguments_object(interp, frame_id)?;
    Ok(JsValue::Object(obj))
}

/// The `Function` constructor: the last argument is the body, the rest
/// are parameter names. Call and construct behave identically.
fn construct_function(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let mut parts = Vec::new();
    if parts.try_reserve_exact(args.len()).is_err() {
        return Err(JsError::OutOfMemory);
    }
    for arg in args {
        parts.push(interp.to_string_value(arg)?);
    }

    let source = match parts.split_last() {
        Some((body, params)) => {
            let params = params
                .iter()
                .map(JsString::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("function anonymous({params}) {{\n{body}\n}}")
        }
        None => String::from("function anonymous() {\n\n}"),
    };

    let unit = compiler::compile(&source, &mut interp.string_dict)?;
    let code = dynamic_function_code(&unit)?;
    Ok(JsValue::Object(create_source_function(
        interp, &unit, &code, None,
    )))
}

/// A dynamically built source must compile to exactly one declared
/// function and its hoisted name; anything else means the body text broke
/// out of the wrapper.
fn dynamic_function_code(unit: &Rc<CompiledUnit>) -> Result<Rc<FunctionCode>, JsError> {
    let global = unit
        .global_code()
        .ok_or_else(|| JsError::internal("constructed function has invalid shape"))?;
    if global.funcs.len() != 1 || global.vars.len() != 1 {
        return Err(JsError::internal("constructed function has invalid shape"));
    }
    global
        .funcs
        .first()
        .and_then(|slot| unit.function(*slot))
        .map(CheapClone::cheap_clone)
        .ok_or_else(|| JsError::internal("constructed function has invalid shape"))
}
