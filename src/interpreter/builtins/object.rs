//! The `Object` constructor and `Object.prototype`.

use crate::error::JsError;
use crate::interpreter::{CallKind, Interpreter};
use crate::value::{CheapClone, FunctionObject, JsObject, JsValue, Property, PropertyKey};

use super::function::create_native_function;

/// The prototype of plain objects exists before anything else; its
/// methods are filled in once the function machinery is up.
pub fn create_object_prototype(interp: &mut Interpreter) {
    interp.object_prototype = JsObject::new().into_ref();
}

pub fn init_object_builtins(interp: &mut Interpreter) {
    let prototype = interp.object_prototype.cheap_clone();
    interp.register_method(&prototype, "hasOwnProperty", object_has_own_property, 1);
    interp.register_method(&prototype, "toString", object_to_string, 0);
    interp.register_method(&prototype, "valueOf", object_value_of, 0);

    let constructor = create_native_function(
        interp,
        Some("Object"),
        construct_object,
        1,
        FunctionObject::CONSTRUCTOR,
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

    let object_key = interp.key("Object");
    interp.global.borrow_mut().define_property(
        object_key,
        Property::with_attributes(JsValue::Object(constructor), true, false, true),
    );
}

fn object_has_own_property(
    interp: &mut Interpreter,
    this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(this_value)?;
    let key = match args.first() {
        Some(value) => {
            let primitive = interp.to_primitive(value)?;
            PropertyKey::from_value(&primitive)
        }
        None => interp.key("undefined"),
    };
    let found = obj.borrow().get_own_property(&key).is_some();
    Ok(JsValue::Boolean(found))
}

fn object_to_string(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::String(interp.intern("[object Object]")))
}

fn object_value_of(
    interp: &mut Interpreter,
    this_value: &JsValue,
    _kind: CallKind,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Object(interp.to_object(this_value)?))
}

/// The `Object` constructor: with no usable argument it makes a fresh
/// object, otherwise it coerces the argument.
fn construct_object(
    interp: &mut Interpreter,
    _this_value: &JsValue,
    _kind: CallKind,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    match args.first() {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => {
            let obj = JsObject::with_prototype(interp.object_prototype.cheap_clone()).into_ref();
            Ok(JsValue::Object(obj))
        }
        Some(value) => Ok(JsValue::Object(interp.to_object(value)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler;

    fn eval_source(source: &str) -> JsValue {
        let mut interp = Interpreter::new();
        let unit = compiler::compile(source, &mut interp.string_dict).unwrap();
        interp.run_program(&unit).unwrap()
    }

    #[test]
    fn test_has_own_property_ignores_prototype_chain() {
        let value = eval_source(
            "function T() { this.own = 1; }\n\
             T.prototype.shared = 2;\n\
             var t = new T();\n\
             t.hasOwnProperty('own') === true && t.hasOwnProperty('shared') === false;",
        );
        assert_eq!(value, JsValue::Boolean(true));
    }

    #[test]
    fn test_object_to_string() {
        let value = eval_source("({}).toString();");
        assert_eq!(value, JsValue::from("[object Object]"));
    }

    #[test]
    fn test_object_constructor_passes_objects_through() {
        let value = eval_source("var o = { x: 1 };\nObject(o) === o;");
        assert_eq!(value, JsValue::Boolean(true));
    }

    #[test]
    fn test_new_object_makes_fresh_object() {
        let value = eval_source("var o = new Object();\no.hasOwnProperty('x');");
        assert_eq!(value, JsValue::Boolean(false));
    }

    #[test]
    fn test_value_of_returns_receiver() {
        let value = eval_source("var o = {};\no.valueOf() === o;");
        assert_eq!(value, JsValue::Boolean(true));
    }
}
