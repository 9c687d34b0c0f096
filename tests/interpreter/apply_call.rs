//! Function.prototype.apply and Function.prototype.call

use super::{eval, eval_result};
use jsrun::{JsError, JsValue};

#[test]
fn test_apply_spreads_array() {
    assert_eq!(
        eval("function add(a, b) { return a + b; } add.apply(null, [19, 23]);"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_apply_binds_receiver() {
    let source = "
        function label() { return this.name; }
        label.apply({ name: 'bound' }, []);
    ";
    assert_eq!(eval(source), JsValue::from("bound"));
}

#[test]
fn test_apply_without_arguments_array() {
    assert_eq!(
        eval("function count() { return arguments.length; } count.apply({});"),
        JsValue::Number(0.0)
    );
    assert_eq!(
        eval("function count() { return arguments.length; } count.apply({}, null);"),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_apply_accepts_arguments_object() {
    let source = "
        function target(a, b, c) { return a + b + c; }
        function relay() { return target.apply(null, arguments); }
        relay(1, 2, 3);
    ";
    assert_eq!(eval(source), JsValue::Number(6.0));
}

#[test]
fn test_apply_rejects_primitive_argument_list() {
    let result = eval_result("function f() {} f.apply(null, 5);");
    assert!(matches!(result, Err(JsError::TypeError { .. })));
}

#[test]
fn test_apply_uses_length_of_array_like() {
    let source = "
        function count() { return arguments.length; }
        count.apply(null, { 0: 'a', 1: 'b', length: 2 });
    ";
    assert_eq!(eval(source), JsValue::Number(2.0));
}

#[test]
fn test_call_binds_receiver_and_arguments() {
    let source = "
        function describe(suffix) { return this.name + suffix; }
        describe.call({ name: 'obj' }, '!');
    ";
    assert_eq!(eval(source), JsValue::from("obj!"));
}

#[test]
fn test_call_without_arguments() {
    assert_eq!(
        eval("function count() { return arguments.length; } count.call({});"),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_call_with_null_receiver_gets_global() {
    let source = "
        var name = 'global';
        function f() { return this.name; }
        f.call(null);
    ";
    assert_eq!(eval(source), JsValue::from("global"));
}

#[test]
fn test_call_wraps_primitive_receiver() {
    assert_eq!(
        eval("function f() { return typeof this; } f.call('text');"),
        JsValue::from("object")
    );
}

#[test]
fn test_apply_and_call_are_shared_builtins() {
    let source = "
        function a() {}
        function b() {}
        a.apply === b.apply && a.call === b.call;
    ";
    assert_eq!(eval(source), JsValue::Boolean(true));
}
