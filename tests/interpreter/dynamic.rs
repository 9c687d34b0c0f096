//! Functions compiled at runtime through the Function constructor

use super::{eval, eval_result};
use jsrun::JsValue;

#[test]
fn test_new_function_with_body_only() {
    assert_eq!(
        eval("var f = new Function('return 42;'); f();"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_new_function_with_parameters() {
    assert_eq!(
        eval("var add = new Function('a', 'b', 'return a + b;'); add(19, 23);"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_parameters_share_one_string() {
    assert_eq!(
        eval("var add = new Function('a, b', 'return a + b;'); add(1, 2);"),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_call_form_matches_construct_form() {
    assert_eq!(
        eval("var f = Function('return 7;'); f();"),
        JsValue::Number(7.0)
    );
}

#[test]
fn test_empty_function() {
    assert_eq!(
        eval("var f = new Function(); typeof f() + typeof f;"),
        JsValue::from("undefinedfunction")
    );
}

#[test]
fn test_length_counts_parameters() {
    assert_eq!(
        eval("new Function('a', 'b', 'c', 'return 0;').length;"),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_source_shows_anonymous_wrapper() {
    assert_eq!(
        eval("new Function('a', 'return a;').toString();"),
        JsValue::from("function anonymous(a) {\nreturn a;\n}")
    );
}

#[test]
fn test_compiled_functions_are_constructible() {
    let source = "
        var T = new Function('this.x = 5;');
        new T().x;
    ";
    assert_eq!(eval(source), JsValue::Number(5.0));
}

#[test]
fn test_sees_global_bindings() {
    let source = "
        var base = 40;
        var f = new Function('return base + 2;');
        f();
    ";
    assert_eq!(eval(source), JsValue::Number(42.0));
}

#[test]
fn test_does_not_close_over_creating_scope() {
    let source = "
        function make() {
            var secret = 'hidden';
            return new Function('return typeof secret;');
        }
        make()();
    ";
    assert_eq!(eval(source), JsValue::from("undefined"));
}

#[test]
fn test_syntax_error_in_body() {
    let result = eval_result("new Function('return ;;;(');");
    assert!(result.is_err());
}

#[test]
fn test_body_cannot_escape_wrapper() {
    let result = eval_result("new Function('} function g() { return 1;');");
    assert!(result.is_err());
}
