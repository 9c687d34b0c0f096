//! Core language behavior

use super::eval;
use jsrun::JsValue;

#[test]
fn test_arithmetic() {
    assert_eq!(eval("1 + 2 * 3;"), JsValue::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3;"), JsValue::Number(9.0));
    assert_eq!(eval("10 / 4;"), JsValue::Number(2.5));
    assert_eq!(eval("7 % 4;"), JsValue::Number(3.0));
    assert_eq!(eval("-5 + 2;"), JsValue::Number(-3.0));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'a' + 'b';"), JsValue::from("ab"));
    assert_eq!(eval("'a' + 1;"), JsValue::from("a1"));
    assert_eq!(eval("1 + '2';"), JsValue::from("12"));
}

#[test]
fn test_variables() {
    assert_eq!(eval("var x = 2; x = x + 3; x;"), JsValue::Number(5.0));
    assert_eq!(eval("var a = 1, b = 2; a + b;"), JsValue::Number(3.0));
}

#[test]
fn test_if_else() {
    assert_eq!(
        eval("var r; if (1 < 2) { r = 'yes'; } else { r = 'no'; } r;"),
        JsValue::from("yes")
    );
    assert_eq!(
        eval("var r = 0; if (false) { r = 1; } r;"),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_while_loop() {
    assert_eq!(
        eval("var i = 0; var sum = 0; while (i < 5) { sum = sum + i; i = i + 1; } sum;"),
        JsValue::Number(10.0)
    );
}

#[test]
fn test_object_literal_and_member_access() {
    assert_eq!(eval("var o = { x: 1, y: 2 }; o.x + o.y;"), JsValue::Number(3.0));
    assert_eq!(eval("var o = { x: 1 }; o['x'];"), JsValue::Number(1.0));
    assert_eq!(eval("var o = {}; o.created = 9; o.created;"), JsValue::Number(9.0));
}

#[test]
fn test_array_literal() {
    assert_eq!(eval("var a = [10, 20, 30]; a[1];"), JsValue::Number(20.0));
    assert_eq!(eval("[1, 2, 3].length;"), JsValue::Number(3.0));
}

#[test]
fn test_typeof() {
    assert_eq!(eval("typeof 1;"), JsValue::from("number"));
    assert_eq!(eval("typeof 'x';"), JsValue::from("string"));
    assert_eq!(eval("typeof true;"), JsValue::from("boolean"));
    assert_eq!(eval("typeof undefined;"), JsValue::from("undefined"));
    assert_eq!(eval("typeof null;"), JsValue::from("object"));
    assert_eq!(eval("typeof {};"), JsValue::from("object"));
    assert_eq!(eval("typeof function() { return 0; };"), JsValue::from("function"));
}

#[test]
fn test_strict_equality() {
    assert_eq!(eval("1 === 1;"), JsValue::Boolean(true));
    assert_eq!(eval("1 === '1';"), JsValue::Boolean(false));
    assert_eq!(eval("null === null;"), JsValue::Boolean(true));
    assert_eq!(eval("undefined === null;"), JsValue::Boolean(false));
    assert_eq!(eval("NaN === NaN;"), JsValue::Boolean(false));
    assert_eq!(eval("var o = {}; var p = o; o === p;"), JsValue::Boolean(true));
    assert_eq!(eval("({}) === ({});"), JsValue::Boolean(false));
    assert_eq!(eval("1 !== 2;"), JsValue::Boolean(true));
}

#[test]
fn test_comparison() {
    assert_eq!(eval("1 < 2;"), JsValue::Boolean(true));
    assert_eq!(eval("2 <= 2;"), JsValue::Boolean(true));
    assert_eq!(eval("'a' < 'b';"), JsValue::Boolean(true));
    assert_eq!(eval("'10' < '9';"), JsValue::Boolean(true));
    assert_eq!(eval("NaN < 1;"), JsValue::Boolean(false));
    assert_eq!(eval("NaN >= 1;"), JsValue::Boolean(false));
}

#[test]
fn test_logical_short_circuit() {
    assert_eq!(eval("true && 'right';"), JsValue::from("right"));
    assert_eq!(eval("false && missing();"), JsValue::Boolean(false));
    assert_eq!(eval("0 || 'fallback';"), JsValue::from("fallback"));
    assert_eq!(eval("'first' || missing();"), JsValue::from("first"));
    assert_eq!(eval("!0;"), JsValue::Boolean(true));
}

#[test]
fn test_this_at_global_is_global_object() {
    assert_eq!(eval("this === globalThis;"), JsValue::Boolean(true));
}

#[test]
fn test_last_expression_statement_wins() {
    assert_eq!(eval("1; 2; 3;"), JsValue::Number(3.0));
    assert_eq!(eval("var x = 5;"), JsValue::Undefined);
}
