//! The arguments object: live aliasing, identity, escape and detach

use super::eval;
use jsrun::JsValue;

#[test]
fn test_length_counts_actual_arguments() {
    assert_eq!(
        eval("function f(a, b, c) { return arguments.length; } f(1, 2);"),
        JsValue::Number(2.0)
    );
    assert_eq!(
        eval("function f() { return arguments.length; } f(1, 2, 3, 4);"),
        JsValue::Number(4.0)
    );
}

#[test]
fn test_indexed_reads() {
    assert_eq!(
        eval("function f(a, b) { return arguments[0] + arguments[1]; } f(30, 12);"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_reads_beyond_declared_parameters() {
    assert_eq!(
        eval("function f(a) { return arguments[2]; } f(1, 2, 3);"),
        JsValue::Number(3.0)
    );
    assert_eq!(
        eval("function f(a) { return typeof arguments[5]; } f(1);"),
        JsValue::from("undefined")
    );
}

#[test]
fn test_writing_argument_slot_updates_parameter() {
    assert_eq!(
        eval("function f(a) { arguments[0] = 'patched'; return a; } f('original');"),
        JsValue::from("patched")
    );
}

#[test]
fn test_writing_parameter_updates_argument_slot() {
    assert_eq!(
        eval("function f(a) { a = 'patched'; return arguments[0]; } f('original');"),
        JsValue::from("patched")
    );
}

#[test]
fn test_same_object_within_one_activation() {
    assert_eq!(
        eval("function f() { return arguments === arguments; } f();"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_fresh_object_per_activation() {
    let source = "
        function capture() { return arguments; }
        capture(1) === capture(1);
    ";
    assert_eq!(eval(source), JsValue::Boolean(false));
}

#[test]
fn test_callee_allows_anonymous_recursion() {
    let source = "
        var fact = function(n) {
            if (n < 2) { return 1; }
            return n * arguments.callee(n - 1);
        };
        fact(5);
    ";
    assert_eq!(eval(source), JsValue::Number(120.0));
}

#[test]
fn test_passing_arguments_to_another_function() {
    let source = "
        function sum(list) {
            var total = 0;
            var i = 0;
            while (i < list.length) { total = total + list[i]; i = i + 1; }
            return total;
        }
        function f() { return sum(arguments); }
        f(1, 2, 3, 4);
    ";
    assert_eq!(eval(source), JsValue::Number(10.0));
}

#[test]
fn test_escaped_arguments_keeps_values_after_return() {
    let source = "
        function capture(a, b) { return arguments; }
        var saved = capture(3, 4);
        saved[0] + saved[1];
    ";
    assert_eq!(eval(source), JsValue::Number(7.0));
}

#[test]
fn test_escaped_arguments_sees_final_parameter_values() {
    let source = "
        function capture(a) { var r = arguments; a = 'final'; return r; }
        capture('initial')[0];
    ";
    assert_eq!(eval(source), JsValue::from("final"));
}

#[test]
fn test_escaped_arguments_accepts_writes() {
    let source = "
        function capture() { return arguments; }
        var saved = capture('old');
        saved[0] = 'new';
        saved[0];
    ";
    assert_eq!(eval(source), JsValue::from("new"));
}

#[test]
fn test_escaped_length_survives() {
    let source = "
        function capture() { return arguments; }
        capture(1, 2, 3).length;
    ";
    assert_eq!(eval(source), JsValue::Number(3.0));
}

#[test]
fn test_arguments_survive_closure_escape() {
    let source = "
        function outer(a) {
            return function() { return arguments.length; };
        }
        outer(1)(9, 9);
    ";
    assert_eq!(eval(source), JsValue::Number(2.0));
}

#[test]
fn test_arguments_is_function_local() {
    let source = "
        function outer() {
            var seen = arguments[0];
            function inner() { return arguments[0]; }
            return seen + inner('inner');
        }
        outer('outer');
    ";
    assert_eq!(eval(source), JsValue::from("outerinner"));
}
