//! Function objects: declarations, expressions, closures, construction

use super::eval;
use jsrun::JsValue;

#[test]
fn test_declaration_and_call() {
    assert_eq!(
        eval("function add(a, b) { return a + b; } add(2, 3);"),
        JsValue::Number(5.0)
    );
}

#[test]
fn test_declarations_are_hoisted() {
    assert_eq!(
        eval("var r = early(); function early() { return 'ok'; } r;"),
        JsValue::from("ok")
    );
}

#[test]
fn test_function_expression() {
    assert_eq!(
        eval("var square = function(n) { return n * n; }; square(6);"),
        JsValue::Number(36.0)
    );
}

#[test]
fn test_closure_captures_environment() {
    let source = "
        function makeCounter() {
            var count = 0;
            return function() { count = count + 1; return count; };
        }
        var next = makeCounter();
        next(); next();
        next();
    ";
    assert_eq!(eval(source), JsValue::Number(3.0));
}

#[test]
fn test_closures_do_not_share_activations() {
    let source = "
        function makeCounter() {
            var count = 0;
            return function() { count = count + 1; return count; };
        }
        var a = makeCounter();
        var b = makeCounter();
        a(); a();
        b();
    ";
    assert_eq!(eval(source), JsValue::Number(1.0));
}

#[test]
fn test_method_this_binding() {
    assert_eq!(
        eval("var o = { x: 40, get: function() { return this.x + 2; } }; o.get();"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_detached_method_gets_global_this() {
    let source = "
        var x = 'global';
        var o = { x: 'own', get: function() { return this.x; } };
        var f = o.get;
        f();
    ";
    assert_eq!(eval(source), JsValue::from("global"));
}

#[test]
fn test_new_builds_receiver_from_prototype() {
    let source = "
        function Point(x, y) { this.x = x; this.y = y; }
        Point.prototype.norm = function() { return this.x * this.x + this.y * this.y; };
        var p = new Point(3, 4);
        p.norm();
    ";
    assert_eq!(eval(source), JsValue::Number(25.0));
}

#[test]
fn test_prototype_is_read_at_construction_time() {
    let source = "
        function T() {}
        T.prototype = { tag: 'first' };
        var a = new T();
        T.prototype = { tag: 'second' };
        var b = new T();
        a.tag === 'first' && b.tag === 'second';
    ";
    assert_eq!(eval(source), JsValue::Boolean(true));
}

#[test]
fn test_new_on_builtin_without_prototype_property() {
    // parseFloat returns a number, so the fresh receiver survives; it
    // inherits from Object.prototype for want of a `prototype` value.
    assert_eq!(
        eval("var o = new parseFloat('1'); typeof o;"),
        JsValue::from("object")
    );
    assert_eq!(
        eval("var o = new parseFloat('1'); o.hasOwnProperty('x');"),
        JsValue::Boolean(false)
    );
}

#[test]
fn test_constructor_object_return_replaces_receiver() {
    let source = "
        function Make() { this.kind = 'receiver'; return { kind: 'explicit' }; }
        new Make().kind;
    ";
    assert_eq!(eval(source), JsValue::from("explicit"));
}

#[test]
fn test_constructor_primitive_return_is_ignored() {
    let source = "
        function Make() { this.kind = 'receiver'; return 42; }
        new Make().kind;
    ";
    assert_eq!(eval(source), JsValue::from("receiver"));
}

#[test]
fn test_instances_share_prototype_methods() {
    let source = "
        function T() {}
        T.prototype.tag = function() { return 'shared'; };
        var a = new T();
        var b = new T();
        a.tag === b.tag;
    ";
    assert_eq!(eval(source), JsValue::Boolean(true));
}

#[test]
fn test_constructor_back_link() {
    assert_eq!(
        eval("function f() {} f.constructor === Function;"),
        JsValue::Boolean(true)
    );
    assert_eq!(
        eval("function T() {} new T().constructor === T;"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_missing_arguments_are_undefined() {
    assert_eq!(
        eval("function probe(a, b) { return typeof b; } probe(1);"),
        JsValue::from("undefined")
    );
}

#[test]
fn test_extra_arguments_are_accepted() {
    assert_eq!(
        eval("function first(a) { return a; } first(1, 2, 3);"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_length_property() {
    assert_eq!(eval("function f(a, b, c) { return 0; } f.length;"), JsValue::Number(3.0));
    assert_eq!(eval("function g() { return 0; } g.length;"), JsValue::Number(0.0));
}

#[test]
fn test_length_is_not_writable() {
    assert_eq!(
        eval("function f(a) { return 0; } f.length = 99; f.length;"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_to_string_returns_exact_source() {
    assert_eq!(
        eval("function spaced( a ) { return  a; } spaced.toString();"),
        JsValue::from("function spaced( a ) { return  a; }")
    );
}

#[test]
fn test_recursion() {
    let source = "
        function fact(n) {
            if (n < 2) { return 1; }
            return n * fact(n - 1);
        }
        fact(6);
    ";
    assert_eq!(eval(source), JsValue::Number(720.0));
}

#[test]
fn test_mutual_recursion() {
    let source = "
        function isEven(n) { if (n === 0) { return true; } return isOdd(n - 1); }
        function isOdd(n) { if (n === 0) { return false; } return isEven(n - 1); }
        isEven(10);
    ";
    assert_eq!(eval(source), JsValue::Boolean(true));
}

#[test]
fn test_named_function_expression_is_not_a_global() {
    assert_eq!(
        eval("var f = function named() { return 1; }; typeof named;"),
        JsValue::from("undefined")
    );
}

#[test]
fn test_nested_functions_resolve_outer_locals() {
    let source = "
        function outer(a) {
            function inner(b) { return a + b; }
            return inner(10);
        }
        outer(1);
    ";
    assert_eq!(eval(source), JsValue::Number(11.0));
}
