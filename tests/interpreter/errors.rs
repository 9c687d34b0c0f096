//! Script-visible errors and their messages

use super::{eval, eval_result};
use jsrun::{JsError, JsValue};

#[test]
fn test_calling_non_function() {
    let result = eval_result("var x = 5; x();");
    assert!(matches!(result, Err(JsError::TypeError { .. })));
    assert_eq!(
        result.unwrap_err().to_string(),
        "TypeError: Function expected"
    );
}

#[test]
fn test_calling_missing_method() {
    let result = eval_result("var o = {}; o.run();");
    assert!(matches!(result, Err(JsError::TypeError { .. })));
}

#[test]
fn test_unresolved_identifier_read() {
    let result = eval_result("missing;");
    assert!(matches!(result, Err(JsError::ReferenceError { .. })));
    assert_eq!(
        result.unwrap_err().to_string(),
        "ReferenceError: missing is not defined"
    );
}

#[test]
fn test_typeof_tolerates_unresolved_identifier() {
    assert_eq!(eval("typeof missing;"), JsValue::from("undefined"));
}

#[test]
fn test_assignment_to_undeclared_creates_global() {
    assert_eq!(eval("implicit = 8; implicit;"), JsValue::Number(8.0));
}

#[test]
fn test_member_access_on_null() {
    let result = eval_result("null.field;");
    assert!(matches!(result, Err(JsError::TypeError { .. })));
}

#[test]
fn test_member_access_on_undefined() {
    let result = eval_result("var u; u.field;");
    assert!(matches!(result, Err(JsError::TypeError { .. })));
}

#[test]
fn test_unbounded_recursion_overflows() {
    let result = eval_result("function loop() { return loop(); } loop();");
    assert!(matches!(result, Err(JsError::RangeError { .. })));
    assert_eq!(
        result.unwrap_err().to_string(),
        "RangeError: Out of stack space"
    );
}

#[test]
fn test_recursion_near_the_limit_is_fine() {
    let source = "
        function down(n) {
            if (n === 0) { return 'done'; }
            return down(n - 1);
        }
        down(100);
    ";
    assert_eq!(eval(source), JsValue::from("done"));
}

#[test]
fn test_syntax_error_is_reported_not_panicked() {
    let result = eval_result("function (;");
    assert!(matches!(result, Err(JsError::SyntaxError { .. })));
}

#[test]
fn test_error_crosses_native_call_boundary() {
    let result = eval_result("function boom() { return missing; } boom.apply(null, []);");
    assert!(matches!(result, Err(JsError::ReferenceError { .. })));
}

#[test]
fn test_script_errors_are_flagged() {
    let err = eval_result("missing;").unwrap_err();
    assert!(err.is_script_error());
}
