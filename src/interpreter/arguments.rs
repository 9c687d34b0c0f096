//! The `arguments` object of a function activation.
//!
//! The object is created lazily, on the first mention of the name inside a
//! running function, and is bound to the activation's variable object so
//! repeated mentions observe one identity. While the frame is live, indexed
//! access goes straight to the engine stack (or to the parameter bindings on
//! the variable object once the scope moved to the heap). When the frame
//! unwinds, the values are snapshotted into the object itself if anything
//! still references it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::JsError;
use crate::value::{
    ArgumentsObject, CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, Property,
    PropertyKey,
};

use super::{FrameId, Interpreter};

/// Where an indexed read or write lands for the object's current state.
enum Backing {
    StackSlot(usize),
    Named(JsObjectRef, JsString),
    Snapshot,
}

/// Create the arguments object for a live frame, or return the one already
/// made. Also installs the writable `arguments` binding on the frame's
/// variable object.
pub(crate) fn ensure_arguments_object(
    interp: &mut Interpreter,
    frame_id: FrameId,
) -> Result<JsObjectRef, JsError> {
    let (function, argc, vars, existing) = {
        let Some(frame) = interp.frame_by_id(frame_id) else {
            return Err(JsError::internal("arguments requested for a dead frame"));
        };
        (
            frame.function.cheap_clone(),
            frame.argc,
            frame.base_scope.vars.cheap_clone(),
            frame.arguments_obj.clone(),
        )
    };
    if let Some(obj) = existing {
        return Ok(obj);
    }

    let mut obj = JsObject::with_prototype(interp.object_prototype.cheap_clone());
    obj.exotic = ExoticObject::Arguments(ArgumentsObject {
        function: function.cheap_clone(),
        frame: Cell::new(Some(frame_id)),
        argc: Cell::new(argc as u32),
        buf: RefCell::new(None),
    });
    let obj = obj.into_ref();

    let length = interp.key("length");
    obj.borrow_mut().define_property(
        length,
        Property::with_attributes(JsValue::Number(argc as f64), true, false, true),
    );
    let callee = interp.key("callee");
    obj.borrow_mut().define_property(
        callee,
        Property::with_attributes(JsValue::Object(function), true, false, true),
    );

    let binding = interp.key("arguments");
    vars.borrow_mut().define_property(
        binding,
        Property::with_attributes(JsValue::Object(obj.cheap_clone()), true, false, true),
    );

    if let Some(frame) = interp.frame_by_id_mut(frame_id) {
        frame.arguments_obj = Some(obj.cheap_clone());
    }
    Ok(obj)
}

/// Disconnect the arguments object from a frame that is about to unwind.
///
/// The `arguments` binding on the variable object is reset first to cut the
/// scope <-> arguments reference cycle. If user code kept its own reference,
/// the argument values are copied off the stack into the object; parameters
/// of an already heap-detached scope are read back through their bindings so
/// assignments made after the detach are not lost.
pub(crate) fn detach_arguments_object(interp: &mut Interpreter, index: usize) {
    let taken = interp
        .frames
        .get_mut(index)
        .and_then(|frame| frame.arguments_obj.take());
    let Some(obj) = taken else {
        return;
    };
    let Some(own_id) = interp.frame_id_at(index) else {
        return;
    };

    let (vars, arguments_off, argc, params, on_stack) = {
        let Some(frame) = interp.frames.get(index) else {
            return;
        };
        (
            frame.base_scope.vars.cheap_clone(),
            frame.arguments_off,
            frame.argc,
            Rc::clone(&frame.code.params),
            frame.base_scope.frame.get() == Some(own_id),
        )
    };

    let binding = interp.key("arguments");
    vars.borrow_mut().set_property(binding, JsValue::Undefined);

    {
        let borrowed = obj.borrow();
        if let Some(payload) = borrowed.as_arguments() {
            payload.frame.set(None);
        }
    }

    // `obj` now holds the frame's former reference; more than one strong
    // count means user code kept the object alive past its frame.
    if Rc::strong_count(&obj) > 1 {
        let mut buf = Vec::new();
        if buf.try_reserve_exact(argc).is_err() {
            let borrowed = obj.borrow();
            if let Some(payload) = borrowed.as_arguments() {
                payload.argc.set(0);
            }
            return;
        }
        for i in 0..argc {
            let value = match params.get(i) {
                Some(param) if !on_stack => {
                    let key = PropertyKey::String(param.cheap_clone());
                    vars.borrow().get_property(&key).unwrap_or_default()
                }
                _ => interp.stack_slot(arguments_off + i),
            };
            buf.push(value);
        }
        let borrowed = obj.borrow();
        if let Some(payload) = borrowed.as_arguments() {
            *payload.buf.borrow_mut() = Some(buf.into_boxed_slice());
        }
    }
}

/// Indexed read for `index < argc`.
pub(crate) fn get_indexed(
    interp: &mut Interpreter,
    obj: &JsObjectRef,
    index: u32,
) -> Result<JsValue, JsError> {
    match resolve_backing(interp, obj, index)? {
        Backing::StackSlot(slot) => Ok(interp.stack_slot(slot)),
        Backing::Named(vars, name) => {
            let key = PropertyKey::String(name);
            let value = vars.borrow().get_property(&key).unwrap_or_default();
            Ok(value)
        }
        Backing::Snapshot => {
            let borrowed = obj.borrow();
            let value = borrowed
                .as_arguments()
                .and_then(|payload| {
                    payload
                        .buf
                        .borrow()
                        .as_ref()
                        .and_then(|buf| buf.get(index as usize).cloned())
                })
                .unwrap_or_default();
            Ok(value)
        }
    }
}

/// Indexed write for `index < argc`. Writes through to the live slot or
/// binding, so parameters and their arguments entries stay aliased until
/// the frame unwinds.
pub(crate) fn put_indexed(
    interp: &mut Interpreter,
    obj: &JsObjectRef,
    index: u32,
    value: JsValue,
) -> Result<(), JsError> {
    match resolve_backing(interp, obj, index)? {
        Backing::StackSlot(slot) => {
            interp.set_stack_slot(slot, value);
            Ok(())
        }
        Backing::Named(vars, name) => {
            vars.borrow_mut()
                .set_property(PropertyKey::String(name), value);
            Ok(())
        }
        Backing::Snapshot => {
            let borrowed = obj.borrow();
            if let Some(payload) = borrowed.as_arguments() {
                let mut buf = payload.buf.borrow_mut();
                if let Some(slot) = buf.as_mut().and_then(|b| b.get_mut(index as usize)) {
                    *slot = value;
                }
            }
            Ok(())
        }
    }
}

fn resolve_backing(
    interp: &Interpreter,
    obj: &JsObjectRef,
    index: u32,
) -> Result<Backing, JsError> {
    let borrowed = obj.borrow();
    let Some(payload) = borrowed.as_arguments() else {
        return Err(JsError::internal("indexed access on a non-arguments object"));
    };
    let idx = index as usize;

    if let Some(frame_id) = payload.frame.get() {
        if let Some(frame) = interp.frame_by_id(frame_id) {
            let on_stack = frame.base_scope.frame.get() == Some(frame_id);
            let backing = match frame.code.params.get(idx) {
                Some(param) if !on_stack => {
                    Backing::Named(frame.base_scope.vars.cheap_clone(), param.cheap_clone())
                }
                _ => Backing::StackSlot(frame.arguments_off + idx),
            };
            return Ok(backing);
        }
    }
    Ok(Backing::Snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler;
    use crate::value::FunctionKind;

    fn eval_source(source: &str) -> JsValue {
        let mut interp = Interpreter::new();
        let unit = compiler::compile(source, &mut interp.string_dict).unwrap();
        interp.run_program(&unit).unwrap()
    }

    #[test]
    fn test_live_read_and_length() {
        let source = "function f(a, b) { return arguments[0] + arguments.length; } f(7, 8);";
        assert_eq!(eval_source(source), JsValue::Number(9.0));
    }

    #[test]
    fn test_length_counts_actuals_not_params() {
        let source = "function f(a, b, c) { return arguments.length; } f(1);";
        assert_eq!(eval_source(source), JsValue::Number(1.0));
    }

    #[test]
    fn test_live_write_aliases_parameter() {
        let source = "function f(a) { arguments[0] = 5; return a; } f(1);";
        assert_eq!(eval_source(source), JsValue::Number(5.0));
        let source = "function f(a) { a = 6; return arguments[0]; } f(1);";
        assert_eq!(eval_source(source), JsValue::Number(6.0));
    }

    #[test]
    fn test_actuals_beyond_declared_params() {
        let source = "function f(a) { return arguments[2]; } f(1, 2, 3);";
        assert_eq!(eval_source(source), JsValue::Number(3.0));
    }

    #[test]
    fn test_callee_recursion() {
        let source = "
            function fact(n) {
                if (n === 0) { return 1; }
                return n * arguments.callee(n - 1);
            }
            fact(5);
        ";
        assert_eq!(eval_source(source), JsValue::Number(120.0));
    }

    #[test]
    fn test_same_identity_within_activation() {
        let source = "function f() { return arguments === arguments; } f();";
        assert_eq!(eval_source(source), JsValue::Boolean(true));
    }

    #[test]
    fn test_detached_snapshot_read() {
        let source = "
            function f(a, b) {
                var saved = arguments;
                return function() { return saved[0] + saved[1]; };
            }
            f(3, 4)();
        ";
        assert_eq!(eval_source(source), JsValue::Number(7.0));
    }

    #[test]
    fn test_detached_write_sticks() {
        let source = "
            function f(a) {
                var saved = arguments;
                return function() { saved[0] = 9; return saved[0]; };
            }
            f(1)();
        ";
        assert_eq!(eval_source(source), JsValue::Number(9.0));
    }

    #[test]
    fn test_snapshot_sees_later_parameter_writes() {
        let source = "
            function f(a) {
                var saved = arguments;
                a = 42;
                return function() { return saved[0]; };
            }
            f(1)();
        ";
        assert_eq!(eval_source(source), JsValue::Number(42.0));
    }

    #[test]
    fn test_detach_state_white_box() {
        let mut interp = Interpreter::new();
        let unit = compiler::compile(
            "function f(a, b) { var saved = arguments; return saved; } f(1, 2);",
            &mut interp.string_dict,
        )
        .unwrap();
        let result = interp.run_program(&unit).unwrap();

        let JsValue::Object(obj) = result else {
            panic!("expected an object result");
        };
        let borrowed = obj.borrow();
        let payload = borrowed.as_arguments().unwrap();
        assert!(payload.is_detached());
        assert_eq!(payload.len(), 2);
        let buf = payload.buf.borrow();
        let buf = buf.as_ref().unwrap();
        assert_eq!(buf[0], JsValue::Number(1.0));
        assert_eq!(buf[1], JsValue::Number(2.0));
    }

    #[test]
    fn test_degraded_snapshot_reads_undefined() {
        let mut interp = Interpreter::new();
        let unit = compiler::compile(
            "function f(a) { var saved = arguments; return saved; } f(8);",
            &mut interp.string_dict,
        )
        .unwrap();
        let result = interp.run_program(&unit).unwrap();

        let JsValue::Object(obj) = result else {
            panic!("expected an object result");
        };
        // the state detach leaves behind when the snapshot allocation fails
        {
            let borrowed = obj.borrow();
            let payload = borrowed.as_arguments().unwrap();
            payload.argc.set(0);
            *payload.buf.borrow_mut() = None;
        }

        let read = get_indexed(&mut interp, &obj, 0).unwrap();
        assert_eq!(read, JsValue::Undefined);
        let borrowed = obj.borrow();
        let payload = borrowed.as_arguments().unwrap();
        assert_eq!(payload.len(), 0);
    }

    #[test]
    fn test_detach_clears_scope_binding() {
        let mut interp = Interpreter::new();
        let unit = compiler::compile(
            "function f() { var keep = arguments; return function() { return keep; }; } f(41);",
            &mut interp.string_dict,
        )
        .unwrap();
        let result = interp.run_program(&unit).unwrap();

        let JsValue::Object(closure) = result else {
            panic!("expected a closure result");
        };
        let borrowed = closure.borrow();
        let function = borrowed.as_function().unwrap();
        let FunctionKind::Interpreted(interpreted) = &function.kind else {
            panic!("expected an interpreted function");
        };
        let scope = interpreted.scope.as_ref().unwrap();
        let key = PropertyKey::from("arguments");
        assert_eq!(
            scope.vars.borrow().get_property(&key),
            Some(JsValue::Undefined)
        );
        let keep = PropertyKey::from("keep");
        assert!(matches!(
            scope.vars.borrow().get_property(&keep),
            Some(JsValue::Object(_))
        ));
    }

    #[test]
    fn test_unsaved_arguments_fully_released() {
        fn holders_of_f(source: &str) -> usize {
            let mut interp = Interpreter::new();
            let unit = compiler::compile(source, &mut interp.string_dict).unwrap();
            let JsValue::Object(func) = interp.run_program(&unit).unwrap() else {
                panic!("expected the function back");
            };
            Rc::strong_count(&func)
        }

        // The object holds its callee, so anything keeping it alive after
        // the call shows up in the function's reference count.
        let baseline = holders_of_f("function f(a) { return 0; } f(1); f;");
        let touched = holders_of_f("function f(a) { arguments; return 0; } f(1); f;");
        assert_eq!(touched, baseline);
        let escaped = holders_of_f("function f(a) { leak = arguments; return 0; } f(1); f;");
        assert!(escaped > baseline);

        let repeated = holders_of_f(
            "function f() { arguments; return 0; }
             var i = 0;
             while (i < 50) { f.apply(null, []); i = i + 1; }
             f;",
        );
        assert_eq!(repeated, baseline);
    }
}
