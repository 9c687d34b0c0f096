//! Engine state and the function call machinery.
//!
//! The interpreter owns one contiguous value stack shared by every live
//! activation. A call pushes the actual arguments, pads them up to the
//! declared parameter count, then reserves slots for the hoisted locals;
//! identifiers resolve to those slots while the frame is live. Scopes and
//! arguments objects refer to frames through checked [`FrameId`] handles
//! rather than pointers, so anything that outlives its frame simply stops
//! resolving instead of dangling.

pub mod arguments;
pub mod builtins;
mod exec;

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use crate::compiler::{CompiledUnit, FunctionCode};
use crate::error::JsError;
use crate::string_dict::StringDict;
use crate::value::{
    CheapClone, ExoticObject, FunctionKind, FunctionObject, InterpretedFunction, JsObject,
    JsObjectRef, JsString, JsValue, Property, PropertyKey,
};

/// Call depth at which script recursion overflows.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Control flow result of executing a statement.
#[derive(Debug)]
pub enum Completion {
    Normal(JsValue),
    Return(JsValue),
}

/// How a callable is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Plain invocation from the host or a builtin.
    Call,
    /// `new` expression.
    Construct,
    /// Plain invocation issued by running script code.
    InternalCall,
}

impl CallKind {
    /// Fold the engine-internal marker away before handing the kind to a
    /// callee.
    pub fn masked(self) -> CallKind {
        match self {
            CallKind::InternalCall => CallKind::Call,
            other => other,
        }
    }
}

/// Signature shared by every builtin implemented in Rust.
pub type NativeProc =
    fn(&mut Interpreter, &JsValue, CallKind, &[JsValue]) -> Result<JsValue, JsError>;

/// Handle to a call frame.
///
/// A stale handle (its frame already popped, even if the slot was reused)
/// fails to resolve because the serial no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId {
    index: usize,
    serial: u64,
}

/// One link of a scope chain.
///
/// While the owning activation runs, parameters and locals live on the
/// engine stack and `frame` names that activation. Once the activation is
/// torn down with the scope still referenced, the bindings move into
/// `vars` and `frame` is cleared.
#[derive(Debug)]
pub struct Scope {
    /// Variable bindings held on the heap.
    pub vars: JsObjectRef,
    /// Live activation whose stack slots shadow `vars`, if any.
    pub frame: Cell<Option<FrameId>>,
    pub parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new(vars: JsObjectRef, parent: Option<Rc<Scope>>) -> Rc<Self> {
        Rc::new(Scope {
            vars,
            frame: Cell::new(None),
            parent,
        })
    }
}

/// Activation record of an interpreted call.
#[derive(Debug)]
pub struct CallFrame {
    serial: u64,
    /// The function object being executed.
    pub function: JsObjectRef,
    pub code: Rc<FunctionCode>,
    pub unit: Rc<CompiledUnit>,
    /// Innermost scope of this activation.
    pub base_scope: Rc<Scope>,
    pub this_value: JsValue,
    /// First argument slot in the engine stack.
    pub arguments_off: usize,
    /// Number of arguments actually passed.
    pub argc: usize,
    /// Arguments object, created lazily on first reference.
    pub arguments_obj: Option<JsObjectRef>,
}

impl CallFrame {
    /// Stack slot of parameter `i`.
    pub fn param_slot(&self, i: usize) -> usize {
        self.arguments_off + i
    }

    /// Stack slot of hoisted local `i`. Locals sit after the argument
    /// block, which covers the larger of argc and the parameter count.
    pub fn var_slot(&self, i: usize) -> usize {
        self.arguments_off + self.argc.max(self.code.params.len()) + i
    }
}

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Bootstrap has not finished; script cannot run.
    Uninitialized,
    Running,
    /// Shut down; script can no longer run.
    Closed,
}

/// The script engine: global object, builtin roots, and the control stack.
pub struct Interpreter {
    state: EngineState,
    /// Global object; doubles as the variable object of global code.
    pub global: JsObjectRef,
    /// Root of every scope chain.
    pub global_scope: Rc<Scope>,
    /// String dictionary for deduplicating identifiers and property names.
    pub string_dict: StringDict,
    /// Prototype of plain objects.
    pub object_prototype: JsObjectRef,
    /// Prototype of every function instance.
    pub function_prototype: JsObjectRef,
    /// The `Function` constructor.
    pub function_constructor: JsObjectRef,
    /// Argument and local slots of live activations.
    pub(crate) stack: Vec<JsValue>,
    pub(crate) frames: Vec<CallFrame>,
    /// Unit whose top-level code is currently running, if any. Function
    /// expressions evaluated at global level resolve through it.
    pub(crate) current_unit: Option<Rc<CompiledUnit>>,
    next_serial: u64,
    call_depth: usize,
    max_depth: usize,
    /// Sink for `console.log` output.
    pub output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an engine with a custom recursion limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        let string_dict = StringDict::with_common_strings();
        let global = JsObject::new().into_ref();
        let global_scope = Scope::new(global.cheap_clone(), None);

        // Placeholders; the real prototypes are wired by the standard
        // library bootstrap below.
        let placeholder = global.cheap_clone();
        let mut interp = Self {
            state: EngineState::Uninitialized,
            global,
            global_scope,
            string_dict,
            object_prototype: placeholder.cheap_clone(),
            function_prototype: placeholder.cheap_clone(),
            function_constructor: placeholder,
            stack: Vec::new(),
            frames: Vec::new(),
            current_unit: None,
            next_serial: 0,
            call_depth: 0,
            max_depth,
            output: Box::new(std::io::stdout()),
        };

        builtins::init_standard_library(&mut interp);
        interp.state = EngineState::Running;
        interp
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Shut the engine down. Interpreted calls fail from here on.
    pub fn close(&mut self) {
        if self.state == EngineState::Closed {
            return;
        }
        self.state = EngineState::Closed;
        self.release_roots();
    }

    /// Drop the control stack and empty the root objects. Reference cycles
    /// run through the global object and the bootstrap pair, so their
    /// property tables are cleared here instead of relying on drop order.
    fn release_roots(&mut self) {
        self.frames.clear();
        self.stack.clear();
        for root in [
            &self.global,
            &self.object_prototype,
            &self.function_prototype,
            &self.function_constructor,
        ] {
            let mut obj = root.borrow_mut();
            obj.properties.clear();
            obj.prototype = None;
        }
    }

    /// Intern a string.
    pub fn intern(&mut self, s: &str) -> JsString {
        self.string_dict.get_or_insert(s)
    }

    /// Intern a property name.
    pub fn key(&mut self, name: &str) -> PropertyKey {
        PropertyKey::String(self.intern(name))
    }

    /// Register a native method as a non-enumerable property.
    pub fn register_method(&mut self, obj: &JsObjectRef, name: &str, proc: NativeProc, arity: u32) {
        let func = builtins::function::create_native_function(
            self,
            Some(name),
            proc,
            arity,
            FunctionObject::METHOD,
        );
        let key = self.key(name);
        obj.borrow_mut().define_property(
            key,
            Property::with_attributes(JsValue::Object(func), true, false, true),
        );
    }

    pub(crate) fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    pub(crate) fn frame_by_id(&self, id: FrameId) -> Option<&CallFrame> {
        self.frames.get(id.index).filter(|f| f.serial == id.serial)
    }

    pub(crate) fn frame_by_id_mut(&mut self, id: FrameId) -> Option<&mut CallFrame> {
        self.frames
            .get_mut(id.index)
            .filter(|f| f.serial == id.serial)
    }

    pub(crate) fn frame_id_at(&self, index: usize) -> Option<FrameId> {
        self.frames
            .get(index)
            .map(|f| FrameId { index, serial: f.serial })
    }

    pub(crate) fn stack_slot(&self, slot: usize) -> JsValue {
        self.stack.get(slot).cloned().unwrap_or_default()
    }

    pub(crate) fn set_stack_slot(&mut self, slot: usize, value: JsValue) {
        if let Some(cell) = self.stack.get_mut(slot) {
            *cell = value;
        }
    }

    /// Call or construct a value.
    ///
    /// The receiver is used as-is for plain calls; construction ignores it
    /// and builds a fresh object from the target's `prototype` property.
    /// Native callees receive the kind with the internal marker folded
    /// away; those flagged as constructors decide construction behavior
    /// themselves, the rest get the generic fresh-receiver treatment.
    pub fn invoke(
        &mut self,
        target: &JsValue,
        this_value: &JsValue,
        kind: CallKind,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        enum Target {
            Native(NativeProc),
            Interpreted(InterpretedFunction),
        }

        let Some(obj) = target.as_object() else {
            return Err(JsError::type_error("Function expected"));
        };
        let obj = obj.cheap_clone();

        let (callee, constructible) = {
            let borrowed = obj.borrow();
            let Some(function) = borrowed.as_function() else {
                return Err(JsError::type_error("Function expected"));
            };
            let callee = match &function.kind {
                FunctionKind::Native(native) => Target::Native(native.proc),
                FunctionKind::Interpreted(interpreted) => {
                    Target::Interpreted(InterpretedFunction {
                        unit: Rc::clone(&interpreted.unit),
                        code: Rc::clone(&interpreted.code),
                        scope: interpreted.scope.clone(),
                    })
                }
            };
            (callee, function.is_constructible())
        };

        if self.call_depth >= self.max_depth {
            return Err(JsError::range_error("Out of stack space"));
        }

        self.call_depth += 1;
        let result = match callee {
            Target::Native(proc) => {
                if kind == CallKind::Construct && !constructible {
                    self.construct_native(proc, &obj, kind.masked(), args)
                } else {
                    self.call_native(proc, this_value, kind.masked(), args)
                }
            }
            Target::Interpreted(function) => {
                self.call_interpreted(&obj, &function, this_value, kind.masked(), args)
            }
        };
        self.call_depth -= 1;
        result
    }

    /// Native dispatch: bind the receiver, defaulting to the global
    /// object, and return whatever the procedure returns.
    fn call_native(
        &mut self,
        proc: NativeProc,
        this_value: &JsValue,
        kind: CallKind,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let receiver = if this_value.is_null_or_undefined() {
            JsValue::Object(self.global.cheap_clone())
        } else {
            this_value.clone()
        };
        proc(self, &receiver, kind, args)
    }

    /// Construction on a builtin with no construct handling of its own:
    /// the fresh receiver becomes `this`, and a non-object result is
    /// replaced by that receiver.
    fn construct_native(
        &mut self,
        proc: NativeProc,
        func: &JsObjectRef,
        kind: CallKind,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let receiver = self.construct_receiver(func);
        let value = proc(self, &JsValue::Object(receiver.cheap_clone()), kind, args)?;
        Ok(match value {
            JsValue::Object(obj) => JsValue::Object(obj),
            _ => JsValue::Object(receiver),
        })
    }

    fn call_interpreted(
        &mut self,
        func: &JsObjectRef,
        function: &InterpretedFunction,
        this_value: &JsValue,
        kind: CallKind,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        if self.state != EngineState::Running {
            return Err(JsError::unexpected_state("script engine is not running"));
        }

        let receiver = (kind == CallKind::Construct).then(|| self.construct_receiver(func));
        let this_value = match &receiver {
            Some(obj) => JsValue::Object(obj.cheap_clone()),
            None => self.bind_this(this_value)?,
        };

        let frame_id = self.push_frame(func, function, this_value, args);
        let outcome = self.run_frame(frame_id);
        self.pop_frame();

        let value = match outcome? {
            Completion::Return(value) => value,
            Completion::Normal(_) => JsValue::Undefined,
        };
        Ok(match receiver {
            Some(receiver) => match value {
                JsValue::Object(obj) => JsValue::Object(obj),
                _ => JsValue::Object(receiver),
            },
            None => value,
        })
    }

    /// The object a `new` expression populates: prototype comes from the
    /// constructor's `prototype` property, read at call time, falling back
    /// to `Object.prototype` when that value is not an object.
    fn construct_receiver(&mut self, constructor: &JsObjectRef) -> JsObjectRef {
        let key = self.key("prototype");
        let proto = match constructor.borrow().get_property(&key) {
            Some(JsValue::Object(proto)) => proto,
            _ => self.object_prototype.cheap_clone(),
        };
        JsObject::with_prototype(proto).into_ref()
    }

    /// Receiver seen by an interpreted body: explicit objects pass
    /// through, `undefined` and `null` bind the global object, primitives
    /// are wrapped.
    fn bind_this(&mut self, this_value: &JsValue) -> Result<JsValue, JsError> {
        if this_value.is_null_or_undefined() {
            return Ok(JsValue::Object(self.global.cheap_clone()));
        }
        if this_value.as_object().is_some() {
            return Ok(this_value.clone());
        }
        Ok(JsValue::Object(self.to_object(this_value)?))
    }

    /// ToObject: wrap a primitive, reject `undefined` and `null`.
    pub fn to_object(&mut self, value: &JsValue) -> Result<JsObjectRef, JsError> {
        match value {
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error("Object expected")),
            JsValue::Object(obj) => Ok(obj.cheap_clone()),
            primitive => {
                let mut obj = JsObject::with_prototype(self.object_prototype.cheap_clone());
                obj.exotic = ExoticObject::Primitive(primitive.clone());
                Ok(obj.into_ref())
            }
        }
    }

    fn push_frame(
        &mut self,
        func: &JsObjectRef,
        function: &InterpretedFunction,
        this_value: JsValue,
        args: &[JsValue],
    ) -> FrameId {
        let vars = JsObject::new().into_ref();
        let parent = match &function.scope {
            Some(scope) => Rc::clone(scope),
            None => Rc::clone(&self.global_scope),
        };
        let base_scope = Scope::new(vars, Some(parent));

        let arguments_off = self.stack.len();
        let argc = args.len();
        let param_cnt = function.code.params.len();
        self.stack.extend_from_slice(args);
        if argc < param_cnt {
            self.stack
                .resize(arguments_off + param_cnt, JsValue::Undefined);
        }
        let with_locals = self.stack.len() + function.code.vars.len();
        self.stack.resize(with_locals, JsValue::Undefined);

        let serial = self.next_serial;
        self.next_serial += 1;
        let frame_id = FrameId {
            index: self.frames.len(),
            serial,
        };
        base_scope.frame.set(Some(frame_id));

        self.frames.push(CallFrame {
            serial,
            function: func.cheap_clone(),
            code: Rc::clone(&function.code),
            unit: Rc::clone(&function.unit),
            base_scope,
            this_value,
            arguments_off,
            argc,
            arguments_obj: None,
        });
        frame_id
    }

    /// Tear down the innermost frame: escaped bindings move off the stack
    /// first, then the arguments object is detached, then the frame's
    /// stack region is released.
    fn pop_frame(&mut self) {
        let Some(index) = self.frames.len().checked_sub(1) else {
            return;
        };
        // The frame itself holds one scope reference; more means a closure
        // captured the scope and the bindings must survive the frame.
        let escaped = match self.frames.get(index) {
            Some(frame) => Rc::strong_count(&frame.base_scope) > 1,
            None => return,
        };
        if escaped {
            self.detach_variables(index);
        }
        arguments::detach_arguments_object(self, index);
        if let Some(frame) = self.frames.pop() {
            frame.base_scope.frame.set(None);
            self.stack.truncate(frame.arguments_off);
        }
    }

    /// Copy parameters and locals from the stack into the scope's variable
    /// object and switch the scope to heap mode.
    fn detach_variables(&self, index: usize) {
        let Some(frame) = self.frames.get(index) else {
            return;
        };
        let code = Rc::clone(&frame.code);
        let vars = frame.base_scope.vars.cheap_clone();
        let arguments_off = frame.arguments_off;
        let vars_off = arguments_off + frame.argc.max(code.params.len());
        frame.base_scope.frame.set(None);

        for (i, name) in code.params.iter().enumerate() {
            let value = self.stack_slot(arguments_off + i);
            vars.borrow_mut()
                .set_property(PropertyKey::String(name.cheap_clone()), value);
        }
        for (i, name) in code.vars.iter().enumerate() {
            let value = self.stack_slot(vars_off + i);
            vars.borrow_mut()
                .set_property(PropertyKey::String(name.cheap_clone()), value);
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.release_roots();
    }
}
