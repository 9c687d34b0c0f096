//! Runtime value representation
//!
//! The core JsValue type and the reference-counted object model, including
//! the two callable payloads (native and interpreted functions) and the
//! arguments object that aliases a live call frame.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::compiler::{CompiledUnit, FunctionCode};
use crate::interpreter::{FrameId, NativeProc, Scope};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit when a clone only bumps a reference count. Regular
/// `.clone()` still works but a `cheap_clone()` call documents the cost.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectRef),
}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    /// Check if this value is callable (a function object)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => obj.borrow().is_callable(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get the typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object", // Historical quirk
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) => {
                if obj.borrow().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// Convert to number (ToNumber)
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => {
                let trimmed = s.as_str().trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            JsValue::Object(obj) => match &obj.borrow().exotic {
                ExoticObject::Primitive(inner) => inner.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// Convert to an unsigned 32-bit integer (ToUint32)
    pub fn to_uint32(&self) -> u32 {
        let n = self.to_number();
        if !n.is_finite() || n == 0.0 {
            return 0;
        }
        let n = n.trunc();
        let m = n.rem_euclid(4_294_967_296.0);
        m as u32
    }

    /// Convert to string (ToString) for primitives.
    ///
    /// Objects render their generic form here; the interpreter is
    /// responsible for routing function objects through their source
    /// rendering before falling back to this.
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(obj) => match &obj.borrow().exotic {
                ExoticObject::Primitive(inner) => inner.to_js_string(),
                _ => JsString::from("[object Object]"),
            },
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => {
                // NaN !== NaN
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Render a number the way script-level ToString does.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Object(obj) => {
                let obj = obj.borrow();
                match &obj.exotic {
                    ExoticObject::Ordinary => write!(f, "{{...}}"),
                    ExoticObject::Function(func) => {
                        let name = func.name().unwrap_or("anonymous");
                        write!(f, "[Function: {}]", name)
                    }
                    ExoticObject::Arguments(args) => write!(f, "[Arguments({})]", args.len()),
                    ExoticObject::Primitive(inner) => write!(f, "[{:?}]", inner),
                }
            }
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

// Conversions from Rust types

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString(Rc<str>);

// JsString wraps Rc<str>, so clone is cheap (just reference count increment)
impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a heap-allocated, reference-counted object
pub type JsObjectRef = Rc<RefCell<JsObject>>;

/// Property table preserving insertion order, hashed with FxHasher.
pub type PropertyMap = IndexMap<PropertyKey, Property, BuildHasherDefault<FxHasher>>;

/// A JavaScript object
#[derive(Debug)]
pub struct JsObject {
    /// Prototype link
    pub prototype: Option<JsObjectRef>,
    /// Whether the object can have properties added
    pub extensible: bool,
    /// Object properties in insertion order
    pub properties: PropertyMap,
    /// Exotic object behavior
    pub exotic: ExoticObject,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            prototype: None,
            extensible: true,
            properties: PropertyMap::default(),
            exotic: ExoticObject::Ordinary,
        }
    }

    /// Create a new ordinary object with a prototype
    pub fn with_prototype(prototype: JsObjectRef) -> Self {
        Self {
            prototype: Some(prototype),
            extensible: true,
            properties: PropertyMap::default(),
            exotic: ExoticObject::Ordinary,
        }
    }

    /// Wrap into a shared reference
    pub fn into_ref(self) -> JsObjectRef {
        Rc::new(RefCell::new(self))
    }

    /// Check if this object is callable
    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    pub fn as_function(&self) -> Option<&FunctionObject> {
        match &self.exotic {
            ExoticObject::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_arguments(&self) -> Option<&ArgumentsObject> {
        match &self.exotic {
            ExoticObject::Arguments(args) => Some(args),
            _ => None,
        }
    }

    /// Get an own property
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Get a property value, searching the prototype chain
    pub fn get_property(&self, key: &PropertyKey) -> Option<JsValue> {
        if let Some(prop) = self.properties.get(key) {
            return Some(prop.value.clone());
        }

        if let Some(ref proto) = self.prototype {
            return proto.borrow().get_property(key);
        }

        None
    }

    /// Set a property, respecting the writable attribute
    pub fn set_property(&mut self, key: PropertyKey, value: JsValue) {
        if let Some(prop) = self.properties.get_mut(&key) {
            if prop.writable {
                prop.value = value;
            }
        } else if self.extensible {
            self.properties.insert(key, Property::data(value));
        }
    }

    /// Define a property with explicit attributes, replacing any existing one
    pub fn define_property(&mut self, key: PropertyKey, prop: Property) {
        self.properties.insert(key, prop);
    }

    /// Check if object has own property
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Property key (string or array index)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Index(u32),
}

impl PropertyKey {
    pub fn from_value(value: &JsValue) -> Self {
        match value {
            JsValue::Number(n) => {
                let idx = *n as u32;
                if idx as f64 == *n && *n >= 0.0 {
                    PropertyKey::Index(idx)
                } else {
                    PropertyKey::String(value.to_js_string())
                }
            }
            JsValue::String(s) => PropertyKey::from(s.cheap_clone()),
            _ => PropertyKey::String(value.to_js_string()),
        }
    }

    /// Check if this key equals a string literal (avoids allocation)
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        match self {
            PropertyKey::String(js_str) => js_str.as_str() == s,
            PropertyKey::Index(_) => false,
        }
    }
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(s: &str) -> Self {
        // Fast path: check first char is a digit before parsing
        if let Some(first) = s.bytes().next() {
            if first.is_ascii_digit() {
                if let Ok(idx) = s.parse::<u32>() {
                    // Verify it's canonical (no leading zeros except "0")
                    if idx.to_string() == s {
                        return PropertyKey::Index(idx);
                    }
                }
            }
        }
        PropertyKey::String(JsString::from(s))
    }
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(s: JsString) -> Self {
        if let Some(first) = s.as_str().bytes().next() {
            if first.is_ascii_digit() {
                if let Ok(idx) = s.parse::<u32>() {
                    if idx.to_string() == s.as_str() {
                        return PropertyKey::Index(idx);
                    }
                }
            }
        }
        PropertyKey::String(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        PropertyKey::Index(idx)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Object property descriptor
#[derive(Debug, Clone)]
pub struct Property {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    pub fn data(value: JsValue) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn data_readonly(value: JsValue) -> Self {
        Self {
            value,
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
        }
    }
}

/// Exotic object behavior
#[derive(Debug)]
pub enum ExoticObject {
    /// Ordinary object
    Ordinary,
    /// Function exotic object
    Function(FunctionObject),
    /// Arguments exotic object, aliasing a live call frame until detached
    Arguments(ArgumentsObject),
    /// Wrapper object produced by coercing a primitive receiver
    Primitive(JsValue),
}

/// The callable payload shared by both function kinds.
///
/// `flags` carries registration attributes: the low bits encode the declared
/// arity for builtins, and the constructor/method bits record how the
/// function was registered. `length` is the declared arity exposed to
/// script.
#[derive(Debug)]
pub struct FunctionObject {
    pub name: Option<JsString>,
    pub flags: u32,
    pub length: u32,
    pub kind: FunctionKind,
}

impl FunctionObject {
    /// Low flag bits encode the declared arity of a builtin.
    pub const ARG_MASK: u32 = 0x00ff;
    /// The function was registered as a prototype method.
    pub const METHOD: u32 = 0x0100;
    /// The function participates in construction with its own behavior.
    pub const CONSTRUCTOR: u32 = 0x0200;

    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|s| s.as_str())
    }

    pub fn is_constructible(&self) -> bool {
        self.flags & Self::CONSTRUCTOR != 0
    }
}

/// The two callable kinds behind one shared record
#[derive(Debug)]
pub enum FunctionKind {
    Native(NativeFunction),
    Interpreted(InterpretedFunction),
}

/// Host-provided procedure
pub struct NativeFunction {
    pub proc: NativeProc,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction")
    }
}

/// Source-derived closure: an immutable compiled unit, the metadata of one
/// function inside it, and the captured scope chain (absent for top-level
/// and dynamically constructed functions).
#[derive(Debug)]
pub struct InterpretedFunction {
    pub unit: Rc<CompiledUnit>,
    pub code: Rc<FunctionCode>,
    pub scope: Option<Rc<Scope>>,
}

/// Array-like exposure of a call's actual arguments.
///
/// While the owning call is active, `frame` names the live activation and
/// index access aliases its stack slots. Once the frame is torn down the
/// values live in `buf` and `frame` is cleared; exactly one of the two
/// holds at any time after creation.
#[derive(Debug)]
pub struct ArgumentsObject {
    /// Owning function, held strongly for the callee property and for
    /// name-based parameter lookup after the stack slots are gone.
    pub function: JsObjectRef,
    /// Checked reference to the live frame; cleared at detach.
    pub frame: Cell<Option<FrameId>>,
    /// Number of actual arguments supplied at call time.
    pub argc: Cell<u32>,
    /// Snapshot of the argument values, populated at detach when the
    /// object outlives its frame.
    pub buf: RefCell<Option<Box<[JsValue]>>>,
}

impl ArgumentsObject {
    pub fn len(&self) -> u32 {
        self.argc.get()
    }

    pub fn is_empty(&self) -> bool {
        self.argc.get() == 0
    }

    pub fn is_detached(&self) -> bool {
        self.frame.get().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_boolean() {
        assert!(!JsValue::Undefined.to_boolean());
        assert!(!JsValue::Null.to_boolean());
        assert!(!JsValue::Number(0.0).to_boolean());
        assert!(!JsValue::Number(f64::NAN).to_boolean());
        assert!(!JsValue::from("").to_boolean());
        assert!(JsValue::Number(1.0).to_boolean());
        assert!(JsValue::from("x").to_boolean());
        assert!(JsValue::Object(JsObject::new().into_ref()).to_boolean());
    }

    #[test]
    fn test_to_number() {
        assert!(JsValue::Undefined.to_number().is_nan());
        assert_eq!(JsValue::Null.to_number(), 0.0);
        assert_eq!(JsValue::Boolean(true).to_number(), 1.0);
        assert_eq!(JsValue::from("42").to_number(), 42.0);
        assert_eq!(JsValue::from("  3.5  ").to_number(), 3.5);
        assert_eq!(JsValue::from("").to_number(), 0.0);
        assert!(JsValue::from("abc").to_number().is_nan());
    }

    #[test]
    fn test_to_uint32() {
        assert_eq!(JsValue::Number(3.7).to_uint32(), 3);
        assert_eq!(JsValue::Number(-1.0).to_uint32(), 4_294_967_295);
        assert_eq!(JsValue::Number(f64::NAN).to_uint32(), 0);
        assert_eq!(JsValue::Number(f64::INFINITY).to_uint32(), 0);
        assert_eq!(JsValue::Number(4_294_967_296.0).to_uint32(), 0);
        assert_eq!(JsValue::from("2").to_uint32(), 2);
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_strict_equals() {
        assert!(JsValue::Number(1.0).strict_equals(&JsValue::Number(1.0)));
        assert!(!JsValue::Number(f64::NAN).strict_equals(&JsValue::Number(f64::NAN)));
        assert!(!JsValue::Number(1.0).strict_equals(&JsValue::from("1")));

        let a = JsObject::new().into_ref();
        let b = JsObject::new().into_ref();
        assert!(JsValue::Object(a.clone()).strict_equals(&JsValue::Object(a.clone())));
        assert!(!JsValue::Object(a).strict_equals(&JsValue::Object(b)));
    }

    #[test]
    fn test_property_key_canonical_index() {
        assert_eq!(PropertyKey::from("3"), PropertyKey::Index(3));
        assert_eq!(
            PropertyKey::from("03"),
            PropertyKey::String(JsString::from("03"))
        );
        assert_eq!(
            PropertyKey::from("length"),
            PropertyKey::String(JsString::from("length"))
        );
        assert_eq!(
            PropertyKey::from_value(&JsValue::Number(2.0)),
            PropertyKey::Index(2)
        );
        assert_eq!(
            PropertyKey::from_value(&JsValue::Number(2.5)),
            PropertyKey::String(JsString::from("2.5"))
        );
    }

    #[test]
    fn test_prototype_chain_lookup() {
        let proto = JsObject::new().into_ref();
        proto
            .borrow_mut()
            .set_property(PropertyKey::from("x"), JsValue::Number(1.0));

        let obj = JsObject::with_prototype(proto).into_ref();
        let got = obj.borrow().get_property(&PropertyKey::from("x"));
        assert_eq!(got, Some(JsValue::Number(1.0)));
        assert!(!obj.borrow().has_own_property(&PropertyKey::from("x")));
    }

    #[test]
    fn test_readonly_property_ignores_set() {
        let obj = JsObject::new().into_ref();
        obj.borrow_mut().define_property(
            PropertyKey::from("k"),
            Property::data_readonly(JsValue::Number(1.0)),
        );
        obj.borrow_mut()
            .set_property(PropertyKey::from("k"), JsValue::Number(2.0));
        let got = obj.borrow().get_property(&PropertyKey::from("k"));
        assert_eq!(got, Some(JsValue::Number(1.0)));
    }
}
