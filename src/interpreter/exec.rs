//! Statement and expression evaluation.
//!
//! Identifiers resolve against the scope chain of the current activation:
//! scopes backed by a live frame map parameters and locals to engine stack
//! slots, everything else goes through object properties. The special name
//! `arguments` materializes the arguments object of the innermost function
//! on first touch.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::{
    ArrayExpression, AssignmentExpression, AssignmentTarget, BinaryExpression, BinaryOp,
    BlockStatement, CallExpression, Expression, FunctionExpression, IfStatement, LiteralValue,
    LogicalExpression, LogicalOp, MemberExpression, MemberProperty, NewExpression,
    ObjectExpression, ObjectPropertyKey, Statement, UnaryExpression, UnaryOp, VariableDeclaration,
    WhileStatement,
};
use crate::compiler::{CompiledUnit, FunctionCode};
use crate::error::JsError;
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, Property, PropertyKey,
};

use super::{arguments, builtins, CallKind, Completion, FrameId, Interpreter};

/// Where an identifier resolved: a live stack slot or an object property.
enum Binding {
    Slot(usize),
    Property(JsObjectRef, PropertyKey),
}

impl Interpreter {
    /// Execute a compiled program at global level and return the value of
    /// its last expression statement.
    pub fn run_program(&mut self, unit: &Rc<CompiledUnit>) -> Result<JsValue, JsError> {
        let Some(code) = unit.global_code() else {
            return Err(JsError::internal("compiled unit has no top-level code"));
        };
        let code = Rc::clone(code);

        let saved = self.current_unit.replace(Rc::clone(unit));
        let result = self.run_global_code(unit, &code);
        self.current_unit = saved;
        result
    }

    /// Top-level code has no frame of its own: hoisted names become global
    /// object properties and statements run against the global scope.
    fn run_global_code(
        &mut self,
        unit: &Rc<CompiledUnit>,
        code: &Rc<FunctionCode>,
    ) -> Result<JsValue, JsError> {
        for name in code.vars.iter() {
            let key = PropertyKey::String(name.cheap_clone());
            let missing = !self.global.borrow().has_own_property(&key);
            if missing {
                self.global
                    .borrow_mut()
                    .set_property(key, JsValue::Undefined);
            }
        }
        for &slot in code.funcs.iter() {
            let Some(func_code) = unit.function(slot) else {
                return Err(JsError::internal("function table slot out of range"));
            };
            let func_code = Rc::clone(func_code);
            let func = builtins::function::create_source_function(self, unit, &func_code, None);
            if let Some(name) = func_code.name.clone() {
                self.global
                    .borrow_mut()
                    .set_property(PropertyKey::String(name), JsValue::Object(func));
            }
        }

        let mut result = JsValue::Undefined;
        let body = Rc::clone(&code.body);
        for stmt in body.iter() {
            match self.execute_statement(stmt)? {
                Completion::Normal(value) => {
                    if matches!(stmt, Statement::Expression(_)) {
                        result = value;
                    }
                }
                Completion::Return(_) => {
                    return Err(JsError::internal("return completion at top level"));
                }
            }
        }
        Ok(result)
    }

    /// Run the body of a live activation.
    pub(crate) fn run_frame(&mut self, frame_id: FrameId) -> Result<Completion, JsError> {
        let (unit, code, base_scope) = {
            let Some(frame) = self.frame_by_id(frame_id) else {
                return Err(JsError::internal("activation gone before its body ran"));
            };
            (
                Rc::clone(&frame.unit),
                Rc::clone(&frame.code),
                Rc::clone(&frame.base_scope),
            )
        };

        // Declared functions become live before any statement runs.
        for &slot in code.funcs.iter() {
            let Some(func_code) = unit.function(slot) else {
                return Err(JsError::internal("function table slot out of range"));
            };
            let func_code = Rc::clone(func_code);
            let func = builtins::function::create_source_function(
                self,
                &unit,
                &func_code,
                Some(Rc::clone(&base_scope)),
            );
            let target = func_code
                .name
                .as_ref()
                .and_then(|name| code.var_index(name.as_str()))
                .and_then(|i| self.frame_by_id(frame_id).map(|frame| frame.var_slot(i)));
            if let Some(var_slot) = target {
                self.set_stack_slot(var_slot, JsValue::Object(func));
            }
        }

        let body = Rc::clone(&code.body);
        for stmt in body.iter() {
            if let Completion::Return(value) = self.execute_statement(stmt)? {
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    pub(crate) fn execute_statement(&mut self, stmt: &Statement) -> Result<Completion, JsError> {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                self.execute_variable_declaration(decl)?;
                Ok(Completion::Normal(JsValue::Undefined))
            }
            // Instantiated at activation entry.
            Statement::FunctionDeclaration(_) => Ok(Completion::Normal(JsValue::Undefined)),
            Statement::Block(block) => self.execute_block(block),
            Statement::If(if_stmt) => self.execute_if(if_stmt),
            Statement::While(while_stmt) => self.execute_while(while_stmt),
            Statement::Return(ret) => {
                let value = match &ret.argument {
                    Some(argument) => self.evaluate(argument)?,
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::Expression(stmt) => {
                let value = self.evaluate(&stmt.expression)?;
                Ok(Completion::Normal(value))
            }
            Statement::Empty => Ok(Completion::Normal(JsValue::Undefined)),
        }
    }

    fn execute_variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<(), JsError> {
        for declarator in &decl.declarations {
            if let Some(init) = &declarator.init {
                let value = self.evaluate(init)?;
                self.write_identifier(&declarator.id.name, value)?;
            }
        }
        Ok(())
    }

    fn execute_block(&mut self, block: &BlockStatement) -> Result<Completion, JsError> {
        let mut completion = Completion::Normal(JsValue::Undefined);
        for stmt in &block.body {
            completion = self.execute_statement(stmt)?;
            if matches!(completion, Completion::Return(_)) {
                break;
            }
        }
        Ok(completion)
    }

    fn execute_if(&mut self, if_stmt: &IfStatement) -> Result<Completion, JsError> {
        if self.evaluate(&if_stmt.test)?.to_boolean() {
            self.execute_statement(&if_stmt.consequent)
        } else if let Some(alternate) = &if_stmt.alternate {
            self.execute_statement(alternate)
        } else {
            Ok(Completion::Normal(JsValue::Undefined))
        }
    }

    fn execute_while(&mut self, while_stmt: &WhileStatement) -> Result<Completion, JsError> {
        while self.evaluate(&while_stmt.test)?.to_boolean() {
            if let Completion::Return(value) = self.execute_statement(&while_stmt.body)? {
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    /// Evaluate an expression to a value.
    pub(crate) fn evaluate(&mut self, expr: &Expression) -> Result<JsValue, JsError> {
        match expr {
            Expression::Literal(literal) => Ok(self.evaluate_literal(&literal.value)),
            Expression::Array(array) => self.evaluate_array(array),
            Expression::Object(object) => self.evaluate_object(object),
            Expression::Function(func) => self.evaluate_function_expression(func),
            Expression::Identifier(id) => self.read_identifier(&id.name),
            Expression::This(_) => Ok(self.current_this()),
            Expression::Unary(unary) => self.evaluate_unary(unary),
            Expression::Binary(binary) => self.evaluate_binary(binary),
            Expression::Logical(logical) => self.evaluate_logical(logical),
            Expression::Assignment(assign) => self.evaluate_assignment(assign),
            Expression::Member(member) => self.evaluate_member(member),
            Expression::Call(call) => self.evaluate_call(call),
            Expression::New(new_expr) => self.evaluate_new(new_expr),
        }
    }

    fn evaluate_literal(&self, value: &LiteralValue) -> JsValue {
        match value {
            LiteralValue::Null => JsValue::Null,
            LiteralValue::Boolean(b) => JsValue::Boolean(*b),
            LiteralValue::Number(n) => JsValue::Number(*n),
            LiteralValue::String(s) => JsValue::String(s.cheap_clone()),
        }
    }

    fn evaluate_array(&mut self, array: &ArrayExpression) -> Result<JsValue, JsError> {
        let obj = JsObject::with_prototype(self.object_prototype.cheap_clone()).into_ref();
        for (i, element) in array.elements.iter().enumerate() {
            let value = self.evaluate(element)?;
            obj.borrow_mut()
                .set_property(PropertyKey::Index(i as u32), value);
        }
        let length = self.key("length");
        obj.borrow_mut().define_property(
            length,
            Property::with_attributes(
                JsValue::Number(array.elements.len() as f64),
                true,
                false,
                false,
            ),
        );
        Ok(JsValue::Object(obj))
    }

    fn evaluate_object(&mut self, object: &ObjectExpression) -> Result<JsValue, JsError> {
        let obj = JsObject::with_prototype(self.object_prototype.cheap_clone()).into_ref();
        for property in &object.properties {
            let key = match &property.key {
                ObjectPropertyKey::Identifier(name) | ObjectPropertyKey::String(name) => {
                    PropertyKey::from(name.cheap_clone())
                }
                ObjectPropertyKey::Number(n) => PropertyKey::from_value(&JsValue::Number(*n)),
            };
            let value = self.evaluate(&property.value)?;
            obj.borrow_mut().set_property(key, value);
        }
        Ok(JsValue::Object(obj))
    }

    /// A function expression closes over the scope of the activation it is
    /// evaluated in; at top level it captures nothing and later runs
    /// directly against the global scope.
    fn evaluate_function_expression(
        &mut self,
        func: &FunctionExpression,
    ) -> Result<JsValue, JsError> {
        let (unit, scope) = match self.current_frame() {
            Some(frame) => (Rc::clone(&frame.unit), Some(Rc::clone(&frame.base_scope))),
            None => match &self.current_unit {
                Some(unit) => (Rc::clone(unit), None),
                None => return Err(JsError::unexpected_state("no compilation unit active")),
            },
        };
        let Some(func_code) = unit.function(func.func_id) else {
            return Err(JsError::internal("function table slot out of range"));
        };
        let func_code = Rc::clone(func_code);
        let obj = builtins::function::create_source_function(self, &unit, &func_code, scope);
        Ok(JsValue::Object(obj))
    }

    fn current_this(&self) -> JsValue {
        match self.current_frame() {
            Some(frame) => frame.this_value.clone(),
            None => JsValue::Object(self.global.cheap_clone()),
        }
    }

    fn evaluate_unary(&mut self, unary: &UnaryExpression) -> Result<JsValue, JsError> {
        match unary.operator {
            UnaryOp::Typeof => self.evaluate_typeof(&unary.argument),
            UnaryOp::Minus => {
                let value = self.evaluate(&unary.argument)?;
                let n = self.to_number_value(&value)?;
                Ok(JsValue::Number(-n))
            }
            UnaryOp::Not => {
                let value = self.evaluate(&unary.argument)?;
                Ok(JsValue::Boolean(!value.to_boolean()))
            }
        }
    }

    /// `typeof` tolerates unresolved identifiers instead of raising a
    /// reference error.
    fn evaluate_typeof(&mut self, argument: &Expression) -> Result<JsValue, JsError> {
        let value = if let Expression::Identifier(id) = argument {
            match self.resolve_identifier(&id.name)? {
                Some(Binding::Slot(slot)) => self.stack_slot(slot),
                Some(Binding::Property(obj, key)) => self.get_property_value(&obj, &key)?,
                None => JsValue::Undefined,
            }
        } else {
            self.evaluate(argument)?
        };
        Ok(JsValue::String(self.intern(value.type_of())))
    }

    fn evaluate_binary(&mut self, binary: &BinaryExpression) -> Result<JsValue, JsError> {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        Ok(match binary.operator {
            BinaryOp::Add => {
                let lhs = self.to_primitive(&left)?;
                let rhs = self.to_primitive(&right)?;
                if matches!(lhs, JsValue::String(_)) || matches!(rhs, JsValue::String(_)) {
                    let concat = format!("{}{}", lhs.to_js_string(), rhs.to_js_string());
                    JsValue::String(JsString::from(concat))
                } else {
                    JsValue::Number(lhs.to_number() + rhs.to_number())
                }
            }
            BinaryOp::Sub => {
                JsValue::Number(self.to_number_value(&left)? - self.to_number_value(&right)?)
            }
            BinaryOp::Mul => {
                JsValue::Number(self.to_number_value(&left)? * self.to_number_value(&right)?)
            }
            BinaryOp::Div => {
                JsValue::Number(self.to_number_value(&left)? / self.to_number_value(&right)?)
            }
            BinaryOp::Mod => {
                JsValue::Number(self.to_number_value(&left)? % self.to_number_value(&right)?)
            }
            BinaryOp::StrictEq => JsValue::Boolean(left.strict_equals(&right)),
            BinaryOp::StrictNotEq => JsValue::Boolean(!left.strict_equals(&right)),
            BinaryOp::Lt => {
                JsValue::Boolean(self.compare(&left, &right)? == Some(Ordering::Less))
            }
            BinaryOp::Gt => {
                JsValue::Boolean(self.compare(&left, &right)? == Some(Ordering::Greater))
            }
            BinaryOp::LtEq => {
                let ordering = self.compare(&left, &right)?;
                JsValue::Boolean(matches!(ordering, Some(Ordering::Less | Ordering::Equal)))
            }
            BinaryOp::GtEq => {
                let ordering = self.compare(&left, &right)?;
                JsValue::Boolean(matches!(ordering, Some(Ordering::Greater | Ordering::Equal)))
            }
        })
    }

    /// Relational comparison: lexicographic when both sides turn out to be
    /// strings, numeric otherwise. `None` means unordered (NaN involved).
    fn compare(
        &mut self,
        left: &JsValue,
        right: &JsValue,
    ) -> Result<Option<Ordering>, JsError> {
        let lhs = self.to_primitive(left)?;
        let rhs = self.to_primitive(right)?;
        if let (JsValue::String(l), JsValue::String(r)) = (&lhs, &rhs) {
            return Ok(Some(l.as_str().cmp(r.as_str())));
        }
        Ok(lhs.to_number().partial_cmp(&rhs.to_number()))
    }

    fn evaluate_logical(&mut self, logical: &LogicalExpression) -> Result<JsValue, JsError> {
        let left = self.evaluate(&logical.left)?;
        match logical.operator {
            LogicalOp::And => {
                if !left.to_boolean() {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
            LogicalOp::Or => {
                if left.to_boolean() {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
        }
    }

    fn evaluate_assignment(&mut self, assign: &AssignmentExpression) -> Result<JsValue, JsError> {
        let value = self.evaluate(&assign.right)?;
        match &assign.left {
            AssignmentTarget::Identifier(id) => {
                self.write_identifier(&id.name, value.clone())?;
            }
            AssignmentTarget::Member(member) => {
                let (obj, key) = self.member_target(member)?;
                self.put_property_value(&obj, key, value.clone())?;
            }
        }
        Ok(value)
    }

    fn evaluate_member(&mut self, member: &MemberExpression) -> Result<JsValue, JsError> {
        let (obj, key) = self.member_target(member)?;
        self.get_property_value(&obj, &key)
    }

    fn member_target(
        &mut self,
        member: &MemberExpression,
    ) -> Result<(JsObjectRef, PropertyKey), JsError> {
        let base = self.evaluate(&member.object)?;
        let key = self.member_key(&member.property)?;
        let obj = self.to_object(&base)?;
        Ok((obj, key))
    }

    fn member_key(&mut self, property: &MemberProperty) -> Result<PropertyKey, JsError> {
        match property {
            MemberProperty::Identifier(name) => Ok(PropertyKey::from(name.cheap_clone())),
            MemberProperty::Expression(expr) => {
                let value = self.evaluate(expr)?;
                let primitive = self.to_primitive(&value)?;
                Ok(PropertyKey::from_value(&primitive))
            }
        }
    }

    /// A method call binds the receiver; every other callee form passes an
    /// undefined receiver, which the callee resolves to the global object.
    fn evaluate_call(&mut self, call: &CallExpression) -> Result<JsValue, JsError> {
        let (callee, this_value) = match call.callee.as_ref() {
            Expression::Member(member) => {
                let (obj, key) = self.member_target(member)?;
                let callee = self.get_property_value(&obj, &key)?;
                (callee, JsValue::Object(obj))
            }
            callee => (self.evaluate(callee)?, JsValue::Undefined),
        };
        let args = self.evaluate_arguments(&call.arguments)?;
        self.invoke(&callee, &this_value, CallKind::InternalCall, &args)
    }

    fn evaluate_arguments(&mut self, expressions: &[Expression]) -> Result<Vec<JsValue>, JsError> {
        let mut args = Vec::with_capacity(expressions.len());
        for expr in expressions {
            args.push(self.evaluate(expr)?);
        }
        Ok(args)
    }

    fn evaluate_new(&mut self, new_expr: &NewExpression) -> Result<JsValue, JsError> {
        let callee = self.evaluate(&new_expr.callee)?;
        let args = self.evaluate_arguments(&new_expr.arguments)?;
        self.invoke(&callee, &JsValue::Undefined, CallKind::Construct, &args)
    }

    fn read_identifier(&mut self, name: &JsString) -> Result<JsValue, JsError> {
        match self.resolve_identifier(name)? {
            Some(Binding::Slot(slot)) => Ok(self.stack_slot(slot)),
            Some(Binding::Property(obj, key)) => self.get_property_value(&obj, &key),
            None => Err(JsError::reference_error(name.as_str())),
        }
    }

    /// Unresolved names are created as global object properties.
    fn write_identifier(&mut self, name: &JsString, value: JsValue) -> Result<(), JsError> {
        match self.resolve_identifier(name)? {
            Some(Binding::Slot(slot)) => {
                self.set_stack_slot(slot, value);
                Ok(())
            }
            Some(Binding::Property(obj, key)) => self.put_property_value(&obj, key, value),
            None => {
                let global = self.global.cheap_clone();
                let key = PropertyKey::String(name.cheap_clone());
                self.put_property_value(&global, key, value)
            }
        }
    }

    /// Walk the scope chain of the current activation. The chain always
    /// bottoms out at the global scope, whose variable object is the
    /// global object itself.
    fn resolve_identifier(&mut self, name: &JsString) -> Result<Option<Binding>, JsError> {
        let mut scope = match self.current_frame() {
            Some(frame) => Some(Rc::clone(&frame.base_scope)),
            None => Some(Rc::clone(&self.global_scope)),
        };
        while let Some(current) = scope {
            let live = current.frame.get().filter(|&id| self.frame_by_id(id).is_some());
            if let Some(frame_id) = live {
                if let Some(binding) = self.resolve_in_frame(frame_id, name)? {
                    return Ok(Some(binding));
                }
            } else {
                let key = PropertyKey::String(name.cheap_clone());
                let found = current.vars.borrow().get_property(&key).is_some();
                if found {
                    return Ok(Some(Binding::Property(current.vars.cheap_clone(), key)));
                }
            }
            scope = current.parent.clone();
        }
        Ok(None)
    }

    /// Resolution against a live activation: parameters first, then
    /// hoisted locals, then the `arguments` hook, then whatever bindings
    /// already moved to the variable object.
    fn resolve_in_frame(
        &mut self,
        frame_id: FrameId,
        name: &JsString,
    ) -> Result<Option<Binding>, JsError> {
        enum Hit {
            Slot(usize),
            Arguments(JsObjectRef),
            Vars(JsObjectRef),
        }

        let hit = {
            let Some(frame) = self.frame_by_id(frame_id) else {
                return Ok(None);
            };
            if let Some(i) = frame.code.param_index(name.as_str()) {
                Hit::Slot(frame.param_slot(i))
            } else if let Some(i) = frame.code.var_index(name.as_str()) {
                Hit::Slot(frame.var_slot(i))
            } else if *name == "arguments" {
                Hit::Arguments(frame.base_scope.vars.cheap_clone())
            } else {
                Hit::Vars(frame.base_scope.vars.cheap_clone())
            }
        };

        match hit {
            Hit::Slot(slot) => Ok(Some(Binding::Slot(slot))),
            Hit::Arguments(vars) => {
                arguments::ensure_arguments_object(self, frame_id)?;
                Ok(Some(Binding::Property(
                    vars,
                    PropertyKey::String(name.cheap_clone()),
                )))
            }
            Hit::Vars(vars) => {
                let key = PropertyKey::String(name.cheap_clone());
                let found = vars.borrow().get_property(&key).is_some();
                if found {
                    Ok(Some(Binding::Property(vars, key)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Property read with engine-level interception: function `length` and
    /// `arguments` accessors, and live arguments-object indices.
    pub(crate) fn get_property_value(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
    ) -> Result<JsValue, JsError> {
        enum Special {
            FunctionLength(u32),
            FunctionArguments,
            ArgumentsIndex(u32),
        }

        let special = {
            let borrowed = obj.borrow();
            match &borrowed.exotic {
                ExoticObject::Function(function) => match key {
                    PropertyKey::String(name) if *name == "length" => {
                        Some(Special::FunctionLength(function.length))
                    }
                    PropertyKey::String(name) if *name == "arguments" => {
                        Some(Special::FunctionArguments)
                    }
                    _ => None,
                },
                ExoticObject::Arguments(payload) => match key {
                    PropertyKey::Index(i) if *i < payload.len() => {
                        Some(Special::ArgumentsIndex(*i))
                    }
                    _ => None,
                },
                _ => None,
            }
        };

        match special {
            Some(Special::FunctionLength(length)) => Ok(JsValue::Number(f64::from(length))),
            Some(Special::FunctionArguments) => builtins::function::live_arguments_for(self, obj),
            Some(Special::ArgumentsIndex(i)) => arguments::get_indexed(self, obj, i),
            None => Ok(obj.borrow().get_property(key).unwrap_or_default()),
        }
    }

    /// Property write with the same interception as reads. Writes to a
    /// function's `length` and `arguments` are ignored.
    pub(crate) fn put_property_value(
        &mut self,
        obj: &JsObjectRef,
        key: PropertyKey,
        value: JsValue,
    ) -> Result<(), JsError> {
        enum Special {
            Ignore,
            ArgumentsIndex(u32),
        }

        let special = {
            let borrowed = obj.borrow();
            match &borrowed.exotic {
                ExoticObject::Function(_) => match &key {
                    PropertyKey::String(name) if *name == "length" || *name == "arguments" => {
                        Some(Special::Ignore)
                    }
                    _ => None,
                },
                ExoticObject::Arguments(payload) => match &key {
                    PropertyKey::Index(i) if *i < payload.len() => {
                        Some(Special::ArgumentsIndex(*i))
                    }
                    _ => None,
                },
                _ => None,
            }
        };

        match special {
            Some(Special::Ignore) => Ok(()),
            Some(Special::ArgumentsIndex(i)) => arguments::put_indexed(self, obj, i, value),
            None => {
                obj.borrow_mut().set_property(key, value);
                Ok(())
            }
        }
    }

    /// ToPrimitive: wrappers unwrap; other objects go through their
    /// `toString` when it is callable and returns a primitive, with
    /// `[object Object]` as the last resort.
    pub(crate) fn to_primitive(&mut self, value: &JsValue) -> Result<JsValue, JsError> {
        let JsValue::Object(obj) = value else {
            return Ok(value.clone());
        };
        let unwrapped = match &obj.borrow().exotic {
            ExoticObject::Primitive(inner) => Some(inner.clone()),
            _ => None,
        };
        if let Some(inner) = unwrapped {
            return Ok(inner);
        }
        let key = self.key("toString");
        let to_string = self.get_property_value(obj, &key)?;
        if to_string.is_callable() {
            let result = self.invoke(&to_string, value, CallKind::Call, &[])?;
            if result.as_object().is_none() {
                return Ok(result);
            }
        }
        Ok(JsValue::String(self.intern("[object Object]")))
    }

    pub(crate) fn to_string_value(&mut self, value: &JsValue) -> Result<JsString, JsError> {
        let primitive = self.to_primitive(value)?;
        Ok(primitive.to_js_string())
    }

    pub(crate) fn to_number_value(&mut self, value: &JsValue) -> Result<f64, JsError> {
        let primitive = self.to_primitive(value)?;
        Ok(primitive.to_number())
    }
}
