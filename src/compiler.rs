//! Compilation of parsed source into executable function metadata
//!
//! A compiled unit owns the source text and a flat table of function
//! records. Each record carries the parameter list and the hoisted
//! declarations of one function body; the interpreter uses them to lay
//! out call frames. Slot 0 always holds top-level code.

use std::rc::Rc;

use crate::ast::{
    AssignmentTarget, Expression, MemberProperty, Statement, VariableDeclaration,
};
use crate::error::JsError;
use crate::lexer::Span;
use crate::parser::Parser;
use crate::string_dict::StringDict;
use crate::value::{CheapClone, JsString};

/// Metadata of one compiled function
#[derive(Debug)]
pub struct FunctionCode {
    /// Declared name; `None` for top-level code and anonymous expressions
    pub name: Option<JsString>,
    /// Parameter names in declaration order; duplicates preserved
    pub params: Rc<[JsString]>,
    /// Hoisted names: `var` declarations and directly declared functions
    pub vars: Rc<[JsString]>,
    /// Function table slots of functions declared directly in this body
    pub funcs: Rc<[usize]>,
    /// Statements of the body; nested function bodies are moved into
    /// their own records and left empty here
    pub body: Rc<[Statement]>,
    /// Byte range of the function text within the unit source
    pub span: Span,
}

impl FunctionCode {
    /// Find the parameter slot for a name. The first declaration wins,
    /// so later duplicate parameters are not reachable by name.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }

    pub fn var_index(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v == name)
    }
}

/// An immutable compilation result shared by every function it defines
#[derive(Debug)]
pub struct CompiledUnit {
    pub source: Rc<str>,
    pub functions: Vec<Rc<FunctionCode>>,
}

impl CompiledUnit {
    /// Top-level code of the unit
    pub fn global_code(&self) -> Option<&Rc<FunctionCode>> {
        self.functions.first()
    }

    pub fn function(&self, id: usize) -> Option<&Rc<FunctionCode>> {
        self.functions.get(id)
    }

    /// Source text covered by a span
    pub fn source_text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }
}

/// Parse and compile a script into a unit
pub fn compile(source: &str, string_dict: &mut StringDict) -> Result<Rc<CompiledUnit>, JsError> {
    let mut program = Parser::new(source, string_dict).parse_program()?;

    let mut compiler = Compiler {
        functions: Vec::new(),
    };
    compiler
        .functions
        .resize_with(program.function_count, || None);

    let global_span = Span::new(0, source.len(), 1, 1);
    compiler.process_function(0, None, &[], &mut program.body, global_span)?;

    let functions = compiler
        .functions
        .into_iter()
        .map(|slot| slot.ok_or_else(|| JsError::internal("function table slot left unfilled")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rc::new(CompiledUnit {
        source: source.into(),
        functions,
    }))
}

struct Compiler {
    functions: Vec<Option<Rc<FunctionCode>>>,
}

impl Compiler {
    /// Build the record for one function, taking ownership of its body.
    /// Nested functions are processed recursively and their bodies are
    /// replaced with empty blocks in the enclosing statement list.
    fn process_function(
        &mut self,
        func_id: usize,
        name: Option<JsString>,
        params: &[crate::ast::Identifier],
        body: &mut Vec<Statement>,
        span: Span,
    ) -> Result<(), JsError> {
        let mut body = std::mem::take(body);
        let mut vars: Vec<JsString> = Vec::new();
        let mut funcs: Vec<usize> = Vec::new();

        for stmt in &mut body {
            self.scan_statement(stmt, &mut vars, &mut funcs)?;
        }

        let params: Rc<[JsString]> = params.iter().map(|p| p.name.cheap_clone()).collect();
        let code = Rc::new(FunctionCode {
            name,
            params,
            vars: vars.into(),
            funcs: funcs.into(),
            body: body.into(),
            span,
        });

        match self.functions.get_mut(func_id) {
            Some(slot) => {
                *slot = Some(code);
                Ok(())
            }
            None => Err(JsError::internal("function id out of range")),
        }
    }

    /// Collect hoisted declarations. `var` hoists out of blocks and
    /// control flow but never crosses a function boundary.
    fn scan_statement(
        &mut self,
        stmt: &mut Statement,
        vars: &mut Vec<JsString>,
        funcs: &mut Vec<usize>,
    ) -> Result<(), JsError> {
        match stmt {
            Statement::VariableDeclaration(decl) => self.scan_var_declaration(decl, vars),
            Statement::FunctionDeclaration(func) => {
                declare_var(vars, &func.id.name);
                funcs.push(func.func_id);
                let name = func.id.name.cheap_clone();
                let params = func.params.clone();
                self.process_function(
                    func.func_id,
                    Some(name),
                    &params,
                    &mut func.body.body,
                    func.span,
                )
            }
            Statement::Block(block) => {
                for stmt in &mut block.body {
                    self.scan_statement(stmt, vars, funcs)?;
                }
                Ok(())
            }
            Statement::If(if_stmt) => {
                self.scan_expression(&mut if_stmt.test)?;
                self.scan_statement(&mut if_stmt.consequent, vars, funcs)?;
                if let Some(alternate) = &mut if_stmt.alternate {
                    self.scan_statement(alternate, vars, funcs)?;
                }
                Ok(())
            }
            Statement::While(while_stmt) => {
                self.scan_expression(&mut while_stmt.test)?;
                self.scan_statement(&mut while_stmt.body, vars, funcs)
            }
            Statement::Return(ret) => {
                if let Some(argument) = &mut ret.argument {
                    self.scan_expression(argument)?;
                }
                Ok(())
            }
            Statement::Expression(stmt) => self.scan_expression(&mut stmt.expression),
            Statement::Empty => Ok(()),
        }
    }

    fn scan_var_declaration(
        &mut self,
        decl: &mut VariableDeclaration,
        vars: &mut Vec<JsString>,
    ) -> Result<(), JsError> {
        for declarator in &mut decl.declarations {
            declare_var(vars, &declarator.id.name);
            if let Some(init) = &mut declarator.init {
                self.scan_expression(init)?;
            }
        }
        Ok(())
    }

    /// Find function expressions nested inside an expression
    fn scan_expression(&mut self, expr: &mut Expression) -> Result<(), JsError> {
        match expr {
            Expression::Function(func) => {
                let name = func.id.as_ref().map(|id| id.name.cheap_clone());
                let params = func.params.clone();
                self.process_function(func.func_id, name, &params, &mut func.body.body, func.span)
            }
            Expression::Literal(_) | Expression::Identifier(_) | Expression::This(_) => Ok(()),
            Expression::Array(array) => {
                for element in &mut array.elements {
                    self.scan_expression(element)?;
                }
                Ok(())
            }
            Expression::Object(object) => {
                for property in &mut object.properties {
                    self.scan_expression(&mut property.value)?;
                }
                Ok(())
            }
            Expression::Unary(unary) => self.scan_expression(&mut unary.argument),
            Expression::Binary(binary) => {
                self.scan_expression(&mut binary.left)?;
                self.scan_expression(&mut binary.right)
            }
            Expression::Logical(logical) => {
                self.scan_expression(&mut logical.left)?;
                self.scan_expression(&mut logical.right)
            }
            Expression::Assignment(assign) => {
                match &mut assign.left {
                    AssignmentTarget::Identifier(_) => {}
                    AssignmentTarget::Member(member) => self.scan_member(member)?,
                }
                self.scan_expression(&mut assign.right)
            }
            Expression::Member(member) => self.scan_member(member),
            Expression::Call(call) => {
                self.scan_expression(&mut call.callee)?;
                for argument in &mut call.arguments {
                    self.scan_expression(argument)?;
                }
                Ok(())
            }
            Expression::New(new_expr) => {
                self.scan_expression(&mut new_expr.callee)?;
                for argument in &mut new_expr.arguments {
                    self.scan_expression(argument)?;
                }
                Ok(())
            }
        }
    }

    fn scan_member(&mut self, member: &mut crate::ast::MemberExpression) -> Result<(), JsError> {
        self.scan_expression(&mut member.object)?;
        if let MemberProperty::Expression(property) = &mut member.property {
            self.scan_expression(property)?;
        }
        Ok(())
    }
}

fn declare_var(vars: &mut Vec<JsString>, name: &JsString) {
    if !vars.iter().any(|v| v == name) {
        vars.push(name.cheap_clone());
    }
}
