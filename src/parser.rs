//! Parser for JavaScript source code
//!
//! Uses recursive descent with Pratt parsing for expressions.

use crate::ast::*;
use crate::error::JsError;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::string_dict::StringDict;
use crate::value::JsString;

/// Parser for JavaScript source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// Next function slot in the compiled unit; slot 0 is top-level code
    next_func_id: usize,
    /// Nesting depth of function bodies, for rejecting stray `return`
    function_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Lexer::new(source, string_dict);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::eof(0, 1, 1),
            next_func_id: 1,
            function_depth: 0,
        }
    }

    /// Helper to intern a string in the dictionary
    #[inline]
    fn intern(&mut self, s: &str) -> JsString {
        self.lexer.string_dict().get_or_insert(s)
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, JsError> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        Ok(Program {
            body,
            function_count: self.next_func_id,
        })
    }

    // ============ STATEMENTS ============

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        match &self.current.kind {
            TokenKind::Var => Ok(Statement::VariableDeclaration(
                self.parse_variable_declaration()?,
            )),
            TokenKind::Function => Ok(Statement::FunctionDeclaration(
                self.parse_function_declaration()?,
            )),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            _ => {
                let start = self.current.span;
                let expression = self.parse_expression()?;
                self.expect_semicolon()?;
                let span = self.span_from(start);
                Ok(Statement::Expression(ExpressionStatement {
                    expression,
                    span,
                }))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Var)?;

        let mut declarations = vec![];
        loop {
            let decl_start = self.current.span;
            let id = self.parse_identifier()?;
            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            let span = self.span_from(decl_start);
            declarations.push(VariableDeclarator { id, init, span });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(VariableDeclaration { declarations, span })
    }

    fn parse_function_declaration(&mut self) -> Result<FunctionDeclaration, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;

        if !self.check_identifier() {
            return Err(self.error("Function declarations require a name"));
        }
        let id = self.parse_identifier()?;

        let func_id = self.next_func_id;
        self.next_func_id += 1;

        let params = self.parse_function_params()?;

        self.function_depth += 1;
        let body = self.parse_block_statement();
        self.function_depth -= 1;
        let body = body?;

        let span = self.span_from(start);
        Ok(FunctionDeclaration {
            id,
            params,
            body,
            func_id,
            span,
        })
    }

    /// Parse a parameter list. Duplicate names are allowed; later lookups
    /// by name resolve to whichever slot the scan finds first.
    fn parse_function_params(&mut self) -> Result<Vec<Identifier>, JsError> {
        self.require_token(&TokenKind::LParen)?;

        let mut params = vec![];
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_identifier()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_block_statement(&mut self) -> Result<BlockStatement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut body = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        self.require_token(&TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(BlockStatement { body, span })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::While(WhileStatement { test, body, span }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if self.function_depth == 0 {
            return Err(self.error("Illegal return statement"));
        }
        self.require_token(&TokenKind::Return)?;

        // Restricted production: a newline after `return` ends the statement
        let argument = if !self.check(&TokenKind::Semicolon)
            && !self.check(&TokenKind::RBrace)
            && !self.is_at_end()
            && !self.lexer.had_newline_before()
        {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Statement::Return(ReturnStatement { argument, span }))
    }

    // ============ EXPRESSIONS ============

    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_binary_expression(0)?;

        if self.check(&TokenKind::Eq) {
            self.advance();
            let right = Box::new(self.parse_assignment_expression()?);
            let left = self.expression_to_assignment_target(expr)?;
            let span = self.span_from(start);
            return Ok(Expression::Assignment(AssignmentExpression {
                left,
                right,
                span,
            }));
        }

        Ok(expr)
    }

    fn expression_to_assignment_target(
        &self,
        expr: Expression,
    ) -> Result<AssignmentTarget, JsError> {
        match expr {
            Expression::Identifier(id) => Ok(AssignmentTarget::Identifier(id)),
            Expression::Member(member) => Ok(AssignmentTarget::Member(member)),
            _ => Err(self.error("Invalid assignment target")),
        }
    }

    /// Pratt parser for binary expressions
    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        while let Some((op, prec)) = self.current_binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_binary_expression(prec + 1)?;
            let span = self.span_from(start);

            left = match op {
                BinOpKind::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
                BinOpKind::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
            };
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        if let Some(operator) = self.current_unary_op() {
            self.advance();
            let argument = Box::new(self.parse_unary_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Unary(UnaryExpression {
                operator,
                argument,
                span,
            }));
        }

        self.parse_left_hand_side_expression()
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        let mut expr = if self.match_token(&TokenKind::New) {
            let callee = Box::new(self.parse_member_expression()?);
            let arguments = if self.check(&TokenKind::LParen) {
                self.parse_call_arguments()?
            } else {
                vec![]
            };
            let span = self.span_from(start);
            Expression::New(NewExpression {
                callee,
                arguments,
                span,
            })
        } else {
            self.parse_member_expression()?
        };

        // Call expressions and member access chain
        loop {
            if self.check(&TokenKind::LParen) {
                let arguments = self.parse_call_arguments()?;
                let span = self.span_from(start);
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    span,
                });
            } else if self.match_token(&TokenKind::Dot) {
                let property = self.parse_identifier_name()?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Identifier(property),
                    span,
                });
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression()?;
                self.require_token(&TokenKind::RBracket)?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Expression(Box::new(property)),
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_member_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = self.parse_primary_expression()?;

        // Member access chain without calls (the callee of `new`)
        loop {
            if self.match_token(&TokenKind::Dot) {
                let property = self.parse_identifier_name()?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Identifier(property),
                    span,
                });
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression()?;
                self.require_token(&TokenKind::RBracket)?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Expression(Box::new(property)),
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let span = self.current.span;

        match self.current.kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::Number(n),
                    span,
                }))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::String(s),
                    span,
                }))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::Boolean(true),
                    span,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::Boolean(false),
                    span,
                }))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::Null,
                    span,
                }))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier(Identifier { name, span }))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(span))
            }
            TokenKind::Function => self.parse_function_expression(),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.require_token(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            _ => Err(self.unexpected_token("expression")),
        }
    }

    fn parse_function_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;

        let id = if self.check_identifier() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let func_id = self.next_func_id;
        self.next_func_id += 1;

        let params = self.parse_function_params()?;

        self.function_depth += 1;
        let body = self.parse_block_statement();
        self.function_depth -= 1;
        let body = body?;

        let span = self.span_from(start);
        Ok(Expression::Function(FunctionExpression {
            id,
            params,
            body,
            func_id,
            span,
        }))
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = vec![];
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            elements.push(self.parse_assignment_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBracket)?;
        let span = self.span_from(start);
        Ok(Expression::Array(ArrayExpression { elements, span }))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let prop_start = self.current.span;
            let key = self.parse_object_property_key()?;

            let value = if self.match_token(&TokenKind::Colon) {
                self.parse_assignment_expression()?
            } else if let ObjectPropertyKey::Identifier(ref name) = key {
                // Shorthand { name }
                Expression::Identifier(Identifier {
                    name: name.clone(),
                    span: prop_start,
                })
            } else {
                return Err(self.unexpected_token("':'"));
            };

            let span = self.span_from(prop_start);
            properties.push(ObjectProperty { key, value, span });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(Expression::Object(ObjectExpression { properties, span }))
    }

    fn parse_object_property_key(&mut self) -> Result<ObjectPropertyKey, JsError> {
        match self.current.kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(ObjectPropertyKey::Identifier(name))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(ObjectPropertyKey::String(s))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(ObjectPropertyKey::Number(n))
            }
            _ => {
                // Keywords are valid property names
                if let Some(name) = self.keyword_text() {
                    let name = self.intern(name);
                    self.advance();
                    Ok(ObjectPropertyKey::Identifier(name))
                } else {
                    Err(self.unexpected_token("property name"))
                }
            }
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>, JsError> {
        self.require_token(&TokenKind::LParen)?;

        let mut arguments = vec![];
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            arguments.push(self.parse_assignment_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_identifier(&mut self) -> Result<Identifier, JsError> {
        let span = self.current.span;
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            self.advance();
            Ok(Identifier { name, span })
        } else {
            Err(self.unexpected_token("identifier"))
        }
    }

    /// Parse a property name after `.`; keywords are allowed here
    fn parse_identifier_name(&mut self) -> Result<JsString, JsError> {
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            self.advance();
            return Ok(name);
        }
        if let Some(text) = self.keyword_text() {
            let name = self.intern(text);
            self.advance();
            return Ok(name);
        }
        Err(self.unexpected_token("property name"))
    }

    fn keyword_text(&self) -> Option<&'static str> {
        match self.current.kind {
            TokenKind::True => Some("true"),
            TokenKind::False => Some("false"),
            TokenKind::Null => Some("null"),
            TokenKind::Var => Some("var"),
            TokenKind::Function => Some("function"),
            TokenKind::Return => Some("return"),
            TokenKind::If => Some("if"),
            TokenKind::Else => Some("else"),
            TokenKind::While => Some("while"),
            TokenKind::New => Some("new"),
            TokenKind::This => Some("this"),
            TokenKind::Typeof => Some("typeof"),
            _ => None,
        }
    }

    // ============ HELPERS ============

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), JsError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token(&format!("{:?}", kind)))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), JsError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.lexer.had_newline_before() {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier(_))
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end,
            start.line,
            start.column,
        )
    }

    fn error(&self, message: &str) -> JsError {
        JsError::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self, expected: &str) -> JsError {
        JsError::syntax_error(
            format!("Unexpected {:?}, expected {}", self.current.kind, expected),
            self.current.span.line,
            self.current.span.column,
        )
    }

    fn current_binary_op(&self) -> Option<(BinOpKind, u8)> {
        match &self.current.kind {
            TokenKind::PipePipe => Some((BinOpKind::Logical(LogicalOp::Or), 4)),
            TokenKind::AmpAmp => Some((BinOpKind::Logical(LogicalOp::And), 5)),
            TokenKind::EqEqEq => Some((BinOpKind::Binary(BinaryOp::StrictEq), 9)),
            TokenKind::BangEqEq => Some((BinOpKind::Binary(BinaryOp::StrictNotEq), 9)),
            TokenKind::Lt => Some((BinOpKind::Binary(BinaryOp::Lt), 10)),
            TokenKind::LtEq => Some((BinOpKind::Binary(BinaryOp::LtEq), 10)),
            TokenKind::Gt => Some((BinOpKind::Binary(BinaryOp::Gt), 10)),
            TokenKind::GtEq => Some((BinOpKind::Binary(BinaryOp::GtEq), 10)),
            TokenKind::Plus => Some((BinOpKind::Binary(BinaryOp::Add), 12)),
            TokenKind::Minus => Some((BinOpKind::Binary(BinaryOp::Sub), 12)),
            TokenKind::Star => Some((BinOpKind::Binary(BinaryOp::Mul), 13)),
            TokenKind::Slash => Some((BinOpKind::Binary(BinaryOp::Div), 13)),
            TokenKind::Percent => Some((BinOpKind::Binary(BinaryOp::Mod), 13)),
            _ => None,
        }
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            _ => None,
        }
    }
}

enum BinOpKind {
    Binary(BinaryOp),
    Logical(LogicalOp),
}
