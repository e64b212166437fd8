//! Recursive-descent statement parsing.
//!
//! The parser walks the token stream with an index cursor; builders that
//! need lookahead snapshot the index and restore it exactly when their
//! production does not apply. Each builder returns `Ok(Some(node))` on a
//! match, `Ok(None)` when the production is not applicable (the caller
//! tries the next alternative), or `Err(diagnostic)` on a hard failure.
//!
//! Statement alternatives are tried in a fixed order: if/else, function
//! definition, return, for loop, call, declaration, reassignment.

use viper_lex::{Token, TokenFamily, TokenKind};
use viper_util::{DiagResult, Diagnostic, DiagnosticKind, SourceBuffer, Span, Symbol};

use crate::ast::*;

/// Parse a full token stream into top-level statements.
pub fn parse(tokens: Vec<Token>, src: &SourceBuffer) -> DiagResult<Vec<Node>> {
    Parser::new(tokens, src).parse()
}

/// Recursive-descent parser over a lexed token stream.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    idx: usize,
    eof: Token,
    src: &'a SourceBuffer,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, src: &'a SourceBuffer) -> Self {
        let eof = tokens
            .last()
            .copied()
            .filter(|t| t.is_eof())
            .unwrap_or_else(|| {
                Token::new(TokenKind::Eof, Symbol::intern("EOF"), Span::DUMMY)
            });
        Self { tokens, idx: 0, eof, src }
    }

    /// Parse statements until end of stream.
    pub fn parse(mut self) -> DiagResult<Vec<Node>> {
        let mut stmts = Vec::new();
        while !self.current().is_eof() {
            stmts.push(self.statement()?);
            if self.current().kind == TokenKind::Semi {
                self.advance();
            }
        }
        Ok(stmts)
    }

    /// One statement, trying each builder in order.
    pub(crate) fn statement(&mut self) -> DiagResult<Node> {
        if let Some(node) = self.if_else()? {
            return Ok(node);
        }
        if let Some(node) = self.function()? {
            return Ok(node);
        }
        if let Some(node) = self.return_stmt()? {
            return Ok(node);
        }
        if let Some(node) = self.for_loop()? {
            return Ok(node);
        }
        if let Some(call) = self.callable()? {
            return Ok(Node::Call(call));
        }
        if let Some(assign) = self.assignment()? {
            return Ok(Node::Assign(assign));
        }
        if let Some(assign) = self.reassignment()? {
            return Ok(Node::Assign(assign));
        }

        let tok = self.current();
        Err(self.err(
            DiagnosticKind::UnexpectedToken,
            format!("'{}'", tok.text()),
            tok.span,
        ))
    }

    /// Declaration: `typeId name assignOp expr`.
    fn assignment(&mut self) -> DiagResult<Option<AssignNode>> {
        let type_tok = self.current();
        let name_tok = self.peek(1);
        let op_tok = self.peek(2);

        if type_tok.family != TokenFamily::Identifier
            || name_tok.family != TokenFamily::Identifier
            || op_tok.family != TokenFamily::AssignOp
        {
            return Ok(None);
        }
        let Some(op) = AssignOp::from_token(op_tok.kind) else {
            return Ok(None);
        };

        self.advance();
        self.advance();
        self.advance();

        if self.current().family == TokenFamily::Keyword {
            let kw = self.current();
            return Err(self.err(
                DiagnosticKind::InvalidSyntax,
                format!("Expected {}", type_tok.text()),
                kw.span,
            ));
        }

        let value = self.expr()?;
        let span = Span::new(type_tok.span.begin, value.span().end);
        Ok(Some(AssignNode {
            name: Ident::plain(name_tok.lexeme, name_tok.span),
            value: Box::new(value),
            op,
            declared_type: Some(Ident::plain(type_tok.lexeme, type_tok.span)),
            span,
        }))
    }

    /// Reassignment: `dottedName assignOp expr`.
    fn reassignment(&mut self) -> DiagResult<Option<AssignNode>> {
        let start = self.snapshot();
        let Some(name) = self.dot_chain() else {
            return Ok(None);
        };
        let op_tok = self.current();
        let Some(op) = AssignOp::from_token(op_tok.kind) else {
            self.restore(start);
            return Ok(None);
        };
        self.advance();

        if self.current().family == TokenFamily::Keyword {
            let kw = self.current();
            return Err(self.err(
                DiagnosticKind::InvalidSyntax,
                "Expected expression",
                kw.span,
            ));
        }

        let value = self.expr()?;
        let span = Span::new(name.span.begin, value.span().end);
        Ok(Some(AssignNode {
            name,
            value: Box::new(value),
            op,
            declared_type: None,
            span,
        }))
    }

    /// Either assignment form, for the for-loop header.
    fn any_assignment(&mut self) -> DiagResult<Option<AssignNode>> {
        if let Some(assign) = self.assignment()? {
            return Ok(Some(assign));
        }
        self.reassignment()
    }

    /// `if cond body (elif cond body)* (else body)?`
    fn if_else(&mut self) -> DiagResult<Option<Node>> {
        if self.current().kind != TokenKind::If {
            return Ok(None);
        }
        let if_tok = self.current();
        self.advance();

        let condition = self.expr()?;
        let body = self.body()?;
        let if_span = Span::new(if_tok.span.begin, block_end(&body, condition.span()).end);
        let if_node = IfNode { condition: Box::new(condition), body, span: if_span };

        let mut elif_nodes = Vec::new();
        while self.current().kind == TokenKind::Elif {
            let elif_tok = self.current();
            self.advance();
            let condition = self.expr()?;
            let body = self.body()?;
            let span = Span::new(elif_tok.span.begin, block_end(&body, condition.span()).end);
            elif_nodes.push(IfNode { condition: Box::new(condition), body, span });
        }

        let mut else_node = None;
        if self.current().kind == TokenKind::Else {
            let else_tok = self.current();
            self.advance();
            let body = self.body()?;
            let span = Span::new(else_tok.span.begin, block_end(&body, else_tok.span).end);
            else_node = Some(ElseNode { body, span });
        }

        let end = else_node
            .as_ref()
            .map(|e| e.span)
            .or_else(|| elif_nodes.last().map(|n| n.span))
            .unwrap_or(if_node.span);
        let span = Span::new(if_tok.span.begin, end.end);
        Ok(Some(Node::IfElse(IfElseNode { if_node, elif_nodes, else_node, span })))
    }

    /// Function definition: `returnType name ( params ) body`.
    fn function(&mut self) -> DiagResult<Option<Node>> {
        let ret_tok = self.current();
        let name_tok = self.peek(1);
        let paren_tok = self.peek(2);

        if ret_tok.family != TokenFamily::Identifier
            || name_tok.family != TokenFamily::Identifier
            || paren_tok.kind != TokenKind::LParen
        {
            return Ok(None);
        }

        self.advance();
        self.advance();
        let (params, rparen_span) = self.formal_parameters()?;
        let body = self.body()?;

        let span = Span::new(ret_tok.span.begin, block_end(&body, rparen_span).end);
        Ok(Some(Node::Function(FunctionNode {
            return_type: Ident::plain(ret_tok.lexeme, ret_tok.span),
            name: Ident::plain(name_tok.lexeme, name_tok.span),
            params,
            body,
            span,
        })))
    }

    /// `return` optionally followed by an expression.
    fn return_stmt(&mut self) -> DiagResult<Option<Node>> {
        if self.current().kind != TokenKind::Return {
            return Ok(None);
        }
        let ret_tok = self.current();
        self.advance();

        let value = if self.starts_expr() {
            Some(Box::new(self.expr()?))
        } else {
            None
        };
        let end = value.as_ref().map(|v| v.span()).unwrap_or(ret_tok.span);
        Ok(Some(Node::Return(ReturnNode {
            value,
            span: Span::new(ret_tok.span.begin, end.end),
        })))
    }

    /// `for ( assign ; cond ; assign ) body`. The header semicolons are
    /// consumed when present.
    fn for_loop(&mut self) -> DiagResult<Option<Node>> {
        if self.current().kind != TokenKind::For {
            return Ok(None);
        }
        let for_tok = self.current();
        self.advance();

        if self.current().kind != TokenKind::LParen {
            return Err(self.err(DiagnosticKind::MissingParen, "'('", self.current().span));
        }
        self.advance();

        let Some(init) = self.any_assignment()? else {
            return Err(self.err(
                DiagnosticKind::InvalidSyntax,
                "Expected assignment operation",
                self.current().span,
            ));
        };
        if self.current().kind == TokenKind::Semi {
            self.advance();
        }

        let condition = self.expr()?;
        if self.current().kind == TokenKind::Semi {
            self.advance();
        }

        let Some(re_assign) = self.any_assignment()? else {
            return Err(self.err(
                DiagnosticKind::InvalidSyntax,
                "Expected reassignment operation",
                self.current().span,
            ));
        };

        if self.current().kind != TokenKind::RParen {
            return Err(self.err(DiagnosticKind::MissingParen, "')'", self.current().span));
        }
        let rparen = self.current();
        self.advance();

        let body = self.body()?;
        let span = Span::new(for_tok.span.begin, block_end(&body, rparen.span).end);
        Ok(Some(Node::ForLoop(ForLoopNode {
            init: Box::new(init),
            condition: Box::new(condition),
            re_assign: Box::new(re_assign),
            body,
            span,
        })))
    }

    /// Invocation: `dottedName ( args )`.
    pub(crate) fn callable(&mut self) -> DiagResult<Option<CallNode>> {
        let start = self.snapshot();
        let Some(name) = self.dot_chain() else {
            return Ok(None);
        };
        if self.current().kind != TokenKind::LParen {
            self.restore(start);
            return Ok(None);
        }

        let (args, rparen_span) = self.actual_parameters()?;
        let span = Span::new(name.span.begin, rparen_span.end);
        Ok(Some(CallNode { name, args, span }))
    }

    /// `( (typeId paramName (, typeId paramName)*)? )`
    fn formal_parameters(&mut self) -> DiagResult<(Vec<Param>, Span)> {
        self.advance();

        let mut params = Vec::new();
        loop {
            if self.current().kind == TokenKind::RParen {
                break;
            }
            let type_tok = self.current();
            if type_tok.is_eof() {
                return Err(self.err(DiagnosticKind::MissingParen, "')'", type_tok.span));
            }
            self.advance();
            let name_tok = self.current();

            if type_tok.family != TokenFamily::Identifier {
                return Err(self.err(
                    DiagnosticKind::InvalidSyntax,
                    format!("Invalid identifier: {:?}", type_tok.family),
                    type_tok.span,
                ));
            }
            if name_tok.family != TokenFamily::Identifier {
                return Err(self.err(
                    DiagnosticKind::InvalidSyntax,
                    format!("Invalid identifier: {:?}", name_tok.family),
                    name_tok.span,
                ));
            }

            params.push(Param {
                type_id: Ident::plain(type_tok.lexeme, type_tok.span),
                name: Ident::plain(name_tok.lexeme, name_tok.span),
            });
            self.advance();
            if self.current().kind == TokenKind::Comma {
                self.advance();
            }
        }

        let rparen = self.current();
        self.advance();
        Ok((params, rparen.span))
    }

    /// `( (expr (, expr)*)? )`
    fn actual_parameters(&mut self) -> DiagResult<(Vec<Node>, Span)> {
        self.advance();

        let mut args = Vec::new();
        loop {
            if self.current().kind == TokenKind::RParen {
                break;
            }
            if self.current().is_eof() {
                return Err(self.err(
                    DiagnosticKind::MissingParen,
                    "')'",
                    self.current().span,
                ));
            }
            args.push(self.expr()?);
            if self.current().kind == TokenKind::Comma {
                self.advance();
            }
        }

        let rparen = self.current();
        self.advance();
        Ok((args, rparen.span))
    }

    /// One or more identifiers joined by `.`, as a linked chain.
    pub(crate) fn dot_chain(&mut self) -> Option<Ident> {
        let mut members = Vec::new();
        while self.current().kind == TokenKind::Ident {
            members.push(self.current());
            self.advance();
            if self.current().kind == TokenKind::Dot {
                self.advance();
            } else {
                break;
            }
        }

        let mut chain: Option<Ident> = None;
        for tok in members.into_iter().rev() {
            chain = Some(Ident {
                name: tok.lexeme,
                chained: chain.map(Box::new),
                span: tok.span,
            });
        }
        chain
    }

    /// A branch or loop body: a brace-balanced region of statements, or
    /// exactly one statement when the brace is absent.
    fn body(&mut self) -> DiagResult<Vec<Node>> {
        if self.current().kind != TokenKind::LBrace {
            return Ok(vec![self.statement()?]);
        }

        let open = self.current();
        let mut depth = 0usize;
        let mut i = self.idx;
        let close_idx = loop {
            let tok = self.tokens.get(i).copied().unwrap_or(self.eof);
            match tok.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break i;
                    }
                }
                TokenKind::Eof => {
                    return Err(self.err(DiagnosticKind::MissingBrace, "'}'", open.span));
                }
                _ => {}
            }
            i += 1;
        };

        self.advance();
        let mut body = Vec::new();
        while self.idx < close_idx {
            body.push(self.statement()?);
            if self.current().kind == TokenKind::Semi && self.idx < close_idx {
                self.advance();
            }
        }
        self.advance();
        Ok(body)
    }

    /// Whether the current token can open an expression.
    fn starts_expr(&self) -> bool {
        let tok = self.current();
        matches!(tok.family, TokenFamily::Literal | TokenFamily::Identifier)
            || matches!(tok.kind, TokenKind::Minus | TokenKind::Not | TokenKind::LParen)
    }

    pub(crate) fn current(&self) -> Token {
        self.tokens.get(self.idx).copied().unwrap_or(self.eof)
    }

    pub(crate) fn peek(&self, n: usize) -> Token {
        self.tokens.get(self.idx + n).copied().unwrap_or(self.eof)
    }

    pub(crate) fn advance(&mut self) {
        if self.idx < self.tokens.len() {
            self.idx += 1;
        }
    }

    pub(crate) fn snapshot(&self) -> usize {
        self.idx
    }

    pub(crate) fn restore(&mut self, idx: usize) {
        self.idx = idx;
    }

    pub(crate) fn err(
        &self,
        kind: DiagnosticKind,
        details: impl Into<String>,
        span: Span,
    ) -> Diagnostic {
        Diagnostic::new(kind, details, self.src.line(span.begin.line), span)
    }
}

/// The span of the last statement in a body, or `fallback` for empty
/// bodies.
fn block_end(body: &[Node], fallback: Span) -> Span {
    body.last().map(|n| n.span()).unwrap_or(fallback)
}
