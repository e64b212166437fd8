//! The tree-walking interpreter.
//!
//! Walks a list of AST nodes in order, dispatching on the node variant.
//! `return` produces [`Flow::Return`], which unwinds through enclosing
//! bodies (if/elif/else branches, for-loop bodies) up to the nearest
//! function invocation boundary. Any diagnostic aborts the traversal.
//!
//! I/O for `print` and the `input*` built-ins goes through injected
//! writer/reader handles so executions are testable; the driver passes
//! stdout and stdin.

use std::io::{BufRead, Write};

use viper_par::ast::*;
use viper_util::{DiagResult, Diagnostic, DiagnosticKind, SourceBuffer, Span};

use crate::builtins::{Builtin, StrMethod};
use crate::scope::{ScopeTree, SymbolEntry};
use crate::value::{self, OpError, Value};

/// How a statement finished: normally (with the value of the last
/// evaluated expression, if any), or by `return`.
enum Flow {
    Normal(Option<Value>),
    Return(Option<Value>),
}

/// The interpreter for one execution (one script, or one REPL block).
pub struct Interpreter<'a> {
    src: &'a SourceBuffer,
    scopes: ScopeTree,
    out: Box<dyn Write + 'a>,
    input: Box<dyn BufRead + 'a>,
}

impl<'a> Interpreter<'a> {
    /// An interpreter wired to stdout/stdin, with a fresh global scope.
    pub fn new(src: &'a SourceBuffer) -> Self {
        Self::with_io(
            src,
            Box::new(std::io::stdout()),
            Box::new(std::io::BufReader::new(std::io::stdin())),
        )
    }

    /// An interpreter with explicit I/O handles.
    pub fn with_io(
        src: &'a SourceBuffer,
        out: Box<dyn Write + 'a>,
        input: Box<dyn BufRead + 'a>,
    ) -> Self {
        Self { src, scopes: ScopeTree::new(), out, input }
    }

    /// The symbol table, for inspection after a run.
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Execute a list of top-level nodes, returning the value of the last
    /// evaluated node.
    pub fn run(&mut self, nodes: &[Node]) -> DiagResult<Option<Value>> {
        tracing::debug!(statements = nodes.len(), "executing block");
        match self.run_block(nodes)? {
            Flow::Normal(value) | Flow::Return(value) => Ok(value),
        }
    }

    fn run_block(&mut self, nodes: &[Node]) -> DiagResult<Flow> {
        let mut last = None;
        for node in nodes {
            match self.exec(node)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(value) => last = value,
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec(&mut self, node: &Node) -> DiagResult<Flow> {
        match node {
            Node::Assign(assign) => {
                self.exec_assign(assign)?;
                Ok(Flow::Normal(None))
            }
            Node::IfElse(if_else) => self.exec_if_else(if_else),
            Node::ForLoop(for_loop) => self.exec_for_loop(for_loop),
            Node::Function(func) => {
                self.define_function(func)?;
                Ok(Flow::Normal(None))
            }
            Node::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => None,
                };
                Ok(Flow::Return(value))
            }
            other => Ok(Flow::Normal(self.eval_expr(other)?)),
        }
    }

    /// Evaluate an expression node. `None` means the expression produced no
    /// value (a call to a value-less function, or a non-variable name).
    fn eval_expr(&mut self, node: &Node) -> DiagResult<Option<Value>> {
        match node {
            Node::Number(n) => Ok(Some(match n.value {
                NumberValue::Int(i) => Value::int(i),
                NumberValue::Float(f) => Value::float(f),
            })),
            Node::Str(n) => Ok(Some(Value::Str(n.value.as_str().to_owned()))),
            Node::Bool(n) => Ok(Some(Value::Bool(n.value))),
            Node::Identifier(ident) => self.eval_identifier(ident),
            Node::Unary(n) => self.eval_unary(n),
            Node::Bin(n) => self.eval_bin(n),
            Node::Comp(n) => self.eval_comp(n),
            Node::Call(call) => self.eval_call(call),
            // Statement-shaped nodes never appear in expression position;
            // the parser cannot produce them here.
            Node::Assign(_) | Node::IfElse(_) | Node::ForLoop(_) | Node::Function(_)
            | Node::Return(_) => Ok(None),
        }
    }

    fn eval_identifier(&mut self, ident: &Ident) -> DiagResult<Option<Value>> {
        match self.scopes.resolve(ident.name) {
            Some(SymbolEntry::Variable(value)) => Ok(Some(value.clone())),
            Some(_) => Ok(None),
            None => Err(self.err(
                DiagnosticKind::UndefinedName,
                format!("Name '{}' is undefined", ident.dotted()),
                ident.span,
            )),
        }
    }

    fn eval_unary(&mut self, node: &UnaryNode) -> DiagResult<Option<Value>> {
        let operand = self.eval_expr(&node.operand)?;
        match node.op {
            UnaryOp::Not => Ok(Some(Value::Bool(!truthy(&operand)))),
            UnaryOp::Neg => {
                let result = operand.as_ref().map(value::apply_neg);
                match result {
                    Some(Ok(value)) => Ok(Some(value)),
                    _ => Err(self.err(
                        DiagnosticKind::InvalidType,
                        format!("Unsupported operand type for '-': {}", type_name(&operand)),
                        node.span,
                    )),
                }
            }
        }
    }

    fn eval_bin(&mut self, node: &BinNode) -> DiagResult<Option<Value>> {
        let left = self.eval_expr(&node.left)?;
        let right = self.eval_expr(&node.right)?;

        match node.op {
            // Both operands are evaluated eagerly; the result is whichever
            // operand decides the outcome.
            BinOp::And => Ok(if truthy(&left) { right } else { left }),
            BinOp::Or => Ok(if truthy(&left) { left } else { right }),
            op => {
                let (Some(l), Some(r)) = (&left, &right) else {
                    return Err(self.err(
                        DiagnosticKind::InvalidType,
                        format!(
                            "Unsupported operand types for '{}': {} and {}",
                            op.glyph(),
                            type_name(&left),
                            type_name(&right)
                        ),
                        node.span,
                    ));
                };
                Ok(Some(self.combine(op, l, r, node.span)?))
            }
        }
    }

    fn eval_comp(&mut self, node: &CompNode) -> DiagResult<Option<Value>> {
        let left = self.eval_expr(&node.left)?;
        let right = self.eval_expr(&node.right)?;

        let result = match (&left, &right) {
            (Some(l), Some(r)) => match value::apply_comp(node.op, l, r) {
                Ok(b) => b,
                Err(_) => {
                    return Err(self.err(
                        DiagnosticKind::InvalidType,
                        format!(
                            "Unsupported operand types for '{}': {} and {}",
                            node.op.glyph(),
                            type_name(&left),
                            type_name(&right)
                        ),
                        node.span,
                    ));
                }
            },
            // Comparison against the absent value is defined for equality
            // only.
            (None, None) => match node.op {
                CompOpKind::EqEqual => true,
                CompOpKind::NotEqual => false,
                _ => return Err(self.absent_comparison(node)),
            },
            _ => match node.op {
                CompOpKind::EqEqual => false,
                CompOpKind::NotEqual => true,
                _ => return Err(self.absent_comparison(node)),
            },
        };
        Ok(Some(Value::Bool(result)))
    }

    fn absent_comparison(&self, node: &CompNode) -> Diagnostic {
        self.err(
            DiagnosticKind::InvalidType,
            format!("Unsupported operand types for '{}': None", node.op.glyph()),
            node.span,
        )
    }

    /// Declaration or reassignment.
    fn exec_assign(&mut self, node: &AssignNode) -> DiagResult<()> {
        let value = self.eval_expr(&node.value)?;

        match &node.declared_type {
            Some(ty) => {
                match self.scopes.resolve(ty.name) {
                    Some(SymbolEntry::DataType) => {}
                    Some(_) => {
                        return Err(self.err(
                            DiagnosticKind::InvalidAssignment,
                            format!("'{}' is not a type", ty.name),
                            ty.span,
                        ));
                    }
                    None => {
                        return Err(self.err(
                            DiagnosticKind::UndefinedName,
                            format!("Type {} is not defined", ty.name),
                            ty.span,
                        ));
                    }
                }

                let Some(value) = value else {
                    return Err(self.err(
                        DiagnosticKind::InvalidAssignment,
                        format!("Type None can't be assigned to declared type {}", ty.name),
                        node.span,
                    ));
                };
                if value.data_type().name() != ty.name.as_str() {
                    return Err(self.err(
                        DiagnosticKind::InvalidAssignment,
                        format!(
                            "Type {} can't be assigned to declared type {}",
                            value.data_type().name(),
                            ty.name
                        ),
                        node.span,
                    ));
                }

                self.scopes.insert(node.name.name, SymbolEntry::Variable(value));
                Ok(())
            }
            None => {
                let current = match self.scopes.resolve(node.name.name) {
                    Some(SymbolEntry::Variable(value)) => value.clone(),
                    Some(_) => {
                        return Err(self.err(
                            DiagnosticKind::InvalidAssignment,
                            format!("Name '{}' is not a variable", node.name.dotted()),
                            node.name.span,
                        ));
                    }
                    None => {
                        return Err(self.err(
                            DiagnosticKind::UndefinedName,
                            format!("Name '{}' is undefined", node.name.dotted()),
                            node.name.span,
                        ));
                    }
                };

                let Some(value) = value else {
                    return Err(self.err(
                        DiagnosticKind::InvalidAssignment,
                        format!(
                            "Type None can't be assigned to declared type {}",
                            current.data_type().name()
                        ),
                        node.span,
                    ));
                };
                if value.data_type() != current.data_type() {
                    return Err(self.err(
                        DiagnosticKind::InvalidAssignment,
                        format!(
                            "Type {} can't be assigned to declared type {}",
                            value.data_type().name(),
                            current.data_type().name()
                        ),
                        node.span,
                    ));
                }

                let stored = match node.op {
                    AssignOp::Set => value,
                    AssignOp::Add => self.combine(BinOp::Add, &current, &value, node.span)?,
                    AssignOp::Sub => self.combine(BinOp::Sub, &current, &value, node.span)?,
                    AssignOp::Mul => self.combine(BinOp::Mul, &current, &value, node.span)?,
                    AssignOp::Div => self.combine(BinOp::Div, &current, &value, node.span)?,
                    AssignOp::Pow => self.combine(BinOp::Pow, &current, &value, node.span)?,
                };
                self.scopes.update_variable(node.name.name, stored);
                Ok(())
            }
        }
    }

    fn exec_if_else(&mut self, node: &IfElseNode) -> DiagResult<Flow> {
        let condition = self.eval_expr(&node.if_node.condition)?;
        if truthy(&condition) {
            return self.run_branch(&node.if_node.body);
        }

        for elif in &node.elif_nodes {
            let condition = self.eval_expr(&elif.condition)?;
            if truthy(&condition) {
                return self.run_branch(&elif.body);
            }
        }

        if let Some(else_node) = &node.else_node {
            return self.run_branch(&else_node.body);
        }
        Ok(Flow::Normal(None))
    }

    /// Run a branch body; only a `return` escapes as the statement's
    /// result.
    fn run_branch(&mut self, body: &[Node]) -> DiagResult<Flow> {
        match self.run_block(body)? {
            Flow::Return(value) => Ok(Flow::Return(value)),
            Flow::Normal(_) => Ok(Flow::Normal(None)),
        }
    }

    fn exec_for_loop(&mut self, node: &ForLoopNode) -> DiagResult<Flow> {
        self.exec_assign(&node.init)?;

        loop {
            let condition = self.eval_expr(&node.condition)?;
            if !truthy(&condition) {
                break;
            }
            if let Flow::Return(value) = self.run_block(&node.body)? {
                return Ok(Flow::Return(value));
            }
            self.exec_assign(&node.re_assign)?;
        }
        Ok(Flow::Normal(None))
    }

    /// Install a function definition in the current scope after checking
    /// its parameter type names resolve.
    fn define_function(&mut self, node: &FunctionNode) -> DiagResult<()> {
        for param in &node.params {
            if !self.scopes.contains(param.type_id.name) {
                return Err(self.err(
                    DiagnosticKind::UndefinedName,
                    format!("Name '{}' is undefined", param.type_id.name),
                    param.type_id.span,
                ));
            }
        }
        self.scopes.insert(
            node.name.name,
            SymbolEntry::FuncDef { node: node.clone(), scope: self.scopes.current() },
        );
        Ok(())
    }

    fn eval_call(&mut self, call: &CallNode) -> DiagResult<Option<Value>> {
        let name_span = Span::new(call.span.begin, call.name.last_span().end);
        let Some(entry) = self.scopes.resolve(call.name.name).cloned() else {
            return Err(self.err(
                DiagnosticKind::UndefinedName,
                format!("Name '{}' is undefined", call.name.dotted()),
                name_span,
            ));
        };

        match entry {
            SymbolEntry::InbuiltFunc(builtin) => {
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(arg)?);
                }
                self.call_builtin(builtin, args, call)
            }
            SymbolEntry::DataType => Err(self.err(
                DiagnosticKind::InvalidType,
                format!("'{}' is not callable", call.name.dotted()),
                call.span,
            )),
            SymbolEntry::Variable(value) => self.call_method(&value, call),
            SymbolEntry::FuncDef { node, scope } => self.call_function(&node, scope, call),
        }
    }

    /// A dotted call on a variable invokes a method from the primitive's
    /// intrinsic table. Only strings have methods.
    fn call_method(&mut self, value: &Value, call: &CallNode) -> DiagResult<Option<Value>> {
        let Some(method_ident) = &call.name.chained else {
            return Err(self.err(
                DiagnosticKind::InvalidType,
                format!("Type {} is not callable", value.data_type().name()),
                call.span,
            ));
        };

        let method = match value {
            Value::Str(s) => StrMethod::from_name(method_ident.name.as_str())
                .map(|m| m.apply(s)),
            _ => None,
        };
        match method {
            Some(result) => Ok(Some(result)),
            None => Err(self.err(
                DiagnosticKind::UndefinedName,
                format!("Name '{}' is undefined", method_ident.name),
                method_ident.span,
            )),
        }
    }

    /// Invoke a user function: type-check arguments against the formals,
    /// then run the body in a fresh child of the *defining* scope.
    fn call_function(
        &mut self,
        func: &FunctionNode,
        def_scope: crate::scope::ScopeId,
        call: &CallNode,
    ) -> DiagResult<Option<Value>> {
        tracing::trace!(name = %func.name.name, "calling function");

        let mut bound = Vec::with_capacity(func.params.len());
        for (i, param) in func.params.iter().enumerate() {
            let Some(arg_node) = call.args.get(i) else {
                return Err(self.err(
                    DiagnosticKind::InvalidType,
                    format!("Missing argument for parameter '{}'", param.name.name),
                    call.span,
                ));
            };
            let arg = self.eval_expr(arg_node)?;
            let Some(arg) = arg else {
                return Err(self.err(
                    DiagnosticKind::InvalidAssignment,
                    format!(
                        "Type None can't be assigned to parameter of type {}",
                        param.type_id.name
                    ),
                    arg_node.span(),
                ));
            };
            if arg.data_type().name() != param.type_id.name.as_str() {
                return Err(self.err(
                    DiagnosticKind::InvalidAssignment,
                    format!(
                        "Type {} can't be assigned to parameter of type {}",
                        arg.data_type().name(),
                        param.type_id.name
                    ),
                    arg_node.span(),
                ));
            }
            bound.push((param.name.name, arg));
        }

        let saved = self.scopes.current();
        self.scopes.push_scope(def_scope);
        for (name, value) in bound {
            self.scopes.insert(name, SymbolEntry::Variable(value));
        }
        let flow = self.run_block(&func.body);
        self.scopes.pop_to(saved);

        match flow? {
            Flow::Return(value) | Flow::Normal(value) => Ok(value),
        }
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Option<Value>>,
        call: &CallNode,
    ) -> DiagResult<Option<Value>> {
        match builtin {
            Builtin::Print => {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|arg| match arg {
                        Some(value) => value.to_string(),
                        None => "None".to_owned(),
                    })
                    .collect();
                writeln!(self.out, "{}", rendered.join(" "))
                    .map_err(|e| self.io_error(e, call.span))?;
                Ok(None)
            }
            Builtin::Sum => {
                let mut values = args.into_iter();
                let Some(Some(first)) = values.next() else {
                    return Err(self.err(
                        DiagnosticKind::InvalidType,
                        "sum() expects at least one argument",
                        call.span,
                    ));
                };
                let mut acc = first;
                for arg in values {
                    let Some(arg) = arg else {
                        return Err(self.err(
                            DiagnosticKind::InvalidType,
                            "Unsupported operand types for '+': None",
                            call.span,
                        ));
                    };
                    acc = self.combine(BinOp::Add, &acc, &arg, call.span)?;
                }
                Ok(Some(acc))
            }
            Builtin::InputExpr => {
                let line = self.read_input_line(&args, call.span)?;
                Ok(Some(Value::Str(line)))
            }
            Builtin::InputNum => {
                let line = self.read_input_line(&args, call.span)?;
                match line.trim().parse::<f64>() {
                    Ok(n) => Ok(Some(Value::float(n))),
                    Err(_) => Err(self.err(
                        DiagnosticKind::Runtime,
                        format!("could not convert string to num: '{line}'"),
                        call.span,
                    )),
                }
            }
        }
    }

    /// Print the optional prompt argument (no newline), then read one line
    /// with its line ending stripped.
    fn read_input_line(&mut self, args: &[Option<Value>], span: Span) -> DiagResult<String> {
        if let Some(Some(prompt)) = args.first() {
            write!(self.out, "{prompt}").map_err(|e| self.io_error(e, span))?;
        }
        self.out.flush().map_err(|e| self.io_error(e, span))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| self.io_error(e, span))?;
        if read == 0 {
            return Err(self.err(DiagnosticKind::Runtime, "EOF when reading a line", span));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Apply an arithmetic operator, mapping failures to diagnostics.
    fn combine(&self, op: BinOp, left: &Value, right: &Value, span: Span) -> DiagResult<Value> {
        match value::apply_bin(op, left, right) {
            Ok(value) => Ok(value),
            Err(OpError::DivisionByZero) => {
                Err(self.err(DiagnosticKind::Runtime, "division by zero", span))
            }
            Err(OpError::Unsupported) => Err(self.err(
                DiagnosticKind::InvalidType,
                format!(
                    "Unsupported operand types for '{}': {} and {}",
                    op.glyph(),
                    left.data_type().name(),
                    right.data_type().name()
                ),
                span,
            )),
        }
    }

    fn io_error(&self, error: std::io::Error, span: Span) -> Diagnostic {
        self.err(DiagnosticKind::Runtime, error.to_string(), span)
    }

    fn err(&self, kind: DiagnosticKind, details: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(kind, details, self.src.line(span.begin.line), span)
    }
}

fn truthy(value: &Option<Value>) -> bool {
    value.as_ref().map(Value::is_truthy).unwrap_or(false)
}

fn type_name(value: &Option<Value>) -> &'static str {
    match value {
        Some(v) => v.data_type().name(),
        None => "None",
    }
}
