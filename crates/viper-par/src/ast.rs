//! AST node definitions.
//!
//! Every node carries the [`Span`] of the source region it covers. Dotted
//! access `a.b.c` is a linked [`Ident`] chain; declarations and
//! reassignments share [`AssignNode`], distinguished by `declared_type`.

use viper_lex::TokenKind;
use viper_util::{Span, Symbol};

/// An identifier, possibly the head of a dotted chain (`a.b.c`).
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Symbol,
    pub chained: Option<Box<Ident>>,
    pub span: Span,
}

impl Ident {
    pub fn plain(name: Symbol, span: Span) -> Self {
        Self { name, chained: None, span }
    }

    /// The span of the final link in the chain.
    pub fn last_span(&self) -> Span {
        match &self.chained {
            Some(next) => next.last_span(),
            None => self.span,
        }
    }

    /// The dotted rendering, for messages.
    pub fn dotted(&self) -> String {
        match &self.chained {
            Some(next) => format!("{}.{}", self.name, next.dotted()),
            None => self.name.as_str().to_owned(),
        }
    }
}

/// A number literal keeps the integer/fractional distinction of its lexeme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberNode {
    pub value: NumberValue,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StringNode {
    pub value: Symbol,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoolNode {
    pub value: bool,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryNode {
    pub op: UnaryOp,
    pub operand: Box<Node>,
    pub span: Span,
}

/// Arithmetic and logical binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And,
    Or,
}

impl BinOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::DoubleStar => Some(BinOp::Pow),
            TokenKind::And => Some(BinOp::And),
            TokenKind::Or => Some(BinOp::Or),
            _ => None,
        }
    }

    /// The glyph for diagnostics.
    pub fn glyph(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinNode {
    pub left: Box<Node>,
    pub op: BinOp,
    pub right: Box<Node>,
    pub span: Span,
}

/// Comparison operators, kept apart from [`BinOp`] because comparisons
/// always produce booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompOpKind {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqEqual,
    NotEqual,
}

impl CompOpKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Less => Some(CompOpKind::Less),
            TokenKind::Greater => Some(CompOpKind::Greater),
            TokenKind::LessEqual => Some(CompOpKind::LessEqual),
            TokenKind::GreaterEqual => Some(CompOpKind::GreaterEqual),
            TokenKind::EqEqual => Some(CompOpKind::EqEqual),
            TokenKind::NotEqual => Some(CompOpKind::NotEqual),
            _ => None,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CompOpKind::Less => "<",
            CompOpKind::Greater => ">",
            CompOpKind::LessEqual => "<=",
            CompOpKind::GreaterEqual => ">=",
            CompOpKind::EqEqual => "==",
            CompOpKind::NotEqual => "!=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompNode {
    pub left: Box<Node>,
    pub op: CompOpKind,
    pub right: Box<Node>,
    pub span: Span,
}

/// Assignment combinators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Equal => Some(AssignOp::Set),
            TokenKind::PlusEqual => Some(AssignOp::Add),
            TokenKind::MinusEqual => Some(AssignOp::Sub),
            TokenKind::StarEqual => Some(AssignOp::Mul),
            TokenKind::SlashEqual => Some(AssignOp::Div),
            TokenKind::DoubleStarEqual => Some(AssignOp::Pow),
            _ => None,
        }
    }
}

/// Declaration (`declared_type` present) or reassignment (absent).
#[derive(Clone, Debug, PartialEq)]
pub struct AssignNode {
    pub name: Ident,
    pub value: Box<Node>,
    pub op: AssignOp,
    pub declared_type: Option<Ident>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfNode {
    pub condition: Box<Node>,
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElseNode {
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfElseNode {
    pub if_node: IfNode,
    pub elif_nodes: Vec<IfNode>,
    pub else_node: Option<ElseNode>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForLoopNode {
    pub init: Box<AssignNode>,
    pub condition: Box<Node>,
    pub re_assign: Box<AssignNode>,
    pub body: Vec<Node>,
    pub span: Span,
}

/// A formal parameter: type identifier and parameter name.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub type_id: Ident,
    pub name: Ident,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionNode {
    pub return_type: Ident,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnNode {
    pub value: Option<Box<Node>>,
    pub span: Span,
}

/// An invocation: user function, built-in, or primitive method.
#[derive(Clone, Debug, PartialEq)]
pub struct CallNode {
    pub name: Ident,
    pub args: Vec<Node>,
    pub span: Span,
}

/// Any AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Number(NumberNode),
    Str(StringNode),
    Bool(BoolNode),
    Identifier(Ident),
    Unary(UnaryNode),
    Bin(BinNode),
    Comp(CompNode),
    Assign(AssignNode),
    IfElse(IfElseNode),
    ForLoop(ForLoopNode),
    Function(FunctionNode),
    Return(ReturnNode),
    Call(CallNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Number(n) => n.span,
            Node::Str(n) => n.span,
            Node::Bool(n) => n.span,
            Node::Identifier(n) => n.span,
            Node::Unary(n) => n.span,
            Node::Bin(n) => n.span,
            Node::Comp(n) => n.span,
            Node::Assign(n) => n.span,
            Node::IfElse(n) => n.span,
            Node::ForLoop(n) => n.span,
            Node::Function(n) => n.span,
            Node::Return(n) => n.span,
            Node::Call(n) => n.span,
        }
    }
}
