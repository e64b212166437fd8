//! Expression parsing.
//!
//! A binding-power loop drives infix parsing. `+ - * /` associate left;
//! `**` (and its alias `^`) associates right and binds tighter than `* /`;
//! comparison and logical operators group to the right. Prefix `-` and
//! `not` apply to a primary, so `-2 ** 2` is `(-2) ** 2`.

use viper_lex::{TokenFamily, TokenKind};
use viper_util::{DiagResult, DiagnosticKind, Span};

use crate::ast::*;
use crate::parser::Parser;

/// An infix operator with its left/right binding powers. Left-associative
/// operators have `rbp > lbp`; right-associative the reverse.
enum InfixOp {
    Bin(BinOp),
    Comp(CompOpKind),
}

fn infix_op(kind: TokenKind) -> Option<(InfixOp, u8, u8)> {
    match kind {
        TokenKind::And => Some((InfixOp::Bin(BinOp::And), 2, 1)),
        TokenKind::Or => Some((InfixOp::Bin(BinOp::Or), 2, 1)),
        TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual
        | TokenKind::EqEqual
        | TokenKind::NotEqual => CompOpKind::from_token(kind).map(|op| (InfixOp::Comp(op), 4, 3)),
        TokenKind::Plus => Some((InfixOp::Bin(BinOp::Add), 5, 6)),
        TokenKind::Minus => Some((InfixOp::Bin(BinOp::Sub), 5, 6)),
        TokenKind::Star => Some((InfixOp::Bin(BinOp::Mul), 7, 8)),
        TokenKind::Slash => Some((InfixOp::Bin(BinOp::Div), 7, 8)),
        TokenKind::DoubleStar => Some((InfixOp::Bin(BinOp::Pow), 10, 9)),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Parse a full expression.
    pub(crate) fn expr(&mut self) -> DiagResult<Node> {
        self.expr_bp(0)
    }

    fn expr_bp(&mut self, min_bp: u8) -> DiagResult<Node> {
        let mut lhs = self.primary()?;

        loop {
            let Some((op, lbp, rbp)) = infix_op(self.current().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.expr_bp(rbp)?;
            let span = Span::new(lhs.span().begin, rhs.span().end);
            lhs = match op {
                InfixOp::Bin(op) => Node::Bin(BinNode {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(rhs),
                    span,
                }),
                InfixOp::Comp(op) => Node::Comp(CompNode {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(rhs),
                    span,
                }),
            };
        }

        Ok(lhs)
    }

    /// Literal, prefix operator, parenthesised expression, call, dotted
    /// name, or identifier.
    fn primary(&mut self) -> DiagResult<Node> {
        let tok = self.current();
        match tok.kind {
            TokenKind::Num => {
                let node = self.number_literal()?;
                self.advance();
                Ok(Node::Number(node))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Node::Str(StringNode { value: tok.lexeme, span: tok.span }))
            }
            TokenKind::Bool => {
                self.advance();
                let value = viper_lex::token::bool_literal(tok.text()).unwrap_or(false);
                Ok(Node::Bool(BoolNode { value, span: tok.span }))
            }
            TokenKind::Minus | TokenKind::Not => {
                let op = if tok.kind == TokenKind::Minus { UnaryOp::Neg } else { UnaryOp::Not };
                self.advance();
                let operand = self.primary()?;
                let span = Span::new(tok.span.begin, operand.span().end);
                Ok(Node::Unary(UnaryNode { op, operand: Box::new(operand), span }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                if self.current().kind != TokenKind::RParen {
                    return Err(self.err(
                        DiagnosticKind::MissingParen,
                        "')'",
                        self.current().span,
                    ));
                }
                self.advance();
                Ok(inner)
            }
            _ if tok.family == TokenFamily::Identifier => {
                if let Some(call) = self.callable()? {
                    return Ok(Node::Call(call));
                }
                match self.dot_chain() {
                    Some(ident) => Ok(Node::Identifier(ident)),
                    None => Err(self.err(
                        DiagnosticKind::MissingExpr,
                        "Expected expression",
                        tok.span,
                    )),
                }
            }
            _ => Err(self.err(
                DiagnosticKind::MissingExpr,
                "Expected expression",
                tok.span,
            )),
        }
    }

    fn number_literal(&mut self) -> DiagResult<NumberNode> {
        let tok = self.current();
        let text = tok.text();
        let value = if text.contains('.') {
            match text.parse::<f64>() {
                Ok(f) => NumberValue::Float(f),
                Err(_) => {
                    return Err(self.err(DiagnosticKind::InvalidLiteral, text, tok.span));
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => NumberValue::Int(i),
                Err(_) => match text.parse::<f64>() {
                    Ok(f) => NumberValue::Float(f),
                    Err(_) => {
                        return Err(self.err(DiagnosticKind::InvalidLiteral, text, tok.span));
                    }
                },
            }
        };
        Ok(NumberNode { value, span: tok.span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use viper_lex::tokenize;
    use viper_util::SourceBuffer;

    fn parse_expr(src: &str) -> Node {
        let buf = SourceBuffer::new(src);
        let tokens = tokenize(&buf).expect("lexes");
        let mut nodes = parse(tokens, &buf).expect("parses");
        assert_eq!(nodes.len(), 1);
        nodes.pop().expect("one node")
    }

    /// Render the grouping structure for associativity checks.
    fn shape(node: &Node) -> String {
        match node {
            Node::Number(n) => match n.value {
                NumberValue::Int(i) => i.to_string(),
                NumberValue::Float(f) => f.to_string(),
            },
            Node::Str(n) => format!("{:?}", n.value.as_str()),
            Node::Bool(n) => n.value.to_string(),
            Node::Identifier(id) => id.dotted(),
            Node::Unary(n) => {
                let op = match n.op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "not ",
                };
                format!("({op}{})", shape(&n.operand))
            }
            Node::Bin(n) => format!("({} {} {})", shape(&n.left), n.op.glyph(), shape(&n.right)),
            Node::Comp(n) => format!("({} {} {})", shape(&n.left), n.op.glyph(), shape(&n.right)),
            other => format!("{other:?}"),
        }
    }

    fn expr_shape(src: &str) -> String {
        // Wrap in a throwaway call so the expression parses as an argument.
        let Node::Call(call) = parse_expr(&format!("probe({src})")) else {
            panic!("expected call wrapper");
        };
        shape(&call.args[0])
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(expr_shape("1 + 2 * 3"), "(1 + (2 * 3))");
    }

    #[test]
    fn addition_is_left_associative() {
        assert_eq!(expr_shape("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(expr_shape("1 + 2 + 3"), "((1 + 2) + 3)");
    }

    #[test]
    fn division_is_left_associative() {
        assert_eq!(expr_shape("8 / 4 / 2"), "((8 / 4) / 2)");
    }

    #[test]
    fn exponentiation_is_right_associative() {
        assert_eq!(expr_shape("2 ** 3 ** 2"), "(2 ** (3 ** 2))");
    }

    #[test]
    fn exponentiation_binds_tighter_than_multiplication() {
        assert_eq!(expr_shape("2 * 3 ** 2"), "(2 * (3 ** 2))");
    }

    #[test]
    fn caret_is_exponentiation() {
        assert_eq!(expr_shape("2 ^ 3"), "(2 ** 3)");
    }

    #[test]
    fn comparisons_sit_below_arithmetic() {
        assert_eq!(expr_shape("1 + 2 < 3 * 4"), "((1 + 2) < (3 * 4))");
    }

    #[test]
    fn logical_sits_below_comparison() {
        assert_eq!(expr_shape("a < b and c > d"), "((a < b) and (c > d))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(expr_shape("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn unary_applies_to_the_primary() {
        assert_eq!(expr_shape("-2 + 3"), "((-2) + 3)");
        assert_eq!(expr_shape("-2 ** 2"), "((-2) ** 2)");
        assert_eq!(expr_shape("not a and b"), "((not a) and b)");
    }

    #[test]
    fn nested_unary() {
        assert_eq!(expr_shape("not not a"), "(not (not a))");
        assert_eq!(expr_shape("--1"), "(-(-1))");
    }

    #[test]
    fn dotted_names_parse_as_chains() {
        assert_eq!(expr_shape("a.b.c"), "a.b.c");
    }

    #[test]
    fn integer_and_float_literals_stay_distinct() {
        let Node::Call(call) = parse_expr("probe(7, 7.5)") else {
            panic!("expected call");
        };
        assert_eq!(
            call.args[0],
            Node::Number(NumberNode {
                value: NumberValue::Int(7),
                span: call.args[0].span()
            })
        );
        assert_eq!(
            call.args[1],
            Node::Number(NumberNode {
                value: NumberValue::Float(7.5),
                span: call.args[1].span()
            })
        );
    }

    #[test]
    fn calls_nest_inside_expressions() {
        assert_eq!(
            expr_shape("f(1) + 1").contains("+"),
            true,
        );
        let Node::Call(outer) = parse_expr("probe(f(g(1)))") else {
            panic!("expected call");
        };
        let Node::Call(inner) = &outer.args[0] else {
            panic!("expected inner call");
        };
        assert_eq!(inner.name.name.as_str(), "f");
    }

    #[test]
    fn missing_operand_is_a_missing_expr() {
        let buf = SourceBuffer::new("num x = 1 +");
        let tokens = tokenize(&buf).unwrap();
        let err = parse(tokens, &buf).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::MissingExpr);
        assert_eq!(err.details, "Expected expression");
    }

    #[test]
    fn unclosed_paren_is_a_missing_paren() {
        let buf = SourceBuffer::new("num x = (1 + 2");
        let tokens = tokenize(&buf).unwrap();
        let err = parse(tokens, &buf).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::MissingParen);
        assert_eq!(err.details, "')'");
    }
}
