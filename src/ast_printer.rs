use crate::expr::{Expr, LiteralValue};
use crate::token::{Token, TokenType};

/// Renders an expression in Brook's canonical form: every composite node
/// prints as `name(child, ...)` with operators spelled out as short names
/// (`add`, `lt`, `not`, ...), string literals quoted, and numbers formatted
/// the way the runtime displays them. The rendering is deterministic, so
/// tests use it to pin down the precedence and associativity decisions made
/// by the parser.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => format!("{:?}", s),

                LiteralValue::Number(n) => n.to_string(),
            },

            Expr::Grouping(inner) => Self::node("paren", &[Self::print(inner)]),

            Expr::Unary { operator, right } => {
                let name: &str = match operator.token_type {
                    TokenType::MINUS => "neg",
                    TokenType::BANG => "not",
                    _ => operator.lexeme.as_str(),
                };

                Self::node(name, &[Self::print(right)])
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Self::node(
                operator_name(operator),
                &[Self::print(left), Self::print(right)],
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                Self::node("set", &[name.lexeme.clone(), Self::print(value)])
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut children: Vec<String> = vec![Self::print(callee)];
                children.extend(arguments.iter().map(Self::print));

                Self::node("call", &children)
            }
        }
    }

    fn node(name: &str, children: &[String]) -> String {
        format!("{}({})", name, children.join(", "))
    }
}

/// Binary and logical operators render as names rather than punctuation,
/// which keeps the canonical form free of sigil soup.
fn operator_name(operator: &Token) -> &str {
    match operator.token_type {
        TokenType::PLUS => "add",
        TokenType::MINUS => "sub",
        TokenType::STAR => "mul",
        TokenType::SLASH => "div",
        TokenType::EQUAL_EQUAL => "eq",
        TokenType::BANG_EQUAL => "ne",
        TokenType::LESS => "lt",
        TokenType::LESS_EQUAL => "le",
        TokenType::GREATER => "gt",
        TokenType::GREATER_EQUAL => "ge",
        TokenType::AND => "and",
        TokenType::OR => "or",
        _ => operator.lexeme.as_str(),
    }
}
