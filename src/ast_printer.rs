use crate::expr::{Expr, LiteralValue};

/// Renders a literal the way both printers show it: integral numbers keep
/// a trailing `.0`.
fn literal(lit: &LiteralValue) -> String {
    match lit {
        LiteralValue::True => "true".into(),

        LiteralValue::False => "false".into(),

        LiteralValue::Nil => "nil".into(),

        LiteralValue::Str(s) => s.clone(),

        LiteralValue::Number(n) => {
            if n.fract() == 0.0 {
                // 3.0 → "3.0"
                format!("{:.1}", n)
            } else {
                n.to_string()
            }
        }
    }
}

/// Converts an expression to the Crafting‑Interpreters prefix form,
/// e.g. `(* (- 123.0) (group 45.67))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => literal(lit),

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            // ── operators ───────────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
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
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            // ── names ───────────────────────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            // ── calls and properties ────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),
        }
    }
}

/// Reverse‑Polish rendering: operands first, operator last,
/// e.g. `1.0 2.0 + 3.0 *`.
pub struct RpnPrinter;

impl RpnPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => literal(lit),

            // Grouping only steers precedence, which RPN makes explicit.
            Expr::Grouping(inner) => Self::print(inner),

            Expr::Unary { operator, right } => {
                // `-` is ambiguous in RPN; spell negation out.
                let op: &str = if operator.lexeme == "-" {
                    "neg"
                } else {
                    &operator.lexeme
                };
                format!("{} {}", Self::print(right), op)
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
            } => format!(
                "{} {} {}",
                Self::print(left),
                Self::print(right),
                operator.lexeme
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => format!("{} {} =", Self::print(value), name.lexeme),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("super {} .", method.lexeme),

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut parts: Vec<String> = arguments.iter().map(Self::print).collect();
                parts.push(Self::print(callee));
                parts.push(format!("call/{}", arguments.len()));
                parts.join(" ")
            }

            Expr::Get { object, name } => format!("{} {} .", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "{} {} {} .=",
                Self::print(object),
                Self::print(value),
                name.lexeme
            ),
        }
    }
}
