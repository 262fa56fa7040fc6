//! Best-effort display text for expressions and assignment targets.
//!
//! These functions are pure and total: every expression shape renders to
//! *some* string, with [`PLACEHOLDER`] standing in for anything the tree
//! could not model. The output is advisory label text only, so fidelity is
//! deliberately lossy (no operator precedence, no string escaping).

use crate::ast::{BoolOp, Expr, Literal, UnaryOp};

/// Token shown for expression shapes with no renderable form.
pub const PLACEHOLDER: &str = "...";

/// Renders an expression for use in a node label. Never fails.
pub fn expr_text(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => literal_text(lit),
        Expr::Name(name) => name.clone(),
        Expr::List(elts) => format!("[{}]", join(elts)),
        Expr::Tuple(elts) => format!("({})", join(elts)),
        Expr::Call { func, args } => format!("{}({})", callee_text(func), join(args)),
        Expr::Attribute { value, attr } => format!("{}.{attr}", expr_text(value)),
        Expr::BinOp { left, op, right } => {
            format!("{} {} {}", expr_text(left), op.as_str(), expr_text(right))
        }
        Expr::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut text = expr_text(left);
            for (op, comparator) in ops.iter().zip(comparators) {
                text.push(' ');
                text.push_str(op.as_str());
                text.push(' ');
                text.push_str(&expr_text(comparator));
            }
            text
        }
        Expr::BoolOp { op, values } => {
            let sep = match op {
                BoolOp::And => " and ",
                BoolOp::Or => " or ",
            };
            values
                .iter()
                .map(expr_text)
                .collect::<Vec<_>>()
                .join(sep)
        }
        Expr::UnaryOp {
            op: UnaryOp::Not,
            operand,
        } => format!("not {}", expr_text(operand)),
        Expr::Subscript { value, index } => {
            format!("{}[{}]", expr_text(value), expr_text(index))
        }
        Expr::Unsupported => PLACEHOLDER.to_string(),
    }
}

/// Renders a loop target: a plain name, or a parenthesized name tuple.
pub fn target_text(target: &Expr) -> String {
    match target {
        Expr::Name(name) => name.clone(),
        Expr::Tuple(elts) => {
            let names: Vec<&str> = elts
                .iter()
                .filter_map(|elt| match elt {
                    Expr::Name(name) => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            format!("({})", names.join(", "))
        }
        _ => "target".to_string(),
    }
}

/// Renders the left side of an assignment: target names, flattened across
/// tuple unpacking, joined with commas.
pub fn assign_targets_text(targets: &[Expr]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for target in targets {
        match target {
            Expr::Name(name) => names.push(name),
            Expr::Tuple(elts) => {
                names.extend(elts.iter().filter_map(|elt| match elt {
                    Expr::Name(name) => Some(name.as_str()),
                    _ => None,
                }));
            }
            _ => {}
        }
    }
    names.join(", ")
}

/// Renders a call target: a name, or `receiver.method` for attribute calls.
pub fn callee_text(func: &Expr) -> String {
    match func {
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => format!("{}.{attr}", expr_text(value)),
        _ => "function".to_string(),
    }
}

fn literal_text(lit: &Literal) -> String {
    match lit {
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => {
            let text = value.to_string();
            // Canonical Python float text keeps a decimal point.
            if text.chars().all(|c| c.is_ascii_digit() || c == '-') {
                format!("{text}.0")
            } else {
                text
            }
        }
        Literal::Str(value) => format!("'{value}'"),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::None => "None".to_string(),
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs.iter().map(expr_text).collect::<Vec<_>>().join(", ")
}
