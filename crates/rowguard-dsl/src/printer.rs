use rowguard_core::ScalarValue;

use crate::ast::{BoolOp, CompareOp, ConditionExpr, ContextBinding, Operand};

/// Renders the canonical text form of a condition tree.
///
/// Canonical form single-quotes string literals and uppercases AND/OR.
/// For any parser-built tree, `parse(print(expr))` reproduces `expr`:
/// the parser only builds left-leaning `Combine` chains, which is exactly
/// the shape an unparenthesized rendering re-parses to. The policy
/// compiler's byte-identical recompilation guarantee rests on this
/// rendering being a pure function of the tree.
pub fn print(expr: &ConditionExpr) -> String {
    let mut out = String::new();
    print_expr(expr, &mut out);
    out
}

fn print_expr(expr: &ConditionExpr, out: &mut String) {
    match expr {
        ConditionExpr::Compare { left, op, right } => {
            print_operand(left, out);
            match op {
                CompareOp::Eq => out.push_str(" = "),
            }
            print_operand(right, out);
        }
        ConditionExpr::Combine { op, left, right } => {
            print_expr(left, out);
            out.push_str(match op {
                BoolOp::And => " AND ",
                BoolOp::Or => " OR ",
            });
            print_expr(right, out);
        }
    }
}

fn print_operand(operand: &Operand, out: &mut String) {
    match operand {
        Operand::Field(name) => out.push_str(name.as_str()),
        Operand::Context(ContextBinding::UserId) => out.push_str("{userId}"),
        Operand::Context(ContextBinding::UserProperty(property)) => {
            out.push_str("{user.");
            out.push_str(property);
            out.push('}');
        }
        Operand::Literal(value) => print_literal(value, out),
    }
}

fn print_literal(value: &ScalarValue, out: &mut String) {
    match value {
        ScalarValue::Text(s) => {
            out.push('\'');
            for c in s.chars() {
                if c == '\'' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('\'');
        }
        // {:?} keeps the decimal point on whole floats, so the literal
        // re-lexes as a float rather than an integer.
        ScalarValue::Float(v) => out.push_str(&format!("{v:?}")),
        other => out.push_str(&other.to_string()),
    }
}
