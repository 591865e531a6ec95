//! Pure functions for rendering a compiled policy expression to a
//! parameterized SQL predicate fragment.
//!
//! No I/O. No side effects. The core never executes SQL: the embedding
//! storage layer receives the fragment and the binding list and supplies
//! the session values at query time.
//!
//! Rendering is a deterministic in-order traversal, so recompiling an
//! unchanged schema yields byte-identical predicate text -- schema reloads
//! produce no spurious diffs.

use rowguard_core::ScalarValue;
use rowguard_dsl::{BoolOp, CompareOp, ContextBinding};
use serde::{Deserialize, Serialize};

use crate::expr::{PolicyExpr, PolicyOperand};

/// The source of one `$n` placeholder in a rendered predicate.
///
/// Session-derived values are always bound, never interpolated into the
/// predicate text. Serializable because the embedding request layer ships
/// predicate fragments into its storage query construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bind", content = "value", rename_all = "snake_case")]
#[non_exhaustive]
pub enum BindValue {
    /// The current principal's user id.
    UserId,
    /// A named session property.
    UserProperty(String),
    /// The session's role list, bound as an array.
    SessionRoles,
    /// A role list declared in the schema, bound as an array.
    RoleList(Vec<String>),
    /// A literal from the condition source.
    Literal(ScalarValue),
}

/// A rendered predicate: SQL fragment plus the ordered binding list.
///
/// `bindings[i]` is the source of placeholder `$(i + 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlPredicate {
    pub text: String,
    pub bindings: Vec<BindValue>,
}

/// Renders a policy expression to a parameterized WHERE-clause fragment.
pub fn render(expr: &PolicyExpr) -> SqlPredicate {
    let mut text = String::new();
    let mut bindings = Vec::new();
    render_expr(expr, &mut text, &mut bindings);
    SqlPredicate { text, bindings }
}

fn render_expr(expr: &PolicyExpr, text: &mut String, bindings: &mut Vec<BindValue>) {
    match expr {
        PolicyExpr::Compare { left, op, right } => {
            render_operand(left, text, bindings);
            match op {
                CompareOp::Eq => text.push_str(" = "),
            }
            render_operand(right, text, bindings);
        }
        PolicyExpr::HasAnyRole { roles } => {
            push_placeholder(text, bindings, BindValue::SessionRoles);
            text.push_str(" && ");
            push_placeholder(text, bindings, BindValue::RoleList(roles.clone()));
        }
        PolicyExpr::Combine { op, left, right } => {
            text.push('(');
            render_expr(left, text, bindings);
            text.push_str(match op {
                BoolOp::And => " AND ",
                BoolOp::Or => " OR ",
            });
            render_expr(right, text, bindings);
            text.push(')');
        }
    }
}

fn render_operand(operand: &PolicyOperand, text: &mut String, bindings: &mut Vec<BindValue>) {
    match operand {
        PolicyOperand::Column(name) => {
            text.push('"');
            text.push_str(name.as_str());
            text.push('"');
        }
        PolicyOperand::Binding(ContextBinding::UserId) => {
            push_placeholder(text, bindings, BindValue::UserId);
        }
        PolicyOperand::Binding(ContextBinding::UserProperty(property)) => {
            push_placeholder(text, bindings, BindValue::UserProperty(property.clone()));
        }
        PolicyOperand::Literal(value) => {
            push_placeholder(text, bindings, BindValue::Literal(value.clone()));
        }
    }
}

fn push_placeholder(text: &mut String, bindings: &mut Vec<BindValue>, value: BindValue) {
    bindings.push(value);
    text.push('$');
    text.push_str(&bindings.len().to_string());
}
