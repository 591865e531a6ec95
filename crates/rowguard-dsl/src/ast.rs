use rowguard_core::{FieldName, ScalarValue};

/// A session-context value referenced from a condition.
///
/// This is a closed enum: placeholders never survive as strings past the
/// parser, and the evaluator resolves these through the typed session
/// interface rather than by substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextBinding {
    /// `{userId}` -- the current principal's id.
    UserId,
    /// `{user.<property>}` -- a named session property.
    UserProperty(String),
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A reference to a column of the governed table.
    Field(FieldName),
    /// A session-context lookup.
    Context(ContextBinding),
    /// A literal value.
    Literal(ScalarValue),
}

/// Comparison operators accepted by the grammar.
///
/// Only equality today; kept as an enum so every consumer matches
/// exhaustively and extension is a compile-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// A parsed condition: the tree form of a permission condition string.
///
/// `Combine` nodes are binary and the parser always produces a
/// left-leaning tree, so `a AND b OR c` is `(a AND b) OR c` -- the
/// left-to-right fold is preserved structurally.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Combine {
        op: BoolOp,
        left: Box<ConditionExpr>,
        right: Box<ConditionExpr>,
    },
}

impl ConditionExpr {
    /// Collects every field reference in the tree, in source order.
    ///
    /// The schema validator uses this to cross-check references against
    /// the table's declared columns.
    pub fn field_refs(&self) -> Vec<&FieldName> {
        let mut refs = Vec::new();
        self.collect_field_refs(&mut refs);
        refs
    }

    fn collect_field_refs<'a>(&'a self, out: &mut Vec<&'a FieldName>) {
        match self {
            Self::Compare { left, right, .. } => {
                for operand in [left, right] {
                    if let Operand::Field(name) = operand {
                        out.push(name);
                    }
                }
            }
            Self::Combine { left, right, .. } => {
                left.collect_field_refs(out);
                right.collect_field_refs(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Operand {
        Operand::Field(FieldName::new(name).unwrap())
    }

    #[test]
    fn field_refs_in_source_order() {
        let expr = ConditionExpr::Combine {
            op: BoolOp::And,
            left: Box::new(ConditionExpr::Compare {
                left: Operand::Context(ContextBinding::UserId),
                op: CompareOp::Eq,
                right: field("owner_id"),
            }),
            right: Box::new(ConditionExpr::Compare {
                left: field("status"),
                op: CompareOp::Eq,
                right: Operand::Literal(ScalarValue::Text("active".into())),
            }),
        };
        let refs: Vec<_> = expr.field_refs().iter().map(|f| f.as_str()).collect();
        assert_eq!(refs, vec!["owner_id", "status"]);
    }

    #[test]
    fn field_refs_empty_for_pure_literal_comparison() {
        let expr = ConditionExpr::Compare {
            left: Operand::Literal(ScalarValue::Boolean(true)),
            op: CompareOp::Eq,
            right: Operand::Literal(ScalarValue::Boolean(true)),
        };
        assert!(expr.field_refs().is_empty());
    }
}
