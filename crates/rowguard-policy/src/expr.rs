use rowguard_core::{FieldName, ScalarValue};
use rowguard_dsl::{BoolOp, CompareOp, ConditionExpr, ContextBinding, Operand};

/// One side of a compiled comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOperand {
    /// A column of the governed table.
    Column(FieldName),
    /// A session-context lookup, resolved per request through the typed
    /// session interface (never by string substitution).
    Binding(ContextBinding),
    /// A literal from the condition source.
    Literal(ScalarValue),
}

/// A compiled row predicate.
///
/// Structurally this is the condition AST after lowering, plus the
/// synthesized forms the compiler produces itself: owner rules become a
/// `Compare` against the user-id binding, and role rules become
/// `HasAnyRole`. The storage layer renders this to SQL; the in-process
/// evaluator walks it directly.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyExpr {
    Compare {
        left: PolicyOperand,
        op: CompareOp,
        right: PolicyOperand,
    },
    /// True when the session holds at least one of the listed roles.
    HasAnyRole { roles: Vec<String> },
    Combine {
        op: BoolOp,
        left: Box<PolicyExpr>,
        right: Box<PolicyExpr>,
    },
}

impl PolicyExpr {
    /// Lowers a parsed condition tree into a policy expression.
    pub fn from_condition(expr: &ConditionExpr) -> Self {
        match expr {
            ConditionExpr::Compare { left, op, right } => Self::Compare {
                left: lower_operand(left),
                op: *op,
                right: lower_operand(right),
            },
            ConditionExpr::Combine { op, left, right } => Self::Combine {
                op: *op,
                left: Box::new(Self::from_condition(left)),
                right: Box::new(Self::from_condition(right)),
            },
        }
    }

    /// Synthesizes the owner shorthand: `{userId} = <field>`.
    pub fn owner(field: FieldName) -> Self {
        Self::Compare {
            left: PolicyOperand::Binding(ContextBinding::UserId),
            op: CompareOp::Eq,
            right: PolicyOperand::Column(field),
        }
    }

    /// ANDs two expressions, preserving left-to-right order.
    pub fn and(left: Self, right: Self) -> Self {
        Self::Combine {
            op: BoolOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

fn lower_operand(operand: &Operand) -> PolicyOperand {
    match operand {
        Operand::Field(name) => PolicyOperand::Column(name.clone()),
        Operand::Context(binding) => PolicyOperand::Binding(binding.clone()),
        Operand::Literal(value) => PolicyOperand::Literal(value.clone()),
    }
}

/// The row-independent check form of a permission rule.
///
/// The capability gate consumes these directly; `Predicate` variants pass
/// the gate (given a session) and defer to the storage-level row filter.
/// Deliberately not `#[non_exhaustive]`: consumers match exhaustively, so
/// adding a variant is a compile-visible change at every check site.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCheck {
    /// Anyone, authenticated or not.
    Public,
    /// Any caller with a session.
    Authenticated,
    /// Callers holding at least one of the listed roles.
    AnyRole(Vec<String>),
    /// Row-dependent: evaluated per record by the row/field filter.
    Predicate(PolicyExpr),
}
