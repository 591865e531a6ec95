//! In-process evaluation of compiled policy expressions.
//!
//! This is the same predicate the storage layer receives as SQL, walked
//! directly over a record and a session. It exists so the enforcement
//! pipeline (and its tests) work without a database connection, and so
//! embedders with non-SQL stores can enforce policies in process.

use rowguard_core::ScalarValue;
use rowguard_dsl::{BoolOp, CompareOp, ContextBinding};
use rowguard_policy::{PolicyExpr, PolicyOperand, RuleCheck};

use crate::record::Record;
use crate::session::{has_any_role, Session};

/// Evaluates a compiled row predicate against one record.
///
/// Comparison is exact equality with no coercion. A missing column, a
/// missing session property, an absent session for a context binding, or
/// a `Null` on either side all make the comparison false -- never an
/// error. Request-time evaluation cannot fail; everything that can fail
/// failed at schema load.
pub fn eval_expr(
    expr: &PolicyExpr,
    session: Option<&dyn Session>,
    record: &Record,
) -> bool {
    match expr {
        PolicyExpr::Compare { left, op, right } => {
            let (Some(lhs), Some(rhs)) = (
                resolve(left, session, record),
                resolve(right, session, record),
            ) else {
                return false;
            };
            if matches!(lhs, ScalarValue::Null) || matches!(rhs, ScalarValue::Null) {
                return false;
            }
            match op {
                CompareOp::Eq => lhs == rhs,
            }
        }
        PolicyExpr::HasAnyRole { roles } => {
            session.map(|s| has_any_role(s, roles)).unwrap_or(false)
        }
        PolicyExpr::Combine { op, left, right } => match op {
            BoolOp::And => {
                eval_expr(left, session, record) && eval_expr(right, session, record)
            }
            BoolOp::Or => {
                eval_expr(left, session, record) || eval_expr(right, session, record)
            }
        },
    }
}

fn resolve(
    operand: &PolicyOperand,
    session: Option<&dyn Session>,
    record: &Record,
) -> Option<ScalarValue> {
    match operand {
        PolicyOperand::Column(name) => record.field(name.as_str()).cloned(),
        PolicyOperand::Binding(ContextBinding::UserId) => {
            session.map(|s| ScalarValue::Text(s.user_id().to_string()))
        }
        PolicyOperand::Binding(ContextBinding::UserProperty(property)) => {
            session.and_then(|s| s.property(property).cloned())
        }
        PolicyOperand::Literal(value) => Some(value.clone()),
    }
}

/// Evaluates a rule check against one record.
///
/// `Public` always passes; `Authenticated` requires a session; `AnyRole`
/// requires role membership; `Predicate` walks the compiled expression.
pub fn check_rule(check: &RuleCheck, session: Option<&dyn Session>, record: &Record) -> bool {
    match check {
        RuleCheck::Public => true,
        RuleCheck::Authenticated => session.is_some(),
        RuleCheck::AnyRole(roles) => session.map(|s| has_any_role(s, roles)).unwrap_or(false),
        RuleCheck::Predicate(expr) => eval_expr(expr, session, record),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rowguard_dsl::parse;

    use crate::session::StaticSession;

    use super::*;

    fn lower(src: &str) -> PolicyExpr {
        PolicyExpr::from_condition(&parse(src).unwrap())
    }

    fn record(fields: &[(&str, ScalarValue)]) -> Record {
        let map: BTreeMap<String, ScalarValue> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Record::new(map)
    }

    #[test]
    fn owner_predicate_matches_owner() {
        let expr = lower("{userId} = owner_id");
        let row = record(&[("owner_id", ScalarValue::Text("user_a".into()))]);

        let owner = StaticSession::new("user_a");
        let stranger = StaticSession::new("user_b");

        assert!(eval_expr(&expr, Some(&owner), &row));
        assert!(!eval_expr(&expr, Some(&stranger), &row));
        assert!(!eval_expr(&expr, None, &row));
    }

    #[test]
    fn user_property_predicate() {
        let expr = lower("{user.department} = department");
        let row = record(&[("department", ScalarValue::Text("Engineering".into()))]);

        let engineer = StaticSession::new("u")
            .with_property("department", ScalarValue::Text("Engineering".into()));
        let sales = StaticSession::new("u")
            .with_property("department", ScalarValue::Text("Sales".into()));
        let no_property = StaticSession::new("u");

        assert!(eval_expr(&expr, Some(&engineer), &row));
        assert!(!eval_expr(&expr, Some(&sales), &row));
        assert!(!eval_expr(&expr, Some(&no_property), &row));
    }

    #[test]
    fn and_requires_both_sides() {
        let expr = lower("{user.department} = department AND status = 'active'");
        let session = StaticSession::new("u")
            .with_property("department", ScalarValue::Text("Engineering".into()));

        let active = record(&[
            ("department", ScalarValue::Text("Engineering".into())),
            ("status", ScalarValue::Text("active".into())),
        ]);
        let archived = record(&[
            ("department", ScalarValue::Text("Engineering".into())),
            ("status", ScalarValue::Text("archived".into())),
        ]);

        assert!(eval_expr(&expr, Some(&session), &active));
        assert!(!eval_expr(&expr, Some(&session), &archived));
    }

    #[test]
    fn or_accepts_either_side() {
        let expr = lower("status = 'draft' OR status = 'active'");
        let session = StaticSession::new("u");

        assert!(eval_expr(
            &expr,
            Some(&session),
            &record(&[("status", ScalarValue::Text("draft".into()))])
        ));
        assert!(!eval_expr(
            &expr,
            Some(&session),
            &record(&[("status", ScalarValue::Text("archived".into()))])
        ));
    }

    #[test]
    fn missing_column_is_false_not_error() {
        let expr = lower("status = 'active'");
        assert!(!eval_expr(&expr, None, &record(&[])));
    }

    #[test]
    fn null_never_matches() {
        let expr = lower("status = 'active'");
        assert!(!eval_expr(
            &expr,
            None,
            &record(&[("status", ScalarValue::Null)])
        ));
    }

    #[test]
    fn no_type_coercion() {
        // Text '1' against an integer column: exact equality only.
        let expr = lower("priority = '1'");
        assert!(!eval_expr(
            &expr,
            None,
            &record(&[("priority", ScalarValue::Integer(1))])
        ));
    }

    #[test]
    fn role_membership_expression() {
        let expr = PolicyExpr::HasAnyRole {
            roles: vec!["admin".into(), "hr".into()],
        };
        let hr = StaticSession::new("u").with_role("hr");
        let member = StaticSession::new("u").with_role("member");

        let row = record(&[]);
        assert!(eval_expr(&expr, Some(&hr), &row));
        assert!(!eval_expr(&expr, Some(&member), &row));
        assert!(!eval_expr(&expr, None, &row));
    }

    #[test]
    fn check_rule_variants() {
        let row = record(&[("owner_id", ScalarValue::Text("user_a".into()))]);
        let session = StaticSession::new("user_a").with_role("member");

        assert!(check_rule(&RuleCheck::Public, None, &row));
        assert!(!check_rule(&RuleCheck::Authenticated, None, &row));
        assert!(check_rule(&RuleCheck::Authenticated, Some(&session), &row));
        assert!(check_rule(
            &RuleCheck::AnyRole(vec!["member".into()]),
            Some(&session),
            &row
        ));
        assert!(!check_rule(
            &RuleCheck::AnyRole(vec!["admin".into()]),
            Some(&session),
            &row
        ));
        assert!(check_rule(
            &RuleCheck::Predicate(lower("{userId} = owner_id")),
            Some(&session),
            &row
        ));
    }
}
