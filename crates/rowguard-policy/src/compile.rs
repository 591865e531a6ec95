use std::collections::BTreeMap;

use rowguard_core::{
    Action, ApplicationSchema, FieldPermission, PermissionRule, TableSchema,
};
use rowguard_dsl::ConditionExpr;
use tracing::{debug, info};

use crate::error::{FieldAccess, LoadError};
use crate::expr::{PolicyExpr, RuleCheck};
use crate::set::{ActionMap, CompiledFieldRule, CompiledPolicy, PolicySet, TablePolicies};
use crate::sql;

/// Compiles a whole application schema into an immutable [`PolicySet`].
///
/// This is the single entry point of the schema-load pass: parse every
/// condition, cross-check every field reference, then lower rules into
/// gate checks and row predicates. Fail-fast: the first violation anywhere
/// aborts the whole load and nothing is installed.
pub fn compile_application(app: &ApplicationSchema) -> Result<PolicySet, LoadError> {
    app.validate()?;

    let mut tables = BTreeMap::new();
    for table in &app.tables {
        let policies = compile_table(app, table)?;
        debug!(table = %table.name, "table policies compiled");
        tables.insert(table.name.to_string(), policies);
    }

    info!(tables = tables.len(), "policy set compiled");
    Ok(PolicySet::new(tables))
}

fn compile_table(
    app: &ApplicationSchema,
    table: &TableSchema,
) -> Result<TablePolicies, LoadError> {
    let fields = compile_field_rules(table)?;

    let mut gate = ActionMap::default();
    let mut rows = ActionMap::default();

    for action in Action::ALL {
        let effective = app.effective_rule(table, action);

        let gate_check = effective
            .map(|rule| lower_rule(table, rule))
            .transpose()?;

        // Row predicate: the table-level rule's storage contribution first,
        // then record rules in declaration order, all AND-composed.
        let mut parts: Vec<PolicyExpr> = Vec::new();
        if let Some(rule) = effective {
            if let Some(expr) = rule_row_expr(table, rule)? {
                parts.push(expr);
            }
        }
        for record_rule in table.permissions.records_for(action) {
            let parsed = parse_condition(table, &record_rule.condition)?;
            parts.push(PolicyExpr::from_condition(&parsed));
        }

        if let Some(expr) = parts.into_iter().reduce(PolicyExpr::and) {
            let sql = sql::render(&expr);
            rows.set(
                action,
                Some(CompiledPolicy {
                    table: table.name.clone(),
                    action,
                    expr,
                    sql,
                }),
            );
        }

        gate.set(action, gate_check);
    }

    Ok(TablePolicies::new(table.clone(), gate, rows, fields))
}

/// Lowers field permission entries, rejecting dangling targets and
/// duplicate (field, access) governance.
fn compile_field_rules(table: &TableSchema) -> Result<Vec<CompiledFieldRule>, LoadError> {
    let mut compiled: Vec<CompiledFieldRule> = Vec::new();

    for entry in &table.permissions.fields {
        if !table.has_field(entry.field.as_str()) {
            return Err(LoadError::UnknownFieldTarget {
                table: table.name.to_string(),
                field: entry.field.to_string(),
            });
        }

        let read = lower_field_side(table, entry, FieldAccess::Read)?;
        let write = lower_field_side(table, entry, FieldAccess::Write)?;

        match compiled.iter().position(|r| r.field == entry.field) {
            None => compiled.push(CompiledFieldRule {
                field: entry.field.clone(),
                read,
                write,
            }),
            Some(pos) => {
                let existing = &mut compiled[pos];
                for (access, incoming, slot) in [
                    (FieldAccess::Read, read, &mut existing.read),
                    (FieldAccess::Write, write, &mut existing.write),
                ] {
                    if let Some(check) = incoming {
                        if slot.is_some() {
                            return Err(LoadError::ConflictingRule {
                                table: table.name.to_string(),
                                field: entry.field.to_string(),
                                access,
                            });
                        }
                        *slot = Some(check);
                    }
                }
            }
        }
    }

    Ok(compiled)
}

fn lower_field_side(
    table: &TableSchema,
    entry: &FieldPermission,
    access: FieldAccess,
) -> Result<Option<RuleCheck>, LoadError> {
    let rule = match access {
        FieldAccess::Read => entry.read.as_ref(),
        FieldAccess::Write => entry.write.as_ref(),
    };
    rule.map(|r| lower_rule(table, r)).transpose()
}

/// Lowers a permission rule into its row-independent check form.
fn lower_rule(table: &TableSchema, rule: &PermissionRule) -> Result<RuleCheck, LoadError> {
    match rule {
        PermissionRule::Public => Ok(RuleCheck::Public),
        PermissionRule::Authenticated => Ok(RuleCheck::Authenticated),
        PermissionRule::Roles { roles } => Ok(RuleCheck::AnyRole(roles.clone())),
        PermissionRule::Owner { field } => {
            if !table.has_field(field.as_str()) {
                return Err(LoadError::UnknownOwnerField {
                    table: table.name.to_string(),
                    field: field.to_string(),
                });
            }
            Ok(RuleCheck::Predicate(PolicyExpr::owner(field.clone())))
        }
        PermissionRule::Custom { condition } => {
            let parsed = parse_condition(table, condition)?;
            Ok(RuleCheck::Predicate(PolicyExpr::from_condition(&parsed)))
        }
    }
}

/// The storage-level contribution of a table-level rule.
///
/// `Public` filters nothing and `Authenticated` is a gate-level check, so
/// neither installs a predicate. `Roles` synthesizes a role-membership
/// predicate; `Owner` the single-field equality; `Custom` the parsed tree.
fn rule_row_expr(
    table: &TableSchema,
    rule: &PermissionRule,
) -> Result<Option<PolicyExpr>, LoadError> {
    match rule {
        PermissionRule::Public | PermissionRule::Authenticated => Ok(None),
        PermissionRule::Roles { roles } => Ok(Some(PolicyExpr::HasAnyRole {
            roles: roles.clone(),
        })),
        PermissionRule::Owner { field } => {
            if !table.has_field(field.as_str()) {
                return Err(LoadError::UnknownOwnerField {
                    table: table.name.to_string(),
                    field: field.to_string(),
                });
            }
            Ok(Some(PolicyExpr::owner(field.clone())))
        }
        PermissionRule::Custom { condition } => {
            let parsed = parse_condition(table, condition)?;
            Ok(Some(PolicyExpr::from_condition(&parsed)))
        }
    }
}

/// Parses a condition and cross-checks its field references against the
/// table's declared columns.
fn parse_condition(table: &TableSchema, condition: &str) -> Result<ConditionExpr, LoadError> {
    let expr = rowguard_dsl::parse(condition).map_err(|e| LoadError::Condition {
        table: table.name.to_string(),
        condition: condition.to_string(),
        source: e,
    })?;

    for field in expr.field_refs() {
        if !table.has_field(field.as_str()) {
            return Err(LoadError::UnknownFieldInCondition {
                table: table.name.to_string(),
                field: field.to_string(),
                condition: condition.to_string(),
            });
        }
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowguard_core::{
        Field, FieldName, FieldType, RecordRule, TableName, TablePermissions, WorkspaceDefaults,
    };
    use rowguard_dsl::ConditionError;

    fn field(name: &str) -> Field {
        Field::new(FieldName::new(name).unwrap(), FieldType::Text)
    }

    fn documents_table(permissions: TablePermissions) -> TableSchema {
        TableSchema::new(
            TableName::new("documents").unwrap(),
            vec![field("title"), field("owner_id"), field("status")],
            permissions,
        )
        .unwrap()
    }

    fn app_with(table: TableSchema) -> ApplicationSchema {
        ApplicationSchema::new(vec![table], WorkspaceDefaults::default()).unwrap()
    }

    #[test]
    fn zero_rules_installs_nothing() {
        let set = compile_application(&app_with(documents_table(TablePermissions::default())))
            .unwrap();
        let table = set.table("documents").unwrap();
        for action in Action::ALL {
            assert!(table.gate_rule(action).is_none());
            assert!(table.row_policy(action).is_none());
        }
    }

    #[test]
    fn record_rule_compiles_to_row_policy() {
        let table = documents_table(TablePermissions {
            records: vec![RecordRule {
                action: Action::Read,
                condition: "{userId} = owner_id".into(),
            }],
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let policy = set
            .table("documents")
            .unwrap()
            .row_policy(Action::Read)
            .unwrap();
        assert_eq!(policy.sql.text, r#"$1 = "owner_id""#);
        assert!(set
            .table("documents")
            .unwrap()
            .row_policy(Action::Update)
            .is_none());
    }

    #[test]
    fn same_action_rules_compose_with_and() {
        let table = documents_table(TablePermissions {
            records: vec![
                RecordRule {
                    action: Action::Read,
                    condition: "{userId} = owner_id".into(),
                },
                RecordRule {
                    action: Action::Read,
                    condition: "status = 'active'".into(),
                },
            ],
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let policy = set
            .table("documents")
            .unwrap()
            .row_policy(Action::Read)
            .unwrap();
        assert_eq!(
            policy.sql.text,
            r#"($1 = "owner_id" AND "status" = $2)"#
        );
    }

    #[test]
    fn owner_rule_synthesizes_equality() {
        let table = documents_table(TablePermissions {
            update: Some(PermissionRule::Owner {
                field: FieldName::new("owner_id").unwrap(),
            }),
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let table = set.table("documents").unwrap();
        assert!(matches!(
            table.gate_rule(Action::Update),
            Some(RuleCheck::Predicate(_))
        ));
        let policy = table.row_policy(Action::Update).unwrap();
        assert_eq!(policy.sql.text, r#"$1 = "owner_id""#);
    }

    #[test]
    fn roles_rule_synthesizes_membership_predicate() {
        let table = documents_table(TablePermissions {
            delete: Some(PermissionRule::Roles {
                roles: vec!["admin".into()],
            }),
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let table = set.table("documents").unwrap();
        assert!(matches!(
            table.gate_rule(Action::Delete),
            Some(RuleCheck::AnyRole(_))
        ));
        let policy = table.row_policy(Action::Delete).unwrap();
        assert_eq!(policy.sql.text, "$1 && $2");
    }

    #[test]
    fn public_and_authenticated_install_no_predicate() {
        let table = documents_table(TablePermissions {
            read: Some(PermissionRule::Public),
            create: Some(PermissionRule::Authenticated),
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let table = set.table("documents").unwrap();
        assert!(matches!(table.gate_rule(Action::Read), Some(RuleCheck::Public)));
        assert!(table.row_policy(Action::Read).is_none());
        assert!(matches!(
            table.gate_rule(Action::Create),
            Some(RuleCheck::Authenticated)
        ));
        assert!(table.row_policy(Action::Create).is_none());
    }

    #[test]
    fn table_rule_and_record_rules_combine() {
        let table = documents_table(TablePermissions {
            read: Some(PermissionRule::Owner {
                field: FieldName::new("owner_id").unwrap(),
            }),
            records: vec![RecordRule {
                action: Action::Read,
                condition: "status = 'active'".into(),
            }],
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let policy = set
            .table("documents")
            .unwrap()
            .row_policy(Action::Read)
            .unwrap();
        assert_eq!(
            policy.sql.text,
            r#"($1 = "owner_id" AND "status" = $2)"#
        );
    }

    #[test]
    fn workspace_default_inherited_when_table_silent() {
        let app = ApplicationSchema::new(
            vec![documents_table(TablePermissions::default())],
            WorkspaceDefaults {
                read: Some(PermissionRule::Authenticated),
                ..Default::default()
            },
        )
        .unwrap();
        let set = compile_application(&app).unwrap();
        assert!(matches!(
            set.table("documents").unwrap().gate_rule(Action::Read),
            Some(RuleCheck::Authenticated)
        ));
    }

    #[test]
    fn double_equals_fails_load() {
        let table = documents_table(TablePermissions {
            records: vec![RecordRule {
                action: Action::Read,
                condition: "{userId} == owner_id".into(),
            }],
            ..Default::default()
        });
        let result = compile_application(&app_with(table));
        match result {
            Err(LoadError::Condition { source, .. }) => {
                assert!(matches!(
                    source,
                    ConditionError::UnsupportedOperator { .. }
                ));
            }
            other => panic!("expected Condition error, got: {other:?}"),
        }
    }

    #[test]
    fn undefined_field_in_condition_fails_load() {
        let table = documents_table(TablePermissions {
            records: vec![RecordRule {
                action: Action::Read,
                condition: "{userId} = created_by".into(),
            }],
            ..Default::default()
        });
        let result = compile_application(&app_with(table));
        match result {
            Err(LoadError::UnknownFieldInCondition { field, .. }) => {
                assert_eq!(field, "created_by");
            }
            other => panic!("expected UnknownFieldInCondition, got: {other:?}"),
        }
    }

    #[test]
    fn undefined_field_permission_target_fails_load() {
        let table = documents_table(TablePermissions {
            fields: vec![FieldPermission {
                field: FieldName::new("salary").unwrap(),
                read: Some(PermissionRule::Roles {
                    roles: vec!["admin".into()],
                }),
                write: None,
            }],
            ..Default::default()
        });
        let result = compile_application(&app_with(table));
        match result {
            Err(LoadError::UnknownFieldTarget { field, .. }) => assert_eq!(field, "salary"),
            other => panic!("expected UnknownFieldTarget, got: {other:?}"),
        }
    }

    #[test]
    fn undefined_owner_field_fails_load() {
        let table = documents_table(TablePermissions {
            read: Some(PermissionRule::Owner {
                field: FieldName::new("created_by").unwrap(),
            }),
            ..Default::default()
        });
        let result = compile_application(&app_with(table));
        assert!(matches!(
            result,
            Err(LoadError::UnknownOwnerField { .. })
        ));
    }

    #[test]
    fn duplicate_field_access_rules_conflict() {
        let table = documents_table(TablePermissions {
            fields: vec![
                FieldPermission {
                    field: FieldName::new("status").unwrap(),
                    read: Some(PermissionRule::Roles {
                        roles: vec!["admin".into()],
                    }),
                    write: None,
                },
                FieldPermission {
                    field: FieldName::new("status").unwrap(),
                    read: Some(PermissionRule::Authenticated),
                    write: None,
                },
            ],
            ..Default::default()
        });
        let result = compile_application(&app_with(table));
        match result {
            Err(LoadError::ConflictingRule { field, access, .. }) => {
                assert_eq!(field, "status");
                assert_eq!(access, FieldAccess::Read);
            }
            other => panic!("expected ConflictingRule, got: {other:?}"),
        }
    }

    #[test]
    fn separate_read_and_write_entries_merge() {
        let table = documents_table(TablePermissions {
            fields: vec![
                FieldPermission {
                    field: FieldName::new("status").unwrap(),
                    read: Some(PermissionRule::Authenticated),
                    write: None,
                },
                FieldPermission {
                    field: FieldName::new("status").unwrap(),
                    read: None,
                    write: Some(PermissionRule::Roles {
                        roles: vec!["editor".into()],
                    }),
                },
            ],
            ..Default::default()
        });
        let set = compile_application(&app_with(table)).unwrap();
        let table = set.table("documents").unwrap();
        assert!(table.field_rule("status", FieldAccess::Read).is_some());
        assert!(table.field_rule("status", FieldAccess::Write).is_some());
    }

    #[test]
    fn one_bad_table_aborts_whole_load() {
        let good = documents_table(TablePermissions::default());
        let bad = TableSchema::new(
            TableName::new("tasks").unwrap(),
            vec![field("title")],
            TablePermissions {
                records: vec![RecordRule {
                    action: Action::Read,
                    condition: "{userId} = nonexistent".into(),
                }],
                ..Default::default()
            },
        )
        .unwrap();
        let app =
            ApplicationSchema::new(vec![good, bad], WorkspaceDefaults::default()).unwrap();
        assert!(compile_application(&app).is_err());
    }

    #[test]
    fn recompilation_is_byte_identical() {
        let table = documents_table(TablePermissions {
            read: Some(PermissionRule::Owner {
                field: FieldName::new("owner_id").unwrap(),
            }),
            records: vec![
                RecordRule {
                    action: Action::Read,
                    condition: "status = 'active'".into(),
                },
                RecordRule {
                    action: Action::Update,
                    condition: "{user.org} = owner_id OR status = 'draft'".into(),
                },
            ],
            ..Default::default()
        });
        let app = app_with(table);

        let first = compile_application(&app).unwrap();
        let second = compile_application(&app).unwrap();

        for action in Action::ALL {
            let a = first.table("documents").unwrap().row_policy(action);
            let b = second.table("documents").unwrap().row_policy(action);
            match (a, b) {
                (Some(a), Some(b)) => {
                    assert_eq!(a.sql.text, b.sql.text);
                    assert_eq!(a.sql.bindings, b.sql.bindings);
                }
                (None, None) => {}
                other => panic!("asymmetric compilation: {other:?}"),
            }
        }
    }
}
