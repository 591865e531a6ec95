use rowguard_core::Action;
use rowguard_policy::{FieldAccess, TablePolicies};
use tracing::debug;

use crate::error::EnforceError;
use crate::eval::{check_rule, eval_expr};
use crate::record::{Record, WritePayload};
use crate::session::Session;

/// The result of applying row predicates to the targets of an
/// update/delete.
///
/// Rows excluded by the predicate are not an error: they surface as a
/// smaller affected set ("zero rows affected" in the limit), mirroring
/// RLS semantics and avoiding row-existence leaks.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// The rows the caller may apply the write to.
    pub affected: Vec<Record>,
    /// How many candidate rows the predicate silently excluded.
    pub filtered: usize,
}

impl WriteOutcome {
    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }
}

/// Read-path enforcement: the compiled row predicate restricts which rows
/// are returned, then field-level read rules remove denied columns from
/// each survivor.
///
/// Filtering, not erroring: a row failing the predicate is simply absent
/// from the result. A masked column is absent from the record's field
/// map, not null-masked -- clients checking "has property" see no key.
pub fn filter_rows(
    policies: &TablePolicies,
    session: Option<&dyn Session>,
    rows: Vec<Record>,
) -> Vec<Record> {
    let total = rows.len();
    let mut visible: Vec<Record> = match policies.row_expr(Action::Read) {
        Some(expr) => rows
            .into_iter()
            .filter(|row| eval_expr(expr, session, row))
            .collect(),
        None => rows,
    };

    if visible.len() < total {
        debug!(
            table = %policies.name(),
            filtered = total - visible.len(),
            "rows excluded by read predicate"
        );
    }

    for record in &mut visible {
        mask_fields(policies, session, record);
    }
    visible
}

/// Removes the columns whose field-level read rule fails for this caller
/// and record.
pub fn mask_fields(policies: &TablePolicies, session: Option<&dyn Session>, record: &mut Record) {
    for rule in policies.field_rules() {
        if let Some(check) = rule.check(FieldAccess::Read) {
            if record.has_field(rule.field.as_str()) && !check_rule(check, session, record) {
                record.fields.remove(rule.field.as_str());
            }
        }
    }
}

/// Write-path field enforcement: rejects the whole operation if the
/// payload sets any column the caller's write rule forbids.
///
/// For updates, `target` is the existing row the rule is evaluated
/// against; for creates it is `None` and row-dependent rules see the
/// incoming payload as the row.
pub fn check_write(
    policies: &TablePolicies,
    session: Option<&dyn Session>,
    payload: &WritePayload,
    target: Option<&Record>,
) -> Result<(), EnforceError> {
    let staged;
    let row = match target {
        Some(record) => record,
        None => {
            staged = Record::new(payload.clone());
            &staged
        }
    };

    for field in payload.keys() {
        if let Some(check) = policies.field_rule(field, FieldAccess::Write) {
            if !check_rule(check, session, row) {
                return Err(EnforceError::FieldWriteForbidden {
                    table: policies.name().to_string(),
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Batch form of [`check_write`]: the first forbidden column rejects the
/// entire batch. No payload in a partially-forbidden batch is applied.
pub fn check_write_batch(
    policies: &TablePolicies,
    session: Option<&dyn Session>,
    payloads: &[WritePayload],
) -> Result<(), EnforceError> {
    for payload in payloads {
        check_write(policies, session, payload, None)?;
    }
    Ok(())
}

/// Applies the row predicate for an update/delete to its candidate rows.
///
/// Failing rows are silently excluded from the affected set.
pub fn write_targets(
    policies: &TablePolicies,
    session: Option<&dyn Session>,
    action: Action,
    rows: Vec<Record>,
) -> WriteOutcome {
    let total = rows.len();
    let affected: Vec<Record> = match policies.row_expr(action) {
        Some(expr) => rows
            .into_iter()
            .filter(|row| eval_expr(expr, session, row))
            .collect(),
        None => rows,
    };
    let filtered = total - affected.len();
    if filtered > 0 {
        debug!(
            table = %policies.name(),
            %action,
            filtered,
            "rows excluded by write predicate"
        );
    }
    WriteOutcome { affected, filtered }
}
