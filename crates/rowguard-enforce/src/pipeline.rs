use std::collections::BTreeMap;
use std::sync::Arc;

use rowguard_core::{Action, TableName};
use rowguard_policy::{PolicySet, PolicyStore, TablePolicies};
use tracing::debug;

use crate::error::{DenyCause, DenyMasking, EnforceError};
use crate::eval::eval_expr;
use crate::filter::{check_write, check_write_batch, filter_rows, write_targets, WriteOutcome};
use crate::gate::{authorize, Decision};
use crate::record::{Record, WritePayload};
use crate::session::Session;

/// The two-stage authorization pipeline: capability gate first, row/field
/// filter second, with the gate's typed [`Decision`] handed between the
/// stages.
///
/// Each operation takes the candidate rows through a `fetch` closure
/// supplied by the embedding storage layer; on a gate deny the closure is
/// never invoked, so a denied request issues no storage access at all.
///
/// Every call takes one policy snapshot up front and evaluates against it
/// throughout, so a concurrent schema reload never mixes old and new
/// policies within a request.
pub struct Pipeline {
    store: Arc<PolicyStore>,
    masking: BTreeMap<String, DenyMasking>,
}

impl Pipeline {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self {
            store,
            masking: BTreeMap::new(),
        }
    }

    /// Configures how denials on one table are surfaced (access-denied
    /// vs the not-found shape). Default is [`DenyMasking::Forbidden`].
    pub fn with_masking(mut self, table: TableName, masking: DenyMasking) -> Self {
        self.masking.insert(table.to_string(), masking);
        self
    }

    fn masking_for(&self, table: &str) -> DenyMasking {
        self.masking.get(table).copied().unwrap_or_default()
    }

    /// Stage one, shared by every operation.
    fn gate<'a>(
        &self,
        snapshot: &'a PolicySet,
        table: &str,
        action: Action,
        session: Option<&dyn Session>,
    ) -> Result<&'a TablePolicies, EnforceError> {
        let policies = snapshot
            .table(table)
            .ok_or_else(|| EnforceError::UnknownTable {
                table: table.to_string(),
            })?;

        match authorize(policies, action, session) {
            Decision::Allow => Ok(policies),
            Decision::Deny(cause) => {
                debug!(table, %action, %cause, "request denied at gate");
                Err(self.denied(table, action, cause))
            }
        }
    }

    fn denied(&self, table: &str, action: Action, cause: DenyCause) -> EnforceError {
        EnforceError::AuthorizationDenied {
            table: table.to_string(),
            action,
            cause,
            masking: self.masking_for(table),
        }
    }

    /// Read: gate, fetch, row filter, field masks.
    pub fn read(
        &self,
        table: &str,
        session: Option<&dyn Session>,
        fetch: impl FnOnce() -> Vec<Record>,
    ) -> Result<Vec<Record>, EnforceError> {
        let snapshot = self.store.snapshot();
        let policies = self.gate(&snapshot, table, Action::Read, session)?;
        Ok(filter_rows(policies, session, fetch()))
    }

    /// Create: gate, payload validation, field write rules, defaults, and
    /// create-time row conditions. Returns the staged records for the
    /// caller to persist; any violation rejects the whole batch.
    pub fn create(
        &self,
        table: &str,
        session: Option<&dyn Session>,
        payloads: Vec<WritePayload>,
    ) -> Result<Vec<Record>, EnforceError> {
        let snapshot = self.store.snapshot();
        let policies = self.gate(&snapshot, table, Action::Create, session)?;

        for payload in &payloads {
            check_columns(policies, payload)?;
        }
        check_write_batch(policies, session, &payloads)?;

        let staged: Vec<Record> = payloads
            .into_iter()
            .map(|payload| stage_record(policies, payload))
            .collect::<Result<_, _>>()?;

        if let Some(expr) = policies.row_expr(Action::Create) {
            for record in &staged {
                if !eval_expr(expr, session, record) {
                    return Err(self.denied(table, Action::Create, DenyCause::RowCondition));
                }
            }
        }

        Ok(staged)
    }

    /// Update: gate, payload validation, row predicate over the candidate
    /// rows (silent exclusion), then field write rules against each
    /// surviving row (hard rejection).
    pub fn update(
        &self,
        table: &str,
        session: Option<&dyn Session>,
        payload: &WritePayload,
        fetch: impl FnOnce() -> Vec<Record>,
    ) -> Result<WriteOutcome, EnforceError> {
        let snapshot = self.store.snapshot();
        let policies = self.gate(&snapshot, table, Action::Update, session)?;
        check_columns(policies, payload)?;

        let outcome = write_targets(policies, session, Action::Update, fetch());
        for row in &outcome.affected {
            check_write(policies, session, payload, Some(row))?;
        }
        Ok(outcome)
    }

    /// Delete: gate, then the row predicate over the candidate rows.
    pub fn delete(
        &self,
        table: &str,
        session: Option<&dyn Session>,
        fetch: impl FnOnce() -> Vec<Record>,
    ) -> Result<WriteOutcome, EnforceError> {
        let snapshot = self.store.snapshot();
        let policies = self.gate(&snapshot, table, Action::Delete, session)?;
        Ok(write_targets(policies, session, Action::Delete, fetch()))
    }
}

/// Rejects payload keys the table does not declare.
fn check_columns(policies: &TablePolicies, payload: &WritePayload) -> Result<(), EnforceError> {
    for key in payload.keys() {
        if !policies.schema().has_field(key) {
            return Err(EnforceError::UnknownColumn {
                table: policies.name().to_string(),
                field: key.clone(),
            });
        }
    }
    Ok(())
}

/// Fills declared defaults into an incoming payload and checks required
/// fields, producing the record to persist.
fn stage_record(policies: &TablePolicies, payload: WritePayload) -> Result<Record, EnforceError> {
    let mut fields = payload;
    for field in &policies.schema().fields {
        if fields.contains_key(field.name.as_str()) {
            continue;
        }
        match &field.default {
            Some(default) => {
                fields.insert(field.name.to_string(), default.clone());
            }
            None if field.required => {
                return Err(EnforceError::MissingRequiredField {
                    table: policies.name().to_string(),
                    field: field.name.to_string(),
                });
            }
            None => {}
        }
    }
    Ok(Record::new(fields))
}
