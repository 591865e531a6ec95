use std::collections::BTreeMap;

use rowguard_core::{Action, FieldName, TableName, TableSchema};

use crate::error::FieldAccess;
use crate::expr::{PolicyExpr, RuleCheck};
use crate::sql::SqlPredicate;

/// The installed, storage-layer artifact for one (table, action) pair.
///
/// Created once at schema-compile time; never mutated; replaced wholesale
/// on schema reload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPolicy {
    pub table: TableName,
    pub action: Action,
    pub expr: PolicyExpr,
    pub sql: SqlPredicate,
}

/// Compiled per-column read/write checks for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFieldRule {
    pub field: FieldName,
    pub read: Option<RuleCheck>,
    pub write: Option<RuleCheck>,
}

impl CompiledFieldRule {
    /// Returns the check governing one side of this field, if any.
    pub fn check(&self, access: FieldAccess) -> Option<&RuleCheck> {
        match access {
            FieldAccess::Read => self.read.as_ref(),
            FieldAccess::Write => self.write.as_ref(),
        }
    }
}

/// A value per action, used for gate rules and row policies.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActionMap<T> {
    read: T,
    create: T,
    update: T,
    delete: T,
}

impl<T> ActionMap<T> {
    pub(crate) fn get(&self, action: Action) -> &T {
        match action {
            Action::Read => &self.read,
            Action::Create => &self.create,
            Action::Update => &self.update,
            Action::Delete => &self.delete,
        }
    }

    pub(crate) fn set(&mut self, action: Action, value: T) {
        match action {
            Action::Read => self.read = value,
            Action::Create => self.create = value,
            Action::Update => self.update = value,
            Action::Delete => self.delete = value,
        }
    }
}

/// Everything compiled for one table: the gate rules, the row policies,
/// and the field-level checks.
#[derive(Debug, Clone)]
pub struct TablePolicies {
    schema: TableSchema,
    gate: ActionMap<Option<RuleCheck>>,
    rows: ActionMap<Option<CompiledPolicy>>,
    fields: Vec<CompiledFieldRule>,
}

impl TablePolicies {
    pub(crate) fn new(
        schema: TableSchema,
        gate: ActionMap<Option<RuleCheck>>,
        rows: ActionMap<Option<CompiledPolicy>>,
        fields: Vec<CompiledFieldRule>,
    ) -> Self {
        Self {
            schema,
            gate,
            rows,
            fields,
        }
    }

    /// The table schema these policies were compiled from.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn name(&self) -> &TableName {
        &self.schema.name
    }

    /// The effective gate check for an action. `None` means the action is
    /// unrestricted at the gate.
    pub fn gate_rule(&self, action: Action) -> Option<&RuleCheck> {
        self.gate.get(action).as_ref()
    }

    /// The compiled row policy for an action. `None` means no predicate is
    /// installed and the action is unrestricted at the storage layer.
    pub fn row_policy(&self, action: Action) -> Option<&CompiledPolicy> {
        self.rows.get(action).as_ref()
    }

    /// The check governing one side of a field, if any.
    pub fn field_rule(&self, field: &str, access: FieldAccess) -> Option<&RuleCheck> {
        self.fields
            .iter()
            .find(|r| r.field.as_str() == field)
            .and_then(|r| r.check(access))
    }

    /// All compiled field rules, in declaration order.
    pub fn field_rules(&self) -> &[CompiledFieldRule] {
        &self.fields
    }

    /// The row predicate expression for an action, or `None` when the
    /// action is unfiltered at the storage layer.
    pub fn row_expr(&self, action: Action) -> Option<&PolicyExpr> {
        self.row_policy(action).map(|p| &p.expr)
    }
}

/// The full compiled policy set for an application schema.
///
/// Immutable after compilation; concurrent requests evaluate against a
/// shared snapshot without locking.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    tables: BTreeMap<String, TablePolicies>,
}

impl PolicySet {
    pub(crate) fn new(tables: BTreeMap<String, TablePolicies>) -> Self {
        Self { tables }
    }

    /// Looks up the compiled policies for a table by name.
    pub fn table(&self, name: &str) -> Option<&TablePolicies> {
        self.tables.get(name)
    }

    /// Number of tables in the set.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates over compiled tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TablePolicies> {
        self.tables.values()
    }
}
