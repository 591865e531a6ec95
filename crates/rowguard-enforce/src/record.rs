use std::collections::BTreeMap;

use rowguard_core::{RecordId, ScalarValue};
use serde::{Deserialize, Serialize};

/// The column values of a pending write, keyed by field name.
pub type WritePayload = BTreeMap<String, ScalarValue>;

/// A row flowing through the enforcement layer.
///
/// Fields are stored as a `BTreeMap` for deterministic ordering, which
/// simplifies testing and serialization. Column masking removes entries
/// from the map outright -- a denied column is absent from the serialized
/// row, not null-masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, ScalarValue>,
}

impl Record {
    /// Creates a new record with a fresh id.
    pub fn new(fields: BTreeMap<String, ScalarValue>) -> Self {
        Self {
            id: RecordId::new(),
            fields,
        }
    }

    /// Creates a record with a specific id (used when loading from
    /// storage).
    pub fn with_id(id: RecordId, fields: BTreeMap<String, ScalarValue>) -> Self {
        Self { id, fields }
    }

    /// Returns the value of a field by name, if present.
    pub fn field(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.get(name)
    }

    /// Returns true if the record carries a value for this field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fields() -> BTreeMap<String, ScalarValue> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), ScalarValue::Text("Plan".into()));
        fields.insert("priority".to_string(), ScalarValue::Integer(2));
        fields
    }

    #[test]
    fn new_generates_id() {
        let record = Record::new(make_fields());
        assert!(record.id.as_str().starts_with("record_"));
        assert_eq!(record.fields.len(), 2);
    }

    #[test]
    fn with_id_preserves_id() {
        let id = RecordId::new();
        let record = Record::with_id(id.clone(), make_fields());
        assert_eq!(record.id, id);
    }

    #[test]
    fn field_access() {
        let record = Record::new(make_fields());
        assert_eq!(record.field("title"), Some(&ScalarValue::Text("Plan".into())));
        assert_eq!(record.field("missing"), None);
        assert!(record.has_field("priority"));
    }

    #[test]
    fn serde_roundtrip() {
        let record = Record::new(make_fields());
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn masked_field_is_absent_from_json() {
        let mut record = Record::new(make_fields());
        record.fields.remove("priority");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("priority"));
    }
}
