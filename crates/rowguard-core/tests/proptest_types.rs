use proptest::prelude::*;
use rowguard_core::{FieldName, ScalarValue, TableName};

proptest! {
    /// Any string matching the snake_case shape constructs a valid name,
    /// and the name round-trips through serde unchanged.
    #[test]
    fn snake_case_names_construct_and_roundtrip(s in "[a-z][a-z0-9_]{0,30}") {
        let field = FieldName::new(&s).unwrap();
        prop_assert_eq!(field.as_str(), s.as_str());
        let json = serde_json::to_string(&field).unwrap();
        let back: FieldName = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(field, back);

        let table = TableName::new(&s).unwrap();
        prop_assert_eq!(table.as_str(), s.as_str());
    }

    /// Strings starting with anything but a lowercase letter are rejected.
    #[test]
    fn bad_leading_character_rejected(s in "[^a-z][a-zA-Z0-9_]{0,10}") {
        prop_assert!(FieldName::new(&s).is_err());
        prop_assert!(TableName::new(&s).is_err());
    }

    /// Scalar values round-trip through serde for every variant the
    /// condition grammar can produce.
    #[test]
    fn scalar_serde_roundtrip(
        text in "\\PC{0,40}",
        int in any::<i64>(),
        flag in any::<bool>(),
    ) {
        for value in [
            ScalarValue::Text(text.clone()),
            ScalarValue::Integer(int),
            ScalarValue::Boolean(flag),
            ScalarValue::Null,
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: ScalarValue = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(value, back);
        }
    }

    /// Cross-variant equality never holds.
    #[test]
    fn no_cross_variant_equality(int in any::<i64>()) {
        prop_assert_ne!(
            ScalarValue::Integer(int),
            ScalarValue::Text(int.to_string())
        );
    }
}
