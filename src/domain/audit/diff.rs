//! Shallow field diff between two JSON snapshots.

use serde_json::Value;
use std::collections::BTreeSet;

/// One field that differs between the old and new snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// Shallow diff over the union of top-level keys.
///
/// A field is reported only when its values differ; a key present on one
/// side and absent on the other is reported with `null` for the missing
/// side. Nested objects are compared as whole values, not recursed into.
pub fn changed_fields(old: &Value, new: &Value) -> Vec<FieldChange> {
    let empty = serde_json::Map::new();
    let old_map = old.as_object().unwrap_or(&empty);
    let new_map = new.as_object().unwrap_or(&empty);

    let keys: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let old_value = old_map.get(key).cloned().unwrap_or(Value::Null);
            let new_value = new_map.get(key).cloned().unwrap_or(Value::Null);
            if old_value == new_value {
                None
            } else {
                Some(FieldChange {
                    field: key.clone(),
                    old: old_value,
                    new: new_value,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_objects_produce_no_changes() {
        let snapshot = json!({"status": "draft", "total": "100"});
        assert!(changed_fields(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn only_differing_keys_are_reported() {
        let old = json!({"status": "draft", "total": "100", "notes": "a"});
        let new = json!({"status": "pending", "total": "100", "notes": "a"});

        let changes = changed_fields(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "status");
        assert_eq!(changes[0].old, json!("draft"));
        assert_eq!(changes[0].new, json!("pending"));
    }

    #[test]
    fn missing_key_is_reported_as_null() {
        let old = json!({"status": "draft"});
        let new = json!({"status": "draft", "reason": "client asked"});

        let changes = changed_fields(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "reason");
        assert_eq!(changes[0].old, Value::Null);
        assert_eq!(changes[0].new, json!("client asked"));
    }

    #[test]
    fn explicit_null_versus_value_is_a_change() {
        let old = json!({"notes": null});
        let new = json!({"notes": "updated"});

        let changes = changed_fields(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old, Value::Null);
    }

    #[test]
    fn explicit_null_on_both_sides_is_not_a_change() {
        let old = json!({"notes": null});
        let new = json!({"notes": null});
        assert!(changed_fields(&old, &new).is_empty());
    }

    #[test]
    fn diff_is_shallow_over_nested_objects() {
        let old = json!({"client": {"name": "Acme", "city": "Lyon"}});
        let new = json!({"client": {"name": "Acme", "city": "Nice"}});

        let changes = changed_fields(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "client");
        assert_eq!(changes[0].old, json!({"name": "Acme", "city": "Lyon"}));
    }

    #[test]
    fn non_object_inputs_produce_no_changes() {
        assert!(changed_fields(&json!("a"), &json!("b")).is_empty());
        assert!(changed_fields(&Value::Null, &json!({"k": 1})).len() == 1);
    }
}
