//! Permission verdicts and attribute projection.
//!
//! A [`Permission`] is the immutable result of one `check` call: either
//! denied with a message, or granted with an optional attribute
//! allowlist. When an allowlist applies, [`filter`](Permission::filter)
//! projects response payloads down to the permitted attributes before
//! they leave the service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The immutable verdict of an access check.
///
/// # Invariants
///
/// - `message` is set only when denied
/// - `attributes` is set only when granted and a filter applies
///
/// # Example
///
/// ```
/// use warden_core::Permission;
/// use serde_json::json;
///
/// let permission = Permission::granted(Some(vec!["id".into(), "owner.name".into()]));
/// let projected = permission.filter(&json!({
///     "id": 7,
///     "owner": { "name": "amina", "email": "hidden@example.com" },
///     "secret": true,
/// }));
/// assert_eq!(projected, json!({ "id": 7, "owner": { "name": "amina" } }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    granted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<String>>,
}

impl Permission {
    /// Creates a granted verdict with an optional attribute allowlist.
    #[must_use]
    pub fn granted(attributes: Option<Vec<String>>) -> Self {
        Self {
            granted: true,
            message: None,
            attributes,
        }
    }

    /// Creates a denied verdict with a message.
    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            granted: false,
            message: Some(message.into()),
            attributes: None,
        }
    }

    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// The denial message, present only when denied.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The attribute allowlist, present only when granted with a filter.
    #[must_use]
    pub fn attributes(&self) -> Option<&[String]> {
        self.attributes.as_deref()
    }

    /// Projects a payload down to the permitted attributes.
    ///
    /// With no allowlist the payload passes through unchanged. A sequence
    /// is projected element-wise (order preserved, same length). Each
    /// projected record contains exactly the declared dot-paths; a path
    /// missing from the input is kept with a `null` leaf rather than
    /// omitted, so every projected record has the same shape regardless
    /// of which attributes the input happened to carry.
    #[must_use]
    pub fn filter(&self, data: &Value) -> Value {
        let Some(attributes) = &self.attributes else {
            return data.clone();
        };
        match data {
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| project(item, attributes)).collect())
            }
            other => project(other, attributes),
        }
    }

    /// Projects a slice of records, one projection per record.
    #[must_use]
    pub fn filter_all(&self, records: &[Value]) -> Vec<Value> {
        records.iter().map(|record| self.filter(record)).collect()
    }
}

/// Builds a new record holding only the declared dot-paths.
fn project(data: &Value, attributes: &[String]) -> Value {
    let mut out = Map::new();
    for path in attributes {
        let value = read_path(data, path).cloned().unwrap_or(Value::Null);
        write_path(&mut out, path, value);
    }
    Value::Object(out)
}

/// Reads a nested value by dot-path.
fn read_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |value, segment| value.get(segment))
}

/// Writes a value at a nested dot-path, creating intermediate objects.
fn write_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = entry {
                write_path(nested, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invariants_hold() {
        let granted = Permission::granted(None);
        assert!(granted.is_granted());
        assert!(granted.message().is_none());

        let denied = Permission::denied("nope");
        assert!(!denied.is_granted());
        assert_eq!(denied.message(), Some("nope"));
        assert!(denied.attributes().is_none());
    }

    #[test]
    fn no_attributes_passes_data_through() {
        let permission = Permission::granted(None);
        let data = json!({ "a": 1, "b": { "c": 2 } });
        assert_eq!(permission.filter(&data), data);
    }

    #[test]
    fn projects_top_level_attributes() {
        let permission = Permission::granted(Some(vec!["a".into(), "b".into()]));
        let projected = permission.filter(&json!({ "a": 1, "b": 2, "c": 3 }));
        assert_eq!(projected, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn projects_nested_dot_paths() {
        let permission = Permission::granted(Some(vec!["owner.name".into(), "id".into()]));
        let projected = permission.filter(&json!({
            "id": 1,
            "owner": { "name": "sam", "email": "x@y.z" },
        }));
        assert_eq!(projected, json!({ "id": 1, "owner": { "name": "sam" } }));
    }

    #[test]
    fn missing_path_becomes_null_leaf() {
        let permission = Permission::granted(Some(vec!["a".into(), "b.c".into()]));
        let projected = permission.filter(&json!({ "a": 1 }));
        assert_eq!(projected, json!({ "a": 1, "b": { "c": null } }));
    }

    #[test]
    fn sequences_project_element_wise() {
        let permission = Permission::granted(Some(vec!["id".into()]));
        let projected = permission.filter(&json!([
            { "id": 1, "x": true },
            { "id": 2 },
            { "x": false },
        ]));
        assert_eq!(
            projected,
            json!([{ "id": 1 }, { "id": 2 }, { "id": null }])
        );
    }

    #[test]
    fn filter_all_projects_each_record() {
        let permission = Permission::granted(Some(vec!["id".into()]));
        let records = vec![json!({ "id": 1, "x": 2 }), json!({ "id": 2 })];
        assert_eq!(
            permission.filter_all(&records),
            vec![json!({ "id": 1 }), json!({ "id": 2 })]
        );
    }

    #[test]
    fn serde_skips_absent_fields() {
        let json = serde_json::to_value(Permission::granted(None)).expect("serialize");
        assert_eq!(json, json!({ "granted": true }));

        let json = serde_json::to_value(Permission::denied("no")).expect("serialize");
        assert_eq!(json, json!({ "granted": false, "message": "no" }));
    }
}
