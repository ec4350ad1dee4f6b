//! Diff generation for audit logging
//!
//! Generates human-readable diffs between before and after values
//! for audit trail entries.

use serde_json::Value;

/// Generate a human-readable diff between two JSON values
///
/// Returns a string describing the changes in a user-friendly format.
/// Only includes top-level field changes for readability.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        if before == after {
            return None;
        }
        return Some(format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        match after_obj.get(key) {
            Some(after_val) if after_val != before_val => {
                changes.push(format!(
                    "{}: {} -> {}",
                    key,
                    format_value(before_val),
                    format_value(after_val)
                ));
            }
            Some(_) => {}
            None => {
                changes.push(format!("{}: {} -> (removed)", key, format_value(before_val)));
            }
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let prefix: String = s.chars().take(47).collect();
                format!("\"{}...\"", prefix)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_changes_returns_none() {
        let value = json!({"estado": "pendiente", "categoria": "COMPRAS"});
        assert_eq!(generate_diff(&value, &value), None);
    }

    #[test]
    fn test_modified_field() {
        let before = json!({"estado": "pendiente_pdf", "categoria": "COMPRAS"});
        let after = json!({"estado": "clasificado", "categoria": "COMPRAS"});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "estado: \"pendiente_pdf\" -> \"clasificado\"");
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"proveedor": "EPA"});
        let after = json!({"sha256": "deadbeef"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("proveedor: \"EPA\" -> (removed)"));
        assert!(diff.contains("sha256: (added) -> \"deadbeef\""));
    }

    #[test]
    fn test_long_strings_truncated() {
        let before = json!({"ruta": "x"});
        let after = json!({"ruta": "y".repeat(80)});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("..."));
        assert!(diff.len() < 120);
    }

    #[test]
    fn test_non_object_values() {
        let diff = generate_diff(&json!("pendiente"), &json!("clasificado")).unwrap();
        assert_eq!(diff, "\"pendiente\" -> \"clasificado\"");
    }
}
