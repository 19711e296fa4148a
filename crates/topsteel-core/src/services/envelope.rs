//! Normalization of preference payloads received in legacy envelopes

use serde_json::Value;

use crate::error::DomainError;

/// Unwrap a preference list from a flat array, `{success, data: [...]}` or
/// `{data: [...]}`. A `{success: false}` envelope yields an empty list.
pub fn normalize_preference_envelope(payload: Value) -> Result<Vec<Value>, DomainError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => {
            if object.get("success").and_then(Value::as_bool) == Some(false) {
                return Ok(Vec::new());
            }
            match object.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Null) => Ok(Vec::new()),
                Some(other) => Err(DomainError::MalformedPreferencePayload(format!(
                    "data must be an array, got {}",
                    type_name(&other)
                ))),
                None => Err(DomainError::MalformedPreferencePayload(
                    "object without data field".to_string(),
                )),
            }
        }
        Value::Null => Ok(Vec::new()),
        other => Err(DomainError::MalformedPreferencePayload(format!(
            "unexpected {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_array() {
        let items = normalize_preference_envelope(json!([{ "menuId": "a" }])).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_success_envelope() {
        let items = normalize_preference_envelope(json!({
            "success": true,
            "data": [{ "menuId": "a" }, { "menuId": "b" }]
        }))
        .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_failed_envelope_is_empty() {
        let items = normalize_preference_envelope(json!({ "success": false, "message": "x" })).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            normalize_preference_envelope(json!("nope")),
            Err(DomainError::MalformedPreferencePayload(_))
        ));
        assert!(matches!(
            normalize_preference_envelope(json!({ "data": { "menuId": "a" } })),
            Err(DomainError::MalformedPreferencePayload(_))
        ));
    }
}
