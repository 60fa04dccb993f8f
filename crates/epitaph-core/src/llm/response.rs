//! Response shape validation.
//!
//! A Messages API response is usable iff it is a JSON object with a
//! non-empty `content` array whose first element carries a string `text`.
//! The text may be empty.

use crate::error::CallError;
use serde_json::Value;

/// Extract the payload text from a raw response, or report why it is malformed.
pub fn validate_response(raw: &Value) -> Result<String, CallError> {
    if raw.is_null() {
        return Err(CallError::MalformedResponse("response is null".to_string()));
    }

    let content = raw
        .get("content")
        .ok_or_else(|| CallError::MalformedResponse("missing `content` field".to_string()))?
        .as_array()
        .ok_or_else(|| CallError::MalformedResponse("`content` is not a list".to_string()))?;

    let first = content
        .first()
        .ok_or_else(|| CallError::MalformedResponse("`content` list is empty".to_string()))?;

    first
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CallError::MalformedResponse("first content block has no text".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_response() {
        let raw = json!({
            "content": [{"type": "text", "text": "Here lies John Smith"}],
            "model": "claude-sonnet-4-20250514"
        });
        assert_eq!(validate_response(&raw).unwrap(), "Here lies John Smith");
    }

    #[test]
    fn test_empty_text_is_valid() {
        let raw = json!({"content": [{"type": "text", "text": ""}]});
        assert_eq!(validate_response(&raw).unwrap(), "");
    }

    #[test]
    fn test_only_first_block_is_used() {
        let raw = json!({"content": [{"text": "first"}, {"text": "second"}]});
        assert_eq!(validate_response(&raw).unwrap(), "first");
    }

    #[test]
    fn test_null_response() {
        let err = validate_response(&Value::Null).unwrap_err();
        assert!(matches!(err, CallError::MalformedResponse(ref m) if m.contains("null")));
    }

    #[test]
    fn test_missing_content_field() {
        let raw = json!({"type": "error", "error": {"message": "overloaded"}});
        let err = validate_response(&raw).unwrap_err();
        assert!(matches!(err, CallError::MalformedResponse(ref m) if m.contains("missing")));
    }

    #[test]
    fn test_empty_content_list() {
        let err = validate_response(&json!({"content": []})).unwrap_err();
        assert!(matches!(err, CallError::MalformedResponse(ref m) if m.contains("empty")));
    }

    #[test]
    fn test_first_block_without_text() {
        let raw = json!({"content": [{"type": "tool_use", "id": "x"}]});
        assert!(matches!(
            validate_response(&raw),
            Err(CallError::MalformedResponse(_))
        ));
    }
}
