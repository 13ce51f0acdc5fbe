use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;

use crate::errors::TrackerError;

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Extracts the request body, decoding it when API Gateway marked it base64.
pub fn extract_body(payload: &Value) -> Result<String, TrackerError> {
    let body = payload
        .get("body")
        .ok_or_else(|| TrackerError::ParseError("Missing body".to_string()))?
        .as_str()
        .ok_or_else(|| TrackerError::ParseError("Invalid body format".to_string()))?;

    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !is_base64 {
        return Ok(body.to_string());
    }

    let bytes = general_purpose::STANDARD
        .decode(body)
        .map_err(|e| TrackerError::ParseError(format!("Invalid base64 body: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| TrackerError::ParseError(format!("Body is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers = json!({ "x-telegram-bot-api-secret-token": "abc" });
        assert_eq!(
            get_header_value(&headers, "X-Telegram-Bot-Api-Secret-Token"),
            Some("abc")
        );
        assert_eq!(get_header_value(&headers, "X-Other"), None);
    }

    #[test]
    fn base64_bodies_are_decoded() {
        let payload = json!({ "body": "eyJ1cGRhdGVfaWQiOjF9", "isBase64Encoded": true });
        assert_eq!(extract_body(&payload).unwrap(), r#"{"update_id":1}"#);

        let plain = json!({ "body": "{}", "isBase64Encoded": false });
        assert_eq!(extract_body(&plain).unwrap(), "{}");
    }

    #[test]
    fn missing_body_is_an_error() {
        assert!(extract_body(&json!({})).is_err());
        assert!(extract_body(&json!({ "body": 5 })).is_err());
    }
}
