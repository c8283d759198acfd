use crate::registry::ValidationError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Field-level validation failures keep their own code and surface the
/// offending field in details.
pub fn validation(id: &str, e: &ValidationError) -> serde_json::Value {
    let details = match e.details() {
        serde_json::Value::Null => None,
        d => Some(d),
    };
    err(id, &e.code, e.message.clone(), details)
}
