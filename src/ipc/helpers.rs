use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::{self, AppData};

/// Bearer-token guard for every method outside `health`, `workspace.select`
/// and the auth family. `None` means the request may proceed.
pub fn require_session(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let token = req.params.get("token").and_then(|v| v.as_str());
    let Some(token) = token else {
        return Some(err(&req.id, "unauthorized", "missing params.token", None));
    };
    match &state.session {
        Some(s) if s.token == token => None,
        _ => Some(err(&req.id, "unauthorized", "invalid or expired token", None)),
    }
}

pub fn require_data<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut AppData, serde_json::Value> {
    match state.data.as_mut() {
        Some(d) => Ok(d),
        None => Err(err(&req.id, "no_workspace", "select a workspace first", None)),
    }
}

/// Writes the whole store back after a committed mutation. The domain state
/// is already updated; a failed save is reported but never rolls it back.
pub fn persist(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let (Some(ws), Some(data)) = (state.workspace.as_ref(), state.data.as_ref()) else {
        return None;
    };
    match store::save_data(ws, data) {
        Ok(()) => None,
        Err(e) => Some(err(&req.id, "store_save_failed", format!("{e:?}"), None)),
    }
}

pub fn str_param(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn f64_param(req: &Request, key: &str) -> Option<f64> {
    req.params.get(key).and_then(|v| v.as_f64())
}
