use crate::auth::{self, LoginError};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_session, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(email) = str_param(req, "email") else {
        return err(&req.id, "bad_params", "missing email", None);
    };
    let Some(password) = str_param(req, "password") else {
        return err(&req.id, "bad_params", "missing password", None);
    };

    match auth::login(&email, &password) {
        Ok(session) => {
            let payload = json!({ "token": session.token, "user": session.user });
            // A fresh login replaces any previous session.
            state.session = Some(session);
            ok(&req.id, payload)
        }
        Err(LoginError::InvalidCredentials) => {
            err(&req.id, "invalid_credentials", "invalid email or password", None)
        }
    }
}

fn handle_me(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = require_session(state, req) {
        return resp;
    }
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "unauthorized", "invalid or expired token", None);
    };
    ok(
        &req.id,
        json!({ "user": session.user, "issuedAt": session.issued_at }),
    )
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = require_session(state, req) {
        return resp;
    }
    state.session = None;
    ok(&req.id, json!({ "loggedOut": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.me" => Some(handle_me(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
