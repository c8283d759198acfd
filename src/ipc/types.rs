use std::path::PathBuf;

use crate::auth::Session;
use crate::store::AppData;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub data: Option<AppData>,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            data: None,
            session: None,
        }
    }
}
