use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::chart::ChartState;
use crate::history::History;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon owns: the open workspace store plus the live
/// chart and its undo history. One instance, single-threaded; every
/// operation runs to completion before the next request is read.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub chart: ChartState,
    pub history: History,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            db: None,
            chart: ChartState::default(),
            history: History::default(),
        }
    }
}
