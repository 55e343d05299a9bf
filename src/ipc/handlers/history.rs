use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};

fn status(state: &AppState, applied: bool) -> serde_json::Value {
    json!({
        "applied": applied,
        "canUndo": state.history.can_undo(),
        "canRedo": state.history.can_redo()
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "history.undo" => {
            let applied = state.history.undo(&mut state.chart);
            Some(ok(&req.id, status(state, applied)))
        }
        "history.redo" => {
            let applied = state.history.redo(&mut state.chart);
            Some(ok(&req.id, status(state, applied)))
        }
        "history.status" => Some(ok(&req.id, status(state, false))),
        _ => None,
    }
}
