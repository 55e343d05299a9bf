use std::path::PathBuf;

use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (or creates) the workspace store, then tries to restore the
/// persisted chart. A missing or malformed blob is a diagnostics-only
/// event: the daemon comes up with an empty chart instead of failing.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match store::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    let mut restored = false;
    match store::load_blob(&conn, store::CHART_KEY) {
        Ok(Some(blob)) => match store::chart_from_blob(blob) {
            Ok(chart) => {
                state.chart = chart;
                restored = true;
            }
            Err(e) => {
                eprintln!("seatingd: discarding persisted chart: {e:?}");
                state.chart = Default::default();
            }
        },
        Ok(None) => state.chart = Default::default(),
        Err(e) => {
            eprintln!("seatingd: failed to read persisted chart: {e:?}");
            state.chart = Default::default();
        }
    }
    state.history.clear();

    state.workspace = Some(path.clone());
    state.db = Some(conn);
    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "restored": restored
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
