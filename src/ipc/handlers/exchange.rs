use serde_json::json;

use crate::exchange;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;

/// `import.students` — roster import from a loosely-typed record array
/// or pasted text (JSON array first, CSV fallback). Records without a
/// name are skipped rather than failing the batch; the whole batch
/// shares one history snapshot.
fn handle_import_students(state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = if let Some(records) = req.params.get("records") {
        match records.as_array() {
            Some(arr) => arr.clone(),
            None => return err(&req.id, "bad_params", "records must be an array", None),
        }
    } else if let Some(text) = req.params.get("text").and_then(|v| v.as_str()) {
        if text.trim().is_empty() {
            return err(&req.id, "bad_params", "text must not be empty", None);
        }
        exchange::parse_roster_text(text)
    } else {
        return err(&req.id, "bad_params", "provide records or text", None);
    };

    state.history.snapshot(&state.chart);
    let imported = exchange::admit_students(&mut state.chart, &records);
    ok(&req.id, json!({ "imported": imported }))
}

/// `export.chart` — renders the requested interchange formats and
/// returns them in-band; writing files is the shell's concern.
fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(formats) = req.params.get("formats").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing formats", None);
    };
    let formats: Vec<&str> = formats.iter().filter_map(|v| v.as_str()).collect();
    if formats.is_empty() {
        return err(&req.id, "bad_params", "select at least one export format", None);
    }
    if let Some(unknown) = formats.iter().find(|f| !matches!(**f, "json" | "csv")) {
        return err(
            &req.id,
            "bad_params",
            format!("unknown export format: {unknown}"),
            None,
        );
    }

    let mut result = serde_json::Map::new();
    if formats.contains(&"json") {
        result.insert("json".into(), exchange::export_json(&state.chart));
    }
    if formats.contains(&"csv") {
        result.insert("csv".into(), json!(exchange::export_csv(&state.chart)));
    }
    ok(&req.id, serde_json::Value::Object(result))
}

/// `import.chart` — restores a previously exported JSON document.
/// The document is parsed in full before the snapshot, so a malformed
/// payload touches neither the chart nor the history.
fn handle_import_chart(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(data) = req.params.get("data") else {
        return err(&req.id, "bad_params", "missing data", None);
    };

    let doc = match exchange::parse_chart_document(data) {
        Ok(doc) => doc,
        Err(e) => return err(&req.id, "parse_failed", format!("{e:#}"), None),
    };

    state.history.snapshot(&state.chart);
    exchange::apply_chart_document(&mut state.chart, doc);
    ok(
        &req.id,
        json!({
            "students": state.chart.students.len(),
            "assignments": state.chart.arrangement.len()
        }),
    )
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    // All mutations are already applied; a rejected write leaves the
    // in-memory chart untouched.
    let blob = store::chart_to_blob(&state.chart);
    match store::save_blob(conn, store::CHART_KEY, &blob) {
        Ok(()) => ok(&req.id, json!({ "saved": true })),
        Err(e) => err(&req.id, "storage_failed", format!("{e:#}"), None),
    }
}

fn handle_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let chart = match store::load_blob(conn, store::CHART_KEY) {
        Ok(Some(blob)) => match store::chart_from_blob(blob) {
            Ok(chart) => Some(chart),
            Err(e) => {
                eprintln!("seatingd: discarding persisted chart: {e:?}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            eprintln!("seatingd: failed to read persisted chart: {e:?}");
            None
        }
    };

    let loaded = chart.is_some();
    state.chart = chart.unwrap_or_default();
    state.history.clear();
    ok(&req.id, json!({ "loaded": loaded }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "import.students" => Some(handle_import_students(state, req)),
        "import.chart" => Some(handle_import_chart(state, req)),
        "export.chart" => Some(handle_export(state, req)),
        "chart.save" => Some(handle_save(state, req)),
        "chart.load" => Some(handle_load(state, req)),
        _ => None,
    }
}
