use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn opt_u32(params: &serde_json::Value, key: &str, default: u32) -> Option<u32> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Some(default),
        Some(v) => v.as_u64().and_then(|n| u32::try_from(n).ok()),
    }
}

fn opt_str(params: &serde_json::Value, key: &str, default: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

/// `classroom.create` — validates, snapshots, then replaces the
/// classroom and regenerates the seat grid. Failed validation leaves
/// both the chart and the history untouched.
fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = &req.params;

    let name = match p.get("name").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing name", None),
    };
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }

    let Some(rows) = p.get("rows").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing rows", None);
    };
    let Some(cols) = p.get("cols").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing cols", None);
    };
    if rows < 1 || cols < 1 {
        return err(&req.id, "bad_params", "rows and cols must be at least 1", None);
    }
    let (Ok(rows), Ok(cols)) = (u32::try_from(rows), u32::try_from(cols)) else {
        return err(&req.id, "bad_params", "rows and cols out of range", None);
    };

    let Some(seat_size) = opt_u32(p, "seatSize", 60) else {
        return err(&req.id, "bad_params", "seatSize must be a non-negative integer", None);
    };
    if seat_size == 0 {
        return err(&req.id, "bad_params", "seatSize must be positive", None);
    }
    let Some(spacing) = opt_u32(p, "spacing", 10) else {
        return err(&req.id, "bad_params", "spacing must be a non-negative integer", None);
    };
    let layout = opt_str(p, "layout", "grid");
    let orientation = opt_str(p, "orientation", "front");

    state.history.snapshot(&state.chart);
    state
        .chart
        .create_classroom(name, rows, cols, seat_size, spacing, layout, orientation);

    ok(
        &req.id,
        json!({
            "classroom": state.chart.classroom,
            "seatCount": state.chart.seats.len()
        }),
    )
}

/// `chart.get` — the full render model the shell draws from.
fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let chart = &state.chart;
    let arrangement: Vec<serde_json::Value> = chart
        .arrangement
        .iter()
        .map(|(seat, student)| json!([seat, student]))
        .collect();
    let assigned = chart.arrangement.len();
    let total = chart.students.len();

    ok(
        &req.id,
        json!({
            "classroom": chart.classroom,
            "seats": chart.seats,
            "students": chart.students,
            "seatingArrangement": arrangement,
            "lockedSeats": chart.locked_seats.iter().collect::<Vec<_>>(),
            "rotationHistory": chart.rotation_history,
            "stats": {
                "total": total,
                "assigned": assigned,
                "unassigned": total.saturating_sub(assigned)
            }
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classroom.create" => Some(handle_create(state, req)),
        "chart.get" => Some(handle_get(state, req)),
        _ => None,
    }
}
