use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

/// `seating.assign` — manual placement. Unknown identities and a
/// locked target are rejected before the history snapshot; the map
/// itself then handles freeing the student's previous seat and
/// displacing any prior occupant of the target.
fn handle_assign(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };
    let seat_id = match required_str(req, "seatId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    if state.chart.student(&student_id).is_none() {
        return err(&req.id, "not_found", "student not found", None);
    }
    if state.chart.seat(&seat_id).is_none() {
        return err(&req.id, "not_found", "seat not found", None);
    }
    if state.chart.is_locked(&seat_id) {
        return err(&req.id, "seat_locked", "this seat is locked", None);
    }

    state.history.snapshot(&state.chart);
    state.chart.assign(&student_id, &seat_id);
    ok(&req.id, json!({ "seatId": seat_id, "studentId": student_id }))
}

fn handle_unassign(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seat_id = match required_str(req, "seatId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    if state.chart.student_of(&seat_id).is_none() {
        // Nothing to undo; keep the no-op out of history.
        return ok(&req.id, json!({ "unassigned": false }));
    }

    state.history.snapshot(&state.chart);
    state.chart.unassign(&seat_id);
    ok(&req.id, json!({ "unassigned": true }))
}

fn handle_lock(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seat_id = match required_str(req, "seatId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };
    if state.chart.seat(&seat_id).is_none() {
        return err(&req.id, "not_found", "seat not found", None);
    }
    if state.chart.is_locked(&seat_id) {
        return ok(&req.id, json!({ "locked": true }));
    }

    state.history.snapshot(&state.chart);
    state.chart.lock_seat(&seat_id);
    ok(&req.id, json!({ "locked": true }))
}

fn handle_unlock(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seat_id = match required_str(req, "seatId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };
    if !state.chart.is_locked(&seat_id) {
        return ok(&req.id, json!({ "locked": false }));
    }

    state.history.snapshot(&state.chart);
    state.chart.unlock_seat(&seat_id);
    ok(&req.id, json!({ "locked": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "seating.assign" => Some(handle_assign(state, req)),
        "seating.unassign" => Some(handle_unassign(state, req)),
        "seating.lock" => Some(handle_lock(state, req)),
        "seating.unlock" => Some(handle_unlock(state, req)),
        _ => None,
    }
}
