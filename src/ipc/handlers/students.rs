use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;

fn opt_field(params: &serde_json::Value, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing name", None),
    };
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }

    let mut student = Student::with_name(name);
    student.student_id = opt_field(&req.params, "studentId")
        .or_else(|| opt_field(&req.params, "student_id"))
        .unwrap_or_default();
    student.grade = opt_field(&req.params, "grade").unwrap_or_default();
    student.group = opt_field(&req.params, "group").unwrap_or_default();
    student.note = opt_field(&req.params, "note").unwrap_or_default();

    state.history.snapshot(&state.chart);
    state.chart.add_student(student.clone());
    ok(&req.id, json!({ "student": student }))
}

/// `students.update` — patches the given fields; a `locked` boolean
/// locks or unlocks the student's current seat (no-op while unseated).
fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    if state.chart.student(id).is_none() {
        return err(&req.id, "not_found", "student not found", None);
    }
    if let Some(name) = req.params.get("name").and_then(|v| v.as_str()) {
        if name.trim().is_empty() {
            return err(&req.id, "bad_params", "name must not be empty", None);
        }
    }

    state.history.snapshot(&state.chart);

    let id = id.to_string();
    if let Some(student) = state.chart.student_mut(&id) {
        if let Some(v) = opt_field(&req.params, "name") {
            student.name = v.trim().to_string();
        }
        if let Some(v) =
            opt_field(&req.params, "studentId").or_else(|| opt_field(&req.params, "student_id"))
        {
            student.student_id = v;
        }
        if let Some(v) = opt_field(&req.params, "grade") {
            student.grade = v;
        }
        if let Some(v) = opt_field(&req.params, "group") {
            student.group = v;
        }
        if let Some(v) = opt_field(&req.params, "note") {
            student.note = v;
        }
    }

    if let Some(locked) = req.params.get("locked").and_then(|v| v.as_bool()) {
        if let Some(seat_id) = state.chart.seat_of(&id) {
            if locked {
                state.chart.lock_seat(&seat_id);
            } else {
                state.chart.unlock_seat(&seat_id);
            }
        }
    }

    ok(&req.id, json!({ "student": state.chart.student(&id) }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    if state.chart.student(id).is_none() {
        return err(&req.id, "not_found", "student not found", None);
    }

    state.history.snapshot(&state.chart);
    let id = id.to_string();
    state.chart.delete_student(&id);
    ok(&req.id, json!({ "deleted": true }))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let students: Vec<serde_json::Value> = state
        .chart
        .students
        .iter()
        .map(|s| {
            let seat_id = state.chart.seat_of(&s.id);
            let locked = seat_id
                .as_deref()
                .map(|seat| state.chart.is_locked(seat))
                .unwrap_or(false);
            json!({
                "student": s,
                "seatId": seat_id,
                "locked": locked
            })
        })
        .collect();
    ok(&req.id, json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.add" => Some(handle_add(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        "students.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
