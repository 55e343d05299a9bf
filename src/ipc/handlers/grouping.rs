use serde_json::json;

use crate::grouping::{auto_group, rotate_seats, GroupStrategy, RotateStrategy};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn strategy_param<'a>(req: &'a Request) -> Result<&'a str, serde_json::Value> {
    req.params
        .get("strategy")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", "missing strategy", None))
}

fn handle_group(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match strategy_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(strategy) = GroupStrategy::parse(raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown grouping strategy: {raw}"),
            None,
        );
    };
    if state.chart.classroom.is_none() || state.chart.seats.is_empty() {
        return err(&req.id, "no_classroom", "create a classroom first", None);
    }

    state.history.snapshot(&state.chart);
    let assigned = auto_group(&mut state.chart, strategy);
    ok(
        &req.id,
        json!({ "strategy": strategy.name(), "assigned": assigned }),
    )
}

fn handle_rotate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match strategy_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(strategy) = RotateStrategy::parse(raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown rotation strategy: {raw}"),
            None,
        );
    };
    // Precondition check happens before the snapshot so a refused
    // rotation never disturbs history.
    if state.chart.arrangement.is_empty() {
        return err(&req.id, "empty_arrangement", "no seats assigned yet", None);
    }

    state.history.snapshot(&state.chart);
    rotate_seats(&mut state.chart, strategy);
    ok(
        &req.id,
        json!({
            "strategy": strategy.name(),
            "rotationCount": state.chart.rotation_history.len()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grouping.apply" => Some(handle_group(state, req)),
        "rotation.apply" => Some(handle_rotate(state, req)),
        _ => None,
    }
}
