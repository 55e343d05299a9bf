use serde_json::json;
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_seatingd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn seatingd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn arrangement_pairs(chart: &serde_json::Value) -> Vec<(String, String)> {
    chart["seatingArrangement"]
        .as_array()
        .expect("arrangement")
        .iter()
        .map(|p| {
            (
                p[0].as_str().expect("seat").to_string(),
                p[1].as_str().expect("student").to_string(),
            )
        })
        .collect()
}

#[test]
fn grouping_by_name_fills_seats_in_row_major_order() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "classroom.create",
        json!({ "name": "3A", "rows": 1, "cols": 3 }),
    );
    let mut ids = std::collections::HashMap::new();
    for name in ["Bob", "Alice", "Cara"] {
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{name}"),
            "students.add",
            json!({ "name": name }),
        );
        ids.insert(name, result["student"]["id"].as_str().expect("id").to_string());
    }

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "g",
        "grouping.apply",
        json!({ "strategy": "name" }),
    );
    assert_eq!(result["assigned"], 3);

    let chart = request_ok(&mut stdin, &mut reader, "get", "chart.get", json!({}));
    let seats: Vec<String> = chart["seats"]
        .as_array()
        .expect("seats")
        .iter()
        .map(|s| s["id"].as_str().expect("seat id").to_string())
        .collect();
    let pairs = arrangement_pairs(&chart);
    assert!(pairs.contains(&(seats[0].clone(), ids["Alice"].clone())));
    assert!(pairs.contains(&(seats[1].clone(), ids["Bob"].clone())));
    assert!(pairs.contains(&(seats[2].clone(), ids["Cara"].clone())));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn grouping_requires_a_classroom_and_a_known_strategy() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let resp = request(
        &mut stdin,
        &mut reader,
        "g1",
        "grouping.apply",
        json!({ "strategy": "alphabetical" }),
    );
    assert_eq!(resp["error"]["code"], "bad_params");

    let resp = request(
        &mut stdin,
        &mut reader,
        "g2",
        "grouping.apply",
        json!({ "strategy": "name" }),
    );
    assert_eq!(resp["error"]["code"], "no_classroom");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn shuffle_preserves_seats_and_students_and_logs_the_rotation() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "classroom.create",
        json!({ "name": "3A", "rows": 2, "cols": 3 }),
    );
    for i in 0..6 {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{i}"),
            "students.add",
            json!({ "name": format!("Student {i}") }),
        );
    }
    request_ok(
        &mut stdin,
        &mut reader,
        "g",
        "grouping.apply",
        json!({ "strategy": "name" }),
    );

    let before = request_ok(&mut stdin, &mut reader, "b", "chart.get", json!({}));
    let before_pairs = arrangement_pairs(&before);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "r",
        "rotation.apply",
        json!({ "strategy": "shuffle" }),
    );
    assert_eq!(result["rotationCount"], 1);

    let after = request_ok(&mut stdin, &mut reader, "a", "chart.get", json!({}));
    let after_pairs = arrangement_pairs(&after);

    let seats = |pairs: &[(String, String)]| -> BTreeSet<String> {
        pairs.iter().map(|(s, _)| s.clone()).collect()
    };
    let students = |pairs: &[(String, String)]| -> BTreeSet<String> {
        pairs.iter().map(|(_, s)| s.clone()).collect()
    };
    assert_eq!(seats(&before_pairs), seats(&after_pairs));
    assert_eq!(students(&before_pairs), students(&after_pairs));

    let log = after["rotationHistory"].as_array().expect("log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["strategy"], "shuffle");
    assert!(log[0]["timestamp"].is_string());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn rotations_never_move_a_locked_assignment() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "classroom.create",
        json!({ "name": "3A", "rows": 2, "cols": 2 }),
    );
    for i in 0..4 {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{i}"),
            "students.add",
            json!({ "name": format!("Student {i}") }),
        );
    }
    request_ok(
        &mut stdin,
        &mut reader,
        "g",
        "grouping.apply",
        json!({ "strategy": "name" }),
    );

    let chart = request_ok(&mut stdin, &mut reader, "get", "chart.get", json!({}));
    let pairs = arrangement_pairs(&chart);
    let (locked_seat, locked_student) = pairs[0].clone();
    request_ok(
        &mut stdin,
        &mut reader,
        "l",
        "seating.lock",
        json!({ "seatId": locked_seat }),
    );

    for (i, strategy) in ["shuffle", "rows", "clusters"].iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("r{i}"),
            "rotation.apply",
            json!({ "strategy": strategy }),
        );
        let chart = request_ok(
            &mut stdin,
            &mut reader,
            &format!("check{i}"),
            "chart.get",
            json!({}),
        );
        let pairs = arrangement_pairs(&chart);
        assert!(
            pairs.contains(&(locked_seat.clone(), locked_student.clone())),
            "{strategy} moved a locked assignment"
        );
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn rotate_grouping_shifts_occupants_into_free_seats() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "classroom.create",
        json!({ "name": "3A", "rows": 1, "cols": 4 }),
    );
    for name in ["Alice", "Bob"] {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{name}"),
            "students.add",
            json!({ "name": name }),
        );
    }
    request_ok(
        &mut stdin,
        &mut reader,
        "g1",
        "grouping.apply",
        json!({ "strategy": "name" }),
    );

    let before = request_ok(&mut stdin, &mut reader, "b", "chart.get", json!({}));
    let seats: Vec<String> = before["seats"]
        .as_array()
        .expect("seats")
        .iter()
        .map(|s| s["id"].as_str().expect("id").to_string())
        .collect();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "g2",
        "grouping.apply",
        json!({ "strategy": "rotate" }),
    );
    assert_eq!(result["assigned"], 2);

    let after = request_ok(&mut stdin, &mut reader, "a", "chart.get", json!({}));
    let occupied: BTreeSet<String> = arrangement_pairs(&after)
        .into_iter()
        .map(|(seat, _)| seat)
        .collect();
    assert_eq!(
        occupied,
        BTreeSet::from([seats[2].clone(), seats[3].clone()])
    );

    drop(stdin);
    let _ = child.wait();
}
