use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::chart::ChartState;
use crate::model::{Classroom, RotationRecord, Seat, Student};

/// Fixed storage key for the persisted chart blob.
pub const CHART_KEY: &str = "seatingChartData";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("seating.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn save_blob(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value.to_string()),
    )
    .context("kv write rejected")?;
    Ok(())
}

pub fn load_blob(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
        .optional()?;
    match raw {
        None => Ok(None),
        Some(text) => Ok(Some(
            serde_json::from_str(&text).context("malformed chart blob")?,
        )),
    }
}

/// Wire shape of the persisted blob. `seats` travels too: arrangement
/// keys are seat identities and would dangle without the grid that
/// defined them.
#[derive(Debug, Serialize, Deserialize)]
struct ChartBlob {
    classroom: Option<Classroom>,
    #[serde(default)]
    seats: Vec<Seat>,
    #[serde(default)]
    students: Vec<Student>,
    #[serde(rename = "seatingArrangement", default)]
    seating_arrangement: Vec<(String, String)>,
    #[serde(rename = "lockedSeats", default)]
    locked_seats: Vec<String>,
    #[serde(rename = "rotationHistory", default)]
    rotation_history: Vec<RotationRecord>,
}

pub fn chart_to_blob(chart: &ChartState) -> serde_json::Value {
    let blob = ChartBlob {
        classroom: chart.classroom.clone(),
        seats: chart.seats.clone(),
        students: chart.students.clone(),
        seating_arrangement: chart
            .arrangement
            .iter()
            .map(|(seat, student)| (seat.clone(), student.clone()))
            .collect(),
        locked_seats: chart.locked_seats.iter().cloned().collect(),
        rotation_history: chart.rotation_history.clone(),
    };
    serde_json::to_value(blob).unwrap_or(serde_json::Value::Null)
}

pub fn chart_from_blob(value: serde_json::Value) -> anyhow::Result<ChartState> {
    let blob: ChartBlob =
        serde_json::from_value(value).context("chart blob does not match expected shape")?;
    Ok(ChartState {
        classroom: blob.classroom,
        seats: blob.seats,
        students: blob.students,
        arrangement: blob.seating_arrangement.into_iter().collect(),
        locked_seats: blob.locked_seats.into_iter().collect(),
        rotation_history: blob.rotation_history,
    })
}
