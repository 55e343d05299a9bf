use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grid dimensions and visual parameters for one classroom. The record
/// is replaced wholesale by `classroom.create`; seats are regenerated
/// at the same time, so `rows`/`cols` always match the seat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    #[serde(rename = "seatSize")]
    pub seat_size: u32,
    pub spacing: u32,
    pub layout: String,
    pub orientation: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// A fixed grid position, identified independently of its occupant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: String,
    pub row: u32,
    pub col: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// Roster entry. `student_id` is the external roster number; `grade`
/// and `group` are opaque labels the grouping strategies sort by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub note: String,
}

impl Student {
    pub fn with_name(name: impl Into<String>) -> Self {
        Student {
            id: new_id(),
            student_id: String::new(),
            name: name.into(),
            grade: String::new(),
            group: String::new(),
            note: String::new(),
        }
    }
}

/// Audit record appended after each seat rotation. Never read back by
/// the core; persisted so the shell can show a rotation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    pub timestamp: String,
    pub strategy: String,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
