use std::collections::{BTreeMap, BTreeSet};

use crate::model::{new_id, now_rfc3339, Classroom, Position, RotationRecord, Seat, Student};

/// The live seating chart: classroom definition, seat grid, roster,
/// seat→student assignment map, lock set, and the rotation audit log.
///
/// Mutating methods here touch only the map/set/roster; history
/// snapshotting is the caller's job and happens before the mutation.
#[derive(Debug, Default, Clone)]
pub struct ChartState {
    pub classroom: Option<Classroom>,
    pub seats: Vec<Seat>,
    pub students: Vec<Student>,
    /// seat id -> student id. Ordered so `rotate` and export walk the
    /// entries deterministically.
    pub arrangement: BTreeMap<String, String>,
    pub locked_seats: BTreeSet<String>,
    pub rotation_history: Vec<RotationRecord>,
}

impl ChartState {
    /// Replaces the classroom and regenerates the seat grid row-major.
    /// All assignments and locks are discarded; the roster survives.
    pub fn create_classroom(
        &mut self,
        name: String,
        rows: u32,
        cols: u32,
        seat_size: u32,
        spacing: u32,
        layout: String,
        orientation: String,
    ) {
        self.classroom = Some(Classroom {
            id: new_id(),
            name,
            rows,
            cols,
            seat_size,
            spacing,
            layout,
            orientation,
            created_at: now_rfc3339(),
        });

        self.seats.clear();
        self.arrangement.clear();
        self.locked_seats.clear();

        for r in 0..rows {
            for c in 0..cols {
                self.seats.push(Seat {
                    id: new_id(),
                    row: r,
                    col: c,
                    position: Position {
                        x: c * (seat_size + spacing),
                        y: r * (seat_size + spacing),
                    },
                });
            }
        }
    }

    pub fn add_student(&mut self, student: Student) {
        self.students.push(student);
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn student_mut(&mut self, student_id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == student_id)
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    /// Removes a student from the roster and frees any seat they held,
    /// in one step. Returns false if the id is unknown.
    pub fn delete_student(&mut self, student_id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != student_id);
        if self.students.len() == before {
            return false;
        }
        if let Some(seat_id) = self.seat_of(student_id) {
            self.unassign(&seat_id);
        }
        true
    }

    /// Map-level assign: frees (and unlocks) the student's previous
    /// seat, then overwrites the target entry. A student displaced
    /// from the target simply becomes unassigned; rejecting such
    /// overwrites is the caller's call.
    pub fn assign(&mut self, student_id: &str, seat_id: &str) {
        if let Some(prev) = self.seat_of(student_id) {
            if prev == seat_id {
                return;
            }
            self.unassign(&prev);
        }
        self.arrangement
            .insert(seat_id.to_string(), student_id.to_string());
    }

    /// Removes the entry for a seat if present. A vacated seat keeps
    /// no lock: the lock protects the occupant, not the furniture.
    pub fn unassign(&mut self, seat_id: &str) {
        self.arrangement.remove(seat_id);
        self.locked_seats.remove(seat_id);
    }

    pub fn seat_of(&self, student_id: &str) -> Option<String> {
        self.arrangement
            .iter()
            .find(|(_, sid)| sid.as_str() == student_id)
            .map(|(seat, _)| seat.clone())
    }

    pub fn student_of(&self, seat_id: &str) -> Option<&str> {
        self.arrangement.get(seat_id).map(String::as_str)
    }

    pub fn is_locked(&self, seat_id: &str) -> bool {
        self.locked_seats.contains(seat_id)
    }

    pub fn lock_seat(&mut self, seat_id: &str) {
        self.locked_seats.insert(seat_id.to_string());
    }

    pub fn unlock_seat(&mut self, seat_id: &str) {
        self.locked_seats.remove(seat_id);
    }

    pub fn record_rotation(&mut self, strategy: &str) {
        self.rotation_history.push(RotationRecord {
            timestamp: now_rfc3339(),
            strategy: strategy.to_string(),
        });
    }
}
