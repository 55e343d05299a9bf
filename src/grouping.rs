use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::chart::ChartState;

/// Auto-group strategies place currently-unassigned students onto
/// currently-free, unlocked seats in seat-generation (row-major)
/// order. Only the student ordering differs per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStrategy {
    Random,
    Name,
    Gender,
    Performance,
    Rotate,
}

impl GroupStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "random" => Some(Self::Random),
            "name" => Some(Self::Name),
            "gender" => Some(Self::Gender),
            "performance" => Some(Self::Performance),
            "rotate" => Some(Self::Rotate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Name => "name",
            Self::Gender => "gender",
            Self::Performance => "performance",
            Self::Rotate => "rotate",
        }
    }
}

/// Rotation strategies redistribute existing assignments among seats.
/// Locked seats and their occupants sit out of every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateStrategy {
    Rows,
    Clusters,
    Shuffle,
}

impl RotateStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rows" => Some(Self::Rows),
            "clusters" => Some(Self::Clusters),
            "shuffle" => Some(Self::Shuffle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Clusters => "clusters",
            Self::Shuffle => "shuffle",
        }
    }
}

fn eligible_seat_ids(chart: &ChartState) -> Vec<String> {
    chart
        .seats
        .iter()
        .filter(|s| !chart.arrangement.contains_key(&s.id) && !chart.is_locked(&s.id))
        .map(|s| s.id.clone())
        .collect()
}

fn eligible_student_ids(chart: &ChartState) -> Vec<String> {
    let seated: Vec<&String> = chart.arrangement.values().collect();
    chart
        .students
        .iter()
        .filter(|s| !seated.iter().any(|sid| **sid == s.id))
        .map(|s| s.id.clone())
        .collect()
}

/// Applies an auto-group strategy. Returns the number of assignments
/// made (or, for `rotate`, the number of assignments shifted).
pub fn auto_group(chart: &mut ChartState, strategy: GroupStrategy) -> usize {
    let free_seats = eligible_seat_ids(chart);

    if strategy == GroupStrategy::Rotate {
        // Best-effort shift: walk existing assignments in map order and
        // move each occupant to the next free seat, one free seat per
        // assignment. Not a derangement; runs dry when free seats do.
        // Locked seats keep their occupants.
        let existing: Vec<(String, String)> = chart
            .arrangement
            .iter()
            .filter(|(seat_id, _)| !chart.is_locked(seat_id))
            .map(|(seat, student)| (seat.clone(), student.clone()))
            .collect();
        let mut moved = 0;
        for ((_, student_id), seat_id) in existing.iter().zip(free_seats.iter()) {
            chart.assign(student_id, seat_id);
            moved += 1;
        }
        return moved;
    }

    let mut students = eligible_student_ids(chart);
    if strategy == GroupStrategy::Random {
        students.shuffle(&mut thread_rng());
    } else {
        // Stable sort: ties keep roster order. The labels are opaque
        // strings; "performance" compares grade labels lexicographically,
        // not numerically.
        students.sort_by_key(|id| {
            chart
                .student(id)
                .map(|s| match strategy {
                    GroupStrategy::Name => s.name.clone(),
                    GroupStrategy::Gender => s.group.clone(),
                    _ => s.grade.clone(),
                })
                .unwrap_or_default()
        });
    }

    let mut assigned = 0;
    for (student_id, seat_id) in students.iter().zip(free_seats.iter()) {
        chart.assign(student_id, seat_id);
        assigned += 1;
    }
    assigned
}

/// Assignments a rotation is allowed to touch: entries whose seat
/// exists and is not locked, in map order.
fn movable_entries(chart: &ChartState) -> Vec<(String, String)> {
    chart
        .arrangement
        .iter()
        .filter(|(seat_id, _)| !chart.is_locked(seat_id) && chart.seat(seat_id).is_some())
        .map(|(seat, student)| (seat.clone(), student.clone()))
        .collect()
}

/// Applies a rotation strategy over the current arrangement and
/// appends the audit record. Locked assignments are left untouched.
pub fn rotate_seats(chart: &mut ChartState, strategy: RotateStrategy) {
    let entries = movable_entries(chart);
    match strategy {
        RotateStrategy::Shuffle => shuffle_entries(chart, entries),
        RotateStrategy::Rows => rotate_by_rows(chart, entries),
        RotateStrategy::Clusters => rotate_by_clusters(chart, entries),
    }
    chart.record_rotation(strategy.name());
}

/// Uniformly permutes the students of the given entries across the
/// same seats. Seat and student multisets are preserved by
/// construction; only the pairing changes.
fn shuffle_entries(chart: &mut ChartState, entries: Vec<(String, String)>) {
    let seat_ids: Vec<String> = entries.iter().map(|(s, _)| s.clone()).collect();
    let mut student_ids: Vec<String> = entries.into_iter().map(|(_, s)| s).collect();
    student_ids.shuffle(&mut thread_rng());
    for (seat_id, student_id) in seat_ids.into_iter().zip(student_ids) {
        chart.arrangement.insert(seat_id, student_id);
    }
}

/// Shifts each row's occupants into the next occupied row (last wraps
/// to first), pairing seats by their column position within the row
/// and truncating to the shorter row. Unequal rows can drop students
/// and leave stale entries in the longer row; that mirrors the
/// documented contract rather than being patched over here.
fn rotate_by_rows(chart: &mut ChartState, entries: Vec<(String, String)>) {
    let mut rows: BTreeMap<u32, Vec<(u32, String, String)>> = BTreeMap::new();
    for (seat_id, student_id) in entries {
        if let Some(seat) = chart.seat(&seat_id) {
            rows.entry(seat.row)
                .or_default()
                .push((seat.col, seat_id.clone(), student_id));
        }
    }
    for row in rows.values_mut() {
        row.sort_by_key(|(col, _, _)| *col);
    }

    let row_keys: Vec<u32> = rows.keys().copied().collect();
    for i in 0..row_keys.len() {
        let current = &rows[&row_keys[i]];
        let next = &rows[&row_keys[(i + 1) % row_keys.len()]];
        let pairs: Vec<(String, String)> = current
            .iter()
            .zip(next.iter())
            .map(|((_, _, student_id), (_, next_seat_id, _))| {
                (next_seat_id.clone(), student_id.clone())
            })
            .collect();
        for (seat_id, student_id) in pairs {
            chart.arrangement.insert(seat_id, student_id);
        }
    }
}

/// Shuffles students within 2x2 seat blocks: each seat belongs to the
/// cluster keyed by (row/2, col/2) and occupants only ever trade
/// places inside their own cluster.
fn rotate_by_clusters(chart: &mut ChartState, entries: Vec<(String, String)>) {
    let mut clusters: BTreeMap<(u32, u32), Vec<(String, String)>> = BTreeMap::new();
    for (seat_id, student_id) in entries {
        if let Some(seat) = chart.seat(&seat_id) {
            clusters
                .entry((seat.row / 2, seat.col / 2))
                .or_default()
                .push((seat_id.clone(), student_id));
        }
    }
    for (_, entries) in clusters {
        shuffle_entries(chart, entries);
    }
}
