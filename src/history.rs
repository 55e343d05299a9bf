use std::collections::{BTreeMap, BTreeSet};

use crate::chart::ChartState;
use crate::model::{Classroom, Student};

pub const MAX_HISTORY_STEPS: usize = 20;

/// One undo step: an owned copy of everything an edit can touch.
/// Seats are deliberately absent — they only change together with the
/// classroom record, and the cleared arrangement in the same record
/// keeps the pair consistent across undo.
#[derive(Debug, Clone)]
struct Snapshot {
    classroom: Option<Classroom>,
    students: Vec<Student>,
    arrangement: BTreeMap<String, String>,
    locked_seats: BTreeSet<String>,
}

impl Snapshot {
    fn capture(chart: &ChartState) -> Self {
        Snapshot {
            classroom: chart.classroom.clone(),
            students: chart.students.clone(),
            arrangement: chart.arrangement.clone(),
            locked_seats: chart.locked_seats.clone(),
        }
    }

    fn apply(self, chart: &mut ChartState) {
        chart.classroom = self.classroom;
        chart.students = self.students;
        chart.arrangement = self.arrangement;
        chart.locked_seats = self.locked_seats;
    }
}

/// Bounded undo/redo over chart snapshots. Callers snapshot exactly
/// once per mutating operation, before mutating.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    /// Pushes the current state onto the undo stack, evicting the
    /// oldest record past the cap. Any new edit invalidates prior
    /// redo branches, so the redo stack is cleared unconditionally.
    pub fn snapshot(&mut self, chart: &ChartState) {
        Self::push_capped(&mut self.undo_stack, Snapshot::capture(chart));
        self.redo_stack.clear();
    }

    /// Restores the most recent snapshot, parking the current state on
    /// the redo stack. Returns false when there is nothing to undo.
    pub fn undo(&mut self, chart: &mut ChartState) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        Self::push_capped(&mut self.redo_stack, Snapshot::capture(chart));
        snapshot.apply(chart);
        true
    }

    pub fn redo(&mut self, chart: &mut ChartState) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        Self::push_capped(&mut self.undo_stack, Snapshot::capture(chart));
        snapshot.apply(chart);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    // The cap applies on every push path, the redo path included.
    fn push_capped(stack: &mut Vec<Snapshot>, snapshot: Snapshot) {
        stack.push(snapshot);
        if stack.len() > MAX_HISTORY_STEPS {
            stack.remove(0);
        }
    }
}
