//! The course enrollment cap.

use crate::model::StudentId;

/// A proposed roster is larger than the configured cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a course can have at most {max} students, got {count}")]
pub struct CapacityExceeded {
    pub max: usize,
    pub count: usize,
}

/// Checks a candidate roster against `max`. The roster must already be free
/// of duplicates.
pub fn check_roster(roster: &[StudentId], max: usize) -> Result<(), CapacityExceeded> {
    let count = roster.len();
    if count > max {
        return Err(CapacityExceeded { max, count });
    }
    Ok(())
}

/// Collapses repeated ids to their first occurrence, keeping order.
pub fn dedup_roster(ids: impl IntoIterator<Item = StudentId>) -> Vec<StudentId> {
    let mut roster: Vec<StudentId> = Vec::new();
    for id in ids {
        if !roster.contains(&id) {
            roster.push(id);
        }
    }
    roster
}
