//! Homework data types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format of the `date_updated` field.
pub const DATE_UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single submitted assignment as reported by Practicum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Homework {
    pub id: i64,
    pub status: String,
    pub homework_name: String,
    pub reviewer_comment: String,
    pub date_updated: String,
    pub lesson_name: String,
}

/// Homework records extracted from a validated envelope.
///
/// Records stay untyped here: the live API is looser than [`Homework`],
/// and only the fields the parser reads are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeworkBatch {
    /// Records in the order the API returned them (newest first).
    pub homeworks: Vec<Value>,

    /// Server time of the response, when present and an integer.
    pub current_date: Option<i64>,
}

impl HomeworkBatch {
    /// The record whose status is reported this cycle.
    #[must_use]
    pub fn latest(&self) -> Option<&Value> {
        self.homeworks.first()
    }

    /// Checks if the response carried no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.homeworks.is_empty()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.homeworks.len()
    }
}
