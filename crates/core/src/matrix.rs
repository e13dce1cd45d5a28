//! Importance × urgency quadrants over the stored tasks.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::model::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    ImportantUrgent,
    ImportantNotUrgent,
    NotImportantUrgent,
    NotImportantNotUrgent,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::ImportantUrgent,
        Quadrant::ImportantNotUrgent,
        Quadrant::NotImportantUrgent,
        Quadrant::NotImportantNotUrgent,
    ];

    pub fn from_flags(is_important: bool, is_urgent: bool) -> Self {
        match (is_important, is_urgent) {
            (true, true) => Quadrant::ImportantUrgent,
            (true, false) => Quadrant::ImportantNotUrgent,
            (false, true) => Quadrant::NotImportantUrgent,
            (false, false) => Quadrant::NotImportantNotUrgent,
        }
    }

    /// `(is_important, is_urgent)` for records placed in this quadrant.
    pub fn flags(&self) -> (bool, bool) {
        match self {
            Quadrant::ImportantUrgent => (true, true),
            Quadrant::ImportantNotUrgent => (true, false),
            Quadrant::NotImportantUrgent => (false, true),
            Quadrant::NotImportantNotUrgent => (false, false),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::ImportantUrgent => "Important & Urgent",
            Quadrant::ImportantNotUrgent => "Important & Not Urgent",
            Quadrant::NotImportantUrgent => "Not Important & Urgent",
            Quadrant::NotImportantNotUrgent => "Not Important & Not Urgent",
        }
    }

    fn index(&self) -> usize {
        match self {
            Quadrant::ImportantUrgent => 0,
            Quadrant::ImportantNotUrgent => 1,
            Quadrant::NotImportantUrgent => 2,
            Quadrant::NotImportantNotUrgent => 3,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Distinct task titles per quadrant, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityMatrix {
    quadrants: [Vec<String>; 4],
}

impl PriorityMatrix {
    pub fn from_records(records: &[TaskRecord]) -> Self {
        let mut matrix = Self::default();
        for record in records {
            let bucket = &mut matrix.quadrants
                [Quadrant::from_flags(record.is_important, record.is_urgent).index()];
            if !bucket.iter().any(|title| title == &record.title) {
                bucket.push(record.title.clone());
            }
        }
        matrix
    }

    pub fn titles(&self, quadrant: Quadrant) -> &[String] {
        &self.quadrants[quadrant.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.quadrants.iter().all(Vec::is_empty)
    }
}
