use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};

use crate::document;
use crate::error::{PersistenceError, ScheduleError};
use crate::model::{TaskKey, Weekday};

/// Time label plus one column per weekday.
pub const COLUMNS: usize = 8;
pub const HEADERS: [&str; COLUMNS] = [
    "Time",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const FIRST_HOUR: u32 = 6;
/// 6 AM through midnight inclusive.
const HOURLY_ROWS: u32 = 19;

pub type Row = Vec<String>;

/// Raw grid rows as stored in the snapshot document.
pub type Snapshot = Vec<Row>;

/// Format a time the way row labels show it, e.g. `6:00 AM`, `12:00 AM`.
pub fn format_time_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Parse a row label (`6:00 AM`) or a 24-hour time (`06:00`, `18:30:00`).
pub fn parse_time_label(label: &str) -> Result<NaiveTime, ScheduleError> {
    let trimmed = label.trim();
    let upper = trimmed.to_ascii_uppercase();
    NaiveTime::parse_from_str(&upper, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::TimeLabel(label.to_string()))
}

fn blank_row(time: NaiveTime) -> Row {
    let mut row = vec![String::new(); COLUMNS];
    row[0] = format_time_label(time);
    row
}

/// The editable week grid. Column 0 always carries the generated time labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    rows: Vec<Row>,
}

impl Schedule {
    /// Hourly rows from 6 AM through midnight with empty day cells.
    pub fn blank_week() -> Self {
        let rows = (0..HOURLY_ROWS)
            .map(|offset| {
                let hour = (FIRST_HOUR + offset) % 24;
                blank_row(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
            })
            .collect();
        Self { rows }
    }

    /// Overlay the day columns of stored rows onto a blank week.
    ///
    /// Column 0 and anything beyond the blank week's shape are ignored.
    pub fn from_snapshot(snapshot: &[Row]) -> Self {
        let mut schedule = Self::blank_week();
        for (stored, row) in snapshot.iter().zip(schedule.rows.iter_mut()) {
            for (column, cell) in stored.iter().enumerate().take(COLUMNS).skip(1) {
                row[column] = cell.clone();
            }
        }
        schedule
    }

    pub fn to_snapshot(&self) -> Snapshot {
        self.rows.clone()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn time_label(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|cells| cells[0].as_str())
    }

    pub fn row_time(&self, row: usize) -> Result<NaiveTime, ScheduleError> {
        let label = self.time_label(row).ok_or(ScheduleError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })?;
        parse_time_label(label)
    }

    /// Locate the row whose label matches `time` to the minute.
    pub fn row_for_time(&self, time: NaiveTime) -> Result<usize, ScheduleError> {
        self.rows
            .iter()
            .position(|cells| {
                parse_time_label(&cells[0])
                    .map(|label| label.hour() == time.hour() && label.minute() == time.minute())
                    .unwrap_or(false)
            })
            .ok_or_else(|| ScheduleError::NoRowForTime(format_time_label(time)))
    }

    pub fn key_for(&self, row: usize, day: Weekday) -> Result<TaskKey, ScheduleError> {
        Ok(TaskKey::new(day, self.row_time(row)?))
    }

    pub fn cell(&self, row: usize, day: Weekday) -> Option<&str> {
        self.rows.get(row).map(|cells| cells[day.column()].as_str())
    }

    pub fn set_cell(&mut self, row: usize, day: Weekday, text: &str) -> Result<(), ScheduleError> {
        let rows = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(ScheduleError::RowOutOfRange { row, rows })?;
        cells[day.column()] = text.to_string();
        Ok(())
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::blank_week()
    }
}

/// Snapshot document, kept separate from the task document.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_snapshot(&self, rows: &[Row]) -> Result<(), PersistenceError> {
        document::write_json(&self.path, rows)
    }

    /// Stored rows, or an empty snapshot when the document is missing or unreadable.
    pub fn load_snapshot(&self) -> Snapshot {
        match document::read_json::<Snapshot>(&self.path) {
            Ok(Some(rows)) => rows,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable schedule snapshot");
                Vec::new()
            }
        }
    }

    /// Load the stored grid, starting from a blank week when nothing usable exists.
    pub fn load_schedule(&self) -> Schedule {
        Schedule::from_snapshot(&self.load_snapshot())
    }
}
