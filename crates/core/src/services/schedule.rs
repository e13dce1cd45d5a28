use anyhow::{Context, Result};

use crate::codec;
use crate::config::AppConfig;
use crate::error::PersistenceError;
use crate::matrix::{PriorityMatrix, Quadrant};
use crate::model::{TaskRecord, Weekday};
use crate::report::WeeklyReport;
use crate::snapshot::{Schedule, SnapshotStore};
use crate::store::TaskStore;

/// Keeps the week grid and the task store in step for UI-level edits.
#[derive(Debug, Clone)]
pub struct ScheduleService {
    config: AppConfig,
    store: TaskStore,
    snapshots: SnapshotStore,
    schedule: Schedule,
}

impl ScheduleService {
    /// Load the task document and the stored grid.
    ///
    /// A malformed task document is an error; a missing or unreadable grid starts
    /// from a blank week.
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = TaskStore::open(config.tasks_path())
            .with_context(|| format!("Failed to load tasks from {}", config.tasks_path().display()))?;
        let snapshots = SnapshotStore::new(config.schedule_path());
        let schedule = snapshots.load_schedule();
        tracing::info!(
            data_dir = %config.data_dir().display(),
            tasks = store.len(),
            "schedule opened"
        );
        Ok(Self {
            config,
            store,
            snapshots,
            schedule,
        })
    }

    /// Start from an empty store and a blank week without reading either document.
    ///
    /// Lets a caller recover from an unreadable task document: nothing is written
    /// until the next save.
    pub fn open_blank(config: AppConfig) -> Self {
        let store = TaskStore::new(config.tasks_path());
        let snapshots = SnapshotStore::new(config.schedule_path());
        Self {
            config,
            store,
            snapshots,
            schedule: Schedule::blank_week(),
        }
    }

    /// Whether an [`ScheduleService::open`] failure came from a malformed task document.
    pub fn is_malformed_tasks(err: &anyhow::Error) -> bool {
        err.downcast_ref::<PersistenceError>()
            .is_some_and(PersistenceError::is_malformed)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Apply a cell edit to the grid and the task store.
    ///
    /// Non-empty text upserts the slot's record; empty text removes it. Priority
    /// flags already set on the slot are carried over to the edited record.
    /// Returns the stored record, if any.
    pub fn edit_cell(&mut self, row: usize, day: Weekday, text: &str) -> Result<Option<TaskRecord>> {
        let key = self.schedule.key_for(row, day)?;
        let text = text.trim();
        self.schedule.set_cell(row, day, text)?;

        let entry = codec::decode(text);
        if entry.is_empty() {
            self.store.remove(key).context("Failed to save tasks")?;
            return Ok(None);
        }

        let (is_important, is_urgent) = self
            .store
            .get(key)
            .map(|existing| (existing.is_important, existing.is_urgent))
            .unwrap_or((false, false));
        let record = TaskRecord::new(key.day, key.time, entry.category, entry.title)
            .with_flags(is_important, is_urgent);
        self.store
            .upsert(record.clone())
            .context("Failed to save tasks")?;
        Ok(Some(record))
    }

    pub fn clear_cell(&mut self, row: usize, day: Weekday) -> Result<()> {
        self.edit_cell(row, day, "").map(|_| ())
    }

    /// Reset to an empty week and persist both documents.
    pub fn start_blank_week(&mut self) -> Result<()> {
        self.store.clear();
        self.schedule = Schedule::blank_week();
        self.save()?;
        tracing::info!("started a blank week");
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.snapshots
            .save_snapshot(self.schedule.rows())
            .context("Failed to save schedule")?;
        self.store.save().context("Failed to save tasks")?;
        Ok(())
    }

    pub fn priority_matrix(&self) -> PriorityMatrix {
        PriorityMatrix::from_records(self.store.records())
    }

    /// Move every record titled `title` into `quadrant`. Returns how many matched.
    pub fn move_to_quadrant(&mut self, title: &str, quadrant: Quadrant) -> Result<usize> {
        let (is_important, is_urgent) = quadrant.flags();
        Ok(self
            .store
            .set_priority_by_title(title, is_important, is_urgent)?)
    }

    pub fn toggle_important(&mut self, title: &str) -> Result<usize> {
        Ok(self.store.toggle_important_by_title(title)?)
    }

    pub fn toggle_urgent(&mut self, title: &str) -> Result<usize> {
        Ok(self.store.toggle_urgent_by_title(title)?)
    }

    pub fn weekly_report(&self) -> WeeklyReport {
        WeeklyReport::from_records(self.store.records())
    }
}
