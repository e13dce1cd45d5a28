use std::path::{Path, PathBuf};

use crate::document;
use crate::error::PersistenceError;
use crate::model::{TaskKey, TaskRecord};

/// File-backed collection of [`TaskRecord`]s keyed by `(day, time)`.
///
/// Mutations write through to disk except [`TaskStore::clear`]. The in-memory
/// collection stays authoritative when a save fails, so the caller may retry.
/// Access is single-writer; wrap the store in a lock if several threads mutate it.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
    records: Vec<TaskRecord>,
}

impl TaskStore {
    /// Create an empty store bound to `path`. Nothing is read until [`TaskStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Convenience for `new` followed by `load`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory collection with the backing document.
    ///
    /// A missing file yields an empty collection. On a malformed document the
    /// current collection is left untouched and the error is returned.
    pub fn load(&mut self) -> Result<(), PersistenceError> {
        let loaded: Option<Vec<TaskRecord>> = document::read_json(&self.path)?;
        self.records = loaded.unwrap_or_default();
        tracing::debug!(
            path = %self.path.display(),
            count = self.records.len(),
            "task store loaded"
        );
        Ok(())
    }

    pub fn save(&self) -> Result<(), PersistenceError> {
        document::write_json(&self.path, &self.records)
    }

    /// Insert or update by identity, then save.
    ///
    /// A blank title removes the slot instead of storing an untitled record.
    pub fn upsert(&mut self, record: TaskRecord) -> Result<(), PersistenceError> {
        if !record.has_title() {
            return self.remove(record.key());
        }

        let key = record.key();
        match self.records.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => {
                existing.title = record.title;
                existing.category = record.category;
                existing.is_important = record.is_important;
                existing.is_urgent = record.is_urgent;
                tracing::debug!(slot = %key, "task updated");
            }
            None => {
                tracing::debug!(slot = %key, "task added");
                self.records.push(record);
            }
        }
        self.save()
    }

    /// Delete every record at `key`, then save.
    pub fn remove(&mut self, key: TaskKey) -> Result<(), PersistenceError> {
        let before = self.records.len();
        self.records.retain(|record| record.key() != key);
        tracing::debug!(slot = %key, removed = before - self.records.len(), "task removed");
        self.save()
    }

    /// Empty the collection without saving; pair with an explicit [`TaskStore::save`].
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, key: TaskKey) -> Option<&TaskRecord> {
        self.records.iter().find(|record| record.key() == key)
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set both flags on every record titled `title`, then save.
    ///
    /// Matches by title across all slots, not by identity: two slots sharing a
    /// title are updated together. Returns how many records matched.
    pub fn set_priority_by_title(
        &mut self,
        title: &str,
        is_important: bool,
        is_urgent: bool,
    ) -> Result<usize, PersistenceError> {
        self.update_by_title(title, |record| {
            record.is_important = is_important;
            record.is_urgent = is_urgent;
        })
    }

    /// Flip importance on every record titled `title`, then save.
    pub fn toggle_important_by_title(&mut self, title: &str) -> Result<usize, PersistenceError> {
        self.update_by_title(title, |record| record.is_important = !record.is_important)
    }

    /// Flip urgency on every record titled `title`, then save.
    pub fn toggle_urgent_by_title(&mut self, title: &str) -> Result<usize, PersistenceError> {
        self.update_by_title(title, |record| record.is_urgent = !record.is_urgent)
    }

    fn update_by_title<F>(&mut self, title: &str, mut apply: F) -> Result<usize, PersistenceError>
    where
        F: FnMut(&mut TaskRecord),
    {
        let mut matched = 0usize;
        for record in self.records.iter_mut().filter(|r| r.title == title) {
            apply(record);
            matched += 1;
        }
        if matched == 0 {
            return Ok(0);
        }
        tracing::debug!(title, matched, "bulk update by title");
        self.save()?;
        Ok(matched)
    }
}
