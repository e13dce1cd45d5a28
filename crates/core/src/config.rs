use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;

static TASKS_FILE: &str = "tasks.json";
static SCHEDULE_FILE: &str = "schedule.json";
static SETTINGS_FILE: &str = "settings.json";
static ENV_DATA_DIR: &str = "WEEKGRID_DATA_DIR";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "weekgrid", "weekgrid"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the data directory using the provided override,
    /// environment variables, the executable's directory, and platform defaults.
    pub fn discover(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        Ok(Self::from_data_dir(data_dir))
    }

    /// Construct [`AppConfig`] directly from a resolved data directory.
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir.join(SCHEDULE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        if !env_dir.trim().is_empty() {
            return Ok(PathBuf::from(env_dir));
        }
    }

    // Documents live next to the executable unless told otherwise.
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return Ok(exe_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    Ok(env::current_dir()?.join(".weekgrid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_override_wins_and_is_created() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("data");
        let config = AppConfig::discover(Some(target.clone())).unwrap();
        assert_eq!(config.data_dir(), target.as_path());
        assert!(target.is_dir());
    }

    #[test]
    fn documents_live_in_the_data_dir() {
        let config = AppConfig::from_data_dir(PathBuf::from("/srv/week"));
        assert_eq!(config.tasks_path(), PathBuf::from("/srv/week/tasks.json"));
        assert_eq!(config.schedule_path(), PathBuf::from("/srv/week/schedule.json"));
        assert_eq!(config.settings_path(), PathBuf::from("/srv/week/settings.json"));
    }
}
