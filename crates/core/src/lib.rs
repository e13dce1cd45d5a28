pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod matrix;
pub mod model;
pub mod report;
pub mod services;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use codec::CellEntry;
pub use config::AppConfig;
pub use error::{PersistenceError, ScheduleError};
pub use matrix::{PriorityMatrix, Quadrant};
pub use model::*;
pub use report::WeeklyReport;
pub use services::ScheduleService;
pub use settings::{Settings, Theme};
pub use snapshot::{Schedule, SnapshotStore};
pub use store::TaskStore;
