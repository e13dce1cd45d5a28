pub mod cli;
pub mod commands;
pub mod logging;

pub use weekgrid_chat as chat;
pub use weekgrid_core as core;
pub use weekgrid_core::config;
pub use weekgrid_core::AppConfig;
