use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::{Quadrant, Theme, Weekday};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "weekgrid",
    version,
    about = "A weekly planner that keeps an hourly grid and a task list in step.",
    after_help = "Examples:\n  weekgrid                     Show the week (same as `weekgrid show`)\n  weekgrid set mon \"9:00 AM\" Work: Standup\n  weekgrid matrix move important-urgent Standup\n  weekgrid suggest --follow-up \"What about weekends?\""
)]
pub struct Cli {
    /// Override the data directory (defaults to the executable's directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter (e.g. "info", "weekgrid_chat=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Print the week grid (default command)
    Show,
    /// Write a cell; text of the form "Category: Title" sets the category
    Set(SetArgs),
    /// Empty a cell and drop its task
    Clear(SlotArgs),
    /// Drop every task and start from a blank week
    NewWeek,
    /// Show the priority matrix or move tasks between quadrants
    Matrix(MatrixArgs),
    /// Print the weekly summary
    Report,
    /// Ask the assistant to review this week's summary
    Suggest(SuggestArgs),
    /// Ask the assistant a free-form question
    Ask(AskArgs),
    /// Show or update preferences
    Settings(SettingsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SlotArgs {
    /// Day of the week (monday, mon, ...)
    #[arg(value_enum, ignore_case = true, value_name = "DAY")]
    pub day: Weekday,

    /// Time of day ("6:00 AM" or "06:00")
    #[arg(value_name = "TIME")]
    pub time: String,
}

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    #[command(flatten)]
    pub slot: SlotArgs,

    /// Cell text, e.g. "Work: Standup"
    #[arg(value_name = "TEXT", required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    #[command(subcommand)]
    pub action: Option<MatrixAction>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MatrixAction {
    /// Set both flags on every task with this title
    Move(MoveArgs),
    /// Flip importance on every task with this title
    ToggleImportant(TitleArgs),
    /// Flip urgency on every task with this title
    ToggleUrgent(TitleArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    #[arg(value_enum, value_name = "QUADRANT")]
    pub quadrant: Quadrant,

    #[command(flatten)]
    pub title: TitleArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TitleArgs {
    /// Task title (without the category prefix)
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}

impl TitleArgs {
    pub fn joined(&self) -> String {
        self.title.join(" ")
    }
}

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    /// Send the hours-per-category breakdown instead of the full summary
    #[arg(long)]
    pub hours: bool,

    /// Follow-up questions asked after the first reply (repeatable)
    #[arg(long = "follow-up", value_name = "TEXT")]
    pub follow_up: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(value_name = "TEXT", required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Theme: light, dark or system
    #[arg(long, value_name = "THEME")]
    pub theme: Option<Theme>,

    /// Enable or disable notifications
    #[arg(long, value_name = "BOOL")]
    pub notifications: Option<bool>,
}

impl SettingsArgs {
    pub fn has_changes(&self) -> bool {
        self.theme.is_some() || self.notifications.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_multi_word_text() {
        let cli = Cli::parse_from(["weekgrid", "set", "mon", "9:00 AM", "Work:", "Standup"]);
        match cli.command {
            Some(CliCommand::Set(args)) => {
                assert_eq!(args.slot.day, Weekday::Monday);
                assert_eq!(args.slot.time, "9:00 AM");
                assert_eq!(args.text.join(" "), "Work: Standup");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_matrix_move() {
        let cli = Cli::parse_from([
            "weekgrid",
            "--data-dir",
            "/tmp/wg",
            "matrix",
            "move",
            "important-urgent",
            "Gym",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/wg")));
        match cli.command {
            Some(CliCommand::Matrix(MatrixArgs {
                action: Some(MatrixAction::Move(args)),
            })) => {
                assert_eq!(args.quadrant, Quadrant::ImportantUrgent);
                assert_eq!(args.title.joined(), "Gym");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_settings_flags() {
        let cli = Cli::parse_from(["weekgrid", "settings", "--theme", "dark", "--notifications", "false"]);
        match cli.command {
            Some(CliCommand::Settings(args)) => {
                assert_eq!(args.theme, Some(Theme::Dark));
                assert_eq!(args.notifications, Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
