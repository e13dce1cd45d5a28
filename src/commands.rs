use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};

use crate::chat::{
    ChatClient, ClientConfig, Conversation, ANALYST_PROMPT, PRODUCTIVITY_PROMPT,
};
use crate::cli::{
    AskArgs, CliCommand, MatrixAction, MatrixArgs, SetArgs, SettingsArgs, SlotArgs, SuggestArgs,
};
use crate::config::AppConfig;
use crate::core::codec;
use crate::core::snapshot::{parse_time_label, HEADERS};
use crate::core::{Quadrant, Schedule, ScheduleService, Settings};

const SUGGESTION_REQUEST: &str = "Please analyze my weekly summary above and:\n\
1. Identify any overloads or conflicts.\n\
2. Recommend how to rebalance or reschedule tasks.\n\
3. Offer two concrete time-management tips based on their priority mix and categories.";

pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, mut writer: W) -> Result<()> {
    tracing::debug!(?command, data_dir = %config.data_dir().display(), "running command");
    match command {
        CliCommand::Show => handle_show(config, &mut writer),
        CliCommand::Set(args) => handle_set(config, &args, &mut writer),
        CliCommand::Clear(args) => handle_clear(config, &args, &mut writer),
        CliCommand::NewWeek => handle_new_week(config, &mut writer),
        CliCommand::Matrix(args) => handle_matrix(config, &args, &mut writer),
        CliCommand::Report => handle_report(config, &mut writer),
        CliCommand::Settings(args) => handle_settings(config, &args, &mut writer),
        CliCommand::Suggest(args) => {
            let client = chat_client()?;
            weekgrid_chat::run_blocking(handle_suggest(config, &client, &args, &mut writer))?
        }
        CliCommand::Ask(args) => {
            let client = chat_client()?;
            weekgrid_chat::run_blocking(handle_ask(&client, &args, &mut writer))?
        }
    }
}

fn chat_client() -> Result<ChatClient> {
    ChatClient::from_env(ClientConfig::default()).context("chat service unavailable")
}

fn open(config: &AppConfig) -> Result<ScheduleService> {
    ScheduleService::open(config.clone()).map_err(|err| {
        if ScheduleService::is_malformed_tasks(&err) {
            err.context("Task document is unreadable; run `weekgrid new-week` to start over")
        } else {
            err
        }
    })
}

fn resolve_row(service: &ScheduleService, slot: &SlotArgs) -> Result<usize> {
    let time = parse_time_label(&slot.time)?;
    Ok(service.schedule().row_for_time(time)?)
}

fn handle_show<W: Write>(config: &AppConfig, mut writer: W) -> Result<()> {
    let service = open(config)?;
    write!(writer, "{}", GridView(service.schedule()))?;
    Ok(())
}

fn handle_set<W: Write>(config: &AppConfig, args: &SetArgs, mut writer: W) -> Result<()> {
    let mut service = open(config)?;
    let row = resolve_row(&service, &args.slot)?;
    let stored = service.edit_cell(row, args.slot.day, &args.text.join(" "))?;
    service.save()?;

    let label = service.schedule().time_label(row).unwrap_or_default();
    match stored {
        Some(record) => writeln!(
            writer,
            "Saved {} {}: {}",
            record.day,
            label,
            codec::encode(record.category, &record.title)
        )?,
        None => writeln!(writer, "Cleared {} {}", args.slot.day, label)?,
    }
    Ok(())
}

fn handle_clear<W: Write>(config: &AppConfig, args: &SlotArgs, mut writer: W) -> Result<()> {
    let mut service = open(config)?;
    let row = resolve_row(&service, args)?;
    service.clear_cell(row, args.day)?;
    service.save()?;

    let label = service.schedule().time_label(row).unwrap_or_default();
    writeln!(writer, "Cleared {} {}", args.day, label)?;
    Ok(())
}

fn handle_new_week<W: Write>(config: &AppConfig, mut writer: W) -> Result<()> {
    let mut service = match ScheduleService::open(config.clone()) {
        Ok(service) => service,
        Err(err) if ScheduleService::is_malformed_tasks(&err) => {
            tracing::warn!(error = %format!("{err:#}"), "discarding unreadable task document");
            ScheduleService::open_blank(config.clone())
        }
        Err(err) => return Err(err),
    };
    let dropped = service.store().len();
    service.start_blank_week()?;
    writeln!(writer, "Started a blank week ({})", SummaryLine::removed(dropped))?;
    Ok(())
}

fn handle_matrix<W: Write>(config: &AppConfig, args: &MatrixArgs, mut writer: W) -> Result<()> {
    let mut service = open(config)?;
    let (title, updated) = match &args.action {
        None => {
            write_matrix(&service, &mut writer)?;
            return Ok(());
        }
        Some(MatrixAction::Move(args)) => {
            let title = args.title.joined();
            let updated = service.move_to_quadrant(&title, args.quadrant)?;
            (title, updated)
        }
        Some(MatrixAction::ToggleImportant(args)) => {
            let title = args.joined();
            let updated = service.toggle_important(&title)?;
            (title, updated)
        }
        Some(MatrixAction::ToggleUrgent(args)) => {
            let title = args.joined();
            let updated = service.toggle_urgent(&title)?;
            (title, updated)
        }
    };
    writeln!(writer, "{}", SummaryLine::updated(updated, &title))?;
    Ok(())
}

fn write_matrix<W: Write>(service: &ScheduleService, mut writer: W) -> Result<()> {
    let matrix = service.priority_matrix();
    for quadrant in Quadrant::ALL {
        writeln!(writer, "{}:", quadrant)?;
        let titles = matrix.titles(quadrant);
        if titles.is_empty() {
            writeln!(writer, "  (none)")?;
        }
        for title in titles {
            writeln!(writer, "  - {}", title)?;
        }
    }
    Ok(())
}

fn handle_report<W: Write>(config: &AppConfig, mut writer: W) -> Result<()> {
    let service = open(config)?;
    write!(writer, "{}", service.weekly_report().render())?;
    Ok(())
}

fn handle_settings<W: Write>(config: &AppConfig, args: &SettingsArgs, mut writer: W) -> Result<()> {
    let path = config.settings_path();
    let mut settings = Settings::load(&path);
    if args.has_changes() {
        if let Some(theme) = args.theme {
            settings.app_theme = theme;
        }
        if let Some(enabled) = args.notifications {
            settings.enable_notifications = enabled;
        }
        settings
            .save(&path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        writeln!(writer, "Settings saved")?;
    }
    writeln!(
        writer,
        "Notifications: {}",
        if settings.enable_notifications { "enabled" } else { "disabled" }
    )?;
    writeln!(writer, "Theme: {}", settings.app_theme)?;
    Ok(())
}

/// Review the week with the assistant, then ask each follow-up in the same conversation.
pub async fn handle_suggest<W: Write>(
    config: &AppConfig,
    client: &ChatClient,
    args: &SuggestArgs,
    mut writer: W,
) -> Result<()> {
    let report = open(config)?.weekly_report();

    if args.hours {
        let outcome = client
            .chat_completion(ANALYST_PROMPT, &report.hours_prompt())
            .await;
        writeln!(writer, "{}", outcome)?;
        return Ok(());
    }

    let mut conversation = Conversation::new(PRODUCTIVITY_PROMPT);
    conversation.push_user(report.render());
    conversation.push_user(SUGGESTION_REQUEST);
    let mut outcome = client.continue_conversation(&mut conversation).await;
    writeln!(writer, "{}", outcome)?;

    for question in &args.follow_up {
        if !outcome.is_reply() {
            break;
        }
        writeln!(writer, "\n[You]: {}", question)?;
        conversation.push_user(question.as_str());
        outcome = client.continue_conversation(&mut conversation).await;
        writeln!(writer, "{}", outcome)?;
    }
    Ok(())
}

pub async fn handle_ask<W: Write>(client: &ChatClient, args: &AskArgs, mut writer: W) -> Result<()> {
    let outcome = client.chat(&args.text.join(" ")).await;
    writeln!(writer, "{}", outcome)?;
    Ok(())
}

/// Fixed-width rendering of the week grid.
struct GridView<'a>(&'a Schedule);

impl fmt::Display for GridView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.0.rows();
        let widths: Vec<usize> = (0..HEADERS.len())
            .map(|column| {
                rows.iter()
                    .map(|row| row[column].chars().count())
                    .chain(std::iter::once(HEADERS[column].len()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let header: Vec<&str> = HEADERS.to_vec();
        write_row(f, &header, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(f, &rule, &widths)?;
        for row in rows {
            write_row(f, row.as_slice(), &widths)?;
        }
        Ok(())
    }
}

fn write_row<S: AsRef<str>>(f: &mut fmt::Formatter<'_>, cells: &[S], widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    writeln!(f, "{}", line.join(" | ").trim_end())
}

enum SummaryLine<'a> {
    Removed(usize),
    NoneRemoved,
    Updated(usize, &'a str),
    NoneMatched(&'a str),
}

impl<'a> SummaryLine<'a> {
    fn removed(count: usize) -> Self {
        if count > 0 {
            SummaryLine::Removed(count)
        } else {
            SummaryLine::NoneRemoved
        }
    }

    fn updated(count: usize, title: &'a str) -> Self {
        if count > 0 {
            SummaryLine::Updated(count, title)
        } else {
            SummaryLine::NoneMatched(title)
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for SummaryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Removed(count) => write!(f, "removed {} task{}", count, plural(*count)),
            SummaryLine::NoneRemoved => write!(f, "no tasks removed"),
            SummaryLine::Updated(count, title) => {
                write!(f, "Updated {} task{} titled '{}'", count, plural(*count), title)
            }
            SummaryLine::NoneMatched(title) => write!(f, "No tasks titled '{}'", title),
        }
    }
}
