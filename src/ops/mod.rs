//! User-facing operations.
//!
//! This module maps each CLI command onto the shot selector and date controller
//! and turns the result into something printable, either as text or JSON.

use crate::catalog::ShotRecord;
use crate::cli::{Command, DebugCommand};
use crate::debug_date::{DateController, DebugInfo};
use crate::errors::{AppError, AppResult};
use crate::shots::ShotSelector;
use serde::Serialize;
use tracing::info;

/// Result of one command, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Shot(ShotRecord),
    Shots(Vec<ShotRecord>),
    Remaining {
        remaining: usize,
        total: usize,
    },
    Status {
        #[serde(flatten)]
        info: DebugInfo,
        total: usize,
    },
    Message {
        message: String,
    },
}

impl Outcome {
    fn message(text: impl Into<String>) -> Self {
        Outcome::Message {
            message: text.into(),
        }
    }

    /// Plain text for a terminal.
    pub fn render_text(&self) -> String {
        match self {
            Outcome::Shot(shot) => format_shot(shot),
            Outcome::Shots(shots) => shots
                .iter()
                .map(|shot| format!("{:>4}  {:<24} {}", shot.id, shot.reference, shot.punchline))
                .collect::<Vec<_>>()
                .join("\n"),
            Outcome::Remaining { remaining, total } => {
                format!("{}/{} shots remaining this year", remaining, total)
            }
            Outcome::Status { info, total } => {
                let mut lines = vec![format!(
                    "Debug mode: {}",
                    if info.enabled { "enabled" } else { "disabled" }
                )];
                if info.enabled {
                    lines.push(format!("Day offset: +{}", info.day_offset));
                }
                lines.push(format!("Effective date: {}", info.effective_date_display));
                lines.push(format!("Remaining shots: {}/{}", info.remaining_shots, total));
                lines.join("\n")
            }
            Outcome::Message { message } => message.clone(),
        }
    }

    /// Pretty-printed JSON.
    pub fn render_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn format_shot(shot: &ShotRecord) -> String {
    format!(
        "{}\n\"{}\"\n\n{}",
        shot.reference, shot.verse_text, shot.punchline
    )
}

/// Runs `command` against the injected components.
///
/// # Errors
///
/// - `AppError::EmptyCatalog` when a draw finds no shot at all
/// - `AppError::Catalog` when `show` names an unknown id
/// - `AppError::InvalidState` for `debug next-day` while debug mode is disabled
/// - `AppError::Store` when a ledger or debug-state write fails
pub async fn execute(
    command: &Command,
    shots: &ShotSelector,
    dates: &DateController,
) -> AppResult<Outcome> {
    info!("Running command {:?}", command);

    match command {
        Command::Today => shots
            .daily_shot()
            .await?
            .map(Outcome::Shot)
            .ok_or(AppError::EmptyCatalog),
        Command::Draw => shots
            .random_unused_shot()
            .await?
            .map(Outcome::Shot)
            .ok_or(AppError::EmptyCatalog),
        Command::Remaining => Ok(Outcome::Remaining {
            remaining: shots.remaining_shots().await?,
            total: shots.catalog_size(),
        }),
        Command::Reset => {
            shots.reset_used_shots().await?;
            Ok(Outcome::message("All shots marked as unused for this year"))
        }
        Command::List => Ok(Outcome::Shots(shots.all_shots())),
        Command::Show { id } => shots
            .shot_by_id(*id)
            .map(Outcome::Shot)
            .ok_or_else(|| AppError::Catalog(format!("No shot with id {}", id))),
        Command::DebugDate { action } => execute_debug(action, shots, dates).await,
    }
}

async fn execute_debug(
    action: &DebugCommand,
    shots: &ShotSelector,
    dates: &DateController,
) -> AppResult<Outcome> {
    match action {
        DebugCommand::Status => Ok(Outcome::Status {
            info: dates.current_debug_info(shots).await,
            total: shots.catalog_size(),
        }),
        DebugCommand::Enable => {
            dates.enable_debug_mode().await?;
            Ok(Outcome::message("Debug mode enabled"))
        }
        DebugCommand::Disable => {
            dates.disable_debug_mode().await?;
            Ok(Outcome::message("Debug mode disabled"))
        }
        DebugCommand::NextDay => {
            let offset = dates.simulate_next_day().await?;
            Ok(Outcome::message(format!(
                "Simulated next day (offset +{}); a new shot is ready",
                offset
            )))
        }
        DebugCommand::ResetDate => {
            dates.reset_debug_date().await?;
            Ok(Outcome::message("Simulated date reset to today"))
        }
        DebugCommand::SetOffset { offset } => {
            dates.set_debug_date_offset(*offset).await?;
            Ok(Outcome::message(format!("Day offset set to +{}", offset)))
        }
    }
}
