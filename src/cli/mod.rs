use crate::constants::{APP_DESCRIPTION, DATE_FORMAT_ISO, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// One scripture shot a day, no repeats until the pool runs dry
#[derive(Parser, Debug)]
#[clap(name = "dailyshot", about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log format (text or json); overrides DAILYSHOT_LOG_FORMAT
    #[clap(long, global = true, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: Option<String>,

    /// Print results as JSON
    #[clap(long, global = true)]
    pub json: bool,

    /// Keep all state in memory for this run only
    #[clap(long, global = true)]
    pub ephemeral: bool,

    /// Pretend the real date is DATE (format: YYYY-MM-DD)
    #[clap(long, global = true, value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show today's shot (default)
    Today,
    /// Draw a random shot not yet used this year
    Draw,
    /// Count the shots left before the pool renews
    Remaining,
    /// Mark every shot as unused for this year
    Reset,
    /// List every shot in the catalog
    List,
    /// Show a single shot by id
    Show {
        /// Shot id
        id: u32,
    },
    /// Inspect or drive the simulated date
    #[clap(name = "debug")]
    DebugDate {
        #[clap(subcommand)]
        action: DebugCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    /// Show debug mode, offset, effective date and remaining shots
    Status,
    /// Enable debug mode at offset 0
    Enable,
    /// Disable debug mode and forget the offset
    Disable,
    /// Advance the simulated date by one day
    NextDay,
    /// Return the simulated date to today
    ResetDate,
    /// Store a day offset directly
    SetOffset {
        /// Number of days added to the real date
        offset: u32,
    },
}

impl CliArgs {
    /// The command to run, defaulting to today's shot.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Today)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT_ISO)
        .map_err(|e| format!("Invalid date format '{}': {}", raw, e))
}
