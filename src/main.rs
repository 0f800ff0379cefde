/*!
# Dailyshot - One Scripture Shot a Day

This file contains the main application flow: it sets up logging, loads the
configuration, wires the store, clock, date controller and shot selector
together, and runs the requested command.

## Usage

```text
dailyshot [OPTIONS] [COMMAND]

Commands:
  today      Show today's shot (default)
  draw       Draw a random shot not yet used this year
  remaining  Count the shots left before the pool renews
  reset      Mark every shot as unused for this year
  list       List every shot in the catalog
  show       Show a single shot by id
  debug      Inspect or drive the simulated date

Options:
  -v, --verbose              Print verbose output
      --log-format <FORMAT>  Log format (text or json)
      --json                 Print results as JSON
      --ephemeral            Keep all state in memory for this run only
      --today <DATE>         Pretend the real date is DATE (YYYY-MM-DD)
```

## Configuration

- `DAILYSHOT_DB`: SQLite store location (defaults to ~/.local/share/dailyshot/dailyshot.db)
- `DAILYSHOT_CATALOG`: JSON catalog replacing the embedded one
- `DAILYSHOT_LOG_FORMAT`: `text` or `json`
- `RUST_LOG`: Overrides the log filter
*/

use clap::Parser;
use dailyshot::catalog::Catalog;
use dailyshot::cli::CliArgs;
use dailyshot::clock::{Clock, FixedClock, SystemClock};
use dailyshot::config::Config;
use dailyshot::constants::{
    LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME, VERBOSE_LOG_LEVEL,
};
use dailyshot::debug_date::DateController;
use dailyshot::errors::AppResult;
use dailyshot::ops;
use dailyshot::shots::ShotSelector;
use dailyshot::store::{KeyValueStore, MemoryStore, SqliteStore};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Installs the global tracing subscriber. Logs always go to stderr so stdout
/// carries only command output.
fn init_tracing(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == LOG_FORMAT_JSON {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// The main entry point for the dailyshot application.
///
/// # Errors
///
/// Returns configuration errors, store errors, catalog errors and the
/// invalid-state error from `debug next-day` while debug mode is off.
#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();

    let mut config = Config::load()?;
    if let Some(format) = &args.log_format {
        config.log_format = format.clone();
    }
    if args.verbose {
        config.log_level = VERBOSE_LOG_LEVEL.to_string();
    }
    config.validate()?;

    init_tracing(&config.log_format, &config.log_level);

    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %Uuid::new_v4()
    );

    let result = run(&args, &config).instrument(span).await;
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn run(args: &CliArgs, config: &Config) -> AppResult<()> {
    info!("Starting dailyshot");
    debug!("CLI arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let clock: Arc<dyn Clock> = match args.today {
        Some(date) => Arc::new(FixedClock::new(date)),
        None => Arc::new(SystemClock),
    };

    let store: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&config.db_path)?)
    };

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::embedded()?,
    };

    let dates = Arc::new(DateController::new(store.clone(), clock));
    let shots = ShotSelector::new(catalog, store, dates.clone());

    let outcome = ops::execute(&args.command(), &shots, &dates).await?;

    if args.json {
        println!("{}", outcome.render_json()?);
    } else {
        println!("{}", outcome.render_text());
    }

    info!("Done");
    Ok(())
}
