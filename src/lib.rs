/*!
# Dailyshot

Dailyshot shows one "shot" a day: a short punchline tied to a scripture
reference. Within a calendar year no shot repeats until the whole catalog has
been shown, after which the pool renews and drawing starts over.

## Core Features

- Exactly one shot per day, cached so repeated lookups agree
- Year-scoped ledger of used shots with automatic renewal
- Debug mode that shifts the effective date by a day offset, to exercise day
  rollover without waiting for midnight
- SQLite-backed key-value persistence, or an in-memory store for tests

## Architecture

- `catalog`: The fixed list of shot records
- `store`: Asynchronous key-value persistence
- `clock`: Source of the real calendar date
- `debug_date`: Effective date and day simulation (`DateController`)
- `shots`: Daily selection and the used-shots ledger (`ShotSelector`)
- `ops`: User-facing operations behind the CLI
- `cli`, `config`, `errors`, `constants`: Application plumbing

Components are wired explicitly: one store, one clock, one `DateController` and
one `ShotSelector` are built at startup and passed to whoever needs them.

## Usage Example

```rust,no_run
use std::sync::Arc;
use dailyshot::catalog::Catalog;
use dailyshot::clock::SystemClock;
use dailyshot::debug_date::DateController;
use dailyshot::shots::ShotSelector;
use dailyshot::store::{KeyValueStore, SqliteStore};

#[tokio::main]
async fn main() -> dailyshot::AppResult<()> {
    let store: Arc<dyn KeyValueStore> =
        Arc::new(SqliteStore::open(std::path::Path::new("/tmp/dailyshot.db"))?);
    let dates = Arc::new(DateController::new(store.clone(), Arc::new(SystemClock)));
    let shots = ShotSelector::new(Catalog::embedded()?, store, dates);

    if let Some(shot) = shots.daily_shot().await? {
        println!("{}: {}", shot.reference, shot.punchline);
    }
    Ok(())
}
```
*/

/// The fixed list of shot records
pub mod catalog;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Source of the real calendar date
pub mod clock;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Effective date and day simulation
pub mod debug_date;
/// Error types and utilities for error handling
pub mod errors;
/// User-facing operations
pub mod ops;
/// Daily shot selection and the used-shots ledger
pub mod shots;
/// Key-value persistence
pub mod store;

// Re-export important types for convenience
pub use catalog::{Catalog, ShotRecord};
pub use cli::CliArgs;
pub use config::Config;
pub use debug_date::{DateController, DebugInfo};
pub use errors::{AppError, AppResult};
pub use shots::ShotSelector;
