//! Effective-date control and day simulation.
//!
//! The [`DateController`] decides which calendar day counts as "today" for every
//! daily lookup. Normally that is the real local date. With debug mode enabled, a
//! persisted day offset is added on top, which lets a developer walk through
//! day rollovers without waiting for midnight. Whenever the offset changes, every
//! per-day shot cache is dropped so a stale day can never be served again.
//!
//! # States
//!
//! - Disabled: offset ignored, effective date = real date. Initial state.
//! - Enabled(n): effective date = real date + n days.
//!
//! `enable_debug_mode` enters Enabled(0), `disable_debug_mode` returns to Disabled
//! and forgets the offset, `simulate_next_day` moves Enabled(n) to Enabled(n+1),
//! and `reset_debug_date` forces the offset back to 0 in either state.

use crate::clock::Clock;
use crate::constants::{
    DAILY_SHOT_KEY_PREFIX, DEBUG_DATE_OFFSET_KEY, DEBUG_MODE_ENABLED_VALUE, DEBUG_MODE_KEY,
    EFFECTIVE_DATE_DISPLAY_FORMAT,
};
use crate::errors::{AppError, AppResult};
use crate::shots::ShotSelector;
use crate::store::KeyValueStore;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Builds the day-cache key for `date`.
///
/// The month component is zero-based (January is `0`), which keeps keys written by
/// earlier installs valid.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dailyshot::debug_date::daily_shot_key;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(daily_shot_key(date), "daily_shot_2024_2_9");
/// ```
pub fn daily_shot_key(date: NaiveDate) -> String {
    format!(
        "{}{}_{}_{}",
        DAILY_SHOT_KEY_PREFIX,
        date.year(),
        date.month0(),
        date.day()
    )
}

/// Persisted debug override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugDateState {
    pub enabled: bool,
    /// Ignored while `enabled` is false.
    pub day_offset: u32,
}

/// Read-only snapshot for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub enabled: bool,
    pub day_offset: u32,
    pub effective_date_display: String,
    pub remaining_shots: usize,
}

/// Owns the debug date state and computes the effective "today".
pub struct DateController {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl DateController {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The real calendar date, never shifted by the debug offset.
    pub fn real_today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Whether debug mode is on. Unset or unreadable counts as off.
    pub async fn is_debug_mode_enabled(&self) -> bool {
        match self.store.get(DEBUG_MODE_KEY).await {
            Ok(value) => value.as_deref() == Some(DEBUG_MODE_ENABLED_VALUE),
            Err(e) => {
                warn!("Could not read debug mode flag, assuming disabled: {}", e);
                false
            }
        }
    }

    /// Turns debug mode on, starting from offset 0.
    ///
    /// Calling this while already enabled keeps the current offset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the flag or offset cannot be written.
    pub async fn enable_debug_mode(&self) -> AppResult<()> {
        if self.is_debug_mode_enabled().await {
            debug!("Debug mode already enabled");
            return Ok(());
        }

        self.store
            .multi_remove(&[DEBUG_DATE_OFFSET_KEY.to_string()])
            .await?;
        self.store
            .set(DEBUG_MODE_KEY, DEBUG_MODE_ENABLED_VALUE)
            .await?;
        info!("Debug mode enabled");
        Ok(())
    }

    /// Turns debug mode off and forgets the stored offset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the keys cannot be removed.
    pub async fn disable_debug_mode(&self) -> AppResult<()> {
        self.store
            .multi_remove(&[
                DEBUG_MODE_KEY.to_string(),
                DEBUG_DATE_OFFSET_KEY.to_string(),
            ])
            .await?;
        info!("Debug mode disabled");
        Ok(())
    }

    /// The stored day offset. Unset, unreadable or malformed counts as 0.
    pub async fn debug_date_offset(&self) -> u32 {
        match self.store.get(DEBUG_DATE_OFFSET_KEY).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|e| {
                warn!("Ignoring malformed day offset '{}': {}", raw, e);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Could not read day offset, using 0: {}", e);
                0
            }
        }
    }

    /// Stores a new day offset. Caches are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the offset cannot be written.
    pub async fn set_debug_date_offset(&self, offset: u32) -> AppResult<()> {
        self.store
            .set(DEBUG_DATE_OFFSET_KEY, &offset.to_string())
            .await?;
        debug!("Day offset set to {}", offset);
        Ok(())
    }

    /// Current persisted debug state.
    pub async fn state(&self) -> DebugDateState {
        DebugDateState {
            enabled: self.is_debug_mode_enabled().await,
            day_offset: self.debug_date_offset().await,
        }
    }

    /// Advances the simulated date by one day and drops every day cache.
    ///
    /// Returns the new offset.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidState` if debug mode is disabled; the offset is left as is
    /// - `AppError::Store` if the new offset cannot be written
    pub async fn simulate_next_day(&self) -> AppResult<u32> {
        if !self.is_debug_mode_enabled().await {
            return Err(AppError::InvalidState(
                "debug mode is not enabled; enable it before simulating the next day"
                    .to_string(),
            ));
        }

        let offset = self.debug_date_offset().await.saturating_add(1);
        self.set_debug_date_offset(offset).await?;
        self.clear_daily_shot_cache().await;

        info!("Simulated next day, offset is now {}", offset);
        Ok(offset)
    }

    /// Sets the offset back to 0 and drops every day cache, whatever the mode.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the offset cannot be written.
    pub async fn reset_debug_date(&self) -> AppResult<()> {
        self.set_debug_date_offset(0).await?;
        self.clear_daily_shot_cache().await;
        info!("Debug date reset to today");
        Ok(())
    }

    /// The date all daily logic runs against.
    pub async fn effective_date(&self) -> NaiveDate {
        let today = self.real_today();
        if !self.is_debug_mode_enabled().await {
            return today;
        }
        shift(today, self.debug_date_offset().await)
    }

    /// Day-cache key for the effective date.
    pub async fn effective_date_key(&self) -> String {
        daily_shot_key(self.effective_date().await)
    }

    /// Snapshot of the debug state plus the selector's remaining count.
    ///
    /// Never fails: an unreadable remaining count is reported as 0.
    pub async fn current_debug_info(&self, shots: &ShotSelector) -> DebugInfo {
        let state = self.state().await;
        let remaining_shots = match shots.remaining_shots().await {
            Ok(remaining) => remaining,
            Err(e) => {
                error!("Could not count remaining shots: {}", e);
                0
            }
        };

        let effective = if state.enabled {
            shift(self.real_today(), state.day_offset)
        } else {
            self.real_today()
        };

        DebugInfo {
            enabled: state.enabled,
            day_offset: state.day_offset,
            effective_date_display: effective.format(EFFECTIVE_DATE_DISPLAY_FORMAT).to_string(),
            remaining_shots,
        }
    }

    /// Deletes every day-cache key. Failures are logged, never returned.
    ///
    /// Returns how many keys were removed.
    async fn clear_daily_shot_cache(&self) -> usize {
        let keys = match self.store.all_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Could not list keys to clear daily shot cache: {}", e);
                return 0;
            }
        };

        let cached: Vec<String> = keys
            .into_iter()
            .filter(|key| key.starts_with(DAILY_SHOT_KEY_PREFIX))
            .collect();
        if cached.is_empty() {
            return 0;
        }

        match self.store.multi_remove(&cached).await {
            Ok(()) => {
                debug!("Cleared {} cached daily shots", cached.len());
                cached.len()
            }
            Err(e) => {
                error!("Could not clear daily shot cache: {}", e);
                0
            }
        }
    }
}

fn shift(date: NaiveDate, offset: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MAX)
}
