//! Source of the real calendar date.
//!
//! Both the shot selector and the date controller read "today" through a shared
//! [`Clock`], so tests can pin the date and exercise year rollover without waiting.

use chrono::{Local, NaiveDate};
use std::sync::RwLock;

/// Trait defining where the real current date comes from.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dailyshot::clock::{Clock, FixedClock};
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
/// assert_eq!(clock.today().to_string(), "2024-12-31");
/// ```
pub trait Clock: Send + Sync {
    /// The real (never simulated) local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date that can be moved by hand.
#[derive(Debug)]
pub struct FixedClock {
    date: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: RwLock::new(date),
        }
    }

    /// Moves the clock to `date`.
    pub fn set(&self, date: NaiveDate) {
        match self.date.write() {
            Ok(mut guard) => *guard = date,
            Err(poisoned) => *poisoned.into_inner() = date,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.date.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
