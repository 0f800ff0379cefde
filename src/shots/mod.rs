//! Daily shot selection and the used-shots ledger.
//!
//! The [`ShotSelector`] hands out one shot per effective day. Shots are drawn
//! without replacement from the catalog over a calendar year; the ids already
//! shown are kept in a [`UsedShotsLedger`]. When every shot has been used the pool
//! is renewed and drawing starts over.
//!
//! The ledger year always follows the real clock. Simulated days from the
//! [`DateController`] only affect which day-cache key is used.

use crate::catalog::{Catalog, ShotRecord};
use crate::constants::USED_SHOTS_KEY;
use crate::debug_date::DateController;
use crate::errors::AppResult;
use crate::store::KeyValueStore;
use chrono::Datelike;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ids shown so far in one calendar year.
///
/// Persisted as `{"year": 2024, "usedIds": [3, 17]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedShotsLedger {
    pub year: i32,
    pub used_ids: Vec<u32>,
}

impl UsedShotsLedger {
    /// Empty ledger for `year`.
    pub fn fresh(year: i32) -> Self {
        Self {
            year,
            used_ids: Vec::new(),
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.used_ids.contains(&id)
    }

    /// Marks `id` as used. Recording an id twice has no effect.
    pub fn record(&mut self, id: u32) {
        if !self.contains(id) {
            self.used_ids.push(id);
        }
    }

    /// Drops duplicates and ids the catalog no longer knows about.
    fn retain_known(&mut self, catalog: &Catalog) {
        let mut seen = HashSet::with_capacity(self.used_ids.len());
        self.used_ids
            .retain(|id| catalog.contains(*id) && seen.insert(*id));
    }
}

/// Picks one shot uniformly at random.
fn choose_uniform<'a>(available: &[&'a ShotRecord]) -> Option<&'a ShotRecord> {
    available.choose(&mut rand::thread_rng()).copied()
}

/// Hands out the shot of the day.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dailyshot::catalog::Catalog;
/// use dailyshot::clock::SystemClock;
/// use dailyshot::debug_date::DateController;
/// use dailyshot::shots::ShotSelector;
/// use dailyshot::store::{KeyValueStore, MemoryStore};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
///     let dates = Arc::new(DateController::new(store.clone(), Arc::new(SystemClock)));
///     let shots = ShotSelector::new(Catalog::embedded().unwrap(), store, dates);
///
///     let first = shots.daily_shot().await.unwrap();
///     let again = shots.daily_shot().await.unwrap();
///     assert_eq!(first, again);
/// });
/// ```
pub struct ShotSelector {
    catalog: Catalog,
    store: Arc<dyn KeyValueStore>,
    dates: Arc<DateController>,
}

impl ShotSelector {
    pub fn new(catalog: Catalog, store: Arc<dyn KeyValueStore>, dates: Arc<DateController>) -> Self {
        Self {
            catalog,
            store,
            dates,
        }
    }

    /// The shot for the effective day.
    ///
    /// The first call of a day draws an unused shot and caches it under the day
    /// key; later calls that day return the cached record unchanged. If the cache
    /// cannot be read, a shot is drawn directly without consulting it.
    ///
    /// Returns `Ok(None)` only when the catalog is empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the ledger cannot be read or written.
    pub async fn daily_shot(&self) -> AppResult<Option<ShotRecord>> {
        let key = self.dates.effective_date_key().await;

        match self.cached_shot(&key).await {
            Ok(Some(shot)) => {
                debug!("Serving cached shot {} for {}", shot.id, key);
                return Ok(Some(shot));
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Daily shot cache unavailable, drawing directly: {}", e);
                return self.random_unused_shot().await;
            }
        }

        let shot = self.random_unused_shot().await?;
        if let Some(shot) = &shot {
            let payload = serde_json::to_string(shot)?;
            match self.store.set(&key, &payload).await {
                Ok(()) => info!("Cached shot {} for {}", shot.id, key),
                Err(e) => warn!("Could not cache shot {} for {}: {}", shot.id, key, e),
            }
        }
        Ok(shot)
    }

    async fn cached_shot(&self, key: &str) -> AppResult<Option<ShotRecord>> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Draws a shot not yet used this year and records it in the ledger.
    ///
    /// When every shot has been used, the ledger is cleared and persisted first,
    /// then the draw runs once more against the full catalog.
    ///
    /// Returns `Ok(None)` only when the catalog is empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the ledger cannot be read or written.
    pub async fn random_unused_shot(&self) -> AppResult<Option<ShotRecord>> {
        if self.catalog.is_empty() {
            warn!("Catalog is empty, no shot to draw");
            return Ok(None);
        }

        let mut ledger = self.load_ledger().await?;

        // Second pass only runs after a renewal, so the pool is the whole catalog.
        for _ in 0..2 {
            let available: Vec<&ShotRecord> = self
                .catalog
                .shots()
                .iter()
                .filter(|shot| !ledger.contains(shot.id))
                .collect();

            if let Some(shot) = choose_uniform(&available).cloned() {
                ledger.record(shot.id);
                self.save_ledger(&ledger).await?;
                debug!(
                    "Drew shot {} ({} left this year)",
                    shot.id,
                    available.len() - 1
                );
                return Ok(Some(shot));
            }

            info!(
                "All {} shots used in {}, renewing the pool",
                self.catalog.len(),
                ledger.year
            );
            ledger.used_ids.clear();
            self.save_ledger(&ledger).await?;
        }

        Ok(None)
    }

    /// Shots not yet used this year.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the ledger cannot be read.
    pub async fn remaining_shots(&self) -> AppResult<usize> {
        let ledger = self.load_ledger().await?;
        Ok(self.catalog.len().saturating_sub(ledger.used_ids.len()))
    }

    /// Clears this year's ledger, whether or not the pool is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the ledger cannot be written.
    pub async fn reset_used_shots(&self) -> AppResult<()> {
        let ledger = UsedShotsLedger::fresh(self.current_year());
        self.save_ledger(&ledger).await?;
        info!("Used shots reset for {}", ledger.year);
        Ok(())
    }

    /// Every shot in the catalog, in catalog order.
    pub fn all_shots(&self) -> Vec<ShotRecord> {
        self.catalog.shots().to_vec()
    }

    pub fn shot_by_id(&self, id: u32) -> Option<ShotRecord> {
        self.catalog.get(id).cloned()
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    fn current_year(&self) -> i32 {
        self.dates.real_today().year()
    }

    /// Loads this year's ledger, starting fresh when none is stored, the stored one
    /// belongs to another year, or it cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store itself fails the read.
    pub async fn load_ledger(&self) -> AppResult<UsedShotsLedger> {
        let year = self.current_year();

        let Some(raw) = self.store.get(USED_SHOTS_KEY).await? else {
            return Ok(UsedShotsLedger::fresh(year));
        };

        match serde_json::from_str::<UsedShotsLedger>(&raw) {
            Ok(mut ledger) if ledger.year == year => {
                ledger.retain_known(&self.catalog);
                Ok(ledger)
            }
            Ok(stale) => {
                info!("Ledger for {} is stale, starting {}", stale.year, year);
                Ok(UsedShotsLedger::fresh(year))
            }
            Err(e) => {
                warn!("Ignoring unreadable used-shots ledger: {}", e);
                Ok(UsedShotsLedger::fresh(year))
            }
        }
    }

    async fn save_ledger(&self, ledger: &UsedShotsLedger) -> AppResult<()> {
        let payload = serde_json::to_string(ledger)?;
        self.store.set(USED_SHOTS_KEY, &payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn shot(id: u32) -> ShotRecord {
        ShotRecord {
            id,
            reference: format!("Psalm {}:1", id),
            verse_text: format!("verse {}", id),
            punchline: format!("punchline {}", id),
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        dates: Arc<DateController>,
        shots: ShotSelector,
    }

    fn fixture(ids: &[u32]) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        let dates = Arc::new(DateController::new(store.clone(), clock.clone()));
        let catalog = Catalog::new(ids.iter().copied().map(shot).collect()).unwrap();
        let shots = ShotSelector::new(catalog, store.clone(), dates.clone());
        Fixture {
            store,
            clock,
            dates,
            shots,
        }
    }

    async fn stored_ledger(store: &MemoryStore) -> UsedShotsLedger {
        let raw = store.get(USED_SHOTS_KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_three_draws_cover_catalog_then_renew() {
        let f = fixture(&[1, 2, 3]);

        let mut seen = HashSet::new();
        for _ in 0..3 {
            let drawn = f.shots.random_unused_shot().await.unwrap().unwrap();
            assert!(seen.insert(drawn.id), "shot {} drawn twice", drawn.id);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
        assert_eq!(f.shots.remaining_shots().await.unwrap(), 0);

        let fourth = f.shots.random_unused_shot().await.unwrap().unwrap();
        assert!(seen.contains(&fourth.id));

        let ledger = stored_ledger(&f.store).await;
        assert_eq!(ledger.used_ids, vec![fourth.id]);
        assert_eq!(f.shots.remaining_shots().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_no_repeats_across_full_catalog() {
        let ids: Vec<u32> = (1..=40).collect();
        let f = fixture(&ids);

        let mut seen = HashSet::new();
        for _ in 0..ids.len() {
            let drawn = f.shots.random_unused_shot().await.unwrap().unwrap();
            assert!(seen.insert(drawn.id));
        }
        assert_eq!(seen.len(), ids.len());
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_none() {
        let f = fixture(&[]);
        assert_eq!(f.shots.random_unused_shot().await.unwrap(), None);
        assert_eq!(f.shots.daily_shot().await.unwrap(), None);
        assert_eq!(f.shots.remaining_shots().await.unwrap(), 0);
        assert!(f.store.all_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_daily_shot_is_stable_within_a_day() {
        let f = fixture(&[1, 2, 3, 4, 5]);

        let first = f.shots.daily_shot().await.unwrap().unwrap();
        let second = f.shots.daily_shot().await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(f.shots.remaining_shots().await.unwrap(), 4);
        assert!(f
            .store
            .get("daily_shot_2024_5_1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_daily_shot_returns_cached_snapshot_unchanged() {
        let f = fixture(&[1, 2]);
        let snapshot = ShotRecord {
            id: 99,
            reference: "John 11:35".to_string(),
            verse_text: "Jesus wept.".to_string(),
            punchline: "Tears count.".to_string(),
        };
        f.store
            .set("daily_shot_2024_5_1", &serde_json::to_string(&snapshot).unwrap())
            .await
            .unwrap();

        assert_eq!(f.shots.daily_shot().await.unwrap(), Some(snapshot));
        assert_eq!(f.store.get(USED_SHOTS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_cache_falls_back_to_direct_draw() {
        let f = fixture(&[1, 2]);
        f.store
            .set("daily_shot_2024_5_1", "not json")
            .await
            .unwrap();

        let drawn = f.shots.daily_shot().await.unwrap().unwrap();

        assert!([1, 2].contains(&drawn.id));
        assert_eq!(stored_ledger(&f.store).await.used_ids, vec![drawn.id]);
    }

    #[tokio::test]
    async fn test_new_simulated_day_draws_new_shot() {
        let f = fixture(&[1, 2]);
        f.dates.enable_debug_mode().await.unwrap();

        let day_one = f.shots.daily_shot().await.unwrap().unwrap();
        f.dates.simulate_next_day().await.unwrap();
        let day_two = f.shots.daily_shot().await.unwrap().unwrap();

        assert_ne!(day_one.id, day_two.id);
        assert!(f
            .store
            .get("daily_shot_2024_5_2")
            .await
            .unwrap()
            .is_some());
        assert_eq!(f.store.get("daily_shot_2024_5_1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stale_year_starts_fresh_ledger() {
        let f = fixture(&[1, 2, 3]);
        f.shots.random_unused_shot().await.unwrap();
        f.shots.random_unused_shot().await.unwrap();

        f.clock
            .set(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        assert_eq!(f.shots.remaining_shots().await.unwrap(), 3);
        f.shots.random_unused_shot().await.unwrap();
        let ledger = stored_ledger(&f.store).await;
        assert_eq!(ledger.year, 2025);
        assert_eq!(ledger.used_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_simulated_days_do_not_roll_the_ledger_year() {
        let f = fixture(&[1, 2, 3]);
        f.clock
            .set(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        f.dates.enable_debug_mode().await.unwrap();

        f.shots.daily_shot().await.unwrap();
        f.dates.simulate_next_day().await.unwrap();
        f.shots.daily_shot().await.unwrap();

        let ledger = stored_ledger(&f.store).await;
        assert_eq!(ledger.year, 2024);
        assert_eq!(ledger.used_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_reset_used_shots_clears_partial_ledger() {
        let f = fixture(&[1, 2, 3]);
        f.shots.random_unused_shot().await.unwrap();

        f.shots.reset_used_shots().await.unwrap();

        assert_eq!(f.shots.remaining_shots().await.unwrap(), 3);
        assert_eq!(stored_ledger(&f.store).await, UsedShotsLedger::fresh(2024));
    }

    #[tokio::test]
    async fn test_ledger_ignores_unknown_and_duplicate_ids() {
        let f = fixture(&[1, 2, 3]);
        f.store
            .set(USED_SHOTS_KEY, r#"{"year":2024,"usedIds":[2,2,77]}"#)
            .await
            .unwrap();

        assert_eq!(f.shots.load_ledger().await.unwrap().used_ids, vec![2]);
        assert_eq!(f.shots.remaining_shots().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_ledger_starts_fresh() {
        let f = fixture(&[1, 2, 3]);
        f.store.set(USED_SHOTS_KEY, "{oops").await.unwrap();

        assert_eq!(
            f.shots.load_ledger().await.unwrap(),
            UsedShotsLedger::fresh(2024)
        );
    }

    #[test]
    fn test_all_shots_and_lookup() {
        let f = fixture(&[4, 5]);

        let mut all = f.shots.all_shots();
        assert_eq!(all.len(), 2);
        all.clear();
        assert_eq!(f.shots.all_shots().len(), 2);

        assert_eq!(f.shots.shot_by_id(5).unwrap().reference, "Psalm 5:1");
        assert_eq!(f.shots.shot_by_id(6), None);
        assert_eq!(f.shots.catalog_size(), 2);
    }

    #[test]
    fn test_ledger_record_is_idempotent() {
        let mut ledger = UsedShotsLedger::fresh(2024);
        ledger.record(3);
        ledger.record(3);
        assert_eq!(ledger.used_ids, vec![3]);
    }
}
