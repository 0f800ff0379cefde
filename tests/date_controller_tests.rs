//! Integration tests for the debug date controller and its interaction with
//! the daily shot cache.


use dailyshot::constants::{DAILY_SHOT_KEY_PREFIX, DEBUG_DATE_OFFSET_KEY};
use dailyshot::errors::AppError;
use std::sync::atomic::Ordering;
use test_helpers::{harness, ymd};

async fn day_cache_keys(h: &test_helpers::Harness) -> Vec<String> {
    use dailyshot::store::KeyValueStore;
    h.store
        .all_keys()
        .await
        .unwrap()
        .into_iter()
        .filter(|k| k.starts_with(DAILY_SHOT_KEY_PREFIX))
        .collect()
}

#[tokio::test]
async fn test_next_day_draws_fresh_shot_instead_of_cached_one() {
    let h = harness(&[1, 2, 3, 4, 5], ymd(2024, 4, 10));
    h.dates.enable_debug_mode().await.unwrap();

    let day_n = h.shots.daily_shot().await.unwrap().unwrap();
    assert_eq!(day_cache_keys(&h).await, vec!["daily_shot_2024_3_10".to_string()]);

    h.dates.simulate_next_day().await.unwrap();
    assert_eq!(h.dates.debug_date_offset().await, 1);
    assert!(day_cache_keys(&h).await.is_empty());

    let day_n1 = h.shots.daily_shot().await.unwrap().unwrap();
    assert_ne!(day_n.id, day_n1.id);
    assert_eq!(day_cache_keys(&h).await, vec!["daily_shot_2024_3_11".to_string()]);
}

#[tokio::test]
async fn test_simulate_next_day_disabled_leaves_offset_unchanged() {
    let h = harness(&[1, 2], ymd(2024, 4, 10));
    h.dates.set_debug_date_offset(2).await.unwrap();
    h.shots.daily_shot().await.unwrap();

    let result = h.dates.simulate_next_day().await;

    match result {
        Err(AppError::InvalidState(msg)) => assert!(msg.contains("debug mode is not enabled")),
        other => panic!("Expected InvalidState, got {:?}", other),
    }
    assert_eq!(h.dates.debug_date_offset().await, 2);
    assert_eq!(day_cache_keys(&h).await.len(), 1);
}

#[tokio::test]
async fn test_reset_debug_date_in_every_state() {
    for enabled in [false, true] {
        let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
        if enabled {
            h.dates.enable_debug_mode().await.unwrap();
            h.shots.daily_shot().await.unwrap();
            h.dates.simulate_next_day().await.unwrap();
        } else {
            h.dates.set_debug_date_offset(6).await.unwrap();
        }
        h.shots.daily_shot().await.unwrap();
        assert!(!day_cache_keys(&h).await.is_empty());

        h.dates.reset_debug_date().await.unwrap();

        assert_eq!(h.dates.debug_date_offset().await, 0);
        assert!(day_cache_keys(&h).await.is_empty());
        assert_eq!(h.dates.is_debug_mode_enabled().await, enabled);
    }
}

#[tokio::test]
async fn test_state_machine_walk() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));

    assert!(!h.dates.state().await.enabled);

    h.dates.enable_debug_mode().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();
    let state = h.dates.state().await;
    assert!(state.enabled);
    assert_eq!(state.day_offset, 2);
    assert_eq!(h.dates.effective_date().await, ymd(2024, 4, 12));

    h.dates.reset_debug_date().await.unwrap();
    assert_eq!(h.dates.effective_date().await, ymd(2024, 4, 10));

    h.dates.simulate_next_day().await.unwrap();
    h.dates.disable_debug_mode().await.unwrap();
    assert_eq!(h.dates.state().await.day_offset, 0);
    assert_eq!(h.dates.effective_date().await, ymd(2024, 4, 10));

    h.dates.enable_debug_mode().await.unwrap();
    assert_eq!(h.dates.state().await.day_offset, 0);
}

#[tokio::test]
async fn test_cache_invalidation_failure_is_swallowed() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
    h.dates.enable_debug_mode().await.unwrap();
    h.shots.daily_shot().await.unwrap();
    h.store.fail_key_listing.store(true, Ordering::SeqCst);

    assert_eq!(h.dates.simulate_next_day().await.unwrap(), 1);
    assert!(h.dates.reset_debug_date().await.is_ok());
}

#[tokio::test]
async fn test_debug_state_write_failures_surface() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
    h.store.fail_writes.store(true, Ordering::SeqCst);

    assert!(matches!(h.dates.enable_debug_mode().await, Err(AppError::Store(_))));
    assert!(matches!(h.dates.disable_debug_mode().await, Err(AppError::Store(_))));
    assert!(matches!(h.dates.reset_debug_date().await, Err(AppError::Store(_))));
    assert!(matches!(
        h.dates.set_debug_date_offset(3).await,
        Err(AppError::Store(_))
    ));
}

#[tokio::test]
async fn test_unreadable_debug_state_defaults_to_off() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
    h.dates.enable_debug_mode().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();
    h.store.fail_reads.store(true, Ordering::SeqCst);

    assert!(!h.dates.is_debug_mode_enabled().await);
    assert_eq!(h.dates.debug_date_offset().await, 0);
    assert_eq!(h.dates.effective_date_key().await, "daily_shot_2024_3_10");
    assert!(matches!(
        h.dates.simulate_next_day().await,
        Err(AppError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_debug_info_snapshot() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
    h.dates.enable_debug_mode().await.unwrap();
    h.shots.daily_shot().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();

    let info = h.dates.current_debug_info(&h.shots).await;

    assert!(info.enabled);
    assert_eq!(info.day_offset, 1);
    assert_eq!(info.effective_date_display, "11/04/2024");
    assert_eq!(info.remaining_shots, 2);
}

#[tokio::test]
async fn test_debug_info_survives_read_failures() {
    let h = harness(&[1, 2, 3], ymd(2024, 4, 10));
    h.store.fail_reads.store(true, Ordering::SeqCst);

    let info = h.dates.current_debug_info(&h.shots).await;

    assert!(!info.enabled);
    assert_eq!(info.day_offset, 0);
    assert_eq!(info.effective_date_display, "10/04/2024");
    assert_eq!(info.remaining_shots, 0);
}

#[tokio::test]
async fn test_offset_is_stored_as_decimal_text() {
    use dailyshot::store::KeyValueStore;

    let h = harness(&[1], ymd(2024, 4, 10));
    h.dates.enable_debug_mode().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();
    h.dates.simulate_next_day().await.unwrap();

    assert_eq!(
        h.store.get(DEBUG_DATE_OFFSET_KEY).await.unwrap().as_deref(),
        Some("2")
    );
}
