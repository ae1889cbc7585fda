
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::time::{Instant, sleep};

use monitor::alert::AlertOutcome;
use monitor::engine::{CycleReport, FIXED_FEE, RunState};
use monitor::error::ConfigError;
use monitor::history::Sample;

use mock_collaborators::*;

#[tokio::test]
async fn successful_cycle_records_displays_and_persists() {
    let rig = Rig::new([Some(950.0)]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    let report = monitor.run_cycle().await;

    let CycleReport::Sampled {
        price,
        profit,
        stats,
        outcome,
        interval,
    } = report
    else {
        panic!("expected a sample, got {report:?}");
    };
    assert_eq!(price, 950.0);
    assert_eq!(interval, Duration::from_secs(10));
    assert_eq!(outcome, AlertOutcome::None);
    assert!((profit - (10_000.0 / 950.0 * (950.0 - 935.5) - FIXED_FEE)).abs() < 1e-9);

    let stats = stats.expect("30 minute window configured");
    assert_eq!((stats.min, stats.max, stats.median), (950.0, 950.0, 950.0));

    assert_eq!(monitor.history().len(), 1);
    assert_eq!(*rig.display.updates.lock(), vec![(950.0, profit, Some(stats))]);
    assert!(rig.logged("Current price: 950.00"));
    assert!(handle.is_running());

    drain_detached().await;
    assert_eq!(rig.store.samples.lock().len(), 1);
    assert_eq!(rig.store.samples.lock()[0].price, 950.0);
}

#[tokio::test]
async fn seeded_history_feeds_windowed_stats() {
    let rig = Rig::new([Some(950.0)]);
    let now = Utc::now();
    let loaded = vec![
        Sample::new(now - TimeDelta::hours(2), 800.0),
        Sample::new(now - TimeDelta::minutes(20), 940.0),
        Sample::new(now - TimeDelta::minutes(10), 945.0),
    ];
    let (mut monitor, handle) = rig.build(loaded);
    handle.start().unwrap();

    let CycleReport::Sampled { stats, .. } = monitor.run_cycle().await else {
        panic!("expected a sample");
    };
    let stats = stats.unwrap();
    assert_eq!(stats.min, 940.0);
    assert_eq!(stats.max, 950.0);
    assert_eq!(stats.median, 945.0);
    assert_eq!(monitor.history().len(), 4);
}

#[tokio::test]
async fn zero_window_skips_stats() {
    let rig = Rig::new([Some(950.0)]);
    rig.config.update(|c| c.stats_window_minutes = "0".into());
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    let CycleReport::Sampled { stats, .. } = monitor.run_cycle().await else {
        panic!("expected a sample");
    };
    assert!(stats.is_none());
    assert_eq!(rig.display.updates.lock()[0].2, None);
}

#[tokio::test]
async fn persistence_failure_is_logged_and_monitoring_continues() {
    let rig = Rig::with_store(
        [Some(950.0), Some(951.0)],
        InMemoryHistoryStore {
            fail_appends: true,
            ..Default::default()
        },
    );
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    monitor.run_cycle().await;
    drain_detached().await;
    assert!(rig.logged("Failed to save price history: disk full"));
    assert!(handle.is_running());

    let report = monitor.run_cycle().await;
    assert!(matches!(report, CycleReport::Sampled { price, .. } if price == 951.0));
    assert_eq!(monitor.history().len(), 2);
}

#[tokio::test]
async fn five_consecutive_failures_auto_stop() {
    let rig = Rig::new([None]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    for _ in 0..4 {
        let report = monitor.run_cycle().await;
        assert!(matches!(
            report,
            CycleReport::FetchFailed {
                auto_stopped: false,
                ..
            }
        ));
    }
    assert!(handle.is_running());

    let report = monitor.run_cycle().await;
    assert!(matches!(
        report,
        CycleReport::FetchFailed {
            auto_stopped: true,
            ..
        }
    ));
    assert_eq!(handle.run_state(), RunState::Paused);
    assert!(handle.failure_flags().is_empty());
    assert!(rig.logged("Error: quote payload not found in response"));
    assert!(rig.logged("Too many consecutive errors, stopped"));
}

#[tokio::test]
async fn non_finite_quote_counts_as_a_failed_fetch() {
    let rig = Rig::new([Some(f64::NAN), Some(f64::INFINITY), Some(950.0)]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    for _ in 0..2 {
        assert!(matches!(
            monitor.run_cycle().await,
            CycleReport::FetchFailed {
                auto_stopped: false,
                ..
            }
        ));
    }
    assert!(rig.logged("Error: price NaN is not a finite number"));
    assert_eq!(handle.failure_flags(), vec![1, 1]);
    assert!(monitor.history().is_empty());
    assert!(rig.display.updates.lock().is_empty());

    let CycleReport::Sampled { stats, .. } = monitor.run_cycle().await else {
        panic!("expected a sample");
    };
    let stats = stats.unwrap();
    assert_eq!((stats.min, stats.mean, stats.max), (950.0, 950.0, 950.0));
    assert_eq!(handle.failure_flags(), vec![1, 1, 0]);

    drain_detached().await;
    assert_eq!(rig.store.samples.lock().len(), 1);
}

#[tokio::test]
async fn interleaved_success_keeps_running() {
    let rig = Rig::new([None, None, Some(950.0), None, None]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    for _ in 0..5 {
        monitor.run_cycle().await;
    }
    assert_eq!(handle.failure_flags(), vec![1, 1, 0, 1, 1]);
    assert!(handle.is_running());
}

#[tokio::test]
async fn sell_target_alerts_and_latches() {
    let rig = Rig::new([Some(975.0)]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    let report = monitor.run_cycle().await;
    assert!(matches!(
        report,
        CycleReport::Sampled {
            outcome: AlertOutcome::SellTriggered,
            ..
        }
    ));
    assert_eq!(handle.run_state(), RunState::Paused);
    assert!(rig.logged("Paused (price target reached)"));

    let shown = rig.alert.shown.lock().clone();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("Target sell price: 970.00"));

    drain_detached().await;
    let sent = rig.notifier.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Sell alert");
}

#[tokio::test]
async fn notifications_disabled_still_alerts_locally() {
    let rig = Rig::new([Some(880.0)]);
    rig.config.update(|c| c.notify_enabled = false);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    let report = monitor.run_cycle().await;
    assert!(matches!(
        report,
        CycleReport::Sampled {
            outcome: AlertOutcome::BuyTriggered,
            ..
        }
    ));

    drain_detached().await;
    assert!(rig.notifier.sent.lock().is_empty());
    assert_eq!(rig.alert.shown.lock().len(), 1);
}

#[tokio::test]
async fn invalid_live_edit_pauses_without_fetching() {
    let rig = Rig::new([Some(950.0)]);
    let (mut monitor, handle) = rig.build(vec![]);
    handle.start().unwrap();

    rig.config.update(|c| c.target_sell_price = "97O".into());
    let report = monitor.run_cycle().await;

    assert!(matches!(
        report,
        CycleReport::Skipped(ConfigError::InvalidPrice { .. })
    ));
    assert_eq!(rig.source.calls(), 0);
    assert_eq!(handle.run_state(), RunState::Paused);
    assert!(rig.logged("target sell price is not a valid price"));
    assert!(rig.logged("Paused (invalid configuration)"));
}

#[tokio::test(start_paused = true)]
async fn loop_polls_on_the_configured_interval() {
    let rig = Rig::new([Some(950.0)]);
    let (monitor, handle) = rig.build(vec![]);
    tokio::spawn(monitor.run());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(rig.source.calls(), 0, "idle until started");

    handle.start().unwrap();
    sleep(Duration::from_secs(35)).await;
    // t = 0, 10, 20, 30 after start
    assert_eq!(rig.source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn slow_store_does_not_delay_polling() {
    let rig = Rig::with_store(
        [Some(950.0)],
        InMemoryHistoryStore {
            append_delay: Some(Duration::from_secs(60)),
            ..Default::default()
        },
    );
    let (monitor, handle) = rig.build(vec![]);
    tokio::spawn(monitor.run());

    handle.start().unwrap();
    sleep(Duration::from_secs(35)).await;
    // t = 0, 10, 20, 30 after start, none of the writes has landed yet
    assert_eq!(rig.source.calls(), 4);
    assert!(rig.store.samples.lock().is_empty());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.source.calls(), 7);
    assert_eq!(rig.store.samples.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_during_long_sleep_takes_effect_within_a_second() {
    let rig = Rig::new([Some(950.0)]);
    rig.config.update(|c| c.interval_seconds = "3600".into());
    let (monitor, handle) = rig.build(vec![]);
    tokio::spawn(monitor.run());

    handle.start().unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(rig.source.calls(), 1);

    let paused_at = Instant::now();
    assert!(handle.pause());
    sleep(Duration::from_millis(1100)).await;

    // Only a loop that noticed the pause is parked and can be woken now.
    handle.start().unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(rig.source.calls(), 2);
    assert!(paused_at.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn auto_stop_parks_the_loop_until_restarted() {
    let rig = Rig::new([None]);
    rig.config.update(|c| c.interval_seconds = "1".into());
    let (monitor, handle) = rig.build(vec![]);
    tokio::spawn(monitor.run());

    handle.start().unwrap();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.source.calls(), 5);
    assert_eq!(handle.run_state(), RunState::Paused);

    // manual restart begins with a clean slate: five more attempts
    handle.start().unwrap();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.source.calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn alert_latch_holds_until_resumed() {
    let rig = Rig::new([Some(975.0)]);
    let (monitor, handle) = rig.build(vec![]);
    tokio::spawn(monitor.run());

    handle.start().unwrap();
    sleep(Duration::from_secs(60)).await;
    assert_eq!(rig.source.calls(), 1);
    assert_eq!(rig.alert.shown.lock().len(), 1);

    handle.start().unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(rig.source.calls(), 2);
    assert_eq!(rig.alert.shown.lock().len(), 2);
}
