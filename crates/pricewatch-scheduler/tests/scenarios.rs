//! Scheduler scenarios driven by synthetic civil times and a scripted
//! fetcher.

use chrono::{Duration, Utc, Weekday};
use pricewatch_core::{
    CalendarSystem, CivilClock, CivilTime, HolidayCalendar, HolidayEntry, MonthDay, Price, Quote,
    SessionPhase, Snapshot, Symbol,
};
use pricewatch_feed::{FetchError, MockFetcher};
use pricewatch_scheduler::{
    FetchOutcome, Notice, NoticeKind, ScheduleState, Scheduler, SchedulerConfig, TickClass,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn clock() -> CivilClock {
    CivilClock::default()
}

/// 2025-02-11, a Tuesday (1403/11/23).
fn tuesday(hour: u32, minute: u32) -> CivilTime {
    clock().local(2025, 2, 11, hour, minute).unwrap()
}

/// 2025-02-12, a Wednesday.
fn wednesday(hour: u32, minute: u32) -> CivilTime {
    clock().local(2025, 2, 12, hour, minute).unwrap()
}

fn after(t: &CivilTime, seconds: i64) -> CivilTime {
    clock().at(t.instant + Duration::seconds(seconds))
}

fn calendar(exceptions: Vec<MonthDay>) -> HolidayCalendar {
    HolidayCalendar::new(
        CalendarSystem::Jalali,
        Weekday::Fri,
        vec![HolidayEntry {
            month: 11,
            day: 22,
            name: Some("Revolution Day".to_string()),
        }],
        exceptions,
    )
    .unwrap()
}

fn config() -> SchedulerConfig {
    SchedulerConfig {
        update_interval_secs: 60,
        min_emergency_interval_secs: 1800,
        fetch_timeout_secs: 1,
        ..Default::default()
    }
}

fn scheduler() -> Scheduler {
    Scheduler::new(config(), calendar(Vec::new()))
}

fn snapshot(usd: Decimal, eur: Decimal) -> Snapshot {
    Snapshot::complete(
        &[Symbol::Usd, Symbol::Eur],
        vec![
            Quote::new(Symbol::Usd, Price::try_new(usd).unwrap(), 0.0),
            Quote::new(Symbol::Eur, Price::try_new(eur).unwrap(), 0.0),
        ],
        Some("11:00".to_string()),
        Utc::now(),
    )
}

fn kinds(notices: &[Notice]) -> Vec<NoticeKind> {
    notices.iter().map(Notice::kind).collect()
}

fn count(all: &[Notice], kind: NoticeKind) -> usize {
    all.iter().filter(|n| n.kind() == kind).count()
}

#[tokio::test]
async fn session_open_boundary_and_once_per_day() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    let report = scheduler.tick(&tuesday(10, 59), &fetcher).await;
    assert_eq!(
        report.classification,
        TickClass::OutOfSession(SessionPhase::BeforeOpen)
    );
    assert!(report.notices.is_empty());

    let mut all = Vec::new();
    for minute in 0..30 {
        let report = scheduler.tick(&tuesday(11, minute), &fetcher).await;
        assert_eq!(report.classification, TickClass::InSession);
        all.extend(report.notices);
    }
    assert_eq!(count(&all, NoticeKind::SessionOpen), 1);
    assert_eq!(all[0].kind(), NoticeKind::SessionOpen);
}

#[tokio::test]
async fn session_open_precedes_routine_update() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    let report = scheduler.tick(&tuesday(11, 0), &fetcher).await;
    assert_eq!(
        kinds(&report.notices),
        vec![NoticeKind::SessionOpen, NoticeKind::Routine]
    );
    assert!(matches!(report.fetch, FetchOutcome::Fetched { available: 2, total: 2, changes: 0 }));
}

#[tokio::test]
async fn session_open_is_independent_of_fetch_outcome() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_error(FetchError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    });

    let report = scheduler.tick(&tuesday(11, 0), &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::SessionOpen]);
    assert!(matches!(report.fetch, FetchOutcome::Failed(FetchError::Status { .. })));
    assert!(scheduler.state().day_flags.session_open_notified);
}

#[tokio::test]
async fn session_close_once_per_day() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();

    let mut all = Vec::new();
    for minute in [0, 1, 10, 29, 30, 45] {
        let report = scheduler.tick(&tuesday(20, minute), &fetcher).await;
        assert_eq!(
            report.classification,
            TickClass::OutOfSession(SessionPhase::AfterClose)
        );
        all.extend(report.notices);
    }
    assert_eq!(kinds(&all), vec![NoticeKind::SessionClose]);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn day_rollover_resets_exactly_once() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    scheduler.tick(&tuesday(11, 0), &fetcher).await;
    scheduler.tick(&tuesday(20, 0), &fetcher).await;
    let flags = scheduler.state().day_flags;
    assert!(flags.session_open_notified && flags.session_close_notified);

    let report = scheduler.tick(&tuesday(23, 59), &fetcher).await;
    assert!(!report.day_rolled);

    let report = scheduler.tick(&wednesday(0, 5), &fetcher).await;
    assert!(report.day_rolled);
    assert!(!scheduler.state().day_flags.session_open_notified);

    scheduler.tick(&wednesday(0, 6), &fetcher).await;
    let report = scheduler.tick(&wednesday(11, 0), &fetcher).await;
    assert!(!report.day_rolled);
    assert_eq!(report.notices[0].kind(), NoticeKind::SessionOpen);
}

#[tokio::test]
async fn rollover_is_not_tied_to_the_midnight_window() {
    // The first tick of the new day comes well after midnight
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    scheduler.tick(&tuesday(11, 0), &fetcher).await;
    let report = scheduler.tick(&wednesday(11, 0), &fetcher).await;
    assert!(report.day_rolled);
    assert_eq!(count(&report.notices, NoticeKind::SessionOpen), 1);
}

#[tokio::test]
async fn fixed_holiday_on_weekday() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));
    // 2025-02-10 = 1403/11/22, a Monday
    let at = |h, m| clock().local(2025, 2, 10, h, m).unwrap();

    let report = scheduler.tick(&at(8, 0), &fetcher).await;
    assert_eq!(report.classification, TickClass::Holiday);
    assert_eq!(kinds(&report.notices), vec![NoticeKind::SuspiciousHoliday]);

    let mut all = Vec::new();
    for (h, m) in [(9, 0), (11, 0), (11, 10), (12, 0), (20, 0)] {
        let report = scheduler.tick(&at(h, m), &fetcher).await;
        assert_eq!(report.classification, TickClass::Holiday);
        assert!(matches!(report.fetch, FetchOutcome::Skipped));
        all.extend(report.notices);
    }
    assert_eq!(kinds(&all), vec![NoticeKind::Holiday]);
    match &all[0] {
        Notice::Holiday { name, .. } => assert_eq!(name.as_deref(), Some("Revolution Day")),
        other => panic!("unexpected notice {other:?}"),
    }
    // holidays never fetch
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn rest_day_is_holiday_without_suspicion() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    // 2025-02-14 is a Friday
    let now = clock().local(2025, 2, 14, 11, 5).unwrap();

    let report = scheduler.tick(&now, &fetcher).await;
    assert_eq!(report.classification, TickClass::Holiday);
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Holiday]);
    assert!(!scheduler.state().day_flags.suspicious_holiday_alerted);
}

#[tokio::test]
async fn exceptions_override_holidays() {
    // 11/22 and the Friday 11/26 are both exempt
    let mut scheduler = Scheduler::new(
        config(),
        calendar(vec![MonthDay::new(11, 22), MonthDay::new(11, 26)]),
    );
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    let report = scheduler
        .tick(&clock().local(2025, 2, 10, 11, 0).unwrap(), &fetcher)
        .await;
    assert_eq!(report.classification, TickClass::InSession);

    let report = scheduler
        .tick(&clock().local(2025, 2, 14, 11, 0).unwrap(), &fetcher)
        .await;
    assert_eq!(report.classification, TickClass::InSession);
    assert_eq!(count(&report.notices, NoticeKind::SessionOpen), 1);
}

#[tokio::test]
async fn emergency_is_batched_and_precedes_routine() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_snapshot(snapshot(dec!(58000), dec!(63000)));
    // USD +2.59%, EUR +3.17%
    fetcher.push_snapshot(snapshot(dec!(59500), dec!(65000)));

    let t0 = tuesday(12, 0);
    let report = scheduler.tick(&t0, &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);

    let t1 = after(&t0, 60);
    let report = scheduler.tick(&t1, &fetcher).await;
    assert_eq!(
        kinds(&report.notices),
        vec![NoticeKind::Emergency, NoticeKind::Routine]
    );
    match &report.notices[0] {
        Notice::Emergency {
            changes,
            snapshot_time,
        } => {
            let symbols: Vec<Symbol> = changes.iter().map(|c| c.symbol).collect();
            assert_eq!(symbols, vec![Symbol::Usd, Symbol::Eur]);
            assert_eq!(snapshot_time.as_deref(), Some("11:00"));
        }
        other => panic!("unexpected notice {other:?}"),
    }
    assert_eq!(scheduler.state().last_emergency_at, Some(t1.instant));
}

#[tokio::test]
async fn below_threshold_move_is_routine_only() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_snapshot(snapshot(dec!(58000), dec!(63000)));
    // USD +1.55%
    fetcher.push_snapshot(snapshot(dec!(58900), dec!(63000)));

    let t0 = tuesday(12, 0);
    scheduler.tick(&t0, &fetcher).await;
    let report = scheduler.tick(&after(&t0, 60), &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
}

#[tokio::test]
async fn near_zero_previous_price_does_not_stall_updates() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_snapshot(snapshot(dec!(0.0000000000000000000000000001), dec!(63000)));
    fetcher.push_snapshot(snapshot(dec!(58000), dec!(63000)));
    fetcher.push_snapshot(snapshot(dec!(58100), dec!(63000)));

    let t0 = tuesday(12, 0);
    scheduler.tick(&t0, &fetcher).await;

    // the ratio is out of range, so USD is skipped rather than flagged
    let t1 = after(&t0, 60);
    let report = scheduler.tick(&t1, &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
    assert!(matches!(report.fetch, FetchOutcome::Fetched { changes: 0, .. }));
    assert_eq!(
        scheduler.state().last_snapshot.as_ref().and_then(|s| s.price(Symbol::Usd)),
        Some(Price::try_new(dec!(58000)).unwrap())
    );

    // the baseline moved on and routine updates continue
    let report = scheduler.tick(&after(&t1, 60), &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
}

#[tokio::test]
async fn emergency_rate_limit_is_first_wins() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_snapshot(snapshot(dec!(58000), dec!(63000)));
    fetcher.push_snapshot(snapshot(dec!(59500), dec!(63000)));
    fetcher.push_snapshot(snapshot(dec!(61500), dec!(63000)));
    fetcher.push_snapshot(snapshot(dec!(64000), dec!(63000)));

    let t0 = tuesday(12, 0);
    scheduler.tick(&t0, &fetcher).await;

    let t1 = after(&t0, 60);
    let report = scheduler.tick(&t1, &fetcher).await;
    assert_eq!(count(&report.notices, NoticeKind::Emergency), 1);

    // second qualifying move one second short of the limit
    let t2 = after(&t1, 1800 - 1);
    let report = scheduler.tick(&t2, &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
    assert!(matches!(report.fetch, FetchOutcome::Fetched { changes: 1, .. }));
    assert_eq!(scheduler.state().last_emergency_at, Some(t1.instant));

    // the limit has elapsed, measured against the new baseline
    let t3 = after(&t1, 1800 + 60);
    let report = scheduler.tick(&t3, &fetcher).await;
    assert_eq!(count(&report.notices, NoticeKind::Emergency), 1);
}

#[tokio::test]
async fn routine_updates_respect_the_interval() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    let t0 = tuesday(12, 0);
    scheduler.tick(&t0, &fetcher).await;

    let report = scheduler.tick(&after(&t0, 30), &fetcher).await;
    assert!(matches!(report.fetch, FetchOutcome::NotDue));
    assert!(report.notices.is_empty());

    let report = scheduler.tick(&after(&t0, 60), &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn fetch_failure_retries_next_tick() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::new();
    fetcher.push_snapshot(snapshot(dec!(58000), dec!(63000)));
    fetcher.push_error(FetchError::Malformed("truncated".to_string()));
    fetcher.push_snapshot(snapshot(dec!(58100), dec!(63000)));

    let t0 = tuesday(12, 0);
    scheduler.tick(&t0, &fetcher).await;

    let t1 = after(&t0, 60);
    let report = scheduler.tick(&t1, &fetcher).await;
    assert!(matches!(report.fetch, FetchOutcome::Failed(_)));
    assert_eq!(scheduler.state().last_routine_update_at, Some(t0.instant));

    // still due on the very next tick
    let t2 = after(&t1, 1);
    let report = scheduler.tick(&t2, &fetcher).await;
    assert_eq!(kinds(&report.notices), vec![NoticeKind::Routine]);
    assert_eq!(scheduler.state().last_routine_update_at, Some(t2.instant));
    assert_eq!(
        scheduler.state().last_snapshot.as_ref().and_then(|s| s.price(Symbol::Usd)),
        Some(Price::try_new(dec!(58100)).unwrap())
    );
}

#[tokio::test]
async fn slow_fetch_times_out() {
    let mut scheduler = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));
    fetcher.set_delay(std::time::Duration::from_secs(3));

    let report = scheduler.tick(&tuesday(12, 0), &fetcher).await;
    assert!(matches!(report.fetch, FetchOutcome::Failed(FetchError::Timeout(_))));
    assert_eq!(report.fetch.result_label(), Some("timeout"));
    assert!(scheduler.state().last_snapshot.is_none());
}

#[tokio::test]
async fn restored_stale_state_is_reset() {
    let mut stale = ScheduleState::new();
    stale.roll_over(chrono::NaiveDate::from_ymd_opt(2025, 2, 9).unwrap());
    stale.day_flags.session_open_notified = true;
    stale.day_flags.session_close_notified = true;

    let mut scheduler = Scheduler::with_state(config(), calendar(Vec::new()), stale);
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));

    let report = scheduler.tick(&tuesday(11, 0), &fetcher).await;
    assert!(report.day_rolled);
    assert_eq!(count(&report.notices, NoticeKind::SessionOpen), 1);
}

#[tokio::test]
async fn restored_same_day_state_is_kept() {
    let mut fresh = scheduler();
    let fetcher = MockFetcher::always(snapshot(dec!(58000), dec!(63000)));
    fresh.tick(&tuesday(11, 0), &fetcher).await;

    let saved = fresh.state().clone();
    let mut restarted = Scheduler::with_state(config(), calendar(Vec::new()), saved);
    let report = restarted.tick(&tuesday(11, 5), &fetcher).await;
    assert!(!report.day_rolled);
    assert_eq!(count(&report.notices, NoticeKind::SessionOpen), 0);
}
