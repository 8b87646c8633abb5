//! Periodic statistics summary.
//!
//! Reads the process counters and logs a compact summary: notices per
//! kind, fetch success/failure, delivery success/failure and panicked
//! ticks.

use crate::metrics::{DISPATCH_TOTAL, FETCH_TOTAL, NOTICES_TOTAL, TICK_PANICS_TOTAL};
use chrono::{DateTime, Utc};
use prometheus::core::Collector;
use prometheus::IntCounterVec;
use tracing::info;

/// Counter snapshot since process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeStats {
    /// `(kind, count)` in the order the reporter was configured with.
    pub notices: Vec<(String, u64)>,
    pub fetch_ok: u64,
    pub fetch_failed: u64,
    pub dispatch_ok: u64,
    pub dispatch_failed: u64,
    pub tick_panics: u64,
}

impl NoticeStats {
    pub fn total_notices(&self) -> u64 {
        self.notices.iter().map(|(_, n)| n).sum()
    }
}

/// Statistics reporter.
pub struct DailyStatsReporter {
    kinds: Vec<String>,
    start_time: DateTime<Utc>,
}

impl DailyStatsReporter {
    /// Create a reporter for the given notice kinds.
    pub fn new(kinds: Vec<String>) -> Self {
        Self {
            kinds,
            start_time: Utc::now(),
        }
    }

    /// Current counter values.
    pub fn get_stats(&self) -> NoticeStats {
        let notices = self
            .kinds
            .iter()
            .map(|kind| (kind.clone(), NOTICES_TOTAL.with_label_values(&[kind]).get()))
            .collect();

        let (fetch_ok, fetch_failed) = split_by_label(&FETCH_TOTAL, "result", "ok");
        let (dispatch_ok, dispatch_failed) = split_by_label(&DISPATCH_TOTAL, "result", "ok");

        NoticeStats {
            notices,
            fetch_ok,
            fetch_failed,
            dispatch_ok,
            dispatch_failed,
            tick_panics: TICK_PANICS_TOTAL.get(),
        }
    }

    /// Output the summary to logs.
    pub fn output_summary(&self) {
        let stats = self.get_stats();
        let duration = Utc::now() - self.start_time;

        info!(
            since = %self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            hours = duration.num_hours(),
            minutes = duration.num_minutes() % 60,
            notices = stats.total_notices(),
            fetch_ok = stats.fetch_ok,
            fetch_failed = stats.fetch_failed,
            dispatch_ok = stats.dispatch_ok,
            dispatch_failed = stats.dispatch_failed,
            tick_panics = stats.tick_panics,
            "Statistics summary"
        );
        for (kind, count) in &stats.notices {
            info!(kind = %kind, count, "  notices");
        }
    }
}

/// Sum a counter vector into `(matching, other)` on one label.
fn split_by_label(counter: &IntCounterVec, label: &str, value: &str) -> (u64, u64) {
    let mut matching = 0u64;
    let mut other = 0u64;

    for mf in counter.collect() {
        for m in mf.get_metric() {
            let count = m.get_counter().get_value() as u64;
            let is_match = m
                .get_label()
                .iter()
                .any(|pair| pair.get_name() == label && pair.get_value() == value);
            if is_match {
                matching += count;
            } else {
                other += count;
            }
        }
    }

    (matching, other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    #[test]
    fn test_stats_reflect_counters() {
        let reporter = DailyStatsReporter::new(vec![
            "emergency".to_string(),
            "routine".to_string(),
        ]);
        let before = reporter.get_stats();

        Metrics::notice("emergency");
        Metrics::notice("routine");
        Metrics::notice("routine");
        Metrics::fetch("ok");
        Metrics::fetch("timeout");
        Metrics::dispatch("telegram", true);
        Metrics::dispatch("telegram", false);

        let after = reporter.get_stats();
        assert_eq!(after.notices[0].0, "emergency");
        assert!(after.notices[0].1 >= before.notices[0].1 + 1);
        assert!(after.notices[1].1 >= before.notices[1].1 + 2);
        assert!(after.fetch_ok > before.fetch_ok);
        assert!(after.fetch_failed > before.fetch_failed);
        assert!(after.dispatch_ok > before.dispatch_ok);
        assert!(after.dispatch_failed > before.dispatch_failed);
        assert!(after.total_notices() >= 3);

        reporter.output_summary();
    }
}
