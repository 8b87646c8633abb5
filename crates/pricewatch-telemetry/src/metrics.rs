//! Prometheus metrics for the pricewatch daemon.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

/// Total scheduler ticks.
/// Labels: class (holiday/in_session/before_open/after_close)
pub static TICKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricewatch_ticks_total",
        "Total scheduler ticks by classification",
        &["class"]
    )
    .unwrap()
});

/// Total snapshot fetch attempts.
/// Labels: result (ok/http/status/timeout/malformed)
pub static FETCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricewatch_fetch_total",
        "Total snapshot fetch attempts by result",
        &["result"]
    )
    .unwrap()
});

/// Total notices emitted by the scheduler.
pub static NOTICES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricewatch_notices_total",
        "Total notices emitted by kind",
        &["kind"]
    )
    .unwrap()
});

/// Total per-channel delivery attempts.
/// Labels: channel, result (ok/error)
pub static DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricewatch_dispatch_total",
        "Total per-channel delivery attempts by result",
        &["channel", "result"]
    )
    .unwrap()
});

/// Ticks aborted by a panic.
pub static TICK_PANICS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pricewatch_tick_panics_total",
        "Ticks aborted by a panic"
    )
    .unwrap()
});

/// Metrics helper for easy recording.
pub struct Metrics;

impl Metrics {
    /// Record a tick.
    pub fn tick(class: &str) {
        TICKS_TOTAL.with_label_values(&[class]).inc();
    }

    /// Record a fetch attempt.
    pub fn fetch(result: &str) {
        FETCH_TOTAL.with_label_values(&[result]).inc();
    }

    /// Record an emitted notice.
    pub fn notice(kind: &str) {
        NOTICES_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a delivery attempt.
    pub fn dispatch(channel: &str, ok: bool) {
        let result = if ok { "ok" } else { "failed" };
        DISPATCH_TOTAL.with_label_values(&[channel, result]).inc();
    }

    /// Record a panicked tick.
    pub fn tick_panic() {
        TICK_PANICS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = NOTICES_TOTAL.with_label_values(&["session_open"]).get();
        Metrics::notice("session_open");
        Metrics::notice("session_open");
        assert_eq!(
            NOTICES_TOTAL.with_label_values(&["session_open"]).get(),
            before + 2
        );

        let before = DISPATCH_TOTAL.with_label_values(&["bale", "failed"]).get();
        Metrics::dispatch("bale", false);
        assert_eq!(
            DISPATCH_TOTAL.with_label_values(&["bale", "failed"]).get(),
            before + 1
        );

        let before = TICK_PANICS_TOTAL.get();
        Metrics::tick_panic();
        assert_eq!(TICK_PANICS_TOTAL.get(), before + 1);
    }
}
