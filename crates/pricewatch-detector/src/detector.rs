//! Change detector implementation.

use crate::change::SignificantChange;
use crate::config::DetectorConfig;
use pricewatch_core::Snapshot;
use tracing::{debug, info};

/// Snapshot-to-snapshot change detector.
///
/// For every symbol with a usable price in both snapshots, flags the
/// symbol iff `|change_percent| > threshold_pct`. Symbols missing or
/// unavailable on either side, and symbols whose previous price is zero,
/// are skipped.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    config: DetectorConfig,
}

impl ChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect significant changes from `previous` to `current`.
    ///
    /// Never fails. Ordering follows `Symbol` declaration order.
    pub fn detect(&self, previous: &Snapshot, current: &Snapshot) -> Vec<SignificantChange> {
        let threshold = self.config.threshold_pct;
        let mut changes = Vec::new();

        // Snapshot iterates in Symbol order
        for quote in current.iter() {
            let Some(new_price) = quote.price else {
                continue;
            };
            let Some(previous_price) = previous.price(quote.symbol) else {
                continue;
            };
            let Some(change_percent) = new_price.pct_from(previous_price) else {
                debug!(symbol = %quote.symbol, "No usable change from previous price, skipping");
                continue;
            };

            if change_percent.abs() > threshold {
                info!(
                    symbol = %quote.symbol,
                    previous = %previous_price,
                    new = %new_price,
                    change_pct = %change_percent.round_dp(3),
                    threshold_pct = %threshold,
                    "Significant price change"
                );
                changes.push(SignificantChange {
                    symbol: quote.symbol,
                    change_percent,
                    previous_price,
                    new_price,
                });
            }
        }

        changes
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
