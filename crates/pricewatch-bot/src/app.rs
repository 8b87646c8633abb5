//! Main application orchestration.
//!
//! One tick per poll interval:
//! - read the civil clock
//! - let the scheduler decide which notices are due
//! - render and deliver each notice to the channels of its audience
//! - journal deliveries and snapshot the scheduling state
//!
//! A panic inside a tick is caught, logged and counted; the loop keeps
//! going after the normal sleep.

use crate::config::AppConfig;
use crate::error::AppResult;
use chrono::{NaiveDate, Utc};
use futures_util::FutureExt;
use pricewatch_core::{CivilClock, CivilTime};
use pricewatch_feed::{BrsApiClient, SnapshotFetcher};
use pricewatch_notify::{
    render_notice, BotApiDispatcher, ChannelHub, DeliveryReport, LogDispatcher, RenderedMessage,
};
use pricewatch_persistence::{DeliveryRecord, NoticeJournal, NoticeRecord, StateStore};
use pricewatch_scheduler::{Audience, NoticeKind, Scheduler, TickReport};
use pricewatch_telemetry::{DailyStatsReporter, Metrics};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    clock: CivilClock,
    scheduler: Scheduler,
    fetcher: Arc<dyn SnapshotFetcher>,
    hub: ChannelHub,
    state_store: Option<StateStore>,
    journal: Option<NoticeJournal>,
    daily_stats: DailyStatsReporter,
}

impl Application {
    /// Create the application with the BrsApi fetcher and Bot API channels.
    ///
    /// With `dry_run`, every channel is replaced by a log-only dispatcher.
    pub fn new(config: AppConfig, dry_run: bool) -> AppResult<Self> {
        let clock = config.calendar.clock()?;
        let fetcher: Arc<dyn SnapshotFetcher> = Arc::new(BrsApiClient::new(&config.feed, clock)?);
        let hub = build_hub(&config, dry_run)?;
        Self::with_components(config, fetcher, hub)
    }

    /// Create the application around an existing fetcher and channel hub.
    pub fn with_components(
        config: AppConfig,
        fetcher: Arc<dyn SnapshotFetcher>,
        hub: ChannelHub,
    ) -> AppResult<Self> {
        let clock = config.calendar.clock()?;
        let calendar = config.calendar.holiday_calendar()?;

        let state_store = config.persistence.state_path.clone().map(StateStore::new);
        let restored = state_store.as_ref().and_then(StateStore::load);
        let scheduler = match restored {
            Some(state) => {
                info!(
                    civil_date = ?state.current_civil_date,
                    "Resuming from saved scheduling state"
                );
                Scheduler::with_state(config.scheduler.clone(), calendar, state)
            }
            None => Scheduler::new(config.scheduler.clone(), calendar),
        };

        let journal = match &config.persistence.journal_dir {
            Some(dir) => Some(NoticeJournal::new(dir)?),
            None => None,
        };

        let daily_stats = DailyStatsReporter::new(
            NoticeKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
        );

        info!(
            fetcher = fetcher.name(),
            channels = hub.channel_count(),
            holidays = scheduler.calendar().holiday_count(),
            utc_offset = %clock.offset(),
            "Application created"
        );

        Ok(Self {
            config,
            clock,
            scheduler,
            fetcher,
            hub,
            state_store,
            journal,
            daily_stats,
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run the tick loop until Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        let poll_interval = self.config.scheduler.poll_interval();
        info!(poll_interval_secs = poll_interval.as_secs(), "Entering tick loop");

        let mut tick_interval = tokio::time::interval(poll_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats_interval = tokio::time::interval(self.config.stats_interval());
        // the first tick of an interval completes immediately
        stats_interval.tick().await;

        let mut tick_count = 0u64;
        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    tick_count += 1;
                    let now = self.clock.now();
                    self.run_tick(now).await;
                }

                _ = stats_interval.tick() => {
                    info!("Outputting periodic statistics summary");
                    self.daily_stats.output_summary();
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(tick_count, "Shutting down");
        self.shutdown();
        Ok(())
    }

    /// Run a single tick at the current time, then shut down.
    pub async fn run_once(mut self) -> AppResult<()> {
        let now = self.clock.now();
        if let Some(report) = self.run_tick(now).await {
            info!(
                class = report.classification.label(),
                notices = report.notices.len(),
                "Single tick complete"
            );
        }
        self.shutdown();
        Ok(())
    }

    /// Run one tick, containing any panic.
    ///
    /// Returns `None` if the tick panicked.
    pub async fn run_tick(&mut self, now: CivilTime) -> Option<TickReport> {
        match AssertUnwindSafe(self.process_tick(&now)).catch_unwind().await {
            Ok(report) => Some(report),
            Err(payload) => {
                Metrics::tick_panic();
                error!(
                    civil_time = %format_args!("{} {:02}:{:02}", now.date, now.hour, now.minute),
                    panic = %panic_message(payload.as_ref()),
                    "Tick panicked, continuing with next tick"
                );
                None
            }
        }
    }

    async fn process_tick(&mut self, now: &CivilTime) -> TickReport {
        let report = self.scheduler.tick(now, self.fetcher.as_ref()).await;

        Metrics::tick(report.classification.label());
        if let Some(result) = report.fetch.result_label() {
            Metrics::fetch(result);
        }
        debug!(
            class = report.classification.label(),
            notices = report.notices.len(),
            day_rolled = report.day_rolled,
            "Tick processed"
        );

        for notice in &report.notices {
            let message = render_notice(notice);
            Metrics::notice(message.kind.as_str());

            let delivery = self.hub.deliver(&message).await;
            for outcome in &delivery.outcomes {
                Metrics::dispatch(&outcome.channel, outcome.is_ok());
            }
            if delivery.is_empty() {
                warn!(kind = %message.kind, audience = ?message.audience, "Notice had no channel");
            } else {
                info!(
                    kind = %message.kind,
                    delivered = delivery.delivered_count(),
                    failed = delivery.failed_count(),
                    "Notice dispatched"
                );
            }

            self.journal_notice(now.date.gregorian, &message, &delivery);
        }

        self.save_state();
        report
    }

    fn journal_notice(&mut self, civil_date: NaiveDate, message: &RenderedMessage, delivery: &DeliveryReport) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };

        let record = NoticeRecord {
            recorded_at: Utc::now(),
            civil_date,
            kind: message.kind,
            audience: message.audience,
            text: message.text.clone(),
            deliveries: delivery
                .outcomes
                .iter()
                .map(|o| DeliveryRecord {
                    channel: o.channel.clone(),
                    ok: o.is_ok(),
                    error: o.result.as_ref().err().map(ToString::to_string),
                })
                .collect(),
        };

        if let Err(e) = journal.append(&record) {
            warn!(error = %e, kind = %message.kind, "Failed to journal notice");
        }
    }

    fn save_state(&self) {
        if let Some(store) = &self.state_store {
            if let Err(e) = store.save(self.scheduler.state()) {
                warn!(error = %e, path = %store.path().display(), "Failed to save scheduling state");
            }
        }
    }

    fn shutdown(&mut self) {
        info!("Final statistics summary:");
        self.daily_stats.output_summary();
        self.save_state();
        if let Some(journal) = self.journal.as_mut() {
            journal.close();
        }
    }
}

/// Build the channel hub from enabled channels.
fn build_hub(config: &AppConfig, dry_run: bool) -> AppResult<ChannelHub> {
    let mut hub = ChannelHub::new();

    for channel in config.enabled_channels() {
        if dry_run {
            hub.add_channel(channel.audience, Arc::new(LogDispatcher::new(channel.name.clone())));
        } else {
            hub.add_channel(channel.audience, Arc::new(BotApiDispatcher::new(channel)?));
        }
    }

    if dry_run {
        // keep every notice visible in the log even without configured channels
        for audience in [Audience::Subscribers, Audience::Operator] {
            if hub.channels_for(audience) == 0 {
                hub.add_channel(audience, Arc::new(LogDispatcher::new("dry-run")));
            }
        }
    }

    Ok(hub)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
