//! JSON Lines journal of dispatched notices.
//!
//! One file per civil day (`notices_YYYY-MM-DD.jsonl`), opened in append
//! mode. Each line is a complete record, so an interrupted write only
//! loses that line.

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, NaiveDate, Utc};
use pricewatch_scheduler::{Audience, NoticeKind};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of sending one notice to one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub channel: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeRecord {
    pub recorded_at: DateTime<Utc>,
    pub civil_date: NaiveDate,
    pub kind: NoticeKind,
    pub audience: Audience,
    /// Rendered text as sent.
    pub text: String,
    pub deliveries: Vec<DeliveryRecord>,
}

/// Active writer state for the daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    date: NaiveDate,
    records_written: usize,
}

/// Daily-rotated notice journal.
pub struct NoticeJournal {
    base_dir: PathBuf,
    active_writer: Option<ActiveWriter>,
}

impl NoticeJournal {
    /// Create a journal under `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir).map_err(PersistenceError::io(&base_dir))?;
        Ok(Self {
            base_dir,
            active_writer: None,
        })
    }

    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.base_dir
            .join(format!("notices_{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append a record to the file of its civil date.
    pub fn append(&mut self, record: &NoticeRecord) -> PersistenceResult<()> {
        let needs_rotation = self
            .active_writer
            .as_ref()
            .is_some_and(|w| w.date != record.civil_date);
        if needs_rotation {
            self.close_active_writer();
        }

        let active = match self.active_writer.take() {
            Some(active) => active,
            None => self.open_writer(record.civil_date)?,
        };
        let active = self.active_writer.insert(active);

        let json = serde_json::to_string(record)?;
        writeln!(active.writer, "{json}")
            .and_then(|_| active.writer.flush())
            .map_err(PersistenceError::io(&active.path))?;
        active.records_written += 1;

        debug!(date = %record.civil_date, kind = %record.kind, "Journalled notice");
        Ok(())
    }

    fn open_writer(&self, date: NaiveDate) -> PersistenceResult<ActiveWriter> {
        let path = self.file_path(date);
        info!(path = %path.display(), "Opening notice journal (append mode)");

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(PersistenceError::io(&path))?;
        Ok(ActiveWriter {
            writer: BufWriter::new(file),
            path,
            date,
            records_written: 0,
        })
    }

    fn close_active_writer(&mut self) {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(path = %active.path.display(), error = %e, "Failed to flush journal on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "Closed notice journal"
            );
        }
    }

    /// Flush and close the current file.
    pub fn close(&mut self) {
        self.close_active_writer();
    }
}

impl Drop for NoticeJournal {
    fn drop(&mut self) {
        self.close_active_writer();
    }
}
