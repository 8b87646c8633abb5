//! Persistence for the pricewatch daemon.
//!
//! - `StateStore`: atomic JSON snapshot of the scheduling state, so that
//!   once-per-day notices survive a restart
//! - `NoticeJournal`: daily JSON Lines record of every dispatched notice

pub mod error;
pub mod journal;
pub mod state_store;

pub use error::{PersistenceError, PersistenceResult};
pub use journal::{DeliveryRecord, NoticeJournal, NoticeRecord};
pub use state_store::StateStore;
