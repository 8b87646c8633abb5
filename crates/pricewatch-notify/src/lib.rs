//! Notice rendering and dispatch.
//!
//! - `render_notice`: plain-text rendering of scheduler notices
//! - `Dispatcher`: one outbound chat channel
//! - `BotApiDispatcher`: Telegram/Bale Bot API `sendMessage`
//! - `ChannelHub`: concurrent fan-out by audience with per-channel results

pub mod bot_api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod render;

pub use bot_api::BotApiDispatcher;
pub use config::{ChannelConfig, ChannelKind};
pub use dispatcher::{BoxFuture, Dispatcher, DynDispatcher, LogDispatcher, MockDispatcher, RenderedMessage};
pub use error::{DispatchError, DispatchResult};
pub use hub::{ChannelHub, ChannelOutcome, DeliveryReport};
pub use render::{format_price, render_notice};
