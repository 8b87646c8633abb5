//! Plain-text rendering of notices.

use crate::dispatcher::RenderedMessage;
use pricewatch_core::{Price, Quote, Snapshot};
use pricewatch_detector::SignificantChange;
use pricewatch_scheduler::Notice;
use std::fmt::Write;

/// Render a notice into a message for its audience.
pub fn render_notice(notice: &Notice) -> RenderedMessage {
    let text = match notice {
        Notice::Holiday { date, name } => {
            let mut text = format!("Market closed today, {date}");
            if let Some(name) = name {
                let _ = write!(text, " ({name})");
            }
            text.push_str("\nNo price updates today.");
            text
        }
        Notice::SuspiciousHoliday { date, name } => format!(
            "Holiday check: {date} ({}) matched the fixed holiday {} on a regular weekday. \
             Verify the holiday list.",
            date.weekday,
            name.as_deref().unwrap_or("(unnamed)")
        ),
        Notice::SessionOpen { date } => format!("Market session open, {date}"),
        Notice::SessionClose { date } => format!("Market session closed, {date}"),
        Notice::Routine { snapshot } => render_snapshot(snapshot),
        Notice::Emergency {
            changes,
            snapshot_time,
        } => render_emergency(changes, snapshot_time.as_deref()),
    };

    RenderedMessage {
        kind: notice.kind(),
        audience: notice.audience(),
        text,
    }
}

fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut text = String::from("Price update");
    if let Some(ts) = &snapshot.timestamp {
        let _ = write!(text, " ({ts})");
    }
    for quote in snapshot.iter() {
        let _ = write!(text, "\n{}", render_quote(quote));
    }
    text
}

fn render_quote(quote: &Quote) -> String {
    match quote.price {
        Some(price) => format!(
            "{}: {} ({:+.2}%)",
            quote.symbol.label(),
            format_price(price),
            quote.change_percent
        ),
        None => format!("{}: n/a", quote.symbol.label()),
    }
}

fn render_emergency(changes: &[SignificantChange], snapshot_time: Option<&str>) -> String {
    let mut text = String::from("ALERT: significant price move");
    if let Some(ts) = snapshot_time {
        let _ = write!(text, " ({ts})");
    }
    for change in changes {
        let _ = write!(
            text,
            "\n{}: {} -> {} ({:+.2}%)",
            change.symbol.label(),
            format_price(change.previous_price),
            format_price(change.new_price),
            change.rounded_percent()
        );
    }
    text
}

/// Format a price with thousands separators, e.g. `6,512,300.5`.
pub fn format_price(price: Price) -> String {
    let raw = price.inner().normalize().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
