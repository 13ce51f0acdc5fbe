//! Rendering of bot replies as Telegram HTML.

use crate::core::models::{HistoryEntry, SummaryDetail, TrackingSummary};

use super::client::MESSAGE_TEXT_LIMIT;

/// Cap on one escaped header value. Eight of them plus labels stay well below
/// [`MESSAGE_TEXT_LIMIT`], leaving the rest for history.
pub const FIELD_VALUE_LIMIT: usize = 400;

const ELLIPSIS: char = '…';

fn html_entity(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match html_entity(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Escapes `text` and cuts it to at most `max_chars` characters of output,
/// ending with an ellipsis when shortened. Entities are never split.
#[must_use]
pub fn escape_html_truncated(text: &str, max_chars: usize) -> String {
    let width = |ch: char| html_entity(ch).map_or(1, str::len);

    if text.chars().map(width).sum::<usize>() <= max_chars {
        return escape_html(text);
    }

    let budget = max_chars.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = width(ch);
        if used + w > budget {
            break;
        }
        match html_entity(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    out.push_str("<b>");
    out.push_str(label);
    out.push_str(":</b> ");
    out.push_str(&escape_html_truncated(value, FIELD_VALUE_LIMIT));
    out.push('\n');
}

fn format_history_line(entry: &HistoryEntry) -> String {
    let parts: Vec<String> = [&entry.timestamp, &entry.location, &entry.description]
        .into_iter()
        .flatten()
        .map(|part| escape_html(part))
        .collect();

    if parts.is_empty() {
        "• (no details)".to_string()
    } else {
        format!("• {}", parts.join(" · "))
    }
}

/// Renders a summary into one message.
///
/// # Examples
///
/// ```
/// use parcelbot::core::models::TrackingSummary;
/// use parcelbot::telegram::message_formatter::format_summary_message;
///
/// let summary = TrackingSummary::no_events("5532417763", "DHL Express".to_string());
/// let text = format_summary_message(&summary);
/// assert!(text.contains("<code>5532417763</code>"));
/// ```
#[must_use]
pub fn format_summary_message(summary: &TrackingSummary) -> String {
    let mut out = format!(
        "<b>Shipment</b> <code>{}</code>\n",
        escape_html_truncated(&summary.tracking_number, FIELD_VALUE_LIMIT)
    );

    push_field(&mut out, "Carrier", &summary.carrier);

    if summary.detail == SummaryDetail::Unparsed {
        out.push_str("\nThe shipment was found, but its details could not be read. Please try again later.");
        return out;
    }

    push_field(&mut out, "Status", &summary.status);
    push_field(&mut out, "Location", &summary.location);

    if let Some(ts) = &summary.last_update {
        push_field(&mut out, "Updated", ts);
    }
    if let Some(description) = &summary.description {
        push_field(&mut out, "Details", description);
    }
    if let Some(eta) = &summary.estimated_delivery {
        push_field(&mut out, "Estimated delivery", eta);
    }
    if let Some(contact) = &summary.carrier_contact {
        push_field(&mut out, "Carrier contact", contact);
    }

    if summary.detail == SummaryDetail::NoEventsYet {
        out.push_str("\nThe carrier knows this shipment but has not reported any events yet.");
        return out;
    }

    if !summary.history.is_empty() {
        out.push_str("\n<b>History</b>\n");
        for entry in &summary.history {
            let line = format_history_line(entry);
            if out.chars().count() + line.chars().count() + 1 > MESSAGE_TEXT_LIMIT {
                break;
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

/// Reply for a lookup where no attempt produced an accepted record.
#[must_use]
pub fn format_not_found_message(tracking_number: &str) -> String {
    format!(
        "No information for <code>{}</code> yet. The carrier may not have scanned it; please try again later.",
        escape_html(tracking_number)
    )
}

/// Reply for a tracking number that fails validation.
#[must_use]
pub fn format_invalid_number_message(min_len: usize) -> String {
    format!(
        "Please send a tracking number with at least {} characters, for example <code>/track 5532417763</code>.",
        min_len
    )
}
