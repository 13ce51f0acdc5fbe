//! Chat command parsing.
//!
//! Recognizes `/start`, `/help` and `/track <number> [carrier]` (optionally
//! addressed as `/track@botname`). A message made of a single token containing
//! a digit is read as a bare tracking number.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::{CarrierHint, Command, TrackingQuery};

/// Longest carrier name in words, e.g. `DHL Paket`.
const MAX_CARRIER_WORDS: usize = 2;

static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^/([A-Za-z_]+)(?:@\w+)?(?:\s+(.*))?$").expect("static regex compile")
});

static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]*\d[A-Za-z0-9-]*$").expect("static regex compile"));

/// Maps a raw message text to a [`Command`].
///
/// # Examples
///
/// ```
/// use parcelbot::core::models::{CarrierHint, Command, TrackingQuery};
/// use parcelbot::telegram::parse_command;
///
/// assert_eq!(parse_command("/start"), Command::Start);
/// assert_eq!(
///     parse_command("/track 5532 4177 63"),
///     Command::Track(TrackingQuery::new("5532417763"))
/// );
/// assert_eq!(
///     parse_command("/track JJD0001234567 dhl-paket"),
///     Command::Track(TrackingQuery::with_carrier("JJD0001234567", CarrierHint::DhlPaket))
/// );
/// assert_eq!(parse_command("hello there"), Command::Unrecognized);
/// ```
#[must_use]
pub fn parse_command(text: &str) -> Command {
    let text = text.trim();

    if let Some(caps) = COMMAND_RE.captures(text) {
        let name = caps[1].to_ascii_lowercase();
        let argument = caps.get(2).map_or("", |m| m.as_str());
        return match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "track" => Command::Track(parse_track_argument(argument)),
            _ => Command::Unrecognized,
        };
    }

    if BARE_NUMBER_RE.is_match(text) {
        return Command::Track(TrackingQuery::new(text));
    }

    Command::Unrecognized
}

/// Splits a `/track` argument into the number and an optional trailing
/// carrier name. Carrier words never contain digits, so a number typed with
/// spaces is not mistaken for a numeric carrier code.
fn parse_track_argument(raw: &str) -> TrackingQuery {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    for words in (1..=MAX_CARRIER_WORDS).rev() {
        if tokens.len() <= words {
            continue;
        }
        let (number, tail) = tokens.split_at(tokens.len() - words);
        if tail.iter().any(|word| word.chars().any(|c| c.is_ascii_digit())) {
            continue;
        }
        if let Ok(hint) = tail.join(" ").parse::<CarrierHint>() {
            return TrackingQuery::with_carrier(number.concat(), hint);
        }
    }

    TrackingQuery::new(tokens.concat())
}
