//! Event script parser.
//!
//! An event script is a recorded stream of enter/exit notifications that can
//! be replayed through a trace store offline. Three layouts are accepted:
//!
//! ```text
//! [ {"seq": 1, "event": "enter", "name": "f", "attributes": {"a": 1}}, ... ]
//! {"events": [ ... ]}
//! {"seq": 1, "event": "enter", "name": "f"}      <- one event per line
//! ```
//!
//! `seq` defaults to 0 and `attributes` to empty. In the line layout, blank
//! lines and lines starting with `//` are skipped.

use crate::recorder::{Attributes, SequenceId};
use crate::store::TraceStore;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Direction of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[serde(alias = "start", alias = "pre")]
    Enter,
    #[serde(alias = "end", alias = "post")]
    Exit,
}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Logical sequence (thread) the event was observed on
    #[serde(default, alias = "thread")]
    pub seq: u64,

    #[serde(alias = "kind")]
    pub event: EventKind,

    /// Fully-qualified name of the callable
    pub name: String,

    /// Attributes (enter events only; ignored on exit)
    #[serde(default)]
    pub attributes: Attributes,
}

impl TraceEvent {
    pub fn enter(seq: u64, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            seq,
            event: EventKind::Enter,
            name: name.into(),
            attributes,
        }
    }

    pub fn exit(seq: u64, name: impl Into<String>) -> Self {
        Self {
            seq,
            event: EventKind::Exit,
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Deliver this event to `store` on its recorded sequence
    pub fn apply(&self, store: &TraceStore) {
        let seq = SequenceId(self.seq);
        match self.event {
            EventKind::Enter => store.start_on(seq, self.name.as_str(), self.attributes.clone()),
            EventKind::Exit => store.end_on(seq, &self.name),
        }
    }
}

/// Parse an event script
///
/// **Public** - main entry point for parsing
///
/// Individual malformed events are logged and skipped.
///
/// # Errors
/// * `ParseError::JsonError` - top-level JSON is malformed
/// * `ParseError::InvalidFormat` - empty script, unknown layout, or no event parsed
/// * `ParseError::InvalidEvent` - an event in an array has an empty name
/// * `ParseError::InvalidLine` - an event line has an empty name
pub fn parse_events(input: &str) -> Result<Vec<TraceEvent>, ParseError> {
    let trimmed = input.trim_start();

    if trimmed.is_empty() {
        return Err(ParseError::InvalidFormat("Event script is empty".to_string()));
    }

    let events = if trimmed.starts_with('[') {
        let raw: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        parse_events_array(&raw)?
    } else if looks_like_document(trimmed) {
        let doc: serde_json::Value = serde_json::from_str(trimmed)?;
        match doc.get("events").and_then(|v| v.as_array()) {
            Some(raw) => parse_events_array(raw)?,
            None => {
                return Err(ParseError::InvalidFormat(
                    "Expected an \"events\" array".to_string(),
                ))
            }
        }
    } else {
        parse_event_lines(input)?
    };

    debug!("Parsed {} events", events.len());

    Ok(events)
}

/// Check parsed events for values serde cannot reject
///
/// **Public** - can be called on hand-built event lists
///
/// # Errors
/// * `ParseError::InvalidEvent` - carries the 1-based position in `events`
pub fn validate_event_format(events: &[TraceEvent]) -> Result<(), ParseError> {
    for (index, event) in events.iter().enumerate() {
        if let Some(reason) = event_problem(event) {
            return Err(ParseError::InvalidEvent {
                index: index + 1,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

fn event_problem(event: &TraceEvent) -> Option<&'static str> {
    if event.name.trim().is_empty() {
        return Some("event name is empty");
    }
    None
}

/// A single JSON object spanning the whole input, as opposed to JSON Lines
///
/// **Private** - layout detection
fn looks_like_document(trimmed: &str) -> bool {
    trimmed.starts_with('{')
        && serde_json::from_str::<serde_json::Value>(trimmed)
            .map(|v| v.get("events").is_some())
            .unwrap_or(false)
}

/// Parse an array of event values
///
/// **Private** - internal parsing logic
fn parse_events_array(raw: &[serde_json::Value]) -> Result<Vec<TraceEvent>, ParseError> {
    let mut events = Vec::with_capacity(raw.len());

    for (index, value) in raw.iter().enumerate() {
        match serde_json::from_value::<TraceEvent>(value.clone()) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Failed to parse event {}: {}", index, e),
        }
    }

    if events.is_empty() && !raw.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All events failed to parse".to_string(),
        ));
    }

    validate_event_format(&events)?;
    Ok(events)
}

/// Parse one event per line
///
/// **Private** - internal parsing logic
fn parse_event_lines(input: &str) -> Result<Vec<TraceEvent>, ParseError> {
    let mut events = Vec::new();
    let mut candidates = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        candidates += 1;
        match serde_json::from_str::<TraceEvent>(line) {
            Ok(event) => {
                if let Some(reason) = event_problem(&event) {
                    return Err(ParseError::InvalidLine {
                        line: index + 1,
                        reason: reason.to_string(),
                    });
                }
                events.push(event);
            }
            Err(e) => warn!("Failed to parse event on line {}: {}", index + 1, e),
        }
    }

    if events.is_empty() {
        let reason = if candidates == 0 {
            "Event script has no events"
        } else {
            "All events failed to parse"
        };
        return Err(ParseError::InvalidFormat(reason.to_string()));
    }

    Ok(events)
}
