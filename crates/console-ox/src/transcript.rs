use serde::{Deserialize, Serialize};

use crate::event::StreamEvent;

/// Ordered event log for one streaming request.
///
/// Exactly one writer (the request's read loop) appends; any number of
/// readers take snapshots. A terminal event ([`StreamEvent::Completion`] or
/// [`StreamEvent::StreamError`]) seals the transcript: later appends are
/// rejected, so the terminal event is always last.
#[derive(Debug, Default)]
pub struct Transcript {
    events: Vec<StreamEvent>,
    current_text: String,
    sealed: bool,
}

/// Point-in-time copy of a transcript, cheap for render paths to hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub events: Vec<StreamEvent>,
    pub current_text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event, maintaining the terminal-event and text invariants.
    ///
    /// Token text is folded into `current_text` as it arrives, so readers
    /// never rescan the event list. Returns `false` (and appends nothing)
    /// once a terminal event has been recorded.
    pub fn append(&mut self, event: StreamEvent) -> bool {
        if self.sealed {
            tracing::debug!(
                dropped = %event.event_type(),
                "rejecting event appended after terminal event"
            );
            return false;
        }

        if let StreamEvent::Token { text } = &event {
            self.current_text.push_str(text);
        }
        if event.is_terminal() {
            self.sealed = true;
        }
        self.events.push(event);
        true
    }

    /// All events appended so far, in arrival order.
    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }

    /// Concatenation of every token fragment seen so far.
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Whether a terminal event has been appended.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The terminal event, if the stream has ended.
    pub fn terminal_event(&self) -> Option<&StreamEvent> {
        if self.sealed { self.events.last() } else { None }
    }

    /// The answer text to display once the stream is over: the completion's
    /// text when the backend sent one, the accumulated token text otherwise.
    pub fn final_text(&self) -> &str {
        match self.terminal_event() {
            Some(StreamEvent::Completion { final_text, .. }) if !final_text.is_empty() => {
                final_text
            }
            _ => &self.current_text,
        }
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            events: self.events.clone(),
            current_text: self.current_text.clone(),
        }
    }
}
