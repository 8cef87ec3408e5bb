use tracing::debug;

/// Minimal event type for traceability.
///
/// Structured text with a monotonically increasing sequence number; every
/// event is also forwarded to `tracing` at debug level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventLog {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        debug!(kind, %message, "engine event");
        self.events.push(Event {
            seq: self.next_seq,
            kind,
            message,
        });
        self.next_seq += 1;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().map(|e| e.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::EventLog;

    #[test]
    fn records_events_in_sequence() {
        let mut log = EventLog::new();
        log.emit("test", "hello");
        log.emit("test", "again");
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.events()[1].seq, 1);
        assert_eq!(log.kinds().collect::<Vec<_>>(), vec!["test", "test"]);
    }
}
