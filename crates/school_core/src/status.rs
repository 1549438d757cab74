//! Transient status-line state for the UI collaborator.
//!
//! # Responsibility
//! - Hold the current status message and hand out tickets for delayed clears.
//!
//! # Invariants
//! - Tickets increase monotonically; each `set` invalidates older tickets.
//! - `clear_if_current` never clears a message newer than its ticket.

/// Identity of one status message, used to key its delayed clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusTicket(u64);

/// Current status message plus the ticket that set it.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<String>,
    latest: u64,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the message and returns the ticket for a later clear.
    pub fn set(&mut self, text: impl Into<String>) -> StatusTicket {
        self.latest += 1;
        self.message = Some(text.into());
        StatusTicket(self.latest)
    }

    /// Clears the message only if `ticket` is still the latest one.
    ///
    /// Returns whether the message was cleared.
    pub fn clear_if_current(&mut self, ticket: StatusTicket) -> bool {
        if ticket.0 != self.latest || self.message.is_none() {
            return false;
        }
        self.message = None;
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::StatusLine;

    #[test]
    fn stale_ticket_does_not_clear_newer_message() {
        let mut status = StatusLine::new();
        let first = status.set("Saved student 1");
        let second = status.set("Saved student 2");

        assert!(!status.clear_if_current(first));
        assert_eq!(status.current(), Some("Saved student 2"));

        assert!(status.clear_if_current(second));
        assert_eq!(status.current(), None);
    }

    #[test]
    fn clearing_twice_is_a_no_op() {
        let mut status = StatusLine::new();
        let ticket = status.set("Enrolled");
        assert!(status.clear_if_current(ticket));
        assert!(!status.clear_if_current(ticket));
    }
}
