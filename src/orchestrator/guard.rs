//! Staleness protection for in-flight collaborator requests.
//!
//! Every dispatched request is stamped with a [`Ticket`] at dispatch intent.
//! The sequencer records which ticket is live for each request slot; when a
//! completion arrives, its ticket is compared against the live one and the
//! completion is discarded on mismatch. Resets and phase changes simply stop
//! tracking the old ticket, which retires every outstanding request without
//! touching the tasks themselves.

/// Identity of a single dispatched request.
///
/// Tickets are unique within a session and never reissued, so equality with
/// the live ticket proves the originating context still stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic ticket source, one per session.
#[derive(Debug, Clone, Default)]
pub struct TicketCounter {
    next: u64,
}

impl TicketCounter {
    /// Creates a counter starting at ticket `#0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket.
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket(self.next);
        self.next += 1;
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_are_unique_and_ordered() {
        let mut counter = TicketCounter::new();
        let a = counter.issue();
        let b = counter.issue();
        let c = counter.issue();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ticket_comparison_detects_stale() {
        let mut counter = TicketCounter::new();
        let stale = counter.issue();
        let live = counter.issue();

        // The slot tracks only the newest dispatch.
        let slot = Some(live);
        assert_ne!(slot, Some(stale));
        assert_eq!(slot, Some(live));
    }
}
