/// Identifies one asynchronous load or export.
///
/// A completion whose ticket is no longer current belongs to a surface that
/// has since been replaced or torn down, and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Lifecycle of a raster editor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No base image; every gesture and history operation is a no-op
    #[default]
    Empty,
    /// An image load is in flight
    Loading { ticket: Ticket },
    /// A base image is loaded and input is accepted
    Ready,
    /// An export is encoding a snapshot of the surface
    Exporting { ticket: Ticket },
}

impl EditorState {
    /// Gestures, undo and redo are only accepted in `Ready`
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading { .. } | Self::Exporting { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading { .. } => "loading",
            Self::Ready => "ready",
            Self::Exporting { .. } => "exporting",
        }
    }
}

/// Hands out tickets; bumping invalidates every ticket issued before.
#[derive(Debug, Default)]
pub(crate) struct TicketCounter {
    next: u64,
}

impl TicketCounter {
    pub(crate) fn issue(&mut self) -> Ticket {
        self.next += 1;
        Ticket(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ready_accepts_input() {
        let mut counter = TicketCounter::default();
        let ticket = counter.issue();
        assert!(EditorState::Ready.accepts_input());
        assert!(!EditorState::Empty.accepts_input());
        assert!(!EditorState::Loading { ticket }.accepts_input());
        assert!(!EditorState::Exporting { ticket }.accepts_input());
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut counter = TicketCounter::default();
        assert_ne!(counter.issue(), counter.issue());
    }
}
