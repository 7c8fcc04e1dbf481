//! Link status snapshot - wait-free observable connection state
//!
//! The link loop thread is the only writer; any number of readers take
//! consistent copies through `ArcSwap` without blocking the loop.

use arc_swap::ArcSwap;
use std::sync::Arc;

/// Discrete connection phase of the link controller
///
/// The controller is in exactly one phase at any observation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No confirmed remote presence; slow outbound cadence
    #[default]
    Searching,
    /// Initial connect attempt; deadline pending
    Connecting,
    /// Telemetry flowing; fast outbound cadence, missed-packet accounting
    Active,
}

/// Observable link status, derived from the loop's internal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStatus {
    /// True while telemetry responses keep arriving
    pub connected: bool,
    /// Consecutive outbound ticks since the last decoded inbound frame
    pub missed_packets: u32,
    /// Current connection phase
    pub phase: Phase,
}

/// Shared status cell; one writer (the link loop), many readers
#[derive(Default)]
pub(crate) struct StatusCell(ArcSwap<LinkStatus>);

impl StatusCell {
    pub(crate) fn get(&self) -> LinkStatus {
        **self.0.load()
    }

    pub(crate) fn set(&self, status: LinkStatus) {
        self.0.store(Arc::new(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_roundtrip() {
        let cell = StatusCell::default();
        assert_eq!(cell.get(), LinkStatus::default());

        let status = LinkStatus {
            connected: true,
            missed_packets: 3,
            phase: Phase::Active,
        };
        cell.set(status);
        assert_eq!(cell.get(), status);
    }

    #[test]
    fn test_default_phase_is_searching() {
        assert_eq!(Phase::default(), Phase::Searching);
        assert!(!LinkStatus::default().connected);
    }
}
