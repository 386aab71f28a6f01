//! Per request state machine.
//!
//! ```text
//! Received -> Accumulating -> Routed -> Dispatched -> Responded -> Closed
//!     \____________\______________\__________\________________________/
//!                           abort (connection reset)
//! ```
use crate::{error::ProtocolViolation, log};

/// Request lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Accumulating,
    Routed,
    Dispatched,
    Responded,
    Closed,
}

impl Phase {
    fn can_advance(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Received, Accumulating)
                | (Accumulating, Routed)
                | (Routed, Dispatched)
                | (Dispatched, Responded)
        ) || (to == Closed && self != Closed)
    }
}

/// Tracks the [`Phase`] of one request.
///
/// Dropping a lifecycle before [`Phase::Closed`] is treated as an abort.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { phase: Phase::Received }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to the next phase.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::InvalidTransition`] if `to` is not reachable from the
    /// current phase, the phase is left unchanged.
    pub fn advance(&mut self, to: Phase) -> Result<(), ProtocolViolation> {
        if !self.phase.can_advance(to) {
            return Err(ProtocolViolation::InvalidTransition { from: self.phase, to });
        }
        log::trace!("request lifecycle {:?} -> {to:?}", self.phase);
        self.phase = to;
        Ok(())
    }

    /// Close the request, from any phase.
    pub fn close(&mut self) {
        if self.phase != Phase::Closed {
            if self.phase != Phase::Responded {
                log::debug!("request aborted in {:?}", self.phase);
            }
            self.phase = Phase::Closed;
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.close();
    }
}
