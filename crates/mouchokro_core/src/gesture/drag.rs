//! Drag gestures and the board pan accumulator.

use crate::model::member::MemberId;
use crate::model::position::Position;

/// Session-only translation applied to the whole board layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanOffset {
    offset: Position,
}

impl PanOffset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one drag delta to the offset.
    ///
    /// The offset is never overwritten with an absolute pointer position.
    /// A delta that would leave the offset non-finite is dropped.
    pub fn apply(&mut self, dx: f64, dy: f64) -> bool {
        let next = self.offset.translated(dx, dy);
        if !next.is_finite() {
            return false;
        }
        self.offset = next;
        true
    }

    pub fn offset(&self) -> Position {
        self.offset
    }
}

/// What a gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Pans the board layer.
    Board,
    /// Moves one member cell inside the panned layer.
    Member(MemberId),
}

/// One in-flight pointer gesture.
///
/// Deltas are handed out in arrival order, each one applied by the caller
/// before the next is accepted. Once ended or cancelled the session accepts
/// no further deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    target: DragTarget,
    travelled: Position,
    events: u64,
    open: bool,
}

impl DragSession {
    pub fn start(target: DragTarget) -> Self {
        Self {
            target,
            travelled: Position::ORIGIN,
            events: 0,
            open: true,
        }
    }

    pub fn target(&self) -> DragTarget {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Records one delta and returns it when the session is still open.
    pub fn accept(&mut self, dx: f64, dy: f64) -> Option<(f64, f64)> {
        if !self.open {
            return None;
        }
        self.travelled = self.travelled.translated(dx, dy);
        self.events += 1;
        Some((dx, dy))
    }

    /// Total delta accepted so far.
    pub fn travelled(&self) -> Position {
        self.travelled
    }

    pub fn event_count(&self) -> u64 {
        self.events
    }

    /// Closes the session; already applied deltas stay applied.
    pub fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{DragSession, DragTarget, PanOffset};
    use crate::model::position::Position;

    #[test]
    fn pan_accumulates_deltas() {
        let mut pan = PanOffset::new();
        pan.apply(10.0, -5.0);
        pan.apply(-3.0, 8.0);
        assert_eq!(pan.offset(), Position::new(7.0, 3.0));
    }

    #[test]
    fn overflowing_delta_leaves_offset_unchanged() {
        let mut pan = PanOffset::new();
        assert!(pan.apply(1e308, 0.0));
        assert!(!pan.apply(1e308, 0.0));
        assert!(!pan.apply(f64::NAN, 0.0));
        assert_eq!(pan.offset(), Position::new(1e308, 0.0));
    }

    #[test]
    fn closed_session_rejects_deltas() {
        let mut session = DragSession::start(DragTarget::Board);
        assert_eq!(session.accept(1.0, 2.0), Some((1.0, 2.0)));
        session.close();
        assert_eq!(session.accept(5.0, 5.0), None);
        assert_eq!(session.travelled(), Position::new(1.0, 2.0));
        assert_eq!(session.event_count(), 1);
    }
}
