//! Pan/drag coordinate model.
//!
//! # Responsibility
//! - Accumulate board-level pan deltas into a session-only offset.
//! - Model one pointer gesture as an ordered stream of deltas to one target.
//!
//! # Invariants
//! - Pan offset and member anchors are independent; they only compose at
//!   render time.
//! - At most one gesture is active at a time.
//! - There is no momentum: a released gesture leaves positions untouched.

pub mod drag;

pub use drag::{DragSession, DragTarget, PanOffset};
