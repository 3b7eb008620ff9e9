//! Board domain model.
//!
//! # Responsibility
//! - Define the records persisted by the board (`Topic`, `Member`).
//! - Define per-field update values used by the board controller.
//!
//! # Invariants
//! - Every member is identified by a stable `MemberId`.
//! - Removal is a hard delete; there are no tombstones.

pub mod member;
pub mod position;
pub mod topic;
