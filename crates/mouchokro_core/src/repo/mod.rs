//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable key-value contract used for board state.
//! - Isolate SQLite and JSON codec details from the board controller.
//!
//! # Invariants
//! - Board records are stored as JSON text under fixed keys.
//! - Typed loads fail soft: unreadable or malformed records read as absent.

pub mod board_repo;
pub mod kv_repo;
