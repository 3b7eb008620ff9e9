//! Spatial layout for member cells.
//!
//! # Responsibility
//! - Compute the initial anchor of a newly added member cell.
//! - Derive connection line end points from stored anchors.
//!
//! # Invariants
//! - Placement is a pure function of the creation index.

pub mod spiral;

pub use spiral::{cell_center, compute_placement, placement_radius, CELL_HEIGHT, CELL_WIDTH};
