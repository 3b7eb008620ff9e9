//! Expanding-spiral placement.
//!
//! The Nth cell sits at angle `N * ANGLE_STEP` and radius
//! `BASE_RADIUS + N * RADIUS_STEP` around the board origin. The angular step
//! is below a full turn and the radius grows every step, so consecutive cells
//! never land on the same spot. This is a heuristic, not a packing: cells that
//! wrap around to a similar angle are kept apart by the larger radius.

use crate::model::position::Position;

pub const CELL_WIDTH: f64 = 220.0;
pub const CELL_HEIGHT: f64 = 250.0;

const ANGLE_STEP: f64 = 0.9;
const BASE_RADIUS: f64 = 240.0;
const RADIUS_STEP: f64 = 40.0;

/// Distance from the origin to the center of the Nth cell.
pub fn placement_radius(existing_count: usize) -> f64 {
    BASE_RADIUS + existing_count as f64 * RADIUS_STEP
}

/// Computes the top-left anchor for the member created after
/// `existing_count` others.
///
/// The anchor is the spiral point minus half the cell size, so the cell
/// renders centered on the spiral point.
pub fn compute_placement(existing_count: usize) -> Position {
    let angle = existing_count as f64 * ANGLE_STEP;
    let radius = placement_radius(existing_count);
    Position::new(
        radius * angle.cos() - CELL_WIDTH / 2.0,
        radius * angle.sin() - CELL_HEIGHT / 2.0,
    )
}

/// Visual center of a cell anchored at `anchor`.
pub fn cell_center(anchor: Position) -> Position {
    anchor.translated(CELL_WIDTH / 2.0, CELL_HEIGHT / 2.0)
}
