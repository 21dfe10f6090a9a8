//! Screen-space gestures mapped onto engine edits.
//!
//! Drags are given in normalised device coordinates (both axes in `[-1, 1]`,
//! y up) and become velocities on the ecliptic (xz) plane.

use ultraviolet::DVec3;

use crate::{body::Body, error::SimError, simulation::Simulation};

/// AU/day per NDC unit of drag.
pub const DRAG_GAIN: f64 = 0.22;

pub const SPAWN_MASS: f64 = 1e-6;
pub const SPAWN_RADIUS: f64 = 3e-5;
pub const SPAWN_COLOR: u32 = 0x58f0b3;

/// Converts a drag from `start` to `end` into a velocity on the xz plane.
/// Dragging up the screen points towards -z.
pub fn drag_velocity(start: (f64, f64), end: (f64, f64)) -> DVec3 {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    DVec3::new(dx * DRAG_GAIN, 0.0, -dy * DRAG_GAIN)
}

/// A light free body at `pos` with a random `x…` id.
pub fn spawn_body(rng: &mut fastrand::Rng, pos: DVec3, vel: DVec3) -> Body {
    let tag = rng.u32(..);
    let id = format!("x{:x}", tag);
    let name = format!("Body {:04X}", tag >> 16);
    Body::new(id, name, SPAWN_MASS, SPAWN_RADIUS, pos, vel).with_color(SPAWN_COLOR)
}

/// "Kick" gesture: the drag becomes Δv on body `id`.
pub fn kick(sim: &mut Simulation, id: &str, start: (f64, f64), end: (f64, f64)) -> Result<bool, SimError> {
    sim.apply_impulse(id, drag_velocity(start, end))
}

/// "Add" gesture: a new body at `pos` whose initial velocity is the drag.
/// Returns the new body's id.
pub fn add(
    sim: &mut Simulation,
    rng: &mut fastrand::Rng,
    pos: DVec3,
    start: (f64, f64),
    end: (f64, f64),
) -> Result<String, SimError> {
    let body = spawn_body(rng, pos, drag_velocity(start, end));
    let id = body.id.clone();
    sim.insert_body(body)?;
    Ok(id)
}
