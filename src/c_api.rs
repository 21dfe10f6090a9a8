use crate::{gesture, presets::Preset, simulation::Simulation};
use ultraviolet::DVec3;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_Create() -> *mut Simulation {
    Box::into_raw(Box::new(Simulation::new()))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Loads preset `index` (see [`Preset::ALL`]). Returns false for an unknown index.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_LoadPreset(handle: *mut Simulation, index: usize) -> bool {
    let (Some(sim), Some(&preset)) = (unsafe { handle.as_mut() }, Preset::ALL.get(index)) else {
        return false;
    };
    sim.set_bodies(&preset.bodies());
    true
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_Step(handle: *mut Simulation, n: usize) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.step(n);
    }
}

/// Steps one rendered frame. Returns the number of steps taken.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_AdvanceFrame(handle: *mut Simulation) -> usize {
    unsafe { handle.as_mut() }.map_or(0, |sim| sim.advance_frame())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.len())
}

/// Writes `x, y, z` for each body into `out` (capacity `len` doubles).
/// Returns the number of bodies written.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_CopyPositions(handle: *const Simulation, out: *mut f64, len: usize) -> usize {
    let Some(sim) = (unsafe { handle.as_ref() }) else {
        return 0;
    };
    if out.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees `out` points to `len` writable doubles.
    let out = unsafe { std::slice::from_raw_parts_mut(out, len) };
    let mut written = 0;
    for (chunk, body) in out.chunks_exact_mut(3).zip(sim.bodies()) {
        chunk.copy_from_slice(&[body.pos.x, body.pos.y, body.pos.z]);
        written += 1;
    }
    written
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_GetElapsedDays(handle: *const Simulation) -> f64 {
    unsafe { handle.as_ref() }.map_or(0.0, |sim| sim.elapsed_days())
}

/// Writes kinetic, potential and total energy into `out[0..3]`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_GetEnergy(handle: *const Simulation, out: *mut f64) {
    let Some(sim) = (unsafe { handle.as_ref() }) else {
        return;
    };
    if out.is_null() {
        return;
    }
    let e = sim.total_energy();
    // SAFETY: caller guarantees `out` points to 3 writable doubles.
    unsafe { std::slice::from_raw_parts_mut(out, 3) }.copy_from_slice(&[e.kinetic, e.potential, e.total]);
}

/// Adds `(dvx, dvy, dvz)` to the velocity of the body at `index`.
/// Returns false for a bad index or an anchored body.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_ApplyImpulseAt(
    handle: *mut Simulation,
    index: usize,
    dvx: f64,
    dvy: f64,
    dvz: f64,
) -> bool {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return false;
    };
    let Some(id) = sim.bodies().get(index).map(|b| b.id.clone()) else {
        return false;
    };
    sim.apply_impulse(&id, DVec3::new(dvx, dvy, dvz)).unwrap_or(false)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetPaused(handle: *mut Simulation, paused: bool) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.paused = paused;
    }
}

/// Returns false (and keeps the old value) unless `dt` is positive and finite.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetDt(handle: *mut Simulation, dt: f64) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| sim.set_dt(dt).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetTimeScale(handle: *mut Simulation, time_scale: f64) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.time_scale = time_scale;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetGScale(handle: *mut Simulation, g_scale: f64) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.g_scale = g_scale;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetDamping(handle: *mut Simulation, damping: f64) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.damping = damping;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetSoftening(handle: *mut Simulation, softening: f64) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.softening = softening;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetMergeOnCollision(handle: *mut Simulation, merge: bool) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.merge_on_collision = merge;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_SetCollisionRadiusScale(handle: *mut Simulation, scale: f64) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.params.collision_radius_scale = scale;
    }
}

/// Appends a free body with a generated id. Returns its index, or -1 on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Sim_InsertBody(
    handle: *mut Simulation,
    x: f64,
    y: f64,
    z: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    mass: f64,
    radius: f64,
) -> isize {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return -1;
    };
    let mut rng = fastrand::Rng::new();
    let mut body = gesture::spawn_body(&mut rng, DVec3::new(x, y, z), DVec3::new(vx, vy, vz));
    body.mass = mass;
    body.radius = radius;
    let index = sim.len() as isize;
    match sim.insert_body(body) {
        Ok(()) => index,
        Err(_) => -1,
    }
}
