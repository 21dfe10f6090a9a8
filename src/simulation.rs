use crate::{
    body::Body,
    error::SimError,
    params::{self, Params},
};

use log::{debug, trace, warn};
use rayon::prelude::*;
use ultraviolet::DVec3;

use std::collections::HashMap;
use std::f64::consts::TAU;

/// Gravitational constant in AU³ / (M☉ · day²), chosen so that a circular
/// orbit at 1 AU around one solar mass has a period of 365.25 days.
pub const G0: f64 = (TAU * TAU) / (365.25 * 365.25);

/// Energy breakdown returned by [`Simulation::total_energy`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Energy {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

/// One body absorbed into another during a merge pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeEvent {
    pub survivor: String,
    pub absorbed: String,
    /// Simulated time (days) at the end of the step that produced the merge.
    pub elapsed: f64,
}

/// Owns the live bodies and advances them with velocity Verlet.
#[derive(Debug)]
pub struct Simulation {
    /// Tunables, read fresh at every step.
    pub params: Params,
    /// Caller-level gate consulted by [`Simulation::advance_frame`] only.
    pub paused: bool,
    /// Fan per-body updates out over rayon. Results are identical either way.
    pub parallel: bool,
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    elapsed: f64,
    merges: Vec<MergeEvent>,
    generation: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Minimum body count before `parallel` actually hands work to rayon.
    pub const PARALLEL_THRESHOLD: usize = 256;

    /// Creates an empty simulation (vacuum) with default parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            paused: false,
            parallel: false,
            bodies: Vec::new(),
            index: HashMap::new(),
            elapsed: 0.0,
            merges: Vec::new(),
            generation: 0,
        }
    }

    /// Creates a simulation already loaded with `bodies`.
    pub fn with_bodies(bodies: &[Body], params: Params) -> Self {
        let mut sim = Self::with_params(params);
        sim.set_bodies(bodies);
        sim
    }

    /// Replaces the live set with copies of `bodies` and resets the clock.
    /// Bumps the load generation, so position histories start over.
    pub fn set_bodies(&mut self, bodies: &[Body]) {
        self.bodies = bodies.to_vec();
        self.elapsed = 0.0;
        self.merges.clear();
        self.generation += 1;
        self.reindex();
        debug!("loaded {} bodies", self.bodies.len());
    }

    /// Same as [`Simulation::set_bodies`] but rejects malformed input first.
    pub fn try_set_bodies(&mut self, bodies: &[Body]) -> Result<(), SimError> {
        params::validate_bodies(bodies)?;
        self.set_bodies(bodies);
        Ok(())
    }

    /// Sets the step size after checking it is positive and finite.
    pub fn set_dt(&mut self, dt: f64) -> Result<(), SimError> {
        params::check_dt(dt)?;
        self.params.dt = dt;
        Ok(())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    /// Mutable access for edits made between steps. The id must not be changed.
    pub fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
        self.index.get(id).map(|&i| &mut self.bodies[i])
    }

    /// Counts wholesale reloads. Trail buffers compare it to detect a reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Elapsed simulated time in days.
    pub fn elapsed_days(&self) -> f64 {
        self.elapsed
    }

    /// Drains the merges recorded since the last call.
    pub fn take_merge_events(&mut self) -> Vec<MergeEvent> {
        std::mem::take(&mut self.merges)
    }

    /// Adds `dv` to the velocity of body `id`.
    /// Returns `Ok(false)` for anchors, which are left untouched.
    pub fn apply_impulse(&mut self, id: &str, dv: DVec3) -> Result<bool, SimError> {
        let body = self
            .body_mut(id)
            .ok_or_else(|| SimError::UnknownBody(id.to_owned()))?;
        if body.fixed {
            return Ok(false);
        }
        body.vel += dv;
        Ok(true)
    }

    /// Appends a new body to the live set.
    pub fn insert_body(&mut self, body: Body) -> Result<(), SimError> {
        if self.index.contains_key(&body.id) {
            return Err(SimError::DuplicateId(body.id));
        }
        self.index.insert(body.id.clone(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Advances the simulation by `n` fixed steps. `n == 0` does nothing.
    pub fn step(&mut self, n: usize) {
        for _ in 0..n {
            self.step_once();
        }
    }

    /// Runs `n` steps, stopping at the first one that leaves a body non-finite.
    pub fn step_checked(&mut self, n: usize) -> Result<(), SimError> {
        for _ in 0..n {
            self.step_once();
            self.check_finite()?;
        }
        Ok(())
    }

    /// Reports the first body whose position or velocity is NaN or infinite.
    pub fn check_finite(&self) -> Result<(), SimError> {
        match self.bodies.iter().find(|b| !b.is_finite()) {
            Some(b) => Err(SimError::NumericalInstability {
                id: b.id.clone(),
                elapsed: self.elapsed,
            }),
            None => Ok(()),
        }
    }

    /// Number of fixed steps one rendered frame asks for at the current time scale.
    pub fn frame_steps(&self) -> usize {
        let ts = self.params.time_scale;
        let whole = ts.floor().max(1.0);
        let extra = if ts - whole > 1e-6 { 1 } else { 0 };
        whole as usize + extra
    }

    /// Steps one rendered frame's worth unless paused. Returns the steps taken.
    pub fn advance_frame(&mut self) -> usize {
        if self.paused {
            return 0;
        }
        let steps = self.frame_steps();
        self.step(steps);
        steps
    }

    /// A single velocity-Verlet step followed by the merge pass.
    fn step_once(&mut self) {
        let dt = self.params.dt;
        let damp = 1.0 - self.params.damping;
        let parallel = self.parallel && self.bodies.len() >= Self::PARALLEL_THRESHOLD;

        let acc0 = self.accelerations();

        if parallel {
            self.bodies
                .par_iter_mut()
                .zip(acc0.par_iter())
                .for_each(|(body, &a)| body.drift(a, dt));
        } else {
            for (body, &a) in self.bodies.iter_mut().zip(&acc0) {
                body.drift(a, dt);
            }
        }

        let acc1 = self.accelerations();

        if parallel {
            self.bodies
                .par_iter_mut()
                .zip(acc0.par_iter().zip(acc1.par_iter()))
                .for_each(|(body, (&a0, &a1))| body.kick(a0, a1, dt, damp));
        } else {
            for ((body, &a0), &a1) in self.bodies.iter_mut().zip(&acc0).zip(&acc1) {
                body.kick(a0, a1, dt, damp);
            }
        }

        self.elapsed += dt;
        trace!("t = {:.4} days, {} bodies", self.elapsed, self.bodies.len());

        if self.params.merge_on_collision {
            self.merge_if_collide();
        }
    }

    /// Pairwise softened gravitational accelerations for the current positions.
    /// Each unordered pair is visited once and applied to both bodies.
    pub fn accelerations(&self) -> Vec<DVec3> {
        let n = self.bodies.len();
        let mut acc = vec![DVec3::zero(); n];
        let g = G0 * self.params.g_scale;
        let eps2 = self.params.softening;

        for i in 0..n {
            let bi = &self.bodies[i];
            for j in (i + 1)..n {
                let bj = &self.bodies[j];
                let d = bj.pos - bi.pos;
                let r2 = d.mag_sq() + eps2;
                let r = r2.sqrt();
                let f = d * (g / (r2 * r));

                acc[i] += f * bj.mass;
                acc[j] -= f * bi.mass;
            }
        }

        acc
    }

    /// Kinetic, potential and total energy. Purely diagnostic.
    pub fn total_energy(&self) -> Energy {
        let g = G0 * self.params.g_scale;
        let eps2 = self.params.softening;

        let mut kinetic = 0.0;
        let mut potential = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            kinetic += bi.kinetic_energy();
            for bj in &self.bodies[i + 1..] {
                let r = ((bj.pos - bi.pos).mag_sq() + eps2).sqrt();
                potential -= g * bi.mass * bj.mass / r;
            }
        }

        Energy {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    pub fn total_momentum(&self) -> DVec3 {
        self.bodies
            .iter()
            .fold(DVec3::zero(), |p, b| p + b.momentum())
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// Mass-weighted centroid, or the origin for an empty or massless set.
    pub fn center_of_mass(&self) -> DVec3 {
        let mass = self.total_mass();
        if mass == 0.0 {
            return DVec3::zero();
        }
        self.bodies
            .iter()
            .fold(DVec3::zero(), |c, b| c + b.pos * b.mass)
            / mass
    }

    /// Merges every overlapping pair, scanning `i` then `j > i` in list order.
    /// A survivor is updated in place, so later pairs see its merged state.
    fn merge_if_collide(&mut self) {
        let n = self.bodies.len();
        let scale = self.params.collision_radius_scale;
        let mut keep = vec![true; n];

        for i in 0..n {
            if !keep[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !keep[j] {
                    continue;
                }
                let (head, tail) = self.bodies.split_at_mut(j);
                let (bi, bj) = (&mut head[i], &tail[0]);

                let r = (bj.pos - bi.pos).mag();
                let threshold = (bi.radius + bj.radius) * scale;
                if r > 0.0 && r < threshold {
                    debug!(
                        "merging '{}' into '{}' at t = {:.4} days",
                        bj.id, bi.id, self.elapsed
                    );
                    bi.absorb(bj);
                    keep[j] = false;
                    self.merges.push(MergeEvent {
                        survivor: bi.id.clone(),
                        absorbed: bj.id.clone(),
                        elapsed: self.elapsed,
                    });
                }
            }
        }

        if keep.iter().all(|&k| k) {
            return;
        }
        let mut keep = keep.into_iter();
        self.bodies.retain(|_| keep.next().unwrap_or(true));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, body) in self.bodies.iter().enumerate() {
            if self.index.contains_key(&body.id) {
                warn!("duplicate body id '{}'; lookups resolve to the first", body.id);
                continue;
            }
            self.index.insert(body.id.clone(), i);
        }
    }
}

/// Gives `bodies[anchor]` the velocity that cancels the total momentum of the list.
pub fn zero_momentum(bodies: &mut [Body], anchor: usize) {
    let Some(anchor_mass) = bodies.get(anchor).map(|b| b.mass) else {
        return;
    };
    let others = bodies
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != anchor)
        .fold(DVec3::zero(), |p, (_, b)| p + b.momentum());
    bodies[anchor].vel = -others / anchor_mass;
}
