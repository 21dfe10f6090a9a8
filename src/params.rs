//! Tunable physical and numerical parameters.
//!
//! [`Params`] is a plain struct of mutable fields. The engine reads it as-is;
//! [`Params::validate`] and [`validate_bodies`] form the optional strict layer
//! on top.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    body::{Body, BodySpec},
    error::SimError,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Fixed step size (days).
    pub dt: f64,
    /// Requested steps per rendered frame. Not used by the integrator.
    pub time_scale: f64,
    /// Multiplier on the baseline gravitational constant.
    pub g_scale: f64,
    /// Fraction of velocity removed every step.
    pub damping: f64,
    /// Softening added to squared separations (AU²).
    pub softening: f64,
    pub merge_on_collision: bool,
    /// Multiplier on the summed radii used as the merge threshold.
    pub collision_radius_scale: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            dt: Self::DEFAULT_DT,
            time_scale: Self::DEFAULT_TIME_SCALE,
            g_scale: 1.0,
            damping: Self::DEFAULT_DAMPING,
            softening: Self::DEFAULT_SOFTENING,
            merge_on_collision: true,
            collision_radius_scale: 1.0,
        }
    }
}

impl Params {
    pub const DEFAULT_DT: f64 = 0.01;
    pub const DEFAULT_TIME_SCALE: f64 = 6.0;
    pub const DEFAULT_DAMPING: f64 = 0.0005;
    pub const DEFAULT_SOFTENING: f64 = 1e-5;

    /// Undamped, merge-free parameters for measuring the bare integrator.
    pub fn conservative() -> Self {
        Self {
            damping: 0.0,
            merge_on_collision: false,
            ..Self::default()
        }
    }

    /// Parses parameters from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks every field against its admissible range without altering any.
    pub fn validate(&self) -> Result<(), SimError> {
        check_dt(self.dt)?;
        check("time_scale", self.time_scale, |v| v >= 0.0)?;
        check("g_scale", self.g_scale, |v| v >= 0.0)?;
        check("damping", self.damping, |v| (0.0..1.0).contains(&v))?;
        check("softening", self.softening, |v| v > 0.0)?;
        check("collision_radius_scale", self.collision_radius_scale, |v| v > 0.0)?;
        Ok(())
    }
}

pub(crate) fn check_dt(dt: f64) -> Result<(), SimError> {
    check("dt", dt, |v| v > 0.0)
}

fn check(name: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), SimError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

/// Checks a body list for positive masses, non-negative radii, finite state and unique ids.
pub fn validate_bodies(bodies: &[Body]) -> Result<(), SimError> {
    let mut seen = HashSet::with_capacity(bodies.len());
    for body in bodies {
        check("mass", body.mass, |m| m > 0.0)?;
        check("radius", body.radius, |r| r >= 0.0)?;
        if !body.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "state",
                value: f64::NAN,
            });
        }
        if !seen.insert(body.id.as_str()) {
            return Err(SimError::DuplicateId(body.id.clone()));
        }
    }
    Ok(())
}

/// A parameter set together with its initial bodies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub bodies: Vec<BodySpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn bodies(&self) -> Vec<Body> {
        self.bodies.iter().cloned().map(Body::from).collect()
    }
}
