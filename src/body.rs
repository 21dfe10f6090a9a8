use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

/// Represents a point mass in the simulation.
///
/// Units are AU for distances, days for time and solar masses for mass.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Stable unique key within the live set.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Mass in solar masses.
    pub mass: f64,
    /// Physical radius in AU. Only used for the collision threshold.
    pub radius: f64,
    /// Position vector (AU).
    pub pos: DVec3,
    /// Velocity vector (AU/day).
    pub vel: DVec3,
    /// Opaque display tag (0xRRGGBB).
    pub color: u32,
    /// Anchor bodies are never moved by integration.
    pub fixed: bool,
}

impl Body {
    /// Creates a new free body with a neutral colour.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mass: f64,
        radius: f64,
        pos: DVec3,
        vel: DVec3,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mass,
            radius,
            pos,
            vel,
            color: 0xffffff,
            fixed: false,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Marks the body as an immovable anchor.
    pub fn anchored(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn momentum(&self) -> DVec3 {
        self.vel * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.mag_sq()
    }

    pub fn is_finite(&self) -> bool {
        let finite = |v: DVec3| v.x.is_finite() && v.y.is_finite() && v.z.is_finite();
        finite(self.pos) && finite(self.vel)
    }

    /// Position half of the velocity-Verlet step, using the acceleration at the start of the step.
    #[inline]
    pub fn drift(&mut self, acc: DVec3, dt: f64) {
        if self.fixed {
            return;
        }
        self.pos += self.vel * dt + acc * (0.5 * dt * dt);
    }

    /// Velocity half of the velocity-Verlet step.
    /// `damp` multiplies the whole velocity, not only the increment.
    #[inline]
    pub fn kick(&mut self, acc0: DVec3, acc1: DVec3, dt: f64, damp: f64) {
        if self.fixed {
            return;
        }
        self.vel = (self.vel + (acc0 + acc1) * (0.5 * dt)) * damp;
    }

    /// Absorbs `other` into `self` as a perfectly inelastic collision.
    pub(crate) fn absorb(&mut self, other: &Body) {
        let m = self.mass + other.mass;
        let p = self.momentum() + other.momentum();

        self.pos = (self.pos * self.mass + other.pos * other.mass) / m;
        self.vel = p / m;
        self.mass = m;
        self.radius = (self.radius.powi(3) + other.radius.powi(3)).cbrt();
        self.name = format!("{} + {}", self.name, other.name);
    }
}

/// Serializable body description used by scenario files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodySpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub mass: f64,
    #[serde(default)]
    pub radius: f64,
    pub pos: [f64; 3],
    #[serde(default)]
    pub vel: [f64; 3],
    #[serde(default = "BodySpec::default_color")]
    pub color: u32,
    #[serde(default)]
    pub fixed: bool,
}

impl BodySpec {
    fn default_color() -> u32 {
        0xffffff
    }
}

impl From<BodySpec> for Body {
    fn from(spec: BodySpec) -> Self {
        let name = spec.name.unwrap_or_else(|| spec.id.clone());
        let [px, py, pz] = spec.pos;
        let [vx, vy, vz] = spec.vel;
        Body {
            id: spec.id,
            name,
            mass: spec.mass,
            radius: spec.radius,
            pos: DVec3::new(px, py, pz),
            vel: DVec3::new(vx, vy, vz),
            color: spec.color,
            fixed: spec.fixed,
        }
    }
}

impl From<&Body> for BodySpec {
    fn from(body: &Body) -> Self {
        BodySpec {
            id: body.id.clone(),
            name: Some(body.name.clone()),
            mass: body.mass,
            radius: body.radius,
            pos: [body.pos.x, body.pos.y, body.pos.z],
            vel: [body.vel.x, body.vel.y, body.vel.z],
            color: body.color,
            fixed: body.fixed,
        }
    }
}
