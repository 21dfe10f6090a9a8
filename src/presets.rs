use crate::{
    body::Body,
    simulation::{G0, zero_momentum},
};
use log::info;
use ultraviolet::DVec3;

use std::f64::consts::TAU;

pub const M_SUN: f64 = 1.0;
pub const M_EARTH: f64 = 3.003e-6;
pub const M_MOON: f64 = 3.694e-8;
pub const M_MARS: f64 = 3.227e-7;
pub const M_JUPITER: f64 = 9.545e-4;

pub const R_SUN: f64 = 0.00465047;
pub const R_EARTH: f64 = 4.2635e-5;
pub const R_MOON: f64 = 1.1614e-5;
pub const R_MARS: f64 = 2.266e-5;
pub const R_JUPITER: f64 = 0.0004779;

/// Earth-Moon distance (AU).
pub const MOON_DISTANCE: f64 = 0.00257;

/// Speed of a circular orbit of radius `r` around `mass` (AU/day, unscaled G).
pub fn circular_speed(mass: f64, r: f64) -> f64 {
    (G0 * mass / r).sqrt()
}

/// Built-in starting configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    SolarLite,
    SunEarthMoon,
    ThreeBody,
    Slingshot,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::SolarLite,
        Preset::SunEarthMoon,
        Preset::ThreeBody,
        Preset::Slingshot,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Preset::SolarLite => "solarLite",
            Preset::SunEarthMoon => "sunEarthMoon",
            Preset::ThreeBody => "threeBody",
            Preset::Slingshot => "slingshot",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::SolarLite => "Solar system (lite)",
            Preset::SunEarthMoon => "Sun-Earth-Moon",
            Preset::ThreeBody => "Three bodies (chaos)",
            Preset::Slingshot => "Gravitational slingshot",
        }
    }

    pub fn from_key(key: &str) -> Option<Preset> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// The preset after this one, wrapping around.
    pub fn next(self) -> Preset {
        let i = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Builds a fresh body list for this preset.
    pub fn bodies(self) -> Vec<Body> {
        info!("building preset '{}'", self.key());
        match self {
            Preset::SolarLite => solar_lite(),
            Preset::SunEarthMoon => sun_earth_moon(),
            Preset::ThreeBody => three_body(),
            Preset::Slingshot => slingshot(),
        }
    }
}

fn sun() -> Body {
    Body::new("sun", "Sun", M_SUN, R_SUN, DVec3::zero(), DVec3::zero())
        .with_color(0xfff2b2)
        .anchored()
}

/// Body on a circular orbit in the xz plane, starting on the +x axis.
fn planet(id: &str, name: &str, mass: f64, radius: f64, r: f64, color: u32) -> Body {
    let v = circular_speed(M_SUN, r);
    Body::new(id, name, mass, radius, DVec3::new(r, 0.0, 0.0), DVec3::new(0.0, 0.0, v))
        .with_color(color)
}

fn sun_earth_moon() -> Vec<Body> {
    let earth = planet("earth", "Earth", M_EARTH, R_EARTH, 1.0, 0x6aa8ff);
    let v_moon = circular_speed(M_EARTH, MOON_DISTANCE);
    let moon = Body::new(
        "moon",
        "Moon",
        M_MOON,
        R_MOON,
        earth.pos + DVec3::new(MOON_DISTANCE, 0.0, 0.0),
        earth.vel + DVec3::new(0.0, 0.0, v_moon),
    )
    .with_color(0xd9deea);

    vec![sun(), earth, moon]
}

fn solar_lite() -> Vec<Body> {
    let mut bodies = sun_earth_moon();
    bodies.push(planet("mars", "Mars", M_MARS, R_MARS, 1.524, 0xff8a6a));
    bodies.push(planet("jupiter", "Jupiter", M_JUPITER, R_JUPITER, 5.204, 0xffd29a));

    // The anchor still gets the balancing velocity so the reported momentum is ~0.
    zero_momentum(&mut bodies, 0);
    bodies
}

fn three_body() -> Vec<Body> {
    let m = 0.9;
    let r = 1.0;
    let a = TAU / 3.0;
    let corner = |angle: f64| DVec3::new(r * angle.cos(), 0.0, r * angle.sin());

    let mut bodies = vec![
        Body::new("a", "A", m, 0.002, corner(0.0), DVec3::new(0.0, 0.0, 0.19)).with_color(0x6aa8ff),
        Body::new("b", "B", m, 0.002, corner(a), DVec3::new(0.03, 0.0, -0.13)).with_color(0xff8a6a),
        Body::new("c", "C", m, 0.002, corner(-a), DVec3::new(-0.03, 0.0, -0.06)).with_color(0xfff2b2),
    ];

    let p = bodies.iter().fold(DVec3::zero(), |p, b| p + b.momentum());
    let dv = p / (3.0 * m);
    for b in &mut bodies {
        b.vel -= dv;
    }
    bodies
}

fn slingshot() -> Vec<Body> {
    let mut bodies = vec![
        sun(),
        planet("jupiter", "Jupiter", M_JUPITER, R_JUPITER, 5.2, 0xffd29a),
        Body::new(
            "probe",
            "Probe",
            1e-12,
            8e-6,
            DVec3::new(-8.0, 0.0, 3.5),
            DVec3::new(0.045, 0.0, -0.02),
        )
        .with_color(0x58f0b3),
    ];
    zero_momentum(&mut bodies, 0);
    bodies
}

/// Generates `n` bodies in a flat disc around a fixed central star.
/// - Positions are uniform in area between the inner and outer radius.
/// - Each body starts on a circular orbit about the mass enclosed by its radius.
/// - The same `seed` always gives the same disc.
pub fn uniform_disc(n: usize, seed: u64) -> Vec<Body> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let inner_radius = 0.4;
    let outer_radius = inner_radius + (n as f64).sqrt() * 0.1;

    let mut bodies: Vec<Body> = Vec::with_capacity(n);
    if n == 0 {
        return bodies;
    }
    bodies.push(sun());

    while bodies.len() < n {
        let a = rng.f64() * TAU;
        let (sin, cos) = a.sin_cos();

        let t = inner_radius / outer_radius;
        let r = outer_radius * (rng.f64() * (1.0 - t * t) + t * t).sqrt();
        let pos = DVec3::new(cos, 0.0, sin) * r;

        // Unit tangent, scaled once the enclosed mass is known.
        let vel = DVec3::new(-sin, 0.0, cos);
        let k = bodies.len();
        bodies.push(
            Body::new(format!("d{}", k), format!("Rock {}", k), 1e-9, 1e-6, pos, vel)
                .with_color(0xb0b8c8),
        );
    }

    // Closest first, so the running sum is the enclosed mass.
    bodies.sort_by(|a, b| a.pos.mag_sq().total_cmp(&b.pos.mag_sq()));

    let mut mass = 0.0;
    for body in &mut bodies {
        mass += body.mass;
        if body.fixed {
            continue;
        }
        body.vel *= circular_speed(mass, body.pos.mag());
    }

    bodies
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_round_trip_and_cycle() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_key(p.key()), Some(p));
        }
        assert_eq!(Preset::Slingshot.next(), Preset::SolarLite);
        assert_eq!(Preset::from_key("nope"), None);
    }

    #[test]
    fn presets_have_unique_ids_and_positive_mass() {
        for p in Preset::ALL {
            let bodies = p.bodies();
            let ids: HashSet<_> = bodies.iter().map(|b| b.id.as_str()).collect();
            assert_eq!(ids.len(), bodies.len(), "{}", p.key());
            assert!(bodies.iter().all(|b| b.mass > 0.0 && b.radius >= 0.0));
        }
    }

    #[test]
    fn balanced_presets_have_no_net_momentum() {
        for p in [Preset::SolarLite, Preset::ThreeBody, Preset::Slingshot] {
            let total = p
                .bodies()
                .iter()
                .fold(DVec3::zero(), |acc, b| acc + b.momentum());
            assert!(total.mag() < 1e-15, "{}: {:?}", p.key(), total);
        }
    }

    #[test]
    fn earth_starts_on_circular_orbit() {
        let bodies = Preset::SunEarthMoon.bodies();
        let earth = bodies.iter().find(|b| b.id == "earth").unwrap();
        assert_eq!(earth.pos, DVec3::new(1.0, 0.0, 0.0));
        assert!((earth.vel.z - G0.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn disc_is_seeded_and_sorted() {
        let a = uniform_disc(200, 7);
        let b = uniform_disc(200, 7);
        assert_eq!(a.len(), 200);
        assert_eq!(a, b);
        assert!(a[0].fixed);
        assert!(a.windows(2).all(|w| w[0].pos.mag_sq() <= w[1].pos.mag_sq()));
        assert!(uniform_disc(0, 7).is_empty());
    }
}
