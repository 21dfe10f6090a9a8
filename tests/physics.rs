use nbody_sandbox::{Body, DVec3, G0, Params, Simulation};

/// Undamped, merge-free parameters with the given step and softening.
fn conservative(dt: f64, softening: f64) -> Params {
    Params {
        dt,
        softening,
        ..Params::conservative()
    }
}

fn free(id: &str, mass: f64, radius: f64, pos: DVec3, vel: DVec3) -> Body {
    Body::new(id, id.to_uppercase(), mass, radius, pos, vel)
}

/// Two bodies of total mass `m1 + m2` on a circular orbit of separation `r` about their barycentre.
fn binary(m1: f64, m2: f64, r: f64) -> Vec<Body> {
    let m = m1 + m2;
    let v_rel = (G0 * m / r).sqrt();
    vec![
        free("a", m1, 0.0, DVec3::new(-r * m2 / m, 0.0, 0.0), DVec3::new(0.0, 0.0, -v_rel * m2 / m)),
        free("b", m2, 0.0, DVec3::new(r * m1 / m, 0.0, 0.0), DVec3::new(0.0, 0.0, v_rel * m1 / m)),
    ]
}

fn separation(sim: &Simulation) -> f64 {
    (sim.bodies()[1].pos - sim.bodies()[0].pos).mag()
}

// ==================================================================================
// Orbits
// ==================================================================================

#[test]
fn circular_binary_keeps_its_separation() {
    let mut sim = Simulation::with_bodies(&binary(0.5, 0.5, 1.0), conservative(0.01, 1e-12));

    for _ in 0..100 {
        sim.step(100);
        let r = separation(&sim);
        assert!((r - 1.0).abs() < 1e-3, "separation drifted to {}", r);
    }
}

#[test]
fn earth_returns_after_one_year() {
    let sun = free("sun", 1.0, 0.00465, DVec3::zero(), DVec3::zero()).anchored();
    let earth = free("earth", 3.003e-6, 4.26e-5, DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 0.0, G0.sqrt()));
    let mut sim = Simulation::with_bodies(&[sun, earth], conservative(0.01, 1e-5));

    sim.step(36525);

    let pos = sim.body("earth").unwrap().pos;
    assert!((sim.elapsed_days() - 365.25).abs() < 1e-6);
    assert!((pos - DVec3::new(1.0, 0.0, 0.0)).mag() < 1e-2, "earth ended at {:?}", pos);
}

// ==================================================================================
// Conservation
// ==================================================================================

#[test]
fn momentum_is_conserved_without_damping() {
    let bodies = vec![
        free("a", 1.0, 0.0, DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.0, 0.001, 0.0)),
        free("b", 0.3, 0.0, DVec3::new(1.0, 0.2, 0.0), DVec3::new(0.0, 0.0, 0.015)),
        free("c", 0.01, 0.0, DVec3::new(-0.7, 0.0, 0.4), DVec3::new(0.01, -0.005, 0.0)),
    ];
    let mut sim = Simulation::with_bodies(&bodies, conservative(0.05, 1e-5));
    let p0 = sim.total_momentum();

    sim.step(2000);

    let p1 = sim.total_momentum();
    assert!((p1 - p0).mag() < 1e-12, "momentum moved from {:?} to {:?}", p0, p1);
}

/// Largest |E(t) - E(0)| over `days` of an eccentric two-body orbit.
fn max_energy_error(dt: f64, days: f64) -> f64 {
    let star = free("star", 1.0, 0.0, DVec3::zero(), DVec3::zero());
    let v = 0.7 * G0.sqrt();
    let planet = free("planet", 1e-3, 0.0, DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 0.0, v));
    let mut sim = Simulation::with_bodies(&[star, planet], conservative(dt, 1e-9));

    let e0 = sim.total_energy().total;
    let steps = (days / dt).round() as usize;
    let mut worst: f64 = 0.0;
    for _ in 0..steps {
        sim.step(1);
        worst = worst.max((sim.total_energy().total - e0).abs());
    }
    worst / e0.abs()
}

#[test]
fn energy_drift_is_small_and_second_order() {
    let coarse = max_energy_error(0.5, 200.0);
    let fine = max_energy_error(0.25, 200.0);

    assert!(fine < 1e-2, "relative energy error {}", fine);
    assert!(fine < coarse * 0.5, "halving dt: {} -> {}", coarse, fine);
}

// ==================================================================================
// Damping and anchors
// ==================================================================================

#[test]
fn damping_decays_speed_geometrically() {
    let mut params = conservative(0.1, 1e-5);
    params.g_scale = 0.0;
    params.damping = 0.1;
    let bodies = vec![
        free("a", 1.0, 0.0, DVec3::zero(), DVec3::new(0.3, 0.0, 0.4)),
        free("b", 2.0, 0.0, DVec3::new(3.0, 0.0, 0.0), DVec3::new(0.0, -1.0, 0.0)),
    ];
    let mut sim = Simulation::with_bodies(&bodies, params);

    let mut expected: Vec<f64> = bodies.iter().map(|b| b.vel.mag()).collect();
    for _ in 0..20 {
        sim.step(1);
        for (body, v) in sim.bodies().iter().zip(expected.iter_mut()) {
            *v *= 0.9;
            assert!((body.vel.mag() - *v).abs() <= 1e-12 * v.max(1.0));
        }
    }
}

#[test]
fn fixed_bodies_never_move() {
    let anchor = free("anchor", 1.0, 0.01, DVec3::new(0.1, -0.2, 0.3), DVec3::new(0.01, 0.0, 0.0)).anchored();
    let bodies = vec![
        anchor.clone(),
        free("p", 0.5, 0.0, DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 0.01)),
        free("q", 0.2, 0.0, DVec3::new(-1.0, 0.5, 0.0), DVec3::zero()),
    ];
    let mut sim = Simulation::with_bodies(&bodies, Params::default());

    sim.step(500);

    let after = sim.body("anchor").unwrap();
    assert_eq!(after.pos, anchor.pos);
    assert_eq!(after.vel, anchor.vel);
    assert_ne!(sim.body("q").unwrap().pos, bodies[2].pos);
}

#[test]
fn parallel_and_sequential_agree_bitwise() {
    let bodies = nbody_sandbox::presets::uniform_disc(300, 11);
    let mut seq = Simulation::with_bodies(&bodies, Params::default());
    let mut par = Simulation::with_bodies(&bodies, Params::default());
    par.parallel = true;

    seq.step(5);
    par.step(5);

    assert_eq!(seq.bodies(), par.bodies());
}

// ==================================================================================
// Merging
// ==================================================================================

#[test]
fn head_on_pair_merges_exactly_once() {
    let mut params = conservative(0.1, 1e-5);
    params.merge_on_collision = true;
    let radius: f64 = 0.01;
    let bodies = vec![
        free("left", 1e-3, radius, DVec3::new(-0.1, 0.0, 0.0), DVec3::new(0.01, 0.0, 0.0)),
        free("right", 1e-3, radius, DVec3::new(0.1, 0.0, 0.0), DVec3::new(-0.01, 0.0, 0.0)),
    ];
    let mass = 2e-3;
    let momentum = bodies[0].momentum() + bodies[1].momentum();
    let mut sim = Simulation::with_bodies(&bodies, params);

    sim.step(200);

    let events = sim.take_merge_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].survivor, "left");
    assert_eq!(events[0].absorbed, "right");

    assert_eq!(sim.len(), 1);
    assert!(sim.body("right").is_none());
    let merged = sim.body("left").unwrap();
    assert_eq!(merged.name, "LEFT + RIGHT");
    assert!((merged.radius - (2.0 * radius.powi(3)).cbrt()).abs() < 1e-15);
    assert!((merged.mass - mass).abs() < 1e-18);
    assert!((merged.momentum() - momentum).mag() < 1e-15);
}

#[test]
fn merge_conserves_mass_and_momentum_of_unequal_pair() {
    let mut params = conservative(0.01, 1e-5);
    params.merge_on_collision = true;
    params.g_scale = 0.0;
    let a = free("a", 3.0, 0.05, DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.2, 0.1, 0.0));
    let b = free("b", 1.0, 0.05, DVec3::new(0.5, 0.0, 0.0), DVec3::new(-0.4, 0.1, 0.05));
    let momentum = a.momentum() + b.momentum();
    let mut sim = Simulation::with_bodies(&[a, b], params);

    let mut steps = 0;
    while sim.len() == 2 && steps < 1000 {
        sim.step(1);
        steps += 1;
    }

    assert_eq!(sim.len(), 1);
    let merged = &sim.bodies()[0];
    assert_eq!(merged.mass, 4.0);
    assert!((merged.momentum() - momentum).mag() < 1e-12);
    assert!((merged.radius - (2.0 * 0.05f64.powi(3)).cbrt()).abs() < 1e-12);
}

#[test]
fn merging_disabled_lets_bodies_pass() {
    let mut params = conservative(0.1, 1e-5);
    params.g_scale = 0.0;
    let bodies = vec![
        free("left", 1e-3, 0.01, DVec3::new(-0.1, 0.0, 0.0), DVec3::new(0.01, 0.0, 0.0)),
        free("right", 1e-3, 0.01, DVec3::new(0.1, 0.0, 0.0), DVec3::new(-0.01, 0.0, 0.0)),
    ];
    let mut sim = Simulation::with_bodies(&bodies, params);
    sim.step(200);
    assert_eq!(sim.len(), 2);
    assert!(sim.take_merge_events().is_empty());
}
