//! Position histories kept on the rendering side.
//!
//! The engine only produces positions; a [`Trails`] book samples them once
//! per rendered frame into bounded per-body FIFOs.

use std::collections::{HashMap, HashSet, VecDeque};

use ultraviolet::DVec3;

use crate::simulation::Simulation;

/// Bounded FIFO of past positions. The oldest point is evicted first.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: VecDeque<DVec3>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(Trails::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, pos: DVec3) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.points.len() > capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &DVec3> {
        self.points.iter()
    }
}

/// Trails for every live body, keyed by body id.
#[derive(Debug)]
pub struct Trails {
    trails: HashMap<String, Trail>,
    capacity: usize,
    generation: Option<u64>,
}

impl Default for Trails {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Trails {
    pub const DEFAULT_CAPACITY: usize = 1400;

    pub fn new(capacity: usize) -> Self {
        Self {
            trails: HashMap::new(),
            capacity,
            generation: None,
        }
    }

    /// Appends each live body's current position and drops trails of bodies
    /// that merged away. After a reload every trail starts over, even for
    /// ids the new set reuses.
    pub fn record(&mut self, sim: &Simulation) {
        if self.generation != Some(sim.generation()) {
            self.trails.clear();
            self.generation = Some(sim.generation());
        }

        let live: HashSet<&str> = sim.bodies().iter().map(|b| b.id.as_str()).collect();
        self.trails.retain(|id, _| live.contains(id.as_str()));

        let capacity = self.capacity;
        for body in sim.bodies() {
            self.trails
                .entry(body.id.clone())
                .or_insert_with(|| Trail::new(capacity))
                .push(body.pos);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Trail> {
        self.trails.get(id)
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity of every trail, evicting the oldest points if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        for trail in self.trails.values_mut() {
            trail.set_capacity(capacity);
        }
    }
}
