//! Particle pool
//!
//! Particles live in a flat arena. Dead particles hand their slot back to a
//! free list instead of being deallocated, and the next spawn reuses it. The
//! active list is kept in spawn order so the cap can trim the oldest first.
//!
//! At any time `allocated == free + active`.

use std::collections::VecDeque;

use crate::particle::Particle;

/// Free records kept for reuse; extra ones are compacted away
pub const POOL_CAPACITY: usize = 50;

/// Slot counts of a [`Pool`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated: usize,
    pub free: usize,
    pub active: usize,
}

#[derive(Debug)]
pub struct Pool {
    slots: Vec<Particle>,
    free: Vec<usize>,
    /// Oldest first
    active: VecDeque<usize>,
    free_capacity: usize,
}

impl Pool {
    pub fn new() -> Self {
        Self::with_free_capacity(POOL_CAPACITY)
    }

    pub fn with_free_capacity(free_capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: VecDeque::new(),
            free_capacity,
        }
    }

    /// Activate a particle, reusing a free slot when one exists
    pub fn spawn(&mut self, particle: Particle) {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = particle;
                index
            }
            None => {
                self.slots.push(particle);
                self.slots.len() - 1
            }
        };
        self.active.push_back(index);
    }

    /// Number of active particles
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active particles, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active.iter().map(|&index| &self.slots[index])
    }

    /// Run `keep` over every active particle, releasing those it rejects
    ///
    /// Returns the number released.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut Particle) -> bool) -> usize {
        let slots = &mut self.slots;
        let free = &mut self.free;
        let before = self.active.len();
        self.active.retain(|&index| {
            let alive = keep(&mut slots[index]);
            if !alive {
                free.push(index);
            }
            alive
        });
        before - self.active.len()
    }

    /// Release the oldest particles until at most `max` remain
    pub fn trim_oldest(&mut self, max: usize) -> usize {
        let excess = self.active.len().saturating_sub(max);
        self.free.extend(self.active.drain(..excess));
        excess
    }

    /// Release every active particle; slots stay allocated for reuse
    pub fn release_all(&mut self) -> usize {
        let released = self.active.len();
        self.free.extend(self.active.drain(..));
        released
    }

    /// Compact the arena when more than the free capacity sits unused
    ///
    /// Active particles keep their order.
    pub fn enforce_free_bound(&mut self) {
        if self.free.len() <= self.free_capacity {
            return;
        }
        let keep_free = self.free_capacity;
        let mut slots = Vec::with_capacity(self.active.len() + keep_free);
        for index in self.active.iter_mut() {
            slots.push(std::mem::take(&mut self.slots[*index]));
            *index = slots.len() - 1;
        }
        let first_free = slots.len();
        slots.resize_with(first_free + keep_free, Particle::default);

        tracing::trace!(
            dropped = self.free.len() - keep_free,
            kept = keep_free,
            "compacted particle pool"
        );
        self.free = (first_free..slots.len()).collect();
        self.slots = slots;
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.slots.len(),
            free: self.free.len(),
            active: self.active.len(),
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
