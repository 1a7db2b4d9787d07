/// Per-cell memo of policy facts, valid for one search generation.
///
/// A slot is "computed" when its stamp equals the cache's current generation, so invalidating
/// every slot is a single increment instead of a sweep over the grid.
#[derive(Debug)]
pub struct FactCache<F> {
    generation: u32,
    slots: Vec<FactSlot<F>>,
    computed: u64,
}

#[derive(Debug)]
struct FactSlot<F> {
    stamp: u32,
    facts: F,
}

impl<F: Default> Default for FactCache<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Default> FactCache<F> {
    pub fn new() -> Self {
        Self {
            generation: 1,
            slots: Vec::new(),
            computed: 0,
        }
    }

    /// Rebuild the slot array for `cells` cells. All slots start uncomputed.
    pub fn resize(&mut self, cells: usize) {
        self.slots.clear();
        self.slots.resize_with(cells, || FactSlot {
            stamp: 0,
            facts: F::default(),
        });
        self.generation = 1;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mark every slot stale.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamps from 2^32 generations ago would alias; pay for one sweep instead.
            for slot in &mut self.slots {
                slot.stamp = 0;
            }
            self.generation = 1;
        }
    }

    #[inline]
    pub fn is_computed(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.stamp == self.generation)
    }

    /// Compute the slot's facts if they are stale for this generation.
    pub fn ensure(&mut self, index: usize, compute: impl FnOnce() -> F) {
        let generation = self.generation;
        let slot = &mut self.slots[index];
        if slot.stamp != generation {
            slot.facts = compute();
            slot.stamp = generation;
            self.computed += 1;
        }
    }

    /// Facts for `index`. Callers `ensure` the slot first.
    #[inline]
    pub fn facts(&self, index: usize) -> &F {
        debug_assert!(self.is_computed(index), "reading stale facts for slot {index}");
        &self.slots[index].facts
    }

    /// Total number of fact computations since construction.
    pub fn computations(&self) -> u64 {
        self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_generation() {
        let mut cache: FactCache<u32> = FactCache::new();
        cache.resize(4);
        let mut calls = 0;
        for _ in 0..3 {
            cache.ensure(2, || {
                calls += 1;
                7
            });
        }
        assert_eq!(calls, 1);
        assert_eq!(*cache.facts(2), 7);
        assert!(!cache.is_computed(1));

        cache.invalidate();
        assert!(!cache.is_computed(2));
        cache.ensure(2, || 9);
        assert_eq!(*cache.facts(2), 9);
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn generation_wrap_clears_stamps() {
        let mut cache: FactCache<u8> = FactCache::new();
        cache.resize(2);
        cache.ensure(0, || 1);
        cache.generation = u32::MAX;
        cache.slots[1].stamp = u32::MAX;
        cache.invalidate();
        assert_eq!(cache.generation, 1);
        assert!(!cache.is_computed(0));
        assert!(!cache.is_computed(1));
    }
}
