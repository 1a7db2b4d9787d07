#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Cell, GridConfig, NodeIndex, Query, SearchFlags};

/// Version of the outside world a search was computed against.
///
/// Callers bump it whenever something the policy reads changes behind the engine's back; a
/// search built under an older epoch is never reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheEpoch(pub u64);

impl CacheEpoch {
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Lifecycle of the most recent query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Seeded,
    Expanding,
    Succeeded,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Fail once a popped node's turn number exceeds this value.
    pub max_turns: Option<i32>,

    /// Fail once this many nodes have been expanded in one call.
    pub max_expansions: Option<usize>,

    /// Build per-cell neighbour tables at initialization instead of computing wrap-aware
    /// neighbours on every expansion.
    pub precompute_neighbors: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_turns: None,
            max_expansions: None,
            precompute_neighbors: true,
        }
    }
}

impl SearchOptions {
    pub fn with_max_turns(mut self, max_turns: i32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_precomputed_neighbors(mut self, precompute: bool) -> Self {
        self.precompute_neighbors = precompute;
        self
    }
}

/// Counters for observing engine behaviour from tests, benches and debug overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub searches: u64,
    pub reused: u64,
    pub cache_hits: u64,
    pub resets: u64,
    pub expanded: u64,
    pub overlay_clones: u64,
}

/// State carried from one query to the next.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchSession<C> {
    pub(crate) start: Cell,
    pub(crate) destination: Cell,
    pub(crate) flags: SearchFlags,
    pub(crate) context: C,
    /// Epoch the current lists were built under; `None` when there is nothing to reuse.
    pub(crate) built_under: Option<CacheEpoch>,
    pub(crate) signature: u64,
    /// False after a search was cut short by a ceiling: closed nodes may be unexpanded.
    pub(crate) reusable: bool,
    /// Terminal node of the last successful query, with the destination it answered.
    pub(crate) answered: Option<(Cell, NodeIndex)>,
}

impl<C> SearchSession<C> {
    pub(crate) fn query(&self, grid: GridConfig) -> Query<'_, C> {
        Query {
            start: self.start,
            destination: self.destination,
            flags: self.flags,
            grid,
            context: &self.context,
        }
    }

    pub(crate) fn forget(&mut self) {
        self.built_under = None;
        self.reusable = false;
        self.answered = None;
    }
}
