//! Policy-driven A* over persistent grids.
//!
//! A [`PathFinder`] owns one node per cell for the lifetime of a grid and answers repeated
//! queries, continuing from the previous query's open and closed lists when the start, flags,
//! context and world epoch are unchanged. All game semantics live in a [`PathPolicy`]:
//! per-cell facts, edge validity and cost, heuristic, turn bookkeeping and extra long-range
//! edges. [`TwoLayerPathFinder`] adds a second node set for "stopped with movement left",
//! driven by a [`PartialMovePolicy`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cache;
pub mod engine;
pub mod error;
pub mod grid;
mod list;
pub mod node;
pub mod path;
pub mod policy;
pub mod session;
pub mod two_layer;

pub use cache::FactCache;
pub use engine::{Layering, PathFinder, SingleLayer};
pub use error::{ConfigError, InvariantViolation, SearchFailure};
pub use grid::{Cell, GridConfig, Topology, MAX_GRID_CELLS, MAX_NEIGHBORS};
pub use node::{
    Layer, ListKind, Node, NodeIndex, NodeView, TurnData, MAX_CHILDREN, MAX_EXTRA_CHILDREN,
};
pub use path::{PathStep, PathSteps};
pub use policy::{ChildEvent, ListEvent, PartialMovePolicy, PathPolicy, Query, SearchFlags, Step};
pub use session::{CacheEpoch, SearchOptions, SearchState, SearchStats};
pub use two_layer::{TwoLayer, TwoLayerPathFinder};
