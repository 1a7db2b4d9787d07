use thiserror::Error;

use crate::{Cell, ListKind, NodeIndex};

/// Errors reported while binding a path finder to a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: i32, height: i32 },

    #[error("grid of {width}x{height} cells exceeds the node arena capacity")]
    GridTooLarge { width: i32, height: i32 },

    #[error("hex grids wrapping vertically need an even height, got {height}")]
    OddHexWrapHeight { height: i32 },
}

/// Why a path query did not produce a terminal node.
///
/// None of these are exceptional: callers treat every variant as "no route" and fall back to
/// other logic. The distinction exists for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("path finder is not initialized")]
    NotInitialized,

    #[error("start {0:?} lies outside the grid")]
    StartOutOfBounds(Cell),

    #[error("destination {0:?} lies outside the grid")]
    DestinationOutOfBounds(Cell),

    #[error("start {0:?} rejected by the policy")]
    InvalidStart(Cell),

    #[error("destination {0:?} rejected by the policy")]
    DestinationRejected(Cell),

    #[error("open list exhausted without reaching the destination")]
    Exhausted,

    #[error("search exceeded the turn ceiling of {0}")]
    TurnLimit(i32),

    #[error("search exceeded the expansion budget of {0}")]
    ExpansionLimit(usize),
}

/// A broken internal list invariant. Any of these indicates an engine bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("node {node:?} is threaded on the {expected:?} list but tagged {found:?}")]
    Membership {
        node: NodeIndex,
        expected: ListKind,
        found: ListKind,
    },

    #[error("node {node:?} has inconsistent prev/next links")]
    BrokenLink { node: NodeIndex },

    #[error("open list is not sorted at node {node:?}")]
    Unsorted { node: NodeIndex },

    #[error("{list:?} list claims {expected} nodes but {found} are tagged")]
    CountMismatch {
        list: ListKind,
        expected: usize,
        found: usize,
    },

    #[error("node {node:?} total cost does not equal known + heuristic")]
    StaleTotal { node: NodeIndex },

    #[error("node {node:?} has a parent that was never expanded")]
    OrphanParent { node: NodeIndex },

    #[error("node {node:?} was left on the propagation stack")]
    LeftOnStack { node: NodeIndex },
}
