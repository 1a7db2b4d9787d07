//! Partial-move overlay.
//!
//! Every primary node reached with movement left can have a twin in a second node set that
//! represents "stopped here with movement exhausted". The twin costs the primary cost plus
//! `movement_weight * moves` and continues the next turn from zero moves, which lets a search wait
//! on a cell instead of walking onto one where ending a turn is forbidden.

use crate::engine::{Layering, PathFinder};
use crate::node::{Layer, ListKind, Node, NodeIndex, TurnData};
use crate::{Cell, GridConfig, PartialMovePolicy};

#[derive(Debug, Clone, Copy, Default)]
pub struct TwoLayer;

pub type TwoLayerPathFinder<P> = PathFinder<P, TwoLayer>;

impl<P: PartialMovePolicy> Layering<P> for TwoLayer {
    fn primary_improved(finder: &mut PathFinder<P, Self>, node: NodeIndex) {
        let Some(grid) = finder.grid() else {
            return;
        };
        let (cell, known, turn, parent) = {
            let n = &finder.nodes[node.get()];
            if n.layer != Layer::Primary {
                return;
            }
            (n.cell, n.known_cost, n.turn, n.parent)
        };
        // The start node has nowhere to have stopped from.
        let Some(parent) = parent else {
            return;
        };
        let Some((stop_known, stop_turn)) =
            <Self as Layering<P>>::stop_candidate(&*finder, grid, cell, known, turn)
        else {
            return;
        };
        let Some(overlay) = finder.overlay_index(cell) else {
            return;
        };
        if finder.nodes[overlay.get()].list == ListKind::Unlisted {
            finder.stats.overlay_clones += 1;
        }
        finder.link_child(grid, parent, overlay, stop_known, stop_turn);
    }

    fn stop_candidate(
        finder: &PathFinder<P, Self>,
        grid: GridConfig,
        cell: Cell,
        known: i32,
        turn: TurnData,
    ) -> Option<(i32, TurnData)> {
        if turn.moves <= 0 {
            return None;
        }
        let slot = grid.index_of(cell)?;
        if !finder.facts.is_computed(slot) {
            return None;
        }
        let query = finder.session.query(grid);
        let policy = finder.policy();
        if !policy.stop_matters(&query, cell, turn, finder.facts.facts(slot)) {
            return None;
        }
        let penalty = policy.movement_weight().saturating_mul(turn.moves);
        Some((known.saturating_add(penalty), TurnData::new(0, turn.turn)))
    }
}

impl<P: PartialMovePolicy> PathFinder<P, TwoLayer> {
    pub fn two_layer(policy: P) -> Self {
        Self::build(policy)
    }

    /// Overlay node of `cell`, once the overlay has been allocated.
    pub fn partial_move_node(&self, cell: Cell) -> Option<&Node> {
        self.overlay_node(cell)
    }

    pub fn has_overlay(&self) -> bool {
        self.grid()
            .is_some_and(|grid| self.nodes.len() > grid.cell_count())
    }
}
