use std::iter::FusedIterator;

use crate::{Cell, Node, NodeIndex};

/// One waypoint of a reconstructed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub x: i32,
    pub y: i32,
    pub moves: i32,
    pub turn: i32,
}

impl PathStep {
    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

/// Walks parent links from a terminal node back to the start.
///
/// The walk is cheap and restartable; nothing is stored besides the cursor.
#[derive(Debug, Clone)]
pub struct PathSteps<'a> {
    nodes: &'a [Node],
    next: Option<NodeIndex>,
    remaining: usize,
}

impl<'a> PathSteps<'a> {
    pub(crate) fn new(nodes: &'a [Node], from: Option<NodeIndex>) -> Self {
        Self {
            nodes,
            next: from,
            remaining: nodes.len(),
        }
    }
}

impl Iterator for PathSteps<'_> {
    type Item = PathStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.next?.get()];
        self.remaining -= 1;
        self.next = node.parent;
        Some(PathStep {
            x: node.cell.x,
            y: node.cell.y,
            moves: node.turn.moves,
            turn: node.turn.turn,
        })
    }
}

impl FusedIterator for PathSteps<'_> {}
