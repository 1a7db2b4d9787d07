//! Intrusive doubly linked lists threaded through the node arena.
//!
//! Links are arena indices stored on the nodes themselves, so moving a node between lists never
//! allocates. The open list keeps nodes sorted ascending by total cost, ties in insertion order.

use std::iter::FusedIterator;

use crate::node::{Link, ListKind, Node, NodeIndex};

/// Where `insert_sorted` placed a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Only,
    Front,
    Back,
    ForwardScan,
    BackwardScan,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeList {
    kind: ListKind,
    head: Option<NodeIndex>,
    tail: Option<NodeIndex>,
    len: usize,
}

impl NodeList {
    pub(crate) const fn new(kind: ListKind) -> Self {
        Self {
            kind,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> ListKind {
        self.kind
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<NodeIndex> {
        self.head
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget every member without touching the nodes. Callers reset the nodes themselves.
    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub(crate) fn iter<'a>(&self, nodes: &'a [Node]) -> ListIter<'a> {
        ListIter {
            nodes,
            next: self.head,
            remaining: self.len,
        }
    }

    fn adopt(&mut self, nodes: &mut [Node], idx: NodeIndex, link: Link) {
        debug_assert_eq!(nodes[idx.get()].list, ListKind::Unlisted);
        let node = &mut nodes[idx.get()];
        node.list = self.kind;
        node.link = link;
        self.len += 1;
    }

    pub(crate) fn push_front(&mut self, nodes: &mut [Node], idx: NodeIndex) {
        let old_head = self.head;
        self.adopt(nodes, idx, Link { prev: None, next: old_head });
        match old_head {
            Some(h) => nodes[h.get()].link.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    pub(crate) fn push_back(&mut self, nodes: &mut [Node], idx: NodeIndex) {
        let old_tail = self.tail;
        self.adopt(nodes, idx, Link { prev: old_tail, next: None });
        match old_tail {
            Some(t) => nodes[t.get()].link.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    pub(crate) fn insert_before(&mut self, nodes: &mut [Node], at: NodeIndex, idx: NodeIndex) {
        let prev = nodes[at.get()].link.prev;
        let Some(prev) = prev else {
            self.push_front(nodes, idx);
            return;
        };
        self.adopt(nodes, idx, Link { prev: Some(prev), next: Some(at) });
        nodes[prev.get()].link.next = Some(idx);
        nodes[at.get()].link.prev = Some(idx);
    }

    pub(crate) fn insert_after(&mut self, nodes: &mut [Node], at: NodeIndex, idx: NodeIndex) {
        let next = nodes[at.get()].link.next;
        let Some(next) = next else {
            self.push_back(nodes, idx);
            return;
        };
        self.adopt(nodes, idx, Link { prev: Some(at), next: Some(next) });
        nodes[at.get()].link.next = Some(idx);
        nodes[next.get()].link.prev = Some(idx);
    }

    pub(crate) fn unlink(&mut self, nodes: &mut [Node], idx: NodeIndex) {
        debug_assert_eq!(nodes[idx.get()].list, self.kind);
        let Link { prev, next } = nodes[idx.get()].link;
        match prev {
            Some(p) => nodes[p.get()].link.next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => nodes[n.get()].link.prev = prev,
            None => self.tail = prev,
        }
        let node = &mut nodes[idx.get()];
        node.link = Link::default();
        node.list = ListKind::Unlisted;
        self.len -= 1;
    }

    pub(crate) fn pop_front(&mut self, nodes: &mut [Node]) -> Option<NodeIndex> {
        let head = self.head?;
        self.unlink(nodes, head);
        Some(head)
    }

    /// Insert keeping ascending `total_cost` order.
    ///
    /// Cheap cases first: empty list, new minimum, new maximum. Otherwise scan from whichever end
    /// is numerically closer to the node's cost, which keeps insertion near constant time while
    /// the frontier cost grows roughly monotonically.
    pub(crate) fn insert_sorted(&mut self, nodes: &mut [Node], idx: NodeIndex) -> Placement {
        let cost = nodes[idx.get()].total_cost;
        let (Some(head), Some(tail)) = (self.head, self.tail) else {
            self.push_back(nodes, idx);
            return Placement::Only;
        };

        let head_cost = nodes[head.get()].total_cost;
        let tail_cost = nodes[tail.get()].total_cost;
        if cost < head_cost {
            self.push_front(nodes, idx);
            return Placement::Front;
        }
        if cost >= tail_cost {
            self.push_back(nodes, idx);
            return Placement::Back;
        }

        let from_head = cost as i64 - head_cost as i64;
        let from_tail = tail_cost as i64 - cost as i64;
        if from_head <= from_tail {
            // head <= cost < tail: the first strictly greater node exists.
            let mut cursor = nodes[head.get()].link.next;
            while let Some(at) = cursor {
                if nodes[at.get()].total_cost > cost {
                    self.insert_before(nodes, at, idx);
                    return Placement::ForwardScan;
                }
                cursor = nodes[at.get()].link.next;
            }
        } else {
            let mut cursor = nodes[tail.get()].link.prev;
            while let Some(at) = cursor {
                if nodes[at.get()].total_cost <= cost {
                    self.insert_after(nodes, at, idx);
                    return Placement::BackwardScan;
                }
                cursor = nodes[at.get()].link.prev;
            }
        }

        debug_assert!(false, "open list lost its ordering");
        self.push_back(nodes, idx);
        Placement::Back
    }

    /// Restore ordering after `idx`'s total cost decreased in place. Walks backward only as far as
    /// the new cost requires.
    pub(crate) fn resort_decreased(&mut self, nodes: &mut [Node], idx: NodeIndex) {
        let cost = nodes[idx.get()].total_cost;
        let mut before = nodes[idx.get()].link.prev;
        if before.is_none_or(|p| nodes[p.get()].total_cost <= cost) {
            return;
        }
        while let Some(p) = before {
            if nodes[p.get()].total_cost <= cost {
                break;
            }
            before = nodes[p.get()].link.prev;
        }
        self.unlink(nodes, idx);
        match before {
            Some(p) => self.insert_after(nodes, p, idx),
            None => self.push_front(nodes, idx),
        }
    }

    /// Re-sort every member after their keys changed wholesale. Stable with respect to the current
    /// order.
    pub(crate) fn resort_all(&mut self, nodes: &mut [Node]) {
        let mut members: Vec<NodeIndex> = self.iter(nodes).collect();
        members.sort_by_key(|idx| nodes[idx.get()].total_cost);
        for &idx in &members {
            let node = &mut nodes[idx.get()];
            node.link = Link::default();
            node.list = ListKind::Unlisted;
        }
        self.clear();
        for idx in members {
            self.push_back(nodes, idx);
        }
    }
}

pub(crate) struct ListIter<'a> {
    nodes: &'a [Node],
    next: Option<NodeIndex>,
    remaining: usize,
}

impl Iterator for ListIter<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        // `remaining` guards against cycles in a corrupted list.
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.nodes[current.get()].link.next;
        Some(current)
    }
}

impl FusedIterator for ListIter<'_> {}
