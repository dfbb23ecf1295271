//! Per-segment search bookkeeping: node attributes, open-set heap and
//! open/closed membership.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pathstep_core::{Point, Range};

/// Which set of the current segment a node belongs to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Membership {
    #[default]
    Unseen,
    Open,
    Closed,
}

// ---------------------------------------------------------------------------
// Internal node for the open-set priority queue
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) g: f64,
    pub(crate) h: f64,
    pub(crate) f: f64,
    /// Index of the cell this one was reached from; `usize::MAX` for none.
    /// Only meaningful while `generation` is current.
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) membership: Membership,
    /// Position in first-discovery order within the segment.
    pub(crate) order: u64,
    /// Bumped on every update so older heap entries can be recognised.
    pub(crate) version: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: usize::MAX,
            generation: 0,
            membership: Membership::Unseen,
            order: 0,
            version: 0,
        }
    }
}

/// Heap entry, ordered so that `BinaryHeap` (a max-heap) pops the lowest
/// `f` first, then the highest `g`, then the earliest discovered.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f64,
    pub(crate) g: f64,
    pub(crate) order: u64,
    pub(crate) version: u32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// Open and closed sets of one segment, plus per-cell `g`/`h`/`f`/parent.
///
/// Node storage is reused across segments: [`reset`](Self::reset) bumps a
/// generation counter instead of clearing every node, and any node from an
/// older generation reads as unseen.
pub(crate) struct SearchState {
    rng: Range,
    width: usize,
    nodes: Vec<Node>,
    generation: u32,
    open: BinaryHeap<NodeRef>,
    open_len: usize,
    closed_len: usize,
    next_order: u64,
}

impl SearchState {
    pub(crate) fn new() -> Self {
        Self {
            rng: Range::default(),
            width: 0,
            nodes: Vec::new(),
            generation: 0,
            open: BinaryHeap::new(),
            open_len: 0,
            closed_len: 0,
            next_order: 0,
        }
    }

    /// Start a fresh segment over the grid rectangle `rng`.
    pub(crate) fn reset(&mut self, rng: Range) {
        let len = rng.len();
        self.rng = rng;
        self.width = rng.width().max(0) as usize;
        self.open.clear();
        self.open_len = 0;
        self.closed_len = 0;
        self.next_order = 0;

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 || self.nodes.len() < len {
            // Wrapped around, or the grid grew: start from clean nodes.
            self.nodes.clear();
            self.nodes.resize(len, Node::default());
            self.generation = 1;
        }
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let x = (idx % self.width) as i32 + self.rng.min.x;
        let y = (idx / self.width) as i32 + self.rng.min.y;
        Point::new(x, y)
    }

    // -----------------------------------------------------------------------
    // Node queries
    // -----------------------------------------------------------------------

    /// The node at `idx` if it was touched in the current segment.
    #[inline]
    pub(crate) fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes
            .get(idx)
            .filter(|n| n.generation == self.generation && n.membership != Membership::Unseen)
    }

    #[inline]
    pub(crate) fn membership(&self, idx: usize) -> Membership {
        self.node(idx).map_or(Membership::Unseen, |n| n.membership)
    }

    #[inline]
    pub(crate) fn is_open(&self, idx: usize) -> bool {
        self.membership(idx) == Membership::Open
    }

    #[inline]
    pub(crate) fn is_closed(&self, idx: usize) -> bool {
        self.membership(idx) == Membership::Closed
    }

    #[inline]
    pub(crate) fn parent(&self, idx: usize) -> Option<usize> {
        self.node(idx)
            .map(|n| n.parent)
            .filter(|&p| p != usize::MAX)
    }

    pub(crate) fn open_len(&self) -> usize {
        self.open_len
    }

    pub(crate) fn closed_len(&self) -> usize {
        self.closed_len
    }

    // -----------------------------------------------------------------------
    // Set transitions
    // -----------------------------------------------------------------------

    /// Record `g`, `h` and `parent` for `idx` and make sure it is in the open
    /// set. A node entering the open set for the first time gets the next
    /// discovery order; an update keeps its original one.
    pub(crate) fn open(&mut self, idx: usize, g: f64, h: f64, parent: Option<usize>) {
        let generation = self.generation;
        let n = &mut self.nodes[idx];
        if n.generation != generation {
            *n = Node {
                generation,
                ..Node::default()
            };
        }
        if n.membership != Membership::Open {
            n.membership = Membership::Open;
            n.order = self.next_order;
            self.next_order += 1;
            self.open_len += 1;
        }
        n.g = g;
        n.h = h;
        n.f = g + h;
        n.parent = parent.unwrap_or(usize::MAX);
        n.version = n.version.wrapping_add(1);

        self.open.push(NodeRef {
            idx,
            f: n.f,
            g: n.g,
            order: n.order,
            version: n.version,
        });
    }

    /// The best open node without removing it, discarding stale heap entries
    /// on the way. `None` when the open set is empty.
    pub(crate) fn peek_best(&mut self) -> Option<usize> {
        while let Some(top) = self.open.peek() {
            let live = self
                .node(top.idx)
                .is_some_and(|n| n.membership == Membership::Open && n.version == top.version);
            if live {
                return Some(top.idx);
            }
            self.open.pop();
        }
        None
    }

    /// Move an open node to the closed set.
    pub(crate) fn close(&mut self, idx: usize) {
        if !self.is_open(idx) {
            return;
        }
        self.nodes[idx].membership = Membership::Closed;
        self.open_len -= 1;
        self.closed_len += 1;
    }
}
