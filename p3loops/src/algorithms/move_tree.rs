//! Bounded breadth-first enumeration of legal continuations.
//!
//! Work is driven by an explicit queue with a node budget. The caller's
//! [`Cancellation`] is polled before every expansion. A node that can close
//! the loop is not extended; its single child is the closed loop.

use crate::geometry::holonomy::{Isometry, TransitionTable};
use crate::geometry::{limits, tolerance};
use crate::model::{Segment, Side};
use crate::state::EngineState;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, trace};

/// How a node was reached from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    Segment(Segment),
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// Children enumerated.
    Expanded,
    /// Depth limit reached before expansion.
    Horizon,
    /// No legal move and no way to close.
    DeadEnd,
    /// The loop is closed; nothing follows.
    Closed,
    /// Left unexpanded by the node budget or cancellation.
    Pruned,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNode {
    #[serde(skip)]
    pub state: EngineState,
    pub holonomy: Isometry,
    pub incoming: Option<Move>,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub can_close: bool,
    pub status: NodeStatus,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MoveTree {
    pub nodes: Vec<MoveNode>, // index 0 is the root
    pub pruned: usize,
    pub cancelled: bool,
}

impl MoveTree {
    pub fn root(&self) -> Option<&MoveNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: usize) -> impl Iterator<Item = &MoveNode> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(move |n| n.children.iter().filter_map(move |&c| self.nodes.get(c)))
    }

    pub fn count_at_depth(&self, depth: usize) -> usize {
        self.nodes.iter().filter(|n| n.depth == depth).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExploreOptions {
    pub max_depth: usize,
    pub max_nodes: usize,
    pub tolerance: f64,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        ExploreOptions {
            max_depth: limits::DEFAULT_TREE_DEPTH,
            max_nodes: limits::MAX_TREE_NODES,
            tolerance: tolerance::EPS_PARAM,
        }
    }
}

/// Polled between expansions; returning true stops the search.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> Cancellation for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Cancels once the wall clock passes the instant.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(pub Instant);

impl Cancellation for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl Cancellation for Never {
    fn is_cancelled(&self) -> bool {
        false
    }
}

fn node(
    state: EngineState,
    holonomy: Isometry,
    incoming: Option<Move>,
    depth: usize,
    parent: Option<usize>,
) -> MoveNode {
    let can_close = state.can_close_loop().is_ok();
    let status = if state.is_closed() {
        NodeStatus::Closed
    } else {
        NodeStatus::Expanded
    };
    MoveNode {
        state,
        holonomy,
        incoming,
        depth,
        parent,
        children: Vec::new(),
        can_close,
        status,
    }
}

pub fn explore(
    root: &EngineState,
    holonomy: Isometry,
    table: &TransitionTable,
    opts: &ExploreOptions,
    cancel: &dyn Cancellation,
) -> MoveTree {
    let budget = opts.max_nodes.max(1);
    let mut tree = MoveTree {
        nodes: vec![node(root.clone(), holonomy, None, 0, None)],
        pruned: 0,
        cancelled: false,
    };
    let mut queue = VecDeque::from([0usize]);

    while let Some(id) = queue.pop_front() {
        if tree.nodes[id].status == NodeStatus::Closed {
            continue;
        }
        if cancel.is_cancelled() {
            tree.cancelled = true;
            queue.push_front(id);
            break;
        }
        if tree.nodes[id].depth >= opts.max_depth {
            tree.nodes[id].status = NodeStatus::Horizon;
            continue;
        }

        let parent = &tree.nodes[id];
        // A closeable node is a leaf of the search: its only move is the close.
        let moves: Vec<(Move, EngineState)> = if parent.can_close {
            parent
                .state
                .close_loop()
                .ok()
                .map(|next| (Move::Close, next))
                .into_iter()
                .collect()
        } else if parent.state.open_end().is_some() {
            Side::ALL
                .iter()
                .flat_map(|&side| parent.state.order().segments(side))
                .filter_map(|seg| {
                    let next = parent.state.add_segment(&seg, opts.tolerance).ok()?;
                    Some((Move::Segment(seg), next))
                })
                .collect()
        } else {
            Vec::new()
        };
        let (depth, base) = (parent.depth + 1, parent.holonomy);
        trace!(node = id, depth = parent.depth, moves = moves.len(), "expand");

        if moves.is_empty() {
            tree.nodes[id].status = NodeStatus::DeadEnd;
            continue;
        }
        if tree.nodes.len() + moves.len() > budget {
            tree.nodes[id].status = NodeStatus::Pruned;
            tree.pruned += 1;
            continue;
        }

        for (mv, next) in moves {
            let h = match next.edges().last() {
                Some(edge) => table.advance(base, edge),
                None => base,
            };
            let child = tree.nodes.len();
            tree.nodes.push(node(next, h, Some(mv), depth, Some(id)));
            tree.nodes[id].children.push(child);
            queue.push_back(child);
        }
    }

    // Anything still queued was never looked at.
    for id in queue {
        if tree.nodes[id].status != NodeStatus::Closed {
            tree.nodes[id].status = NodeStatus::Pruned;
            tree.pruned += 1;
        }
    }

    debug!(
        nodes = tree.nodes.len(),
        pruned = tree.pruned,
        cancelled = tree.cancelled,
        "move tree explored"
    );
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointSpec;

    const TOL: f64 = 1e-6;

    fn one_edge() -> EngineState {
        EngineState::new()
            .add_first_edge(
                &PointSpec::boundary(Side::North, 0.25),
                &PointSpec::boundary(Side::South, 0.75),
                TOL,
            )
            .unwrap()
    }

    fn opts(max_depth: usize, max_nodes: usize) -> ExploreOptions {
        ExploreOptions {
            max_depth,
            max_nodes,
            tolerance: TOL,
        }
    }

    #[test]
    fn depth_zero_is_a_lone_horizon() {
        let t = TransitionTable::p3();
        let tree = explore(&one_edge(), Isometry::IDENTITY, &t, &opts(0, 100), &Never);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes[0].status, NodeStatus::Horizon);
    }

    #[test]
    fn depth_one_lists_every_segment() {
        let t = TransitionTable::p3();
        let s = one_edge();
        let tree = explore(&s, Isometry::IDENTITY, &t, &opts(1, 100), &Never);
        assert_eq!(tree.count_at_depth(1), s.next_segments(TOL).len());
        assert!(tree.children(0).all(|c| c.status == NodeStatus::Horizon));
        assert!(!tree.nodes[0].can_close);
    }

    #[test]
    fn empty_root_is_a_dead_end() {
        let t = TransitionTable::p3();
        let tree = explore(&EngineState::new(), Isometry::IDENTITY, &t, &opts(2, 100), &Never);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes[0].status, NodeStatus::DeadEnd);
    }

    #[test]
    fn budget_prunes_instead_of_overflowing() {
        let t = TransitionTable::p3();
        let tree = explore(&one_edge(), Isometry::IDENTITY, &t, &opts(3, 6), &Never);
        assert!(tree.len() <= 6);
        assert!(tree.pruned > 0);
        assert!(tree.nodes.iter().any(|n| n.status == NodeStatus::Pruned));
    }

    #[test]
    fn cancellation_stops_before_expanding() {
        let t = TransitionTable::p3();
        let flag = AtomicBool::new(true);
        let tree = explore(&one_edge(), Isometry::IDENTITY, &t, &opts(3, 100), &flag);
        assert!(tree.cancelled);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes[0].status, NodeStatus::Pruned);
    }

    #[test]
    fn closeable_node_only_closes() {
        let t = TransitionTable::p3();
        let s = one_edge()
            .add_edge(&PointSpec::boundary(Side::North, 0.125), TOL)
            .unwrap();
        let tree = explore(&s, Isometry::IDENTITY, &t, &opts(3, 100), &Never);
        assert!(tree.nodes[0].can_close);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nodes[1].incoming, Some(Move::Close));
        assert_eq!(tree.nodes[1].status, NodeStatus::Closed);
    }

    #[test]
    fn child_holonomy_follows_its_edge() {
        let t = TransitionTable::p3();
        let s = one_edge();
        let h = t.recompute(s.edges());
        let tree = explore(&s, h, &t, &opts(1, 100), &Never);
        for child in tree.children(0) {
            assert_eq!(child.holonomy, t.recompute(child.state.edges()));
        }
    }
}
