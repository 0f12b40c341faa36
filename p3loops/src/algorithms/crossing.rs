// Crossing and revisit checks for candidate edges.
// Two chords of the boundary circle cross iff their endpoints interleave.

use crate::algorithms::order::BoundaryOrder;
use crate::error::{CloseBlocker, PathError, Result};
use crate::model::{Edge, Endpoint};

/// Interleave test on a circle of `len` positions. Chords sharing a position only touch.
pub fn chords_cross(a: (usize, usize), b: (usize, usize), len: usize) -> bool {
    let (a1, a2) = a;
    let (b1, b2) = b;
    if len == 0 || a1 == a2 || b1 == b2 {
        return false;
    }
    if a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2 {
        return false;
    }
    // Cut the circle at a1; b is split by a iff exactly one end lies strictly inside (a1, a2).
    let rel = |x: usize| (x + len - a1) % len;
    let end = rel(a2);
    let inside = |x: usize| {
        let r = rel(x);
        r > 0 && r < end
    };
    inside(b1) != inside(b2)
}

fn chord(e: &Edge, order: &BoundaryOrder) -> Option<(usize, usize)> {
    Some((order.cyclic_position(e.from)?, order.cyclic_position(e.to)?))
}

pub fn would_cross(a: &Edge, b: &Edge, order: &BoundaryOrder) -> bool {
    match (chord(a, order), chord(b, order)) {
        (Some(ca), Some(cb)) => chords_cross(ca, cb, order.circle_len()),
        _ => false,
    }
}

/// First existing edge crossed by `candidate`, scanning left to right.
pub fn first_crossing(candidate: &Edge, existing: &[Edge], order: &BoundaryOrder) -> Option<usize> {
    let c = chord(candidate, order)?;
    let len = order.circle_len();
    existing
        .iter()
        .position(|e| chord(e, order).map_or(false, |ce| chords_cross(c, ce, len)))
}

/// Validates `candidate` as the next edge after `existing`. All points must already be in `order`.
pub fn can_add(candidate: &Edge, existing: &[Edge], order: &BoundaryOrder) -> Result<()> {
    if candidate.from.point == candidate.to.point {
        return Err(if existing.is_empty() {
            PathError::DegenerateEdge
        } else {
            PathError::PointAlreadyVisited
        });
    }
    if let Some(last) = existing.last() {
        if candidate.to.point == last.from.point {
            return Err(PathError::RetraceForbidden);
        }
    }
    if existing.iter().any(|e| e.touches(candidate.to.point)) {
        return Err(PathError::PointAlreadyVisited);
    }
    match first_crossing(candidate, existing, order) {
        Some(i) => Err(PathError::CrossingDetected(i)),
        None => Ok(()),
    }
}

/// Edges that could close `edges` into a loop, in the order they are tried.
/// Each runs from the open end to the first point. When the open end already
/// lies on the first edge's start side, the same-side edge comes first, since
/// the first edge then continues it. The partner-side edge is always last.
pub fn closing_edges(edges: &[Edge]) -> Vec<Edge> {
    let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
        return Vec::new();
    };
    let from = last.continuation();
    let mut out = Vec::with_capacity(2);
    if from.side == first.from.side {
        out.push(Edge { from, to: first.from });
    }
    out.push(Edge {
        from,
        to: Endpoint {
            point: first.from.point,
            side: first.from.side.partner(),
        },
    });
    out
}

/// Validates a closing edge. Its endpoints are exempt from the revisit rule.
pub fn check_closing(closing: &Edge, edges: &[Edge], order: &BoundaryOrder) -> Result<()> {
    if edges.len() < 2 {
        return Err(PathError::LoopNotCloseable(CloseBlocker::TooFewEdges(edges.len())));
    }
    match first_crossing(closing, edges, order) {
        Some(i) => Err(PathError::LoopNotCloseable(CloseBlocker::Crossing(i))),
        None => Ok(()),
    }
}

/// The first closing edge that passes `check_closing`. When none does, the
/// error is the one reported for the partner-side edge.
pub fn can_close_loop(edges: &[Edge], closed: bool, order: &BoundaryOrder) -> Result<Edge> {
    if closed {
        return Err(PathError::LoopAlreadyClosed);
    }
    let mut blocked = PathError::LoopNotCloseable(CloseBlocker::TooFewEdges(edges.len()));
    for closing in closing_edges(edges) {
        match check_closing(&closing, edges, order) {
            Ok(()) => return Ok(closing),
            Err(e) => blocked = e,
        }
    }
    Err(blocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PointId, Side};

    #[test]
    fn interleaved_chords_cross() {
        assert!(chords_cross((0, 2), (1, 3), 4));
        assert!(chords_cross((1, 3), (0, 2), 4));
        assert!(chords_cross((2, 0), (3, 1), 4));
    }

    #[test]
    fn nested_and_disjoint_chords_do_not_cross() {
        assert!(!chords_cross((0, 5), (1, 2), 6));
        assert!(!chords_cross((0, 1), (2, 3), 6));
        assert!(!chords_cross((5, 0), (2, 3), 6));
    }

    #[test]
    fn shared_position_is_a_touch() {
        assert!(!chords_cross((0, 2), (2, 4), 6));
        assert!(!chords_cross((0, 3), (0, 5), 6));
    }

    #[test]
    fn wraparound_is_handled() {
        // (4 -> 1) wraps through 5 and 0.
        assert!(chords_cross((4, 1), (0, 2), 6));
        assert!(!chords_cross((4, 1), (5, 0), 6));
    }

    fn ep(point: u32, side: Side) -> Endpoint {
        Endpoint { point: PointId(point), side }
    }

    #[test]
    fn closing_candidates_follow_the_open_end() {
        // north(a) -> north(b) -> north(c): open end on the start side.
        let nested = [
            Edge { from: ep(0, Side::North), to: ep(1, Side::North) },
            Edge { from: ep(1, Side::North), to: ep(2, Side::North) },
        ];
        let c = closing_edges(&nested);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].to, ep(0, Side::North));
        assert_eq!(c[1].to, ep(0, Side::East));
        assert!(c.iter().all(|e| e.from == ep(2, Side::North)));

        // north -> south leaves through south, so the open end is on west.
        let across = [
            Edge { from: ep(0, Side::North), to: ep(1, Side::South) },
            Edge { from: ep(1, Side::West), to: ep(2, Side::South) },
        ];
        let c = closing_edges(&across);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].from, ep(2, Side::West));
        assert_eq!(c[0].to, ep(0, Side::East));

        assert!(closing_edges(&[]).is_empty());
    }

    #[test]
    fn symmetric_on_all_small_configurations() {
        let len = 6;
        for a1 in 0..len {
            for a2 in 0..len {
                for b1 in 0..len {
                    for b2 in 0..len {
                        assert_eq!(
                            chords_cross((a1, a2), (b1, b2), len),
                            chords_cross((b1, b2), (a1, a2), len)
                        );
                        assert_eq!(
                            chords_cross((a1, a2), (b1, b2), len),
                            chords_cross((a2, a1), (b1, b2), len)
                        );
                    }
                }
            }
        }
    }
}
