//! Path state and its transitions.
//!
//! Every transition takes `&self` and returns a new state; the receiver is
//! never modified.

use crate::algorithms::crossing;
use crate::algorithms::order::BoundaryOrder;
use crate::error::{PathError, Result};
use crate::geometry::limits;
use crate::model::{BoundaryPoint, Class, Edge, Endpoint, Phase, PointId, PointSpec, Segment, Side};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineState {
    pub(crate) order: BoundaryOrder,
    pub(crate) edges: Vec<Edge>,
    pub(crate) closed: bool,
    pub(crate) start: Option<(Side, f64)>,
}

/// Checks a wire point and returns its boundary coordinates.
pub(crate) fn boundary_spec(spec: &PointSpec) -> Result<(Side, f64)> {
    match *spec {
        PointSpec::Boundary { side, t } => {
            if !limits::in_param_bounds(t) {
                return Err(PathError::MalformedInput(format!(
                    "parameter {t} on {side} is outside [{}, {}]",
                    limits::PARAM_MIN,
                    limits::PARAM_MAX
                )));
            }
            Ok((side, t))
        }
        PointSpec::Interior { .. } => Err(PathError::MalformedInput(
            "interior points are not part of the boundary path".into(),
        )),
    }
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.closed {
            Phase::Closed
        } else if !self.edges.is_empty() {
            Phase::Building
        } else if self.start.is_some() {
            Phase::AwaitingFirstEdge
        } else {
            Phase::Empty
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn order(&self) -> &BoundaryOrder {
        &self.order
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn start(&self) -> Option<(Side, f64)> {
        self.start
    }

    pub fn point(&self, id: PointId) -> Option<&BoundaryPoint> {
        self.order.get(id)
    }

    /// Points of a class in rank order.
    pub fn points_by_class(&self, class: Class) -> Vec<BoundaryPoint> {
        self.order.points(class).map(|(_, p)| *p).collect()
    }

    /// Where the next edge would start. `None` while empty or closed.
    pub fn open_end(&self) -> Option<Endpoint> {
        if self.closed {
            return None;
        }
        self.edges.last().map(Edge::continuation)
    }

    pub fn select_start(&self, spec: &PointSpec) -> Result<EngineState> {
        match self.phase() {
            Phase::Empty | Phase::AwaitingFirstEdge => {}
            phase => {
                return Err(PathError::InvalidPhase {
                    op: "select_start",
                    phase,
                })
            }
        }
        let start = boundary_spec(spec)?;
        Ok(EngineState {
            start: Some(start),
            ..self.clone()
        })
    }

    pub fn add_first_edge(&self, from: &PointSpec, to: &PointSpec, tol: f64) -> Result<EngineState> {
        match self.phase() {
            Phase::Empty | Phase::AwaitingFirstEdge => {}
            phase => {
                return Err(PathError::InvalidPhase {
                    op: "add_first_edge",
                    phase,
                })
            }
        }
        let (from_side, from_t) = boundary_spec(from)?;
        let (to_side, to_t) = boundary_spec(to)?;
        let mut next = EngineState::new();
        let (a, _) = next.order.insert(from_side, from_t, tol);
        let (b, _) = next.order.insert(to_side, to_t, tol);
        let edge = Edge {
            from: Endpoint {
                point: a,
                side: from_side,
            },
            to: Endpoint {
                point: b,
                side: to_side,
            },
        };
        crossing::can_add(&edge, &[], &next.order)?;
        next.edges.push(edge);
        Ok(next)
    }

    /// Appends an edge from the open end. While awaiting the first edge, starts from the selected point.
    pub fn add_edge(&self, to: &PointSpec, tol: f64) -> Result<EngineState> {
        match self.phase() {
            Phase::Building => {}
            Phase::AwaitingFirstEdge => {
                if let Some((side, t)) = self.start {
                    return self.add_first_edge(&PointSpec::boundary(side, t), to, tol);
                }
            }
            Phase::Closed => return Err(PathError::LoopAlreadyClosed),
            phase => return Err(PathError::InvalidPhase { op: "add_edge", phase }),
        }
        let from_side = match self.open_end() {
            Some(ep) => ep.side,
            None => return Err(PathError::InvalidPhase { op: "add_edge", phase: self.phase() }),
        };
        self.push_edge(from_side, to, tol)
    }

    /// Appends an edge ending at the midpoint of `segment`.
    pub fn add_segment(&self, segment: &Segment, tol: f64) -> Result<EngineState> {
        self.add_edge(&PointSpec::boundary(segment.side, segment.midpoint()), tol)
    }

    /// Appends an edge from the open end's point, drawn from `from_side`.
    pub(crate) fn push_edge(&self, from_side: Side, to: &PointSpec, tol: f64) -> Result<EngineState> {
        let last = match self.edges.last() {
            Some(e) => *e,
            None => return Err(PathError::InvalidPhase { op: "add_edge", phase: self.phase() }),
        };
        if self.closed {
            return Err(PathError::LoopAlreadyClosed);
        }
        if from_side.class() != last.to.side.class() {
            return Err(PathError::MalformedInput(format!(
                "{from_side} is not identified with {}",
                last.to.side
            )));
        }
        let (to_side, to_t) = boundary_spec(to)?;
        let mut next = self.clone();
        let (b, _) = next.order.insert(to_side, to_t, tol);
        let edge = Edge {
            from: Endpoint {
                point: last.to.point,
                side: from_side,
            },
            to: Endpoint {
                point: b,
                side: to_side,
            },
        };
        crossing::can_add(&edge, &self.edges, &next.order)?;
        next.edges.push(edge);
        Ok(next)
    }

    pub fn can_close_loop(&self) -> Result<Edge> {
        crossing::can_close_loop(&self.edges, self.closed, &self.order)
    }

    pub fn close_loop(&self) -> Result<EngineState> {
        let closing = self.can_close_loop()?;
        let mut next = self.clone();
        next.edges.push(closing);
        next.closed = true;
        Ok(next)
    }

    /// Closes with explicitly drawn sides, as read back from an export.
    pub(crate) fn close_loop_with(&self, from_side: Side, to_side: Side) -> Result<EngineState> {
        if self.closed {
            return Err(PathError::LoopAlreadyClosed);
        }
        let (first, last) = match (self.edges.first(), self.edges.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return self.close_loop(),
        };
        if from_side.class() != last.to.side.class() || to_side.class() != first.from.side.class() {
            return Err(PathError::InvalidChain { index: self.edges.len() });
        }
        let closing = Edge {
            from: Endpoint {
                point: last.to.point,
                side: from_side,
            },
            to: Endpoint {
                point: first.from.point,
                side: to_side,
            },
        };
        crossing::check_closing(&closing, &self.edges, &self.order)?;
        let mut next = self.clone();
        next.edges.push(closing);
        next.closed = true;
        Ok(next)
    }

    /// Drops the last edge; on a closed loop only reopens it. No-op when empty.
    pub fn remove_last_edge(&self) -> EngineState {
        let mut next = self.clone();
        if next.closed {
            next.edges.pop();
            next.closed = false;
            return next;
        }
        let edge = match next.edges.pop() {
            Some(e) => e,
            None => return next,
        };
        next.order.remove(edge.to.point, &next.edges);
        next.order.remove(edge.from.point, &next.edges);
        next
    }

    pub fn clear(&self) -> EngineState {
        EngineState::new()
    }

    /// Boundary gaps the open end may legally reach next, in side order.
    pub fn next_segments(&self, tol: f64) -> Vec<Segment> {
        if self.phase() != Phase::Building {
            return Vec::new();
        }
        Side::ALL
            .iter()
            .flat_map(|&side| self.order.segments(side))
            .filter(|seg| self.add_segment(seg, tol).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn p(side: Side, t: f64) -> PointSpec {
        PointSpec::boundary(side, t)
    }

    #[test]
    fn phases_follow_edits() {
        let s = EngineState::new();
        assert_eq!(s.phase(), Phase::Empty);
        let s = s.select_start(&p(Side::North, 0.1)).unwrap();
        assert_eq!(s.phase(), Phase::AwaitingFirstEdge);
        let s = s.add_edge(&p(Side::South, 0.5), TOL).unwrap();
        assert_eq!(s.phase(), Phase::Building);
        assert_eq!(s.start(), None);
        let s = s.add_edge(&p(Side::North, 0.05), TOL).unwrap();
        let s = s.close_loop().unwrap();
        assert_eq!(s.phase(), Phase::Closed);
        assert_eq!(s.remove_last_edge().phase(), Phase::Building);
        assert_eq!(s.clear().phase(), Phase::Empty);
    }

    #[test]
    fn continuation_switches_to_partner_side() {
        let s = EngineState::new()
            .add_first_edge(&p(Side::North, 0.1), &p(Side::South, 0.5), TOL)
            .unwrap();
        let end = s.open_end().unwrap();
        assert_eq!(end.side, Side::West);
        assert_eq!(end.point, s.edges()[0].to.point);
    }

    #[test]
    fn same_side_edge_keeps_side() {
        let s = EngineState::new()
            .add_first_edge(&p(Side::North, 0.1), &p(Side::North, 0.5), TOL)
            .unwrap();
        assert_eq!(s.open_end().unwrap().side, Side::North);
    }

    #[test]
    fn first_edge_to_identified_point_is_degenerate() {
        let err = EngineState::new()
            .add_first_edge(&p(Side::North, 0.3), &p(Side::East, 0.3), TOL)
            .unwrap_err();
        assert_eq!(err, PathError::DegenerateEdge);
    }

    #[test]
    fn add_edge_requires_a_path() {
        let err = EngineState::new().add_edge(&p(Side::North, 0.3), TOL).unwrap_err();
        assert_eq!(err.code(), "invalid_phase");
    }

    #[test]
    fn out_of_range_parameter_is_malformed() {
        let err = EngineState::new()
            .add_first_edge(&p(Side::North, 1.5), &p(Side::South, 0.5), TOL)
            .unwrap_err();
        assert_eq!(err.code(), "malformed_input");
        let err = EngineState::new()
            .select_start(&p(Side::North, f64::NAN))
            .unwrap_err();
        assert_eq!(err.code(), "malformed_input");
    }

    #[test]
    fn interior_points_are_rejected() {
        let interior = PointSpec::Interior {
            interior: true,
            southward: 0.2,
            eastward: 0.3,
        };
        let err = EngineState::new()
            .add_first_edge(&interior, &p(Side::South, 0.5), TOL)
            .unwrap_err();
        assert_eq!(err.code(), "malformed_input");
    }

    #[test]
    fn removing_only_edge_drops_both_points() {
        let s = EngineState::new()
            .add_first_edge(&p(Side::North, 0.1), &p(Side::South, 0.5), TOL)
            .unwrap();
        let s = s.remove_last_edge();
        assert_eq!(s, EngineState::new());
        // Removing from empty is a no-op.
        assert_eq!(s.remove_last_edge(), s);
    }

    #[test]
    fn removal_keeps_shared_point() {
        let one = EngineState::new()
            .add_first_edge(&p(Side::North, 0.1), &p(Side::South, 0.5), TOL)
            .unwrap();
        let two = one.add_edge(&p(Side::North, 0.05), TOL).unwrap();
        assert_eq!(two.order().len(), 3);
        assert_eq!(two.remove_last_edge(), one);
    }

    #[test]
    fn next_segments_are_all_accepted() {
        let s = EngineState::new()
            .add_first_edge(&p(Side::North, 0.25), &p(Side::South, 0.75), TOL)
            .unwrap();
        let segs = s.next_segments(TOL);
        let mids: Vec<(Side, f64)> = segs.iter().map(|g| (g.side, g.midpoint())).collect();
        assert_eq!(
            mids,
            vec![
                (Side::North, 0.125),
                (Side::South, 0.875),
                (Side::West, 0.375),
                (Side::West, 0.875),
            ]
        );
    }
}
