//! Per-class ordered point sets with dense integer ranks.

use crate::geometry::tolerance::approx_eq;
use crate::model::{BoundaryPoint, Class, Edge, Endpoint, PointId, Segment, Side};
use std::cmp::Ordering;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryOrder {
    points: Vec<Option<BoundaryPoint>>, // id is index
    by_class: [Vec<PointId>; 2],        // rank order
}

impl BoundaryOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_class[0].len() + self.by_class[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: PointId) -> Option<&BoundaryPoint> {
        self.points.get(id.0 as usize).and_then(|p| p.as_ref())
    }

    pub fn rank(&self, id: PointId) -> Option<usize> {
        self.get(id).map(|p| p.rank)
    }

    /// Ids of a class in rank order.
    pub fn order(&self, class: Class) -> &[PointId] {
        &self.by_class[class.index()]
    }

    pub fn points(&self, class: Class) -> impl Iterator<Item = (PointId, &BoundaryPoint)> + '_ {
        self.order(class)
            .iter()
            .filter_map(move |&id| self.get(id).map(|p| (id, p)))
    }

    fn param_of(&self, id: PointId) -> f64 {
        self.get(id).map(|p| p.param).unwrap_or(f64::NAN)
    }

    /// Existing point of `class` within `tol` of `param`.
    pub fn find(&self, class: Class, param: f64, tol: f64) -> Option<PointId> {
        let ids = self.order(class);
        let at = ids.partition_point(|&id| self.param_of(id) < param);
        let below = at.checked_sub(1).map(|i| ids[i]);
        let above = ids.get(at).copied();
        [below, above]
            .into_iter()
            .flatten()
            .filter(|&id| approx_eq(self.param_of(id), param, tol))
            .min_by(|&a, &b| {
                let da = (self.param_of(a) - param).abs();
                let db = (self.param_of(b) - param).abs();
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            })
    }

    /// Finds or creates the point at `param` on `side`'s class. Returns `(id, created)`.
    pub fn insert(&mut self, side: Side, param: f64, tol: f64) -> (PointId, bool) {
        let class = side.class();
        if let Some(id) = self.find(class, param, tol) {
            return (id, false);
        }
        let at = self.order(class).partition_point(|&id| self.param_of(id) < param);
        let id = PointId(self.points.len() as u32);
        self.points.push(Some(BoundaryPoint {
            class,
            side,
            rank: at,
            param,
        }));
        self.by_class[class.index()].insert(at, id);
        self.renumber(class, at + 1);
        (id, true)
    }

    /// Deletes `id` unless an edge still references it. Ranks stay dense.
    pub fn remove(&mut self, id: PointId, edges: &[Edge]) -> bool {
        if edges.iter().any(|e| e.touches(id)) {
            return false;
        }
        let (class, rank) = match self.get(id) {
            Some(p) => (p.class, p.rank),
            None => return false,
        };
        self.by_class[class.index()].remove(rank);
        self.renumber(class, rank);
        if let Some(slot) = self.points.get_mut(id.0 as usize) {
            *slot = None;
        }
        // Keep slots compact so rebuilt states compare equal.
        while matches!(self.points.last(), Some(None)) {
            self.points.pop();
        }
        true
    }

    fn renumber(&mut self, class: Class, from: usize) {
        let ids = &self.by_class[class.index()];
        for (rank, id) in ids.iter().enumerate().skip(from) {
            if let Some(Some(p)) = self.points.get_mut(id.0 as usize) {
                p.rank = rank;
            }
        }
    }

    /// Rank comparison; `None` across classes.
    pub fn compare(&self, a: PointId, b: PointId) -> Option<Ordering> {
        let (pa, pb) = (self.get(a)?, self.get(b)?);
        if pa.class != pb.class {
            return None;
        }
        Some(pa.rank.cmp(&pb.rank))
    }

    /// Index in the single cyclic order: NE points by rank, then SW points by rank.
    pub fn cyclic_index(&self, id: PointId) -> Option<usize> {
        let p = self.get(id)?;
        Some(match p.class {
            Class::NE => p.rank,
            Class::SW => self.by_class[0].len() + p.rank,
        })
    }

    /// Total order over all points, across classes through [`Self::cyclic_index`].
    pub fn compare_cyclic(&self, a: PointId, b: PointId) -> Option<Ordering> {
        Some(self.cyclic_index(a)?.cmp(&self.cyclic_index(b)?))
    }

    pub fn circle_len(&self) -> usize {
        2 * self.len()
    }

    /// Position on the physical boundary circle, clockwise from the NW corner:
    /// north ranks ascending, east descending, south ascending, west descending.
    pub fn cyclic_position(&self, ep: Endpoint) -> Option<usize> {
        let rank = self.rank(ep.point)?;
        let ne = self.by_class[0].len();
        let sw = self.by_class[1].len();
        let pos = match ep.side {
            Side::North => rank,
            Side::East => 2 * ne - 1 - rank,
            Side::South => 2 * ne + rank,
            Side::West => 2 * ne + 2 * sw - 1 - rank,
        };
        Some(pos)
    }

    /// Gaps between consecutive points of `side`'s class, including the two end gaps.
    pub fn segments(&self, side: Side) -> Vec<Segment> {
        let mut bounds = vec![0.0];
        bounds.extend(self.points(side.class()).map(|(_, p)| p.param));
        bounds.push(1.0);
        bounds
            .windows(2)
            .filter(|w| w[1] > w[0])
            .map(|w| Segment {
                side,
                lo: w[0],
                hi: w[1],
            })
            .collect()
    }
}
