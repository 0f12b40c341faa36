//! Wallpaper index of the path: which copy of the rhombus it currently occupies.
//!
//! Group elements are `x ↦ R^k x + t` on the p3 lattice. Coordinates use the
//! basis `u` (north side, NW→NE) and `w` (`u` turned by +120°), with the NE
//! corner at the origin, so every element of the deck group has integer
//! translation and composition is exact.

use crate::error::{PathError, Result};
use crate::model::{Edge, Side};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Isometry {
    pub translation: (i64, i64),
    /// Number of +120° turns, always in 0..3.
    pub rotation: u8,
}

// R(a, b) = (-b, a - b) in the (u, w) basis.
#[inline]
fn turn(k: u8, (mut a, mut b): (i64, i64)) -> (i64, i64) {
    for _ in 0..k % 3 {
        let (na, nb) = (-b, a - b);
        a = na;
        b = nb;
    }
    (a, b)
}

impl Isometry {
    pub const IDENTITY: Isometry = Isometry {
        translation: (0, 0),
        rotation: 0,
    };

    pub fn new(tx: i64, ty: i64, rotation: u8) -> Result<Isometry> {
        if rotation >= 3 {
            return Err(PathError::InvalidTransitionTable(format!(
                "rotation {rotation} is not in 0..3"
            )));
        }
        Ok(Isometry {
            translation: (tx, ty),
            rotation,
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &Isometry) -> Isometry {
        let (ox, oy) = turn(self.rotation, other.translation);
        Isometry {
            translation: (ox + self.translation.0, oy + self.translation.1),
            rotation: (self.rotation + other.rotation) % 3,
        }
    }

    /// Image of a point given in lattice coordinates.
    pub fn map_point(&self, (a, b): (f64, f64)) -> (f64, f64) {
        let (mut a, mut b) = (a, b);
        for _ in 0..self.rotation % 3 {
            let (na, nb) = (-b, a - b);
            a = na;
            b = nb;
        }
        (a + self.translation.0 as f64, b + self.translation.1 as f64)
    }
}

impl Default for Isometry {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Side → isometry carrying the base tile onto its neighbour across that side.
/// Supplied by the geometry provider and treated as opaque data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    pub north: Isometry,
    pub east: Isometry,
    pub south: Isometry,
    pub west: Isometry,
}

impl TransitionTable {
    /// Table of the 120°/60° rhombus glued north≡east (about the NE corner)
    /// and south≡west (about the SW corner).
    pub fn p3() -> TransitionTable {
        TransitionTable {
            north: Isometry {
                translation: (0, 0),
                rotation: 2,
            },
            east: Isometry {
                translation: (0, 0),
                rotation: 1,
            },
            south: Isometry {
                translation: (-1, -2),
                rotation: 2,
            },
            west: Isometry {
                translation: (-2, -1),
                rotation: 1,
            },
        }
    }

    pub fn new(entries: [Isometry; 4]) -> Result<TransitionTable> {
        let table = TransitionTable {
            north: entries[0],
            east: entries[1],
            south: entries[2],
            west: entries[3],
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<TransitionTable> {
        let table: TransitionTable = serde_json::from_value(v)
            .map_err(|e| PathError::InvalidTransitionTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        for side in Side::ALL {
            let iso = self.get(side);
            if iso.rotation >= 3 {
                return Err(PathError::InvalidTransitionTable(format!(
                    "{side}: rotation {} is not in 0..3",
                    iso.rotation
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, side: Side) -> Isometry {
        match side {
            Side::North => self.north,
            Side::East => self.east,
            Side::South => self.south,
            Side::West => self.west,
        }
    }

    /// Right-composes the exit isometry when `edge` leaves its tile.
    pub fn advance(&self, index: Isometry, edge: &Edge) -> Isometry {
        match edge.exit_side() {
            Some(side) => index.compose(&self.get(side)),
            None => index,
        }
    }

    /// Index after a hypothetical exit through `side`.
    pub fn preview(&self, index: Isometry, side: Side) -> Isometry {
        index.compose(&self.get(side))
    }

    pub fn recompute(&self, edges: &[Edge]) -> Isometry {
        edges
            .iter()
            .fold(Isometry::IDENTITY, |acc, e| self.advance(acc, e))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::p3()
    }
}
