use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of the rhombus. Parameters run north W→E, east S→N, south E→W, west N→S.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "n")]
    North,
    #[serde(alias = "e")]
    East,
    #[serde(alias = "s")]
    South,
    #[serde(alias = "w")]
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub fn class(self) -> Class {
        match self {
            Side::North | Side::East => Class::NE,
            Side::South | Side::West => Class::SW,
        }
    }

    /// The side glued to this one.
    pub fn partner(self) -> Side {
        match self {
            Side::North => Side::East,
            Side::East => Side::North,
            Side::South => Side::West,
            Side::West => Side::South,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::North => "north",
            Side::East => "east",
            Side::South => "south",
            Side::West => "west",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Side::North),
            "e" | "east" => Ok(Side::East),
            "s" | "south" => Ok(Side::South),
            "w" | "west" => Ok(Side::West),
            other => Err(PathError::MalformedInput(format!("unknown side: {other}"))),
        }
    }
}

/// Identification class: north≡east, south≡west.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    NE,
    SW,
}

impl Class {
    pub const ALL: [Class; 2] = [Class::NE, Class::SW];

    pub fn index(self) -> usize {
        match self {
            Class::NE => 0,
            Class::SW => 1,
        }
    }

    pub fn sides(self) -> [Side; 2] {
        match self {
            Class::NE => [Side::North, Side::East],
            Class::SW => [Side::South, Side::West],
        }
    }
}

/// Stable handle of a boundary point; index into the order model's slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub class: Class,
    /// Side the point was created on. Only affects drawing.
    pub side: Side,
    /// Dense position within the class, 0-based.
    pub rank: usize,
    pub param: f64,
}

/// An edge endpoint: an abstract point plus the physical side it is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub point: PointId,
    pub side: Side,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Edge {
    /// Same literal side, or both ends on one abstract point. Such an edge stays in its tile.
    pub fn is_same_side(&self) -> bool {
        self.from.side == self.to.side || self.from.point == self.to.point
    }

    /// Side through which the path leaves the current tile, if it leaves at all.
    pub fn exit_side(&self) -> Option<Side> {
        if self.is_same_side() {
            None
        } else {
            Some(self.to.side)
        }
    }

    /// Where the next edge starts: across the glued side after a tile change.
    pub fn continuation(&self) -> Endpoint {
        let side = match self.exit_side() {
            Some(side) => side.partner(),
            None => self.to.side,
        };
        Endpoint {
            point: self.to.point,
            side,
        }
    }

    pub fn touches(&self, id: PointId) -> bool {
        self.from.point == id || self.to.point == id
    }
}

/// A gap between consecutive points of one class, seen from one physical side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub side: Side,
    pub lo: f64,
    pub hi: f64,
}

impl Segment {
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }
}

/// Lifecycle of a path under construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Empty,
    AwaitingFirstEdge,
    Building,
    Closed,
}

// Wire format

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointSpec {
    Boundary {
        side: Side,
        t: f64,
    },
    Interior {
        interior: bool,
        southward: f64,
        eastward: f64,
    },
}

impl PointSpec {
    pub fn boundary(side: Side, t: f64) -> Self {
        PointSpec::Boundary { side, t }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: PointSpec,
    pub to: PointSpec,
}

impl EdgeSpec {
    pub fn new(from_side: Side, from_t: f64, to_side: Side, to_t: f64) -> Self {
        EdgeSpec {
            from: PointSpec::boundary(from_side, from_t),
            to: PointSpec::boundary(to_side, to_t),
        }
    }
}
