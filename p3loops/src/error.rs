use crate::model::Phase;
use std::fmt;
use thiserror::Error;

/// Why a loop cannot be closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseBlocker {
    TooFewEdges(usize),
    Crossing(usize),
}

impl fmt::Display for CloseBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseBlocker::TooFewEdges(n) => write!(f, "need at least 2 edges, have {n}"),
            CloseBlocker::Crossing(i) => write!(f, "closing edge would cross edge {i}"),
        }
    }
}

/// Every rejected edit. The engine state is untouched whenever one of these is returned.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PathError {
    #[error("edge would cross existing edge {0}")]
    CrossingDetected(usize),
    #[error("point already visited")]
    PointAlreadyVisited,
    #[error("would retrace existing edge")]
    RetraceForbidden,
    #[error("edge {index} does not continue from the previous edge")]
    InvalidChain { index: usize },
    #[error("loop is already closed")]
    LoopAlreadyClosed,
    #[error("loop cannot be closed: {0}")]
    LoopNotCloseable(CloseBlocker),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("edge endpoints resolve to the same point")]
    DegenerateEdge,
    #[error("{op} is not allowed while {phase:?}")]
    InvalidPhase { op: &'static str, phase: Phase },
    #[error("invalid transition table: {0}")]
    InvalidTransitionTable(String),
    #[error("edge {index}: {source}")]
    Import {
        index: usize,
        #[source]
        source: Box<PathError>,
    },
}

impl PathError {
    pub fn code(&self) -> &'static str {
        match self {
            PathError::CrossingDetected(_) => "crossing_detected",
            PathError::PointAlreadyVisited => "point_already_visited",
            PathError::RetraceForbidden => "retrace_forbidden",
            PathError::InvalidChain { .. } => "invalid_chain",
            PathError::LoopAlreadyClosed => "loop_already_closed",
            PathError::LoopNotCloseable(_) => "loop_not_closeable",
            PathError::MalformedInput(_) => "malformed_input",
            PathError::DegenerateEdge => "degenerate_edge",
            PathError::InvalidPhase { .. } => "invalid_phase",
            PathError::InvalidTransitionTable(_) => "invalid_transition_table",
            PathError::Import { source, .. } => source.code(),
        }
    }

    /// Index of the existing edge that blocks the edit (crossings) or of the offending input edge (imports).
    pub fn edge_index(&self) -> Option<usize> {
        match self {
            PathError::CrossingDetected(i) => Some(*i),
            PathError::LoopNotCloseable(CloseBlocker::Crossing(i)) => Some(*i),
            PathError::InvalidChain { index } => Some(*index),
            PathError::Import { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn at_edge(self, index: usize) -> PathError {
        match self {
            e @ (PathError::Import { .. } | PathError::InvalidChain { .. }) => e,
            e => PathError::Import {
                index,
                source: Box::new(e),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PathError>;
