// Centralized caps to harden against untrusted input and runaway look-ahead

// Import caps
pub const MAX_EDGES: usize = 10_000;

// Parameter bounds along a side
pub const PARAM_MIN: f64 = 0.0;
pub const PARAM_MAX: f64 = 1.0;

// Move tree
pub const DEFAULT_TREE_DEPTH: usize = 2;
pub const MAX_TREE_DEPTH: usize = 8;
pub const MAX_TREE_NODES: usize = 4_096;

#[inline]
pub fn in_param_bounds(t: f64) -> bool { t.is_finite() && t >= PARAM_MIN && t <= PARAM_MAX }
