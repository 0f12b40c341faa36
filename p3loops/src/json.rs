use crate::algorithms::crossing;
use crate::algorithms::order::BoundaryOrder;
use crate::error::{PathError, Result};
use crate::geometry::tolerance::approx_eq;
use crate::model::{Edge, EdgeSpec, Endpoint, PointSpec, Side};
use crate::state::{boundary_spec, EngineState};
use serde_json::Value;
use tracing::debug;

pub fn endpoint_spec(state: &EngineState, ep: &Endpoint) -> Option<PointSpec> {
    state
        .point(ep.point)
        .map(|p| PointSpec::boundary(ep.side, p.param))
}

pub fn edge_spec(state: &EngineState, edge: &Edge) -> Option<EdgeSpec> {
    Some(EdgeSpec {
        from: endpoint_spec(state, &edge.from)?,
        to: endpoint_spec(state, &edge.to)?,
    })
}

/// Edges in path order as `{from:{side,t}, to:{side,t}}`, closing edge included.
pub fn to_specs(state: &EngineState) -> Vec<EdgeSpec> {
    state
        .edges()
        .iter()
        .filter_map(|e| edge_spec(state, e))
        .collect()
}

pub fn to_json_value(state: &EngineState) -> Value {
    serde_json::to_value(to_specs(state)).unwrap_or(Value::Null)
}

pub fn parse_specs(v: Value) -> Result<Vec<EdgeSpec>> {
    if !v.is_array() {
        return Err(PathError::MalformedInput("expected an array of edges".into()));
    }
    serde_json::from_value(v).map_err(|e| PathError::MalformedInput(e.to_string()))
}

pub fn from_json_value(v: Value, tol: f64, max_edges: usize) -> Result<EngineState> {
    let specs = parse_specs(v)?;
    build_from_specs(&specs, tol, max_edges)
}

fn same_point(a: (Side, f64), b: (Side, f64), tol: f64) -> bool {
    a.0.class() == b.0.class() && approx_eq(a.1, b.1, tol)
}

/// Replays `specs` through the validator. Fails on the first offending edge.
pub fn build_from_specs(specs: &[EdgeSpec], tol: f64, max_edges: usize) -> Result<EngineState> {
    if specs.len() > max_edges {
        return Err(PathError::MalformedInput(format!(
            "{} edges exceeds the limit of {max_edges}",
            specs.len()
        )));
    }
    let result = replay(specs, tol);
    match &result {
        Ok(s) => debug!(edges = specs.len(), phase = ?s.phase(), "import ok"),
        Err(e) => debug!(code = e.code(), edge = ?e.edge_index(), "import rejected"),
    }
    result
}

fn replay(specs: &[EdgeSpec], tol: f64) -> Result<EngineState> {
    let mut state = EngineState::new();
    let Some(first) = specs.first() else {
        return Ok(state);
    };
    state = state
        .add_first_edge(&first.from, &first.to, tol)
        .map_err(|e| e.at_edge(0))?;
    let start = boundary_spec(&first.from).map_err(|e| e.at_edge(0))?;
    let mut prev_to = boundary_spec(&first.to).map_err(|e| e.at_edge(0))?;

    for (i, spec) in specs.iter().enumerate().skip(1) {
        let from = boundary_spec(&spec.from).map_err(|e| e.at_edge(i))?;
        let to = boundary_spec(&spec.to).map_err(|e| e.at_edge(i))?;
        if !same_point(from, prev_to, tol) {
            return Err(PathError::InvalidChain { index: i });
        }
        let closes = i + 1 == specs.len() && i >= 2 && same_point(to, start, tol);
        state = if closes {
            state.close_loop_with(from.0, to.0)
        } else {
            state.push_edge(from.0, &spec.to, tol)
        }
        .map_err(|e| e.at_edge(i))?;
        prev_to = to;
    }
    Ok(state)
}

/// Each edge starts where the previous one ended.
pub fn is_valid_chain(specs: &[EdgeSpec], tol: f64) -> bool {
    let mut prev: Option<(Side, f64)> = None;
    for spec in specs {
        let (Ok(from), Ok(to)) = (boundary_spec(&spec.from), boundary_spec(&spec.to)) else {
            return false;
        };
        if let Some(p) = prev {
            if !same_point(from, p, tol) {
                return false;
            }
        }
        prev = Some(to);
    }
    true
}

/// No two edges of the list interleave on the boundary circle.
pub fn is_noncrossing(specs: &[EdgeSpec], tol: f64) -> bool {
    let mut order = BoundaryOrder::new();
    let mut edges = Vec::with_capacity(specs.len());
    for spec in specs {
        let (Ok(from), Ok(to)) = (boundary_spec(&spec.from), boundary_spec(&spec.to)) else {
            return false;
        };
        let (a, _) = order.insert(from.0, from.1, tol);
        let (b, _) = order.insert(to.0, to.1, tol);
        edges.push(Edge {
            from: Endpoint { point: a, side: from.0 },
            to: Endpoint { point: b, side: to.0 },
        });
    }
    edges.iter().enumerate().all(|(i, a)| {
        edges[i + 1..]
            .iter()
            .all(|b| !crossing::would_cross(a, b, &order))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn chain_check_uses_identification() {
        let specs = [
            EdgeSpec::new(Side::North, 0.1, Side::South, 0.5),
            EdgeSpec::new(Side::West, 0.5, Side::North, 0.05),
        ];
        assert!(is_valid_chain(&specs, TOL));
        let broken = [
            EdgeSpec::new(Side::North, 0.1, Side::South, 0.5),
            EdgeSpec::new(Side::East, 0.5, Side::North, 0.05),
        ];
        assert!(!is_valid_chain(&broken, TOL));
        assert!(is_valid_chain(&[], TOL));
    }

    #[test]
    fn crossing_pairs_detected() {
        let crossing = [
            EdgeSpec::new(Side::North, 0.1, Side::South, 0.1),
            EdgeSpec::new(Side::East, 0.5, Side::West, 0.5),
        ];
        assert!(!is_noncrossing(&crossing, TOL));
        let apart = [
            EdgeSpec::new(Side::North, 0.2, Side::North, 0.4),
            EdgeSpec::new(Side::South, 0.6, Side::South, 0.8),
        ];
        assert!(is_noncrossing(&apart, TOL));
    }

    #[test]
    fn non_array_is_malformed() {
        let err = parse_specs(serde_json::json!({"edges": []})).unwrap_err();
        assert_eq!(err.code(), "malformed_input");
    }

    #[test]
    fn abbreviated_sides_parse() {
        let v = serde_json::json!([{"from": {"side": "n", "t": 0.1}, "to": {"side": "south", "t": 0.5}}]);
        let specs = parse_specs(v).unwrap();
        assert_eq!(specs[0], EdgeSpec::new(Side::North, 0.1, Side::South, 0.5));
    }
}
