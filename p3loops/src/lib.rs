pub mod model;
pub mod error;
pub mod geometry {
    pub mod holonomy;
    pub mod limits;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod crossing;
    pub mod move_tree;
    pub mod order;
}
pub mod json;
pub mod state;

use algorithms::move_tree::{self, Cancellation, ExploreOptions, MoveTree, Never};
use error::{PathError, Result};
use geometry::holonomy::{Isometry, TransitionTable};
use geometry::{limits, tolerance};
use model::{BoundaryPoint, Class, Edge, EdgeSpec, Endpoint, Phase, PointId, PointSpec, Segment, Side};
use serde::{Deserialize, Serialize};
use state::EngineState;
use tracing::debug;

/// Runtime knobs. Missing fields take their defaults when deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub param_tolerance: f64,
    pub max_edges: usize,
    pub tree_depth: usize,
    pub max_tree_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            param_tolerance: tolerance::EPS_PARAM,
            max_edges: limits::MAX_EDGES,
            tree_depth: limits::DEFAULT_TREE_DEPTH,
            max_tree_nodes: limits::MAX_TREE_NODES,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !tolerance::valid_tolerance(self.param_tolerance) {
            return Err(PathError::MalformedInput(format!(
                "tolerance {} is outside [0, {}]",
                self.param_tolerance,
                tolerance::EPS_PARAM_MAX
            )));
        }
        if self.max_edges == 0 || self.max_edges > limits::MAX_EDGES {
            return Err(PathError::MalformedInput(format!(
                "max_edges must be within 1..={}",
                limits::MAX_EDGES
            )));
        }
        if self.tree_depth > limits::MAX_TREE_DEPTH {
            return Err(PathError::MalformedInput(format!(
                "tree depth {} exceeds {}",
                self.tree_depth,
                limits::MAX_TREE_DEPTH
            )));
        }
        if self.max_tree_nodes == 0 {
            return Err(PathError::MalformedInput("max_tree_nodes must be positive".into()));
        }
        Ok(())
    }

    /// Options for one exploration. `max_depth` is clamped to `MAX_TREE_DEPTH`.
    pub fn explore_options(&self, max_depth: usize) -> ExploreOptions {
        ExploreOptions {
            max_depth: max_depth.min(limits::MAX_TREE_DEPTH),
            max_nodes: self.max_tree_nodes,
            tolerance: self.param_tolerance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointView {
    pub id: PointId,
    #[serde(flatten)]
    pub point: BoundaryPoint,
}

/// Everything a renderer needs, detached from the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub closed: bool,
    pub edges: Vec<EdgeSpec>,
    pub points: Vec<PointView>,
    pub holonomy: Isometry,
    pub start: Option<PointSpec>,
    pub open_end: Option<PointSpec>,
    pub version: u64,
}

/// Stateful facade over [`EngineState`]. Failed edits leave it untouched apart from `last_error`.
#[derive(Clone, Debug)]
pub struct PathEngine {
    pub(crate) state: EngineState,
    pub(crate) holonomy: Isometry,
    pub(crate) table: TransitionTable,
    pub(crate) config: EngineConfig,
    pub(crate) last_error: Option<PathError>,
    pub(crate) version: u64,
}

impl Default for PathEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PathEngine {
    pub fn new() -> Self {
        Self::with_table(TransitionTable::p3())
    }

    pub fn with_table(table: TransitionTable) -> Self {
        PathEngine {
            state: EngineState::new(),
            holonomy: Isometry::IDENTITY,
            table,
            config: EngineConfig::default(),
            last_error: None,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn edges(&self) -> &[Edge] {
        self.state.edges()
    }

    pub fn last_error(&self) -> Option<&PathError> {
        self.last_error.as_ref()
    }

    pub fn holonomy(&self) -> Isometry {
        self.holonomy
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rank(&self, id: PointId) -> Option<usize> {
        self.state.order().rank(id)
    }

    /// Rank of the point at `t` on `side`, if it exists.
    pub fn rank_of(&self, side: Side, t: f64) -> Option<usize> {
        let order = self.state.order();
        order
            .find(side.class(), t, self.config.param_tolerance)
            .and_then(|id| order.rank(id))
    }

    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        if let Err(e) = config.validate() {
            return Err(self.reject("set_config", e));
        }
        self.config = config;
        Ok(())
    }

    pub fn set_tolerance(&mut self, tol: f64) -> Result<()> {
        self.set_config(EngineConfig {
            param_tolerance: tol,
            ..self.config
        })
    }

    /// Swaps the side-transition table and recomputes the index under it.
    pub fn set_table(&mut self, table: TransitionTable) -> Result<()> {
        if let Err(e) = table.validate() {
            return Err(self.reject("set_table", e));
        }
        self.table = table;
        self.holonomy = self.table.recompute(self.state.edges());
        self.version += 1;
        Ok(())
    }

    fn reject(&mut self, op: &'static str, e: PathError) -> PathError {
        debug!(op, code = e.code(), edge = ?e.edge_index(), "rejected");
        self.last_error = Some(e.clone());
        e
    }

    fn commit(&mut self, op: &'static str, next: Result<EngineState>) -> Result<()> {
        let next = match next {
            Ok(s) => s,
            Err(e) => return Err(self.reject(op, e)),
        };
        let prev = self.state.edges();
        let appended = next.edges().len() == prev.len() + 1 && next.edges().starts_with(prev);
        self.holonomy = match next.edges().last() {
            Some(edge) if appended => self.table.advance(self.holonomy, edge),
            _ => self.table.recompute(next.edges()),
        };
        self.state = next;
        self.last_error = None;
        self.version += 1;
        debug!(op, edges = self.state.edges().len(), phase = ?self.state.phase(), "committed");
        Ok(())
    }

    pub fn select_start(&mut self, side: Side, t: f64) -> Result<()> {
        let next = self.state.select_start(&PointSpec::boundary(side, t));
        self.commit("select_start", next)
    }

    pub fn add_first_edge(&mut self, from: PointSpec, to: PointSpec) -> Result<()> {
        let next = self
            .state
            .add_first_edge(&from, &to, self.config.param_tolerance);
        self.commit("add_first_edge", next)
    }

    pub fn add_edge(&mut self, to: PointSpec) -> Result<()> {
        let next = self.state.add_edge(&to, self.config.param_tolerance);
        self.commit("add_edge", next)
    }

    pub fn add_segment(&mut self, segment: &Segment) -> Result<()> {
        let next = self.state.add_segment(segment, self.config.param_tolerance);
        self.commit("add_segment", next)
    }

    /// On a closed loop this only reopens it. Returns false when there was nothing to remove.
    pub fn remove_last_edge(&mut self) -> bool {
        if self.state.edges().is_empty() {
            return false;
        }
        let next = self.state.remove_last_edge();
        self.commit("remove_last_edge", Ok(next)).is_ok()
    }

    pub fn can_close_loop(&self) -> Result<Edge> {
        self.state.can_close_loop()
    }

    pub fn close_loop(&mut self) -> Result<()> {
        let next = self.state.close_loop();
        self.commit("close_loop", next)
    }

    pub fn clear(&mut self) {
        self.state = self.state.clear();
        self.holonomy = Isometry::IDENTITY;
        self.last_error = None;
        self.version += 1;
        debug!("cleared");
    }

    pub fn open_end(&self) -> Option<Endpoint> {
        self.state.open_end()
    }

    pub fn available_next_segments(&self) -> Vec<Segment> {
        self.state.next_segments(self.config.param_tolerance)
    }

    /// Index after a hypothetical exit through `side`; the engine is unchanged.
    pub fn preview(&self, side: Side) -> Isometry {
        self.table.preview(self.holonomy, side)
    }

    /// Explores to the configured default depth.
    pub fn move_tree(&self) -> MoveTree {
        self.explore(self.config.tree_depth)
    }

    /// Depths above `limits::MAX_TREE_DEPTH` are clamped to it.
    pub fn explore(&self, max_depth: usize) -> MoveTree {
        self.explore_with(&self.config.explore_options(max_depth), &Never)
    }

    pub fn explore_with(&self, opts: &ExploreOptions, cancel: &dyn Cancellation) -> MoveTree {
        move_tree::explore(&self.state, self.holonomy, &self.table, opts, cancel)
    }

    pub fn to_specs(&self) -> Vec<EdgeSpec> {
        json::to_specs(&self.state)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_value(&self.state)
    }

    /// Replaces the path with `specs` if the whole list validates.
    pub fn load_specs(&mut self, specs: &[EdgeSpec]) -> Result<()> {
        let next = json::build_from_specs(specs, self.config.param_tolerance, self.config.max_edges);
        self.commit("load_specs", next)
    }

    pub fn from_json_value(&mut self, v: serde_json::Value) -> Result<()> {
        let next = json::from_json_value(v, self.config.param_tolerance, self.config.max_edges);
        self.commit("from_json_value", next)
    }

    pub fn snapshot(&self) -> Snapshot {
        let order = self.state.order();
        Snapshot {
            phase: self.state.phase(),
            closed: self.state.is_closed(),
            edges: self.to_specs(),
            points: Class::ALL
                .iter()
                .flat_map(|&c| order.points(c))
                .map(|(id, p)| PointView { id, point: *p })
                .collect(),
            holonomy: self.holonomy,
            start: self.state.start().map(|(side, t)| PointSpec::boundary(side, t)),
            open_end: self
                .state
                .open_end()
                .and_then(|ep| json::endpoint_spec(&self.state, &ep)),
            version: self.version,
        }
    }
}
