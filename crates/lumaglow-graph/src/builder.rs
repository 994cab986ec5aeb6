//! Graph builder: an arena of stages plus the directed edges between their ports.
//!
//! Stages live in a `Vec` indexed by [`StageId`] and are never removed, so an
//! id stays valid for the builder's whole lifetime. Edges are stored keyed by
//! their destination input port, which makes "at most one incoming edge per
//! input" structural: connecting to an occupied input replaces the old edge.
//!
//! Two boundary proxies are created with every builder: [`StageId::INPUT`]
//! (a single `output` port) and [`StageId::OUTPUT`] (a single `input` port).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use lumaglow_core::{ports, GraphError, ParamValue, ParamValues, PortDirection, Result, StageId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog;
use crate::registry::StageRegistry;
use crate::stage::{OpaqueStage, PortSpec, Stage};

/// Label of the input boundary proxy.
pub const INPUT_LABEL: &str = "input";

/// Label of the output boundary proxy.
pub const OUTPUT_LABEL: &str = "output";

/// A port on a specific stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub stage: StageId,
    pub port: String,
}

impl PortRef {
    pub fn new(stage: StageId, port: impl Into<String>) -> Self {
        Self {
            stage,
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stage, self.port)
    }
}

/// A directed edge from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: PortRef,
    pub to: PortRef,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

struct StageSlot {
    label: String,
    stage: Box<dyn Stage>,
}

/// Edge map keyed by destination input port.
pub(crate) type EdgeMap = BTreeMap<PortRef, PortRef>;

/// Owns the stages of one meta-operation instance and their wiring.
///
/// No internal locking: the owner serializes all calls.
pub struct GraphBuilder {
    stages: Vec<StageSlot>,
    labels: HashMap<String, StageId>,
    pub(crate) edges: EdgeMap,
    sealed: bool,
}

impl GraphBuilder {
    /// Create a builder holding only the two boundary proxies.
    pub fn new() -> Self {
        let mut builder = Self {
            stages: Vec::new(),
            labels: HashMap::new(),
            edges: BTreeMap::new(),
            sealed: false,
        };
        for (label, descriptor) in [
            (INPUT_LABEL, catalog::input_proxy()),
            (OUTPUT_LABEL, catalog::output_proxy()),
        ] {
            builder.push(label, Box::new(OpaqueStage::with_defaults(Arc::new(descriptor))));
        }
        builder
    }

    fn push(&mut self, label: &str, stage: Box<dyn Stage>) -> StageId {
        let id = StageId(self.stages.len() as u32);
        self.labels.insert(label.to_string(), id);
        self.stages.push(StageSlot {
            label: label.to_string(),
            stage,
        });
        id
    }

    /// Create a stage of `kind` through the registry and give it `label`.
    ///
    /// Fails with `InvalidState` once the builder is sealed.
    pub fn create_stage(
        &mut self,
        registry: &StageRegistry,
        label: &str,
        kind: &str,
        initial: &ParamValues,
    ) -> Result<StageId> {
        if self.sealed {
            return Err(GraphError::InvalidState {
                operation: "create a stage",
                state: "sealed",
            });
        }
        if self.labels.contains_key(label) {
            return Err(GraphError::DuplicateStage(label.to_string()));
        }
        let stage = registry.create(kind, initial)?;
        let id = self.push(label, stage);
        debug!(stage = %id, label, kind, "Created stage");
        Ok(id)
    }

    /// Freeze stage membership. Wiring and parameters stay mutable.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of stages, proxies included.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// All stage ids in creation order, proxies first.
    pub fn stage_ids(&self) -> impl Iterator<Item = StageId> + '_ {
        (0..self.stages.len() as u32).map(StageId)
    }

    fn slot(&self, id: StageId) -> Result<&StageSlot> {
        self.stages
            .get(id.index())
            .ok_or_else(|| GraphError::UnknownStage(id.to_string()))
    }

    pub fn stage(&self, id: StageId) -> Result<&dyn Stage> {
        self.slot(id).map(|s| s.stage.as_ref())
    }

    pub fn stage_mut(&mut self, id: StageId) -> Result<&mut dyn Stage> {
        let slot = self
            .stages
            .get_mut(id.index())
            .ok_or_else(|| GraphError::UnknownStage(id.to_string()))?;
        Ok(slot.stage.as_mut())
    }

    pub fn label(&self, id: StageId) -> Result<&str> {
        self.slot(id).map(|s| s.label.as_str())
    }

    /// Look up a stage by label.
    pub fn id_of(&self, label: &str) -> Result<StageId> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::UnknownStage(label.to_string()))
    }

    pub fn param(&self, id: StageId, name: &str) -> Option<&ParamValue> {
        self.stage(id).ok()?.param(name)
    }

    /// Write one stage parameter directly, bypassing any redirection.
    pub fn set_param(&mut self, id: StageId, name: &str, value: ParamValue) -> Result<()> {
        self.stage_mut(id)?.set_param(name, value)
    }

    fn port_spec(&self, id: StageId, port: &str, direction: PortDirection) -> Result<&PortSpec> {
        let slot = self.slot(id)?;
        slot.stage
            .port(port)
            .filter(|p| p.direction == direction)
            .ok_or_else(|| GraphError::DanglingPort {
                stage: slot.label.clone(),
                port: port.to_string(),
                direction,
            })
    }

    /// Connect `src.src_port` to `dst.dst_port`.
    ///
    /// An existing edge into `dst.dst_port` is replaced and returned. Edges
    /// that would close a cycle are rejected and leave the graph unchanged.
    pub fn connect(
        &mut self,
        src: StageId,
        src_port: &str,
        dst: StageId,
        dst_port: &str,
    ) -> Result<Option<Edge>> {
        self.port_spec(src, src_port, PortDirection::Output)?;
        self.port_spec(dst, dst_port, PortDirection::Input)?;
        if src == dst || self.upstream_of(src).contains(&dst) {
            return Err(GraphError::Cycle { from: src, to: dst });
        }

        let to = PortRef::new(dst, dst_port);
        let from = PortRef::new(src, src_port);
        trace!(%from, %to, "Connecting");
        let replaced = self.edges.insert(to.clone(), from).map(|old| {
            debug!(old = %old, %to, "Replaced incoming edge");
            Edge { from: old, to: to.clone() }
        });
        Ok(replaced)
    }

    /// Like [`connect`](Self::connect), but an occupied input is an error.
    pub fn connect_once(&mut self, src: StageId, src_port: &str, dst: StageId, dst_port: &str) -> Result<()> {
        if self.edges.contains_key(&PortRef::new(dst, dst_port)) {
            return Err(GraphError::AmbiguousReplacement {
                stage: dst,
                port: dst_port.to_string(),
            });
        }
        self.connect(src, src_port, dst, dst_port).map(|_| ())
    }

    /// Connect each stage's `output` to the next stage's `input`, left to right.
    pub fn link_chain(&mut self, chain: &[StageId]) -> Result<()> {
        self.link_chain_with(chain, ports::OUTPUT, ports::INPUT)
    }

    /// [`link_chain`](Self::link_chain) with explicit port names.
    pub fn link_chain_with(&mut self, chain: &[StageId], out_port: &str, in_port: &str) -> Result<()> {
        for pair in chain.windows(2) {
            self.connect(pair[0], out_port, pair[1], in_port)?;
        }
        Ok(())
    }

    /// Remove the edge feeding `dst.dst_port`, if any.
    pub fn disconnect(&mut self, dst: StageId, dst_port: &str) -> Option<Edge> {
        let to = PortRef::new(dst, dst_port);
        self.edges.remove(&to).map(|from| Edge { from, to })
    }

    /// Remove every incoming edge of `id`. Returns how many were removed.
    pub fn clear_inputs_of(&mut self, id: StageId) -> usize {
        let before = self.edges.len();
        self.edges.retain(|to, _| to.stage != id);
        before - self.edges.len()
    }

    /// Remove every edge in the graph.
    pub fn clear_edges(&mut self) {
        self.edges.clear();
    }

    /// All edges, ordered by destination port.
    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|(to, from)| Edge {
                from: from.clone(),
                to: to.clone(),
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The output port feeding `dst.dst_port`.
    pub fn source_of(&self, dst: StageId, dst_port: &str) -> Option<&PortRef> {
        self.edges.get(&PortRef::new(dst, dst_port))
    }

    /// Incoming edges of `id` as `(input port, source)` pairs.
    pub fn inputs_of(&self, id: StageId) -> impl Iterator<Item = (&str, &PortRef)> + '_ {
        self.edges
            .iter()
            .filter(move |(to, _)| to.stage == id)
            .map(|(to, from)| (to.port.as_str(), from))
    }

    /// Stages feeding `id` directly, on any input port.
    pub fn sources_of(&self, id: StageId) -> BTreeSet<StageId> {
        self.inputs_of(id).map(|(_, from)| from.stage).collect()
    }

    /// Every stage `id` transitively reads from, excluding `id` itself.
    pub fn upstream_of(&self, id: StageId) -> BTreeSet<StageId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for source in self.sources_of(current) {
                if seen.insert(source) {
                    stack.push(source);
                }
            }
        }
        seen.remove(&id);
        seen
    }

    /// Follow the primary `input` ports back from `id` to a stage without one.
    ///
    /// The returned path starts at `id` and ends at the origin of the chain.
    pub fn primary_path(&self, id: StageId) -> Vec<StageId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(from) = self.source_of(current, ports::INPUT) {
            if path.contains(&from.stage) {
                break;
            }
            current = from.stage;
            path.push(current);
        }
        path
    }

    /// Required input ports left unconnected on `root` or anything upstream of it.
    pub fn unconnected_inputs(&self, root: StageId) -> Vec<PortRef> {
        let mut relevant = self.upstream_of(root);
        relevant.insert(root);

        let mut missing = Vec::new();
        for id in relevant {
            let Ok(stage) = self.stage(id) else { continue };
            for port in stage.inputs() {
                if port.required && self.source_of(id, &port.name).is_none() {
                    missing.push(PortRef::new(id, port.name.clone()));
                }
            }
        }
        missing
    }

    /// Perform topological sort (Kahn's algorithm).
    /// Returns stages in dependency order, or None if there's a cycle.
    pub fn topological_order(&self) -> Option<Vec<StageId>> {
        let mut in_degree: BTreeMap<StageId, usize> = self.stage_ids().map(|id| (id, 0)).collect();
        let mut dependents: BTreeMap<StageId, Vec<StageId>> = BTreeMap::new();

        for (to, from) in &self.edges {
            *in_degree.entry(to.stage).or_insert(0) += 1;
            dependents.entry(from.stage).or_default().push(to.stage);
        }

        // Lowest id first keeps the order deterministic.
        let mut ready: BTreeSet<StageId> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut result = Vec::with_capacity(self.stages.len());
        while let Some(id) = ready.pop_first() {
            result.push(id);
            for dep in dependents.get(&id).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(dep) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(*dep);
                    }
                }
            }
        }

        (result.len() == in_degree.len()).then_some(result)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<(&str, &str)> = self
            .stages
            .iter()
            .map(|s| (s.label.as_str(), s.stage.kind()))
            .collect();
        f.debug_struct("GraphBuilder")
            .field("stages", &stages)
            .field("edges", &self.edges.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}
