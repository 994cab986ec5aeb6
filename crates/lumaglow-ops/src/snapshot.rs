//! Read-only, serializable views of an attached graph.

use lumaglow_core::{GraphError, ParamValues, Result, StageId};
use lumaglow_graph::GraphBuilder;
use serde::Serialize;

/// One stage as seen by the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub id: StageId,
    pub label: String,
    pub kind: String,
    pub params: ParamValues,
    /// Not upstream of the output proxy under the current topology.
    pub dormant: bool,
}

/// One edge, written as `label.port` on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSnapshot {
    pub from: String,
    pub to: String,
}

/// The whole graph of a meta-operation at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub operation: String,
    pub rule: String,
    pub params: ParamValues,
    pub stages: Vec<StageSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    /// Stage labels in execution order.
    pub order: Vec<String>,
}

impl GraphSnapshot {
    pub fn capture(operation: &str, rule: &str, params: &ParamValues, graph: &GraphBuilder) -> Result<Self> {
        let live = graph.upstream_of(StageId::OUTPUT);

        let mut stages = Vec::with_capacity(graph.stage_count());
        for id in graph.stage_ids() {
            let stage = graph.stage(id)?;
            stages.push(StageSnapshot {
                id,
                label: graph.label(id)?.to_string(),
                kind: stage.kind().to_string(),
                params: stage.params(),
                dormant: !id.is_proxy() && !live.contains(&id),
            });
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges() {
            edges.push(EdgeSnapshot {
                from: format!("{}.{}", graph.label(edge.from.stage)?, edge.from.port),
                to: format!("{}.{}", graph.label(edge.to.stage)?, edge.to.port),
            });
        }

        let order = graph
            .topological_order()
            .ok_or_else(|| GraphError::Serialization("graph contains a cycle".into()))?
            .into_iter()
            .map(|id| graph.label(id).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            operation: operation.to_string(),
            rule: rule.to_string(),
            params: params.clone(),
            stages,
            edges,
            order,
        })
    }

    /// Labels of stages the current topology leaves unfed.
    pub fn dormant(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.dormant)
            .map(|s| s.label.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::Serialization(format!("Failed to serialize graph: {}", e)))
    }
}
