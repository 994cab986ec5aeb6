//! Shared helpers for the integration tests.

use std::sync::Arc;

use lumaglow_core::{Color, ParamValue, ParamValues, StageId};
use lumaglow_graph::{GraphBuilder, StageRegistry};
use lumaglow_ops::{MetaOperation, VariantSpec};

pub fn registry() -> Arc<StageRegistry> {
    Arc::new(StageRegistry::new())
}

pub fn attached(spec: VariantSpec, initial: &[(&str, ParamValue)]) -> MetaOperation {
    let initial: ParamValues = initial
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    let mut op = MetaOperation::with_params(spec, registry(), &initial).unwrap();
    op.attach().unwrap();
    op
}

pub fn hex(text: &str) -> ParamValue {
    ParamValue::Color(Color::from_hex(text).unwrap())
}

/// Labels along the primary `input` ports from the output proxy back to the origin.
pub fn primary_labels(graph: &GraphBuilder, from: StageId) -> Vec<String> {
    graph
        .primary_path(from)
        .into_iter()
        .map(|id| graph.label(id).unwrap().to_string())
        .collect()
}

/// Labels of every stage upstream of `id`.
pub fn upstream_labels(graph: &GraphBuilder, id: StageId) -> Vec<String> {
    graph
        .upstream_of(id)
        .into_iter()
        .map(|id| graph.label(id).unwrap().to_string())
        .collect()
}

/// The edge set as `(from label.port, to label.port)` pairs.
pub fn wiring(graph: &GraphBuilder) -> Vec<(String, String)> {
    graph
        .edges()
        .into_iter()
        .map(|e| {
            (
                format!("{}.{}", graph.label(e.from.stage).unwrap(), e.from.port),
                format!("{}.{}", graph.label(e.to.stage).unwrap(), e.to.port),
            )
        })
        .collect()
}
