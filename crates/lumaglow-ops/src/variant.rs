//! Meta-operation variants described as data.

use lumaglow_core::{ParamValue, ParamValues};
use lumaglow_graph::TopologyTable;

use crate::surface::ParamSurface;

/// One stage a variant instantiates on attach.
#[derive(Debug, Clone)]
pub struct StageDecl {
    pub label: &'static str,
    pub kind: &'static str,
    pub initial: ParamValues,
}

impl StageDecl {
    pub fn new(label: &'static str, kind: &'static str) -> Self {
        Self {
            label,
            kind,
            initial: ParamValues::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.initial.insert(name.to_string(), value.into());
        self
    }
}

/// A meta parameter and the `(stage label, stage parameter)` pairs it drives.
#[derive(Debug, Clone)]
pub struct BindingDecl {
    pub meta: &'static str,
    pub targets: Vec<(&'static str, &'static str)>,
}

impl BindingDecl {
    pub fn new(meta: &'static str, targets: &[(&'static str, &'static str)]) -> Self {
        Self {
            meta,
            targets: targets.to_vec(),
        }
    }
}

/// Everything needed to attach one kind of meta-operation.
#[derive(Debug, Clone)]
pub struct VariantSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub surface: ParamSurface,
    pub stages: Vec<StageDecl>,
    pub bindings: Vec<BindingDecl>,
    /// Parameters consulted only by the topology table.
    pub mode_only: Vec<&'static str>,
    pub topology: TopologyTable,
}
