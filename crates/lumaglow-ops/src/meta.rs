//! Meta-operation façade: lifecycle glue around graph, redirector and topology.
//!
//! ```text
//! Uninitialized ──attach──▶ Active ──on_parameter_changed──▶ Active
//!                              │
//!                              └──detach / failed rebuild──▶ Destroyed
//! ```
//!
//! Stage membership is fixed on attach; every later notification only
//! rewires edges and re-applies parameter values.

use std::fmt;
use std::sync::Arc;

use lumaglow_core::{GraphError, ParamValue, ParamValues, Result, StageId};
use lumaglow_graph::{BindingTarget, GraphBuilder, Redirector, StageRegistry};
use tracing::{debug, info, warn};

use crate::snapshot::GraphSnapshot;
use crate::surface::ParamSurface;
use crate::variant::VariantSpec;

/// Lifecycle state of a [`MetaOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Active,
    Destroyed,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages, bindings and the active edge set of one attached instance.
struct InstanceState {
    graph: GraphBuilder,
    redirector: Redirector,
    active_rule: &'static str,
    rebuilds: u64,
}

/// A composite operation exposing a reduced parameter surface over a graph
/// of opaque stages.
///
/// Calls against one instance must be serialized by the caller. Distinct
/// instances share nothing but the read-only registry.
pub struct MetaOperation {
    spec: VariantSpec,
    registry: Arc<StageRegistry>,
    values: ParamValues,
    lifecycle: Lifecycle,
    instance: Option<InstanceState>,
}

impl MetaOperation {
    /// Create an unattached instance with every parameter at its default.
    pub fn new(spec: VariantSpec, registry: Arc<StageRegistry>) -> Self {
        let values = spec.surface.defaults();
        Self {
            spec,
            registry,
            values,
            lifecycle: Lifecycle::Uninitialized,
            instance: None,
        }
    }

    /// Create an unattached instance with some parameters preset.
    pub fn with_params(spec: VariantSpec, registry: Arc<StageRegistry>, initial: &ParamValues) -> Result<Self> {
        let values = spec.surface.resolve(initial)?;
        Ok(Self {
            values,
            ..Self::new(spec, registry)
        })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    pub fn surface(&self) -> &ParamSurface {
        &self.spec.surface
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current meta-parameter values.
    pub fn params(&self) -> &ParamValues {
        &self.values
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    fn invalid(&self, operation: &'static str) -> GraphError {
        GraphError::InvalidState {
            operation,
            state: self.lifecycle.as_str(),
        }
    }

    fn active(&self, operation: &'static str) -> Result<&InstanceState> {
        match (&self.instance, self.lifecycle) {
            (Some(instance), Lifecycle::Active) => Ok(instance),
            _ => Err(self.invalid(operation)),
        }
    }

    /// Create all stages, register bindings, build the first topology and
    /// apply every parameter. On failure the instance stays uninitialized.
    pub fn attach(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(self.invalid("attach"));
        }
        let instance = self.build_instance()?;
        info!(
            op = self.spec.name,
            stages = instance.graph.stage_count(),
            rule = instance.active_rule,
            "Attached meta-operation"
        );
        self.instance = Some(instance);
        self.lifecycle = Lifecycle::Active;
        Ok(())
    }

    fn build_instance(&self) -> Result<InstanceState> {
        let mut graph = GraphBuilder::new();
        for decl in &self.spec.stages {
            graph.create_stage(&self.registry, decl.label, decl.kind, &decl.initial)?;
        }
        graph.seal();

        let mut redirector = Redirector::new();
        for binding in &self.spec.bindings {
            let targets = binding
                .targets
                .iter()
                .map(|(label, param)| -> Result<BindingTarget> { Ok(BindingTarget::new(graph.id_of(label)?, *param)) })
                .collect::<Result<Vec<_>>>()?;
            redirector.bind(&graph, binding.meta, &targets)?;
        }
        redirector.validate_surface(&graph, self.spec.surface.descriptors(), &self.spec.mode_only)?;
        redirector.seal();

        self.spec.topology.validate()?;
        let (rule, plan) = self.spec.topology.select(&self.values)?;
        graph.install(&plan)?;
        redirector.apply_all(&mut graph, &self.values)?;

        Ok(InstanceState {
            graph,
            redirector,
            active_rule: rule.name,
            rebuilds: 1,
        })
    }

    /// Handle one external parameter change.
    ///
    /// The value is checked against the surface first; a rejected value
    /// changes nothing. Topology-affecting parameters trigger a full rebuild,
    /// then every parameter is re-applied. A failure past validation leaves
    /// the graph undefined, so the instance is torn down and the error
    /// returned.
    pub fn on_parameter_changed(&mut self, name: &str, value: ParamValue) -> Result<()> {
        self.active("change a parameter")?;
        let value = self.spec.surface.coerce(name, value)?;
        debug!(op = self.spec.name, param = name, %value, "Parameter changed");
        self.values.insert(name.to_string(), value);

        if let Err(err) = self.update(name) {
            warn!(op = self.spec.name, error = %err, "Update failed, tearing down instance");
            self.teardown();
            return Err(err);
        }
        Ok(())
    }

    /// Apply several changes, one notification each.
    pub fn set_params(&mut self, changes: &ParamValues) -> Result<()> {
        for (name, value) in changes {
            self.on_parameter_changed(name, value.clone())?;
        }
        Ok(())
    }

    fn update(&mut self, changed: &str) -> Result<()> {
        let spec = &self.spec;
        let instance = self
            .instance
            .as_mut()
            .ok_or(GraphError::InvalidState {
                operation: "update",
                state: "detached",
            })?;

        // Every change to a trigger reinstalls, even when the selected rule stays the same.
        if spec.topology.is_trigger(changed) {
            let (rule, plan) = spec.topology.select(&self.values)?;
            instance.graph.install(&plan)?;
            debug!(op = spec.name, from = instance.active_rule, to = rule.name, "Rebuilt topology");
            instance.active_rule = rule.name;
            instance.rebuilds += 1;
        }

        instance.redirector.apply_all(&mut instance.graph, &self.values)?;
        Ok(())
    }

    /// Release every stage. No further calls are accepted.
    pub fn detach(&mut self) -> Result<()> {
        self.active("detach")?;
        self.teardown();
        info!(op = self.spec.name, "Detached meta-operation");
        Ok(())
    }

    fn teardown(&mut self) {
        self.instance = None;
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// The attached graph, for the execution engine to read.
    pub fn graph(&self) -> Result<&GraphBuilder> {
        self.active("read the graph").map(|i| &i.graph)
    }

    pub fn redirector(&self) -> Result<&Redirector> {
        self.active("read the bindings").map(|i| &i.redirector)
    }

    /// Id of the stage declared under `label`.
    pub fn stage_id(&self, label: &str) -> Result<StageId> {
        self.graph()?.id_of(label)
    }

    /// Name of the topology rule currently installed.
    pub fn active_rule(&self) -> Option<&'static str> {
        self.active("read the topology").ok().map(|i| i.active_rule)
    }

    /// How many times a topology has been installed, the first build included.
    pub fn rebuild_count(&self) -> u64 {
        self.instance.as_ref().map_or(0, |i| i.rebuilds)
    }

    /// Read-only view of the current graph.
    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        let instance = self.active("snapshot")?;
        GraphSnapshot::capture(self.spec.name, instance.active_rule, &self.values, &instance.graph)
    }
}

impl fmt::Debug for MetaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaOperation")
            .field("name", &self.spec.name)
            .field("lifecycle", &self.lifecycle)
            .field("values", &self.values)
            .finish()
    }
}
