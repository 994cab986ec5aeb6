//! Parameter redirection: one exposed parameter fanning out to stage parameters.

use std::collections::{BTreeMap, BTreeSet};

use lumaglow_core::{GraphError, ParamDescriptor, ParamValue, ParamValues, Result, StageId};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::builder::GraphBuilder;

/// One stage parameter a meta parameter writes into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingTarget {
    pub stage: StageId,
    pub param: String,
}

impl BindingTarget {
    pub fn new(stage: StageId, param: impl Into<String>) -> Self {
        Self {
            stage,
            param: param.into(),
        }
    }
}

type Targets = SmallVec<[BindingTarget; 2]>;

/// Maps meta-parameter names to ordered lists of stage parameters.
///
/// Stages do not remember who wrote into them, so every bound value has to be
/// re-applied on each update cycle.
#[derive(Debug, Default)]
pub struct Redirector {
    bindings: BTreeMap<String, Targets>,
    sealed: bool,
}

impl Redirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `meta` to `targets`, appending to any earlier bindings of `meta`.
    ///
    /// Every target must name an existing parameter on an existing stage.
    /// Repeating a target already bound to `meta` is a no-op.
    pub fn bind(&mut self, graph: &GraphBuilder, meta: &str, targets: &[BindingTarget]) -> Result<()> {
        if self.sealed {
            return Err(GraphError::InvalidState {
                operation: "bind a parameter",
                state: "sealed",
            });
        }
        for target in targets {
            let stage = graph.stage(target.stage)?;
            if stage.param_descriptor(&target.param).is_none() {
                return Err(GraphError::UnknownParameter {
                    stage: graph.label(target.stage)?.to_string(),
                    param: target.param.clone(),
                });
            }
        }

        let entry = self.bindings.entry(meta.to_string()).or_default();
        for target in targets {
            if !entry.contains(target) {
                debug!(meta, stage = %target.stage, param = %target.param, "Bound parameter");
                entry.push(target.clone());
            }
        }
        Ok(())
    }

    /// Refuse further bindings.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn targets(&self, meta: &str) -> &[BindingTarget] {
        self.bindings.get(meta).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn is_bound(&self, meta: &str) -> bool {
        !self.targets(meta).is_empty()
    }

    /// Bound meta-parameter names, in name order.
    pub fn bound_params(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Write `value` into every target bound to `meta`.
    ///
    /// All targets are checked before any is written, so a failure leaves
    /// every target untouched. Returns how many targets actually changed.
    /// Unbound names are not an error and change nothing.
    pub fn apply(&self, graph: &mut GraphBuilder, meta: &str, value: &ParamValue) -> Result<usize> {
        let targets = self.targets(meta);
        for target in targets {
            check_target(graph, meta, target, value)?;
        }
        write_targets(graph, targets, value)
    }

    /// [`apply`](Self::apply) for every entry of `values`, checking all
    /// bindings up front so the cycle is all-or-nothing.
    pub fn apply_all(&self, graph: &mut GraphBuilder, values: &ParamValues) -> Result<usize> {
        for (meta, value) in values {
            for target in self.targets(meta) {
                check_target(graph, meta, target, value)?;
            }
        }
        let mut changed = 0;
        for (meta, value) in values {
            changed += write_targets(graph, self.targets(meta), value)?;
        }
        trace!(changed, "Applied redirections");
        Ok(changed)
    }

    /// Check the binding table against a declared parameter surface.
    ///
    /// Every declared parameter must either be bound or listed in `mode_only`;
    /// mode-only parameters must stay unbound; nothing undeclared may be bound;
    /// every target must accept the declared parameter's kind.
    pub fn validate_surface(
        &self,
        graph: &GraphBuilder,
        surface: &[ParamDescriptor],
        mode_only: &[&str],
    ) -> Result<()> {
        let declared: BTreeSet<&str> = surface.iter().map(|d| d.name.as_str()).collect();
        if let Some(stray) = self.bound_params().find(|name| !declared.contains(name)) {
            return Err(GraphError::InvalidBinding(format!("{stray:?} is bound but not declared")));
        }

        for descriptor in surface {
            let name = descriptor.name.as_str();
            let is_mode = mode_only.contains(&name);
            match (is_mode, self.is_bound(name)) {
                (true, true) => {
                    return Err(GraphError::InvalidBinding(format!(
                        "mode-only parameter {name:?} must not be forwarded to a stage"
                    )))
                }
                (false, false) => {
                    return Err(GraphError::InvalidBinding(format!(
                        "{name:?} has no binding and is not mode-only"
                    )))
                }
                _ => {}
            }
            for target in self.targets(name) {
                check_target(graph, name, target, &descriptor.default)?;
                let bound = target_descriptor(graph, target)?;
                if !bound.covers(descriptor) {
                    return Err(GraphError::InvalidBinding(format!(
                        "{name:?} ranges wider than {}.{}",
                        graph.label(target.stage)?,
                        target.param
                    )));
                }
            }
        }
        Ok(())
    }
}

fn target_descriptor<'g>(graph: &'g GraphBuilder, target: &BindingTarget) -> Result<&'g ParamDescriptor> {
    let stage = graph.stage(target.stage)?;
    stage
        .param_descriptor(&target.param)
        .ok_or_else(|| GraphError::UnknownParameter {
            stage: stage.kind().to_string(),
            param: target.param.clone(),
        })
}

/// The target must take `value` as is: right kind, and no clamping.
fn check_target(graph: &GraphBuilder, meta: &str, target: &BindingTarget, value: &ParamValue) -> Result<()> {
    let descriptor = target_descriptor(graph, target)?;
    if !descriptor.kind().accepts(value.kind()) {
        return Err(GraphError::ParamType {
            name: meta.to_string(),
            expected: descriptor.kind(),
            got: value.kind(),
        });
    }
    if let Some(v) = value.as_f64() {
        if !v.is_finite() || !descriptor.in_range(v) {
            return Err(GraphError::OutOfRange {
                name: format!("{}.{}", graph.label(target.stage)?, target.param),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn write_targets(graph: &mut GraphBuilder, targets: &[BindingTarget], value: &ParamValue) -> Result<usize> {
    let mut changed = 0;
    for target in targets {
        if graph.param(target.stage, &target.param) == Some(value) {
            continue;
        }
        graph.set_param(target.stage, &target.param, value.clone())?;
        changed += 1;
    }
    Ok(changed)
}
