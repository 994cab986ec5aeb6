//! Topology selection: which edge set is active for the current parameters.
//!
//! A [`TopologyTable`] is an ordered list of rules. Each rule pairs a
//! condition over the meta-parameter values with a function producing a
//! [`TopologyPlan`], an ordered list of wiring instructions over stage labels.
//! The first rule whose condition holds wins; the table ends in exactly one
//! unconditional fallback.

use std::collections::BTreeSet;

use lumaglow_core::{ports, GraphError, ParamValues, Result, StageId};
use tracing::{debug, warn};

use crate::builder::{GraphBuilder, INPUT_LABEL, OUTPUT_LABEL};

/// One wiring instruction. Stages are named by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Link `output` to `input` along the sequence, first to last.
    Chain(Vec<String>),
    /// Connect one output port to one input port.
    Connect {
        from: String,
        from_port: String,
        to: String,
        to_port: String,
    },
}

/// An ordered edge-set description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyPlan {
    instructions: Vec<Instruction>,
}

impl TopologyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chain over `labels`.
    pub fn chain<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions
            .push(Instruction::Chain(labels.into_iter().map(Into::into).collect()));
        self
    }

    /// Append a connection from `from`'s `output` port to `to.to_port`.
    pub fn connect(self, from: &str, to: &str, to_port: &str) -> Self {
        self.connect_ports(from, ports::OUTPUT, to, to_port)
    }

    pub fn connect_ports(mut self, from: &str, from_port: &str, to: &str, to_port: &str) -> Self {
        self.instructions.push(Instruction::Connect {
            from: from.to_string(),
            from_port: from_port.to_string(),
            to: to.to_string(),
            to_port: to_port.to_string(),
        });
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Every label mentioned by the plan, proxies included.
    pub fn participants(&self) -> BTreeSet<&str> {
        let mut labels = BTreeSet::new();
        for instruction in &self.instructions {
            match instruction {
                Instruction::Chain(chain) => labels.extend(chain.iter().map(String::as_str)),
                Instruction::Connect { from, to, .. } => {
                    labels.insert(from.as_str());
                    labels.insert(to.as_str());
                }
            }
        }
        labels
    }
}

/// Decides whether a rule applies to the current parameter values.
pub type Condition = fn(&ParamValues) -> bool;

/// Produces the plan for a rule.
pub type PlanFn = fn(&ParamValues) -> TopologyPlan;

/// One row of a [`TopologyTable`].
#[derive(Debug, Clone)]
pub struct TopologyRule {
    pub name: &'static str,
    /// `None` marks the fallback rule.
    pub condition: Option<Condition>,
    pub build: PlanFn,
}

impl TopologyRule {
    fn matches(&self, values: &ParamValues) -> bool {
        self.condition.map_or(true, |cond| cond(values))
    }
}

/// Declarative mapping from parameter conditions to edge-set builders.
#[derive(Debug, Clone, Default)]
pub struct TopologyTable {
    rules: Vec<TopologyRule>,
    triggers: Vec<String>,
}

impl TopologyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a conditional rule. Rules are tried in insertion order.
    pub fn rule(mut self, name: &'static str, condition: Condition, build: PlanFn) -> Self {
        self.rules.push(TopologyRule {
            name,
            condition: Some(condition),
            build,
        });
        self
    }

    /// Add the unconditional rule used when nothing else matches.
    pub fn fallback(mut self, name: &'static str, build: PlanFn) -> Self {
        self.rules.push(TopologyRule {
            name,
            condition: None,
            build,
        });
        self
    }

    /// Declare a meta parameter whose changes require a rebuild.
    pub fn trigger(mut self, param: impl Into<String>) -> Self {
        self.triggers.push(param.into());
        self
    }

    pub fn rules(&self) -> &[TopologyRule] {
        &self.rules
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Whether a change to `param` affects which stages participate.
    pub fn is_trigger(&self, param: &str) -> bool {
        self.triggers.iter().any(|t| t == param)
    }

    /// The table must end in exactly one fallback rule.
    pub fn validate(&self) -> Result<()> {
        let fallbacks = self.rules.iter().filter(|r| r.condition.is_none()).count();
        let last_is_fallback = self.rules.last().is_some_and(|r| r.condition.is_none());
        if fallbacks != 1 || !last_is_fallback {
            return Err(GraphError::InvalidBinding(format!(
                "topology table needs exactly one trailing fallback rule, found {fallbacks}"
            )));
        }
        Ok(())
    }

    /// Pick the first matching rule and build its plan. Pure.
    pub fn select(&self, values: &ParamValues) -> Result<(&TopologyRule, TopologyPlan)> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.matches(values))
            .ok_or_else(|| GraphError::InvalidBinding("no topology rule matches".into()))?;
        Ok((rule, (rule.build)(values)))
    }
}

impl GraphBuilder {
    /// Replace the whole edge set with the one described by `plan`.
    ///
    /// Every stage's inputs are cleared first, so stages the plan leaves out
    /// end up with no incoming edges. After wiring, every required input
    /// upstream of the output proxy must be connected. On any failure the
    /// previous edge set is restored and the error returned.
    pub fn install(&mut self, plan: &TopologyPlan) -> Result<()> {
        let previous = self.edges.clone();
        match self.install_unchecked(plan) {
            Ok(()) => {
                debug!(edges = self.edge_count(), "Installed topology");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Topology install failed, restoring previous edges");
                self.edges = previous;
                Err(err)
            }
        }
    }

    fn install_unchecked(&mut self, plan: &TopologyPlan) -> Result<()> {
        let ids: Vec<StageId> = self.stage_ids().collect();
        for id in ids {
            self.clear_inputs_of(id);
        }

        for instruction in plan.instructions() {
            match instruction {
                Instruction::Chain(labels) => {
                    let chain = labels
                        .iter()
                        .map(|label| self.id_of(label))
                        .collect::<Result<Vec<_>>>()?;
                    self.link_chain(&chain)?;
                }
                Instruction::Connect {
                    from,
                    from_port,
                    to,
                    to_port,
                } => {
                    let (src, dst) = (self.id_of(from)?, self.id_of(to)?);
                    self.connect(src, from_port, dst, to_port)?;
                }
            }
        }

        if self.source_of(StageId::OUTPUT, ports::INPUT).is_none() {
            return Err(GraphError::UnconnectedInput {
                stage: OUTPUT_LABEL.to_string(),
                port: ports::INPUT.to_string(),
            });
        }
        if let Some(missing) = self.unconnected_inputs(StageId::OUTPUT).into_iter().next() {
            return Err(GraphError::UnconnectedInput {
                stage: self.label(missing.stage)?.to_string(),
                port: missing.port,
            });
        }
        Ok(())
    }
}

/// Plan for the straight chain `input → stages… → output`.
pub fn straight(stages: &[&str]) -> TopologyPlan {
    let mut chain = vec![INPUT_LABEL];
    chain.extend_from_slice(stages);
    chain.push(OUTPUT_LABEL);
    TopologyPlan::new().chain(chain)
}
