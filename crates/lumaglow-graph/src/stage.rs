//! Stage handles: opaque units with named ports and named parameters.
//!
//! The engine never looks inside a stage. All it needs is the port layout
//! (for wiring) and typed parameter storage (for redirection). Pixel work is
//! done by whatever execution engine consumes the finished graph.

use std::fmt;
use std::sync::Arc;

use lumaglow_core::{ports, GraphError, ParamDescriptor, ParamValue, ParamValues, PortDirection, Result};
use serde::{Deserialize, Serialize};

/// One named connection point on a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub direction: PortDirection,
    /// Input ports only: must be connected whenever the stage feeds the output.
    pub required: bool,
}

impl PortSpec {
    /// A required input port.
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            required: true,
        }
    }

    /// An auxiliary input that may be left unconnected.
    pub fn optional_input(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::input(name)
        }
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            required: false,
        }
    }
}

/// Static description of a stage kind: its ports and declared parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub kind: String,
    pub ports: Vec<PortSpec>,
    pub params: Vec<ParamDescriptor>,
}

impl StageDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ports: Vec::new(),
            params: Vec::new(),
        }
    }

    /// `input` and `output` ports, the shape of a plain filter.
    pub fn filter(kind: impl Into<String>) -> Self {
        Self::new(kind)
            .port(PortSpec::input(ports::INPUT))
            .port(PortSpec::output(ports::OUTPUT))
    }

    /// `input`, `aux` and `output` ports, the shape of a compositor.
    pub fn composer(kind: impl Into<String>) -> Self {
        Self::filter(kind).port(PortSpec::input(ports::AUX))
    }

    pub fn port(mut self, port: PortSpec) -> Self {
        self.ports.push(port);
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }
}

/// An instantiated stage.
///
/// Implementations must keep the port set fixed for their whole lifetime;
/// only parameter values change.
pub trait Stage: Send + Sync + fmt::Debug {
    /// Stage kind name as known to the registry.
    fn kind(&self) -> &str;

    /// All ports, inputs and outputs.
    fn ports(&self) -> &[PortSpec];

    /// Declared parameters.
    fn param_descriptors(&self) -> &[ParamDescriptor];

    /// Current value of a parameter.
    fn param(&self, name: &str) -> Option<&ParamValue>;

    /// Store a parameter value. Unknown names and mismatched kinds are errors.
    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()>;

    /// Snapshot of every parameter value.
    fn params(&self) -> ParamValues;

    fn port(&self, name: &str) -> Option<&PortSpec> {
        self.ports().iter().find(|p| p.name == name)
    }

    fn param_descriptor(&self, name: &str) -> Option<&ParamDescriptor> {
        self.param_descriptors().iter().find(|p| p.name == name)
    }

    /// Input ports, in declaration order.
    fn inputs(&self) -> Vec<&PortSpec> {
        self.ports()
            .iter()
            .filter(|p| p.direction == PortDirection::Input)
            .collect()
    }
}

/// Descriptor-driven stage: holds parameter values and nothing else.
#[derive(Debug, Clone)]
pub struct OpaqueStage {
    descriptor: Arc<StageDescriptor>,
    values: ParamValues,
}

impl OpaqueStage {
    /// Instantiate with every parameter at its default.
    pub fn with_defaults(descriptor: Arc<StageDescriptor>) -> Self {
        let values = descriptor
            .params
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();
        Self { descriptor, values }
    }

    /// Instantiate with descriptor defaults, then overlay `initial`.
    pub fn new(descriptor: Arc<StageDescriptor>, initial: &ParamValues) -> Result<Self> {
        let mut stage = Self::with_defaults(descriptor);
        for (name, value) in initial {
            stage.set_param(name, value.clone())?;
        }
        Ok(stage)
    }

    pub fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }
}

impl Stage for OpaqueStage {
    fn kind(&self) -> &str {
        &self.descriptor.kind
    }

    fn ports(&self) -> &[PortSpec] {
        &self.descriptor.ports
    }

    fn param_descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptor.params
    }

    fn param(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let descriptor = self
            .descriptor
            .params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| GraphError::UnknownParameter {
                stage: self.descriptor.kind.clone(),
                param: name.to_string(),
            })?;
        let value = descriptor.coerce(value)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn params(&self) -> ParamValues {
        self.values.clone()
    }
}
