//! Lumaglow Graph - Stage graph composition
//!
//! Builds and rewires the processing graph behind a meta-operation:
//! - [`StageRegistry`] creates opaque stages by kind name
//! - [`GraphBuilder`] owns the stages and the edges between their ports
//! - [`Redirector`] fans exposed parameters out to stage parameters
//! - [`TopologyTable`] picks the active edge set from the parameter values
//!
//! Nothing here computes pixels; the finished graph is handed to an
//! execution engine.

pub mod builder;
pub mod catalog;
pub mod redirect;
pub mod registry;
pub mod stage;
pub mod topology;

pub use builder::{Edge, GraphBuilder, PortRef, INPUT_LABEL, OUTPUT_LABEL};
pub use redirect::{BindingTarget, Redirector};
pub use registry::{DescriptorFactory, StageFactory, StageRegistry};
pub use stage::{OpaqueStage, PortSpec, Stage, StageDescriptor};
pub use topology::{Instruction, TopologyPlan, TopologyRule, TopologyTable};
