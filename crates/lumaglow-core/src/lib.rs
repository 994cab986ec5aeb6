//! Lumaglow Core - Foundation types for stage graph composition
//!
//! This crate provides the value types shared by every other Lumaglow crate:
//! - Stage identifiers and port directions
//! - Parameter values, kinds and descriptors
//! - Colors with hex notation
//! - The error taxonomy

pub mod color;
pub mod error;
pub mod ids;
pub mod param;

pub use color::Color;
pub use error::{GraphError, Result};
pub use ids::{PortDirection, StageId};
pub use param::{ParamDescriptor, ParamKind, ParamValue, ParamValues};

/// Default port names used by chain linking and boundary proxies.
pub mod ports {
    /// Primary data input of a stage.
    pub const INPUT: &str = "input";

    /// Auxiliary input (compositing layer, mask, luminance source).
    pub const AUX: &str = "aux";

    /// Primary data output of a stage.
    pub const OUTPUT: &str = "output";
}
