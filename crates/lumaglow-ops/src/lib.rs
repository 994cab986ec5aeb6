//! Lumaglow Ops - Meta-operations assembled from opaque filter stages
//!
//! A meta-operation exposes a handful of parameters, forwards them to the
//! real parameters of its internal stages and rewires those stages when a
//! mode flag changes.

pub mod colorize;
pub mod meta;
pub mod snapshot;
pub mod surface;
pub mod variant;

pub use meta::{Lifecycle, MetaOperation};
pub use snapshot::{EdgeSnapshot, GraphSnapshot, StageSnapshot};
pub use surface::ParamSurface;
pub use variant::{BindingDecl, StageDecl, VariantSpec};

/// Look up a built-in variant by name.
pub fn variant(name: &str) -> Option<VariantSpec> {
    colorize::by_name(name)
}

/// Every built-in variant.
pub fn variants() -> Vec<VariantSpec> {
    colorize::all()
}
