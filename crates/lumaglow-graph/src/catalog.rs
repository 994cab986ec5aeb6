//! Built-in stage kinds.
//!
//! These describe the ports and parameters of the filter stages the
//! colorize-luminance meta-operations are assembled from. They carry no pixel
//! logic of their own.

use lumaglow_core::{ports, Color, ParamDescriptor, ParamValue};

use crate::stage::{PortSpec, StageDescriptor};

/// Stage kind names.
pub mod kinds {
    pub const INPUT_PROXY: &str = "proxy:input";
    pub const OUTPUT_PROXY: &str = "proxy:output";

    pub const SHADOWS_HIGHLIGHTS: &str = "shadows-highlights";
    pub const LEVELS: &str = "levels";
    pub const BLOOM: &str = "bloom";
    pub const LUMINANCE_TO_ALPHA: &str = "luminance-to-alpha";
    pub const COLOR_OVERLAY: &str = "color-overlay";
    pub const GAUSSIAN_BLUR: &str = "gaussian-blur";
    pub const ADD: &str = "add";
    pub const PLUS: &str = "plus";
    pub const OPACITY: &str = "opacity";
    pub const SRC_IN: &str = "src-in";
    pub const INVERT_TRANSPARENCY: &str = "invert-transparency";
}

fn float(name: &str, display: &str, default: f64) -> ParamDescriptor {
    ParamDescriptor::new(name, display, ParamValue::Float(default))
}

/// Boundary stage standing in for the meta-operation's own input.
pub fn input_proxy() -> StageDescriptor {
    StageDescriptor::new(kinds::INPUT_PROXY).port(PortSpec::output(ports::OUTPUT))
}

/// Boundary stage standing in for the meta-operation's own output.
pub fn output_proxy() -> StageDescriptor {
    StageDescriptor::new(kinds::OUTPUT_PROXY).port(PortSpec::input(ports::INPUT))
}

/// Every built-in stage kind, excluding the boundary proxies.
pub fn builtin() -> Vec<StageDescriptor> {
    vec![
        StageDescriptor::filter(kinds::SHADOWS_HIGHLIGHTS)
            .param(float("shadows", "Shadows", 0.0).with_range(-100.0, 100.0))
            .param(float("highlights", "Highlights", 0.0).with_range(-100.0, 100.0))
            .param(float("whitepoint-adjust", "White point adjustment", 0.0).with_range(-10.0, 10.0))
            .param(float("radius", "Radius", 100.0).with_min(0.1))
            .param(float("compress", "Compress", 50.0).with_range(0.0, 100.0)),
        StageDescriptor::filter(kinds::LEVELS)
            .param(float("in-low", "Low input", 0.0))
            .param(float("in-high", "High input", 1.0))
            .param(float("out-low", "Low output", 0.0))
            .param(float("out-high", "High output", 1.0)),
        StageDescriptor::filter(kinds::BLOOM)
            .param(float("threshold", "Threshold", 50.0).with_range(0.0, 100.0))
            .param(float("softness", "Softness", 25.0).with_range(0.0, 100.0))
            .param(float("radius", "Radius", 10.0).with_min(0.0))
            .param(float("strength", "Strength", 50.0).with_min(0.0)),
        StageDescriptor::filter(kinds::LUMINANCE_TO_ALPHA).port(PortSpec::optional_input(ports::AUX)),
        StageDescriptor::filter(kinds::COLOR_OVERLAY)
            .param(ParamDescriptor::new("value", "Color", ParamValue::Color(Color::WHITE)))
            .param(ParamDescriptor::new("srgb", "sRGB", ParamValue::Bool(false))),
        StageDescriptor::filter(kinds::GAUSSIAN_BLUR)
            .param(float("std-dev-x", "Size X", 1.5).with_min(0.0))
            .param(float("std-dev-y", "Size Y", 1.5).with_min(0.0)),
        StageDescriptor::composer(kinds::ADD).param(ParamDescriptor::new("srgb", "sRGB", ParamValue::Bool(false))),
        StageDescriptor::composer(kinds::PLUS).param(ParamDescriptor::new("srgb", "sRGB", ParamValue::Bool(false))),
        StageDescriptor::filter(kinds::OPACITY)
            .port(PortSpec::optional_input(ports::AUX))
            .param(float("value", "Opacity", 1.0).with_range(-10.0, 10.0)),
        StageDescriptor::composer(kinds::SRC_IN),
        StageDescriptor::filter(kinds::INVERT_TRANSPARENCY),
    ]
}
