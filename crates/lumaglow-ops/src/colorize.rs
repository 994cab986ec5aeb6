//! Colorize-luminance meta-operations.
//!
//! Extracts the brightest parts of the input, recolors them and blurs them
//! into a glow. All four variants share the primary chain
//!
//! ```text
//! input → shadow → levels → bloom → lumen → overlay → blur → output
//!                             └→ tint ─(aux)─┘
//! ```
//!
//! where `tint` is a second color overlay supplying the luminance stage's
//! auxiliary input. The variants with an `easy_mode` flag switch to a blend
//! chain that composites the glow over the untouched input.

use lumaglow_core::{ports, Color, ParamDescriptor, ParamValue, ParamValues};
use lumaglow_graph::catalog::kinds;
use lumaglow_graph::topology::straight;
use lumaglow_graph::{TopologyPlan, TopologyTable, INPUT_LABEL, OUTPUT_LABEL};

use crate::surface::ParamSurface;
use crate::variant::{BindingDecl, StageDecl, VariantSpec};

/// Stage labels.
pub mod labels {
    pub const SHADOW: &str = "shadow";
    pub const LEVELS: &str = "levels";
    pub const BLOOM: &str = "bloom";
    pub const LUMEN: &str = "lumen";
    pub const TINT: &str = "tint";
    pub const OVERLAY: &str = "overlay";
    pub const BLUR: &str = "blur";
    pub const ADD: &str = "add";
    pub const PLUS: &str = "plus";
    pub const OPACITY: &str = "opacity";
    pub const MASK: &str = "mask";
}

/// Meta parameter names.
pub mod params {
    pub const EASY_MODE: &str = "easy_mode";
    pub const SHADOW: &str = "shadow";
    pub const STRENGTH: &str = "strength";
    pub const LEVELS: &str = "levels";
    pub const GAUSSIAN: &str = "gaussian";
    pub const VALUE: &str = "value";
}

/// Topology rule names.
pub mod rules {
    pub const PRIMARY: &str = "primary";
    pub const BLEND: &str = "blend";
}

use labels::*;

/// Primary chain stages in processing order.
pub const PRIMARY_CHAIN: [&str; 6] = [SHADOW, LEVELS, BLOOM, LUMEN, OVERLAY, BLUR];

pub const DEFAULT_COLOR: &str = "#ff9dff";

fn default_color() -> Color {
    Color::from_rgba8(0xff, 0x9d, 0xff, 0xff)
}

// ── Parameter surfaces ─────────────────────────────────────────

struct Ranges {
    shadow_default: f64,
    strength_max: Option<f64>,
    levels_default: f64,
    levels_range: (f64, f64),
}

fn surface(ranges: Ranges, easy_mode: bool) -> ParamSurface {
    let mut descriptors = Vec::new();
    if easy_mode {
        descriptors.push(
            ParamDescriptor::new(params::EASY_MODE, "Auto blend with Add", ParamValue::Bool(false))
                .with_description("Composite the glow over the input instead of returning it alone"),
        );
    }

    let strength = ParamDescriptor::new(params::STRENGTH, "Glow strength", ParamValue::Float(55.0))
        .with_description("Bloom's glow strength");
    let strength = match ranges.strength_max {
        Some(max) => strength.with_range(0.0, max),
        None => strength.with_min(0.0),
    };

    descriptors.extend([
        ParamDescriptor::new(params::SHADOW, "Adjust exposure of highlights", ParamValue::Float(ranges.shadow_default))
            .with_range(-100.0, 0.0),
        strength,
        ParamDescriptor::new(params::LEVELS, "Control light", ParamValue::Float(ranges.levels_default))
            .with_description("Higher values dampen the light, lower values intensify it")
            .with_range(ranges.levels_range.0, ranges.levels_range.1),
        ParamDescriptor::new(params::GAUSSIAN, "Gaussian blur for glow", ParamValue::Float(6.0))
            .with_description("Blur that applies to the whole filter")
            .with_range(0.0, 95.0),
        ParamDescriptor::new(params::VALUE, "Color", ParamValue::Color(default_color()))
            .with_description("The color to paint over the extracted luminance"),
    ]);
    ParamSurface::new(descriptors)
}

// ── Stages and bindings ────────────────────────────────────────

fn primary_stages() -> Vec<StageDecl> {
    vec![
        StageDecl::new(SHADOW, kinds::SHADOWS_HIGHLIGHTS),
        StageDecl::new(LEVELS, kinds::LEVELS),
        StageDecl::new(BLOOM, kinds::BLOOM),
        StageDecl::new(LUMEN, kinds::LUMINANCE_TO_ALPHA),
        StageDecl::new(TINT, kinds::COLOR_OVERLAY),
        StageDecl::new(OVERLAY, kinds::COLOR_OVERLAY),
        StageDecl::new(BLUR, kinds::GAUSSIAN_BLUR),
    ]
}

fn bindings() -> Vec<BindingDecl> {
    vec![
        BindingDecl::new(params::SHADOW, &[(SHADOW, "highlights")]),
        BindingDecl::new(params::STRENGTH, &[(BLOOM, "strength")]),
        BindingDecl::new(params::LEVELS, &[(LEVELS, "in-high")]),
        BindingDecl::new(params::GAUSSIAN, &[(BLUR, "std-dev-x"), (BLUR, "std-dev-y")]),
        BindingDecl::new(params::VALUE, &[(OVERLAY, "value"), (TINT, "value")]),
    ]
}

// ── Topologies ─────────────────────────────────────────────────

fn easy_mode(values: &ParamValues) -> bool {
    values
        .get(params::EASY_MODE)
        .and_then(ParamValue::as_bool)
        .unwrap_or(false)
}

fn with_tint(plan: TopologyPlan) -> TopologyPlan {
    plan.connect(BLOOM, TINT, ports::INPUT)
        .connect(TINT, LUMEN, ports::AUX)
}

/// `input → … → blur → output`.
fn primary(_: &ParamValues) -> TopologyPlan {
    with_tint(straight(&PRIMARY_CHAIN))
}

/// The primary chain, then `input → add → opacity → output` with the blurred
/// glow on `add.aux`. The second chain supersedes the primary chain's edge
/// into the output.
fn blend_add_opacity(values: &ParamValues) -> TopologyPlan {
    primary(values)
        .chain([INPUT_LABEL, ADD, OPACITY, OUTPUT_LABEL])
        .connect(BLUR, ADD, ports::AUX)
}

/// Like [`blend_add_opacity`] without the opacity stage.
fn blend_add(values: &ParamValues) -> TopologyPlan {
    primary(values)
        .chain([INPUT_LABEL, ADD, OUTPUT_LABEL])
        .connect(BLUR, ADD, ports::AUX)
}

/// The glow is taken before the blur, faded, masked to the input's alpha and
/// added with `plus`. The blur stage is left dormant.
fn blend_plus_masked(_: &ParamValues) -> TopologyPlan {
    let mut glow = vec![INPUT_LABEL];
    glow.extend_from_slice(&PRIMARY_CHAIN[..PRIMARY_CHAIN.len() - 1]);
    glow.extend([OPACITY, MASK]);

    with_tint(TopologyPlan::new().chain(glow))
        .connect(INPUT_LABEL, MASK, ports::AUX)
        .chain([INPUT_LABEL, PLUS, OUTPUT_LABEL])
        .connect(MASK, PLUS, ports::AUX)
}

fn switchable(blend: fn(&ParamValues) -> TopologyPlan) -> TopologyTable {
    TopologyTable::new()
        .rule(rules::BLEND, easy_mode, blend)
        .fallback(rules::PRIMARY, primary)
        .trigger(params::EASY_MODE)
}

// ── Variants ───────────────────────────────────────────────────

/// Primary chain only; no mode flag.
pub fn colorize_luminance() -> VariantSpec {
    VariantSpec {
        name: "colorize-luminance",
        title: "Extract and Recolor Luminance",
        description: "Extracts the brightest pixels, recolors and blurs them into a glow",
        surface: surface(
            Ranges {
                shadow_default: 0.0,
                strength_max: None,
                levels_default: 1.0,
                levels_range: (0.1, 2.0),
            },
            false,
        ),
        stages: primary_stages(),
        bindings: bindings(),
        mode_only: Vec::new(),
        topology: TopologyTable::new().fallback(rules::PRIMARY, primary),
    }
}

/// Easy mode blends the blurred glow over the input with `add` at 75% opacity.
pub fn colorize_luminance_easy() -> VariantSpec {
    let mut stages = primary_stages();
    stages.push(StageDecl::new(ADD, kinds::ADD));
    stages.push(StageDecl::new(OPACITY, kinds::OPACITY).with("value", 0.75));

    VariantSpec {
        name: "colorize-luminance-easy",
        title: "Extract and Recolor Luma",
        description: "Glow extraction with an optional built-in Add blend",
        surface: surface(
            Ranges {
                shadow_default: -100.0,
                strength_max: Some(1000.0),
                levels_default: 0.5,
                levels_range: (0.1, 1.0),
            },
            true,
        ),
        stages,
        bindings: bindings(),
        mode_only: vec![params::EASY_MODE],
        topology: switchable(blend_add_opacity),
    }
}

/// Easy mode adds the unblurred glow, faded and masked to the input's alpha.
pub fn colorize_luminance_plus() -> VariantSpec {
    let mut stages = primary_stages();
    stages.push(StageDecl::new(OPACITY, kinds::OPACITY).with("value", 0.75));
    stages.push(StageDecl::new(MASK, kinds::SRC_IN));
    stages.push(StageDecl::new(PLUS, kinds::PLUS));

    VariantSpec {
        name: "colorize-luminance-plus",
        title: "Extract and Recolor Luma (Plus)",
        description: "Glow extraction with an optional masked Plus blend",
        surface: surface(
            Ranges {
                shadow_default: -100.0,
                strength_max: Some(1000.0),
                levels_default: 0.5,
                levels_range: (0.1, 2.0),
            },
            true,
        ),
        stages,
        bindings: bindings(),
        mode_only: vec![params::EASY_MODE],
        topology: switchable(blend_plus_masked),
    }
}

/// Easy mode adds the blurred glow over the input at full strength.
pub fn colorize_luminance_add() -> VariantSpec {
    let mut stages = primary_stages();
    stages.push(StageDecl::new(ADD, kinds::ADD));

    VariantSpec {
        name: "colorize-luminance-add",
        title: "Extract and Recolor Luma (Add)",
        description: "Glow extraction with an optional full-strength Add blend",
        surface: surface(
            Ranges {
                shadow_default: -100.0,
                strength_max: Some(1000.0),
                levels_default: 0.5,
                levels_range: (0.1, 1.0),
            },
            true,
        ),
        stages,
        bindings: bindings(),
        mode_only: vec![params::EASY_MODE],
        topology: switchable(blend_add),
    }
}

/// Every variant, in a stable order.
pub fn all() -> Vec<VariantSpec> {
    vec![
        colorize_luminance(),
        colorize_luminance_easy(),
        colorize_luminance_plus(),
        colorize_luminance_add(),
    ]
}

/// Look a variant up by name.
pub fn by_name(name: &str) -> Option<VariantSpec> {
    all().into_iter().find(|v| v.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color_matches_hex() {
        assert_eq!(default_color().to_hex(), DEFAULT_COLOR);
    }

    #[test]
    fn test_variant_names_unique() {
        let names: Vec<&str> = all().iter().map(|v| v.name).collect();
        assert_eq!(
            names,
            [
                "colorize-luminance",
                "colorize-luminance-easy",
                "colorize-luminance-plus",
                "colorize-luminance-add"
            ]
        );
        assert!(by_name("colorize-luminance-plus").is_some());
        assert!(by_name("sepia").is_none());
    }

    #[test]
    fn test_tables_are_valid() {
        for variant in all() {
            variant.topology.validate().unwrap();
            for mode in &variant.mode_only {
                assert!(variant.topology.is_trigger(mode), "{}: {mode}", variant.name);
                assert!(variant.surface.contains(mode));
            }
        }
    }

    #[test]
    fn test_plus_blend_skips_blur() {
        let plan = blend_plus_masked(&ParamValues::new());
        let participants = plan.participants();
        assert!(!participants.contains(BLUR));
        assert!(participants.contains(MASK));
    }

    #[test]
    fn test_strength_ranges() {
        let classic = colorize_luminance();
        let strength = classic.surface.descriptor(params::STRENGTH).unwrap();
        assert_eq!((strength.min, strength.max), (Some(0.0), None));

        let easy = colorize_luminance_easy();
        let strength = easy.surface.descriptor(params::STRENGTH).unwrap();
        assert_eq!((strength.min, strength.max), (Some(0.0), Some(1000.0)));
    }
}
