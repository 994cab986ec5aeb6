//! End-to-end scenarios through the meta-operation façade.

use lumaglow_core::{ParamValue, StageId};
use lumaglow_ops::colorize::{self, labels, params, rules};
use lumaglow_ops::Lifecycle;

use crate::support::{attached, hex, primary_labels, upstream_labels};

// ── Attach with the documented defaults ────────────────────────

#[test]
fn attach_applies_every_redirection() {
    let op = attached(
        colorize::colorize_luminance_easy(),
        &[
            (params::EASY_MODE, ParamValue::Bool(false)),
            (params::GAUSSIAN, ParamValue::Float(6.0)),
            (params::VALUE, hex("#ff9dff")),
        ],
    );
    let graph = op.graph().unwrap();
    let blur = op.stage_id(labels::BLUR).unwrap();
    let overlay = op.stage_id(labels::OVERLAY).unwrap();
    let tint = op.stage_id(labels::TINT).unwrap();
    let shadow = op.stage_id(labels::SHADOW).unwrap();
    let levels = op.stage_id(labels::LEVELS).unwrap();

    assert_eq!(graph.param(blur, "std-dev-x"), Some(&ParamValue::Float(6.0)));
    assert_eq!(graph.param(blur, "std-dev-y"), Some(&ParamValue::Float(6.0)));
    for id in [overlay, tint] {
        let color = graph.param(id, "value").and_then(ParamValue::as_color).unwrap();
        assert_eq!(color.to_hex(), "#ff9dff");
    }
    // Variant defaults reach the stages as well.
    assert_eq!(graph.param(shadow, "highlights"), Some(&ParamValue::Float(-100.0)));
    assert_eq!(graph.param(levels, "in-high"), Some(&ParamValue::Float(0.5)));
}

#[test]
fn primary_mode_traces_back_to_shadow_without_compositing() {
    let op = attached(
        colorize::colorize_luminance_easy(),
        &[(params::GAUSSIAN, ParamValue::Float(6.0)), (params::VALUE, hex("#ff9dff"))],
    );
    let graph = op.graph().unwrap();

    assert_eq!(
        primary_labels(graph, StageId::OUTPUT),
        ["output", "blur", "overlay", "lumen", "bloom", "levels", "shadow", "input"]
    );
    let upstream = upstream_labels(graph, StageId::OUTPUT);
    assert!(!upstream.contains(&labels::ADD.to_string()));
    assert!(!upstream.contains(&labels::OPACITY.to_string()));
}

#[test]
fn toggling_easy_mode_reroutes_output_and_keeps_values() {
    let mut op = attached(
        colorize::colorize_luminance_easy(),
        &[(params::GAUSSIAN, ParamValue::Float(6.0)), (params::VALUE, hex("#ff9dff"))],
    );
    let before = op.snapshot().unwrap();

    op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(true)).unwrap();
    assert_eq!(op.active_rule(), Some(rules::BLEND));

    let graph = op.graph().unwrap();
    let opacity = op.stage_id(labels::OPACITY).unwrap();
    let add = op.stage_id(labels::ADD).unwrap();
    assert_eq!(graph.source_of(StageId::OUTPUT, "input").unwrap().stage, opacity);
    assert_eq!(graph.source_of(opacity, "input").unwrap().stage, add);

    let after = op.snapshot().unwrap();
    for (old, new) in before.stages.iter().zip(&after.stages) {
        assert_eq!(old.label, new.label);
        assert_eq!(old.params, new.params, "stage {} changed parameters", old.label);
    }
}

#[test]
fn toggling_back_restores_primary_wiring() {
    let mut op = attached(colorize::colorize_luminance_easy(), &[]);
    let primary = op.graph().unwrap().edges();

    op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(true)).unwrap();
    assert_ne!(op.graph().unwrap().edges(), primary);
    op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(false)).unwrap();
    assert_eq!(op.graph().unwrap().edges(), primary);

    let snapshot = op.snapshot().unwrap();
    assert_eq!(snapshot.dormant(), [labels::ADD, labels::OPACITY]);
}

#[test]
fn classic_variant_has_no_mode_flag() {
    let mut op = attached(colorize::colorize_luminance(), &[]);
    assert!(op.param(params::EASY_MODE).is_none());
    assert!(op
        .on_parameter_changed(params::EASY_MODE, ParamValue::Bool(true))
        .is_err());
    assert_eq!(op.lifecycle(), Lifecycle::Active);

    op.on_parameter_changed(params::STRENGTH, ParamValue::Float(1e6)).unwrap();
    let bloom = op.stage_id(labels::BLOOM).unwrap();
    assert_eq!(op.graph().unwrap().param(bloom, "strength"), Some(&ParamValue::Float(1e6)));
}

#[test]
fn snapshot_serializes_to_json() {
    let op = attached(colorize::colorize_luminance_plus(), &[(params::EASY_MODE, ParamValue::Bool(true))]);
    let json = op.snapshot().unwrap().to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["operation"], "colorize-luminance-plus");
    assert_eq!(parsed["rule"], "blend");
    assert_eq!(parsed["params"]["value"], "#ff9dff");
    let edges = parsed["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["from"] == "plus.output" && e["to"] == "output.input"));
}

#[test]
fn detach_releases_the_graph() {
    let mut op = attached(colorize::colorize_luminance_add(), &[]);
    op.detach().unwrap();
    assert!(op.graph().is_err());
    assert!(op.snapshot().is_err());
    assert_eq!(op.active_rule(), None);
}
