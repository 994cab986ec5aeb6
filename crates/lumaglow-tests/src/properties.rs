//! Property tests: determinism, idempotence and value propagation.

use lumaglow_core::{Color, ParamValue, ParamValues, StageId};
use lumaglow_graph::catalog::kinds;
use lumaglow_graph::{BindingTarget, GraphBuilder, Redirector, StageRegistry};
use lumaglow_ops::colorize::{self, labels, params};
use lumaglow_ops::MetaOperation;
use proptest::prelude::*;

use crate::support::{attached, registry, wiring};

fn plus() -> MetaOperation {
    attached(colorize::colorize_luminance_plus(), &[])
}

proptest! {
    #[test]
    fn rebuild_is_deterministic(toggles in prop::collection::vec(any::<bool>(), 1..12)) {
        let mut op = plus();
        let mut seen = [None, None];
        for easy in toggles {
            op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(easy)).unwrap();
            let edges = wiring(op.graph().unwrap());
            let slot = usize::from(easy);
            if let Some(previous) = &seen[slot] {
                prop_assert_eq!(previous, &edges);
            } else {
                seen[slot] = Some(edges);
            }
        }
    }

    #[test]
    fn value_changes_never_touch_edges(sigma in 0.0f64..95.0, strength in 0.0f64..1000.0) {
        let mut op = attached(colorize::colorize_luminance_easy(), &[(params::EASY_MODE, ParamValue::Bool(true))]);
        let before = op.graph().unwrap().edges();

        op.on_parameter_changed(params::GAUSSIAN, ParamValue::Float(sigma)).unwrap();
        op.on_parameter_changed(params::STRENGTH, ParamValue::Float(strength)).unwrap();

        prop_assert_eq!(op.graph().unwrap().edges(), before);
        prop_assert_eq!(op.rebuild_count(), 1);
        let blur = op.stage_id(labels::BLUR).unwrap();
        prop_assert_eq!(op.graph().unwrap().param(blur, "std-dev-x"), Some(&ParamValue::Float(sigma)));
    }

    #[test]
    fn out_of_range_values_are_clamped(sigma in -500.0f64..500.0) {
        let mut op = attached(colorize::colorize_luminance_add(), &[]);
        op.on_parameter_changed(params::GAUSSIAN, ParamValue::Float(sigma)).unwrap();
        let blur = op.stage_id(labels::BLUR).unwrap();
        let stored = op.graph().unwrap().param(blur, "std-dev-y").and_then(ParamValue::as_f64).unwrap();
        prop_assert!((0.0..=95.0).contains(&stored));
        prop_assert_eq!(stored, sigma.clamp(0.0, 95.0));
    }

    #[test]
    fn color_fans_out_to_both_overlays(r: u8, g: u8, b: u8) {
        let mut op = plus();
        let color = Color::from_rgba8(r, g, b, 0xff);
        op.on_parameter_changed(params::VALUE, ParamValue::Color(color)).unwrap();
        for label in [labels::OVERLAY, labels::TINT] {
            let id = op.stage_id(label).unwrap();
            let stored = op.graph().unwrap().param(id, "value").and_then(ParamValue::as_color).unwrap();
            prop_assert_eq!(stored.to_hex(), color.to_hex());
        }
    }
}

#[test]
fn reapplying_overwrites_direct_stage_edits() {
    let stages = StageRegistry::new();
    let mut graph = GraphBuilder::new();
    let blur = graph
        .create_stage(&stages, labels::BLUR, kinds::GAUSSIAN_BLUR, &ParamValues::new())
        .unwrap();
    graph.seal();

    let mut redirector = Redirector::new();
    let targets = [BindingTarget::new(blur, "std-dev-x"), BindingTarget::new(blur, "std-dev-y")];
    redirector.bind(&graph, params::GAUSSIAN, &targets).unwrap();
    redirector.seal();
    assert_eq!(redirector.targets(params::GAUSSIAN), targets);
    assert!(!redirector.is_bound(params::EASY_MODE));

    let values: ParamValues = [(params::GAUSSIAN.to_string(), ParamValue::Float(6.0))].into_iter().collect();
    assert_eq!(redirector.apply_all(&mut graph, &values).unwrap(), 2);

    // Someone writes into the stage behind the redirector's back.
    graph.set_param(blur, "std-dev-x", ParamValue::Float(1.0)).unwrap();
    assert_eq!(redirector.apply_all(&mut graph, &values).unwrap(), 1);
    assert_eq!(graph.param(blur, "std-dev-x"), Some(&ParamValue::Float(6.0)));
    assert_eq!(redirector.apply_all(&mut graph, &values).unwrap(), 0);
}

#[test]
fn attached_bindings_match_the_declarations() {
    let op = attached(colorize::colorize_luminance_easy(), &[]);
    let redirector = op.redirector().unwrap();
    let id = |label: &str| op.stage_id(label).unwrap();

    assert_eq!(
        redirector.targets(params::VALUE),
        [BindingTarget::new(id(labels::OVERLAY), "value"), BindingTarget::new(id(labels::TINT), "value")]
    );
    assert_eq!(redirector.targets(params::SHADOW), [BindingTarget::new(id(labels::SHADOW), "highlights")]);
    assert!(redirector.targets(params::EASY_MODE).is_empty());
}

#[test]
fn same_inputs_build_identical_snapshots() {
    let build = || {
        let mut op = MetaOperation::new(colorize::colorize_luminance_plus(), registry());
        op.attach().unwrap();
        op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(true)).unwrap();
        op.snapshot().unwrap()
    };
    let (a, b) = (build(), build());
    assert_eq!(a, b);
    assert_eq!(a.order.first().map(String::as_str), Some("input"));
    assert_eq!(a.order.last().map(String::as_str), Some("output"));
    assert_eq!(a.stages[StageId::OUTPUT.index()].label, "output");
}
