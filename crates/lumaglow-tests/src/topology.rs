//! Topology coverage for every variant in both modes.

use std::thread;

use lumaglow_core::{ParamValue, StageId};
use lumaglow_ops::colorize::{self, labels, params, rules};
use lumaglow_ops::{variants, MetaOperation};

use crate::support::{attached, primary_labels, registry, upstream_labels, wiring};

fn modes(op: &MetaOperation) -> Vec<bool> {
    if op.surface().contains(params::EASY_MODE) {
        vec![false, true, false]
    } else {
        vec![false]
    }
}

#[test]
fn no_required_input_left_dangling() {
    for spec in variants() {
        let name = spec.name;
        let mut op = attached(spec, &[]);
        for easy in modes(&op) {
            if op.surface().contains(params::EASY_MODE) {
                op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(easy)).unwrap();
            }
            let graph = op.graph().unwrap();
            assert!(
                graph.unconnected_inputs(StageId::OUTPUT).is_empty(),
                "{name} easy_mode={easy}: {:?}",
                graph.unconnected_inputs(StageId::OUTPUT)
            );
            assert!(graph.topological_order().is_some(), "{name} easy_mode={easy} has a cycle");
            assert!(upstream_labels(graph, StageId::OUTPUT).contains(&"input".to_string()));
        }
    }
}

#[test]
fn primary_mode_is_the_same_chain_everywhere() {
    let expected = ["output", "blur", "overlay", "lumen", "bloom", "levels", "shadow", "input"];
    for spec in variants() {
        let name = spec.name;
        let op = attached(spec, &[]);
        assert_eq!(op.active_rule(), Some(rules::PRIMARY), "{name}");
        assert_eq!(primary_labels(op.graph().unwrap(), StageId::OUTPUT), expected, "{name}");
    }
}

#[test]
fn tint_feeds_luminance_aux_in_every_mode() {
    let mut op = attached(colorize::colorize_luminance_plus(), &[]);
    for easy in [false, true] {
        op.on_parameter_changed(params::EASY_MODE, ParamValue::Bool(easy)).unwrap();
        let edges = wiring(op.graph().unwrap());
        assert!(edges.contains(&("bloom.output".into(), "tint.input".into())));
        assert!(edges.contains(&("tint.output".into(), "lumen.aux".into())));
    }
}

#[test]
fn add_variant_blends_at_full_strength() {
    let op = attached(colorize::colorize_luminance_add(), &[(params::EASY_MODE, ParamValue::Bool(true))]);
    let graph = op.graph().unwrap();
    let add = op.stage_id(labels::ADD).unwrap();

    assert_eq!(graph.source_of(StageId::OUTPUT, "input").unwrap().stage, add);
    assert_eq!(graph.source_of(add, "input").unwrap().stage, StageId::INPUT);
    assert_eq!(graph.source_of(add, "aux").unwrap().stage, op.stage_id(labels::BLUR).unwrap());
}

#[test]
fn plus_variant_masks_unblurred_glow() {
    let op = attached(colorize::colorize_luminance_plus(), &[(params::EASY_MODE, ParamValue::Bool(true))]);
    let edges = wiring(op.graph().unwrap());

    for edge in [
        ("overlay.output", "opacity.input"),
        ("opacity.output", "mask.input"),
        ("input.output", "mask.aux"),
        ("input.output", "plus.input"),
        ("mask.output", "plus.aux"),
        ("plus.output", "output.input"),
    ] {
        assert!(edges.contains(&(edge.0.to_string(), edge.1.to_string())), "missing {edge:?}");
    }
    assert_eq!(op.snapshot().unwrap().dormant(), [labels::BLUR]);

    // The dormant blur still receives its bound value.
    let blur = op.stage_id(labels::BLUR).unwrap();
    assert_eq!(op.graph().unwrap().param(blur, "std-dev-x"), Some(&ParamValue::Float(6.0)));
}

#[test]
fn failed_rebuild_destroys_instance() {
    use lumaglow_core::{GraphError, ParamValues};
    use lumaglow_graph::{TopologyPlan, TopologyTable};
    use lumaglow_ops::Lifecycle;

    fn broken(_: &ParamValues) -> TopologyPlan {
        // add.aux is required and never fed.
        TopologyPlan::new().chain(["input", "add", "output"])
    }
    fn flagged(values: &ParamValues) -> bool {
        values.get(params::EASY_MODE).and_then(ParamValue::as_bool).unwrap_or(false)
    }
    fn plain(_: &ParamValues) -> TopologyPlan {
        lumaglow_graph::topology::straight(&colorize::PRIMARY_CHAIN)
            .connect(labels::BLOOM, labels::TINT, "input")
            .connect(labels::TINT, labels::LUMEN, "aux")
    }

    let mut spec = colorize::colorize_luminance_add();
    spec.topology = TopologyTable::new()
        .rule(rules::BLEND, flagged, broken)
        .fallback(rules::PRIMARY, plain)
        .trigger(params::EASY_MODE);

    let mut op = attached(spec, &[]);
    let err = op
        .on_parameter_changed(params::EASY_MODE, ParamValue::Bool(true))
        .unwrap_err();
    assert!(matches!(err, GraphError::UnconnectedInput { .. }));
    assert_eq!(op.lifecycle(), Lifecycle::Destroyed);
    assert!(op.graph().is_err());
}

#[test]
fn instances_are_independent_across_threads() {
    let registry = registry();
    thread::scope(|scope| {
        for (i, spec) in variants().into_iter().enumerate() {
            let registry = registry.clone();
            scope.spawn(move || {
                let mut op = MetaOperation::new(spec, registry);
                op.attach().unwrap();
                let sigma = 2.0 + i as f64;
                op.on_parameter_changed(params::GAUSSIAN, ParamValue::Float(sigma)).unwrap();
                let blur = op.stage_id(labels::BLUR).unwrap();
                assert_eq!(op.graph().unwrap().param(blur, "std-dev-y"), Some(&ParamValue::Float(sigma)));
                op.detach().unwrap();
            });
        }
    });
}
