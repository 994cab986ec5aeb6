//! Lumaglow - inspect meta-operation graphs from the command line
//!
//! ```text
//! lumaglow --list
//! lumaglow <variant> [name=value ...] [--then name=value ...]
//! ```
//!
//! Assignments before `--then` preset parameters before attach; each one
//! after it is delivered as a parameter-change notification. The resulting
//! graph is printed as JSON.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lumaglow_core::ParamValues;
use lumaglow_graph::StageRegistry;
use lumaglow_ops::{MetaOperation, VariantSpec};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: lumaglow --list | lumaglow <variant> [name=value ...] [--then name=value ...]";

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("LUMAGLOW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some("--list") => {
            list();
            Ok(())
        }
        Some(name) => run(name, &args[1..]),
    }
}

fn list() {
    for variant in lumaglow_ops::variants() {
        print!("{}", summary(&variant));
    }
}

/// Name, title, description and parameter surface of one variant.
fn summary(variant: &VariantSpec) -> String {
    let mut text = format!("{} - {}\n  {}\n", variant.name, variant.title, variant.description);
    for param in variant.surface.descriptors() {
        let range = match (param.min, param.max) {
            (Some(min), Some(max)) => format!(" [{min}, {max}]"),
            (Some(min), None) => format!(" [{min}, inf)"),
            _ => String::new(),
        };
        text.push_str(&format!(
            "  {:<10} {:<12} default {}{}\n",
            param.name,
            param.kind(),
            param.default,
            range
        ));
    }
    text
}

fn run(name: &str, rest: &[String]) -> Result<()> {
    let spec = lumaglow_ops::variant(name).with_context(|| format!("unknown variant {name:?}\n{USAGE}"))?;

    let (presets, changes) = match rest.iter().position(|a| a == "--then") {
        Some(split) => (&rest[..split], &rest[split + 1..]),
        None => (rest, &rest[rest.len()..]),
    };

    let initial = parse_all(&spec, presets)?;
    let mut op = MetaOperation::with_params(spec.clone(), Arc::new(StageRegistry::new()), &initial)?;
    op.attach()?;

    for text in changes {
        let (param, value) = spec.surface.parse_assignment(text)?;
        info!(param = %param, %value, "Applying change");
        op.on_parameter_changed(&param, value)?;
    }

    println!("{}", op.snapshot()?.to_json()?);
    op.detach()?;
    Ok(())
}

fn parse_all(spec: &VariantSpec, assignments: &[String]) -> Result<ParamValues> {
    let mut values = ParamValues::new();
    for text in assignments {
        if text.starts_with("--") {
            bail!("unexpected flag {text:?}\n{USAGE}");
        }
        let (param, value) = spec.surface.parse_assignment(text)?;
        values.insert(param, value);
    }
    Ok(values)
}
