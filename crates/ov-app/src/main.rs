//! Replay dashboard actions against a package and print the resulting states

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ov_core::{Action, EngineConfig, QueryEngine, QueryState, RawParams};
use ov_model::PackageModel;
use ov_views::{Catalog, VisualizationRegistry};

#[derive(Parser, Debug)]
#[command(about = "Derive dashboard query states from a package model")]
struct Args {
    /// Package model (JSON).
    package: PathBuf,

    /// Initial parameter bag (JSON object), as parsed from a URL.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Actions to apply in order (JSON list).
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Visualization catalog (JSON list); the built-in catalog is used otherwise.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Engine configuration (JSON object).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print URL parameter bags instead of full states.
    #[arg(long)]
    url: bool,

    /// Fail if a produced state breaks a query invariant.
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Serialize)]
struct Step<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a Action>,
    #[serde(flatten)]
    output: StepOutput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum StepOutput {
    State(QueryState),
    Params(RawParams),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let model = PackageModel::from_json_file(&args.package)
        .with_context(|| format!("loading package model {}", args.package.display()))?;

    let custom_catalog = args
        .catalog
        .as_deref()
        .map(|path| {
            Catalog::from_json_file(path)
                .with_context(|| format!("loading catalog {}", path.display()))
        })
        .transpose()?;
    let registry: &dyn VisualizationRegistry = match &custom_catalog {
        Some(catalog) => catalog,
        None => Catalog::builtin(),
    };

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let params: Option<RawParams> = args
        .params
        .as_deref()
        .map(read_json::<RawParams>)
        .transpose()?;
    let actions: Vec<Action> = match &args.actions {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    info!(
        "Replaying {} action(s) against package '{}'",
        actions.len(),
        model.id()
    );

    let engine = QueryEngine::new(&model, registry).with_config(config);
    let steps = replay(&engine, params.as_ref(), &actions, args.url, args.check)?;

    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}

/// Initialize from `params`, then apply `actions` in order
///
/// With `check`, every produced state (the initial one included) must keep
/// the query invariants.
fn replay<'a>(
    engine: &QueryEngine<'_>,
    params: Option<&RawParams>,
    actions: &'a [Action],
    url: bool,
    check: bool,
) -> Result<Vec<Step<'a>>> {
    let registry = engine.registry();

    let mut state = engine.init(params);
    if check {
        state
            .check_invariants(registry)
            .context("initial state from parameters")?;
    }
    let mut steps = vec![step(None, &state, url)];

    for (idx, action) in actions.iter().enumerate() {
        state = engine.apply(&state, action);
        if check {
            state
                .check_invariants(registry)
                .with_context(|| format!("after action #{} {:?}", idx, action))?;
        }
        steps.push(step(Some(action), &state, url));
    }

    Ok(steps)
}

fn step<'a>(action: Option<&'a Action>, state: &QueryState, url: bool) -> Step<'a> {
    let output = if url {
        StepOutput::Params(state.to_params())
    } else {
        StepOutput::State(state.clone())
    };
    Step { action, output }
}
