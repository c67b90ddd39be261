use futures::executor::block_on;
use serde::Serialize;
use serde_json::{Value, json};
use std::io::Read;
use std::time::Duration;
use stemma::{Mount, StaticSource, SvgScene, Viewer};
use stemma_core::{Hierarchy, NodeId, StemmaConfig};
use stemma_render::{LayoutSpacing, TreeLayout, ViewTransform, Viewport, layout_tree};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(stemma_core::Error),
    Render(stemma_render::Error),
    Viewer(String),
    Json(serde_json::Error),
    UnknownPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Viewer(status) => write!(f, "{status}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::UnknownPath(path) => write!(f, "No node at path `{path}`"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<stemma_core::Error> for CliError {
    fn from(value: stemma_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<stemma_render::Error> for CliError {
    fn from(value: stemma_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<stemma::ViewerError> for CliError {
    fn from(value: stemma::ViewerError) -> Self {
        Self::Viewer(value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Check,
    Layout,
    Render,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    toggles: Vec<String>,
    collapse_all: bool,
    expand_paths: Vec<String>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    at_ms: Option<u64>,
    out: Option<String>,
}

#[derive(Serialize)]
struct CheckOut {
    nodes: usize,
    depth: usize,
    leaves: usize,
    branches: Vec<String>,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    spacing: LayoutSpacing,
    #[serde(flatten)]
    layout: &'a TreeLayout,
    fit: Option<ViewTransform>,
}

fn usage() -> &'static str {
    "stemma-cli\n\
\n\
USAGE:\n\
  stemma-cli [check] [--pretty] [<path>|-]\n\
  stemma-cli layout [--pretty] [--config <json>] [--collapse-all] [--expand-path <a/b/c>]... [--toggle <a/b/c>]... [--viewport-width <w>] [--viewport-height <h>] [<path>|-]\n\
  stemma-cli render [--config <json>] [--collapse-all] [--expand-path <a/b/c>]... [--toggle <a/b/c>]... [--viewport-width <w>] [--viewport-height <h>] [--at-ms <t>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Paths are '/'-separated node names starting at the root, e.g. Adam/Seth/Enosh.\n\
  - --config takes a JSON object that is deep-merged over the defaults.\n\
  - render toggles every --toggle node at t=0; --at-ms samples the transition at that time\n\
    instead of its end state.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - Set RUST_LOG=stemma=debug for diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_positive(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "check" => args.command = Command::Check,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--collapse-all" => args.collapse_all = true,
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--toggle" => args.toggles.push(next_value(&mut it)?.clone()),
            "--expand-path" => args.expand_paths.push(next_value(&mut it)?.clone()),
            "--viewport-width" => args.viewport_width = Some(parse_positive(next_value(&mut it)?)?),
            "--viewport-height" => {
                args.viewport_height = Some(parse_positive(next_value(&mut it)?)?)
            }
            "--at-ms" => {
                let raw = next_value(&mut it)?;
                args.at_ms = Some(raw.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

/// Defaults, then `--config`, then the expansion and viewport flags.
fn build_config(args: &Args) -> Result<StemmaConfig, CliError> {
    let mut config = match &args.config {
        Some(raw) => StemmaConfig::from_json_str(raw)?,
        None => StemmaConfig::default(),
    };
    if args.collapse_all {
        config.set_value("expansion.mode", json!("collapsed"));
    }
    if !args.expand_paths.is_empty() {
        let mut paths: Vec<Value> = config
            .as_value()
            .pointer("/expansion/paths")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        paths.extend(args.expand_paths.iter().map(|p| json!(p)));
        config.set_value("expansion.paths", Value::Array(paths));
    }
    if let Some(w) = args.viewport_width {
        config.set_value("viewport.width", json!(w));
    }
    if let Some(h) = args.viewport_height {
        config.set_value("viewport.height", json!(h));
    }
    Ok(config)
}

fn resolve_path(hierarchy: &Hierarchy, path: &str) -> Result<NodeId, CliError> {
    hierarchy
        .find_path_str(path)
        .ok_or_else(|| CliError::UnknownPath(path.to_string()))
}

fn run_check(text: &str, pretty: bool) -> Result<(), CliError> {
    let hierarchy = Hierarchy::from_json_str(text)?;
    let ids = hierarchy.pre_order();
    let mut branches: Vec<String> = Vec::new();
    for id in &ids {
        if let Some(key) = hierarchy.node(*id).own_branch_key() {
            if !branches.iter().any(|b| b == key) {
                branches.push(key.to_string());
            }
        }
    }
    let out = CheckOut {
        nodes: ids.len(),
        depth: ids.iter().map(|id| hierarchy.depth(*id)).max().unwrap_or(0),
        leaves: ids
            .iter()
            .filter(|id| !hierarchy.node(**id).has_descendants())
            .count(),
        branches,
    };
    write_json(&out, pretty)
}

fn run_layout(text: &str, args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let mut hierarchy = Hierarchy::from_json_str(text)?;
    hierarchy.apply_expansion_policy(&config.expansion()?);
    for path in &args.toggles {
        let id = resolve_path(&hierarchy, path)?;
        hierarchy.toggle(id);
    }

    let spacing = LayoutSpacing::from_config(&config);
    let layout = layout_tree(&mut hierarchy, &spacing);
    let viewport = Viewport::from_config(&config)?;
    let fit = layout.bounds.as_ref().map(|b| viewport.fit_transform(b));
    write_json(
        &LayoutOut {
            spacing,
            layout: &layout,
            fit,
        },
        args.pretty,
    )
}

fn run_render(text: String, args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let width = config.get_f64("viewport.width").unwrap_or(900.0);
    let height = config.get_f64("viewport.height").unwrap_or(600.0);
    let name = args.input.as_deref().unwrap_or("-").to_string();

    let mount = Mount::new(SvgScene::new(width, height)).with_config(config);
    let source = StaticSource::ok(text).named(name);
    let mut viewer: Viewer<SvgScene> = block_on(stemma::try_start(mount, &source))?;

    for path in &args.toggles {
        let id = resolve_path(viewer.hierarchy(), path)?;
        viewer.toggle_node(id, Duration::ZERO)?;
    }
    match args.at_ms {
        Some(ms) => {
            viewer.tick(Duration::from_millis(ms));
        }
        None => viewer.finish_transitions(),
    }

    write_text(&viewer.target().to_svg(), args.out.as_deref())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    match args.command {
        Command::Check => run_check(&text, args.pretty),
        Command::Layout => run_layout(&text, &args),
        Command::Render => run_render(text, &args),
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
