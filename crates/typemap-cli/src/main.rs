//! CLI binary for typemap: scan a type hierarchy and render it as a graph.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use typemap_core::config::TypemapConfig;
use typemap_core::graph::TypeGraph;
use typemap_core::key::TypeKey;
use typemap_core::scan::{ScanReport, scan_with_report};
use typemap_parser::{PythonSource, SourceFilter};
use typemap_render::{ExportFormat, HtmlOptions};

#[derive(Parser)]
#[command(name = "typemap", about = "Map a subtype hierarchy into an interactive graph")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Directory of Python sources to scan (defaults to the project root)
    #[arg(long, conflicts_with = "catalog")]
    python: Option<PathBuf>,

    /// TOML type catalog to scan instead of Python sources
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Root type key, e.g. "object builtins"
    #[arg(long)]
    root: Option<String>,

    /// Type keys never expanded or recorded (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Type keys added as childless placeholders after the scan (repeatable)
    #[arg(long = "placeholder")]
    placeholders: Vec<String>,

    /// Glob patterns to include source files (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Glob patterns to skip source files (repeatable)
    #[arg(long)]
    skip: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the hierarchy and save the relationship file
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Relationship file to write (defaults to .typemap/relationships.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a saved relationship file
    Render {
        /// Relationship file to read (defaults to .typemap/relationships.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format: html, dot, mermaid
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Artifact path (html defaults to .typemap/graph.html, others to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scan and render in one go
    Map {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output format: html, dot, mermaid
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Artifact path (html defaults to .typemap/graph.html, others to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a relationship file for unresolved references
    Validate {
        /// Relationship file to read (defaults to .typemap/relationships.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show hierarchy statistics
    Info {
        /// Relationship file to read (defaults to .typemap/relationships.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = TypemapConfig::load(&project_root).context("failed to load config")?;

    match cli.command {
        Commands::Scan { scan, output } => cmd_scan(&project_root, &config, &scan, output),
        Commands::Render {
            input,
            format,
            output,
        } => cmd_render(&project_root, &config, input, &format, output),
        Commands::Map {
            scan,
            format,
            output,
        } => cmd_map(&project_root, &config, &scan, &format, output),
        Commands::Validate { input } => cmd_validate(&project_root, &config, input),
        Commands::Info { input } => cmd_info(&project_root, &config, input),
    }
}

fn parse_keys(keys: &[String]) -> Result<Vec<TypeKey>> {
    keys.iter()
        .map(|k| k.parse::<TypeKey>().map_err(anyhow::Error::from))
        .collect()
}

/// Collect Python sources with a spinner while the walk runs.
fn collect_python_files(source_root: &Path, filter: &SourceFilter) -> Result<Vec<(PathBuf, String)>> {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message(format!("Collecting Python files under {}...", source_root.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let files = typemap_parser::collect_python_files(source_root, filter);
    spinner.finish_and_clear();
    files
}

/// Run the scanner for the requested source and add placeholders.
fn run_scan(
    project_root: &Path,
    config: &TypemapConfig,
    args: &ScanArgs,
) -> Result<(TypeGraph, TypeKey)> {
    let root: TypeKey = args
        .root
        .as_deref()
        .unwrap_or(&config.scan.root)
        .parse()
        .context("invalid root type key")?;
    let mut excluded: HashSet<TypeKey> = config.scan.excluded_keys()?;
    excluded.extend(parse_keys(&args.exclude).context("invalid --exclude key")?);
    let mut placeholders = config.scan.placeholder_keys()?;
    placeholders.extend(parse_keys(&args.placeholders).context("invalid --placeholder key")?);

    let report: ScanReport = if let Some(catalog) = &args.catalog {
        let source = typemap_core::catalog::load(catalog)?;
        scan_with_report(&source, &root, &excluded)
    } else {
        let source_root = args.python.as_deref().unwrap_or(project_root);
        let filter = SourceFilter::new(
            if args.include.is_empty() {
                config.source.include.clone()
            } else {
                args.include.clone()
            },
            if args.skip.is_empty() {
                config.source.exclude.clone()
            } else {
                args.skip.clone()
            },
        );
        let files = collect_python_files(source_root, &filter)?;
        if files.is_empty() {
            anyhow::bail!("No Python files found under {}", source_root.display());
        }
        eprintln!("  Parsing {} Python files...", files.len());
        let source = PythonSource::from_files(&files);
        if !source.contains(&root) {
            tracing::warn!(%root, "root type is not declared or referenced by any parsed file");
        }
        scan_with_report(&source, &root, &excluded)
    };

    let ScanReport {
        mut graph,
        failures,
        excluded_hits,
    } = report;
    let added = graph.insert_placeholders(placeholders, &excluded);
    if added > 0 {
        tracing::debug!(added, "added placeholders");
    }

    eprintln!(
        "Scanned {} types ({} edges) from {}",
        graph.len(),
        graph.edge_count(),
        root
    );
    if !failures.is_empty() {
        eprintln!(
            "  {} type(s) could not be introspected and were recorded without subtypes",
            failures.len()
        );
    }
    if excluded_hits > 0 {
        eprintln!("  {} excluded type reference(s) dropped", excluded_hits);
    }
    Ok((graph, root))
}

fn relationships_path(project_root: &Path, config: &TypemapConfig, path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| config.relationships_path(project_root))
}

fn cmd_scan(
    project_root: &Path,
    config: &TypemapConfig,
    args: &ScanArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let (graph, root) = run_scan(project_root, config, args)?;
    let path = relationships_path(project_root, config, output);
    typemap_core::store::save(&path, &graph, &root)?;
    eprintln!("Saved relationships to {}", path.display());
    Ok(())
}

fn load_relationships(
    project_root: &Path,
    config: &TypemapConfig,
    input: Option<PathBuf>,
) -> Result<(TypeGraph, TypeKey)> {
    let path = relationships_path(project_root, config, input);
    if !path.exists() {
        anyhow::bail!(
            "No relationship file at {}. Run `typemap scan` first.",
            path.display()
        );
    }
    Ok(typemap_core::store::load(&path)?)
}

/// Materialize and write the artifact.
fn write_artifact(
    project_root: &Path,
    config: &TypemapConfig,
    graph: &TypeGraph,
    root: &TypeKey,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;
    let visual = typemap_core::materialize::materialize(
        graph,
        root,
        &config.render.materialize_options(),
    )
    .context("relationship map is incomplete; add placeholders or rescan")?;

    let options = HtmlOptions {
        title: format!("typemap: {}", root),
        height: config.render.height.clone(),
        width: config.render.width.clone(),
        select_menu: config.render.select_menu,
        filter_menu: config.render.filter_menu,
    };
    let artifact = typemap_render::export(&visual, format, &options);

    let output = match (output, format) {
        (Some(path), _) => Some(path),
        (None, ExportFormat::Html) => {
            Some(typemap_core::store::typemap_dir(project_root).join("graph.html"))
        }
        (None, _) => None,
    };
    match output {
        Some(path) => {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            std::fs::write(&path, artifact)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Rendered {} nodes and {} edges to {}",
                visual.node_count(),
                visual.edge_count(),
                path.display()
            );
        }
        None => print!("{}", artifact),
    }
    Ok(())
}

fn cmd_render(
    project_root: &Path,
    config: &TypemapConfig,
    input: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let (graph, root) = load_relationships(project_root, config, input)?;
    write_artifact(project_root, config, &graph, &root, format, output)
}

fn cmd_map(
    project_root: &Path,
    config: &TypemapConfig,
    args: &ScanArgs,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let (graph, root) = run_scan(project_root, config, args)?;
    write_artifact(project_root, config, &graph, &root, format, output)
}

fn cmd_validate(project_root: &Path, config: &TypemapConfig, input: Option<PathBuf>) -> Result<()> {
    let (graph, root) = load_relationships(project_root, config, input)?;
    let problems = graph.problems(&root);

    if problems.is_empty() {
        eprintln!("Relationship map is complete. No unresolved references.");
        eprintln!("  {} types, {} edges", graph.len(), graph.edge_count());
        return Ok(());
    }
    for problem in &problems {
        println!("WARN: {}", problem);
    }
    anyhow::bail!(
        "Found {} issue(s). Add placeholders for missing keys or rescan.",
        problems.len()
    )
}

fn cmd_info(project_root: &Path, config: &TypemapConfig, input: Option<PathBuf>) -> Result<()> {
    let (graph, root) = load_relationships(project_root, config, input)?;
    let stats = graph.stats(&root);

    println!("=== typemap ===");
    println!("Root:        {}", root);
    println!("Types:       {} ({} reachable)", graph.len(), stats.nodes);
    println!("Edges:       {}", stats.edges);
    println!("Leaves:      {}", stats.leaves);
    println!("Max depth:   {}", stats.max_depth);
    if let Some((key, width)) = &stats.widest {
        println!("Widest:      {} ({} direct subtypes)", key, width);
    }

    let mut modules: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for key in graph.keys() {
        *modules.entry(key.module()).or_default() += 1;
    }
    let mut by_count: Vec<(&str, usize)> = modules.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    println!("\nTop modules:");
    for (module, count) in by_count.iter().take(10) {
        println!("  {:<30} {}", module, count);
    }
    Ok(())
}
