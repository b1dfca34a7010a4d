//! atlasic CLI - source dependency graphs for multi-language workspaces.
//!
//! Features:
//! - Graph generation with a cached snapshot under `.atlasic/`
//! - File search and change impact analysis
//! - Git touch-count heat maps
//! - Graphviz DOT and laid-out SVG export

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use atlasic_core::heat::HEAT_CACHE_FILE;
use atlasic_core::viewer::search::{find_matches, MAX_SUGGESTIONS};
use atlasic_core::{
    clear_cache, compute_heat, detect_impact, frame_to_svg, generate_dot, graph_cache_path,
    init_structured_logging, load_config, log_error, log_event, log_info, log_warn, read_graph,
    save_graph, save_json, AtlasicError, CodebaseGraph, ColorMode, GeneratorOptions, GitHeat,
    GraphGenerator, GraphView, LayoutGraph,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Source dependency graph generator and renderer")]
pub struct Cli {
    /// Path to the workspace root
    #[arg(default_value = ".")]
    path: String,

    /// Output the graph (or the selected report) as JSON
    #[arg(long)]
    json: bool,

    /// Regenerate even when a cached graph exists
    #[arg(long)]
    refresh: bool,

    /// Neither read nor write the graph cache
    #[arg(long)]
    no_cache: bool,

    /// Delete the cached graph and exit
    #[arg(long)]
    clear_cache: bool,

    /// Maximum directory depth to scan
    #[arg(long)]
    max_depth: Option<usize>,

    /// Extra path fragments to ignore
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// List files whose name or path contains this text
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Show files impacted by changes to these paths
    #[arg(long, num_args = 1.., value_name = "FILES")]
    impact: Vec<String>,

    /// Compute git touch counts over the configured window
    #[arg(long)]
    heat: bool,

    /// History window for --heat, in days
    #[arg(long)]
    heat_days: Option<u32>,

    /// Generate Graphviz DOT output
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a specified file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,

    /// Lay out the graph and write it as SVG
    #[arg(long, value_name = "FILE")]
    svg: Option<String>,

    /// SVG viewport width
    #[arg(long, default_value_t = 1600.0)]
    width: f64,

    /// SVG viewport height
    #[arg(long, default_value_t = 1000.0)]
    height: f64,

    /// Maximum simulation ticks before the SVG is taken
    #[arg(long, default_value_t = 3000)]
    ticks: usize,

    /// Node coloring: category, in-degree or heat
    #[arg(long, default_value = "category")]
    color_mode: ColorMode,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }
    if path.trim().is_empty() {
        return Err(anyhow!("Output path is empty"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    let normalized = path.replace('\\', "/");
    if normalized.contains("/../") || normalized.starts_with("../") {
        return Err(anyhow!("Path traversal attempt detected: {}", path));
    }

    Ok(p)
}

/// Prints a `[WARN]` line and records it as a structured event.
fn warn(message: &str) {
    eprintln!("[WARN] {}", message);
    log_warn(message);
}

fn info(message: &str) {
    eprintln!("INFO: {}", message);
    log_info(message);
}

/// Writes `content` to a validated relative path. An invalid path exits
/// with code 2; a failed write only warns.
fn write_output(file: &str, content: &str, what: &str) {
    match validate_output_path(file) {
        Ok(safe_path) => {
            if let Err(e) = fs::write(&safe_path, content) {
                warn(&format!("{} write failed to {}: {}", what, safe_path.display(), e));
            } else {
                eprintln!("{} saved to: {}", what, safe_path.display());
            }
        }
        Err(e) => {
            eprintln!("[ERROR] Invalid output path: {}", e);
            log_error(&format!("invalid output path: {}", e));
            std::process::exit(2);
        }
    }
}

/// Config file settings with command-line overrides applied on top.
fn effective_options(root: &Path, cli: &Cli) -> (GeneratorOptions, bool, u32) {
    let (mut options, cache_enabled, heat_days) = match load_config(root) {
        Ok(Some(cfg)) => (
            cfg.generator_options(),
            cfg.cache_enabled(),
            cfg.heat_window_days(),
        ),
        Ok(None) => (
            GeneratorOptions::default(),
            true,
            atlasic_core::config::DEFAULT_HEAT_WINDOW_DAYS,
        ),
        Err(e) => {
            warn(&format!("config load failed: {:#}", e));
            (
                GeneratorOptions::default(),
                true,
                atlasic_core::config::DEFAULT_HEAT_WINDOW_DAYS,
            )
        }
    };

    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    options.ignore_patterns.extend(cli.ignore.iter().cloned());

    (
        options,
        cache_enabled && !cli.no_cache,
        cli.heat_days.unwrap_or(heat_days),
    )
}

/// Where the graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphSource {
    Cache,
    Generated,
}

impl GraphSource {
    fn as_str(&self) -> &'static str {
        match self {
            GraphSource::Cache => "cache",
            GraphSource::Generated => "generated",
        }
    }
}

/// Reads and validates the cached graph. A recoverable failure (unreadable
/// or corrupt snapshot) is a cache miss; any other error is fatal.
fn read_cached(root: &Path) -> Result<Option<CodebaseGraph>> {
    let checked = read_graph(root).and_then(|cached| match cached {
        Some(graph) => LayoutGraph::from_codebase(&graph)
            .map(|_| Some(graph))
            .map_err(|e| AtlasicError::cache(e.to_string())),
        None => Ok(None),
    });

    match checked {
        Ok(graph) => Ok(graph),
        Err(e) if e.is_recoverable() => {
            let location = e.path().cloned().unwrap_or_else(|| graph_cache_path(root));
            warn(&format!(
                "cached graph at {} rejected, regenerating: {}",
                location.display(),
                e
            ));
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads the cached graph when allowed and sound, otherwise generates (and
/// caches) a fresh one.
fn load_or_generate(
    root: &Path,
    options: GeneratorOptions,
    use_cache: bool,
    refresh: bool,
) -> Result<(CodebaseGraph, GraphSource)> {
    let cached = if use_cache { read_cached(root)? } else { None };

    if let Some(graph) = cached.as_ref().filter(|_| !refresh) {
        return Ok((graph.clone(), GraphSource::Cache));
    }

    let graph = GraphGenerator::new(root)
        .with_options(options)
        .generate_graph()
        .with_context(|| format!("Failed to generate graph for: {}", root.display()))?;

    if let Some(previous) = &cached {
        if previous.fingerprint() == graph.fingerprint() {
            info("graph unchanged since last cache");
        } else {
            info("graph changed since last cache");
        }
    }

    if use_cache {
        if let Err(e) = save_graph(root, &graph) {
            warn(&format!("cache write failed: {:#}", e));
        }
    }

    Ok((graph, GraphSource::Generated))
}

fn print_summary(root: &Path, graph: &CodebaseGraph, source: GraphSource) {
    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_language: BTreeMap<&str, usize> = BTreeMap::new();
    for node in &graph.nodes {
        *by_category.entry(node.category.as_str()).or_insert(0) += 1;
        *by_language.entry(node.language.as_str()).or_insert(0) += 1;
    }

    println!("=== Dependency Graph ===\n");
    println!("Workspace: {}", root.display());
    println!("Source: {}", source.as_str());
    println!("Files: {}", graph.nodes.len());
    println!("Imports: {}\n", graph.links.len());

    println!("BY CATEGORY:");
    for (category, count) in &by_category {
        println!("  {:<10} {}", category, count);
    }
    println!("\nBY LANGUAGE:");
    for (language, count) in &by_language {
        let name = if language.is_empty() { "(none)" } else { language };
        println!("  {:<10} {}", name, count);
    }
}

fn run_search(graph: &CodebaseGraph, query: &str, json: bool) -> Result<()> {
    let layout = LayoutGraph::from_codebase(graph)?;
    let hits = find_matches(&layout, query, MAX_SUGGESTIONS);

    if json {
        let results: Vec<_> = hits
            .iter()
            .map(|&i| {
                let n = &layout.nodes[i];
                serde_json::json!({
                    "label": n.label,
                    "path": n.id,
                    "category": n.category,
                    "inDegree": n.in_degree,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if hits.is_empty() {
        println!("No files match '{}'", query);
    } else {
        for &i in &hits {
            let n = &layout.nodes[i];
            println!("{:<30} {:<10} {}", n.label, n.category, n.id);
        }
    }
    Ok(())
}

fn run_impact(graph: &CodebaseGraph, changed: &[String], json: bool) -> Result<()> {
    let impacted = detect_impact(graph, changed);

    if json {
        println!("{}", serde_json::to_string_pretty(&impacted)?);
        return Ok(());
    }

    if impacted.is_empty() {
        println!("No files in the graph match the given paths");
        return Ok(());
    }
    for item in &impacted {
        println!("[{}] {:<30} {}", item.level.as_u8(), item.node.label, item.reason);
    }
    Ok(())
}

fn run_heat(root: &Path, window_days: u32, json: bool) -> Result<GitHeat> {
    let heat = compute_heat(root, window_days)
        .with_context(|| format!("Failed to compute git heat for: {}", root.display()))?;

    if let Err(e) = save_json(root, HEAT_CACHE_FILE, &heat) {
        warn(&format!("heat cache write failed: {:#}", e));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&heat)?);
    } else {
        println!(
            "Git heat over {} days at {} (max {} touches):",
            heat.window_days, heat.head, heat.max_score
        );
        let mut hottest: Vec<(&String, &u32)> = heat.scores_by_abs_path.iter().collect();
        hottest.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (path, count) in hottest.into_iter().take(20) {
            println!("  {:>5}  {}", count, path);
        }
    }
    Ok(heat)
}

fn render_svg(graph: &CodebaseGraph, cli: &Cli, heat: Option<&GitHeat>) -> Result<String> {
    let mut view = GraphView::new(graph, cli.width, cli.height)
        .context("Graph failed link resolution")?;
    if let Some(heat) = heat {
        view.apply_heat(&heat.to_scores());
    }
    view.set_color_mode(cli.color_mode);
    let ticks = view.settle(cli.ticks);
    view.fit_to_content();
    info(&format!(
        "layout ran {} ticks ({:?} tier)",
        ticks,
        view.simulation().config.tier
    ));
    Ok(frame_to_svg(&view.render()))
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] atlasic internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    let root = Path::new(&cli.path)
        .canonicalize()
        .with_context(|| format!("Workspace root not found: {}", cli.path))?;

    if cli.clear_cache {
        if clear_cache(&root)? {
            println!("Cache cleared: {}", root.display());
        } else {
            println!("No cache to clear: {}", root.display());
        }
        return Ok(());
    }

    let (options, use_cache, heat_days) = effective_options(&root, &cli);

    // Heat needs no graph unless it feeds the SVG.
    let heat = if cli.heat {
        let heat = run_heat(&root, heat_days, cli.json && cli.svg.is_none())?;
        if cli.svg.is_none() {
            return Ok(());
        }
        Some(heat)
    } else {
        None
    };

    let (graph, source) = load_or_generate(&root, options, use_cache, cli.refresh)?;
    log_event("GRAPH_SOURCE", source.as_str());

    if let Some(query) = &cli.search {
        return run_search(&graph, query, cli.json);
    }

    if !cli.impact.is_empty() {
        return run_impact(&graph, &cli.impact, cli.json);
    }

    if let Some(file) = &cli.svg {
        if cli.color_mode == ColorMode::Heat && heat.is_none() {
            warn("--color-mode heat without --heat: every node scores 0");
        }
        let svg = render_svg(&graph, &cli, heat.as_ref())?;
        write_output(file, &svg, "SVG");
        return Ok(());
    }

    if cli.dot || cli.dot_file.is_some() {
        let dot = generate_dot(&graph);
        match &cli.dot_file {
            Some(file) => write_output(file, &dot, "DOT graph"),
            None => println!("{}", dot),
        }
        return Ok(());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print_summary(&root, &graph, source);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("atlasic_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir.canonicalize().unwrap()
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["atlasic"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    // --- validate_output_path TESTS ---

    #[test]
    fn test_validate_output_path_relative_ok() {
        assert_eq!(
            validate_output_path("out/graph.svg").unwrap(),
            PathBuf::from("out/graph.svg")
        );
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../graph.svg").is_err());
        assert!(validate_output_path("a/../../graph.svg").is_err());
        assert!(validate_output_path("a\\..\\graph.svg").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_absolute_and_null() {
        assert!(validate_output_path("/tmp/graph.svg").is_err());
        assert!(validate_output_path("graph\0.svg").is_err());
        assert!(validate_output_path("   ").is_err());
    }

    // --- argument parsing TESTS ---

    #[test]
    fn test_cli_defaults() {
        let c = cli(&[]);
        assert_eq!(c.path, ".");
        assert_eq!(c.color_mode, ColorMode::Category);
        assert_eq!(c.ticks, 3000);
        assert!(!c.refresh && !c.no_cache);
    }

    #[test]
    fn test_cli_color_mode_and_impact() {
        let c = cli(&["ws", "--color-mode", "in-degree", "--impact", "a.ts", "b.ts"]);
        assert_eq!(c.color_mode, ColorMode::InDegree);
        assert_eq!(c.impact, vec!["a.ts".to_string(), "b.ts".to_string()]);
    }

    // --- option merging TESTS ---

    #[test]
    fn test_effective_options_flags_override_config() {
        let root = create_temp_dir("options");
        create_file(
            &root.join("atlasic.toml"),
            "max_depth = 3\n[cache]\nenabled = true\n[heat]\nwindow_days = 30\n",
        );

        let c = cli(&["--max-depth", "5", "--ignore", "fixtures", "--no-cache"]);
        let (options, use_cache, heat_days) = effective_options(&root, &c);
        assert_eq!(options.max_depth, 5);
        assert!(options.ignore_patterns.iter().any(|p| p == "fixtures"));
        assert!(!use_cache);
        assert_eq!(heat_days, 30);
    }

    #[test]
    fn test_effective_options_bad_config_falls_back() {
        let root = create_temp_dir("badcfg");
        create_file(&root.join("atlasic.toml"), "max_depth = \"deep\"");
        let (options, use_cache, _) = effective_options(&root, &cli(&[]));
        assert_eq!(options, GeneratorOptions::default());
        assert!(use_cache);
    }

    // --- cache fallback TESTS ---

    #[test]
    fn test_load_or_generate_uses_cache_second_time() {
        let root = create_temp_dir("cache");
        create_file(&root.join("src/a.ts"), "import './b';\n");
        create_file(&root.join("src/b.ts"), "");

        let (first, source) =
            load_or_generate(&root, GeneratorOptions::default(), true, false).unwrap();
        assert_eq!(source, GraphSource::Generated);

        let (second, source) =
            load_or_generate(&root, GeneratorOptions::default(), true, false).unwrap();
        assert_eq!(source, GraphSource::Cache);
        assert_eq!(first, second);

        let (_, source) = load_or_generate(&root, GeneratorOptions::default(), true, true).unwrap();
        assert_eq!(source, GraphSource::Generated);
    }

    #[test]
    fn test_load_or_generate_rejects_dangling_cache() {
        let root = create_temp_dir("dangling");
        create_file(&root.join("a.ts"), "");

        let mut bad = CodebaseGraph::empty();
        bad.links.push(atlasic_core::GraphLink::dependency("/x.ts", "/y.ts"));
        save_graph(&root, &bad).unwrap();

        let (graph, source) =
            load_or_generate(&root, GeneratorOptions::default(), true, false).unwrap();
        assert_eq!(source, GraphSource::Generated);
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_corrupt_cache_is_recoverable_miss() {
        let root = create_temp_dir("corrupt");
        create_file(&root.join("a.ts"), "");
        create_file(&graph_cache_path(&root), "{ not a graph");

        assert!(read_cached(&root).unwrap().is_none());
        let (graph, source) =
            load_or_generate(&root, GeneratorOptions::default(), true, false).unwrap();
        assert_eq!(source, GraphSource::Generated);
        assert_eq!(graph.nodes.len(), 1);
        assert!(read_cached(&root).unwrap().is_some());
    }

    #[test]
    fn test_unreadable_cache_is_recoverable_miss() {
        let root = create_temp_dir("unreadable");
        fs::create_dir_all(graph_cache_path(&root)).unwrap();

        let err = read_graph(&root).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.path(), Some(&graph_cache_path(&root)));
        assert!(read_cached(&root).unwrap().is_none());
    }

    #[test]
    fn test_no_cache_writes_nothing() {
        let root = create_temp_dir("nocache");
        create_file(&root.join("a.ts"), "");
        load_or_generate(&root, GeneratorOptions::default(), false, false).unwrap();
        assert!(read_graph(&root).unwrap().is_none());
    }

    #[test]
    fn test_render_svg() {
        let root = create_temp_dir("svg");
        create_file(&root.join("src/a.ts"), "import './b';\n");
        create_file(&root.join("src/b.ts"), "");
        let (graph, _) = load_or_generate(&root, GeneratorOptions::default(), false, false).unwrap();

        let c = cli(&["--width", "400", "--height", "300", "--ticks", "500"]);
        let svg = render_svg(&graph, &c, None).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }
}
