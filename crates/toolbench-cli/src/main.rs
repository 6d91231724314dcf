//! toolbench - toolchain validation and CI benchmark harness
//!
//! ## Commands
//!
//! - `validate`: probe build, lint and test tools and report what works
//! - `benchmark`: time a project's lint/format/build/test operations
//! - `measure-performance`: benchmark, merge into a metrics snapshot, and
//!   optionally compare against a baseline and sample CI run history

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};

use toolbench_core::obs::SweepSpan;
use toolbench_core::snapshot::{benchmark_document, merge_into_file};
use toolbench_core::report::format_secs;
use toolbench_core::{
    compare, metric_changes, render, save_benchmark_report, BenchmarkMetric,
    BenchmarkReport, CategoryResult, MetricsSnapshot, ProbeResult, ProjectType, Report,
    ReportFormat, RunSample, METRICS,
};
use toolbench_runner::config::DEFAULT_RUNS;
use toolbench_runner::{
    cicd, prereq, project, BenchOperation, BenchmarkEngine, BenchmarkObserver, Catalog,
    CategoryGroup, CategoryRunner, HarnessConfig, ProbeObserver, QuietObserver, Selection,
    SilentObserver,
};

const DEFAULT_METRICS_FILE: &str = "performance-metrics.json";

#[derive(Parser)]
#[command(name = "toolbench")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Toolchain validation and CI benchmark harness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that toolchain tools are installed and working
    Validate {
        /// Run a single category by name
        #[arg(long, conflicts_with_all = ["system_only", "cpp_only", "python_only"])]
        category: Option<String>,

        /// Only system tool categories
        #[arg(long, conflicts_with_all = ["cpp_only", "python_only"])]
        system_only: bool,

        /// Only C++ categories
        #[arg(long, conflicts_with = "python_only")]
        cpp_only: bool,

        /// Only Python categories
        #[arg(long)]
        python_only: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Time a project's lint, format, build and test operations
    Benchmark {
        /// Project directory
        project_dir: PathBuf,

        /// Override project type detection (cpp, python)
        #[arg(long)]
        project_type: Option<ProjectType>,

        /// Save the rendered report to the output directory
        #[arg(long)]
        save: bool,

        /// Directory for saved reports
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        bench: BenchArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Benchmark a project and merge results into a metrics snapshot
    MeasurePerformance {
        /// Project directory
        project_dir: PathBuf,

        /// Snapshot file (default: <project-dir>/performance-metrics.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Baseline snapshot to compare against
        #[arg(long)]
        compare: Option<PathBuf>,

        /// Also sample CI run history via the `gh` CLI
        #[arg(long)]
        cicd: bool,

        /// Number of CI runs to sample
        #[arg(long, default_value_t = toolbench_runner::cicd::DEFAULT_RUN_LIMIT)]
        cicd_limit: usize,

        /// Override project type detection (cpp, python)
        #[arg(long)]
        project_type: Option<ProjectType>,

        #[command(flatten)]
        bench: BenchArgs,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Output format: table, json or csv
    #[arg(long, env = "TOOLBENCH_FORMAT", default_value = "table")]
    format: ReportFormat,

    /// Per-command timeout in seconds (0 = none)
    #[arg(long, env = "TOOLBENCH_TIMEOUT_SECS", default_value_t = 0)]
    timeout_secs: u64,
}

#[derive(Args)]
struct BenchArgs {
    /// Timed runs per operation
    #[arg(long, env = "TOOLBENCH_RUNS", default_value_t = DEFAULT_RUNS, value_parser = parse_runs)]
    runs: usize,
}

fn parse_runs(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl CommonArgs {
    fn config(&self) -> HarnessConfig {
        HarnessConfig {
            timeout_secs: self.timeout_secs,
            format: self.format,
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    toolbench_core::init_tracing(cli.json, level);
    debug!(version = toolbench_core::VERSION, "toolbench starting");

    let outcome = run(cli.command).await;
    METRICS.flush();

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Validate {
            category,
            system_only,
            cpp_only,
            python_only,
            common,
        } => {
            let selection = match (category, system_only, cpp_only, python_only) {
                (Some(name), ..) => Selection::Named(name),
                (None, true, _, _) => Selection::Group(CategoryGroup::System),
                (None, _, true, _) => Selection::Group(CategoryGroup::Cpp),
                (None, _, _, true) => Selection::Group(CategoryGroup::Python),
                _ => Selection::All,
            };
            let _span = SweepSpan::enter("validate", &format!("{selection:?}"));
            cmd_validate(&common.config(), &selection).await
        }
        Commands::Benchmark {
            project_dir,
            project_type,
            save,
            out_dir,
            bench,
            common,
        } => {
            let config = HarnessConfig {
                runs: bench.runs,
                output_dir: out_dir,
                ..common.config()
            };
            let _span = SweepSpan::enter("benchmark", &project_dir.display().to_string());
            cmd_benchmark(&config, &project_dir, project_type, save).await
        }
        Commands::MeasurePerformance {
            project_dir,
            output,
            compare,
            cicd,
            cicd_limit,
            project_type,
            bench,
            common,
        } => {
            let config = HarnessConfig {
                runs: bench.runs,
                cicd_limit,
                ..common.config()
            };
            let _span =
                SweepSpan::enter("measure-performance", &project_dir.display().to_string());
            cmd_measure_performance(
                &config,
                &project_dir,
                project_type,
                output,
                compare.as_deref(),
                cicd,
            )
            .await
        }
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Prints one line per probe as it finishes.
struct ConsoleProbes;

impl ProbeObserver for ConsoleProbes {
    fn category_started(&mut self, category: &str) {
        println!();
        println!("{category}");
    }

    fn probe_finished(&mut self, _category: &str, result: &ProbeResult) {
        match &result.error {
            None => println!("  ✓ {:<20} {}", result.name, result.headline()),
            Some(err) => println!("  ✗ {:<20} {}", result.name, err),
        }
    }

    fn category_finished(&mut self, result: &CategoryResult) {
        if let Some(reason) = &result.skip_reason {
            println!();
            println!("{} (skipped: {reason})", result.name);
        }
    }
}

async fn cmd_validate(config: &HarnessConfig, selection: &Selection) -> Result<i32> {
    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let catalog = Catalog::new(config.platform(), scratch.path());

    let categories = catalog.select(selection);
    if categories.is_empty() {
        match selection {
            Selection::Named(name) => bail!("Unknown validation category: {name}"),
            _ => bail!("No validation categories selected"),
        }
    }
    if categories.iter().any(|c| c.group == CategoryGroup::Cpp) {
        catalog
            .prepare_fixtures()
            .context("Failed to write C++ build fixture")?;
    }

    let runner = CategoryRunner::new(config.timeout());
    let run = if config.format == ReportFormat::Table {
        println!(
            "Validating toolchain ({} categories, platform: {})",
            categories.len(),
            config.platform().name
        );
        let run = runner.run_all(&categories, &mut ConsoleProbes).await;
        println!();
        run
    } else {
        runner.run_all(&categories, &mut SilentObserver).await
    };
    info!(run_id = %run.run_id, overall_passed = run.overall_passed, "Validation finished");

    print!("{}", render(Report::Validation(&run), config.format)?);
    Ok(run.exit_code())
}

// ---------------------------------------------------------------------------
// benchmark
// ---------------------------------------------------------------------------

/// Prints per-run timings as they are measured.
struct ConsoleRuns;

impl BenchmarkObserver for ConsoleRuns {
    fn operation_started(&mut self, operation: &str, run_count: usize) {
        println!("▶ {operation} ({run_count} runs)");
    }

    fn run_finished(&mut self, _operation: &str, run: usize, sample: &RunSample) {
        let secs = format_secs(sample.duration_secs);
        if sample.success {
            println!("  run {run}: {secs}");
        } else {
            match sample.exit_code {
                Some(code) => println!("  run {run}: {secs} (failed, exit code {code})"),
                None => println!("  run {run}: {secs} (failed to run)"),
            }
        }
    }

    fn operation_finished(&mut self, metric: &BenchmarkMetric) {
        println!(
            "  average {} → {}",
            format_secs(metric.average),
            metric.status
        );
    }
}

async fn run_benchmarks(
    config: &HarnessConfig,
    project_dir: &Path,
    project_type: Option<ProjectType>,
) -> Result<BenchmarkReport> {
    let project = project::resolve(project_dir, project_type)
        .with_context(|| format!("Cannot benchmark {}", project_dir.display()))?;
    let operations = project::default_operations(&project, config.timeout_secs);
    let ops: Vec<&dyn BenchOperation> = operations
        .iter()
        .map(|op| op as &dyn BenchOperation)
        .collect();

    if ops.is_empty() {
        warn!(project_type = project.project_type.as_str(), "No operations to benchmark");
    }

    let report = if config.format == ReportFormat::Table {
        println!(
            "Benchmarking {} ({}) with {} run(s) per operation",
            project.name,
            project.project_type.as_str(),
            config.runs
        );
        if ops.is_empty() {
            println!("No operations defined for project type '{}'", project.project_type.as_str());
        }
        println!();
        let report = BenchmarkEngine::run_suite(project, &ops, config.runs, &mut ConsoleRuns).await;
        println!();
        report
    } else {
        BenchmarkEngine::run_suite(project, &ops, config.runs, &mut QuietObserver).await
    };
    Ok(report)
}

async fn cmd_benchmark(
    config: &HarnessConfig,
    project_dir: &Path,
    project_type: Option<ProjectType>,
    save: bool,
) -> Result<i32> {
    let report = run_benchmarks(config, project_dir, project_type).await?;
    print!("{}", render(Report::Benchmark(&report), config.format)?);

    if save {
        let path = save_benchmark_report(&config.output_dir, &report, config.format)
            .context("Failed to save benchmark report")?;
        println!("Saved report to {}", path.display());
    }
    Ok(0)
}

// ---------------------------------------------------------------------------
// measure-performance
// ---------------------------------------------------------------------------

async fn cmd_measure_performance(
    config: &HarnessConfig,
    project_dir: &Path,
    project_type: Option<ProjectType>,
    output: Option<PathBuf>,
    baseline_path: Option<&Path>,
    with_cicd: bool,
) -> Result<i32> {
    let text = measure_performance(
        config,
        project_dir,
        project_type,
        output,
        baseline_path,
        with_cicd,
    )
    .await?;
    print!("{text}");
    Ok(0)
}

/// Benchmark, merge into the snapshot file, and return what the command
/// prints.
async fn measure_performance(
    config: &HarnessConfig,
    project_dir: &Path,
    project_type: Option<ProjectType>,
    output: Option<PathBuf>,
    baseline_path: Option<&Path>,
    with_cicd: bool,
) -> Result<String> {
    // prerequisites and inputs are checked before anything is timed
    prereq::require_dir(project_dir)?;
    if with_cicd {
        prereq::require_tool("gh", config.platform(), config.tool_dirs.as_deref())?;
    }
    let baseline = baseline_path
        .map(|p| {
            MetricsSnapshot::load(p)
                .with_context(|| format!("Failed to load baseline {}", p.display()))
        })
        .transpose()?;

    let report = run_benchmarks(config, project_dir, project_type).await?;
    let output = output.unwrap_or_else(|| report.project.path.join(DEFAULT_METRICS_FILE));

    merge_into_file(&output, benchmark_document(&report))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut text = String::new();
    if with_cicd {
        match cicd::collect(&report.project.path, config.cicd_limit, config.timeout()).await {
            Ok(summary) => {
                merge_into_file(&output, summary.to_document()?)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
            }
            Err(e) => {
                warn!(error = %e, "CI metrics unavailable");
                if config.format == ReportFormat::Table {
                    text.push_str(&format!("CI metrics unavailable: {e}\n"));
                }
            }
        }
    }

    let snapshot = MetricsSnapshot::load(&output)?;
    text.push_str(&render_measurement(
        &snapshot,
        baseline.as_ref(),
        &output,
        config.format,
    )?);
    Ok(text)
}

fn render_measurement(
    snapshot: &MetricsSnapshot,
    baseline: Option<&MetricsSnapshot>,
    output: &Path,
    format: ReportFormat,
) -> Result<String> {
    let mut text = String::new();

    let Some(baseline) = baseline else {
        text.push_str(&render(Report::Snapshot(snapshot), format)?);
        if format == ReportFormat::Table {
            text.push_str(&format!("Metrics written to {}\n", output.display()));
        }
        return Ok(text);
    };

    let rows = compare(snapshot, baseline);
    let changes = metric_changes(snapshot, baseline);

    match format {
        ReportFormat::Json => {
            let combined = json!({
                "snapshot": snapshot,
                "comparison": rows,
                "added": changes.added,
                "removed": changes.removed,
            });
            text.push_str(&serde_json::to_string_pretty(&combined)?);
            text.push('\n');
        }
        ReportFormat::Csv => {
            text.push_str(&render(Report::Snapshot(snapshot), format)?);
            // comparison rows share the snapshot header
            let comparison = render(Report::Comparison(&rows), format)?;
            for line in comparison.lines().skip(1) {
                text.push_str(line);
                text.push('\n');
            }
        }
        ReportFormat::Table => {
            text.push_str(&render(Report::Snapshot(snapshot), format)?);
            text.push_str(&format!("Metrics written to {}\n\n", output.display()));
            text.push_str(&format!("Comparison against {}\n", snapshot_label(baseline)));
            text.push_str(&render(Report::Comparison(&rows), format)?);
            for key in &changes.added {
                text.push_str(&format!("  + {key} (new, no baseline)\n"));
            }
            for key in &changes.removed {
                text.push_str(&format!("  - {key} (missing from current run)\n"));
            }
        }
    }
    Ok(text)
}

fn snapshot_label(snapshot: &MetricsSnapshot) -> String {
    match snapshot.timestamp {
        Some(ts) => format!("{} @ {}", snapshot.project_name, ts.to_rfc3339()),
        None => snapshot.project_name.clone(),
    }
}
