//! render-tester - host for the infogl OpenGL/Vulkan rendering test engine
//!
//! Loads the engine module, turns typed test settings into the engine's
//! payload, runs the tests one at a time and reports the results.
//!
//! ## Usage
//!
//! ```bash
//! # Run one test
//! render-tester run --renderer gl4.5 --scene many-cubes --duration 10
//!
//! # Run a suite and keep the results
//! render-tester suite vulkan-vs-opengl --save
//!
//! # Inspect the payload without loading the engine
//! render-tester payload --renderer vk1.2 --fullscreen
//!
//! # Stored results
//! render-tester results list
//! render-tester results show <run-id> --report markdown
//! ```

use anyhow::{anyhow, Context as _, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod cli;
mod config;
mod engine;
mod executor;
mod models;
mod output;
mod payload;
mod results;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig, SuiteRegistry};
use engine::{EngineLoader, ModuleLoader};
use executor::{ProgressFn, TestRunner};
use models::{RendererType, SceneType, TestResult, TestRunSummary};
use output::{OutputFormat, ResultFormatter};
use payload::PayloadSerializer;
use results::{ExportFormat, ReportFormat, ReportGenerator, ResultsStorage, StoredRun};
use utils::logger::{init_logger, LogLevel};
use utils::timer::{format_secs, Timer};

/// Suite name under which single `run` results are stored
const ADHOC_SUITE: &str = "adhoc";

/// Resolved configuration shared by every command
struct Context {
    file: ConfigFile,
    source: Option<PathBuf>,
    app: AppConfig,
    env: EnvConfig,
}

impl Context {
    fn load(config_arg: Option<&str>) -> Result<Self> {
        let env = EnvConfig::load();
        let path = config_arg
            .map(PathBuf::from)
            .or_else(|| env.config_file.as_deref().map(config::expand_path));

        let (file, source) = ConfigFile::resolve(path.as_deref())?;
        let mut app = file.app.clone();
        app.apply_env(&env);

        Ok(Self {
            file,
            source,
            app,
            env,
        })
    }

    fn formatter(&self, format: Option<&str>) -> ResultFormatter {
        let name = format.unwrap_or(&self.app.output_format);
        let format = OutputFormat::from_str(name).unwrap_or_else(|| {
            warn!("Unknown output format {name}, using table");
            OutputFormat::Table
        });
        ResultFormatter::new(format)
    }

    fn runner(&self) -> TestRunner<ModuleLoader> {
        TestRunner::new(self.app.module_loader())
            .with_resource_path(self.app.resource_path())
            .with_display_modes(self.app.display_modes())
    }

    fn storage(&self) -> ResultsStorage {
        ResultsStorage::at(self.app.results_dir())
    }

    fn suites(&self) -> SuiteRegistry {
        SuiteRegistry::with_suites(self.file.suites.clone())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let ctx = Context::load(args.config.as_deref())?;

    init_logger(LogLevel::resolve(args.verbose, &ctx.app.log_level));
    if let Some(path) = &ctx.source {
        info!("Using configuration {}", path.display());
    }

    match args.command {
        cli::Command::Run(run_args) => run_test(run_args, &ctx)?,
        cli::Command::Suite(suite_args) => run_suite(suite_args, &ctx)?,
        cli::Command::Payload(test_args) => print_payload(test_args, &ctx)?,
        cli::Command::List(list_args) => list(list_args, &ctx),
        cli::Command::Cpu { format } => show_cpu(format.as_deref(), &ctx)?,
        cli::Command::Results(results_args) => manage_results(results_args, &ctx)?,
        cli::Command::Config(config_args) => manage_config(config_args, &ctx)?,
    }

    Ok(())
}

fn run_test(args: cli::RunArgs, ctx: &Context) -> Result<()> {
    let mut test_args = args.test;
    test_args.duration = test_args.duration.or(ctx.env.duration);
    let config = test_args.build()?;

    let formatter = ctx.formatter(args.format.as_deref());
    let mut runner = ctx.runner();
    let label = config.describe();
    let started_at = Utc::now();

    let results = if args.detailed {
        runner.run_one_detailed(&config)
    } else {
        vec![runner.run_one(&config)]
    };

    if let Some(e) = runner.last_error() {
        warn!("Engine setup failed: {e}");
    }

    if args.detailed {
        let labels: Vec<String> = (0..results.len())
            .map(|i| format!("{label} #{}", i + 1))
            .collect();
        let summary = TestRunSummary::new(label.clone(), results.clone());
        println!("{}", formatter.format_summary(&summary, &labels));
    } else {
        for result in &results {
            println!("{}", formatter.format_result(&label, result));
        }
    }

    if args.save {
        let mut run = StoredRun::new(ADHOC_SUITE, runner.cpu_specification())
            .with_started_at(started_at)
            .with_engine(ctx.app.module_loader().describe());
        for result in &results {
            run.add_entry(label.clone(), &config, result);
        }
        run.calculate_aggregate();
        let path = ctx.storage().save(&run)?;
        println!("\n✓ Saved run {} to {}", run.id, path.display());
    }

    Ok(())
}

fn run_suite(args: cli::SuiteArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.suites();
    let mut suite = registry.get(&args.name).cloned().ok_or_else(|| {
        anyhow!(
            "Unknown suite: {}. Available: {}",
            args.name,
            registry.names().join(", ")
        )
    })?;
    if let Some(secs) = args.duration.or(ctx.env.duration) {
        suite = suite.with_duration(secs);
    }

    let configs = suite.configs();
    let labels = suite.labels();
    let formatter = ctx.formatter(args.format.as_deref());
    let report_format = match args.report.as_deref() {
        Some(name) => Some(
            ReportFormat::from_str(name).ok_or_else(|| anyhow!("Unknown report format: {name}"))?,
        ),
        None => None,
    };

    let estimated: u64 = configs.iter().map(|c| u64::from(c.duration_secs)).sum();
    println!(
        "\nSuite {} ({} tests, about {} of rendering)",
        suite.name,
        configs.len(),
        format_secs(estimated)
    );
    if !suite.description.is_empty() {
        println!("{}", suite.description);
    }
    println!();

    let mut runner = ctx.runner();
    let started_at = Utc::now();
    let timer = Timer::start(format!("suite {}", suite.name));
    let progress: ProgressFn<'_> = &mut |done, total, result: &TestResult| {
        let label = labels.get(done - 1).map(String::as_str).unwrap_or("-");
        println!("[{done}/{total}] {label}: {result}");
    };
    let results = runner.run_many(&configs, Some(progress));
    let elapsed = timer.stop();

    if let Some(e) = runner.last_error() {
        warn!("Engine setup failed: {e}");
    }

    let summary = TestRunSummary::new(suite.name.clone(), results.clone());
    println!("\n{}", formatter.format_summary(&summary, &labels));
    println!("Wall time: {}", format_secs(elapsed.as_secs()));
    if summary.is_all_passed() {
        println!("✓ All {} tests passed", summary.total);
    }

    if let Some(path) = &args.output {
        output::write_results_to_file(path, &summary, &labels, formatter.format())
            .with_context(|| format!("Failed to write results to {path}"))?;
        println!("✓ Results written to: {path}");
    }

    let mut run = StoredRun::new(&suite.name, runner.cpu_specification())
        .with_started_at(started_at)
        .with_engine(ctx.app.module_loader().describe());
    for ((label, config), result) in labels.iter().zip(&configs).zip(&results) {
        run.add_entry(label.clone(), config, result);
    }
    run.calculate_aggregate();

    if let Some(format) = report_format {
        println!("{}", ReportGenerator::run_report(&run, format));
    }

    if args.save {
        let path = ctx.storage().save(&run)?;
        println!("✓ Saved run {} to {}", run.id, path.display());
    }

    Ok(())
}

fn print_payload(args: cli::TestConfigArgs, ctx: &Context) -> Result<()> {
    let config = args.build()?;
    let modes = ctx.app.display_modes();
    let payload = PayloadSerializer::new(&*modes).serialize(&config);
    print!("{payload}");
    Ok(())
}

fn list(args: cli::ListArgs, ctx: &Context) {
    let all = args.show_all();

    if all || args.renderers {
        println!("\nRenderers\n");
        println!("  {:<8} {:<14} {:>3}", "Key", "Name", "ID");
        println!("  {:─<28}", "");
        for renderer in RendererType::all() {
            println!(
                "  {:<8} {:<14} {:>3}",
                renderer.key(),
                renderer.name(),
                renderer.engine_id()
            );
        }
    }

    if all || args.scenes {
        println!("\nScenes\n");
        println!("  {:<16} {:<16} {:>3}", "Key", "Name", "ID");
        println!("  {:─<37}", "");
        for scene in SceneType::all() {
            println!(
                "  {:<16} {:<16} {:>3}",
                scene.key(),
                scene.name(),
                scene.engine_id()
            );
        }
    }

    if all || args.suites {
        println!("\nSuites\n");
        for suite in ctx.suites().list() {
            println!(
                "  {:<20} {:>2} tests  {}",
                suite.name,
                suite.entries.len(),
                suite.description
            );
            if args.detailed {
                for entry in &suite.entries {
                    println!("      - {:<22} {}", entry.label, entry.config.describe());
                }
            }
        }
    }
    println!();
}

fn show_cpu(format: Option<&str>, ctx: &Context) -> Result<()> {
    let mut runner = ctx.runner();
    runner.initialize()?;

    let cpu = runner
        .cpu_info()
        .ok_or_else(|| anyhow!("Engine reported no processor information"))?;
    println!("{}", ctx.formatter(format).format_cpu(cpu));
    Ok(())
}

fn manage_results(args: cli::ResultsArgs, ctx: &Context) -> Result<()> {
    let storage = ctx.storage();

    match args.action {
        cli::ResultsAction::List { suite, format } => {
            let suites = match suite {
                Some(suite) => vec![suite],
                None => storage.list_suites()?,
            };

            let mut runs = Vec::new();
            for suite in &suites {
                runs.extend(storage.list_runs(suite)?);
            }

            if runs.is_empty() {
                println!("\n📭 No stored results found in {}", storage.base_dir().display());
                println!("   Run a suite with: render-tester suite <name> --save");
                return Ok(());
            }

            println!("{}", ctx.formatter(format.as_deref()).format_runs(&runs));
        }

        cli::ResultsAction::Show { id, report } => {
            let format = ReportFormat::from_str(&report)
                .ok_or_else(|| anyhow!("Unknown report format: {report}"))?;
            let run = storage
                .find(&id)?
                .ok_or_else(|| anyhow!("Run not found: {id}"))?;
            println!("{}", ReportGenerator::run_report(&run, format));
        }

        cli::ResultsAction::Latest { suite, report } => {
            let format = ReportFormat::from_str(&report)
                .ok_or_else(|| anyhow!("Unknown report format: {report}"))?;
            match storage.latest(&suite)? {
                Some(run) => println!("{}", ReportGenerator::run_report(&run, format)),
                None => println!("No stored runs for suite: {suite}"),
            }
        }

        cli::ResultsAction::Export { id, path, format } => {
            let path = Path::new(&path);
            let format = match format {
                Some(name) => ExportFormat::from_str(&name)
                    .ok_or_else(|| anyhow!("Unknown export format: {name}"))?,
                None => ExportFormat::from_extension(path).unwrap_or(ExportFormat::Json),
            };
            let run = storage
                .find(&id)?
                .ok_or_else(|| anyhow!("Run not found: {id}"))?;
            storage.export(&run, path, format)?;
            println!("✓ Exported run {} to {}", run.id, path.display());
        }

        cli::ResultsAction::Delete { suite, id } => match id {
            Some(id) => {
                if storage.delete(&suite, &id)? {
                    println!("✓ Deleted run {id}");
                } else {
                    println!("Run not found: {suite}/{id}");
                }
            }
            None => {
                storage.delete_suite(&suite)?;
                println!("✓ Deleted all runs of suite {suite}");
            }
        },
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, ctx: &Context) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                if !ctx.env.has_any() {
                    println!("No {}_* variables set.\n", config::ENV_PREFIX);
                }
                ctx.env.print_summary();
            } else {
                let effective = ConfigFile {
                    app: ctx.app.clone(),
                    ..ctx.file.clone()
                };
                let output = if format == "json" {
                    serde_json::to_string_pretty(&effective)?
                } else {
                    serde_yaml::to_string(&effective)?
                };
                match &ctx.source {
                    Some(path) => println!("# Source: {}", path.display()),
                    None => println!("# Source: built-in defaults"),
                }
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .map(PathBuf::from)
                .or_else(|| ctx.source.clone())
                .ok_or_else(|| anyhow!("No configuration file found"))?;

            match ConfigFile::load(&path) {
                Ok(config) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                    println!("  {} suite(s) defined", config.suites.len());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Schema => {
            println!("{}", ConfigFile::json_schema()?);
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}
