//! health-export-parser CLI
//!
//! - `process`: split an export into categorized files
//! - `config`: print a default config file
//! - `version`: print build information

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use health_export_parser::config::{generate_default_config, split_list, Config, LoggingConfig};
use health_export_parser::logging::{self, LogSettings};
use health_export_parser::{HealthExporter, ProcessOptions, RunReport, VersionInfo};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "health-export-parser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split a Health Auto Export JSON file into categorized files")]
#[command(long_about = "Splits a Health Auto Export JSON document into per-metric, per-workout and\nper-mood files with precomputed summaries, a manifest, and optional import batches.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output: stderr, a directory ending in "/", or a file
    #[arg(long, global = true)]
    pub log_output: Option<String>,
}

impl GlobalArgs {
    fn apply(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split an export file into the export directory
    Process(ProcessArgs),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show build information
    Version,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Health Auto Export JSON file
    #[arg(short, long)]
    pub source: PathBuf,

    /// Export directory
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Collections attached to imported memories (comma-separated)
    #[arg(short, long)]
    pub collections: Option<String>,

    /// Workouts per import batch
    #[arg(long)]
    pub batch_size_workouts: Option<usize>,

    /// State of mind entries per import batch
    #[arg(long)]
    pub batch_size_som: Option<usize>,

    /// Metrics per import batch
    #[arg(long)]
    pub batch_size_metrics: Option<usize>,

    /// Also write import/import.sh
    #[arg(long)]
    pub generate_import_script: bool,

    /// Importer binary called by import.sh
    #[arg(long)]
    pub memory_binary: Option<String>,

    /// Skip import batch generation
    #[arg(long)]
    pub no_import_batches: bool,
}

impl ProcessArgs {
    /// Layer these flags over the resolved config
    fn into_options(self, config: &Config) -> ProcessOptions {
        let mut options = config.process_options(self.source);

        if let Some(dir) = self.export {
            options.export_dir = dir;
        }
        if let Some(raw) = self.collections {
            options.collections = split_list(&raw);
        }
        if let Some(size) = self.batch_size_workouts {
            options.batch_sizes.workouts = size;
        }
        if let Some(size) = self.batch_size_som {
            options.batch_sizes.state_of_mind = size;
        }
        if let Some(size) = self.batch_size_metrics {
            options.batch_sizes.metrics = size;
        }
        if self.generate_import_script {
            options.generate_import_script = true;
        }
        if let Some(binary) = self.memory_binary {
            options.memory_binary = binary;
        }
        if self.no_import_batches {
            options.import_batches = false;
        }

        options
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        tracing::error!(error = %format!("{err:#}"), "Run failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Process(args) => process(&cli.global, args),
        Commands::Config { output } => write_config(output.as_deref()),
        Commands::Version => {
            println!("{}", VersionInfo::current());
            Ok(())
        }
    }
}

fn process(global: &GlobalArgs, args: ProcessArgs) -> anyhow::Result<()> {
    let mut resolved =
        Config::resolve(global.config.as_deref()).context("Failed to load configuration")?;
    global.apply(&mut resolved.config.logging);

    let settings = LogSettings::from_config(&resolved.config.logging)?;
    logging::init(&settings)?;
    resolved.log();

    let config = resolved.config;
    tracing::debug!(?config, "Resolved configuration");

    let options = args.into_options(&config);
    let report = HealthExporter::new(options)?
        .run()
        .context("Failed to process health export")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let manifest = &report.manifest;

    println!("Export complete ({})", report.trace_id);
    println!("  Metrics:        {}", manifest.metrics.len());
    println!("  Workouts:       {}", manifest.workouts.len());
    println!("  State of mind:  {}", manifest.state_of_mind.len());
    println!("  Manifest:       {}", report.manifest_path.display());

    if let Some(batches) = &report.batches {
        println!(
            "  Import batches: {} ({} records)",
            batches.total_batches(),
            batches.total_records
        );
    }
}

fn write_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = generate_default_config();

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "health-export-parser",
            "--log-format",
            "json",
            "process",
            "-s",
            "export.json",
            "-e",
            "out",
            "-c",
            "health, fitness",
            "--batch-size-som",
            "3",
            "--no-import-batches",
        ]);

        let mut config = Config::default();
        config.import.batch_size_metrics = 7;
        cli.global.apply(&mut config.logging);
        assert_eq!(config.logging.format, "json");

        let Commands::Process(args) = cli.command else {
            panic!("expected process subcommand");
        };
        let options = args.into_options(&config);

        assert_eq!(options.source, PathBuf::from("export.json"));
        assert_eq!(options.export_dir, PathBuf::from("out"));
        assert_eq!(options.collections, vec!["health", "fitness"]);
        assert_eq!(options.batch_sizes.state_of_mind, 3);
        assert_eq!(options.batch_sizes.metrics, 7);
        assert_eq!(options.batch_sizes.workouts, 20);
        assert!(!options.import_batches);
        assert!(!options.generate_import_script);
    }

    #[test]
    fn test_config_values_survive_without_flags() {
        let cli = Cli::parse_from(["health-export-parser", "process", "--source", "in.json"]);

        let mut config = Config::default();
        config.import.generate_script = true;
        config.import.memory_binary = "/opt/memory".to_string();

        let Commands::Process(args) = cli.command else {
            panic!("expected process subcommand");
        };
        let options = args.into_options(&config);

        assert!(options.generate_import_script);
        assert!(options.import_batches);
        assert_eq!(options.memory_binary, "/opt/memory");
        assert_eq!(options.export_dir, PathBuf::from("exports"));
    }
}
