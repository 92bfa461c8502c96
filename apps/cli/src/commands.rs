//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ansible_data_core::assembler;
use ansible_data_core::extractor::SkipReason;
use ansible_data_core::pipeline::{self, BuildResult, ProgressReporter};
use ansible_data_discovery::{FsEcosystem, YamlDocParser};
use ansible_data_shared::{AppConfig, BuildConfig, init_config, load_config, load_config_from};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ansible-data — build the module/directive/lookup dataset for editor completion.
#[derive(Parser)]
#[command(
    name = "ansible-data",
    version,
    about = "Build the Ansible module, directive and lookup plugin dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.ansible-data/ansible-data.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rebuild the dataset from the installed plugins.
    Build,

    /// Check an existing dataset file.
    Validate {
        /// Dataset path (defaults to the configured output path).
        path: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ansible_data=info",
        1 => "ansible_data=debug",
        _ => "ansible_data=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => cmd_build(&config),
        Command::Validate { path } => cmd_validate(&config, path.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(eyre!("config file '{}' does not exist", path.display()));
            }
            Ok(load_config_from(path)?)
        }
        None => Ok(load_config()?),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(config: &AppConfig) -> Result<()> {
    let build_config = BuildConfig::from(config);
    let ecosystem = FsEcosystem::from_config(&build_config);

    info!(
        module_roots = build_config.module_paths.len(),
        lookup_roots = build_config.lookup_paths.len(),
        output = %build_config.output_path.display(),
        "building dataset"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build_dataset(&ecosystem, &YamlDocParser, &build_config, &reporter)?;

    let mut skipped_by_reason: BTreeMap<String, usize> = BTreeMap::new();
    for skipped in &result.skipped {
        let reason = match &skipped.reason {
            SkipReason::InvalidDoc(_) => "invalid doc".to_string(),
            other => other.to_string(),
        };
        *skipped_by_reason.entry(reason).or_default() += 1;
    }

    // Print summary
    println!();
    println!("  Dataset written!");
    println!("  Modules:    {}", result.module_count);
    println!("  Skipped:    {}", result.skipped.len());
    for (reason, count) in &skipped_by_reason {
        println!("    {reason}: {count}");
    }
    println!("  Directives: {}", result.directive_count);
    println!("  Lookups:    {}", result.lookup_plugin_count);
    println!("  Path:       {}", result.output_path.display());
    println!("  SHA-256:    {}", result.sha256);
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_validate(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => BuildConfig::from(config).output_path,
    };

    if !path.exists() {
        return Err(eyre!(
            "no dataset found at '{}' — run `ansible-data build` first",
            path.display()
        ));
    }

    let summary = assembler::validate_dataset(&path)?;
    println!(
        "{} is valid: {} modules, {} directives, {} lookup plugins",
        path.display(),
        summary.module_count,
        summary.directive_count,
        summary.lookup_plugin_count
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn module_extracted(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Documenting [{current}/{total}] {name}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_build() {
        let cli = Cli::try_parse_from(["ansible-data"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli =
            Cli::try_parse_from(["ansible-data", "validate", "out.json", "-vv", "--log-format", "json"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        match cli.command {
            Some(Command::Validate { path }) => assert_eq!(path, Some(PathBuf::from("out.json"))),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = resolve_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
