use std::path::PathBuf;

use clap::Parser;
use kernel_options_core::{Arch, validate_registry};
use kernel_options_ingest::config::{DEFAULT_SOURCE_TREE, RegistryConfig};
use kernel_options_ingest::corpus::{DirectoryCorpus, ManCorpus, NoCorpus};
use kernel_options_ingest::orchestrate::build_registry;
use kernel_options_ingest::output::{OutputFormat, format_snapshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kernel-options")]
#[command(
    about = "Build one registry of kernel options from definition files, NOTES and manual pages"
)]
struct Cli {
    /// Paths to top-level directories of kernel source trees.
    #[arg(default_value = DEFAULT_SOURCE_TREE)]
    src: Vec<PathBuf>,
    /// Release label reported with the registry.
    #[arg(long)]
    ver: Option<String>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Comma-separated architectures to scan (default: all recognized).
    #[arg(long)]
    arch: Option<String>,
    /// Manual page directory to scan.
    #[arg(long)]
    man_dir: Option<PathBuf>,
    /// Skip the manual page scan.
    #[arg(long)]
    no_man: bool,
    /// Output format.
    #[arg(long, default_value = "tsv")]
    format: OutputFormat,
    /// Print a build summary to stderr.
    #[arg(long)]
    summary: bool,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => RegistryConfig::load(path).map_err(|err| err.to_string())?,
        None => RegistryConfig::default(),
    };
    if let Some(ver) = cli.ver {
        config.release = ver;
    }
    if let Some(arches) = cli.arch {
        config.architectures = parse_arch_list(&arches)?;
    }
    if let Some(man_dir) = cli.man_dir {
        config.man_dir = man_dir;
    }

    let directory_corpus = DirectoryCorpus::new(config.man_dir.clone());
    let corpus: &dyn ManCorpus = if cli.no_man {
        &NoCorpus
    } else {
        &directory_corpus
    };

    let mut outcome = build_registry(cli.src.as_slice(), &config, corpus);
    let collapsed = outcome.registry.collapse_all();
    info!(collapsed, "Collapsed identical per-architecture attributions");

    for error in validate_registry(&outcome.registry) {
        warn!(%error, "Registry validation");
    }

    let snapshot = kernel_options_ingest::snapshot(&outcome, &config.release);
    print!("{}", format_snapshot(&snapshot, cli.format)?);

    if cli.summary {
        eprintln!("{} option(s) in registry", outcome.registry.len());
        for line in outcome.report.summary_lines() {
            eprintln!("{line}");
        }
    }

    Ok(())
}

fn parse_arch_list(raw: &str) -> Result<Vec<Arch>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Arch>().map_err(|err| err.to_string()))
        .collect()
}
