//! patchbay - check and plan cabling for an audio/MIDI rig
//!
//! Subcommands:
//! - `patchbay check <network>` - Evaluate every declared connection
//! - `patchbay recommend <a> <b>` - Suggest cables between two catalog devices
//! - `patchbay route <network> <instance>` - Show where an instance's audio goes
//! - `patchbay config` - Print the effective configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use patchbay::{recommend, report, Catalog, InstanceId, NetworkFile, Workspace};
use patchconf::{PatchConfig, ReportFormat};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(about = "Compatibility and cable inference for audio/MIDI rigs")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./patchbay.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a saved network and print statuses, workflow and warnings
    Check {
        /// Network snapshot (JSON)
        network: PathBuf,

        /// Device catalog (JSON), overrides [paths] catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recommend cables between two catalog devices
    Recommend {
        /// First device id
        a: String,

        /// Second device id
        b: String,

        /// Device catalog (JSON), overrides [paths] catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Follow audio downstream of one placed instance
    Route {
        /// Network snapshot (JSON)
        network: PathBuf,

        /// Instance id to start from
        instance: String,

        /// Device catalog (JSON), overrides [paths] catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where it came from
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = PatchConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    for file in &sources.files {
        tracing::debug!(path = %file.display(), "loaded config file");
    }

    match cli.command {
        Commands::Check {
            network,
            catalog,
            json,
        } => {
            let catalog = load_catalog(catalog.as_deref(), &config)?;
            let mut workspace = load_network(&network, &catalog)?;
            let result = workspace.evaluate();

            if wants_json(json, &config) {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::render_inference(&result));
            }
        }
        Commands::Recommend {
            a,
            b,
            catalog,
            json,
        } => {
            let catalog = load_catalog(catalog.as_deref(), &config)?;
            if catalog.is_empty() {
                bail!("recommend needs a catalog: pass --catalog or set [paths] catalog");
            }
            let first = catalog
                .get(&a.as_str().into())
                .with_context(|| format!("Device '{}' not in catalog", a))?;
            let second = catalog
                .get(&b.as_str().into())
                .with_context(|| format!("Device '{}' not in catalog", b))?;

            let suggestions = recommend(first, second);
            if wants_json(json, &config) {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                print!("{}", report::render_recommendations(&suggestions));
            }
        }
        Commands::Route {
            network,
            instance,
            catalog,
            json,
        } => {
            let catalog = load_catalog(catalog.as_deref(), &config)?;
            let mut workspace = load_network(&network, &catalog)?;
            let source = InstanceId::from(instance.as_str());
            if workspace.instance(&source).is_none() {
                bail!("Instance '{}' not in {}", instance, network.display());
            }

            workspace.evaluate();
            let downstream = workspace.downstream(&source);
            let test_tone = workspace.test_tone_available(&source);

            if wants_json(json, &config) {
                let body = serde_json::json!({
                    "source": source,
                    "downstream": downstream,
                    "test_tone": test_tone,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", report::render_route(&source, &downstream, test_tone));
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml());
            println!();
            if sources.files.is_empty() {
                println!("# no config files loaded");
            }
            for file in &sources.files {
                println!("# loaded: {}", file.display());
            }
            for var in &sources.env_overrides {
                println!("# env override: {}", var);
            }
        }
    }

    Ok(())
}

fn wants_json(flag: bool, config: &PatchConfig) -> bool {
    flag || config.report.format == ReportFormat::Json
}

/// CLI path first, then the configured one. No catalog at all is fine for
/// networks that carry their own devices.
fn load_catalog(cli_path: Option<&Path>, config: &PatchConfig) -> Result<Catalog> {
    match cli_path.or(config.paths.catalog.as_deref()) {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(Catalog::default()),
    }
}

fn load_network(path: &Path, catalog: &Catalog) -> Result<Workspace> {
    let network = NetworkFile::load(path)
        .with_context(|| format!("Failed to load network {}", path.display()))?;
    network
        .into_workspace(catalog)
        .with_context(|| format!("Failed to resolve devices in {}", path.display()))
}
