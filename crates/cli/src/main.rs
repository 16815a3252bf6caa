//! meshconf CLI - Main Entry Point
//!
//! Lists wireless interfaces and adds them to or removes them from the
//! babeld mesh.

use anyhow::Context;
use clap::{Parser, Subcommand};
use meshconf_common::{Outcome, Protocol};
use meshconf_daemon::{DaemonConfig, MeshService, MeshState, Reconciler, Supervisor};
use std::path::PathBuf;
use tracing::{debug, warn};

mod output;

use output::OutputFormat;

/// meshconf - babeld mesh interface management
#[derive(Parser)]
#[command(name = "meshconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(
        long,
        env = "MESHCONF_CONFIG",
        default_value = "/etc/meshconf.toml",
        global = true
    )]
    config: PathBuf,

    /// Log what would be signalled or started without doing it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, visible_alias = "verbose", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which wireless interfaces are in the mesh
    Interfaces,

    /// Add an interface to the mesh
    Enable {
        /// Mesh interface name
        interface: String,
    },

    /// Remove an interface from the mesh
    Disable {
        /// Mesh interface name
        interface: String,
    },

    /// Print the PID of the running babeld
    Pid,

    /// Print the babeld command line for a set of interfaces
    Command {
        /// Interfaces to route; defaults to the ones currently enabled
        interfaces: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new(log_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = DaemonConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;
    if cli.dry_run {
        config.dry_run = true;
    }
    debug!("Using store at {:?}", config.store_path);

    match cli.command {
        Commands::Interfaces => {
            let service = open_service(&config)?;
            let overview = service.survey().await?;
            output::print_overview(&overview, cli.format);
        }
        Commands::Enable { interface } => {
            let service = open_service(&config)?;
            let outcome = service.enable(&interface).await?;
            finish(&outcome, cli.format);
        }
        Commands::Disable { interface } => {
            let service = open_service(&config)?;
            let outcome = service.disable(&interface).await?;
            finish(&outcome, cli.format);
        }
        Commands::Pid => {
            let supervisor = Supervisor::from_config(&config);
            output::print_pid(supervisor.current_pid(), cli.format);
        }
        Commands::Command { interfaces } => {
            let interfaces = if interfaces.is_empty() {
                MeshState::open(config.mesh_db_path())?.routed_interfaces(Protocol::Babel)?
            } else {
                interfaces
            };
            output::print_command(&config.babeld.command_for(&interfaces), cli.format);
        }
    }

    Ok(())
}

/// Build the service and cancel pending settle waits on Ctrl-C
fn open_service(config: &DaemonConfig) -> anyhow::Result<MeshService> {
    let reconciler = Reconciler::from_config(config).context("opening mesh stores")?;
    let shutdown = reconciler.supervisor().shutdown_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning the current operation");
            shutdown.cancel();
        }
    });

    Ok(MeshService::new(reconciler))
}

fn finish(outcome: &Outcome, format: OutputFormat) {
    output::print_outcome(outcome, format);
    if !outcome.is_success() {
        std::process::exit(1);
    }
}
