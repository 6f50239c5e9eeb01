//! VeraNode daemon: runs the lifecycle node and offers ledger tooling.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use veranode_node::{init_logging, LogFormat, NodeConfig, VeraNode};

#[derive(Parser)]
#[command(name = "veranode", about = "VeraNode rumor lifecycle node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "VERANODE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, global = true, env = "VERANODE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "VERANODE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "VERANODE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Base URL of the moderation oracle.
    #[arg(long, global = true, env = "VERANODE_ORACLE_ENDPOINT")]
    oracle_endpoint: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the lifecycle node.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Inspect the ledger.
    #[command(name = "ledger")]
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
    /// Configuration helpers.
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the node until SIGINT/SIGTERM.
    Run,
}

#[derive(clap::Subcommand)]
enum LedgerAction {
    /// Walk the hash chain; exits with status 1 if it is broken.
    Verify,
    /// Print chain statistics.
    Stats,
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML.
    Default,
}

impl Cli {
    /// File config (or defaults) with CLI flags and env vars applied on top.
    fn resolve_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => NodeConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(endpoint) = &self.oracle_endpoint {
            config.oracle_endpoint = Some(endpoint.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Command::Config {
        action: ConfigAction::Default,
    } = cli.command
    {
        print!("{}", NodeConfig::default().to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level).map_err(anyhow::Error::msg)?;
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Node {
            action: NodeAction::Run,
        } => {
            tracing::info!(
                data_dir = %config.data_dir.display(),
                lock_minutes = config.lock_check_interval_minutes,
                finalize_minutes = config.finalize_check_interval_minutes,
                oracle = config.oracle_endpoint.as_deref().unwrap_or("fallback"),
                "starting VeraNode"
            );
            let mut node = VeraNode::open(config).context("opening node")?;
            node.run().await?;
            tracing::info!("VeraNode daemon exited cleanly");
            Ok(ExitCode::SUCCESS)
        }
        Command::Ledger {
            action: LedgerAction::Verify,
        } => {
            let node = VeraNode::open(config).context("opening node")?;
            let report = node.verify_ledger()?;
            let stats = node.ledger_stats()?;
            match report.broken_at {
                None => {
                    println!("ledger OK: {} blocks", stats.total_blocks);
                    Ok(ExitCode::SUCCESS)
                }
                Some(id) => {
                    println!("ledger BROKEN at block {id}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Ledger {
            action: LedgerAction::Stats,
        } => {
            let node = VeraNode::open(config).context("opening node")?;
            let stats = node.ledger_stats()?;
            println!("blocks:          {}", stats.total_blocks);
            println!("FACT decisions:  {}", stats.fact_decisions);
            println!("LIE decisions:   {}", stats.lie_decisions);
            match stats.broken_at {
                None => println!("chain:           valid"),
                Some(id) => println!("chain:           broken at block {id}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}
