//! Binary entrypoint for the chickpet CLI.
//!
//! Commands:
//! - `start [--bind <addr>] [--port <n>]` - serve the pet over HTTP
//! - `init` - write a starter `config.toml`
//! - `status` - advance the stored pet locally and print it as JSON
//! - `reset` - replace the stored pet with a fresh egg and print it
//! - `tools [--base-url <url>]` - run the JSON-RPC tool adapter on stdin/stdout
//!
//! See the library crate docs for module-level details: `chickpet::`.
use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::sync::Arc;

use chickpet::config::Config;
use chickpet::logutil::{init_logging, LogSink};
use chickpet::service::PetService;

#[derive(Parser)]
#[command(name = "chickpet")]
#[command(about = "A virtual pet chick served over HTTP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP pet service
    Start {
        /// Address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write a default configuration file
    Init,
    /// Advance the stored pet to now and print it
    Status,
    /// Replace the stored pet with a fresh egg
    Reset,
    /// Run the tool adapter for conversational agents on stdin/stdout
    Tools {
        /// Pet service base URL (overrides config)
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes the default)
    let config_exists = tokio::fs::try_exists(&cli.config).await.unwrap_or(false);
    let pre_config = match cli.command {
        Commands::Init => None,
        _ if config_exists => Some(Config::load(&cli.config).await?),
        _ => None,
    };
    let sink = match cli.command {
        // stdout carries protocol frames in adapter mode
        Commands::Tools { .. } => LogSink::Stderr,
        _ => LogSink::Stdout,
    };
    init_logging(pre_config.as_ref().map(|c| &c.logging), cli.verbose, sink);
    if pre_config.is_none() && !matches!(cli.command, Commands::Init) {
        warn!("Config file {} not found, using defaults", cli.config);
    }
    let mut config = pre_config.unwrap_or_default();

    match cli.command {
        Commands::Init => {
            info!("Initializing new configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Start { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            info!("Starting chickpet v{}", env!("CARGO_PKG_VERSION"));
            let service = Arc::new(PetService::from_config(&config));
            chickpet::http::serve(&config.server, service).await?;
        }
        Commands::Status => {
            let service = PetService::from_config(&config);
            let pet = service.get_status(Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&pet)?);
        }
        Commands::Reset => {
            let service = PetService::from_config(&config);
            let pet = service.reset(Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&pet)?);
        }
        Commands::Tools { base_url } => {
            #[cfg(not(feature = "agent"))]
            {
                let _ = base_url;
                log::error!("The tool adapter requires the 'agent' feature");
                std::process::exit(2);
            }
            #[cfg(feature = "agent")]
            {
                if let Some(url) = base_url {
                    config.agent.base_url = url;
                }
                let client = chickpet::agent::PetClient::new(&config.agent);
                chickpet::agent::stdio::run_stdio(client).await?;
            }
        }
    }

    Ok(())
}
