//! `gatehouse`: the access-control admin client.
//!
//! Lists, reads, creates, saves and removes members, keys, roles and doors
//! as Details aggregates in JSON. Think of it as `kubectl` for the door
//! controller backend.

mod commands;
mod config;

use clap::{Parser, Subcommand};

use commands::details;

/// Gatehouse CLI tool.
#[derive(Parser, Debug)]
#[command(name = "gatehouse", about = "Access-control admin client")]
struct Cli {
    /// Path to client config file (default: ~/.gatehouse/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Backend URL, overriding the current context.
    #[arg(long = "endpoint", global = true)]
    endpoint: Option<String>,

    /// Run against an in-memory demo backend.
    #[arg(long = "memory", global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// List records of a kind as {id, name}.
    List {
        /// member, key, role or door (singular or plural).
        kind: String,
    },

    /// Show one record's details.
    Get { kind: String, id: i64 },

    /// Print an empty details template for `create`.
    New { kind: String },

    /// Create a record from a details document.
    Create {
        kind: String,
        #[command(flatten)]
        body: Body,
    },

    /// Save an edited details document.
    Save {
        kind: String,
        #[command(flatten)]
        body: Body,
    },

    /// Delete a record.
    Remove { kind: String, id: i64 },

    /// Show version.
    Version,
}

#[derive(clap::Args, Debug)]
struct Body {
    /// JSON body.
    #[arg(long = "json")]
    json_body: Option<String>,

    /// Read JSON from file.
    #[arg(short = 'f', long = "file")]
    file: Option<String>,
}

impl Body {
    fn read(self) -> anyhow::Result<String> {
        if let Some(path) = self.file {
            Ok(std::fs::read_to_string(&path)?)
        } else if let Some(json) = self.json_body {
            Ok(json)
        } else {
            anyhow::bail!("Provide --json or -f <file>.");
        }
    }
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create or update a context.
    Set {
        name: String,
        #[arg(long)]
        endpoint: Option<String>,
        /// Per-request timeout in seconds.
        #[arg(long = "timeout")]
        timeout_secs: Option<u64>,
    },
    /// Switch the current context.
    Use { name: String },
    /// List all contexts.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    let connect = || details::connect(cli.memory, cli.endpoint.as_deref(), &config_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Set { name, endpoint, timeout_secs } => {
                commands::context::set(&name, endpoint.as_deref(), timeout_secs, &config_path)?;
            }
            ContextAction::Use { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
        },

        Commands::List { kind } => {
            details::list(&connect()?, details::parse_kind(&kind)?).await?;
        }

        Commands::Get { kind, id } => {
            details::get(&connect()?, details::parse_kind(&kind)?, id).await?;
        }

        Commands::New { kind } => {
            details::new(&connect()?, details::parse_kind(&kind)?).await?;
        }

        Commands::Create { kind, body } => {
            let kind = details::parse_kind(&kind)?;
            details::create(&connect()?, kind, &body.read()?).await?;
        }

        Commands::Save { kind, body } => {
            let kind = details::parse_kind(&kind)?;
            details::save(&connect()?, kind, &body.read()?).await?;
        }

        Commands::Remove { kind, id } => {
            details::remove(&connect()?, details::parse_kind(&kind)?, id).await?;
        }

        Commands::Version => {
            println!("gatehouse cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
