use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zonesync::{Domain, PdnsClient, SyncConfig};

/// Inspect zones on the editor server through its HTTP API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Owner recorded on the domain
    #[arg(long, default_value = "operator")]
    owner: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the raw zone as returned by the editor
    Zone { domain: String },
    /// Print the zone's RRsets relative to the domain
    Rrsets { domain: String },
    /// Print the active KSK/CSK public keys and DS records
    Keys { domain: String },
    /// Ask the editor to NOTIFY the zone's secondaries
    Notify { domain: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::from_env()?,
    };
    let client = PdnsClient::new(config, None)?;

    let output = match args.command {
        Command::Zone { domain } => {
            let zone = client.get_zone(&Domain::new(domain, args.owner)).await?;
            serde_json::to_string_pretty(&zone)?
        }
        Command::Rrsets { domain } => {
            let rrsets = client.get_rrsets(&Domain::new(domain, args.owner)).await?;
            serde_json::to_string_pretty(&rrsets)?
        }
        Command::Keys { domain } => {
            let keys = client.get_keys(&Domain::new(domain, args.owner)).await?;
            serde_json::to_string_pretty(&keys)?
        }
        Command::Notify { domain } => {
            client.notify(&Domain::new(domain.clone(), args.owner)).await?;
            tracing::info!(zone = %domain, "NOTIFY requested");
            return Ok(());
        }
    };

    println!("{}", output);
    Ok(())
}
