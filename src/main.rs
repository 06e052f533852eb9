use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "logwell")]
#[command(about = "Log and telemetry ingestion sidecar", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept records, write rotating files and downlink completed ones
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Exit non-zero when the output directory looks unhealthy
    Health,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logwell=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run) | None => {
            let config_path = logwell::config::resolve_config_path(cli.config.as_deref());
            logwell::cli::run::run(config_path).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                logwell::cli::config::init(stdout, cli.config)?;
            }
            ConfigAction::Validate => {
                let config_path = logwell::config::resolve_config_path(cli.config.as_deref());
                logwell::cli::config::validate(config_path)?;
            }
        },
        Some(Commands::Health) => {
            let config_path = logwell::config::resolve_config_path(cli.config.as_deref());
            if !logwell::cli::health::check(config_path).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
