use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use prokat::config::ServerConfig;
use prokat::notify::{Notifier, TelegramConfig};
use prokat::server::{AppState, create_router};

#[derive(Parser)]
#[command(name = "prokat")]
#[command(about = "Metal products storefront backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Directory for the SQLite databases
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Static front-end directory
        #[arg(long, default_value = "front")]
        front_dir: String,

        /// Product and site images directory
        #[arg(long, default_value = "img")]
        img_dir: String,

        /// GOST PDF directory
        #[arg(long, default_value = "gost")]
        gost_dir: String,
    },
}

/// Prefers the directory as given, then relative to the parent so the server
/// can be launched either from the project root or from a subdirectory.
fn resolve_dir(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.is_dir() {
        return direct;
    }
    let parent = Path::new("..").join(name);
    if parent.is_dir() {
        return parent;
    }
    direct
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("prokat=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            front_dir,
            img_dir,
            gost_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                front_dir: resolve_dir(&front_dir),
                img_dir: resolve_dir(&img_dir),
                gost_dir: resolve_dir(&gost_dir),
            };
            fs::create_dir_all(&config.data_dir)
                .with_context(|| format!("create data dir {}", config.data_dir.display()))?;
            info!(
                "static dirs -> front: {}, img: {}, gost: {}",
                config.front_dir.display(),
                config.img_dir.display(),
                config.gost_dir.display()
            );

            let notifier = Notifier::spawn(TelegramConfig::from_env(&config.data_dir));
            let state = Arc::new(AppState::open(&config, notifier).context("open stores")?);

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
