//! Coursesite web server binary.
//!
//! Usage: `coursesite_server <config.toml>`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use coursesite_core::auth::accounts::bootstrap_default_admin;
use coursesite_core::auth::session::{SessionKeys, resolve_session_secret};
use coursesite_core::mail::{LogMailer, Mailer, ResendMailer};
use coursesite_core::site::SiteLayout;
use coursesite_web::config::{AuthMode, WebConfig};
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "info,coursesite_web=debug,coursesite_core=debug";

/// CLI arguments for the course website server.
#[derive(Parser, Debug)]
#[command(name = "coursesite_server", about = "Authenticated course website server")]
struct Args {
    /// Path to the server configuration file (TOML).
    config: PathBuf,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let config = WebConfig::load(&args.config)?;

    info!(
        config = %args.config.display(),
        site_dir = %config.site_dir.display(),
        db_path = %config.db_path,
        auth = ?config.auth,
        "starting coursesite_server"
    );
    if config.auth == AuthMode::Disabled {
        warn!("authentication is DISABLED; every page and admin action is open to anyone");
    }

    let site = SiteLayout::load(&config.site_dir)?;

    info!(max_connections = args.max_connections, "configuring connection pool");
    let pool = coursesite_core::db::connect(&config.db_path, args.max_connections).await?;

    info!("running database migrations");
    coursesite_core::migrate::migrate(&pool).await?;

    bootstrap_default_admin(&pool).await?;

    let mailer: Arc<dyn Mailer> = match config.resend_api_key.clone().filter(|k| !k.is_empty()) {
        Some(key) => {
            info!("sending mail via Resend");
            Arc::new(ResendMailer::new(key, config.resend_from_email.clone())?)
        }
        None => {
            info!("RESEND_API_KEY not set; setup links will be logged instead of emailed");
            Arc::new(LogMailer)
        }
    };

    let secret = resolve_session_secret(config.session_secret.as_deref());
    let bind_addr = config.bind_addr();

    let state = coursesite_web::AppState {
        pool,
        config: Arc::new(config),
        site: Arc::new(site),
        sessions: SessionKeys::from_secret(secret.as_bytes()),
        mailer,
    };

    let app = coursesite_web::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
