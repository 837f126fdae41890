//! Serve command - run the HTTP service.

use clap::Args;
use console::style;
use tokio::net::TcpListener;
use tracing::info;

use docintel_server::{AppState, router};

use super::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let state = AppState::from_config(&config);
    let app = router(state, config.server.max_upload_bytes);

    let listener = TcpListener::bind(&bind).await?;
    let addr = listener.local_addr()?;
    info!("Listening on {}", addr);
    eprintln!("{} docintel listening on http://{}", style("✓").green(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
