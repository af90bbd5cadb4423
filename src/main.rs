use anyhow::Result;
use avatar_session::avatar::sim::SimAvatarClient;
use avatar_session::media::sim::SimMediaDevices;
use avatar_session::{
    create_router, AppState, Config, HttpBackend, LoggingNavigator, SessionController,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "avatar-session", about = "Interactive avatar session controller")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/avatar-session")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Avatar Session v0.1.0");
    info!("Service: {}", cfg.service.name);
    info!("Backend: {}", cfg.backend.base_url);

    let backend = Arc::new(HttpBackend::new(&cfg.backend)?);
    // The real vendor SDK and platform media stack live in the embedding
    // host; the binary runs against the simulated implementations.
    let client = Arc::new(SimAvatarClient::default());
    let devices = Arc::new(SimMediaDevices::default());
    let navigator = Arc::new(LoggingNavigator);

    let controller = SessionController::new(
        cfg.session.clone(),
        cfg.avatar.clone(),
        backend,
        client,
        devices,
        navigator,
    );
    controller.acquire_camera().await;

    if cfg.session.auto_start {
        let auto = Arc::clone(&controller);
        tokio::spawn(async move {
            if let Err(e) = auto.start_session(true).await {
                error!("Auto-start failed: {e:#}");
            }
        });
    }

    let router = create_router(AppState::new(Arc::clone(&controller)));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP control surface listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&controller)))
        .await?;

    Ok(())
}

async fn shutdown_signal(controller: Arc<SessionController>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, finalizing session");
    controller.shutdown().await;
}
