use std::sync::Arc;

use tracing::info;
use tubegate::{
    common::{
        banner::{BannerInfo, print_banner},
        logger,
        types::AnyResult,
    },
    configs::Config,
    server::AppState,
    sources::{MediaExtractor, YouTubeExtractor},
    transport,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    let bind = config.bind_address();

    print_banner(&BannerInfo::default(), &bind);

    logger::init(config.logging.as_ref());
    logger::install_panic_hook(config.server.exit_on_panic);

    let extractor: Arc<dyn MediaExtractor> =
        Arc::new(YouTubeExtractor::new(&config.youtube, &config.relay)?);
    info!("Extraction backend: {}", extractor.name());

    let state = AppState::new(config, extractor);
    let app = transport::router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
