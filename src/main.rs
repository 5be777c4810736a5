use simple_change_log::config::AppConfig;
use simple_change_log::error::ChangeLogError;
use simple_change_log::github::HttpCommitFetcher;
use simple_change_log::handler::WebhookHandler;
use simple_change_log::logging::{FileLogger, setup_logging};
use simple_change_log::{AppState, router, store};
use std::sync::Arc;
use tracing::{self, info};

async fn run(config: AppConfig) -> Result<(), ChangeLogError> {
    let store = store::build_store(&config).await?;
    let fetcher = Arc::new(HttpCommitFetcher::new(config.fetcher.clone())?);
    let handler = WebhookHandler::new(store, fetcher, config.log_bucket.clone());
    let state = Arc::new(AppState::new(handler));

    let app = router(state);

    info!("Listening on {}", config.bind_address);
    info!("Writing log entries to bucket '{}'", config.log_bucket);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let file_logger = config.log_dir.clone().map(FileLogger::new);
    // Held for the lifetime of the process so buffered file logs get flushed.
    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
