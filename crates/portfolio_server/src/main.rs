//! `portfolio-server` entry point.

use axum::http::HeaderValue;
use log::{error, info};
use portfolio_core::db::open_db;
use portfolio_core::{init_logging, AiClient, AnalysisOrchestrator, HttpCompletionTransport};
use portfolio_server::{build_router, AppState, ServerConfig};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=server_exit module=server status=error error={message}");
            eprintln!("portfolio-server: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|err| err.to_string())?;
    let log_dir = config
        .log_dir
        .to_str()
        .ok_or_else(|| format!("log directory `{}` is not UTF-8", config.log_dir.display()))?;
    init_logging(&config.log_level, log_dir)?;

    if config.ai_api_key.is_none() {
        info!("event=server_config module=server status=degraded reason=ai_api_key_missing");
    }

    let conn = open_db(&config.db_path).map_err(|err| format!("database open failed: {err}"))?;
    let transport = HttpCompletionTransport::new(&config.transport_config())
        .map_err(|err| format!("AI transport init failed: {err}"))?;
    let client = AiClient::new(config.ai_client_config(), Arc::new(transport));
    let orchestrator = AnalysisOrchestrator::new(Arc::new(client));
    let state = AppState::new(conn, Arc::new(orchestrator));

    let origin = HeaderValue::from_str(&config.frontend_origin)
        .map_err(|err| format!("invalid frontend origin: {err}"))?;
    let app = build_router(state, origin);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|err| format!("bind {} failed: {err}", config.bind_addr))?;
    info!(
        "event=server_start module=server status=ok bind_addr={} db_path={} ai_model={}",
        config.bind_addr,
        config.db_path.display(),
        config.ai_model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {err}"))?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
    }
}
