//! HTTP API server.
//!
//! Exposes the analysis pipeline over REST: health, analyze, history, and
//! static downloads of the generated documents.

use crate::cli::Output;
use crate::config::Settings;
use crate::history::HistoryEntry;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;
    let output_dir = orchestrator.output_dir().clone();

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let debug_endpoints = settings.server.debug_endpoints;

    let state = Arc::new(AppState {
        orchestrator,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/history", get(history))
        .nest_service("/download", ServeDir::new(output_dir));

    if debug_endpoints {
        app = app.route("/debug/cookies", get(debug_cookies));
    }

    let app = app.layer(cors).with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Resumen API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze");
    Output::kv("History", "GET  /history");
    Output::kv("Downloads", "GET  /download/{dir}/{file}");
    if debug_endpoints {
        Output::kv("Debug", "GET  /debug/cookies");
    }
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AnalyzeRequest {
    /// Video URL to analyze.
    url: String,
    /// Requested output sections; unrecognized tags are ignored.
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

fn error_response(detail: String) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDetail { detail }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    let ffmpeg = tool_available("ffmpeg", "-version").await;
    let yt_dlp = tool_available("yt-dlp", "--version").await;
    let api_key = Settings::gemini_api_key().is_some();

    let installed = |ok: bool| if ok { "installed" } else { "missing" };

    Json(serde_json::json!({
        "status": if ffmpeg && yt_dlp && api_key { "healthy" } else { "unhealthy" },
        "ffmpeg": installed(ffmpeg),
        "yt_dlp": installed(yt_dlp),
        "api_key": if api_key { "set" } else { "missing" },
    }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> axum::response::Response {
    // Reject obviously bad input before spawning the downloader.
    if url::Url::parse(&req.url).is_err() {
        return error_response(format!("Download failed: invalid URL: {}", req.url));
    }

    match state.orchestrator.run(&req.url, &req.options).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => {
            error!("Analysis request failed: {}", e);
            error_response(e.stage_message())
        }
    }
}

async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.orchestrator.history().entries().await)
}

/// Diagnostic view of the staged cookie file. Only routed when
/// `server.debug_endpoints` is enabled; the snippet exposes credential
/// material, which is why the route is gated.
async fn debug_cookies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let path = state.settings.cookie_path();

    if !path.exists() {
        return Json(serde_json::json!({
            "exists": false,
            "message": "cookies.txt not found",
        }));
    }

    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let snippet: String = std::fs::read_to_string(&path)
        .unwrap_or_default()
        .chars()
        .take(100)
        .collect();

    Json(serde_json::json!({
        "exists": true,
        "size": size,
        "content_snippet": format!("{}...", snippet),
    }))
}

/// Probe an external tool by running its version command.
async fn tool_available(name: &str, version_arg: &str) -> bool {
    tokio::process::Command::new(name)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
