use std::sync::Arc;

use astro_assist::api::{AstroApi, HttpAstroApi};
use astro_assist::channels::{self, WidgetState, widget_routes};
use astro_assist::config::{BackendConfig, PacingConfig, WidgetConfig};
use astro_assist::session::SessionManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Validate the embed configuration when the operator supplies one.
    // A missing iframe_url is fatal: the widget must not render.
    if let Ok(raw) = std::env::var("ASTRO_WIDGET_CONFIG") {
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap_or_else(|e| {
            eprintln!("Error: ASTRO_WIDGET_CONFIG is not valid JSON: {e}");
            std::process::exit(2);
        });
        match WidgetConfig::from_value(value) {
            Ok(config) => {
                eprintln!("   Widget: iframe {}", config.iframe_url);
            }
            Err(e) => {
                tracing::error!("Embed configuration rejected: {e}");
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        }
    }

    let backend_config = BackendConfig::from_env();
    let port: u16 = std::env::var("ASTRO_ASSIST_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    eprintln!("🪐 Astro Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", backend_config.base_url);
    eprintln!("   Widget WS: ws://0.0.0.0:{}/ws/widget", port);

    let api: Arc<dyn AstroApi> = Arc::new(HttpAstroApi::new(backend_config));

    // Liveness / feature-flag probe. Degraded backends are reported but not
    // fatal; sessions fall back to canned replies.
    match api.health().await {
        Ok(status) => {
            let features: Vec<String> = status
                .features
                .iter()
                .map(|(name, enabled)| format!("{name}={enabled}"))
                .collect();
            eprintln!("   Backend health: {} ({})", status.status, features.join(", "));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Backend health probe failed");
            eprintln!("   Backend health: unreachable");
        }
    }

    let sessions = Arc::new(SessionManager::new(api, PacingConfig::default()));

    // Local REPL mode for testing the dialog without a browser.
    if std::env::var("ASTRO_ASSIST_CLI").is_ok() {
        eprintln!("   Mode: CLI (/refresh to reset, /quit to exit)\n");
        channels::cli::run(sessions).await?;
        return Ok(());
    }

    let app = widget_routes(WidgetState { sessions });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "Widget WebSocket server started");
    axum::serve(listener, app).await?;

    Ok(())
}
