use std::sync::Arc;

use anyhow::Context;

use geo_explore::api;
use geo_explore::config::AppConfig;
use geo_explore::tour::TourAgent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...  (or GEO_EXPLORE_LLM_BACKEND=anthropic + ANTHROPIC_API_KEY)");
        std::process::exit(1);
    });

    eprintln!("🌍 GeoExplore v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   API: http://0.0.0.0:{}/api/chat", config.port);
    eprintln!(
        "   Routing: {}",
        if config.arcgis.api_key.is_some() {
            "ArcGIS"
        } else {
            "disabled (no ARCGIS_API_KEY)"
        }
    );

    if let Some(url) = config.arcgis.poi_feature_url.as_deref() {
        eprintln!("   POIs: feature service {url}");
    } else {
        eprintln!("   POIs: placeholder data");
    }

    let agent = Arc::new(TourAgent::from_config(&config)?);
    let app = api::router(agent).layer(api::cors_layer(&config.frontend_url));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "GeoExplore backend started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("GeoExplore backend shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
