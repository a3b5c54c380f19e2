use std::sync::Arc;

use anyhow::Context;
use founder_connect::config::ConnectConfig;
use founder_connect::server::{build_flow, build_router, serve};

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

    let config = ConnectConfig::from_env().context("Invalid configuration")?;

    eprintln!("Founder Connect v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Store: {}", config.supabase_url);
    eprintln!("   Stripe: {}", config.stripe_api_base);
    eprintln!("   App: {}", config.app_base_url);
    eprintln!(
        "   Endpoint: http://0.0.0.0:{}/founder/connect-stripe",
        config.port
    );
    eprintln!("   OpenAPI: http://0.0.0.0:{}/openapi.json\n", config.port);

    let flow = Arc::new(build_flow(&config)?);
    let app = build_router(flow, &config)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Founder connect server started");

    serve(listener, app).await?;
    Ok(())
}
