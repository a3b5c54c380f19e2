//! Service assembly — wires configuration into clients, the flow and the router.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ConnectConfig;
use crate::connect::{CallbackUrls, ConnectFlow, ConnectRouteState, connect_routes};
use crate::error::ConfigError;
use crate::payments::StripeClient;
use crate::store::PostgrestFounderStore;

/// Build the onboarding flow against the real Supabase and Stripe endpoints.
pub fn build_flow(config: &ConnectConfig) -> Result<ConnectFlow, ConfigError> {
    let http = config.http_client()?;

    let store = PostgrestFounderStore::new(
        http.clone(),
        &config.supabase_url,
        config.supabase_service_key.clone(),
    );
    let payments = StripeClient::new(
        http,
        &config.stripe_api_base,
        config.stripe_secret_key.clone(),
    );

    Ok(ConnectFlow::new(
        Arc::new(store),
        Arc::new(payments),
        CallbackUrls::from_base(&config.app_base_url),
    ))
}

/// Connect routes with request tracing and CORS for the web app's origin.
pub fn build_router(flow: Arc<ConnectFlow>, config: &ConnectConfig) -> Result<Router, ConfigError> {
    let origin =
        HeaderValue::from_str(&config.app_origin()).map_err(|e| ConfigError::InvalidValue {
            key: "APP_BASE_URL".into(),
            message: e.to_string(),
        })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(connect_routes(ConnectRouteState { flow }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

/// Serve `router` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
