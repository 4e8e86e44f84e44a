use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;

use axum::{
    http::{Request, Uri},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{config::RelayConfig, forwarder::Forwarder};

mod config;
mod env_utils;
mod forwarder;
mod payload;
mod reconcile;
mod route_handlers;
mod utils;

pub struct AppState {
    config: RelayConfig,
    forwarder: Forwarder,
}
type SharedAppState = Arc<AppState>;

struct RequestUri(Uri);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("initializing app state ...");

    let config = RelayConfig::from_env().context("failed to load relay configuration")?;
    let forwarder = Forwarder::from_config(&config)?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting server at http://localhost:{}", config.port);
    info!(
        "Forwarding actions to {} (timeout {}, retries {}, {})",
        config.target_server,
        humantime::format_duration(config.webhook_timeout),
        config.webhook_retries,
        match config.fire_and_forget {
            true => "fire-and-forget",
            false => "synchronous",
        }
    );
    info!("Regenerate-all primary target: {}", config.regenerate_target);
    if let Some(additional) = &config.additional_regenerate_webhook {
        info!("Regenerate-all additional target: {}", additional);
    }

    let state = Arc::new(AppState { config, forwarder });

    axum::Server::bind(&addr)
        .serve(
            get_main_router()
                .with_state(state)
                .layer(axum::middleware::from_fn(
                    |request: Request<_>, next: Next<_>| async move {
                        let uri = request.uri().clone();

                        let mut response = next.run(request).await;

                        response.extensions_mut().insert(RequestUri(uri));

                        response
                    },
                ))
                .layer(TraceLayer::new_for_http().on_response(
                    |response: &Response, latency: std::time::Duration, _span: &tracing::Span| {
                        let url = match response.extensions().get::<RequestUri>().map(|r| &r.0) {
                            Some(uri) => uri.to_string(),
                            None => "unknown".to_string(),
                        };
                        let status = response.status();
                        let latency = utils::duration_to_ms_string(latency);

                        if url == "/healthcheck" {
                            tracing::trace!("{} {} {}", url, status, latency);
                            return;
                        }

                        tracing::debug!("{} {} {}", url, status, latency);
                    },
                ))
                .into_make_service(),
        )
        .await
        .context("error while starting API server")?;

    anyhow::Ok(())
}

/**
 * main router for the app: the legacy per-day routes, the healthcheck and
 * everything under /api
 **/
fn get_main_router() -> Router<SharedAppState> {
    debug!("initializing router(s) ...");

    Router::new()
        .route("/healthcheck", get(|| async { "Ok" }))
        .merge(route_handlers::legacy::router())
        .nest("/api", get_api_router())
}

/**
 * router for the photo placeholder and the action relays
 **/
fn get_api_router() -> Router<SharedAppState> {
    Router::new()
        .route("/photos/:day", get(route_handlers::photos::handler))
        .nest(
            "/actions",
            Router::new()
                .route(
                    "/regenerate-all",
                    post(route_handlers::regenerate_all::handler),
                )
                .route("/approve/:day", post(route_handlers::actions::approve))
                .route(
                    "/regenerate-single/:day",
                    post(route_handlers::actions::regenerate_single),
                ),
        )
}
