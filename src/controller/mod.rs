use std::future::Future;
use std::sync::Arc;
use anyhow::Context;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::config::ServiceConfig;
use crate::controller::hal::ResourceProcessor;
use crate::helpers::handler_404::page_not_found_handler;
use crate::metrics::CounterService;
use crate::services::reservation_service::ReservationService;

pub mod custom_reservation_controller;
pub mod hal;
pub mod health_check;
pub mod info_controller;
pub mod reservation_rest_controller;

#[derive(Clone)]
pub struct AppState {
    pub reservation_service: ReservationService,
    pub resource_processor: Arc<ResourceProcessor>,
    pub counters: Arc<CounterService>,
}

pub fn cors_layer(origin_urls: &str) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origin_urls.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origins = origin_urls
            .split(',')
            .map(|s| s.trim().parse::<HeaderValue>())
            .collect::<Result<Vec<HeaderValue>, _>>()
            .context("Invalid origin url")?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS
        ])
        .allow_origin(allow_origin)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]))
}

pub async fn serve(
    app_state: AppState,
    config: &ServiceConfig,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let application = router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(&config.origin_urls)?)
        );

    let addr = config.socket_addr();
    info!("API server listening on: {}", addr);
    axum::Server::try_bind(&addr)
        .context("Error binding the API server")?
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    health_check::router()
        .merge(info_controller::router(app_state.clone()))
        .merge(custom_reservation_controller::router(app_state.clone()))
        .merge(reservation_rest_controller::router(app_state))
        .fallback(page_not_found_handler)
}
