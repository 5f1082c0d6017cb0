use std::future::Future;
use std::sync::Arc;
use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::client::reservations_client::{DiscoveryReservationsClient, ReservationsClient};
use crate::config::ClientConfig;
use crate::controller::health_check;
use crate::discovery::load_balancer::LoadBalancedClient;
use crate::discovery::DiscoveryClient;
use crate::helpers::handler_404::page_not_found_handler;

pub mod discovery_demo;
pub mod names_controller;
pub mod reservations_client;

/// The two independent routes to the reservation service.
#[derive(Clone)]
pub struct ClientState {
    pub service_name: String,
    pub rest: Arc<LoadBalancedClient>,
    pub reservations_client: Arc<dyn ReservationsClient>,
}

impl ClientState {
    pub fn new(service_name: &str, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            service_name: service_name.to_string(),
            rest: Arc::new(LoadBalancedClient::new(reqwest::Client::new(), discovery.clone())),
            reservations_client: Arc::new(DiscoveryReservationsClient::new(service_name, discovery)),
        }
    }
}

pub fn router_endpoints(client_state: ClientState) -> Router {
    health_check::router()
        .merge(names_controller::router(client_state))
        .fallback(page_not_found_handler)
}

pub async fn serve(
    client_state: ClientState,
    config: &ClientConfig,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let application = router_endpoints(client_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr = config.socket_addr();
    info!("Reservation client listening on: {}", addr);
    axum::Server::try_bind(&addr)
        .context("Error binding the reservation client")?
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Error spinning up the reservation client")
}
