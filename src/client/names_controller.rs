use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::{info, warn};
use crate::client::ClientState;
use crate::client::reservations_client::ReservationsClient;
use crate::discovery::load_balancer::LoadBalancedClient;
use crate::models::reservation::Reservation;
use crate::models::resources::Resources;

pub fn router(client_state: ClientState) -> Router {
    Router::new()
        .route("/reservations/names", get(names))
        .route("/reservations/feign-names", get(feign_names))
        .route_layer(Extension(client_state))
}

fn to_names(resources: Resources<Reservation>) -> Vec<String> {
    resources
        .content()
        .into_iter()
        .map(|reservation| reservation.name)
        .collect()
}

pub async fn names(
    Extension(client_state): Extension<ClientState>,
) -> impl IntoResponse {
    info!("Calling names...");
    let rest: Arc<LoadBalancedClient> = client_state.rest;
    let reservations_uri = format!("http://{}/reservations", client_state.service_name);

    match rest.get_json::<Resources<Reservation>>(&reservations_uri).await {
        Ok(resources) => (StatusCode::OK, Json(to_names(resources))).into_response(),
        Err(e) => {
            warn!("Something went wrong calling {} due to: {}", reservations_uri, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve reservation names").into_response()
        }
    }
}

pub async fn feign_names(
    Extension(client_state): Extension<ClientState>,
) -> impl IntoResponse {
    info!("Calling feign-names...");
    let client: Arc<dyn ReservationsClient> = client_state.reservations_client;

    match client.list_reservations().await {
        Ok(resources) => (StatusCode::OK, Json(to_names(resources))).into_response(),
        Err(e) => {
            warn!("Something went wrong listing reservations due to: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve reservation names").into_response()
        }
    }
}
