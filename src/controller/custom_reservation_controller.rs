use axum::{Extension, Json, Router};
use axum::extract::{Host, Path};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::warn;
use crate::controller::AppState;
use crate::helpers::uri::{base_url, resource_uri};
use crate::models::reservation::Reservation;
use crate::services::reservation_service::{CreateOutcome, ReservationService};

pub const CUSTOM_RESERVATIONS: &str = "custom-reservations";

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/custom-reservations", get(list).post(create))
        .route("/custom-reservations/:name", get(find_one))
        .route_layer(Extension(app_state.reservation_service))
}

pub async fn list(
    Extension(reservation_service): Extension<ReservationService>,
) -> impl IntoResponse {
    match reservation_service.list().await {
        Ok(reservations) => {
            (StatusCode::OK, Json(reservations)).into_response()
        }
        Err(e) => {
            warn!("Something went wrong listing reservations due to: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn find_one(
    Extension(reservation_service): Extension<ReservationService>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match reservation_service.find_by_name(&name).await {
        Ok(Some(reservation)) => {
            (StatusCode::OK, Json(reservation)).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Something went wrong retrieving reservation {} due to: {}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn create(
    Extension(reservation_service): Extension<ReservationService>,
    host: Option<Host>,
    Json(body): Json<Reservation>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match reservation_service.create(body).await {
        Ok(CreateOutcome::Created(reservation)) => {
            let location = resource_uri(&base, &[CUSTOM_RESERVATIONS, &reservation.name]);
            (StatusCode::CREATED, [(LOCATION, location.to_string())]).into_response()
        }
        Ok(CreateOutcome::Conflict) => StatusCode::CONFLICT.into_response(),
        Ok(CreateOutcome::BlankName) => StatusCode::BAD_REQUEST.into_response(),
        Err(e) => {
            warn!("Something went wrong creating reservation due to: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
