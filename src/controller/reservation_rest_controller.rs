use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Host, Path, Query};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Deserialize;
use tracing::{warn, Instrument};
use url::Url;
use crate::controller::AppState;
use crate::controller::hal::{
    EmbeddedReservations, Link, Links, PageMetadata, PagedReservations, ReservationResource,
    ResourceProcessor, COLLECTION_REL,
};
use crate::helpers::uri::{base_url, resource_uri};
use crate::models::reservation::Reservation;
use crate::services::reservation_service::{CreateOutcome, ReservationService, UpdateOutcome};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Repository-style surface over reservations. Delete is deliberately not routed.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/search", get(search_links))
        .route("/reservations/search/by-name", get(find_by_name))
        .route("/reservations/:id", get(get_reservation).put(update_reservation))
        .route_layer(Extension(app_state.reservation_service))
        .route_layer(Extension(app_state.resource_processor))
}

#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct ByNameParams {
    pub name: String,
}

fn render(
    processor: &ResourceProcessor,
    reservation: &Reservation,
    base: &Url,
) -> ReservationResource {
    processor.process(ReservationResource::from_reservation(reservation, base))
}

fn page_link(collection: &Url, page: usize, size: usize) -> Link {
    let mut uri = collection.clone();
    uri.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("size", &size.to_string());
    Link::new(uri)
}

pub fn paginate(
    reservations: Vec<Reservation>,
    params: &PageParams,
    processor: &ResourceProcessor,
    base: &Url,
) -> PagedReservations {
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let number = params.page.unwrap_or(0);
    let total_elements = reservations.len();
    let total_pages = (total_elements + size - 1) / size;

    let items = reservations
        .iter()
        .skip(number.saturating_mul(size))
        .take(size)
        .map(|reservation| render(processor, reservation, base))
        .collect();

    let collection = resource_uri(base, &[COLLECTION_REL]);
    let mut links = Links::new();
    links.insert("self".to_string(), Link::templated(format!("{}{{?page,size,sort}}", collection)));
    links.insert("profile".to_string(), Link::new(resource_uri(base, &["profile", COLLECTION_REL])));
    links.insert("search".to_string(), Link::new(resource_uri(base, &[COLLECTION_REL, "search"])));
    if total_pages > 1 {
        links.insert("first".to_string(), page_link(&collection, 0, size));
        links.insert("last".to_string(), page_link(&collection, total_pages - 1, size));
        if number > 0 {
            links.insert("prev".to_string(), page_link(&collection, (number - 1).min(total_pages - 1), size));
        }
        if number.saturating_add(1) < total_pages {
            links.insert("next".to_string(), page_link(&collection, number + 1, size));
        }
    }

    PagedReservations {
        embedded: EmbeddedReservations { reservations: items },
        links,
        page: PageMetadata {
            size,
            total_elements,
            total_pages,
            number,
        },
    }
}

pub async fn list_reservations(
    Extension(reservation_service): Extension<ReservationService>,
    Extension(processor): Extension<Arc<ResourceProcessor>>,
    host: Option<Host>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match reservation_service.list().await {
        Ok(reservations) => {
            (StatusCode::OK, Json(paginate(reservations, &params, &processor, &base))).into_response()
        }
        Err(e) => {
            warn!("Something went wrong listing reservations due to: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_reservation(
    Extension(reservation_service): Extension<ReservationService>,
    Extension(processor): Extension<Arc<ResourceProcessor>>,
    host: Option<Host>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match reservation_service.find_by_id(id).await {
        Ok(Some(reservation)) => {
            (StatusCode::OK, Json(render(&processor, &reservation, &base))).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Something went wrong retrieving reservation {} due to: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn create_reservation(
    Extension(reservation_service): Extension<ReservationService>,
    Extension(processor): Extension<Arc<ResourceProcessor>>,
    host: Option<Host>,
    Json(body): Json<Reservation>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let events = reservation_service.events().clone();
    let create_span = events.before_create(&body);
    let created = reservation_service
        .create(body)
        .instrument(create_span.span().clone())
        .await;

    match created {
        Ok(CreateOutcome::Created(reservation)) => {
            events.after_create(create_span, &reservation);
            let id = reservation.id.map(|id| id.to_string()).unwrap_or_default();
            let location = resource_uri(&base, &[COLLECTION_REL, &id]).to_string();
            let resource = render(&processor, &reservation, &base);
            (StatusCode::CREATED, [(LOCATION, location)], Json(resource)).into_response()
        }
        Ok(CreateOutcome::Conflict) => StatusCode::CONFLICT.into_response(),
        Ok(CreateOutcome::BlankName) => StatusCode::BAD_REQUEST.into_response(),
        Err(e) => {
            warn!("Something went wrong creating reservation due to: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn update_reservation(
    Extension(reservation_service): Extension<ReservationService>,
    Extension(processor): Extension<Arc<ResourceProcessor>>,
    host: Option<Host>,
    Path(id): Path<i64>,
    Json(body): Json<Reservation>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match reservation_service.update(id, body.name).await {
        Ok(UpdateOutcome::Updated(reservation)) => {
            (StatusCode::OK, Json(render(&processor, &reservation, &base))).into_response()
        }
        Ok(UpdateOutcome::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Ok(UpdateOutcome::Conflict) => StatusCode::CONFLICT.into_response(),
        Ok(UpdateOutcome::BlankName) => StatusCode::BAD_REQUEST.into_response(),
        Err(e) => {
            warn!("Something went wrong updating reservation {} due to: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn search_links(
    host: Option<Host>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let search = resource_uri(&base, &[COLLECTION_REL, "search"]);
    let by_name = resource_uri(&base, &[COLLECTION_REL, "search", "by-name"]);
    let mut links = Links::new();
    links.insert("find-by-name".to_string(), Link::templated(format!("{}{{?name}}", by_name)));
    links.insert("self".to_string(), Link::new(search));

    (StatusCode::OK, Json(serde_json::json!({ "_links": links }))).into_response()
}

pub async fn find_by_name(
    Extension(reservation_service): Extension<ReservationService>,
    Extension(processor): Extension<Arc<ResourceProcessor>>,
    host: Option<Host>,
    Query(params): Query<ByNameParams>,
) -> impl IntoResponse {
    let Ok(base) = base_url(host) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match reservation_service.find_by_name(&params.name).await {
        Ok(Some(reservation)) => {
            (StatusCode::OK, Json(render(&processor, &reservation, &base))).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Something went wrong searching reservation {} due to: {}", params.name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
