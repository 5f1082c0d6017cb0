use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::warn;
use crate::controller::AppState;
use crate::metrics::CounterService;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/actuator/info", get(get_info))
        .route("/actuator/metrics", get(get_metrics))
        .route("/actuator/prometheus", get(get_prometheus))
        .route_layer(Extension(app_state.counters))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub current_time: i64,
}

pub fn current_time_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

async fn get_info() -> Json<Info> {
    Json(Info {
        current_time: current_time_millis(),
    })
}

async fn get_metrics(
    Extension(counters): Extension<Arc<CounterService>>,
) -> Json<Value> {
    Json(json!(counters.snapshot()))
}

async fn get_prometheus(
    Extension(counters): Extension<Arc<CounterService>>,
) -> impl IntoResponse {
    match counters.render() {
        Ok(text) => (
            StatusCode::OK,
            [(CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            text,
        ).into_response(),
        Err(e) => {
            warn!("Something went wrong rendering metrics due to: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
