use std::sync::Arc;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use reservation_services::app::build_app_state;
use reservation_services::controller::{router_endpoints, AppState};
use reservation_services::repositories::memory_repo::InMemoryRepo;
use reservation_services::services::reservation_service::DEMO_NAMES;

const HOST: &str = "localhost:8000";

fn app_state(instance_id: &str) -> AppState {
    build_app_state(Arc::new(InMemoryRepo::new()), instance_id).unwrap()
}

async fn seeded_app(instance_id: &str) -> Router {
    let state = app_state(instance_id);
    state.reservation_service.seed_demo_data().await.unwrap();
    router_endpoints(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body())
        .await
        .expect("Failed to read body")
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Failed to parse JSON body")
}

#[tokio::test]
async fn create_then_find_one() {
    let app = router_endpoints(app_state(""));

    let response = app
        .clone()
        .oneshot(with_json("POST", "/custom-reservations", json!({"name": "Jan Kowalski"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://localhost:8000/custom-reservations/Jan%20Kowalski"
    );
    assert!(body_bytes(response).await.is_empty());

    let response = app
        .oneshot(get("/custom-reservations/Jan%20Kowalski"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": 1, "name": "Jan Kowalski"}));
}

#[tokio::test]
async fn duplicate_create_conflicts_without_mutation() {
    let app = router_endpoints(app_state(""));

    let first = app
        .clone()
        .oneshot(with_json("POST", "/custom-reservations", json!({"name": "Marcel"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(with_json("POST", "/custom-reservations", json!({"name": "Marcel"})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert!(second.headers().get(header::LOCATION).is_none());
    assert!(body_bytes(second).await.is_empty());

    let list = body_json(app.oneshot(get("/custom-reservations")).await.unwrap()).await;
    assert_eq!(list, json!([{"id": 1, "name": "Marcel"}]));
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let app = seeded_app("").await;
    let response = app.oneshot(get("/custom-reservations/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn seeded_list_holds_exactly_the_demo_names() {
    let app = seeded_app("ignored-here").await;
    let list = body_json(app.oneshot(get("/custom-reservations")).await.unwrap()).await;

    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, DEMO_NAMES);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_of_one_name_yield_one_record() {
    let app = router_endpoints(app_state(""));

    for round in 0..20 {
        let name = format!("racer-{}", round);
        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let app = app.clone();
                let request = with_json("POST", "/custom-reservations", json!({ "name": name }));
                tokio::spawn(async move { app.oneshot(request).await.unwrap().status() })
            })
            .collect();

        let mut statuses = Vec::new();
        for task in tasks {
            statuses.push(task.await.unwrap());
        }
        statuses.sort();
        assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    }

    let list = body_json(app.oneshot(get("/custom-reservations")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = router_endpoints(app_state(""));
    let response = app
        .oneshot(with_json("POST", "/custom-reservations", json!({"nom": "x"})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn blank_name_is_a_bad_request() {
    let app = seeded_app("").await;

    for uri in ["/custom-reservations", "/reservations"] {
        let response = app
            .clone()
            .oneshot(with_json("POST", uri, json!({"name": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    let rename = app
        .clone()
        .oneshot(with_json("PUT", "/reservations/1", json!({"name": "   "})))
        .await
        .unwrap();
    assert_eq!(rename.status(), StatusCode::BAD_REQUEST);

    let list = body_json(app.oneshot(get("/custom-reservations")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), DEMO_NAMES.len());
}

#[tokio::test]
async fn hypermedia_collection_is_decorated() {
    let app = seeded_app("blue").await;
    let body = body_json(app.oneshot(get("/reservations")).await.unwrap()).await;

    let reservations = body["_embedded"]["reservations"].as_array().unwrap();
    assert_eq!(reservations.len(), 6);
    assert_eq!(reservations[0]["name"], "Bartek blue");
    assert_eq!(
        reservations[0]["_links"]["self"]["href"],
        "http://localhost:8000/reservations/1"
    );
    assert_eq!(
        reservations[0]["_links"]["photo"]["href"],
        "https://www.google.pl/search?tbm=isch&q=Bartek"
    );
    assert_eq!(body["page"], json!({"size": 20, "totalElements": 6, "totalPages": 1, "number": 0}));
    assert_eq!(body["_links"]["search"]["href"], "http://localhost:8000/reservations/search");
}

#[tokio::test]
async fn decoration_does_not_touch_stored_names() {
    let app = seeded_app("blue").await;
    let _ = app.clone().oneshot(get("/reservations")).await.unwrap();

    let response = app.oneshot(get("/custom-reservations/Bartek")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"id": 1, "name": "Bartek"}));
}

#[tokio::test]
async fn generic_create_fires_hooks_and_conflicts() {
    let app = router_endpoints(app_state(""));

    let response = app
        .clone()
        .oneshot(with_json("POST", "/reservations", json!({"name": "Daniel"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::LOCATION], "http://localhost:8000/reservations/1");
    let body = body_json(response).await;
    assert_eq!(body["name"], "Daniel");

    let duplicate = app
        .clone()
        .oneshot(with_json("POST", "/reservations", json!({"name": "Daniel"})))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let metrics = body_json(app.clone().oneshot(get("/actuator/metrics")).await.unwrap()).await;
    assert_eq!(
        metrics,
        json!({"counter.count": 1, "counter.create": 1, "counter.delete": 0, "counter.save": 0})
    );

    let exposition = app.oneshot(get("/actuator/prometheus")).await.unwrap();
    assert_eq!(exposition.status(), StatusCode::OK);
    assert!(exposition.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let text = String::from_utf8(body_bytes(exposition).await).unwrap();
    assert!(text.contains("reservations_count 1"));
    assert!(text.contains("reservations_create_total 1"));
    assert!(text.contains("reservations_save_total 0"));
}

#[tokio::test]
async fn generic_update_and_lookups() {
    let app = seeded_app("").await;

    let renamed = app
        .clone()
        .oneshot(with_json("PUT", "/reservations/1", json!({"name": "Bartłomiej"})))
        .await
        .unwrap();
    assert_eq!(renamed.status(), StatusCode::OK);
    assert_eq!(body_json(renamed).await["name"], "Bartłomiej");

    let clash = app
        .clone()
        .oneshot(with_json("PUT", "/reservations/1", json!({"name": "Marcel"})))
        .await
        .unwrap();
    assert_eq!(clash.status(), StatusCode::CONFLICT);

    let missing = app
        .clone()
        .oneshot(with_json("PUT", "/reservations/99", json!({"name": "Nobody"})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let by_id = app.clone().oneshot(get("/reservations/2")).await.unwrap();
    assert_eq!(body_json(by_id).await["name"], "Marcel");

    let by_name = app
        .clone()
        .oneshot(get("/reservations/search/by-name?name=Wojtek"))
        .await
        .unwrap();
    assert_eq!(by_name.status(), StatusCode::OK);
    assert_eq!(
        body_json(by_name).await["_links"]["self"]["href"],
        "http://localhost:8000/reservations/4"
    );

    let not_there = app
        .clone()
        .oneshot(get("/reservations/search/by-name?name=Bartek"))
        .await
        .unwrap();
    assert_eq!(not_there.status(), StatusCode::NOT_FOUND);

    let search = body_json(app.clone().oneshot(get("/reservations/search")).await.unwrap()).await;
    assert_eq!(
        search["_links"]["find-by-name"],
        json!({"href": "http://localhost:8000/reservations/search/by-name{?name}", "templated": true})
    );

    let metrics = body_json(app.oneshot(get("/actuator/metrics")).await.unwrap()).await;
    assert_eq!(metrics["counter.save"], 1);
}

#[tokio::test]
async fn delete_is_not_exported() {
    let app = seeded_app("").await;
    let request = Request::builder()
        .method("DELETE")
        .uri("/reservations/1")
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let still_there = app.oneshot(get("/reservations/1")).await.unwrap();
    assert_eq!(still_there.status(), StatusCode::OK);
}

#[tokio::test]
async fn actuator_endpoints() {
    let app = router_endpoints(app_state(""));

    let health = body_json(app.clone().oneshot(get("/actuator/health")).await.unwrap()).await;
    assert_eq!(health, json!({"status": "UP"}));

    let plain_health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(plain_health.status(), StatusCode::OK);

    let info = body_json(app.clone().oneshot(get("/actuator/info")).await.unwrap()).await;
    assert!(info["currentTime"].as_i64().unwrap() > 1_600_000_000_000);

    let unknown = app.oneshot(get("/no-such-endpoint")).await.unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}
