//! End-to-end API tests against the in-process router

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hestia_server::{build_router, AppState};

fn test_router(dir: &tempfile::TempDir) -> Router {
    let state = AppState::new(
        dir.path().join("models").join("model.json"),
        dir.path().join("data").join("house_data.csv"),
    )
    .shared();
    build_router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn post(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_service_without_model() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["model_loaded"], false);

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&router, get("/model/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_model");

    let (status, body) = send(
        &router,
        post("/predict", json!({"area": 100.0, "bedrooms": 3, "bathrooms": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("model"));
}

#[tokio::test]
async fn test_train_missing_data_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, body) = send(&router, post("/train", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("training data"));
}

#[tokio::test]
async fn test_train_predict_flow() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    // Train on a freshly generated synthetic dataset
    let (status, body) = send(
        &router,
        post("/train", json!({"generate_sample": true, "n_samples": 1000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");
    let r2 = body["performance"]["metrics"]["r2_score"].as_f64().unwrap();
    assert!(r2 > 0.8, "r2 = {r2}");

    // Schema endpoints now reflect the trained model
    let (status, body) = send(&router, get("/features")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 6);
    assert_eq!(body["features"][0], "area");

    let (status, body) = send(&router, get("/model/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["model_info"]["feature_count"], 6);

    // A house priced by the generating formula at 308_525; the output is
    // converted from the mid-range USD band into VND.
    let house = json!({
        "area": 150.5,
        "bedrooms": 3,
        "bathrooms": 2,
        "floors": 2,
        "year_built": 2010,
        "location_score": 7.5
    });
    let (status, body) = send(&router, post("/predict", house.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let price = body["predicted_price"].as_f64().unwrap();
    let expected = 308_525.0 * 24_500.0;
    assert!(
        price > expected * 0.7 && price < expected * 1.3,
        "price = {price}"
    );
    assert_eq!(body["features_used"]["area"], 150.5);

    // Repeat requests are deterministic
    let (_, repeat) = send(&router, post("/predict", house)).await;
    assert_eq!(repeat["predicted_price"].as_f64().unwrap(), price);
}

#[tokio::test]
async fn test_predict_with_location() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, _) = send(
        &router,
        post("/train", json!({"generate_sample": true, "n_samples": 400})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let base = json!({"area": 120.0, "bedrooms": 3, "bathrooms": 2, "floors": 1});
    let located = json!({
        "area": 120.0, "bedrooms": 3, "bathrooms": 2, "floors": 1,
        "location_score": 6.0,
        "location": "Quận 1, TP. Hồ Chí Minh"
    });

    // The location text fills in a derived score when none is given
    let (status, body) = send(
        &router,
        post(
            "/predict",
            json!({
                "area": 120.0, "bedrooms": 3, "bathrooms": 2, "floors": 1,
                "location": "Quận 1, TP. Hồ Chí Minh"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let derived = body["features_used"]["location_score"].as_f64().unwrap();
    assert!((3.0..9.0).contains(&derived), "derived = {derived}");

    // With a caller score present, the effective score is a blend
    let (_, body) = send(&router, post("/predict", located.clone())).await;
    let blended = body["features_used"]["location_score"].as_f64().unwrap();
    assert!((blended - (0.6 * 6.0 + 0.4 * derived)).abs() < 1e-9);

    // Same location, same price
    let (_, a) = send(&router, post("/predict", located.clone())).await;
    let (_, b) = send(&router, post("/predict", located)).await;
    assert_eq!(a["predicted_price"], b["predicted_price"]);

    // Location-free requests leave the score absent in the echo
    let (_, body) = send(&router, post("/predict", base)).await;
    assert!(body["features_used"]["location_score"].is_null());
}

#[tokio::test]
async fn test_predict_batch_is_raw() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, _) = send(
        &router,
        post("/train", json!({"generate_sample": true, "n_samples": 400})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let houses = json!({
        "houses": [
            {"area": 100.0, "bedrooms": 2, "bathrooms": 1, "floors": 1,
             "year_built": 2000, "location_score": 5.0},
            {"area": 250.0, "bedrooms": 5, "bathrooms": 3, "floors": 2,
             "year_built": 2020, "location_score": 9.0, "location": "quận 7"}
        ]
    });

    let (status, body) = send(&router, post("/predict/batch", houses)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    // Raw model output stays in the generator's price range, unconverted
    let small = body["predictions"][0]["predicted_price"].as_f64().unwrap();
    let large = body["predictions"][1]["predicted_price"].as_f64().unwrap();
    assert!(small < 1_000_000.0);
    assert!(large < 1_000_000.0);
    assert!(large > small);

    // The request items are echoed back as received
    assert_eq!(body["predictions"][1]["features"]["location"], "quận 7");
}
