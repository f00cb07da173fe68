//! Prometheus exposition. Kept in its own test binary since the recorder is
//! process-global and can only be installed once.
use api::{create_router, init_metrics, AppState, ServiceConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use storage::fixture::{sample_rows, FixtureStore};
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_count_requests_and_errors() {
    let store = FixtureStore::create(&sample_rows()).await.unwrap();
    let handle = init_metrics().unwrap();
    let state = Arc::new(AppState::new(
        store.open().await.unwrap(),
        ServiceConfig::default(),
        Some(handle),
    ));
    let app = create_router(state).unwrap();

    assert_eq!(get(&app, "/api/v1.0/precipitation").await.0, StatusCode::OK);
    assert_eq!(
        get(&app, "/api/v1.0/2099-01-01").await.0,
        StatusCode::NOT_FOUND
    );

    let (status, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.contains(r#"climate_requests_total{route="precipitation"} 1"#),
        "{body}"
    );
    assert!(
        body.contains(r#"climate_request_errors_total{kind="not_found"} 1"#),
        "{body}"
    );
}
