use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use docchat_core::FALLBACK_ANSWER;
use docchat_server::build_app;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const REPORT: &str = "Nestlé India focuses on sustainability. \
    Quarterly profits increased significantly this year.";

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn upload(app: &Router, text: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::post("/document")
                .body(Body::from(text.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let app = build_app();
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn ask_without_document_is_a_conflict() {
    let app = build_app();
    let (status, _) = get(&app, "/ask?q=profits").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn upload_then_ask_round_trip() {
    let app = build_app();

    let (status, body) = upload(&app, REPORT).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passages"], 1);
    assert_eq!(body["cached"], false);

    let (status, body) = get(&app, "/ask?q=sustainability").await;
    assert_eq!(status, StatusCode::OK);
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("sustainability"));
    assert!(!body["results"].as_array().unwrap().is_empty());

    let (status, body) = get(&app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], true);
    assert_eq!(body["passages"], 1);

    let (status, body) = get(&app, "/passage/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"].as_str().unwrap(), REPORT);

    let (status, _) = get(&app, "/passage/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn irrelevant_query_answers_with_the_fallback() {
    let app = build_app();
    upload(&app, REPORT).await;

    let (status, body) = get(&app, "/ask?q=xyzabc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"].as_str().unwrap(), FALLBACK_ANSWER);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn identical_reupload_is_served_from_the_session() {
    let app = build_app();

    let (_, first) = upload(&app, REPORT).await;
    assert_eq!(first["cached"], false);

    let (_, second) = upload(&app, REPORT).await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["fingerprint"], first["fingerprint"]);

    // a different document replaces the session
    let (_, third) = upload(&app, "Entirely different annual report text.").await;
    assert_eq!(third["cached"], false);
    assert_ne!(third["fingerprint"], first["fingerprint"]);
}

#[tokio::test]
async fn empty_document_is_accepted_and_always_falls_back() {
    let app = build_app();

    let (status, body) = upload(&app, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passages"], 1);

    let (_, body) = get(&app, "/ask?q=profits").await;
    assert_eq!(body["answer"].as_str().unwrap(), FALLBACK_ANSWER);
}
