//! Router-level tests. None of these reach S3 or the completion API: each
//! request is rejected (or answered) before any outbound call.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use medassist_api::config::ApiConfig;
use medassist_api::{MAX_UPLOAD_BYTES, router};
use medassist_api::state::AppState;

fn app() -> axum::Router {
    let config = ApiConfig::from_lookup(|_| None).unwrap();
    let sdk_config = aws_config::SdkConfig::builder()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .behavior_version(aws_config::BehaviorVersion::latest())
        .build();
    router(AppState::build(&config, sdk_config).unwrap())
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "medassist-test-boundary";

/// `(name, filename, content_type, data)`
fn multipart_post(uri: &str, parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n".as_slice());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n".as_slice());
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let (status, body) = send(json_post("/chatbot/query", json!({ "query": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("no valid input"));
}

#[tokio::test]
async fn missing_query_is_rejected() {
    let (status, _) = send(json_post("/chatbot/query", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_conversation_id_is_rejected() {
    let (status, body) = send(json_post(
        "/chatbot/query",
        json!({ "conversation_id": "abc", "query": "I have a fever" }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid uuid"));
}

#[tokio::test]
async fn body_without_content_type_is_rejected() {
    let request = Request::post("/chatbot/query")
        .body(Body::from(r#"{"query":"hello"}"#))
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn image_without_captioning_fails_analysis() {
    let request = multipart_post(
        "/chatbot/query",
        &[("image", Some("scan.png"), Some("image/png"), b"\x89PNG\r\n".as_slice())],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Image analysis failed: ")
    );
}

#[tokio::test]
async fn unsupported_audio_is_rejected() {
    let request = multipart_post(
        "/chatbot/query",
        &[("voice", Some("note.txt"), Some("text/plain"), b"not audio".as_slice())],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Voice transcription failed: ")
    );
}

#[tokio::test]
async fn multipart_without_inputs_is_rejected() {
    let request = multipart_post("/chatbot/query", &[("text", None, None, b"  ".as_slice())]);
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn medication_needs_a_name() {
    let (status, body) = send(json_post(
        "/medications",
        json!({
            "name": " ",
            "next_dose": "08:00",
            "refill_date": "2026-11-01",
            "remaining": 30,
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "medication name is required");
}

#[tokio::test]
async fn path_ids_must_be_uuids() {
    for uri in ["/conversations/not-a-uuid", "/medications/42"] {
        let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn malformed_medication_body_is_a_json_bad_request() {
    let (status, body) = send(json_post("/medications", json!({ "name": "Ibuprofen" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("next_dose"));

    let request = Request::post("/medications")
        .body(Body::from("name=Ibuprofen"))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn uploads_larger_than_two_megabytes_reach_analysis() {
    let photo = vec![0xFFu8; 3 * 1024 * 1024];
    let request = multipart_post(
        "/chatbot/query",
        &[
            ("text", None, None, b"What is this rash?".as_slice()),
            ("image", Some("rash.jpg"), Some("image/jpeg"), photo.as_slice()),
        ],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Image analysis failed: ")
    );
}

#[tokio::test]
async fn uploads_over_the_limit_are_payload_too_large() {
    let photo = vec![0xFFu8; MAX_UPLOAD_BYTES + 1024];
    let request = multipart_post(
        "/chatbot/query",
        &[("image", Some("scan.jpg"), Some("image/jpeg"), photo.as_slice())],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("6 MB"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = send(Request::get("/appointments").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
