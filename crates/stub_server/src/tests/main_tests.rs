use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
};
use tower::ServiceExt;

fn test_app() -> Router {
    let state = AppState {
        image_origin: Url::parse("https://cdn.example.com/").expect("origin"),
        latency: Duration::ZERO,
        surprise_cursor: AtomicUsize::new(0),
    };
    build_router(Arc::new(state))
}

fn create_request(prompt: &str, style: &str) -> Request<Body> {
    let body = serde_json::to_vec(&CreateLogoRequest {
        prompt: prompt.to_string(),
        style: style.to_string(),
    })
    .expect("encode");
    Request::post("/api/logos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn create_logo_returns_completed_image() {
    let response = test_app()
        .oneshot(create_request("a red fox", "minimal"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body: CreateLogoResponse = read_json(response).await;
    assert_eq!(body.status, LogoJobStatus::Completed);
    assert!(body.created_at.is_some());
    let image_url = body.ready_image_url().expect("image url");
    assert_eq!(
        image_url,
        format!("https://cdn.example.com/images/{}.png", body.id)
    );
}

#[tokio::test]
async fn create_logo_rejects_blank_prompt_and_unknown_style() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(create_request("  ", "minimal"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ApiError = read_json(response).await;
    assert_eq!(body.code, ErrorCode::Validation);
    assert_eq!(body.error, "prompt is required");

    let response = app
        .oneshot(create_request("a red fox", "watercolor"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ApiError = read_json(response).await;
    assert_eq!(body.error, "unknown style 'watercolor'");
}

#[tokio::test]
async fn surprise_me_cycles_through_prompts() {
    let app = test_app();
    let mut seen = Vec::new();
    for _ in 0..SURPRISE_PROMPTS.len() + 1 {
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/logos/surprise-me")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body: SurpriseMeResponse = read_json(response).await;
        seen.push(body.prompt);
    }
    assert_eq!(seen[0], SURPRISE_PROMPTS[0]);
    assert_eq!(seen[1], SURPRISE_PROMPTS[1]);
    assert_eq!(seen[SURPRISE_PROMPTS.len()], SURPRISE_PROMPTS[0]);
}

#[test]
fn validation_rejects_oversized_prompt() {
    let req = CreateLogoRequest {
        prompt: "x".repeat(MAX_PROMPT_CHARS + 1),
        style: "mascot".to_string(),
    };
    let err = validate_create(&req).expect_err("too long");
    assert_eq!(err.code, ErrorCode::Validation);
}
