//! Inbound webhook route.
//!
//! The single authenticated surface of the service. The raw body is
//! verified against the `x-line-signature` header before any parsing; an
//! invalid signature rejects the whole batch with 401. Parsed events are
//! dispatched concurrently - a slow grading call for one user never
//! blocks the other events in the batch - and per-event failures are
//! contained inside the controller, so the platform always gets its 200.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use futures::future::join_all;

use crate::application::ConversationController;
use crate::domain::webhook::{LineSignatureVerifier, WebhookPayload};

/// Shared state for the webhook route.
#[derive(Clone)]
pub struct WebhookState {
    pub verifier: Arc<LineSignatureVerifier>,
    pub controller: Arc<ConversationController>,
}

/// Creates the webhook router.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .with_state(state)
}

/// POST /webhook - verify, parse, and fan out one event batch.
async fn receive_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let signature = headers
        .get("x-line-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if let Err(err) = state.verifier.verify(body.as_bytes(), signature) {
        tracing::warn!(error = %err, "rejected webhook batch");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::debug!(events = payload.events.len(), "dispatching webhook batch");

    join_all(
        payload
            .events
            .into_iter()
            .map(|event| state.controller.dispatch(event)),
    )
    .await;

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::application::flows::test_support::{
        MemoryBadges, MemoryFeedback, MemorySessions, MemorySubmissions, MemoryUsers,
        RecordingGateway, StubEvaluator, StubQuestionBank, StubTasks,
    };
    use crate::domain::webhook::compute_test_signature;

    const SECRET: &str = "webhook-test-secret";

    fn router() -> (Router, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let controller = Arc::new(ConversationController::new(
            Arc::new(MemorySessions::default()),
            Arc::new(MemoryUsers::default()),
            Arc::new(StubTasks { active: None }),
            Arc::new(MemorySubmissions::default()),
            Arc::new(MemoryFeedback::default()),
            Arc::new(StubQuestionBank::default()),
            Arc::new(MemoryBadges::default()),
            Arc::new(StubEvaluator::default()),
            gateway.clone(),
        ));
        let state = WebhookState {
            verifier: Arc::new(LineSignatureVerifier::new(SECRET)),
            controller,
        };
        (webhook_routes(state), gateway)
    }

    fn signed_request(body: &str, signature: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("x-line-signature", signature)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn invalid_signature_rejects_the_batch() {
        let (router, gateway) = router();
        let body = r#"{"events":[]}"#;

        let response = router
            .oneshot(signed_request(body, "bm90LXRoZS1zaWduYXR1cmU="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(gateway.replies().await.is_empty());
    }

    #[tokio::test]
    async fn valid_signature_dispatches_every_event() {
        let (router, gateway) = router();
        let body = r#"{"events":[
            {"type":"message","replyToken":"rt-1","source":{"userId":"U1"},"message":{"type":"text","text":"สวัสดี"}},
            {"type":"message","replyToken":"rt-2","source":{"userId":"U2"},"message":{"type":"text","text":"hello"}}
        ]}"#;
        let signature = compute_test_signature(SECRET, body);

        let response = router.oneshot(signed_request(body, &signature)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gateway.replies().await.len(), 2);
    }

    #[tokio::test]
    async fn odd_events_do_not_abort_their_siblings() {
        let (router, gateway) = router();
        let body = r#"{"events":[
            {"type":"beacon","hwid":"x"},
            {"type":"message","replyToken":"rt-1","source":{"userId":"U1"},"message":{"type":"text","text":"hello"}}
        ]}"#;
        let signature = compute_test_signature(SECRET, body);

        let response = router.oneshot(signed_request(body, &signature)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gateway.replies().await.len(), 1);
    }

    #[tokio::test]
    async fn unparseable_body_is_a_bad_request() {
        let (router, _) = router();
        let body = "not json";
        let signature = compute_test_signature(SECRET, body);

        let response = router.oneshot(signed_request(body, &signature)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
