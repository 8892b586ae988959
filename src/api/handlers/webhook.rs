//! Webhook receiver handler.
//!
//! The handler extracts the body as [`Bytes`] and hands the exact wire
//! bytes to the service layer: signature verification must see the
//! payload as delivered, not a re-serialized form.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::WebhookAckDto;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// Header naming the delivered event type.
pub const HEADER_EVENT_TYPE: &str = "X-GitHub-Event";
/// Header carrying the `sha256=<hex>` payload signature.
pub const HEADER_SIGNATURE: &str = "X-Hub-Signature-256";

/// `POST /webhooks/github` — Receive a GitHub webhook delivery.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] on signature failure,
/// [`GatewayError::MalformedPayload`] for unparseable known events, and
/// [`GatewayError::InvalidRequest`] when the event-type header is
/// missing.
#[utoipa::path(
    post,
    path = "/webhooks/github",
    tag = "Webhooks",
    summary = "Receive a GitHub webhook delivery",
    description = "Authenticates the delivery against configured webhook secrets, translates it into a changeset event, and persists it idempotently. Unrecognized event types and unknown changesets are acknowledged without persistence.",
    request_body(content = String, description = "Raw webhook payload bytes as delivered", content_type = "application/json"),
    responses(
        (status = 200, description = "Delivery accepted (persisted or skipped)", body = WebhookAckDto),
        (status = 400, description = "Missing event-type header", body = ErrorResponse),
        (status = 401, description = "Signature verification failed", body = ErrorResponse),
        (status = 422, description = "Malformed payload of a known event type", body = ErrorResponse),
        (status = 500, description = "Internal failure", body = ErrorResponse),
    )
)]
pub async fn receive_github(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let event_type = headers
        .get(HEADER_EVENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            GatewayError::InvalidRequest(format!("missing {HEADER_EVENT_TYPE} header"))
        })?;

    // A missing signature header is an authentication failure, not a
    // validation one: verification of the empty string always fails.
    let signature = headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let outcome = state
        .webhook_service
        .process(event_type, signature, &body)
        .await?;

    Ok(Json(WebhookAckDto::from(outcome)))
}

/// Webhook receiver routes, mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/github", post(receive_github))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Changeset, ChangesetId, Clock, ExternalService, ExternalServiceKind};
    use crate::persistence::Store;
    use crate::persistence::memory::MemoryStore;
    use crate::service::{CountsService, WebhookService};
    use crate::webhook::signature;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "secret";

    async fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let svc = ExternalService {
            id: 1,
            kind: ExternalServiceKind::GitHub,
            display_name: "GitHub - With Webhook".to_string(),
            config: json!({"webhooks": [{"org": "acme", "secret": SECRET}]}),
            created_at: now,
            updated_at: now,
        };
        let Ok(()) = store.upsert_external_services(&[svc]).await else {
            panic!("fixture setup failed");
        };
        let cs = Changeset {
            id: ChangesetId::new(0),
            repo: "acme/widgets".to_string(),
            external_id: "7".to_string(),
            external_created_at: Some(now),
            metadata: json!({}),
        };
        let Ok(()) = store.create_changesets(&[cs]).await else {
            panic!("fixture setup failed");
        };

        let dyn_store: Arc<dyn Store> = store as Arc<dyn Store>;
        let clock = Clock::fixed(now);
        AppState {
            webhook_service: Arc::new(WebhookService::new(
                Arc::clone(&dyn_store),
                clock.clone(),
            )),
            counts_service: Arc::new(CountsService::new(dyn_store, clock)),
        }
    }

    fn delivery(event_type: &str, body: Vec<u8>, secret: &[u8]) -> Request<Body> {
        let tag = signature::sign(&body, secret);
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/github")
            .header(HEADER_EVENT_TYPE, event_type)
            .header(HEADER_SIGNATURE, tag)
            .body(Body::from(body));
        let Ok(request) = request else {
            panic!("request build failed");
        };
        request
    }

    fn merged_pr_body(number: i64) -> Vec<u8> {
        json!({
            "action": "closed",
            "pull_request": {
                "id": 101,
                "number": number,
                "merged": true,
                "merged_at": Utc::now().to_rfc3339(),
            },
            "repository": {"full_name": "acme/widgets"}
        })
        .to_string()
        .into_bytes()
    }

    async fn send(request: Request<Body>) -> StatusCode {
        let app = crate::api::build_router().with_state(test_state().await);
        let Ok(response) = app.oneshot(request).await else {
            panic!("router call failed");
        };
        response.status()
    }

    #[tokio::test]
    async fn wrong_secret_is_401() {
        let status = send(delivery("pull_request", merged_pr_body(7), b"wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_delivery_is_200() {
        let status = send(delivery("pull_request", merged_pr_body(7), SECRET.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_changeset_is_200() {
        let status = send(delivery("pull_request", merged_pr_body(99), SECRET.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unrecognized_event_type_is_200() {
        let body = br#"{"zen":"Design for failure."}"#.to_vec();
        let status = send(delivery("ping", body, SECRET.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_known_event_is_422() {
        let body = br#"{"action":"closed"}"#.to_vec();
        let status = send(delivery("pull_request", body, SECRET.as_bytes())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_event_type_header_is_400() {
        let body = merged_pr_body(7);
        let tag = signature::sign(&body, SECRET.as_bytes());
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/github")
            .header(HEADER_SIGNATURE, tag)
            .body(Body::from(body));
        let Ok(request) = request else {
            panic!("request build failed");
        };
        let status = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_signature_header_is_401() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/github")
            .header(HEADER_EVENT_TYPE, "pull_request")
            .body(Body::from(merged_pr_body(7)));
        let Ok(request) = request else {
            panic!("request build failed");
        };
        let status = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
