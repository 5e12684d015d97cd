//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route(
            "/ai",
            post(endpoints::ai::handle).fallback(endpoints::ai::method_not_allowed),
        )
        .route("/health", get(endpoints::health::check))
        .route("/locations/:country", get(endpoints::location::lookup))
        .route("/send-email", post(endpoints::email::send))
        .route("/user/increment-trial", post(endpoints::user::increment_trial))
        .route("/user/:user_id", get(endpoints::user::get_user))
        .with_state(ctx);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::mail::{MailError, Mailer, OutgoingEmail};
    use crate::pipeline::llm::{LlmError, MockLlmClient};
    use crate::pipeline::simulation::SimulationEngine;

    fn app_with(client: MockLlmClient) -> Router {
        api_router(ApiContext::with_client(Arc::new(client), "test-model"))
    }

    fn app() -> Router {
        app_with(MockLlmClient::new("{}"))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app().oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "test-model");
    }

    #[tokio::test]
    async fn ai_rejects_get_with_405() {
        let response = app().oneshot(get_req("/api/ai")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_of(response).await["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn ai_rejects_unknown_type() {
        let req = post_json(
            "/api/ai",
            serde_json::json!({"type": "diagnoseForMe", "payload": {}}),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "Invalid request type");
    }

    #[tokio::test]
    async fn ai_generates_case() {
        let client = MockLlmClient::new(
            r#"```json
{"diagnosis": "Ovarian torsion", "primaryInfo": "BIODATA: 24F", "openingLine": "The pain came on suddenly.", "visualAppearance": "Pale, lying still."}
```"#,
        );
        let req = post_json(
            "/api/ai",
            serde_json::json!({"type": "generateCase", "payload": {"departmentName": "Gynecology"}}),
        );
        let response = app_with(client).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["diagnosis"], "Ovarian torsion");
        assert_eq!(json["openingLine"], "The pain came on suddenly.");
    }

    #[tokio::test]
    async fn ai_investigations_without_results_is_empty_array() {
        let req = post_json(
            "/api/ai",
            serde_json::json!({
                "type": "getInvestigationResults",
                "payload": {
                    "plan": "Pelvic ultrasound",
                    "caseDetails": {"diagnosis": "d", "primaryInfo": "p", "openingLine": "o", "visualAppearance": "v"}
                }
            }),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn ai_quota_failure_is_429() {
        let client = MockLlmClient::failing(LlmError::Provider {
            status: 429,
            status_text: Some("RESOURCE_EXHAUSTED".into()),
            message: "Resource has been exhausted (e.g. check quota).".into(),
        });
        let req = post_json(
            "/api/ai",
            serde_json::json!({"type": "getFeedback", "payload": {"caseState": {}}}),
        );
        let response = app_with(client).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json_of(response).await["error"],
            "QUOTA_EXCEEDED: The application's daily usage limit has been reached. Please try again tomorrow."
        );
    }

    #[tokio::test]
    async fn ai_malformed_output_is_500_with_message() {
        let client = MockLlmClient::new("I'm not sure.");
        let req = post_json(
            "/api/ai",
            serde_json::json!({"type": "getDetailedFeedback", "payload": {"caseState": {}}}),
        );
        let response = app_with(client).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_of(response).await["error"],
            "The AI returned an invalid format for getDetailedCaseFeedback."
        );
    }

    #[tokio::test]
    async fn ai_missing_case_details_is_400() {
        let req = post_json(
            "/api/ai",
            serde_json::json!({"type": "getPatientResponse", "payload": {"history": []}}),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["error"],
            "Missing required field: caseDetails"
        );
    }

    #[tokio::test]
    async fn ai_empty_history_is_400_without_provider_call() {
        let client = Arc::new(MockLlmClient::new("Hello doctor."));
        let req = post_json(
            "/api/ai",
            serde_json::json!({
                "type": "getPatientResponse",
                "payload": {
                    "history": [],
                    "caseDetails": {
                        "diagnosis": "Pre-eclampsia",
                        "primaryInfo": "## BIODATA\n32-year-old G2P1",
                        "openingLine": "My head is pounding.",
                        "visualAppearance": "Anxious woman."
                    }
                }
            }),
        );
        let app = api_router(ApiContext::with_client(client.clone(), "test-model"));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "Missing required field: history");
        assert!(client.prompts().is_empty());
    }

    #[tokio::test]
    async fn location_lookup_returns_profile() {
        let response = app()
            .oneshot(get_req("/api/locations/Brazil"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["region"], "South America");
        assert_eq!(json["economicLevel"], "middle-income");
        assert_eq!(json["availableResources"], "standard");
    }

    #[tokio::test]
    async fn trial_increment_then_lookup() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/user/increment-trial",
                serde_json::json!({"userId": "u-42"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["trialsUsed"], 1);
        assert_eq!(json["trialsRemaining"], 4);

        let response = app.oneshot(get_req("/api/user/u-42")).await.unwrap();
        let json = json_of(response).await;
        assert_eq!(json["id"], "u-42");
        assert_eq!(json["trialsUsed"], 1);
    }

    #[tokio::test]
    async fn trials_past_the_allowance_stay_at_zero_remaining() {
        let app = app();
        let mut last = serde_json::Value::Null;
        for _ in 0..6 {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/user/increment-trial",
                    serde_json::json!({"userId": "u-7"}),
                ))
                .await
                .unwrap();
            last = json_of(response).await;
        }
        assert_eq!(last["trialsUsed"], 6);
        assert_eq!(last["trialsRemaining"], 0);
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let response = app().oneshot(get_req("/api/user/ghost")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "User not found");
    }

    #[tokio::test]
    async fn increment_without_user_id_is_400() {
        let response = app()
            .oneshot(post_json("/api/user/increment-trial", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn send_email_requires_recipient_and_feedback() {
        let response = app()
            .oneshot(post_json(
                "/api/send-email",
                serde_json::json!({"recipientEmail": "s@example.test"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["error"],
            "Recipient email and feedback are required"
        );
    }

    fn report_body() -> serde_json::Value {
        serde_json::json!({
            "recipientEmail": "s@example.test",
            "feedback": {
                "diagnosis": "Ectopic pregnancy",
                "keyTakeaway": "k",
                "whatYouDidWell": ["a"],
                "whatCouldBeImproved": ["b"],
                "clinicalTip": "t"
            }
        })
    }

    #[tokio::test]
    async fn send_email_succeeds_with_logging_mailer() {
        let response = app()
            .oneshot(post_json("/api/send-email", report_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["message"], "Email sent successfully");
    }

    struct FailingMailer;

    #[async_trait::async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
            Err(MailError::Provider {
                status: 503,
                message: "down".into(),
            })
        }
    }

    #[tokio::test]
    async fn send_email_failure_is_500() {
        let engine = SimulationEngine::new(Arc::new(MockLlmClient::new("{}")), "m");
        let app = api_router(ApiContext::new(engine, Arc::new(FailingMailer)));
        let response = app
            .oneshot(post_json("/api/send-email", report_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(response).await["error"], "Failed to send email");
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let response = app().oneshot(get_req("/api/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
