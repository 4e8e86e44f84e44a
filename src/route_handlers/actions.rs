use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    payload::{Action, ActionPayload},
    AppState, SharedAppState,
};

pub async fn approve(State(state): State<SharedAppState>, Path(day): Path<String>) -> Response {
    relay_action(&state, day, Action::Approved).await
}

pub async fn regenerate_single(
    State(state): State<SharedAppState>,
    Path(day): Path<String>,
) -> Response {
    relay_action(&state, day, Action::Regenerated).await
}

async fn relay_action(state: &AppState, day: String, action: Action) -> Response {
    let payload = ActionPayload::new(day, action);
    let day = payload.day().to_string();
    info!(day = %day, action = payload.action().as_str(), "Relaying action");

    if state.config.fire_and_forget {
        state
            .forwarder
            .dispatch_detached(state.config.target_server.clone(), payload);
        return super::accepted();
    }

    match state
        .forwarder
        .forward(&state.config.target_server, &payload)
        .await
    {
        Ok(response) if response.body.is_empty() => {
            let message = match response.status.is_success() {
                true => action.success_message(&day),
                false => action.failure_message(&day),
            };
            (response.status, message).into_response()
        }
        Ok(response) => super::passthrough(response),
        Err(err) => {
            error!("Error sending POST for {} {}: {:#}", day, action.verb(), err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                action.failure_message(&day),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::forwarder::tests::{hook_url, unreachable_url};
    use crate::route_handlers::tests::{app, send, send_raw};

    #[tokio::test]
    async fn approve_posts_day_and_returns_downstream_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({ "day": "friday", "action": "approved" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, false, 0);
        let (status, content_type, body) = send(app, "POST", "/api/actions/approve/friday", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn regenerate_single_keeps_day_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "day": "Someday", "action": "regenerated" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, false, 0);
        let (status, _, body) =
            send(app, "POST", "/api/actions/regenerate-single/Someday", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Someday has been regenerated");
    }

    #[tokio::test]
    async fn non_2xx_reply_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such workflow"))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, false, 2);
        let (status, _, body) = send(app, "POST", "/api/actions/approve/monday", "").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "no such workflow");
    }

    #[tokio::test]
    async fn empty_non_2xx_reply_gets_failure_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, false, 0);
        let (status, _, body) = send(app, "POST", "/api/actions/approve/monday", "").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Failed to approve monday");
    }

    #[tokio::test]
    async fn non_utf8_reply_is_relayed_byte_for_byte() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![99u8, 97, 102, 233], "text/plain;charset=iso-8859-1"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, false, 0);
        let (status, content_type, body) =
            send_raw(app, "POST", "/api/actions/approve/monday", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain;charset=iso-8859-1"));
        assert_eq!(body, vec![99u8, 97, 102, 233]);
    }

    #[tokio::test]
    async fn unreachable_target_fails_after_three_attempts() {
        let app = app(unreachable_url(), None, false, 2);

        let started = Instant::now();
        let (status, _, body) = send(app, "POST", "/api/actions/approve/friday", "").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Failed to approve friday");
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn fire_and_forget_answers_before_downstream_does() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let app = app(hook_url(&server, "/hook"), None, true, 0);
        let (status, _, body) = tokio::time::timeout(
            Duration::from_secs(1),
            send(app, "POST", "/api/actions/approve/monday", ""),
        )
        .await
        .expect("fire-and-forget response should not wait for the webhook");

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({ "status": "accepted", "info": "forwarded-async" })
        );
    }
}
