use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::{
    payload::{batch_payload, DeliveryOutcome},
    reconcile::{reconcile, Reconciled},
    AppState, SharedAppState,
};

#[derive(Debug, Serialize)]
struct AsyncAccepted {
    status: &'static str,
    primary: DeliveryOutcome,
    additional: Option<DeliveryOutcome>,
}

pub async fn handler(State(state): State<SharedAppState>, body: Bytes) -> Response {
    let payload = match batch_payload(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("Rejecting regenerate-all body: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid JSON body: {}", err) })),
            )
                .into_response();
        }
    };

    if state.config.fire_and_forget {
        let additional = state
            .config
            .additional_regenerate_webhook
            .as_ref()
            .map(|_| DeliveryOutcome::dispatched());

        let task_state = state.clone();
        tokio::spawn(async move {
            match dispatch(&task_state, &payload).await {
                Reconciled::Passthrough(response) => {
                    info!(status = %response.status, "Async regenerate-all delivered")
                }
                Reconciled::AllFailed(failure) => error!(
                    "Async regenerate-all failed: {}",
                    serde_json::to_string(&failure).unwrap_or_default()
                ),
            }
        });

        return (
            StatusCode::ACCEPTED,
            Json(AsyncAccepted {
                status: "accepted",
                primary: DeliveryOutcome::dispatched(),
                additional,
            }),
        )
            .into_response();
    }

    match dispatch(&state, &payload).await {
        Reconciled::Passthrough(response) => super::passthrough(response),
        Reconciled::AllFailed(failure) => {
            error!("regenerate-all failed on every destination");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
        }
    }
}

/// Sends the batch payload to the primary target and, when configured, the
/// additional webhook. Neither delivery waits on the other's outcome.
async fn dispatch(state: &AppState, payload: &Value) -> Reconciled {
    info!(
        primary = %state.config.regenerate_target,
        additional = state.config.additional_regenerate_webhook.is_some(),
        "Dispatching regenerate-all"
    );

    let primary = state
        .forwarder
        .forward(&state.config.regenerate_target, payload);
    let additional = async {
        match &state.config.additional_regenerate_webhook {
            Some(url) => Some(state.forwarder.forward(url, payload).await),
            None => None,
        }
    };

    let (primary, additional) = tokio::join!(primary, additional);
    reconcile(primary, additional)
}
