use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, error};

use crate::{
    payload::{Action, ActionPayload, Day},
    SharedAppState,
};

/**
 * per-day GET routes (`/monday/approve`, `/monday/regenerate`, ...) kept for
 * links that predate the /api routes; one handler registered for every day
 **/
pub fn router() -> Router<SharedAppState> {
    Day::ALL.iter().fold(Router::new(), |router, &day| {
        router
            .route(
                &format!("/{}/approve", day.as_str()),
                get(move |State(state): State<SharedAppState>| {
                    handler(state, day, Action::Approved)
                }),
            )
            .route(
                &format!("/{}/regenerate", day.as_str()),
                get(move |State(state): State<SharedAppState>| {
                    handler(state, day, Action::Regenerated)
                }),
            )
    })
}

async fn handler(state: SharedAppState, day: Day, action: Action) -> Response {
    let payload = ActionPayload::new(day.as_str(), action);

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
        Ok(response) if response.status.is_success() => {
            debug!("{} {} relayed", day.as_str(), action.as_str());
            action.success_message(day.as_str()).into_response()
        }
        Ok(response) => {
            error!(
                "Error sending POST for {} {}: downstream answered {}",
                day.as_str(),
                action.verb(),
                response.status
            );
            failure(day, action)
        }
        Err(err) => {
            error!(
                "Error sending POST for {} {}: {:#}",
                day.as_str(),
                action.verb(),
                err
            );
            failure(day, action)
        }
    }
}

fn failure(day: Day, action: Action) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        action.failure_message(day.as_str()),
    )
        .into_response()
}
