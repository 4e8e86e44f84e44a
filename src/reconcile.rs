use serde::Serialize;

use crate::{forwarder::DownstreamResponse, payload::DeliveryOutcome};

pub const ALL_FAILED: &str = "No regenerate webhook accepted the request";

#[derive(Debug)]
pub enum Reconciled {
    /// A destination answered 2xx; its reply goes back to the caller as-is.
    Passthrough(DownstreamResponse),
    /// Nobody answered 2xx. Rendered as a 500 with both outcomes.
    AllFailed(BatchFailure),
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub error: &'static str,
    pub primary: DeliveryOutcome,
    pub additional: Option<DeliveryOutcome>,
}

/// Picks the response for a batch dispatch: primary 2xx first, then additional 2xx,
/// otherwise a failure carrying both outcomes.
pub fn reconcile(
    primary: anyhow::Result<DownstreamResponse>,
    additional: Option<anyhow::Result<DownstreamResponse>>,
) -> Reconciled {
    let primary = match primary {
        Ok(response) if response.status.is_success() => return Reconciled::Passthrough(response),
        other => other,
    };

    let additional = match additional {
        Some(Ok(response)) if response.status.is_success() => {
            return Reconciled::Passthrough(response)
        }
        other => other,
    };

    Reconciled::AllFailed(BatchFailure {
        error: ALL_FAILED,
        primary: primary.into(),
        additional: additional.map(DeliveryOutcome::from),
    })
}
