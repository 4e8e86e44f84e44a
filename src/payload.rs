use serde::Serialize;
use serde_json::{json, Value};

use crate::forwarder::DownstreamResponse;

pub const FORWARDED_ASYNC: &str = "forwarded-async";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approved,
    Regenerated,
}

impl Action {
    /// Verb used in user-facing messages ("Failed to approve friday").
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Approved => "approve",
            Action::Regenerated => "regenerate",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approved => "approved",
            Action::Regenerated => "regenerated",
        }
    }

    pub fn success_message(&self, day: &str) -> String {
        format!("{} has been {}", day, self.as_str())
    }

    pub fn failure_message(&self, day: &str) -> String {
        format!("Failed to {} {}", self.verb(), day)
    }
}

/// `{day, action}` body posted to the single-action target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPayload {
    day: String,
    action: Action,
}

impl ActionPayload {
    pub fn new(day: impl Into<String>, action: Action) -> Self {
        Self {
            day: day.into(),
            action,
        }
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn action(&self) -> Action {
        self.action
    }
}

/// Parses the inbound regenerate-all body. An empty body means the default batch payload.
pub fn batch_payload(body: &[u8]) -> serde_json::Result<Value> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(json!({ "action": "regenerate-all" }));
    }
    serde_json::from_slice(body)
}

/// What happened to one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeliveryOutcome {
    Delivered { status: u16, body: String },
    Failed { error: String },
    Dispatched { info: &'static str },
}

impl DeliveryOutcome {
    pub fn dispatched() -> Self {
        DeliveryOutcome::Dispatched {
            info: FORWARDED_ASYNC,
        }
    }
}

impl From<anyhow::Result<DownstreamResponse>> for DeliveryOutcome {
    fn from(result: anyhow::Result<DownstreamResponse>) -> Self {
        match result {
            Ok(response) => DeliveryOutcome::Delivered {
                status: response.status.as_u16(),
                body: String::from_utf8_lossy(&response.body).into_owned(),
            },
            Err(err) => DeliveryOutcome::Failed {
                error: format!("{:#}", err),
            },
        }
    }
}
