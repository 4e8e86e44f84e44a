use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::env_utils::{self, parse_flag, parse_or_default};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRIES: u32 = 0;

/// Relay settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub target_server: Url,
    pub regenerate_target: Url,
    pub additional_regenerate_webhook: Option<Url>,
    pub webhook_timeout: Duration,
    pub webhook_retries: u32,
    pub fire_and_forget: bool,
}

impl RelayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(env_utils::lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or_default("PORT", lookup("PORT"), env_utils::DEFAULT_PORT);

        let target_server = lookup("TARGET_SERVER")
            .context("TARGET_SERVER environment variable not found")?;
        let target_server = parse_url("TARGET_SERVER", &target_server)?;

        let regenerate_target = match lookup("REGENERATE_TARGET") {
            Some(raw) => parse_url("REGENERATE_TARGET", &raw)?,
            None => target_server.clone(),
        };

        let additional_regenerate_webhook = match lookup("ADDITIONAL_REGENERATE_WEBHOOK") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(parse_url("ADDITIONAL_REGENERATE_WEBHOOK", &raw)?)
            }
            _ => None,
        };

        let timeout_ms = parse_or_default(
            "WEBHOOK_TIMEOUT_MS",
            lookup("WEBHOOK_TIMEOUT_MS"),
            DEFAULT_TIMEOUT_MS,
        );
        let webhook_retries =
            parse_or_default("WEBHOOK_RETRIES", lookup("WEBHOOK_RETRIES"), DEFAULT_RETRIES);
        let fire_and_forget = parse_flag("FIRE_AND_FORGET", lookup("FIRE_AND_FORGET"), false);

        Ok(Self {
            port,
            target_server,
            regenerate_target,
            additional_regenerate_webhook,
            webhook_timeout: Duration::from_millis(timeout_ms),
            webhook_retries,
            fire_and_forget,
        })
    }
}

fn parse_url(name: &str, raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("{} is not a valid URL: {}", name, raw))
}
