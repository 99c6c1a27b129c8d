use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context};

use crate::error::{DisplayError, Result};

pub struct DisplayConfig {
    pub server_url: String,
    pub display_duration: Duration,
    pub poll_interval: Duration,
    pub pull_timeout: Duration,
    pub push_idle_timeout: Duration,
}

impl DisplayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let server_url = lookup("KIOSK_SERVER_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let display_seconds: u64 = parse_var(&lookup, "KIOSK_DISPLAY_SECONDS", "15")?;
        let poll_secs: u64 = parse_var(&lookup, "KIOSK_POLL_INTERVAL_SECS", "10")?;
        let pull_timeout_ms: u64 = parse_var(&lookup, "KIOSK_PULL_TIMEOUT_MS", "5000")?;
        let idle_timeout_ms: u64 = parse_var(&lookup, "KIOSK_PUSH_IDLE_TIMEOUT_MS", "45000")?;

        if [display_seconds, poll_secs, pull_timeout_ms, idle_timeout_ms].contains(&0) {
            bail!("Display, poll and timeout durations must be positive");
        }

        let config = Self {
            server_url,
            display_duration: Duration::from_secs(display_seconds),
            poll_interval: Duration::from_secs(poll_secs),
            pull_timeout: Duration::from_millis(pull_timeout_ms),
            push_idle_timeout: Duration::from_millis(idle_timeout_ms),
        };
        config.push_url()?;
        Ok(config)
    }

    /// WebSocket endpoint derived from the server URL.
    pub fn push_url(&self) -> Result<String> {
        let rest = if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(DisplayError::InvalidUrl(self.server_url.clone()));
        };
        Ok(format!("{rest}/ws"))
    }

    pub fn latest_url(&self) -> String {
        format!("{}/result/latest", self.server_url)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow!("{err}"))
        .with_context(|| format!("Invalid {key}: '{raw}'"))
}
