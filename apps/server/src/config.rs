use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context};
use kioskfeed_core::constants::DEFAULT_STORE_CAPACITY;
use kioskfeed_core::normalizer::{ContentFormat, NormalizerConfig, SplitRule};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub webhook_token: String,
    pub store_capacity: usize,
    pub display_seconds: u64,
    pub poll_interval_secs: u64,
    pub webhook_rate_per_min: u32,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub push_ping_interval: Duration,
    pub normalizer: NormalizerConfig,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr = parse_var(&lookup, "KIOSK_LISTEN_ADDR", "0.0.0.0:3000")?;
        let webhook_token = lookup("KIOSK_WEBHOOK_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| anyhow!("KIOSK_WEBHOOK_TOKEN must be set"))?;
        let store_capacity: usize = parse_var(
            &lookup,
            "KIOSK_STORE_CAPACITY",
            &DEFAULT_STORE_CAPACITY.to_string(),
        )?;
        let display_seconds: u64 = parse_var(&lookup, "KIOSK_DISPLAY_SECONDS", "15")?;
        let poll_interval_secs: u64 = parse_var(&lookup, "KIOSK_POLL_INTERVAL_SECS", "10")?;
        let webhook_rate_per_min: u32 = parse_var(&lookup, "KIOSK_WEBHOOK_RATE_PER_MIN", "30")?;
        let cors_allow = var("KIOSK_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var(&lookup, "KIOSK_REQUEST_TIMEOUT_MS", "30000")?;
        let ping_ms: u64 = parse_var(&lookup, "KIOSK_PUSH_PING_MS", "20000")?;
        let content_format: ContentFormat = parse_var(&lookup, "KIOSK_CONTENT_FORMAT", "html")?;

        let defaults = SplitRule::v1();
        let split_rule = SplitRule {
            heading_marker: var("KIOSK_HEADING_MARKER", &defaults.heading_marker),
            list_marker: var("KIOSK_LIST_MARKER", &defaults.list_marker),
            ..defaults
        };

        if store_capacity == 0 {
            bail!("KIOSK_STORE_CAPACITY must be at least 1");
        }
        if display_seconds == 0 || poll_interval_secs == 0 {
            bail!("KIOSK_DISPLAY_SECONDS and KIOSK_POLL_INTERVAL_SECS must be at least 1");
        }
        if ping_ms == 0 {
            bail!("KIOSK_PUSH_PING_MS must be at least 1");
        }
        if webhook_rate_per_min == 0 {
            bail!("KIOSK_WEBHOOK_RATE_PER_MIN must be at least 1");
        }

        Ok(Self {
            listen_addr,
            webhook_token,
            store_capacity,
            display_seconds,
            poll_interval_secs,
            webhook_rate_per_min,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            push_ping_interval: Duration::from_millis(ping_ms),
            normalizer: NormalizerConfig {
                content_format,
                split_rule,
            },
        })
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
