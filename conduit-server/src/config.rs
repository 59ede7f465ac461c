use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL registry and workflow store when set, in-memory otherwise
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub region: String,
    pub account_id: String,
    pub fan_out_topic_arn: Option<String>,
    pub worker_parameter: Option<String>,
    pub relay_poll_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            region: std::env::var("CONDUIT_REGION")
                .unwrap_or_else(|_| "ap-southeast-2".to_string()),
            account_id: std::env::var("CONDUIT_ACCOUNT_ID")
                .unwrap_or_else(|_| "000000000000".to_string()),
            fan_out_topic_arn: optional("CONDUIT_FAN_OUT_TOPIC_ARN"),
            worker_parameter: optional("CONDUIT_WORKER_PARAMETER"),
            relay_poll_interval: Duration::from_millis(
                std::env::var("CONDUIT_RELAY_POLL_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("CONDUIT_RELAY_POLL_MS must be a number of milliseconds")?,
            ),
        })
    }
}

/// Base URL the CLI commands talk to
pub fn api_url() -> String {
    std::env::var("CONDUIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
