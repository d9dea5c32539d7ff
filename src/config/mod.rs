use crate::errors::ForwarderError;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub queue_url: String,
    pub region: Option<String>,
    pub max_messages: i32,
    pub visibility_timeout_secs: i32,
    pub wait_time_secs: i32,
    /// Decoder selector; `None` forwards raw bodies untouched.
    pub decoder: Option<String>,
    pub tree_delimiter: String,
    pub batched: bool,
    pub concurrent: bool,
    pub verbose: bool,
}

pub fn load_config() -> Result<Config, ForwarderError> {
    dotenv().ok();
    let queue_url = env::var("SQS_QUEUE_URL")
        .map_err(|_| ForwarderError::Config("SQS_QUEUE_URL is required".into()))?;
    Ok(Config {
        queue_url,
        region: env::var("AWS_REGION").ok(),
        max_messages: numeric_or(env::var("MAX_MESSAGES").ok(), 6),
        visibility_timeout_secs: numeric_or(env::var("VISIBILITY_TIMEOUT_SECS").ok(), 60),
        wait_time_secs: numeric_or(env::var("WAIT_TIME_SECS").ok(), 3),
        decoder: env::var("DECODER").ok().filter(|s| !s.is_empty()),
        tree_delimiter: env::var("TREE_DELIMITER").unwrap_or_else(|_| ",".into()),
        batched: flag(env::var("BATCHED").ok()),
        concurrent: flag(env::var("CONCURRENT").ok()),
        verbose: flag(env::var("VERBOSE").ok()),
    })
}

/// Numeric settings fall back to their default when absent or non-numeric.
fn numeric_or(raw: Option<String>, default: i32) -> i32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("TRUE") | Some("True") | Some("yes")
    )
}
