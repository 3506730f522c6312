use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{debug, info};
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Downloads a spreadsheet payload over http(s).
pub fn fetch_bytes(url: &str, timeout_secs: u64) -> Result<Vec<u8>> {
    let trimmed = url.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        bail!("Unsupported URL '{trimmed}': only http and https sources can be fetched");
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(USER_AGENT)
        .build()
        .context("Building HTTP client")?;

    debug!("GET {trimmed}");
    let response = client
        .get(trimmed)
        .send()
        .with_context(|| format!("Requesting {trimmed}"))?
        .error_for_status()
        .with_context(|| format!("Downloading {trimmed}"))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("Reading response body from {trimmed}"))?;
    info!("Fetched {} byte(s) from {trimmed}", bytes.len());
    Ok(bytes.to_vec())
}
