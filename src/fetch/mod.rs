mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// Downloads `url` into memory. Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse::<reqwest::Url>().with_context(|| format!("invalid url '{url}'"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    debug!(status = %resp.status(), content_length = ?resp.content_length(), "Response received");
    Ok(resp.bytes().await?.to_vec())
}
