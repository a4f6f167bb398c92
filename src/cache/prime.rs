// Asset Fetcher
//
// Blocking HTTP fetcher used for install-time priming and for the
// network fallback of the protocol handler.

use crate::cache::store::CachedAsset;
use crate::routing::target::APP_ORIGIN;
use once_cell::sync::Lazy;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

static HTTP_CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
});

/// Fetch one asset. Root-relative paths resolve against the panel origin.
/// Non-success statuses are errors, so a missing asset fails the prime.
pub fn fetch_asset(path: &str) -> Result<CachedAsset, String> {
    let url = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", APP_ORIGIN, path)
    };

    let response = HTTP_CLIENT.get(&url).send().map_err(|e| e.to_string())?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let body = response.bytes().map_err(|e| e.to_string())?.to_vec();

    Ok(CachedAsset {
        status: status.as_u16(),
        content_type,
        body,
    })
}
