// Cache Protocol Handler
//
// Serves the cadete:// scheme from the primed asset cache, falling back
// to the network on a miss. Network responses are never written back;
// the cache only changes at install time.

use crate::cache::prime;
use crate::cache::store::SharedCache;
use tauri::http::{Request, Response, ResponseBuilder};

/// Extract the path component of a custom-scheme request URI.
///
/// wry surfaces the scheme differently per platform (cadete://localhost/x
/// on some, https://cadete.localhost/x on others); only the path matters
/// for cache lookup.
pub fn request_path(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(parsed) => {
            let path = parsed.path();
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        }
        Err(_) => "/".to_string(),
    }
}

/// Answer one request: cache hit, else network, else a gateway error
pub fn handle_request(
    cache: &SharedCache,
    request: &Request,
) -> Result<Response, Box<dyn std::error::Error>> {
    let path = request_path(request.uri());

    if let Some(asset) = cache.lock().unwrap().match_url(&path) {
        println!("[CacheProtocol] Cache hit: {}", path);
        return ResponseBuilder::new()
            .status(asset.status)
            .mimetype(&asset.content_type)
            .body(asset.body.clone());
    }

    println!("[CacheProtocol] Cache miss, fetching from network: {}", path);
    match prime::fetch_asset(&path) {
        Ok(asset) => ResponseBuilder::new()
            .status(asset.status)
            .mimetype(&asset.content_type)
            .body(asset.body),
        Err(e) => {
            eprintln!("[CacheProtocol] ⚠️ Network fallback failed for {}: {}", path, e);
            ResponseBuilder::new()
                .status(504)
                .mimetype("text/plain")
                .body(format!("upstream fetch failed: {}", e).into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_extraction() {
        assert_eq!(request_path("cadete://localhost/"), "/");
        assert_eq!(
            request_path("cadete://localhost/static/css/bootstrap.min.css"),
            "/static/css/bootstrap.min.css"
        );
        assert_eq!(
            request_path("https://cadete.localhost/offline.html"),
            "/offline.html"
        );
    }

    #[test]
    fn test_request_path_ignores_query() {
        assert_eq!(
            request_path("cadete://localhost/offline.html?v=2"),
            "/offline.html"
        );
    }

    #[test]
    fn test_bad_uri_maps_to_root() {
        assert_eq!(request_path("not a uri"), "/");
    }
}
