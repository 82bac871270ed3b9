//! Works out where to send an employee after they log in.
//!
//! Only same-site paths are accepted so that a crafted log-in link cannot
//! bounce the employee to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && !path.starts_with("/api")
}

/// Reduce `raw_url` to a safe, same-site path and query, if possible.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the employee to the page behind `request`.
///
/// For HTMX requests to the API the page is read from the `HX-Current-URL`
/// header, since the API route itself is not a page.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

/// The log-in page URL with `target` as the `redirect_url` query parameter.
pub fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("Could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{}", endpoints::LOG_IN_VIEW, query))
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so drop the scheme and host before checking.
    let uri = current_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    if is_safe_redirect_url(path_and_query) {
        Some(path_and_query.to_owned())
    } else {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
        None
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use super::{
        build_log_in_redirect_url, build_log_in_redirect_url_from_target, normalize_redirect_url,
    };

    #[test]
    fn keeps_local_paths() {
        assert_eq!(
            normalize_redirect_url("/commissions?start=2025-01-01"),
            Some("/commissions?start=2025-01-01".to_owned())
        );
    }

    #[test]
    fn rejects_other_sites() {
        assert_eq!(normalize_redirect_url("https://example.com/"), None);
        assert_eq!(normalize_redirect_url("//example.com/"), None);
    }

    #[test]
    fn rejects_log_in_page_and_api() {
        assert_eq!(normalize_redirect_url("/log_in"), None);
        assert_eq!(normalize_redirect_url("/api/transactions"), None);
    }

    #[test]
    fn encodes_target() {
        assert_eq!(
            build_log_in_redirect_url_from_target("/customers?q=ford ranger"),
            Some("/log_in?redirect_url=%2Fcustomers%3Fq%3Dford+ranger".to_owned())
        );
    }

    #[test]
    fn page_request_redirects_back_to_page() {
        let request = Request::builder()
            .uri("/transactions")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/log_in?redirect_url=%2Ftransactions".to_owned())
        );
    }

    #[test]
    fn api_request_uses_current_url() {
        let request = Request::builder()
            .uri("/api/transactions")
            .header("hx-request", "true")
            .header("hx-current-url", "http://localhost:3000/transactions/new")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/log_in?redirect_url=%2Ftransactions%2Fnew".to_owned())
        );
    }

    #[test]
    fn api_request_without_htmx_has_no_target() {
        let request = Request::builder()
            .uri("/api/transactions")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
