//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body-size
//! checks, access logging, and dispatch to the activities API or the static
//! front-end.

use crate::api;
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request context for conditional and HEAD handling
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let access_log = state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed);

    // 1. Check HTTP method
    if let Some(mut resp) = check_http_method(&method, state.config.http.enable_cors) {
        stamp_server_header(&mut resp, &state.config.http.server_name);
        return Ok(resp);
    }

    // 2. Check body size
    if let Some(mut resp) = check_body_size(&req, state.config.http.max_body_size) {
        stamp_server_header(&mut resp, &state.config.http.server_name);
        return Ok(resp);
    }

    // 3. Log headers if enabled
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let ctx = RequestContext {
        is_head: method == Method::HEAD,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    let referer = header_string(&req, "referer");
    let user_agent = header_string(&req, "user-agent");

    // 4. Dispatch
    let response = route(&method, uri.path(), uri.query(), &ctx, &state).await;

    if access_log {
        let entry = logger::AccessLogEntry {
            remote_addr: peer_addr.to_string(),
            time: chrono::Local::now(),
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(ToString::to_string),
            http_version: version_label(req.version()),
            status: response.status().as_u16(),
            body_bytes: response.body().size_hint().exact().unwrap_or(0),
            referer,
            user_agent,
            request_time_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        };
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path, identifying the server on every response
pub async fn route(
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    ctx: &RequestContext,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let mut response = dispatch_path(method, path, raw_query, ctx, state).await;
    stamp_server_header(&mut response, &state.config.http.server_name);
    response
}

async fn dispatch_path(
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    ctx: &RequestContext,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    // 1. Root redirects to the front-end entry page
    if path == "/" {
        return http::build_temporary_redirect("/static/index.html");
    }

    // 2. Favicon
    let statics = &state.config.static_files;
    if statics.favicon_paths.iter().any(|p| path == p) {
        return static_files::serve_favicon(ctx, statics).await;
    }

    // 3. Activities API
    if path == "/activities" || path.starts_with("/activities/") {
        return api::dispatch(method, path, raw_query, state).await;
    }

    // 4. Static front-end mount
    let mount = statics.mount.trim_end_matches('/');
    if path == mount || path.starts_with(&format!("{mount}/")) {
        if *method != Method::GET && *method != Method::HEAD {
            return http::build_405_response("GET, HEAD, OPTIONS");
        }
        return static_files::serve_directory(ctx, path, statics).await;
    }

    api::not_found()
}

/// Set the `Server` header from the configured name
fn stamp_server_header(response: &mut Response<Full<Bytes>>, server_name: &str) {
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert("Server", value);
    }
}

/// Check HTTP method and return an early response for unsupported methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD | Method::POST | Method::DELETE => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response("GET, HEAD, POST, DELETE, OPTIONS"))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    const fn ctx() -> RequestContext {
        RequestContext {
            is_head: false,
            if_none_match: None,
        }
    }

    #[tokio::test]
    async fn root_redirects_to_front_end() {
        let state = test_state();
        let resp = route(&Method::GET, "/", None, &ctx(), &state).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()["location"], "/static/index.html");
    }

    #[tokio::test]
    async fn activities_paths_reach_the_api() {
        let state = test_state();
        let resp = route(&Method::GET, "/activities", None, &ctx(), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = route(
            &Method::POST,
            "/activities/Chess%20Club/signup",
            Some("email=router@mergington.edu"),
            &ctx(),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let catalog = state.store.snapshot().await;
        assert!(catalog["Chess Club"]
            .participants
            .contains(&"router@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let state = test_state();
        let resp = route(&Method::GET, "/unknown", None, &ctx(), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let data: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(data["detail"], "Not Found");
    }

    #[tokio::test]
    async fn static_mount_rejects_mutating_methods() {
        let state = test_state();
        let resp = route(&Method::POST, "/static/index.html", None, &ctx(), &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn responses_carry_the_server_header() {
        let state = test_state();
        let resp = route(&Method::GET, "/activities", None, &ctx(), &state).await;
        assert_eq!(resp.headers()["server"], "Mergington-Activities/0.1");

        // Error responses are stamped too
        let resp = route(&Method::GET, "/unknown", None, &ctx(), &state).await;
        assert_eq!(resp.headers()["server"], "Mergington-Activities/0.1");
    }

    #[test]
    fn oversized_content_length_is_413() {
        let req = Request::builder()
            .header("content-length", "2097152")
            .body(())
            .unwrap();
        let resp = check_body_size(&req, 1_048_576).unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn content_length_within_limit_passes() {
        let req = Request::builder()
            .header("content-length", "512")
            .body(())
            .unwrap();
        assert!(check_body_size(&req, 1_048_576).is_none());

        // No Content-Length at all skips the check
        let req = Request::builder().body(()).unwrap();
        assert!(check_body_size(&req, 1_048_576).is_none());
    }

    #[test]
    fn malformed_content_length_skips_the_check() {
        let req = Request::builder()
            .header("content-length", "not-a-number")
            .body(())
            .unwrap();
        assert!(check_body_size(&req, 1_048_576).is_none());
    }

    #[tokio::test]
    async fn check_http_method_gate() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::POST, false).is_none());
        assert!(check_http_method(&Method::DELETE, false).is_none());

        let resp = check_http_method(&Method::OPTIONS, false).unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = check_http_method(&Method::PUT, false).unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
