//! Static file serving module
//!
//! Serves the front-end assets: file loading with traversal protection,
//! index-file resolution, MIME detection, and `ETag` revalidation.

use crate::config::StaticConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve the favicon from the static directory
pub async fn serve_favicon(ctx: &RequestContext, statics: &StaticConfig) -> Response<Full<Bytes>> {
    let favicon_path = Path::new(&statics.dir).join("favicon.svg");
    match fs::read(&favicon_path).await {
        Ok(data) => build_file_response(&data, "image/svg+xml", ctx),
        Err(_) => http::build_404_response(),
    }
}

/// Serve a file from the static mount
pub async fn serve_directory(
    ctx: &RequestContext,
    path: &str,
    statics: &StaticConfig,
) -> Response<Full<Bytes>> {
    match load_from_directory(path, statics).await {
        Some((content, content_type)) => build_file_response(&content, content_type, ctx),
        None => http::build_404_response(),
    }
}

/// Resolve a request path inside the static directory.
///
/// The mount prefix is stripped, `..` components are removed, and the
/// canonicalized result must stay inside the static directory.
async fn load_from_directory(
    path: &str,
    statics: &StaticConfig,
) -> Option<(Vec<u8>, &'static str)> {
    let clean_path = path.trim_start_matches('/').replace("..", "");

    let mount_clean = statics.mount.trim_matches('/');
    let relative_path = if clean_path == mount_clean {
        ""
    } else {
        clean_path
            .strip_prefix(&format!("{mount_clean}/"))
            .unwrap_or(&clean_path)
    };

    let mut file_path = Path::new(&statics.dir).join(relative_path);

    let static_dir_canonical = match Path::new(&statics.dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                statics.dir
            ));
            return None;
        }
    };

    // Directory requests resolve to the index file
    if file_path.is_dir() || relative_path.is_empty() || relative_path.ends_with('/') {
        file_path = file_path.join(&statics.index_file);
    }

    // File not found is a plain 404, no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Build a file response, answering 304 when the client's `ETag` still matches
fn build_file_response(
    data: &[u8],
    content_type: &str,
    ctx: &RequestContext,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    http::response::build_cached_response(
        Bytes::from(data.to_owned()),
        content_type,
        &etag,
        ctx.is_head,
    )
}
