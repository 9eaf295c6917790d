// Activities API handlers module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response;
use crate::config::AppState;
use crate::http::query;

/// GET /activities
///
/// Serialize the full catalog as a map from activity name to record.
/// No filtering, pagination, or sorting.
pub async fn list_activities(state: &AppState) -> Response<Full<Bytes>> {
    let catalog = state.store.snapshot().await;
    response::json_response(StatusCode::OK, &catalog)
}

/// POST /activities/{name}/signup?email={email}
///
/// `email` is required but otherwise unvalidated; an empty value is accepted.
pub async fn signup(
    state: &AppState,
    activity: &str,
    raw_query: Option<&str>,
) -> Response<Full<Bytes>> {
    let Some(email) = query::query_param(raw_query, "email") else {
        return response::missing_param("email");
    };

    match state.store.signup(activity, &email).await {
        Ok(()) => response::message(&format!("Signed up {email} for {activity}")),
        Err(e) => response::detail(e.status(), &e.to_string()),
    }
}

/// DELETE /activities/{name}/unregister?email={email}
pub async fn unregister(
    state: &AppState,
    activity: &str,
    raw_query: Option<&str>,
) -> Response<Full<Bytes>> {
    let Some(email) = query::query_param(raw_query, "email") else {
        return response::missing_param("email");
    };

    match state.store.unregister(activity, &email).await {
        Ok(()) => response::message(&format!("Unregistered {email} from {activity}")),
        Err(e) => response::detail(e.status(), &e.to_string()),
    }
}
