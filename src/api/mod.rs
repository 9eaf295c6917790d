//! Activities API module
//!
//! Dispatches `/activities` routes to handler functions based on request
//! path and method. Activity names in the path are percent-decoded before
//! the store lookup, so `/activities/Programming%20Class/signup` targets
//! "Programming Class".

mod handlers;
mod response;

pub use response::not_found;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppState;
use crate::http::{self, query};
use crate::logger;

/// Dispatch an `/activities` request
pub async fn dispatch(
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let resp = route(method, path, raw_query, state).await;
    logger::log_api_request(method.as_str(), path, resp.status().as_u16());
    resp
}

async fn route(
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if path == "/activities" {
        return if *method == Method::GET {
            handlers::list_activities(state).await
        } else {
            http::build_405_response("GET")
        };
    }

    let Some(rest) = path.strip_prefix("/activities/") else {
        return response::not_found();
    };

    let mut segments = rest.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(name), Some("signup"), None) => {
            if *method == Method::POST {
                let activity = query::percent_decode(name);
                handlers::signup(state, &activity, raw_query).await
            } else {
                http::build_405_response("POST")
            }
        }
        (Some(name), Some("unregister"), None) => {
            if *method == Method::DELETE {
                let activity = query::percent_decode(name);
                handlers::unregister(state, &activity, raw_query).await
            } else {
                http::build_405_response("DELETE")
            }
        }
        _ => response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state() -> AppState {
        AppState::new(Config::default())
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_activities_returns_full_catalog() {
        let state = test_state();
        let resp = dispatch(&Method::GET, "/activities", None, &state).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let data = body_json(resp).await;
        let map = data.as_object().unwrap();
        assert!(!map.is_empty());
        for (_, record) in map {
            assert!(record["description"].is_string());
            assert!(record["schedule"].is_string());
            assert!(record["max_participants"].is_u64());
            assert!(record["participants"].is_array());
        }
        assert!(map.contains_key("Chess Club"));
        assert!(map.contains_key("Programming Class"));
        assert!(map.contains_key("Gym Class"));
    }

    #[tokio::test]
    async fn signup_success_message_names_both() {
        let state = test_state();
        let resp = dispatch(
            &Method::POST,
            "/activities/Chess Club/signup",
            Some("email=test@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let data = body_json(resp).await;
        let message = data["message"].as_str().unwrap();
        assert!(message.contains("test@mergington.edu"));
        assert!(message.contains("Chess Club"));

        let catalog = state.store.snapshot().await;
        assert!(catalog["Chess Club"]
            .participants
            .contains(&"test@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn signup_decodes_activity_name() {
        let state = test_state();
        let resp = dispatch(
            &Method::POST,
            "/activities/Programming%20Class/signup",
            Some("email=test@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let catalog = state.store.snapshot().await;
        assert!(catalog["Programming Class"]
            .participants
            .contains(&"test@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn signup_unknown_activity_is_404() {
        let state = test_state();
        let resp = dispatch(
            &Method::POST,
            "/activities/NonExistent Club/signup",
            Some("email=test@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let data = body_json(resp).await;
        assert_eq!(data["detail"], "Activity not found");
    }

    #[tokio::test]
    async fn duplicate_signup_is_400() {
        let state = test_state();
        let before = state.store.snapshot().await["Chess Club"].participants.len();

        let resp = dispatch(
            &Method::POST,
            "/activities/Chess Club/signup",
            Some("email=michael@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let data = body_json(resp).await;
        assert!(data["detail"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("already signed up"));

        let after = state.store.snapshot().await["Chess Club"].participants.len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn signup_without_email_is_422() {
        let state = test_state();
        let resp = dispatch(&Method::POST, "/activities/Chess Club/signup", None, &state).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn signup_with_empty_email_is_accepted() {
        let state = test_state();
        let resp = dispatch(
            &Method::POST,
            "/activities/Chess Club/signup",
            Some("email="),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unregister_success_then_absent() {
        let state = test_state();
        let resp = dispatch(
            &Method::DELETE,
            "/activities/Chess Club/unregister",
            Some("email=michael@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let data = body_json(resp).await;
        let message = data["message"].as_str().unwrap();
        assert!(message.contains("michael@mergington.edu"));
        assert!(message.contains("Chess Club"));

        let catalog = state.store.snapshot().await;
        assert!(!catalog["Chess Club"]
            .participants
            .contains(&"michael@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn unregister_decodes_activity_name() {
        let state = test_state();
        let resp = dispatch(
            &Method::DELETE,
            "/activities/Programming%20Class/unregister",
            Some("email=emma@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let catalog = state.store.snapshot().await;
        assert!(!catalog["Programming Class"]
            .participants
            .contains(&"emma@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn unregister_unknown_activity_is_404() {
        let state = test_state();
        let resp = dispatch(
            &Method::DELETE,
            "/activities/NonExistent Club/unregister",
            Some("email=test@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let data = body_json(resp).await;
        assert_eq!(data["detail"], "Activity not found");
    }

    #[tokio::test]
    async fn unregister_non_member_is_400() {
        let state = test_state();
        let resp = dispatch(
            &Method::DELETE,
            "/activities/Chess Club/unregister",
            Some("email=notregistered@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let data = body_json(resp).await;
        assert!(data["detail"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("not signed up"));
    }

    #[tokio::test]
    async fn signup_then_unregister_round_trip() {
        let state = test_state();
        let before = state.store.snapshot().await["Chess Club"].participants.clone();

        let resp = dispatch(
            &Method::POST,
            "/activities/Chess Club/signup",
            Some("email=e2e@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let mid = state.store.snapshot().await["Chess Club"].participants.clone();
        assert_eq!(mid.len(), before.len() + 1);

        let resp = dispatch(
            &Method::DELETE,
            "/activities/Chess Club/unregister",
            Some("email=e2e@mergington.edu"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let after = state.store.snapshot().await["Chess Club"].participants.clone();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let state = test_state();

        let resp = dispatch(
            &Method::GET,
            "/activities/Chess Club/signup",
            Some("email=x@y"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "POST");

        let resp = dispatch(&Method::POST, "/activities", None, &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET");
    }

    #[tokio::test]
    async fn unknown_api_path_is_404() {
        let state = test_state();
        let resp = dispatch(&Method::POST, "/activities/Chess Club/rename", None, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = dispatch(&Method::GET, "/activities/Chess Club", None, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
