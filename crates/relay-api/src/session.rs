//! Session cookie handling.
//!
//! Reads the relay session cookie and, when enabled, issues one to callers
//! that arrive without it so their turns land in a private transcript.

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Value of cookie `name`, if present and non-empty.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// Middleware that assigns a fresh session cookie when the caller has none.
///
/// The new cookie is also added to the inbound request so the handler for
/// this very request already resolves to the new session.
pub async fn issue_session_cookie(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let name = state.config.session.cookie_name.as_str();
    if !state.config.session.issue_cookie || session_cookie(req.headers(), name).is_some() {
        return next.run(req).await;
    }

    let token = Uuid::new_v4().simple().to_string();
    let (request_cookie, set_cookie) = match (
        HeaderValue::from_str(&format!("{}={}", name, token)),
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            name, token
        )),
    ) {
        (Ok(request_cookie), Ok(set_cookie)) => (request_cookie, set_cookie),
        _ => {
            warn!(cookie = name, "Cookie name is not a valid header value, not issuing");
            return next.run(req).await;
        }
    };

    req.headers_mut().append(COOKIE, request_cookie);
    debug!(session_id = %token, "Issued session cookie");

    let mut response = next.run(req).await;
    response.headers_mut().append(SET_COOKIE, set_cookie);
    response
}
