use axum::http::StatusCode;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub struct AdminAuthState {
    pub admin_password: String,
}

/// Shared-secret gate for the admin routes: the `x-admin-password`
/// header must match the configured password exactly.
pub async fn admin_auth(
    State(state): State<Arc<AdminAuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get("x-admin-password")
        .and_then(|v| v.to_str().ok());

    let Some(provided) = provided else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    if !password_matches(provided, &state.admin_password) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}

/// Constant-time comparison so the check does not leak how much of the
/// password matched.
fn password_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
