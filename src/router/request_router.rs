use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::request_handler::{
    export_quote_handler, get_status_handler, list_requests_handler, submit_request_handler,
    update_request_handler,
};
use crate::middlewares::admin_middleware::{admin_auth, AdminAuthState};
use crate::service::request_service::RequestServiceImpl;

pub fn request_router(
    service: Arc<RequestServiceImpl>,
    admin_auth_state: Arc<AdminAuthState>,
) -> Router {
    // Public routes
    let public = Router::new()
        .route("/api/submit-form", post(submit_request_handler))
        .route("/api/get-status", get(get_status_handler));

    // Admin-protected routes
    let admin = Router::new()
        .route("/api/requests", get(list_requests_handler))
        .route("/api/update-request", post(update_request_handler))
        .route("/api/requests/{id}/export", get(export_quote_handler))
        .route_layer(middleware::from_fn_with_state(
            admin_auth_state.clone(),
            admin_auth,
        ));

    public.merge(admin).with_state(service)
}
