//! Authentication middleware for protected endpoints.
//!
//! [`auth_middleware`] extracts the bearer token from the `Authorization`
//! header, verifies it, and injects the resulting [`Identity`] into request
//! extensions. [`admin_middleware`] then gates on the admin role. Both run
//! before the handler reads the request body, so a caller without the right
//! credentials is turned away no matter what the body holds.
//!
//! # Usage
//!
//! `route_layer` calls wrap outside-in, so the authentication layer goes last:
//!
//! ```rust,no_run
//! use axum::{Router, routing::post, middleware};
//! # use am_server::api::middleware::{admin_middleware, auth_middleware};
//! # use am_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router<AppState> = Router::new().route(
//!     "/api/ads",
//!     post(handler)
//!         .route_layer(middleware::from_fn(admin_middleware))
//!         .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
//! );
//! # let _ = protected_routes;
//! ```
//!
//! Handlers can take `Extension(identity): Extension<Identity>`.

use ad_metrics::auth::{AuthError, Identity, Role, bearer_token, require_authenticated, require_role};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::{logging, metrics};

fn request_id(request: &Request) -> Option<&str> {
    request.extensions().get::<RequestId>().map(RequestId::as_str)
}

/// Authentication middleware that validates session tokens and injects [`Identity`].
///
/// # Behavior
///
/// - **Success**: Token valid → inserts `Identity` → calls next handler
/// - **Missing header or not `Bearer`**: `401 Unauthorized`, empty body
/// - **Invalid or expired token**: `403 Forbidden`, empty body
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity: Identity =
        require_authenticated(state.auth_manager.tokens(), bearer_token(header)).map_err(|e| {
            if matches!(e, AuthError::Forbidden) {
                metrics::auth_events_total(metrics::AuthEvent::TokenRejected);
                logging::log_security_event(
                    "token_rejected",
                    None,
                    request_id(&request),
                    &format!("Rejected token on {}", request.uri().path()),
                );
            }
            ApiError::from(e)
        })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Role gate for admin-only endpoints.
///
/// Must run inside [`auth_middleware`]. A request that reaches it without an
/// [`Identity`] is answered `401`; a non-admin identity gets `403`.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(ApiError::unauthorized)?;

    if let Err(e) = require_role(&identity, Role::Admin) {
        metrics::auth_events_total(metrics::AuthEvent::RoleDenied);
        logging::log_security_event(
            "forbidden_admin_action",
            Some(identity.user_id),
            request_id(&request),
            &format!(
                "{} {} requires admin",
                request.method(),
                request.uri().path()
            ),
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
