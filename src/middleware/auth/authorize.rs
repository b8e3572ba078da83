//! Operation-level authorization guard.
//!
//! Runs after the credentials middleware. Rejects with 403 when the caller's
//! granted level for the operation is absent (or explicitly `none`), otherwise
//! hands the level to the handler so it can scope what it returns.

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::GrantedLevel;
use crate::error::AppError;
use crate::services::auth::{AccessLevel, Identity};
use crate::state::AppState;

/// Guard every route of `router` behind `operation`.
///
/// Uses `route_layer`, so unknown paths still answer 404 instead of 403.
pub fn require(router: Router<AppState>, operation: &'static str) -> Router<AppState> {
    router.route_layer(middleware::from_fn(
        move |req: Request<Body>, next: Next| authorize(operation, req, next),
    ))
}

async fn authorize(
    operation: &'static str,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(AppError::Unauthorized)?;

    let level = match identity.granted_level_for(operation) {
        Some(level) if level > AccessLevel::None => level,
        _ => {
            tracing::warn!(
                dn = identity.primary_dn(),
                roles = ?identity.roles(),
                operation,
                "operation not authorized"
            );
            return Err(AppError::forbidden(format!(
                "not allowed to perform {operation}"
            )));
        }
    };

    req.extensions_mut()
        .insert(GrantedLevel { operation, level });

    Ok(next.run(req).await)
}
