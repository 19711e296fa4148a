// ============================================================================
// TopSteel API - Tenant Context Resolver
// File: crates/topsteel-api/src/middleware/auth.rs
// ============================================================================
//! Bearer token decoding into a [`Principal`] stored in request extensions.
//!
//! Requests without a valid token continue unauthenticated; handlers that
//! need a caller take [`CurrentUser`] or [`AdminUser`], which reject with 401
//! or 403. A principal without a société is not an error.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use topsteel_core::domain::Principal;
use topsteel_shared::constants::{ROLE_ADMIN, ROLE_SUPER_ADMIN};

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.jwt.principal(token) {
            Ok(principal) => {
                debug!(
                    user_id = %principal.user_id,
                    societe_id = ?principal.tenant.map(|t| t.societe_id),
                    "Resolved principal"
                );
                request.extensions_mut().insert(principal);
            }
            Err(e) => debug!("Ignoring bearer token: {}", e),
        }
    }

    next.run(request).await
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Missing or invalid bearer token".to_string()))
    }
}

/// Authenticated caller holding `ADMIN` or `SUPER_ADMIN`
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;

        if !principal.has_any_role(&[ROLE_ADMIN, ROLE_SUPER_ADMIN]) {
            return Err(ApiError::Forbidden("Administrator role required".to_string()));
        }
        Ok(AdminUser(principal))
    }
}
