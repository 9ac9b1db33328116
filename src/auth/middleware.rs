//! Authentication Middleware
//!
//! Axum middleware implementing the authentication gate: bearer credential
//! verification layered with the sliding-window session check, plus an
//! optional role gate for admin routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::{CurrentUser, TokenError, TokenService};
use crate::common::AppError;
use crate::core::ServerState;

/// Authentication middleware — requires a valid access token and a live
/// session
///
/// Per request: extract the bearer credential, verify signature/expiry
/// (HS256 pinned), resolve the typed user context, then slide the session
/// window. On success [`CurrentUser`] is injected into request extensions.
///
/// # Skipped paths
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths
/// - `/api/health`
/// - `/api/auth/login`, `/api/auth/register`, `/api/auth/refresh`
/// - `GET /api/products` (public catalog listing)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Allow CORS preflight OPTIONS requests through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes skip auth (let them 404 normally)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/health"
        || path == "/api/auth/login"
        || path == "/api/auth/register"
        || path == "/api/auth/refresh"
        || (path == "/api/products" && req.method() == http::Method::GET);
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => TokenService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "Missing authorization header");
            return Err(AppError::unauthorized());
        }
    };

    let user = match state.tokens().verify_access(token) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(target: "security", uri = %req.uri(), error = %e, "Token verification failed");
            return match e {
                TokenError::Expired => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    // Sliding-window session check; an expired session is deleted and the
    // request rejected, forcing re-authentication
    state.sessions().slide(user.user_id).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role gate middleware — requires an exact role match
///
/// Comparison is exact-string and case-sensitive, single role only.
/// Mismatch returns 403 Forbidden.
pub fn require_role(
    role: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if user.role != role {
                tracing::warn!(
                    target: "security",
                    user_id = user.user_id,
                    user_role = %user.role,
                    required_role = role,
                    "Role check failed"
                );
                return Err(AppError::forbidden(format!(
                    "Access denied for this role, {role} required"
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
