//! Authentication and role gates for the HTTP layer.
//!
//! `authenticate` stores the verified [`Principal`] in the request
//! extensions; handlers take it back out with `Extension<Principal>`.

use auth::guard;
use auth::AccessError;
use auth::Principal;
use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that validates the bearer token and adds the principal to request extensions.
///
/// Rejects with 401 before the handler runs when the header is missing,
/// malformed, or carries a token that does not verify.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = {
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| AccessError::MalformedCredential)
            })
            .transpose()?;

        state.authenticator.authenticate_request(header).map_err(|e| {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                error = %e,
                "Request authentication failed"
            );
            e
        })?
    };

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Like [`authenticate`], but lets requests without an `Authorization` header through anonymously.
///
/// A header that is present must still be valid.
pub async fn authenticate_optional(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !req.headers().contains_key(header::AUTHORIZATION) {
        return Ok(next.run(req).await);
    }

    authenticate(state, req, next).await
}

/// Reject with 403 unless [`authenticate`] stored a principal holding `required`.
pub async fn require_role(required: Role, req: Request, next: Next) -> Result<Response, ApiError> {
    if let Err(e) = guard::authorize(req.extensions().get::<Principal>(), required) {
        tracing::warn!(
            user_id = ?req.extensions().get::<Principal>().map(|p| p.user_id),
            required = %required,
            path = %req.uri().path(),
            "Insufficient role"
        );
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(Role::Admin, req, next).await
}
