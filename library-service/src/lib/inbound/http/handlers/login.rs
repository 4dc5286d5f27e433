use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthenticatedUserData;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Exchange an email and password for an access token.
///
/// Every failure that depends on the submitted credentials answers with the
/// same 401 body.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<AuthenticatedUserData>, ApiError> {
    let email =
        EmailAddress::new(body.email).map_err(|_| ApiError::from(UserError::InvalidCredentials))?;

    let outcome = state.user_service.login(&email, body.password).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AuthenticatedUserData {
            user: (&outcome.user).into(),
            token: outcome.access_token,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
