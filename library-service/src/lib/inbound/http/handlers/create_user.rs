use auth::Principal;
use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::AuthenticatedUserData;
use super::NameRequest;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::UsernameError;

/// Register a user and log them in.
///
/// Runs behind the optional authenticator: anonymous callers may register
/// plain users, only an authenticated admin may request the admin role.
pub async fn create_user(
    State(state): State<AppState>,
    caller: Option<Extension<Principal>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<AuthenticatedUserData>, ApiError> {
    let caller = caller.map(|Extension(principal)| principal);

    let user = state
        .user_service
        .create_user(body.try_into_command()?, caller)
        .await?;

    let token = state
        .authenticator
        .issue_token(user.id.as_i64(), user.role)
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        AuthenticatedUserData {
            user: (&user).into(),
            token,
        },
    ))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    name: NameRequest,
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseCreateUserRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid role: {0}")]
    Role(String),
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ParseCreateUserRequestError> {
        let name = PersonName::new(self.name.first_name, self.name.last_name)?;
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let command = CreateUserCommand::new(name, username, email, self.password);

        match self.role {
            Some(role) => {
                let role = role
                    .parse::<Role>()
                    .map_err(|e| ParseCreateUserRequestError::Role(e.to_string()))?;
                Ok(command.with_role(role))
            }
            None => Ok(command),
        }
    }
}

impl From<ParseCreateUserRequestError> for ApiError {
    fn from(err: ParseCreateUserRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
