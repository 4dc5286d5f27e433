use auth::Principal;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::parse_user_id;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Admin-only; the role gate runs before this handler.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<()>, ApiError> {
    let user_id = parse_user_id(&id)?;

    state.user_service.delete_user(&user_id).await?;
    tracing::info!(admin_id = caller.user_id, user_id = %user_id, "Admin removed user");

    Ok(ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
