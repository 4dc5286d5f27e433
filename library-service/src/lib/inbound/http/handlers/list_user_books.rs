use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_user_id;
use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::inbound::http::router::AppState;

/// Books owned by one user; 404 when the user does not exist.
pub async fn list_user_books(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<Vec<BookData>>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    state.user_service.get_user(&user_id).await?;

    let books = state.book_service.list_books_by_owner(&user_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        books.iter().map(BookData::from).collect(),
    ))
}
