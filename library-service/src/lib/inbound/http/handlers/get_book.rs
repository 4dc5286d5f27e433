use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_book_id;
use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::inbound::http::router::AppState;

pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<ApiSuccess<BookData>, ApiError> {
    let book_id = parse_book_id(&book_id)?;

    state
        .book_service
        .get_book(&book_id)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::OK, book.into()))
}
