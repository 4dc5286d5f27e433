use auth::Principal;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::parse_book_id;
use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::book::errors::BookError;
use crate::book::models::Author;
use crate::book::models::BookTitle;
use crate::book::models::UpdateBookCommand;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl UpdateBookRequest {
    fn try_into_command(self) -> Result<UpdateBookCommand, BookError> {
        Ok(UpdateBookCommand {
            title: self.title.map(BookTitle::new).transpose()?,
            author: self.author.map(Author::new).transpose()?,
        })
    }
}

/// Owner or admin only; the service enforces ownership.
pub async fn update_book(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<ApiSuccess<BookData>, ApiError> {
    let book_id = parse_book_id(&id)?;
    let command = req.try_into_command()?;

    state
        .book_service
        .update_book(&caller, &book_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::OK, book.into()))
}
