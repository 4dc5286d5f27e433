use auth::Principal;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::book::errors::BookError;
use crate::book::models::Author;
use crate::book::models::BookTitle;
use crate::book::models::CreateBookCommand;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBookRequest {
    title: String,
    author: String,
}

impl CreateBookRequest {
    fn try_into_command(self) -> Result<CreateBookCommand, BookError> {
        Ok(CreateBookCommand {
            title: BookTitle::new(self.title)?,
            author: Author::new(self.author)?,
        })
    }
}

pub async fn create_book(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Json(body): Json<CreateBookRequest>,
) -> Result<ApiSuccess<BookData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .book_service
        .create_book(&caller, command)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::CREATED, book.into()))
}
