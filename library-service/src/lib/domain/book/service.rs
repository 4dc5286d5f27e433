use std::sync::Arc;

use async_trait::async_trait;
use auth::Principal;

use crate::book::errors::BookError;
use crate::book::models::Book;
use crate::book::models::BookId;
use crate::book::models::CreateBookCommand;
use crate::book::models::NewBook;
use crate::book::models::UpdateBookCommand;
use crate::book::ports::BookRepository;
use crate::book::ports::BookServicePort;
use crate::user::models::UserId;

/// Domain service implementation for book operations.
pub struct BookService<BR>
where
    BR: BookRepository,
{
    repository: Arc<BR>,
}

impl<BR> BookService<BR>
where
    BR: BookRepository,
{
    pub fn new(repository: Arc<BR>) -> Self {
        Self { repository }
    }

    /// Load a book and check that the caller may modify it.
    async fn owned_book(&self, caller: &Principal, id: &BookId) -> Result<Book, BookError> {
        let book = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id.to_string()))?;

        if !caller.can_act_for(book.owner_id.as_i64()) {
            tracing::warn!(
                user_id = caller.user_id,
                book_id = %id,
                "Rejected modification of a book owned by another user"
            );
            return Err(BookError::Forbidden(
                "You can only modify your own books".to_string(),
            ));
        }

        Ok(book)
    }
}

#[async_trait]
impl<BR> BookServicePort for BookService<BR>
where
    BR: BookRepository,
{
    async fn create_book(
        &self,
        caller: &Principal,
        command: CreateBookCommand,
    ) -> Result<Book, BookError> {
        let book = NewBook {
            title: command.title,
            author: command.author,
            owner_id: UserId(caller.user_id),
        };

        let created = self.repository.create(book).await?;
        tracing::info!(book_id = %created.id, owner_id = %created.owner_id, "Book created");

        Ok(created)
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, BookError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id.to_string()))
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookError> {
        self.repository.list_all().await
    }

    async fn list_books_by_owner(&self, owner_id: &UserId) -> Result<Vec<Book>, BookError> {
        self.repository.find_by_owner(owner_id).await
    }

    async fn update_book(
        &self,
        caller: &Principal,
        id: &BookId,
        command: UpdateBookCommand,
    ) -> Result<Book, BookError> {
        let mut book = self.owned_book(caller, id).await?;

        if let Some(title) = command.title {
            book.title = title;
        }

        if let Some(author) = command.author {
            book.author = author;
        }

        self.repository.update(book).await
    }

    async fn delete_book(&self, caller: &Principal, id: &BookId) -> Result<(), BookError> {
        self.owned_book(caller, id).await?;
        self.repository.delete(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}
