use async_trait::async_trait;
use auth::Principal;

use crate::book::errors::BookError;
use crate::book::models::Book;
use crate::book::models::BookId;
use crate::book::models::CreateBookCommand;
use crate::book::models::NewBook;
use crate::book::models::UpdateBookCommand;
use crate::user::models::UserId;

/// Port for book domain service operations.
#[async_trait]
pub trait BookServicePort: Send + Sync + 'static {
    /// Create a book owned by the caller.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_book(
        &self,
        caller: &Principal,
        command: CreateBookCommand,
    ) -> Result<Book, BookError>;

    /// Retrieve book by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Book does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_book(&self, id: &BookId) -> Result<Book, BookError>;

    /// Retrieve all books.
    async fn list_books(&self) -> Result<Vec<Book>, BookError>;

    /// Retrieve the books owned by one user.
    async fn list_books_by_owner(&self, owner_id: &UserId) -> Result<Vec<Book>, BookError>;

    /// Update a book.
    ///
    /// # Errors
    /// * `NotFound` - Book does not exist
    /// * `Forbidden` - Caller is neither the owner nor an admin
    /// * `DatabaseError` - Database operation failed
    async fn update_book(
        &self,
        caller: &Principal,
        id: &BookId,
        command: UpdateBookCommand,
    ) -> Result<Book, BookError>;

    /// Delete a book.
    ///
    /// # Errors
    /// * `NotFound` - Book does not exist
    /// * `Forbidden` - Caller is neither the owner nor an admin
    /// * `DatabaseError` - Database operation failed
    async fn delete_book(&self, caller: &Principal, id: &BookId) -> Result<(), BookError>;
}

/// Persistence operations for books.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create(&self, book: NewBook) -> Result<Book, BookError>;

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookError>;

    /// All books, oldest first.
    async fn list_all(&self) -> Result<Vec<Book>, BookError>;

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Book>, BookError>;

    /// # Errors
    /// * `NotFound` - Book does not exist
    async fn update(&self, book: Book) -> Result<Book, BookError>;

    /// # Errors
    /// * `NotFound` - Book does not exist
    async fn delete(&self, id: &BookId) -> Result<(), BookError>;
}
