use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::book::errors::BookError;
use crate::book::models::Author;
use crate::book::models::Book;
use crate::book::models::BookId;
use crate::book::models::BookTitle;
use crate::book::models::NewBook;
use crate::book::ports::BookRepository;
use crate::user::models::UserId;

const BOOK_COLUMNS: &str = "id, title, author, user_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = BookError;

    fn try_from(r: BookRow) -> Result<Self, Self::Error> {
        Ok(Book {
            id: BookId(r.id),
            title: BookTitle::new(r.title)?,
            author: Author::new(r.author)?,
            owner_id: UserId(r.user_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> BookError {
    BookError::DatabaseError(e.to_string())
}

pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (title, author, user_id)
            VALUES ($1, $2, $3)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book.title.as_str())
        .bind(book.author.as_str())
        .bind(book.owner_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Book::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(Book::try_from).collect()
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Book>, BookError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(Book::try_from).collect()
    }

    async fn update(&self, book: Book) -> Result<Book, BookError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book.id.0)
        .bind(book.title.as_str())
        .bind(book.author.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.ok_or(BookError::NotFound(book.id.to_string()))?
            .try_into()
    }

    async fn delete(&self, id: &BookId) -> Result<(), BookError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
