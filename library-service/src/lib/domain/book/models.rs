use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::book::errors::BookFieldError;
use crate::book::errors::BookIdError;
use crate::user::models::UserId;

/// Book entity, owned by the user who created it.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: BookTitle,
    pub author: Author,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book unique identifier type (database assigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub i64);

impl BookId {
    /// Parse a book ID from a path segment.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, BookIdError> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(BookId(id)),
            _ => Err(BookIdError::InvalidFormat(s.to_string())),
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

const MAX_TEXT_LENGTH: usize = 255;

fn validated_text(field: &'static str, value: String) -> Result<String, BookFieldError> {
    let value = value.trim().to_string();
    let length = value.chars().count();
    if length == 0 {
        Err(BookFieldError::Empty { field })
    } else if length > MAX_TEXT_LENGTH {
        Err(BookFieldError::TooLong {
            field,
            max: MAX_TEXT_LENGTH,
            actual: length,
        })
    } else {
        Ok(value)
    }
}

/// Non-empty book title, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: String) -> Result<Self, BookFieldError> {
        validated_text("Title", title).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Non-empty author name, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author(String);

impl Author {
    pub fn new(author: String) -> Result<Self, BookFieldError> {
        validated_text("Author", author).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Book data ready for insertion.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: BookTitle,
    pub author: Author,
    pub owner_id: UserId,
}

#[derive(Debug)]
pub struct CreateBookCommand {
    pub title: BookTitle,
    pub author: Author,
}

/// Partial update; only provided fields change.
#[derive(Debug, Default)]
pub struct UpdateBookCommand {
    pub title: Option<BookTitle>,
    pub author: Option<Author>,
}
