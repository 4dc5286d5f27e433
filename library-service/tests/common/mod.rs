#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::Role;
use axum::body::Body;
use axum::http::header;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use library_service::book::errors::BookError;
use library_service::book::models::Book;
use library_service::book::models::BookId;
use library_service::book::models::NewBook;
use library_service::book::ports::BookRepository;
use library_service::book::service::BookService;
use library_service::inbound::http::router::create_router;
use library_service::user::errors::UserError;
use library_service::user::models::EmailAddress;
use library_service::user::models::NewUser;
use library_service::user::models::PersonName;
use library_service::user::models::User;
use library_service::user::models::UserId;
use library_service::user::models::Username;
use library_service::user::ports::UserRepository;
use library_service::user::service::UserService;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

pub mod postgres;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// User store backed by a vector, enforcing the same uniqueness rules as the database.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        let created = User {
            id: UserId(users.len() as i64 + 1),
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == *email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(UserError::NotFound(user.id.to_string()))?;
        *slot = User {
            updated_at: Utc::now(),
            ..user
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != *id);
        if users.len() == before {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBookRepository {
    books: Mutex<Vec<Book>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let created = Book {
            id: BookId(*next_id),
            title: book.title,
            author: book.author,
            owner_id: book.owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookError> {
        let books = self.books.lock().unwrap();
        Ok(books.iter().find(|b| b.id == *id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.books.lock().unwrap().clone())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Book>, BookError> {
        let books = self.books.lock().unwrap();
        Ok(books
            .iter()
            .filter(|b| b.owner_id == *owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, book: Book) -> Result<Book, BookError> {
        let mut books = self.books.lock().unwrap();
        let slot = books
            .iter_mut()
            .find(|b| b.id == book.id)
            .ok_or(BookError::NotFound(book.id.to_string()))?;
        *slot = Book {
            updated_at: Utc::now(),
            ..book
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: &BookId) -> Result<(), BookError> {
        let mut books = self.books.lock().unwrap();
        let before = books.len();
        books.retain(|b| b.id != *id);
        if books.len() == before {
            return Err(BookError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Router wired to in-memory stores, driven with `oneshot` (no socket, no database).
pub struct TestApp {
    pub router: Router,
    pub authenticator: Arc<Authenticator>,
    pub users: Arc<InMemoryUserRepository>,
}

/// A registered account and a token for it.
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET).with_password_hasher(
                PasswordHasher::new()
                    .with_params(1024, 1, 1)
                    .expect("Failed to build test hasher"),
            ),
        );
        let users = Arc::new(InMemoryUserRepository::default());
        let books = Arc::new(InMemoryBookRepository::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&authenticator),
        ));
        let book_service = Arc::new(BookService::new(books));

        let router = create_router(user_service, book_service, Arc::clone(&authenticator));

        Self {
            router,
            authenticator,
            users,
        }
    }

    /// Send a request and return the status with the parsed JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn send_authenticated(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let header = format!("Bearer {}", token);
        self.send(method, uri, Some(header.as_str()), body).await
    }

    /// Register a plain user through the API.
    pub async fn register(&self, username: &str, password: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/users",
                None,
                Some(registration_body(username, password, None)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

        TestUser {
            id: body["data"]["user"]["id"].as_i64().expect("id is a number"),
            token: body["data"]["token"]
                .as_str()
                .expect("token is a string")
                .to_string(),
        }
    }

    /// Insert an admin directly into the store; there is no API path to bootstrap one.
    pub async fn seed_admin(&self, username: &str) -> TestUser {
        let password_hash = self
            .authenticator
            .hash_password("admin-password")
            .expect("Failed to hash");

        let admin = self
            .users
            .create(NewUser {
                name: PersonName::new("Site".to_string(), "Admin".to_string()).unwrap(),
                username: Username::new(username.to_string()).unwrap(),
                email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
                password_hash,
                role: Role::Admin,
            })
            .await
            .expect("Failed to seed admin");

        let token = self
            .authenticator
            .issue_token(admin.id.as_i64(), Role::Admin)
            .expect("Failed to issue token");

        TestUser {
            id: admin.id.as_i64(),
            token,
        }
    }
}

pub fn registration_body(username: &str, password: &str, role: Option<&str>) -> Value {
    let mut body = json!({
        "name": { "first_name": "Test", "last_name": "User" },
        "username": username,
        "email": format!("{}@example.com", username),
        "password": password,
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    body
}
