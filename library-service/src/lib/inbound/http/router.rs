use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_book::create_book;
use super::handlers::create_user::create_user;
use super::handlers::delete_book::delete_book;
use super::handlers::delete_user::delete_user;
use super::handlers::get_book::get_book;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::list_books::list_books;
use super::handlers::list_user_books::list_user_books;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::update_book::update_book;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::authenticate_optional;
use super::middleware::require_admin;
use crate::book::ports::BookServicePort;
use crate::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub book_service: Arc<dyn BookServicePort>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    book_service: Arc<dyn BookServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        book_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users))
        .route("/users/login", post(login))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/books", get(list_user_books))
        .route("/books", get(list_books))
        .route("/books/:book_id", get(get_book));

    // Anonymous registration is allowed; a token, when sent, must be valid.
    let registration_routes = Router::new()
        .route("/users", post(create_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_optional,
        ));

    let protected_routes = Router::new()
        .route("/users/:user_id", put(update_user))
        .route("/books", post(create_book))
        .route("/books/:book_id", put(update_book).delete(delete_book))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Layers run bottom-up: authenticate first, then the role gate.
    let admin_routes = Router::new()
        .route("/users/admin/:user_id", delete(delete_user))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(registration_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
