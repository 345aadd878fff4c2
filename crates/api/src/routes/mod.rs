//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Status probe
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (database)
//!
//! # Auth (rate limited)
//! POST /auth/register       - Register a new user
//! POST /auth/login          - Login, returns a bearer token
//!
//! # Products
//! GET    /products          - Product listing (filters: name, category,
//!                             stock, minPrice, maxPrice)
//! GET    /products/{id}     - Product detail
//! POST   /products          - Create product (bearer token, optional image)
//! PATCH  /products/{id}     - Partial update (bearer token)
//! DELETE /products/{id}     - Delete product (bearer token)
//!
//! # Email
//! POST /email/send          - Relay a contact-form message
//!
//! (unmatched)               - 404 JSON envelope
//! ```

pub mod auth;
pub mod email;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// The rate limiter wraps only this group: exceeding the cap on
/// register/login never affects the product or email routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
}

/// Create the email routes router.
pub fn email_routes() -> Router<AppState> {
    Router::new().route("/send", post(email::send))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/email", email_routes())
}
