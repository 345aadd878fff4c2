//! Business services for the API.

pub mod auth;
pub mod email;
pub mod token;
pub mod uploads;

pub use auth::AuthService;
pub use email::EmailService;
pub use token::TokenService;
pub use uploads::UploadStore;
