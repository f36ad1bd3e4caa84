mod auth_service;
pub mod password;
mod token_service;

pub use auth_service::AuthService;
pub use token_service::{SessionClaims, TokenService};
