mod auth_service;
mod password;

pub use auth_service::AuthService;
pub use password::{generate_session_token, hash_password, hash_session_token, verify_password};
