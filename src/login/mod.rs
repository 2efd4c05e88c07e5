pub mod accounts;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod password;
pub mod types;

pub use accounts::*;
pub use auth::*;
pub use error::*;
pub use handlers::*;
pub use password::{dummy_password_hash, hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use types::*;

#[cfg(test)]
mod tests;
