//! Role based authentication: users, roles, confirmed email addresses and a
//! credential check over them.

mod authenticator;
mod models;
mod password;

use thiserror::Error;

pub use authenticator::Authenticator;
pub use models::{AuthEmail, ADMIN_ROLE, NewAuthEmail, NewRole, NewUser, Role, User, UserAccount};
pub use password::{check_password, generate_confirmation_hash, hash_password};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed")]
    HashingFailed,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
}
