//! # docvault-auth
//!
//! JWT access-token issuance and validation, plus Argon2id password
//! hashing. Stateless by design: a token is valid until it expires and
//! carries everything the API layer needs to identify the caller.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
