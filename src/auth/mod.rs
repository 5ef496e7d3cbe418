//! Authentication for pinboard
//!
//! Verifies the signed tokens issued by the auth service and resolves them
//! to the acting user identity required by authenticated routes.

pub mod jwt;

pub use jwt::{extract_token_from_header, AuthUser, Claims, JwtValidator};
