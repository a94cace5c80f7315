//! SupportPartner Authentication
//!
//! This crate verifies the HS256 access tokens issued by the hosted
//! backend and turns a bearer header into an authenticated user.

pub mod authenticator;
pub mod error;
pub mod jwt;

pub use authenticator::{AuthUser, Authenticator, extract_bearer_token};
pub use error::AuthError;
pub use jwt::{Claims, JwtVerifier};
