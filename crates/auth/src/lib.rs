//! `corpcredit-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token
//! validation and role checks are pure functions over verified claims.

pub mod claims;
pub mod gate;
pub mod roles;

pub use claims::{Claims, Hs256TokenCodec};
pub use gate::{require_role, AuthError};
pub use roles::Role;
