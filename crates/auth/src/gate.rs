//! Access policy gate.
//!
//! Pure policy checks run before the ledger engine is invoked:
//! - No IO
//! - No panics
//! - No business logic

use thiserror::Error;

use crate::claims::Claims;
use crate::roles::Role;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or invalid bearer token")]
    InvalidToken,

    #[error("forbidden: operation requires role '{required}'")]
    Forbidden { required: Role },
}

/// Reject the call unless the verified claims carry exactly `required`.
pub fn require_role(claims: &Claims, required: Role) -> Result<(), AuthError> {
    if claims.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden { required })
    }
}
