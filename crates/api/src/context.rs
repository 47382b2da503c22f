use corpcredit_auth::{Claims, Role};
use corpcredit_core::AccountId;

/// Authenticated actor for a request (verified claims).
///
/// Inserted by the auth middleware; must be present for all domain routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    claims: Claims,
}

impl ActorContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.sub
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }
}
