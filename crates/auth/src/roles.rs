//! Account roles.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Role of a wallet account, fixed at creation.
///
/// Roles are closed-world here (unlike an RBAC permission catalog): the whole
/// policy surface is which of the three roles may invoke which operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Funds and audits wallets; the system's sole value-injection point.
    Admin,
    /// Holds a spendable balance.
    Employee,
    /// Receives payments; earnings derived from transaction history.
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Vendor => "vendor",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "vendor" => Ok(Role::Vendor),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
