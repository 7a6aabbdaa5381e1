// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account kinds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of account behind a principal.
///
/// Authentication treats this as an opaque hint: it is copied into issued
/// tokens and forwarded downstream, but never used for an auth decision.
///
/// - `Person` - Individual seller account
/// - `Store` - Business account
/// - `Service` - Machine account used by other backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Person,
    Store,
    Service,
}

impl AccountKind {
    /// Parse account kind from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<AccountKind> {
        match s.trim().to_lowercase().as_str() {
            "person" => Some(AccountKind::Person),
            "store" => Some(AccountKind::Store),
            "service" => Some(AccountKind::Service),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Person => "person",
            AccountKind::Store => "store",
            AccountKind::Service => "service",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(AccountKind::from_str("person"), Some(AccountKind::Person));
        assert_eq!(AccountKind::from_str("STORE"), Some(AccountKind::Store));
        assert_eq!(AccountKind::from_str(" Service "), Some(AccountKind::Service));
        assert_eq!(AccountKind::from_str("admin"), None);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&AccountKind::Store).unwrap();
        assert_eq!(json, r#""store""#);
        assert_eq!(AccountKind::Person.to_string(), "person");
    }
}
