use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::branch::AccessToken;

/// The acting party of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// The owner of an account, with access to all of its branches.
    Account { user: String },
    /// A remote party acting with a limited set of branch grants.
    Delegated { grants: BTreeSet<AccessToken> },
}

impl Principal {
    pub fn account(user: impl Into<String>) -> Self {
        Self::Account { user: user.into() }
    }

    pub fn delegated(grants: impl IntoIterator<Item = AccessToken>) -> Self {
        Self::Delegated {
            grants: grants.into_iter().collect(),
        }
    }

    /// Returns `true` if this principal owns `account_user`.
    pub fn is_account_owner(&self, account_user: &str) -> bool {
        matches!(self, Self::Account { user } if user == account_user)
    }

    /// Returns `true` if this principal holds `token`. Account principals
    /// carry no grants.
    pub fn grants_include(&self, token: &AccessToken) -> bool {
        match self {
            Self::Account { .. } => false,
            Self::Delegated { grants } => grants.contains(token),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Account { user } => format!("account:{user}"),
            Self::Delegated { grants } => format!("delegated[{}]", grants.len()),
        }
    }
}
