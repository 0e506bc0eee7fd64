use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A synchronization target: one branch inside one account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchRef {
    account_user: String,
    branch: String,
}

impl BranchRef {
    pub fn new(account_user: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            account_user: account_user.into(),
            branch: branch.into(),
        }
    }

    pub fn account_user(&self) -> &str {
        &self.account_user
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The grant a delegated principal needs to touch this branch.
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(&self.account_user, &self.branch)
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_user, self.branch)
    }
}

/// Unit of authorization granted to a delegated principal: `"user:branch"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(account_user: &str, branch: &str) -> Self {
        Self(format!("{account_user}:{branch}"))
    }

    /// Parse a stored `"user:branch"` token. The account part ends at the
    /// first `:`, so branch names may themselves contain colons.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.split_once(':') {
            Some((user, branch)) if !user.is_empty() && !branch.is_empty() => {
                Ok(Self(s.to_string()))
            }
            _ => Err(TypeError::MalformedAccessToken(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
