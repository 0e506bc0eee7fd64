use tipsync_types::{AccessToken, Principal};

use crate::error::ServerResult;

/// What the transport learned about the peer when the connection was
/// authenticated.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// Logged in as the owner of an account.
    Account { user: String },
    /// Acting on behalf of other accounts through stored `user:branch`
    /// grants.
    Delegated { grants: Vec<String> },
}

impl Credentials {
    /// Turn credentials into the principal a session runs as. Fails on the
    /// first malformed grant.
    pub fn into_principal(self) -> ServerResult<Principal> {
        match self {
            Self::Account { user } => Ok(Principal::account(user)),
            Self::Delegated { grants } => {
                let tokens = grants
                    .iter()
                    .map(|g| AccessToken::parse(g.as_str()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Principal::delegated(tokens))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    #[test]
    fn account_credentials() {
        let p = Credentials::Account { user: "alice".into() }.into_principal().unwrap();
        assert!(p.is_account_owner("alice"));
    }

    #[test]
    fn delegated_credentials() {
        let p = Credentials::Delegated { grants: vec!["alice:main".into(), "bob:dev".into()] }
            .into_principal()
            .unwrap();
        assert!(p.grants_include(&AccessToken::new("alice", "main")));
        assert!(p.grants_include(&AccessToken::new("bob", "dev")));
        assert!(!p.is_account_owner("alice"));
    }

    #[test]
    fn malformed_grant_is_rejected() {
        let err = Credentials::Delegated { grants: vec!["alice:main".into(), "nobranch".into()] }
            .into_principal()
            .unwrap_err();
        assert!(matches!(err, ServerError::Credentials(_)));
    }
}
