use tipsync_types::{BranchRef, Principal};

/// Branch-level authorization shared by pull and push.
pub struct AccessGuard;

impl AccessGuard {
    /// The owner of the account may touch any of its branches; anyone else
    /// needs the `user:branch` grant.
    pub fn can_access(principal: &Principal, target: &BranchRef) -> bool {
        principal.is_account_owner(target.account_user())
            || principal.grants_include(&target.access_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tipsync_types::AccessToken;

    #[test]
    fn owner_reaches_every_branch() {
        let alice = Principal::account("alice");
        assert!(AccessGuard::can_access(&alice, &BranchRef::new("alice", "main")));
        assert!(AccessGuard::can_access(&alice, &BranchRef::new("alice", "anything")));
    }

    #[test]
    fn owner_of_other_account_is_denied() {
        let bob = Principal::account("bob");
        assert!(!AccessGuard::can_access(&bob, &BranchRef::new("alice", "main")));
    }

    #[test]
    fn delegated_grant_is_branch_scoped() {
        let p = Principal::delegated([AccessToken::new("alice", "main")]);
        assert!(AccessGuard::can_access(&p, &BranchRef::new("alice", "main")));
        assert!(!AccessGuard::can_access(&p, &BranchRef::new("alice", "dev")));
        assert!(!AccessGuard::can_access(&p, &BranchRef::new("bob", "main")));
    }

    #[test]
    fn grant_for_one_branch_never_leaks_to_others() {
        let p = Principal::delegated([AccessToken::new("u", "b")]);
        for other in ["b2", "B", "b ", "", "b:c"] {
            assert!(!AccessGuard::can_access(&p, &BranchRef::new("u", other)), "{other}");
        }
    }

    #[test]
    fn delegated_without_grants_is_denied() {
        let p = Principal::delegated([]);
        assert!(!AccessGuard::can_access(&p, &BranchRef::new("alice", "main")));
    }
}
