use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tipsync_store::{AccountResolver, Depth};
use tipsync_types::Principal;

/// Server-side knobs shared by all sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    /// Refuse a push whose `start_commit` no longer matches the branch tip.
    pub verify_start_tip: bool,
    /// Largest accepted push payload, in bytes of encoded text.
    pub max_payload_size: Option<usize>,
    /// History depth for pull exports.
    pub export_depth: Depth,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            verify_start_tip: false,
            max_payload_size: None,
            export_depth: Depth::Unbounded,
        }
    }
}

/// Everything a coordinator needs to know about the session it serves.
///
/// Built once per connection and shared by every coordinator the session
/// creates.
#[derive(Clone)]
pub struct SyncContext {
    principal: Principal,
    accounts: Arc<dyn AccountResolver>,
    policy: SyncPolicy,
}

impl SyncContext {
    pub fn new(principal: Principal, accounts: Arc<dyn AccountResolver>, policy: SyncPolicy) -> Self {
        Self {
            principal,
            accounts,
            policy,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn accounts(&self) -> &dyn AccountResolver {
        self.accounts.as_ref()
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("principal", &self.principal)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
