//! Ports consumed by the sync coordinators.
//!
//! The coordinators never touch storage directly. A deployment plugs its
//! commit-graph store, its per-account mailbox, and its account lookup in
//! behind these traits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tipsync_types::{Tip, TipRef};

use crate::error::RepositoryResult;

/// How much history an export may include.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Depth {
    /// Everything between the two tips.
    #[default]
    Unbounded,
    /// At most this many of the most recent commits.
    Limited(u32),
}

/// Commit-graph storage for one account.
///
/// Implementations must be thread-safe. `import_pack` must be atomic: when
/// it returns an error the branch is left exactly as it was. Concurrent
/// imports to the same branch must be serialized by the implementation.
pub trait RepositoryPort: Send + Sync {
    /// Current tip of `branch`. A branch that does not exist yet has the
    /// empty tip.
    fn tip(&self, branch: &str) -> RepositoryResult<Tip>;

    /// Build a pack that takes a receiver from `from` to `to`.
    fn export_pack(
        &self,
        branch: &str,
        from: &TipRef,
        to: &Tip,
        depth: Depth,
    ) -> RepositoryResult<Vec<u8>>;

    /// Apply `pack` to `branch`, moving it from `start` to `last`.
    fn import_pack(
        &self,
        branch: &str,
        pack: &[u8],
        start: &TipRef,
        last: &TipRef,
    ) -> RepositoryResult<()>;
}

/// Per-account mailbox used to tell other live sessions of the account
/// owner about tip changes.
pub trait NotificationPort: Send + Sync {
    /// Record `tip_hex` as the tip of `branch`. Returns `Ok(true)` if the
    /// stored value changed.
    fn update_channel_tip(&self, branch: &str, tip_hex: &str) -> RepositoryResult<bool>;

    /// Persist pending channel updates. This is the durability boundary for
    /// notifications.
    fn commit(&self) -> RepositoryResult<()>;
}

/// Resolves an account name to its collaborators.
pub trait AccountResolver: Send + Sync {
    /// The repository of `account_user`, or `None` for an unknown account.
    fn repository(&self, account_user: &str) -> Option<Arc<dyn RepositoryPort>>;

    /// The main mailbox of `account_user`, if it has one.
    fn mailbox(&self, account_user: &str) -> Option<Arc<dyn NotificationPort>>;
}
