//! In-memory collaborators for tests and ephemeral servers.
//!
//! The pack format used here is a plain concatenation of 20-byte commit
//! ids, oldest first. Real deployments bring their own encoding; the sync
//! coordinators never look inside a pack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tipsync_types::{CommitId, Tip, TipRef, COMMIT_ID_LEN};

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{AccountResolver, Depth, NotificationPort, RepositoryPort};

/// Encode commit ids into the in-memory pack format.
pub fn encode_commits(commits: &[CommitId]) -> Vec<u8> {
    commits.iter().flat_map(|c| c.as_bytes().iter().copied()).collect()
}

/// Decode the in-memory pack format.
pub fn decode_commits(pack: &[u8]) -> RepositoryResult<Vec<CommitId>> {
    if pack.len() % COMMIT_ID_LEN != 0 {
        return Err(RepositoryError::CorruptPack(format!(
            "length {} is not a multiple of {COMMIT_ID_LEN}",
            pack.len()
        )));
    }
    pack.chunks_exact(COMMIT_ID_LEN)
        .map(|chunk| {
            CommitId::from_slice(chunk).map_err(|e| RepositoryError::CorruptPack(e.to_string()))
        })
        .collect()
}

fn poisoned<E: std::fmt::Display>(e: E) -> RepositoryError {
    RepositoryError::Backend(format!("lock poisoned: {e}"))
}

/// Number of commits up to and including `tip`.
fn position(history: &[CommitId], branch: &str, tip: &Tip) -> RepositoryResult<usize> {
    match tip {
        Tip::Empty => Ok(0),
        Tip::Commit(id) => history
            .iter()
            .position(|c| c == id)
            .map(|i| i + 1)
            .ok_or_else(|| RepositoryError::UnknownCommit {
                branch: branch.to_string(),
                commit: id.to_hex(),
            }),
    }
}

fn resolve(reference: &TipRef) -> RepositoryResult<Tip> {
    reference
        .tip()
        .copied()
        .ok_or_else(|| RepositoryError::UnsupportedRef(reference.to_string()))
}

/// A linear commit history per branch.
///
/// Opaque tip references are not understood and are rejected. Imports are
/// fast-forward only: `start` must be the current tip, and the pack's commits
/// are appended under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    branches: RwLock<HashMap<String, Vec<CommitId>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history of `branch`, oldest commit first.
    pub fn set_history(&self, branch: &str, history: Vec<CommitId>) -> RepositoryResult<()> {
        let mut branches = self.branches.write().map_err(poisoned)?;
        branches.insert(branch.to_string(), history);
        Ok(())
    }

    /// The history of `branch`, oldest commit first.
    pub fn history(&self, branch: &str) -> RepositoryResult<Vec<CommitId>> {
        let branches = self.branches.read().map_err(poisoned)?;
        Ok(branches.get(branch).cloned().unwrap_or_default())
    }
}

impl RepositoryPort for InMemoryRepository {
    fn tip(&self, branch: &str) -> RepositoryResult<Tip> {
        let branches = self.branches.read().map_err(poisoned)?;
        Ok(branches
            .get(branch)
            .and_then(|h| h.last())
            .map(|id| Tip::Commit(*id))
            .unwrap_or(Tip::Empty))
    }

    fn export_pack(
        &self,
        branch: &str,
        from: &TipRef,
        to: &Tip,
        depth: Depth,
    ) -> RepositoryResult<Vec<u8>> {
        let branches = self.branches.read().map_err(poisoned)?;
        let history = branches.get(branch).map(Vec::as_slice).unwrap_or(&[]);

        let start = position(history, branch, &resolve(from)?)?;
        let end = position(history, branch, to)?;
        if start > end {
            return Err(RepositoryError::NotAncestor {
                branch: branch.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let mut commits = &history[start..end];
        if let Depth::Limited(n) = depth {
            let n = n as usize;
            if commits.len() > n {
                commits = &commits[commits.len() - n..];
            }
        }
        Ok(encode_commits(commits))
    }

    fn import_pack(
        &self,
        branch: &str,
        pack: &[u8],
        start: &TipRef,
        last: &TipRef,
    ) -> RepositoryResult<()> {
        let commits = decode_commits(pack)?;
        let start_tip = resolve(start)?;
        let last_tip = resolve(last)?;

        let mut branches = self.branches.write().map_err(poisoned)?;
        let current = branches.get(branch).map(Vec::as_slice).unwrap_or(&[]);
        let keep = position(current, branch, &start_tip)?;
        if keep != current.len() {
            let current_tip = current.last().map_or(Tip::Empty, |c| Tip::Commit(*c));
            return Err(RepositoryError::NotAncestor {
                branch: branch.to_string(),
                from: current_tip.to_string(),
                to: last.to_string(),
            });
        }

        let new_tip = commits.last().map(|c| Tip::Commit(*c)).unwrap_or(start_tip);
        if new_tip != last_tip {
            return Err(RepositoryError::TipMismatch {
                expected: last_tip.to_hex(),
                actual: new_tip.to_hex(),
            });
        }

        let mut updated = current.to_vec();
        updated.extend(commits);
        tracing::debug!(branch, tip = %new_tip, len = updated.len(), "imported pack");
        branches.insert(branch.to_string(), updated);
        Ok(())
    }
}

/// Calls observed by an [`InMemoryMailbox`], in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MailboxEvent {
    ChannelTip { branch: String, tip: String },
    Commit,
}

/// Mailbox holding one tip per branch channel.
#[derive(Debug, Default)]
pub struct InMemoryMailbox {
    pending: RwLock<HashMap<String, String>>,
    committed: RwLock<HashMap<String, String>>,
    events: Mutex<Vec<MailboxEvent>>,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed tip of `branch`'s channel.
    pub fn channel_tip(&self, branch: &str) -> Option<String> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(branch)
            .cloned()
    }

    pub fn events(&self) -> Vec<MailboxEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, event: MailboxEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl NotificationPort for InMemoryMailbox {
    fn update_channel_tip(&self, branch: &str, tip_hex: &str) -> RepositoryResult<bool> {
        let mut pending = self.pending.write().map_err(poisoned)?;
        let previous = pending.insert(branch.to_string(), tip_hex.to_string());
        self.record(MailboxEvent::ChannelTip {
            branch: branch.to_string(),
            tip: tip_hex.to_string(),
        });
        Ok(previous.as_deref() != Some(tip_hex))
    }

    fn commit(&self) -> RepositoryResult<()> {
        let pending = self.pending.read().map_err(poisoned)?;
        let mut committed = self.committed.write().map_err(poisoned)?;
        *committed = pending.clone();
        self.record(MailboxEvent::Commit);
        Ok(())
    }
}

/// Account registry backed by in-memory repositories and mailboxes.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    repositories: RwLock<HashMap<String, Arc<InMemoryRepository>>>,
    mailboxes: RwLock<HashMap<String, Arc<InMemoryMailbox>>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with a fresh repository and mailbox.
    pub fn add_account(&self, user: &str) -> (Arc<InMemoryRepository>, Arc<InMemoryMailbox>) {
        let repository = self.add_repository(user);
        let mailbox = Arc::new(InMemoryMailbox::new());
        self.mailboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.to_string(), Arc::clone(&mailbox));
        (repository, mailbox)
    }

    /// Register an account that has a repository but no mailbox.
    pub fn add_repository(&self, user: &str) -> Arc<InMemoryRepository> {
        let repository = Arc::new(InMemoryRepository::new());
        self.repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.to_string(), Arc::clone(&repository));
        repository
    }
}

impl AccountResolver for InMemoryAccounts {
    fn repository(&self, account_user: &str) -> Option<Arc<dyn RepositoryPort>> {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account_user)
            .map(|r| Arc::clone(r) as Arc<dyn RepositoryPort>)
    }

    fn mailbox(&self, account_user: &str) -> Option<Arc<dyn NotificationPort>> {
        self.mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account_user)
            .map(|m| Arc::clone(m) as Arc<dyn NotificationPort>)
    }
}
