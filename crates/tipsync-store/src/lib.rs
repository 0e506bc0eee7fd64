//! Collaborator ports for tipsync.
//!
//! The sync coordinators reach storage only through the traits in this
//! crate:
//!
//! - [`RepositoryPort`] - per-account commit-graph storage (tip lookup, pack
//!   export and import)
//! - [`NotificationPort`] - per-account mailbox used to announce new tips to
//!   other live sessions
//! - [`AccountResolver`] - maps an account name to the two ports above
//!
//! [`memory`] provides in-memory implementations for tests and ephemeral
//! servers.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::{InMemoryAccounts, InMemoryMailbox, InMemoryRepository, MailboxEvent};
pub use traits::{AccountResolver, Depth, NotificationPort, RepositoryPort};
