//! Branch synchronization for tipsync.
//!
//! A client keeps a local copy of a branch and exchanges packs with the
//! server through two stanzas:
//!
//! - `sync_pull` asks for everything after a base tip. It is answered with
//!   the current tip and a pack in one go ([`PullCoordinator`]).
//! - `sync_push` announces a pack built on a start tip. The pack arrives as
//!   the text of a nested `pack` element and the push is applied when the
//!   stanza closes ([`PushCoordinator`]).
//!
//! [`SyncSession`] routes the parse events of one connection to these
//! coordinators. Both sides share the same authorization rule
//! ([`AccessGuard`]).

pub mod collector;
pub mod context;
pub mod error;
pub mod guard;
pub mod pull;
pub mod push;
pub mod session;

pub use collector::PayloadCollector;
pub use context::{SyncContext, SyncPolicy};
pub use error::{SyncError, SyncResult};
pub use guard::AccessGuard;
pub use pull::{PullCoordinator, PullOutcome};
pub use push::{PushCoordinator, PushFailure, PushOutcome, PushRequest};
pub use session::SyncSession;
