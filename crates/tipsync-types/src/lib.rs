//! Foundation types for tipsync.
//!
//! Every other tipsync crate depends on `tipsync-types`.
//!
//! # Key Types
//!
//! - [`CommitId`] - 20-byte binary commit identifier
//! - [`Tip`] - Head of a branch, possibly empty
//! - [`TipRef`] - Tip reference as sent by a client (hex or opaque token)
//! - [`BranchRef`] - Account/branch pair targeted by a sync request
//! - [`AccessToken`] - Branch grant held by a delegated principal
//! - [`Principal`] - The acting party of a session

pub mod branch;
pub mod error;
pub mod principal;
pub mod tip;

pub use branch::{AccessToken, BranchRef};
pub use error::TypeError;
pub use principal::Principal;
pub use tip::{is_commit_hex, CommitId, Tip, TipRef, COMMIT_HEX_LEN, COMMIT_ID_LEN};
