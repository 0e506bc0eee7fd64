use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a binary commit identifier in bytes.
pub const COMMIT_ID_LEN: usize = 20;

/// Length of a commit identifier in its hex text form.
pub const COMMIT_HEX_LEN: usize = COMMIT_ID_LEN * 2;

/// Returns `true` if `s` looks like a hex-encoded commit id (exactly 40 hex
/// digits, either case).
pub fn is_commit_hex(s: &str) -> bool {
    s.len() == COMMIT_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A 20-byte binary commit identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId([u8; COMMIT_ID_LEN]);

impl CommitId {
    /// Create a `CommitId` from raw bytes.
    pub const fn from_raw(bytes: [u8; COMMIT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; COMMIT_ID_LEN] {
        &self.0
    }

    /// Lowercase 40-character hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Build from a byte slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; COMMIT_ID_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: COMMIT_ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.short_hex())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; COMMIT_ID_LEN]> for CommitId {
    fn from(bytes: [u8; COMMIT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

/// The head of a branch.
///
/// A branch without any history has the [`Tip::Empty`] tip, which is written
/// on the wire as the empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tip {
    #[default]
    Empty,
    Commit(CommitId),
}

impl Tip {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn commit(&self) -> Option<&CommitId> {
        match self {
            Self::Empty => None,
            Self::Commit(id) => Some(id),
        }
    }

    /// Wire form: 40 lowercase hex digits, or `""` for an empty tip.
    pub fn to_hex(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Commit(id) => id.to_hex(),
        }
    }

    /// Parse the wire form. The empty string is [`Tip::Empty`].
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Ok(Self::Empty);
        }
        CommitId::from_hex(s).map(Self::Commit)
    }
}

impl From<CommitId> for Tip {
    fn from(id: CommitId) -> Self {
        Self::Commit(id)
    }
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Commit(id) => write!(f, "{id}"),
        }
    }
}

/// A tip reference as sent by a client.
///
/// Text that looks like a commit hash is decoded to binary; any other
/// non-empty text is kept verbatim as an opaque token and handed to the
/// repository unmodified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipRef {
    Tip(Tip),
    Opaque(String),
}

impl TipRef {
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::Tip(Tip::Empty);
        }
        if is_commit_hex(s) {
            if let Ok(id) = CommitId::from_hex(s) {
                return Self::Tip(Tip::Commit(id));
            }
        }
        Self::Opaque(s.to_string())
    }

    /// The tip this reference names, if it is not an opaque token.
    pub fn tip(&self) -> Option<&Tip> {
        match self {
            Self::Tip(tip) => Some(tip),
            Self::Opaque(_) => None,
        }
    }

    /// Value echoed back to the client: hex for a binary commit id, empty
    /// otherwise.
    pub fn echo_hex(&self) -> String {
        match self {
            Self::Tip(tip) => tip.to_hex(),
            Self::Opaque(_) => String::new(),
        }
    }
}

impl From<Tip> for TipRef {
    fn from(tip: Tip) -> Self {
        Self::Tip(tip)
    }
}

impl fmt::Display for TipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tip(tip) => write!(f, "{tip}"),
            Self::Opaque(token) => write!(f, "opaque:{token}"),
        }
    }
}
