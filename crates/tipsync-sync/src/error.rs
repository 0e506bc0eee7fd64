use thiserror::Error;

/// Why a request produced no response of its own.
///
/// Pull reports every failure through this type and never writes an error
/// stanza; the transport answers with its default error. Push only uses it
/// for a malformed header or a protocol misuse; its finalize failures are
/// answered with an error stanza instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] tipsync_protocol::ProtocolError),

    #[error("access to {target} denied for {principal}")]
    Unauthorized { target: String, principal: String },

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("no handler for <{0}>")]
    NoHandler(String),

    #[error("push already finalized")]
    AlreadyFinalized,

    #[error("unexpected {event} while push is {state}")]
    UnexpectedEvent { event: &'static str, state: &'static str },
}

pub type SyncResult<T> = Result<T, SyncError>;
