use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("payload is not valid base64: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("missing attribute {attribute} on <{element}>")]
    MissingAttribute { element: String, attribute: &'static str },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
