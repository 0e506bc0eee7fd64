//! Stanza model for tipsync.
//!
//! Defines what the sync coordinators see of the transport: inbound
//! [`ParseEvent`]s carrying [`Element`]s, outbound [`Response`]s pushed into
//! a [`ResponseSink`], and the text encoding of pack bytes. Parsing and
//! serializing the actual XML stream is left to the transport.

pub mod element;
pub mod error;
pub mod names;
pub mod payload;
pub mod stanza;

pub use element::{Element, ParseEvent};
pub use error::{ProtocolError, ProtocolResult};
pub use names::{attributes, elements, messages};
pub use payload::{decode_payload, encode_pack};
pub use stanza::{OutStanza, Response, ResponseQueue, ResponseSink};
