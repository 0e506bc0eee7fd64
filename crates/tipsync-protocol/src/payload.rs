//! Transfer encoding for pack bytes embedded in element text.
//!
//! Outbound packs use standard padded base64. Inbound push payloads are
//! written by clients with the URL-safe alphabet; the standard alphabet is
//! accepted too, and padding is optional either way.

use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::ProtocolResult;

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    general_purpose::NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode pack bytes for a response `pack` element.
pub fn encode_pack(pack: &[u8]) -> String {
    general_purpose::STANDARD.encode(pack)
}

/// Decode the text body of a push `pack` element. Whitespace (line breaks
/// from pretty-printing senders) is ignored.
pub fn decode_payload(text: &str) -> ProtocolResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match URL_SAFE_LENIENT.decode(&compact) {
        Ok(bytes) => Ok(bytes),
        Err(url_err) => {
            tracing::trace!(error = %url_err, "payload is not url-safe base64, trying standard alphabet");
            STANDARD_LENIENT.decode(&compact).map_err(|_| url_err.into())
        }
    }
}
