use tipsync_protocol::{decode_payload, ProtocolError, ProtocolResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Collecting,
    Done,
}

/// Accumulates the text of a push `pack` element and decodes it to raw pack
/// bytes when the element closes.
///
/// A collector serves exactly one element. Text that arrives while it is not
/// collecting is dropped.
#[derive(Debug)]
pub struct PayloadCollector {
    phase: Phase,
    text: String,
    seen: usize,
    max_size: Option<usize>,
}

impl PayloadCollector {
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            phase: Phase::Idle,
            text: String::new(),
            seen: 0,
            max_size,
        }
    }

    /// Start collecting. Returns `false` if this collector already served an
    /// element.
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Collecting;
        true
    }

    pub fn push_text(&mut self, text: &str) {
        if self.phase != Phase::Collecting {
            return;
        }
        self.seen += text.len();
        if self.max_size.map_or(true, |max| self.seen <= max) {
            self.text.push_str(text);
        }
    }

    /// Close the element and decode. `None` if the collector was not
    /// collecting.
    pub fn end(&mut self) -> Option<ProtocolResult<Vec<u8>>> {
        if self.phase != Phase::Collecting {
            return None;
        }
        self.phase = Phase::Done;
        let text = std::mem::take(&mut self.text);
        if let Some(max) = self.max_size {
            if self.seen > max {
                return Some(Err(ProtocolError::PayloadTooLarge {
                    size: self.seen,
                    max,
                }));
            }
        }
        Some(decode_payload(&text))
    }

    pub fn is_collecting(&self) -> bool {
        self.phase == Phase::Collecting
    }
}
