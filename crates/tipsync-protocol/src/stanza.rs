use serde::{Deserialize, Serialize};

/// An outbound element: name, ordered attributes, optional text body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutStanza {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
}

impl OutStanza {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn body(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// A complete response to one request: a result stanza with children, or
/// an error stanza carrying a user-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Result(Vec<OutStanza>),
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Result(_) => None,
        }
    }

    /// First child of a result stanza named `name`.
    pub fn child(&self, name: &str) -> Option<&OutStanza> {
        match self {
            Self::Result(children) => children.iter().find(|c| c.name() == name),
            Self::Error { .. } => None,
        }
    }
}

/// Outbound side of a session. The transport serializes whatever is pushed
/// here onto the connection.
pub trait ResponseSink {
    fn push(&mut self, response: Response);
}

/// A [`ResponseSink`] that buffers responses until the transport drains them.
#[derive(Clone, Debug, Default)]
pub struct ResponseQueue {
    responses: Vec<Response>,
}

impl ResponseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Take all buffered responses, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Response> {
        std::mem::take(&mut self.responses)
    }
}

impl ResponseSink for ResponseQueue {
    fn push(&mut self, response: Response) {
        self.responses.push(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stanza_keeps_attribute_order() {
        let s = OutStanza::new("sync_pull")
            .attr("branch", "main")
            .attr("base", "")
            .attr("tip", "ab");
        let keys: Vec<&str> = s.attributes().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["branch", "base", "tip"]);
        assert_eq!(s.attribute("tip"), Some("ab"));
        assert_eq!(s.attribute("missing"), None);
        assert!(s.body().is_none());
    }

    #[test]
    fn response_child_lookup() {
        let r = Response::Result(vec![
            OutStanza::new("sync_push").attr("tip", "cd"),
            OutStanza::new("pack").text("AAAA"),
        ]);
        assert!(!r.is_error());
        assert_eq!(r.child("pack").and_then(OutStanza::body), Some("AAAA"));
        assert!(r.child("nope").is_none());
    }

    #[test]
    fn error_response() {
        let r = Response::error("Push: no such branch.");
        assert!(r.is_error());
        assert_eq!(r.error_message(), Some("Push: no such branch."));
        assert!(r.child("sync_push").is_none());
    }

    #[test]
    fn queue_drains() {
        let mut q = ResponseQueue::new();
        q.push(Response::error("x"));
        assert_eq!(q.len(), 1);
        let drained = q.drain();
        assert_eq!(drained.len(), 1);
        assert!(q.is_empty());
    }
}
