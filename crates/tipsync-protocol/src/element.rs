use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// An inbound element as reported by the stanza parser: a name and its
/// attributes. Text content arrives separately as [`ParseEvent::Text`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value, or `None` when absent. An attribute that is present
    /// but empty is `Some("")`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &'static str) -> ProtocolResult<&str> {
        self.attr(key).ok_or_else(|| ProtocolError::MissingAttribute {
            element: self.name.clone(),
            attribute: key,
        })
    }
}

/// One event from the stanza parser, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseEvent {
    Start(Element),
    Text(String),
    End(String),
}
