use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifiers arrive as JSON numbers or strings; both are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl EntityId {
    /// Parses user input. Only canonical integers become numeric ids, so `"007"` stays text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => EntityId::Int(n),
            _ => EntityId::Text(raw.to_string()),
        }
    }

    /// Matches ids across representations: `5` and `"5"` name the same entity.
    pub fn same_entity(&self, other: &EntityId) -> bool {
        match (self, other) {
            (EntityId::Int(a), EntityId::Int(b)) => a == b,
            (EntityId::Text(a), EntityId::Text(b)) => a == b,
            (EntityId::Int(n), EntityId::Text(s)) | (EntityId::Text(s), EntityId::Int(n)) => {
                n.to_string() == *s
            }
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => f.pad(&n.to_string()),
            EntityId::Text(s) => f.pad(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Int(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}
