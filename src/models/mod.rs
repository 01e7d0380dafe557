use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Identifier assigned by the backend. The client never interprets it; the
/// backend may send it as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n.to_string())),
            Raw::Text(s) if s.is_empty() => Err(de::Error::custom("empty todo id")),
            Raw::Text(s) => Ok(Self(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Body of the direct-add and update calls: `{"title": .., "due_date": ..|null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    pub title: String,
    pub due_date: Option<String>,
}
impl TodoDraft {
    /// An empty due date input means "no due date" and goes out as `null`.
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        let due_date = due_date.into();
        Self {
            title: title.into(),
            due_date: (!due_date.is_empty()).then_some(due_date),
        }
    }
}
