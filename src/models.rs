use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TITLE: &str = "Untitled";

/// Integer snippet identifier.
///
/// Older libraries stored ids either as JSON numbers or as numeric strings.
/// Both forms are accepted when reading and normalized here, so the rest of
/// the crate only ever compares integers. Ids are always written back as
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnippetId(i64);

impl SnippetId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnippetId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(SnippetId)
            .map_err(|_| format!("'{}' is not a valid snippet id", s))
    }
}

impl Serialize for SnippetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct SnippetIdVisitor;

impl<'de> Visitor<'de> for SnippetIdVisitor {
    type Value = SnippetId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer id or a string holding an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<SnippetId, E> {
        Ok(SnippetId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<SnippetId, E> {
        i64::try_from(v)
            .map(SnippetId)
            .map_err(|_| E::custom(format!("id {} is out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<SnippetId, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for SnippetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(SnippetIdVisitor)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
}

impl Snippet {
    /// A fresh snippet with the default title and no content.
    pub fn new(id: SnippetId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
        }
    }

    pub fn matches(&self, title: &str, content: &str) -> bool {
        self.title == title && self.content == content
    }
}
