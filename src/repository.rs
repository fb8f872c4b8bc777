use crate::config::STORE_KEY;
use crate::error::{Result, SnipjarError};
use crate::models::{Snippet, SnippetId};
use crate::storage::Store;
use chrono::Utc;
use std::collections::HashSet;

/// Ordered, in-memory snippet collection mirrored to a [`Store`].
///
/// Every mutation is followed by a wholesale write of the collection under
/// [`STORE_KEY`]. If that write fails the in-memory change is kept and the
/// error is returned; memory and store may then disagree until the next
/// successful write.
#[derive(Debug)]
pub struct Repository<S: Store> {
    store: S,
    snippets: Vec<Snippet>,
    last_issued: i64,
}

impl<S: Store> Repository<S> {
    /// Rebuild the collection from whatever the store currently holds.
    pub fn load(store: S) -> Result<Self> {
        let raw = store.get(STORE_KEY)?;
        let snippets = Self::deserialize(raw.as_deref()).map_err(|e| {
            SnipjarError::Persistence(format!("stored snippets are unreadable: {}", e))
        })?;
        log::info!("Loaded {} snippets", snippets.len());
        Ok(Self {
            store,
            snippets,
            last_issued: 0,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn position(&self, id: SnippetId) -> Option<usize> {
        self.snippets.iter().position(|s| s.id == id)
    }

    pub fn find(&self, id: SnippetId) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    /// Append a fresh "Untitled" snippet and persist.
    ///
    /// On a failed write the snippet stays in memory and the error is returned.
    pub fn create(&mut self) -> Result<Snippet> {
        let snippet = Snippet::new(self.next_id()?);
        self.snippets.push(snippet.clone());
        log::info!("Created snippet {}", snippet.id);
        self.persist()?;
        Ok(snippet)
    }

    pub fn update(&mut self, id: SnippetId, title: &str, content: &str) -> Result<()> {
        let entry = self
            .snippets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SnipjarError::NotFound(id))?;
        entry.title = title.to_string();
        entry.content = content.to_string();
        self.persist()
    }

    /// Remove `id` if present and persist. Returns whether anything was removed.
    pub fn delete(&mut self, id: SnippetId) -> Result<bool> {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.id != id);
        let removed = self.snippets.len() != before;
        if removed {
            log::info!("Deleted snippet {}", id);
        } else {
            log::debug!("Delete of unknown snippet {} ignored", id);
        }
        self.persist()?;
        Ok(removed)
    }

    /// Replace the whole collection, used by import.
    ///
    /// Rejects collections with duplicate ids without touching the current one.
    pub fn replace_all(&mut self, snippets: Vec<Snippet>) -> Result<()> {
        check_unique_ids(&snippets)?;
        self.snippets = snippets;
        log::info!("Replaced collection with {} snippets", self.snippets.len());
        self.persist()
    }

    /// Parse an import document and install it. Returns the number of snippets.
    pub fn import(&mut self, document: &[u8]) -> Result<usize> {
        let snippets = parse_collection(document)?;
        let count = snippets.len();
        self.replace_all(snippets)?;
        Ok(count)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.snippets)?)
    }

    /// Decode a stored collection. A missing or blank value is an empty one.
    pub fn deserialize(raw: Option<&[u8]>) -> Result<Vec<Snippet>> {
        match raw {
            None => Ok(Vec::new()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Some(bytes) => parse_collection(bytes),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = self.serialize()?;
        self.store.set(STORE_KEY, &bytes)
    }

    /// Millisecond timestamp, bumped past every id already in use.
    fn next_id(&mut self) -> Result<SnippetId> {
        let now = Utc::now().timestamp_millis();
        let floor = self
            .snippets
            .iter()
            .map(|s| s.id.get())
            .max()
            .unwrap_or(0)
            .max(self.last_issued);
        let id = if now > floor {
            now
        } else {
            floor
                .checked_add(1)
                .ok_or(SnipjarError::IdsExhausted(SnippetId::new(floor)))?
        };
        self.last_issued = id;
        Ok(SnippetId::new(id))
    }
}

/// Parse a JSON array of `{id, title, content}` objects with unique ids.
pub fn parse_collection(bytes: &[u8]) -> Result<Vec<Snippet>> {
    let snippets: Vec<Snippet> =
        serde_json::from_slice(bytes).map_err(|e| SnipjarError::ImportFormat(e.to_string()))?;
    check_unique_ids(&snippets)?;
    Ok(snippets)
}

fn check_unique_ids(snippets: &[Snippet]) -> Result<()> {
    let mut seen = HashSet::with_capacity(snippets.len());
    for snippet in snippets {
        if !seen.insert(snippet.id) {
            return Err(SnipjarError::ImportFormat(format!(
                "duplicate snippet id {}",
                snippet.id
            )));
        }
    }
    Ok(())
}
