use crate::error::{Result, SnipjarError};
use crate::models::SnippetId;
use crate::repository::Repository;
use crate::storage::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    /// Nothing loaded; the fields do not accept input.
    Disabled,
    /// Loaded and identical to the persisted snippet.
    Clean,
    /// Loaded with unsaved edits.
    Dirty,
}

/// Working copy of the snippet being edited.
///
/// `dirty` can only be set while a snippet is loaded, and once set it stays
/// set until the next save, load or clear.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    active_id: Option<SnippetId>,
    title: String,
    content: String,
    dirty: bool,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> EditorStatus {
        match (self.active_id, self.dirty) {
            (None, _) => EditorStatus::Disabled,
            (Some(_), false) => EditorStatus::Clean,
            (Some(_), true) => EditorStatus::Dirty,
        }
    }

    pub fn active_id(&self) -> Option<SnippetId> {
        self.active_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_enabled(&self) -> bool {
        self.active_id.is_some()
    }

    /// Copy snippet `id` into the working fields. Leaves the editor untouched
    /// if the id does not resolve.
    pub fn load<S: Store>(&mut self, repo: &Repository<S>, id: SnippetId) -> Result<()> {
        let snippet = repo.find(id).ok_or(SnipjarError::NotFound(id))?;
        self.active_id = Some(snippet.id);
        self.title = snippet.title.clone();
        self.content = snippet.content.clone();
        self.dirty = false;
        Ok(())
    }

    pub fn edit_title<S: Store>(&mut self, repo: &Repository<S>, title: &str) {
        if self.active_id.is_none() {
            return;
        }
        self.title = title.to_string();
        self.refresh_dirty(repo);
    }

    pub fn edit_content<S: Store>(&mut self, repo: &Repository<S>, content: &str) {
        if self.active_id.is_none() {
            return;
        }
        self.content = content.to_string();
        self.refresh_dirty(repo);
    }

    /// Write the working fields back. Returns `false` when nothing is loaded.
    ///
    /// The editor stays dirty if the write fails.
    pub fn save<S: Store>(&mut self, repo: &mut Repository<S>) -> Result<bool> {
        let Some(id) = self.active_id else {
            return Ok(false);
        };
        repo.update(id, &self.title, &self.content)?;
        self.dirty = false;
        Ok(true)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop the working copy if `id` is the snippet being edited.
    pub fn forget(&mut self, id: SnippetId) -> bool {
        if self.active_id == Some(id) {
            self.clear();
            true
        } else {
            false
        }
    }

    fn refresh_dirty<S: Store>(&mut self, repo: &Repository<S>) {
        if self.dirty {
            return;
        }
        let Some(id) = self.active_id else {
            return;
        };
        if let Some(stored) = repo.find(id) {
            if !stored.matches(&self.title, &self.content) {
                self.dirty = true;
            }
        }
    }
}
