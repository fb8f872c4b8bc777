use crate::clipboard::ClipboardSink;
use crate::config::resolve_export_path;
use crate::editor::EditorState;
use crate::error::{Result, SnipjarError};
use crate::gate::{Answer, ConfirmationGate, Prompt, Resolution};
use crate::models::SnippetId;
use crate::repository::Repository;
use crate::storage::Store;
use std::fs;
use std::path::PathBuf;

pub const DELETE_MESSAGE: &str = "Are you sure you want to delete this snippet?";
pub const IMPORT_MESSAGE: &str =
    "Importing a snippet library will overwrite your current snippets. Are you sure you want to continue?";

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Select(SnippetId),
    EditTitle(String),
    EditContent(String),
    Save,
    Delete(SnippetId),
    /// Write the library to a file, or to `snippets.json` inside a directory.
    Export(PathBuf),
    /// Replace the library with the given JSON document.
    Import(Vec<u8>),
    CopyContent,
    Clear,
}

/// Result of a command or an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The command had nothing to act on.
    Ignored,
    /// A confirmation is pending; only an answer is accepted.
    Blocked,
    AwaitConfirm(String),
    AwaitSaveChoice,
    Created(SnippetId),
    Exported(PathBuf),
    Imported(usize),
    Cancelled,
}

#[derive(Debug)]
enum Navigation {
    New,
    Select(SnippetId),
    Clear,
}

#[derive(Debug)]
enum Pending {
    Navigate(Navigation),
    Delete(SnippetId),
    Import(Vec<u8>),
}

/// Owns the library, the editor and the confirmation gate, and applies
/// commands to them one at a time.
pub struct Session<S: Store> {
    repo: Repository<S>,
    editor: EditorState,
    gate: ConfirmationGate<Pending>,
    clipboard: Box<dyn ClipboardSink>,
}

impl<S: Store> Session<S> {
    pub fn open(store: S, clipboard: Box<dyn ClipboardSink>) -> Result<Self> {
        Ok(Self {
            repo: Repository::load(store)?,
            editor: EditorState::new(),
            gate: ConfirmationGate::new(),
            clipboard,
        })
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// The open question, if a confirmation is pending.
    pub fn prompt(&self) -> Option<Prompt<'_>> {
        self.gate.prompt()
    }

    pub fn is_blocked(&self) -> bool {
        self.gate.is_open()
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        if self.gate.is_open() {
            log::debug!("Ignoring {:?} while a confirmation is pending", command);
            return Ok(Outcome::Blocked);
        }

        match command {
            Command::New => self.navigate(Navigation::New),
            Command::Select(id) => {
                if self.editor.active_id() == Some(id) {
                    return Ok(Outcome::Ignored);
                }
                if self.repo.find(id).is_none() {
                    return Err(SnipjarError::NotFound(id));
                }
                self.navigate(Navigation::Select(id))
            }
            Command::Clear => {
                if !self.editor.is_enabled() {
                    return Ok(Outcome::Ignored);
                }
                self.navigate(Navigation::Clear)
            }
            Command::EditTitle(title) => {
                if !self.editor.is_enabled() {
                    return Ok(Outcome::Ignored);
                }
                self.editor.edit_title(&self.repo, &title);
                Ok(Outcome::Done)
            }
            Command::EditContent(content) => {
                if !self.editor.is_enabled() {
                    return Ok(Outcome::Ignored);
                }
                self.editor.edit_content(&self.repo, &content);
                Ok(Outcome::Done)
            }
            Command::Save => {
                if self.editor.save(&mut self.repo)? {
                    Ok(Outcome::Done)
                } else {
                    Ok(Outcome::Ignored)
                }
            }
            Command::Delete(id) => {
                if self.repo.find(id).is_none() {
                    return Err(SnipjarError::NotFound(id));
                }
                self.gate.confirm(DELETE_MESSAGE, Pending::Delete(id));
                Ok(Outcome::AwaitConfirm(DELETE_MESSAGE.to_string()))
            }
            Command::Export(target) => {
                let path = resolve_export_path(&target);
                fs::write(&path, self.repo.serialize()?)?;
                log::info!("Exported {} snippets to {}", self.repo.len(), path.display());
                Ok(Outcome::Exported(path))
            }
            Command::Import(document) => {
                self.gate.confirm(IMPORT_MESSAGE, Pending::Import(document));
                Ok(Outcome::AwaitConfirm(IMPORT_MESSAGE.to_string()))
            }
            Command::CopyContent => {
                if !self.editor.is_enabled() {
                    return Ok(Outcome::Ignored);
                }
                self.clipboard.set_text(self.editor.content())?;
                Ok(Outcome::Done)
            }
        }
    }

    /// Close the open confirmation and run or drop the action it was holding.
    pub fn answer(&mut self, answer: Answer) -> Result<Outcome> {
        match self.gate.resolve(answer) {
            Resolution::Idle => Ok(Outcome::Ignored),
            Resolution::Rejected => Ok(Outcome::Blocked),
            Resolution::Cancelled => Ok(Outcome::Cancelled),
            Resolution::Proceed(Pending::Delete(id)) => {
                let deleted = self.repo.delete(id);
                self.editor.forget(id);
                deleted.map(|_| Outcome::Done)
            }
            Resolution::Proceed(Pending::Import(document)) => {
                match self.repo.import(&document) {
                    Err(e @ SnipjarError::ImportFormat(_)) => Err(e),
                    result => {
                        // the collection was swapped even if the write failed
                        self.editor.clear();
                        let count = result?;
                        log::info!("Imported {} snippets", count);
                        Ok(Outcome::Imported(count))
                    }
                }
            }
            Resolution::Save(Pending::Navigate(next)) => {
                match self.editor.save(&mut self.repo) {
                    Ok(_) => {}
                    Err(SnipjarError::NotFound(id)) => {
                        log::warn!("Outgoing snippet {} no longer exists, not saved", id);
                    }
                    Err(e) => return Err(e),
                }
                self.complete(next)
            }
            Resolution::Discard(Pending::Navigate(next)) => self.complete(next),
            // questions and actions are paired when the gate opens
            Resolution::Proceed(_) | Resolution::Save(_) | Resolution::Discard(_) => {
                Ok(Outcome::Ignored)
            }
        }
    }

    fn navigate(&mut self, next: Navigation) -> Result<Outcome> {
        if self.editor.is_dirty() {
            self.gate.confirm_save(Pending::Navigate(next));
            return Ok(Outcome::AwaitSaveChoice);
        }
        self.complete(next)
    }

    fn complete(&mut self, next: Navigation) -> Result<Outcome> {
        match next {
            Navigation::New => {
                let snippet = self.repo.create()?;
                self.editor.load(&self.repo, snippet.id)?;
                Ok(Outcome::Created(snippet.id))
            }
            Navigation::Select(id) => {
                self.editor.load(&self.repo, id)?;
                Ok(Outcome::Done)
            }
            Navigation::Clear => {
                self.editor.clear();
                Ok(Outcome::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::config::STORE_KEY;
    use crate::editor::EditorStatus;
    use crate::models::Snippet;
    use crate::storage::MemoryStore;

    fn session_with(snippets: &[Snippet]) -> Session<MemoryStore> {
        let raw = serde_json::to_vec(snippets).unwrap();
        let store = MemoryStore::with_entry(STORE_KEY, &raw);
        Session::open(store, Box::new(MemoryClipboard::default())).unwrap()
    }

    fn snippet(id: i64, title: &str, content: &str) -> Snippet {
        Snippet {
            id: SnippetId::new(id),
            title: title.into(),
            content: content.into(),
        }
    }

    fn id(raw: i64) -> SnippetId {
        SnippetId::new(raw)
    }

    #[test]
    fn test_new_creates_and_loads() {
        let mut session = session_with(&[]);
        let outcome = session.dispatch(Command::New).unwrap();
        let Outcome::Created(new_id) = &outcome else {
            panic!("unexpected outcome {:?}", outcome);
        };
        assert_eq!(session.editor().active_id(), Some(*new_id));
        assert_eq!(session.editor().title(), "Untitled");
        assert_eq!(session.editor().status(), EditorStatus::Clean);
    }

    #[test]
    fn test_select_dirty_cancel_keeps_everything() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();

        assert_eq!(
            session.dispatch(Command::Select(id(2))).unwrap(),
            Outcome::AwaitSaveChoice
        );
        assert_eq!(session.prompt(), Some(Prompt::SaveChanges));
        assert_eq!(session.answer(Answer::Cancel).unwrap(), Outcome::Cancelled);

        assert_eq!(session.editor().active_id(), Some(id(1)));
        assert_eq!(session.editor().content(), "x2");
        assert!(session.editor().is_dirty());
        assert_eq!(session.repository().find(id(1)).unwrap().content, "x");
    }

    #[test]
    fn test_select_dirty_save_persists_outgoing() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditTitle("a2".into())).unwrap();
        session.dispatch(Command::Select(id(2))).unwrap();

        assert_eq!(session.answer(Answer::Save).unwrap(), Outcome::Done);
        assert_eq!(session.repository().find(id(1)).unwrap().title, "a2");
        assert_eq!(session.editor().active_id(), Some(id(2)));
        assert_eq!(session.editor().status(), EditorStatus::Clean);
    }

    #[test]
    fn test_select_dirty_discard_drops_edits() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("lost".into())).unwrap();
        session.dispatch(Command::Select(id(2))).unwrap();

        assert_eq!(session.answer(Answer::Discard).unwrap(), Outcome::Done);
        assert_eq!(session.repository().find(id(1)).unwrap().content, "x");
        assert_eq!(session.editor().content(), "y");
    }

    #[test]
    fn test_new_while_dirty_asks_first() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        assert_eq!(session.dispatch(Command::New).unwrap(), Outcome::AwaitSaveChoice);
        session.answer(Answer::Cancel).unwrap();
        assert_eq!(session.repository().len(), 1);

        session.dispatch(Command::New).unwrap();
        assert!(matches!(session.answer(Answer::Discard).unwrap(), Outcome::Created(_)));
        assert_eq!(session.repository().len(), 2);
    }

    #[test]
    fn test_commands_blocked_while_gate_open() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        session.dispatch(Command::Delete(id(1))).unwrap();
        assert!(session.is_blocked());
        assert_eq!(session.dispatch(Command::New).unwrap(), Outcome::Blocked);
        assert_eq!(
            session.dispatch(Command::Import(b"[]".to_vec())).unwrap(),
            Outcome::Blocked
        );
        assert_eq!(session.repository().len(), 1);
        assert_eq!(session.answer(Answer::Save).unwrap(), Outcome::Blocked);
        assert_eq!(session.answer(Answer::Proceed).unwrap(), Outcome::Done);
        assert!(session.repository().is_empty());
    }

    #[test]
    fn test_delete_other_snippet_keeps_editor() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::Delete(id(2))).unwrap();
        session.answer(Answer::Proceed).unwrap();
        assert_eq!(session.editor().active_id(), Some(id(1)));
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let mut session = session_with(&[]);
        let err = session.dispatch(Command::Delete(id(4))).unwrap_err();
        assert!(err.is_recoverable_noop());
        assert!(!session.is_blocked());
    }

    #[test]
    fn test_save_without_active_is_ignored() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        assert_eq!(session.dispatch(Command::Save).unwrap(), Outcome::Ignored);
        assert_eq!(
            session.dispatch(Command::EditContent("z".into())).unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_save_on_switch_to_vanished_snippet_still_switches() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        session.dispatch(Command::Select(id(2))).unwrap();
        // snippet 1 disappears behind the editor's back
        session.repository_mut().delete(id(1)).unwrap();

        assert_eq!(session.answer(Answer::Save).unwrap(), Outcome::Done);
        assert_eq!(session.editor().active_id(), Some(id(2)));
        assert_eq!(session.repository().len(), 1);
    }

    #[test]
    fn test_select_active_is_noop() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        assert_eq!(session.dispatch(Command::Select(id(1))).unwrap(), Outcome::Ignored);
        assert!(!session.is_blocked());
    }

    #[test]
    fn test_clear_dirty_editor_asks() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        assert_eq!(session.dispatch(Command::Clear).unwrap(), Outcome::Done);
        assert_eq!(session.editor().status(), EditorStatus::Disabled);

        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        assert_eq!(session.dispatch(Command::Clear).unwrap(), Outcome::AwaitSaveChoice);
        session.answer(Answer::Save).unwrap();
        assert_eq!(session.editor().status(), EditorStatus::Disabled);
        assert_eq!(session.repository().find(id(1)).unwrap().content, "x2");
    }

    #[test]
    fn test_failed_save_on_switch_keeps_outgoing_edits() {
        let mut session = session_with(&[snippet(1, "a", "x"), snippet(2, "b", "y")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        session.dispatch(Command::Select(id(2))).unwrap();
        session.repository_mut().store_mut().set_read_only(true);

        let err = session.answer(Answer::Save).unwrap_err();
        assert!(matches!(err, SnipjarError::Persistence(_)));
        assert!(!session.is_blocked());
        assert_eq!(session.editor().active_id(), Some(id(1)));
        assert_eq!(session.editor().content(), "x2");
        assert!(session.editor().is_dirty());
    }

    #[test]
    fn test_new_after_import_of_max_id_is_an_error() {
        let mut session = session_with(&[]);
        let doc = format!(r#"[{{"id":{},"title":"last","content":""}}]"#, i64::MAX);
        session.dispatch(Command::Import(doc.into_bytes())).unwrap();
        assert_eq!(session.answer(Answer::Proceed).unwrap(), Outcome::Imported(1));

        let err = session.dispatch(Command::New).unwrap_err();
        assert!(matches!(err, SnipjarError::IdsExhausted(_)));
        assert_eq!(session.repository().len(), 1);
        assert_eq!(session.editor().status(), EditorStatus::Disabled);
        assert!(!session.is_blocked());
    }

    #[test]
    fn test_persistence_failure_leaves_session_usable() {
        let mut session = session_with(&[snippet(1, "a", "x")]);
        session.dispatch(Command::Select(id(1))).unwrap();
        session.dispatch(Command::EditContent("x2".into())).unwrap();
        session.repository_mut().store_mut().set_read_only(true);

        let err = session.dispatch(Command::Save).unwrap_err();
        assert!(matches!(err, SnipjarError::Persistence(_)));
        assert!(session.editor().is_dirty());

        session.repository_mut().store_mut().set_read_only(false);
        assert_eq!(session.dispatch(Command::Save).unwrap(), Outcome::Done);
        assert!(!session.editor().is_dirty());
    }
}
