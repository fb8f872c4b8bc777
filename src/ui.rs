use crate::editor::EditorStatus;
use crate::error::{Result, SnipjarError};
use crate::gate::{Answer, Prompt};
use crate::models::{Snippet, SnippetId};
use crate::session::{Command, Outcome, Session};
use crate::storage::Store;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::fs;
use std::io::{self, stdout};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Title,
    Content,
}

/// Path being typed for an export or import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathInput {
    Export(String),
    Import(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Confirm,
    SaveChoice,
    Path,
    Pane(Focus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Open,
    New,
    Delete,
    Save,
    Copy,
    Clear,
    StartExport,
    StartImport,
    Focus(Focus),
    Insert(char),
    Backspace,
    Answer(Answer),
    Submit,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Translate a key press into an action for the current mode.
pub fn map_key(mode: Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match mode {
        Mode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(Action::Answer(Answer::Proceed))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(Action::Answer(Answer::Cancel))
            }
            _ => None,
        },
        Mode::SaveChoice => match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Answer(Answer::Save)),
            KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Answer(Answer::Discard)),
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
                Some(Action::Answer(Answer::Cancel))
            }
            _ => None,
        },
        Mode::Path => match key.code {
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Esc => Some(Action::Dismiss),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) if !ctrl => Some(Action::Insert(c)),
            _ => None,
        },
        Mode::Pane(_) if ctrl => match key.code {
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        },
        Mode::Pane(Focus::List) => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Enter => Some(Action::Open),
            KeyCode::Char('n') => Some(Action::New),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
            KeyCode::Char('c') => Some(Action::Copy),
            KeyCode::Char('x') => Some(Action::Clear),
            KeyCode::Char('e') => Some(Action::StartExport),
            KeyCode::Char('i') => Some(Action::StartImport),
            KeyCode::Tab => Some(Action::Focus(Focus::Title)),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },
        Mode::Pane(Focus::Title) => match key.code {
            KeyCode::Enter | KeyCode::Tab => Some(Action::Focus(Focus::Content)),
            KeyCode::Esc => Some(Action::Focus(Focus::List)),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Insert(c)),
            _ => None,
        },
        Mode::Pane(Focus::Content) => match key.code {
            KeyCode::Enter => Some(Action::Insert('\n')),
            // literal tab, the content field is for code
            KeyCode::Tab => Some(Action::Insert('\t')),
            KeyCode::BackTab => Some(Action::Focus(Focus::Title)),
            KeyCode::Esc => Some(Action::Focus(Focus::List)),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Insert(c)),
            _ => None,
        },
    }
}

/// View state of the terminal UI. Library state lives in the [`Session`].
#[derive(Debug)]
pub struct App {
    pub focus: Focus,
    pub selected: usize,
    pub path_input: Option<PathInput>,
    pub notice: Option<(String, Level)>,
    pub should_quit: bool,
    quit_after_gate: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            focus: Focus::List,
            selected: 0,
            path_input: None,
            notice: None,
            should_quit: false,
            quit_after_gate: false,
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode<S: Store>(&self, session: &Session<S>) -> Mode {
        match session.prompt() {
            Some(Prompt::Confirm(_)) => Mode::Confirm,
            Some(Prompt::SaveChanges) => Mode::SaveChoice,
            None if self.path_input.is_some() => Mode::Path,
            None if session.editor().is_enabled() => Mode::Pane(self.focus),
            None => Mode::Pane(Focus::List),
        }
    }

    /// Handle one key press. Errors end up in the notice line, never the loop.
    pub fn handle_key<S: Store>(&mut self, session: &mut Session<S>, key: KeyEvent) {
        let Some(action) = map_key(self.mode(session), key) else {
            return;
        };
        if let Err(e) = self.apply(session, action) {
            self.report(&e);
        }
        self.sync(session);
    }

    pub fn apply<S: Store>(&mut self, session: &mut Session<S>, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                if session.editor().is_dirty() {
                    self.quit_after_gate = true;
                    let outcome = session.dispatch(Command::Clear)?;
                    self.after(session, outcome);
                } else {
                    self.should_quit = true;
                }
            }
            Action::Up => self.selected = self.selected.saturating_sub(1),
            Action::Down => {
                if self.selected + 1 < session.repository().len() {
                    self.selected += 1;
                }
            }
            Action::Open => {
                if let Some(id) = self.selected_id(session) {
                    let outcome = session.dispatch(Command::Select(id))?;
                    self.after(session, outcome);
                }
            }
            Action::New => {
                let outcome = session.dispatch(Command::New)?;
                self.after(session, outcome);
            }
            Action::Delete => {
                if let Some(id) = self.selected_id(session) {
                    session.dispatch(Command::Delete(id))?;
                }
            }
            Action::Save => {
                if session.dispatch(Command::Save)? == Outcome::Done {
                    self.notify("Saved", Level::Info);
                }
            }
            Action::Copy => {
                if session.dispatch(Command::CopyContent)? == Outcome::Done {
                    self.notify("Copied to clipboard", Level::Info);
                }
            }
            Action::Clear => {
                let outcome = session.dispatch(Command::Clear)?;
                self.after(session, outcome);
            }
            Action::StartExport => self.path_input = Some(PathInput::Export(String::new())),
            Action::StartImport => self.path_input = Some(PathInput::Import(String::new())),
            Action::Focus(focus) => {
                if focus == Focus::List || session.editor().is_enabled() {
                    self.focus = focus;
                }
            }
            Action::Insert(c) => match self.path_input.as_mut() {
                Some(PathInput::Export(path)) | Some(PathInput::Import(path)) => path.push(c),
                None => self.edit(session, |text| text.push(c))?,
            },
            Action::Backspace => match self.path_input.as_mut() {
                Some(PathInput::Export(path)) | Some(PathInput::Import(path)) => {
                    path.pop();
                }
                None => self.edit(session, |text| {
                    text.pop();
                })?,
            },
            Action::Answer(answer) => {
                let outcome = session.answer(answer)?;
                self.after(session, outcome);
            }
            Action::Submit => match self.path_input.take() {
                Some(PathInput::Export(path)) => {
                    let target = if path.trim().is_empty() {
                        PathBuf::from(".")
                    } else {
                        PathBuf::from(path.trim())
                    };
                    let outcome = session.dispatch(Command::Export(target))?;
                    self.after(session, outcome);
                }
                Some(PathInput::Import(path)) => {
                    let document = fs::read(path.trim())?;
                    session.dispatch(Command::Import(document))?;
                }
                None => {}
            },
            Action::Dismiss => self.path_input = None,
        }
        Ok(())
    }

    fn edit<S: Store>(
        &mut self,
        session: &mut Session<S>,
        change: impl FnOnce(&mut String),
    ) -> Result<()> {
        let command = match self.focus {
            Focus::Title => {
                let mut title = session.editor().title().to_string();
                change(&mut title);
                Command::EditTitle(title)
            }
            Focus::Content => {
                let mut content = session.editor().content().to_string();
                change(&mut content);
                Command::EditContent(content)
            }
            Focus::List => return Ok(()),
        };
        session.dispatch(command)?;
        Ok(())
    }

    fn after<S: Store>(&mut self, session: &Session<S>, outcome: Outcome) {
        match outcome {
            Outcome::Created(_) => self.focus = Focus::Content,
            Outcome::Exported(path) => {
                self.notify(&format!("Exported to {}", path.display()), Level::Info)
            }
            Outcome::Imported(count) => {
                self.selected = 0;
                self.notify(&format!("Imported {} snippets", count), Level::Info);
            }
            Outcome::Cancelled => self.quit_after_gate = false,
            _ => {}
        }
        if self.quit_after_gate && !session.is_blocked() {
            self.should_quit = true;
        }
    }

    fn sync<S: Store>(&mut self, session: &Session<S>) {
        let repo = session.repository();
        if let Some(pos) = session.editor().active_id().and_then(|id| repo.position(id)) {
            if self.focus != Focus::List {
                self.selected = pos;
            }
        }
        if self.selected >= repo.len() {
            self.selected = repo.len().saturating_sub(1);
        }
        if !session.editor().is_enabled() {
            self.focus = Focus::List;
        }
    }

    fn selected_id<S: Store>(&self, session: &Session<S>) -> Option<SnippetId> {
        session
            .repository()
            .snippets()
            .get(self.selected)
            .map(|s| s.id)
    }

    fn notify(&mut self, text: &str, level: Level) {
        self.notice = Some((text.to_string(), level));
    }

    fn report(&mut self, error: &SnipjarError) {
        self.quit_after_gate = false;
        if error.is_recoverable_noop() {
            log::warn!("{}", error);
            self.notify(&error.user_message(), Level::Warn);
        } else {
            log::error!("{}", error);
            self.notify(&error.user_message(), Level::Error);
        }
    }
}

/// Display the snippet manager UI
pub fn display_snippet_manager<S: Store>(session: &mut Session<S>) -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    let result = run_ui(&mut terminal, session);

    // Clean up terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    result
}

/// Main UI loop
fn run_ui<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session<S>,
) -> Result<()> {
    let mut app = App::new();

    while !app.should_quit {
        let mode = app.mode(session);
        terminal.draw(|f| {
            let size = f.size();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(2)].as_ref())
                .split(size);
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
                .split(rows[0]);
            let editor_rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
                .split(panes[1]);

            let snippets = session.repository().snippets();
            let active = session.editor().active_id();
            let mut state = ListState::default();
            if !snippets.is_empty() {
                state.select(Some(app.selected));
            }
            f.render_stateful_widget(
                snippet_list(snippets, active, mode == Mode::Pane(Focus::List)),
                panes[0],
                &mut state,
            );

            let status = session.editor().status();
            let (title, content) = editor_fields(
                session.editor().title(),
                session.editor().content(),
                status,
                mode,
            );
            f.render_widget(title, editor_rows[0]);
            f.render_widget(content, editor_rows[1]);
            f.render_widget(footer(mode, app.notice.as_ref()), rows[1]);

            if let Some(popup) = popup(session.prompt(), app.path_input.as_ref()) {
                let area = centered_rect(60, 20, size);
                f.render_widget(Clear, area);
                f.render_widget(popup, area);
            }
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(session, key);
            }
        }
    }

    Ok(())
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn snippet_list(
    snippets: &[Snippet],
    active: Option<SnippetId>,
    focused: bool,
) -> List<'_> {
    let items: Vec<ListItem> = snippets
        .iter()
        .map(|snippet| {
            let style = if Some(snippet.id) == active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(snippet.title.as_str(), style)))
        })
        .collect();

    List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Snippets ")
                .border_style(border_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ")
}

fn editor_fields<'a>(
    title: &'a str,
    content: &'a str,
    status: EditorStatus,
    mode: Mode,
) -> (Paragraph<'a>, Paragraph<'a>) {
    let heading = match status {
        EditorStatus::Disabled | EditorStatus::Clean => " Title ",
        EditorStatus::Dirty => " Title ● unsaved ",
    };
    let text_style = if status == EditorStatus::Disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let title = Paragraph::new(title).style(text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(heading)
            .border_style(border_style(mode == Mode::Pane(Focus::Title))),
    );
    let content = Paragraph::new(content.replace('\t', "    "))
        .style(text_style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Content ")
                .border_style(border_style(mode == Mode::Pane(Focus::Content))),
        );
    (title, content)
}

fn footer(mode: Mode, notice: Option<&(String, Level)>) -> Paragraph<'static> {
    let keys: &'static [(&'static str, &'static str)] = match mode {
        Mode::Confirm => &[("y", "Yes"), ("n", "No")],
        Mode::SaveChoice => &[("s", "Save"), ("d", "Discard"), ("Esc", "Cancel")],
        Mode::Path => &[("Enter", "Confirm"), ("Esc", "Cancel")],
        Mode::Pane(Focus::List) => &[
            ("↑/↓", "Navigate"),
            ("Enter", "Open"),
            ("n", "New"),
            ("d", "Delete"),
            ("c", "Copy"),
            ("e", "Export"),
            ("i", "Import"),
            ("q", "Quit"),
        ],
        Mode::Pane(_) => &[("Ctrl+S", "Save"), ("Tab", "Next field"), ("Esc", "Back")],
    };

    let mut spans = Vec::new();
    for (key, label) in keys {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(": {}  ", label)));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some((text, level)) = notice {
        let color = match level {
            Level::Info => Color::Green,
            Level::Warn => Color::Yellow,
            Level::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            text.clone(),
            Style::default().fg(color),
        )));
    }
    Paragraph::new(lines)
}

fn popup<'a>(prompt: Option<Prompt<'a>>, path_input: Option<&'a PathInput>) -> Option<Paragraph<'a>> {
    let (title, body) = match (prompt, path_input) {
        (Some(Prompt::Confirm(message)), _) => (" Confirm ", format!("{}\n\n[y] Yes   [n] No", message)),
        (Some(Prompt::SaveChanges), _) => (
            " Unsaved changes ",
            "Save changes to the current snippet?\n\n[s] Save   [d] Discard   [Esc] Cancel"
                .to_string(),
        ),
        (None, Some(PathInput::Export(path))) => (
            " Export ",
            format!("Export to (file or directory, empty for current):\n\n{}", path),
        ),
        (None, Some(PathInput::Import(path))) => (" Import ", format!("Import from file:\n\n{}", path)),
        (None, None) => return None,
    };

    Some(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .style(Style::default().fg(Color::White).bg(Color::Black)),
            ),
    )
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::config::STORE_KEY;
    use crate::storage::MemoryStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session() -> Session<MemoryStore> {
        let raw = br#"[{"id":1,"title":"one","content":"a"},{"id":2,"title":"two","content":"b"}]"#;
        Session::open(
            MemoryStore::with_entry(STORE_KEY, raw),
            Box::new(MemoryClipboard::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_ctrl_s_saves_from_editor_panes() {
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(map_key(Mode::Pane(Focus::Content), ctrl_s), Some(Action::Save));
        assert_eq!(map_key(Mode::Pane(Focus::List), ctrl_s), Some(Action::Save));
        assert_eq!(map_key(Mode::Confirm, ctrl_s), None);
    }

    #[test]
    fn test_tab_in_content_inserts_tab() {
        assert_eq!(
            map_key(Mode::Pane(Focus::Content), key(KeyCode::Tab)),
            Some(Action::Insert('\t'))
        );
        assert_eq!(
            map_key(Mode::Pane(Focus::Title), key(KeyCode::Tab)),
            Some(Action::Focus(Focus::Content))
        );
    }

    #[test]
    fn test_typing_marks_dirty_and_ctrl_s_saves() {
        let mut session = session();
        let mut app = App::new();
        app.handle_key(&mut session, key(KeyCode::Enter));
        assert_eq!(session.editor().active_id(), Some(SnippetId::new(1)));

        app.handle_key(&mut session, key(KeyCode::Tab));
        app.handle_key(&mut session, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Content);
        app.handle_key(&mut session, key(KeyCode::Char('!')));
        assert!(session.editor().is_dirty());

        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.handle_key(&mut session, ctrl_s);
        assert!(!session.editor().is_dirty());
        assert_eq!(
            session.repository().find(SnippetId::new(1)).unwrap().content,
            "a!"
        );
    }

    #[test]
    fn test_quit_with_unsaved_edits_asks_first() {
        let mut session = session();
        let mut app = App::new();
        app.handle_key(&mut session, key(KeyCode::Enter));
        app.handle_key(&mut session, key(KeyCode::Tab));
        app.handle_key(&mut session, key(KeyCode::Char('x')));
        app.handle_key(&mut session, key(KeyCode::Esc));
        app.handle_key(&mut session, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.mode(&session), Mode::SaveChoice);

        app.handle_key(&mut session, key(KeyCode::Esc));
        assert!(!app.should_quit);
        assert!(session.editor().is_dirty());

        app.handle_key(&mut session, key(KeyCode::Char('q')));
        app.handle_key(&mut session, key(KeyCode::Char('d')));
        assert!(app.should_quit);
        assert_eq!(
            session.repository().find(SnippetId::new(1)).unwrap().title,
            "one"
        );
    }

    #[test]
    fn test_delete_selected_via_keys() {
        let mut session = session();
        let mut app = App::new();
        app.handle_key(&mut session, key(KeyCode::Down));
        app.handle_key(&mut session, key(KeyCode::Char('d')));
        assert_eq!(app.mode(&session), Mode::Confirm);
        app.handle_key(&mut session, key(KeyCode::Char('n')));
        assert_eq!(session.repository().len(), 2);

        app.handle_key(&mut session, key(KeyCode::Char('d')));
        app.handle_key(&mut session, key(KeyCode::Char('y')));
        assert_eq!(session.repository().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_missing_import_file_is_reported() {
        let mut session = session();
        let mut app = App::new();
        app.handle_key(&mut session, key(KeyCode::Char('i')));
        for c in "/definitely/not/here.json".chars() {
            app.handle_key(&mut session, key(KeyCode::Char(c)));
        }
        app.handle_key(&mut session, key(KeyCode::Enter));
        assert!(matches!(app.notice, Some((_, Level::Error))));
        assert!(!session.is_blocked());
        assert_eq!(session.repository().len(), 2);
    }
}
