use crate::cli::{Commands, Snipjar};
use crate::clipboard::SystemClipboard;
use crate::config::get_config_dir;
use crate::error::{Result, SnipjarError};
use crate::gate::Answer;
use crate::models::SnippetId;
use crate::session::{Command, Outcome, Session};
use crate::storage::{FileStore, Store};
use crate::ui::display_snippet_manager;
use std::fs;
use std::io::{self, BufRead, Write};

pub fn handle_command(args: Snipjar) -> Result<()> {
    let dir = args.data_dir.unwrap_or_else(get_config_dir);
    let store = FileStore::open(&dir)?;
    let mut session = Session::open(store, Box::new(SystemClipboard))?;

    match args.commands {
        Some(command) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_subcommand(&mut session, command, &mut out, &mut ask_on_terminal)
        }
        None => display_snippet_manager(&mut session), // Default: open the UI
    }
}

/// Run one non-interactive command. `ask` answers confirmation questions.
pub fn run_subcommand<S: Store, W: Write>(
    session: &mut Session<S>,
    command: Commands,
    out: &mut W,
    ask: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<()> {
    match command {
        Commands::List => {
            let snippets = session.repository().snippets();
            if snippets.is_empty() {
                writeln!(out, "No snippets found. Add one with: snipjar add --title <title>")?;
            }
            for snippet in snippets {
                writeln!(out, "{:>15}  {}", snippet.id, snippet.title)?;
            }
        }
        Commands::Show { id } => {
            let snippet = session
                .repository()
                .find(id)
                .ok_or(SnipjarError::NotFound(id))?;
            writeln!(out, "{}", snippet.title)?;
            writeln!(out, "{}", snippet.content)?;
        }
        Commands::Add { title, content } => {
            let id = match session.dispatch(Command::New)? {
                Outcome::Created(id) => id,
                other => {
                    return Err(SnipjarError::Persistence(format!(
                        "snippet was not created: {:?}",
                        other
                    )))
                }
            };
            edit_and_save(session, title, content)?;
            writeln!(out, "Snippet {} added successfully", id)?;
        }
        Commands::Update { id, title, content } => {
            session.dispatch(Command::Select(id))?;
            edit_and_save(session, title, content)?;
            writeln!(out, "Snippet {} updated successfully", id)?;
        }
        Commands::Delete { id, yes } => {
            let outcome = session.dispatch(Command::Delete(id))?;
            if settle(session, outcome, yes, ask)? == Outcome::Cancelled {
                writeln!(out, "Operation canceled.")?;
            } else {
                writeln!(out, "Snippet {} deleted successfully", id)?;
            }
        }
        Commands::Export { output } => {
            let target = output.unwrap_or_else(|| ".".into());
            if let Outcome::Exported(path) = session.dispatch(Command::Export(target))? {
                writeln!(
                    out,
                    "Exported {} snippets to {}",
                    session.repository().len(),
                    path.display()
                )?;
            }
        }
        Commands::Import { file, yes } => {
            let document = fs::read(&file)?;
            let outcome = session.dispatch(Command::Import(document))?;
            match settle(session, outcome, yes, ask)? {
                Outcome::Imported(count) => writeln!(out, "Imported {} snippets", count)?,
                _ => writeln!(out, "Operation canceled.")?,
            }
        }
        Commands::Copy { id } => {
            copy_snippet(session, id)?;
            writeln!(out, "Copied snippet {} to clipboard", id)?;
        }
    }
    Ok(())
}

fn edit_and_save<S: Store>(
    session: &mut Session<S>,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    if let Some(title) = title {
        session.dispatch(Command::EditTitle(title))?;
    }
    if let Some(content) = content {
        session.dispatch(Command::EditContent(content))?;
    }
    if session.editor().is_dirty() {
        session.dispatch(Command::Save)?;
    }
    Ok(())
}

fn copy_snippet<S: Store>(session: &mut Session<S>, id: SnippetId) -> Result<()> {
    session.dispatch(Command::Select(id))?;
    session.dispatch(Command::CopyContent)?;
    Ok(())
}

/// Answer a pending confirmation, skipping the question when `yes` is set.
fn settle<S: Store>(
    session: &mut Session<S>,
    outcome: Outcome,
    yes: bool,
    ask: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<Outcome> {
    let Outcome::AwaitConfirm(message) = outcome else {
        return Ok(outcome);
    };
    let answer = if yes || ask(&message)? {
        Answer::Proceed
    } else {
        Answer::Cancel
    };
    session.answer(answer)
}

/// Ask a yes/no question on the terminal, defaulting to no.
pub fn ask_on_terminal(message: &str) -> Result<bool> {
    print!("{} [y/N] ", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
