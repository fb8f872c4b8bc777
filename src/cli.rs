use crate::models::SnippetId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author = "Gokul <@bahdotsh>",
    version = env!("CARGO_PKG_VERSION"),
    about = "snipjar - A local snippet manager",
    long_about = "snipjar keeps short text snippets in a local library you can edit, export and import."
)]
pub struct Snipjar {
    #[clap(
        long = "data-dir",
        short = 'D',
        global = true,
        help = "Directory holding the snippet library"
    )]
    pub data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub commands: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all snippets
    List,
    /// Print one snippet
    Show {
        #[clap(long, short, help = "Id of the snippet")]
        id: SnippetId,
    },
    /// Add a new snippet
    Add {
        #[clap(long, short, help = "Title of the snippet")]
        title: Option<String>,

        #[clap(long, short, help = "The snippet text")]
        content: Option<String>,
    },
    /// Update an existing snippet by id
    Update {
        #[clap(long, short, help = "Id of the snippet to update")]
        id: SnippetId,

        #[clap(long, short, help = "New title")]
        title: Option<String>,

        #[clap(long, short, help = "New snippet text")]
        content: Option<String>,
    },
    /// Delete a snippet by id
    Delete {
        #[clap(long, short, help = "Id of the snippet to delete")]
        id: SnippetId,

        #[clap(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },
    /// Export the library to a JSON file
    Export {
        #[clap(
            long,
            short,
            help = "Target file, or directory to write snippets.json into"
        )]
        output: Option<PathBuf>,
    },
    /// Replace the library with the contents of a JSON file
    Import {
        #[clap(long, short, help = "File to import")]
        file: PathBuf,

        #[clap(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },
    /// Copy a snippet's content to the clipboard
    Copy {
        #[clap(long, short, help = "Id of the snippet to copy")]
        id: SnippetId,
    },
}
