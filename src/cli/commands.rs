use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "taf",
    about = "Plain-text todo tracker: tags are headings, tasks are nested checkboxes",
    version,
    after_help = "\
Message:
    text @tag        Records todo for @tag
    text @ID         Records todo as child of parent ID
    @tag             Displays todos for @tag
    @ID              Displays the item ID and its children"
)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
pub struct Cli {
    /// Path to the taf markdown file (default: ~/taf.md)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<String>,

    /// Toggle status for line id
    #[arg(short = 't', long = "toggle", value_name = "@LINE_ID", group = "mode")]
    pub toggle: Option<String>,

    /// Delete the specified line id (with its children)
    #[arg(short = 'D', long = "delete", value_name = "@LINE_ID", group = "mode")]
    pub delete: Option<String>,

    /// Open the file in $EDITOR for manual edits
    #[arg(short = 'e', long = "edit", group = "mode")]
    pub edit: bool,

    /// Undo the last change
    #[arg(short = 'u', long = "undo", group = "mode")]
    pub undo: bool,

    /// Sort items (todo items before done)
    #[arg(short = 'c', long = "cleanup", group = "mode")]
    pub cleanup: bool,

    /// Delete all done items
    #[arg(short = 'P', long = "purge", group = "mode")]
    pub purge: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Todo text with optional trailing @tag or @ID
    #[arg(value_name = "MESSAGE", num_args = 0..)]
    pub message: Vec<String>,
}

/// The single action a command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Toggle(String),
    Delete(String),
    Edit,
    Undo,
    Cleanup,
    Purge,
    /// Show, or add when the message carries text
    Default(String),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if let Some(id) = &self.toggle {
            Mode::Toggle(id.clone())
        } else if let Some(id) = &self.delete {
            Mode::Delete(id.clone())
        } else if self.edit {
            Mode::Edit
        } else if self.undo {
            Mode::Undo
        } else if self.cleanup {
            Mode::Cleanup
        } else if self.purge {
            Mode::Purge
        } else {
            Mode::Default(self.message.join(" "))
        }
    }
}
