use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::commands::{Cli, Mode};
use crate::cli::output::{Filter, Style, clear_screen, paint, render_tree, tree_to_json};
use crate::io::config_io;
use crate::io::store::{self, TaskTree};
use crate::model::config::Config;
use crate::model::item::ItemId;
use crate::ops::item_ops::ItemError;
use crate::parse::{Message, parse_message};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Settings shared by every command of one invocation
struct Context {
    path: PathBuf,
    config: Config,
    json: bool,
    color: bool,
}

impl Context {
    /// Reload the file and redraw the whole tree, marking `changed` rows.
    fn show(&self, filter: Filter<'_>, changed: &[String]) -> CmdResult {
        let tree = TaskTree::load(&self.path)?;
        self.show_loaded(&tree, filter, changed)
    }

    fn show_loaded(&self, tree: &TaskTree, filter: Filter<'_>, changed: &[String]) -> CmdResult {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&tree_to_json(tree, changed))?);
        } else {
            clear_screen();
            print!("{}", render_tree(tree, filter, changed, self.color));
        }
        Ok(())
    }

    fn success(&self, message: &str) {
        if !self.json {
            println!("{}", paint(message, Style::Success, self.color));
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let config = config_io::load_default_config()?;
    let ctx = Context {
        path: config_io::resolve_task_file(cli.file.as_deref(), &config),
        color: config.color && !cli.no_color,
        json: cli.json,
        config,
    };
    tracing::debug!(path = %ctx.path.display(), "task file");

    match cli.mode() {
        Mode::Toggle(arg) => cmd_toggle(&ctx, &arg),
        Mode::Delete(arg) => cmd_delete(&ctx, &arg),
        Mode::Edit => cmd_edit(&ctx),
        Mode::Undo => cmd_undo(&ctx),
        Mode::Cleanup => cmd_cleanup(&ctx),
        Mode::Purge => cmd_purge(&ctx),
        Mode::Default(message) => cmd_default(&ctx, &message),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a `@NUMBER` argument into an ordinal.
fn line_id(arg: &str) -> Result<usize, String> {
    match parse_message(arg) {
        Message {
            text: None,
            parent_id: Some(ordinal),
            ..
        } => Ok(ordinal),
        _ => Err("Invalid line ID format. Use @NUMBER (e.g., @21)".to_string()),
    }
}

fn load_and_find(path: &Path, arg: &str) -> Result<(TaskTree, ItemId), Box<dyn std::error::Error>> {
    let ordinal = line_id(arg)?;
    let tree = TaskTree::load(path)?;
    let id = tree.find_by_id(ordinal).ok_or(ItemError::NotFound(ordinal))?;
    Ok((tree, id))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_toggle(ctx: &Context, arg: &str) -> CmdResult {
    let (mut tree, id) = load_and_find(&ctx.path, arg)?;
    let changed = tree.toggle_status(id)?;
    ctx.show(Filter::All, &changed)
}

fn cmd_delete(ctx: &Context, arg: &str) -> CmdResult {
    let (mut tree, id) = load_and_find(&ctx.path, arg)?;
    tree.delete(id)?;
    ctx.show(Filter::All, &[])
}

fn cmd_edit(ctx: &Context) -> CmdResult {
    store::backup(&ctx.path)?;
    let editor = config_io::editor_command(&ctx.config);
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(config_io::DEFAULT_EDITOR);
    let status = Command::new(program)
        .args(parts)
        .arg(&ctx.path)
        .status()
        .map_err(|e| format!("could not start editor '{}': {}", editor, e))?;
    if !status.success() {
        return Err(format!("editor '{}' exited with {}", editor, status).into());
    }
    ctx.show(Filter::All, &[])?;
    ctx.success("Taf file saved");
    Ok(())
}

fn cmd_undo(ctx: &Context) -> CmdResult {
    store::restore(&ctx.path)?;
    ctx.show(Filter::All, &[])?;
    ctx.success("Undo successful");
    Ok(())
}

fn cmd_cleanup(ctx: &Context) -> CmdResult {
    TaskTree::load(&ctx.path)?.cleanup()?;
    ctx.show(Filter::All, &[])?;
    ctx.success("Cleanup complete");
    Ok(())
}

fn cmd_purge(ctx: &Context) -> CmdResult {
    let removed = TaskTree::load(&ctx.path)?.purge()?;
    ctx.show(Filter::All, &[])?;
    ctx.success(&format!("Purge complete ({} removed)", removed));
    Ok(())
}

/// No flags: show everything, show one tag or item, or add a todo.
fn cmd_default(ctx: &Context, message: &str) -> CmdResult {
    let msg = parse_message(message);
    let tree = TaskTree::load(&ctx.path)?;

    match (msg.text.as_deref(), msg.tag.as_deref(), msg.parent_id) {
        (None, None, None) => ctx.show_loaded(&tree, Filter::All, &[]),
        (None, Some(tag), _) => ctx.show_loaded(&tree, Filter::Tag(tag), &[]),
        (None, None, Some(ordinal)) => {
            let id = tree.find_by_id(ordinal).ok_or(ItemError::NotFound(ordinal))?;
            ctx.show_loaded(&tree, Filter::Subtree(id), &[])
        }
        (Some(text), tag, parent_id) => {
            let mut tree = tree;
            let changed = tree.add_todo(text, tag, parent_id)?;
            ctx.show(Filter::All, &changed)
        }
    }
}
