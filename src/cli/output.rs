use std::io::{IsTerminal, Write};

use crossterm::style::{Color, Stylize, style};
use crossterm::{cursor, execute, terminal};
use serde::Serialize;

use crate::io::store::TaskTree;
use crate::model::document::{Document, Row};
use crate::model::item::{ItemId, Status};

// ---------------------------------------------------------------------------
// Styling
// ---------------------------------------------------------------------------

/// What a piece of terminal text represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Tag,
    Todo,
    Done,
    Ordinal,
    Changed,
    Success,
    Error,
}

/// Apply `kind`'s terminal style to `text`, or return it unchanged when
/// color is off.
pub fn paint(text: &str, kind: Style, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let styled = style(text);
    match kind {
        Style::Tag => styled.with(Color::Red),
        Style::Todo => styled.with(Color::Reset),
        Style::Done => styled.with(Color::Grey),
        Style::Ordinal => styled.with(Color::Cyan),
        Style::Changed | Style::Success => styled.with(Color::Green),
        Style::Error => styled.with(Color::Red),
    }
    .to_string()
}

/// Clear the screen before redrawing, but only on a real terminal.
pub fn clear_screen() {
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = execute!(
            stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        );
        let _ = stdout.flush();
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Which part of the tree to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<'a> {
    All,
    Tag(&'a str),
    /// An item and everything below it
    Subtree(ItemId),
}

/// Render one item line: `<indent><marker> <text> [<ordinal>]`,
/// with ` ✔` after items that just changed.
pub fn render_row(row: &Row, changed: bool, color: bool) -> String {
    let (marker, text) = match row.status {
        Status::Todo => (
            paint(row.status.marker(), Style::Todo, color),
            paint(&row.text, Style::Todo, color),
        ),
        Status::Done => (
            paint(row.status.marker(), Style::Done, color),
            paint(&row.text, Style::Done, color),
        ),
    };
    let ordinal = paint(&format!("[{}]", row.ordinal), Style::Ordinal, color);
    let indicator = if changed {
        paint(" ✔", Style::Changed, color)
    } else {
        String::new()
    };
    format!(
        "{}{} {} {}{}",
        "  ".repeat(row.depth),
        marker,
        text,
        ordinal,
        indicator
    )
}

/// Render the selected part of the tree. Each tag heading is followed by its
/// items and a blank line. Rows whose signature is in `highlight` get a mark.
pub fn render_tree(tree: &TaskTree, filter: Filter<'_>, highlight: &[String], color: bool) -> String {
    let rows = select_rows(tree.rows(), filter);
    let mut out = String::new();
    let mut current_tag: Option<&str> = None;

    for row in &rows {
        if current_tag != Some(row.tag.as_str()) {
            if current_tag.is_some() {
                out.push('\n');
            }
            out.push_str(&paint(&format!("# {}", row.tag), Style::Tag, color));
            out.push('\n');
            current_tag = Some(row.tag.as_str());
        }
        let changed = !highlight.is_empty() && highlight.contains(&tree.signature(row.id));
        out.push_str(&render_row(row, changed, color));
        out.push('\n');
    }

    if current_tag.is_some() {
        out.push('\n');
    }
    out
}

fn select_rows(rows: Vec<Row>, filter: Filter<'_>) -> Vec<Row> {
    match filter {
        Filter::All => rows,
        Filter::Tag(tag) => rows.into_iter().filter(|r| r.tag == tag).collect(),
        Filter::Subtree(id) => {
            let Some(start) = rows.iter().position(|r| r.id == id) else {
                return Vec::new();
            };
            let depth = rows[start].depth;
            let end = rows[start + 1..]
                .iter()
                .position(|r| r.depth <= depth)
                .map_or(rows.len(), |offset| start + 1 + offset);
            rows[start..end].to_vec()
        }
    }
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub ordinal: usize,
    pub status: Status,
    pub text: String,
    pub depth: usize,
    pub signature: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct TagJson {
    pub tag: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub file: String,
    pub tags: Vec<TagJson>,
    /// Signatures of items the command just changed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn item_to_json(doc: &Document, id: ItemId, depth: usize) -> ItemJson {
    let item = doc.item(id);
    ItemJson {
        ordinal: item.ordinal,
        status: item.status,
        text: item.text.clone(),
        depth,
        signature: doc.signature(id),
        children: item
            .children
            .iter()
            .map(|&child| item_to_json(doc, child, depth + 1))
            .collect(),
    }
}

pub fn tree_to_json(tree: &TaskTree, changed: &[String]) -> TreeJson {
    let doc = tree.document();
    TreeJson {
        file: tree.path().display().to_string(),
        tags: doc
            .tags()
            .map(|(tag, roots)| TagJson {
                tag: tag.to_string(),
                items: roots.iter().map(|&id| item_to_json(doc, id, 0)).collect(),
            })
            .collect(),
        changed: changed.to_vec(),
    }
}
