use crate::model::document::Document;
use crate::model::item::{Item, ItemId, MIN_TEXT_LEN, Status};

/// Tag used when an item is added with neither a tag nor a parent
pub const DEFAULT_TAG: &str = "Untagged";

/// Error type for item operations
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("text must be {min} or more characters")]
    TextTooShort { min: usize, len: usize },
    #[error("text must fit on one line")]
    MultiLineText,
    #[error("invalid tag name {0:?}")]
    InvalidTag(String),
    #[error("item with id {0} not found")]
    NotFound(usize),
}

fn is_multi_line(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// Trim `text` and reject it if it is too short to be a real task.
/// Short texts are usually mistyped flags.
pub fn validate_text(text: &str) -> Result<String, ItemError> {
    let trimmed = text.trim();
    if is_multi_line(trimmed) {
        return Err(ItemError::MultiLineText);
    }
    let len = trimmed.chars().count();
    if len < MIN_TEXT_LEN {
        return Err(ItemError::TextTooShort {
            min: MIN_TEXT_LEN,
            len,
        });
    }
    Ok(trimmed.to_string())
}

/// A tag becomes a `# ` heading line, so it must be non-blank and single-line.
pub fn validate_tag(tag: &str) -> Result<&str, ItemError> {
    if tag.trim().is_empty() || is_multi_line(tag) {
        return Err(ItemError::InvalidTag(tag.to_string()));
    }
    Ok(tag)
}

/// Add a new todo item.
///
/// With `parent_id`, the item becomes the last child of that item and every
/// done ancestor on the way up is reopened; `tag` is ignored. Otherwise it is
/// appended to `tag` (default tag if `None`), creating the tag if needed.
///
/// Returns the reopened ancestors followed by the new item.
/// Nothing is mutated on error.
pub fn add_todo(
    doc: &mut Document,
    text: &str,
    tag: Option<&str>,
    parent_id: Option<usize>,
) -> Result<Vec<ItemId>, ItemError> {
    let text = validate_text(text)?;
    let item = Item::new(Status::Todo, text);

    match parent_id {
        Some(ordinal) => {
            let parent = doc
                .find_by_ordinal(ordinal)
                .ok_or(ItemError::NotFound(ordinal))?;
            let id = doc.push_child(parent, item);
            let mut changed = mark_ancestors_todo(doc, parent);
            changed.push(id);
            Ok(changed)
        }
        None => {
            let tag = validate_tag(tag.unwrap_or(DEFAULT_TAG))?;
            let id = doc.push_root(tag, item);
            Ok(vec![id])
        }
    }
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Flip an item between todo and done, cascading:
/// - now done: every descendant becomes done
/// - now todo: every ancestor becomes todo
///
/// Returns the toggled item followed by every item the cascade changed.
pub fn toggle_status(doc: &mut Document, id: ItemId) -> Vec<ItemId> {
    let item = doc.item_mut(id);
    item.status = item.status.toggled();
    let new_status = item.status;
    let parent = item.parent;

    let mut affected = vec![id];
    match (new_status, parent) {
        (Status::Done, _) => affected.extend(mark_descendants_done(doc, id)),
        (Status::Todo, Some(parent)) => affected.extend(mark_ancestors_todo(doc, parent)),
        (Status::Todo, None) => {}
    }
    affected
}

/// Set every descendant of `id` to done. Returns those that were not done yet,
/// in depth-first order.
pub fn mark_descendants_done(doc: &mut Document, id: ItemId) -> Vec<ItemId> {
    let mut changed = Vec::new();
    let children = doc.item(id).children.clone();
    for child in children {
        let item = doc.item_mut(child);
        if item.status != Status::Done {
            item.status = Status::Done;
            changed.push(child);
        }
        changed.extend(mark_descendants_done(doc, child));
    }
    changed
}

/// Set `start` and all of its ancestors to todo. Returns those that were done,
/// nearest first.
pub fn mark_ancestors_todo(doc: &mut Document, start: ItemId) -> Vec<ItemId> {
    let mut changed = Vec::new();
    let mut current = Some(start);
    while let Some(id) = current {
        let item = doc.item_mut(id);
        if item.status != Status::Todo {
            item.status = Status::Todo;
            changed.push(id);
        }
        current = item.parent;
    }
    changed
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Remove an item and its whole subtree. Returns false (and changes nothing)
/// if the item is not in the list its parent link points at.
pub fn delete_item(doc: &mut Document, id: ItemId) -> bool {
    doc.detach(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    /// 1 A (todo)
    /// 2   B (done)
    /// 3     C (done)
    /// 4   D (todo)
    /// 5     E (todo)
    /// 6 F (done)
    fn sample() -> Document {
        parse_document(
            "\
# Work
- [ ] A
  - [x] B
    - [x] C
  - [ ] D
    - [ ] E
- [x] F
",
        )
        .0
    }

    fn id(doc: &Document, ordinal: usize) -> ItemId {
        doc.find_by_ordinal(ordinal).unwrap()
    }

    fn statuses(doc: &Document) -> Vec<Status> {
        doc.rows().into_iter().map(|r| r.status).collect()
    }

    fn texts(doc: &Document, ids: &[ItemId]) -> Vec<String> {
        ids.iter().map(|&i| doc.item(i).text.clone()).collect()
    }

    use Status::{Done, Todo};

    // --- add ---

    #[test]
    fn test_add_defaults_to_untagged() {
        let mut doc = Document::new();
        let changed = add_todo(&mut doc, "Call mom", None, None).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(doc.roots(DEFAULT_TAG).unwrap(), &changed[..]);
        assert_eq!(doc.item(changed[0]).status, Todo);
    }

    #[test]
    fn test_add_to_new_and_existing_tag() {
        let mut doc = sample();
        add_todo(&mut doc, "Buy milk", Some("Groceries"), None).unwrap();
        add_todo(&mut doc, "Ship it", Some("Work"), None).unwrap();
        let tags: Vec<&str> = doc.tags().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["Work", "Groceries"]);
        let work = doc.roots("Work").unwrap();
        assert_eq!(doc.item(*work.last().unwrap()).text, "Ship it");
    }

    #[test]
    fn test_add_trims_text() {
        let mut doc = Document::new();
        let changed = add_todo(&mut doc, "  Water plants  ", None, None).unwrap();
        assert_eq!(doc.item(changed[0]).text, "Water plants");
    }

    #[test]
    fn test_add_rejects_short_text() {
        let mut doc = sample();
        let before = doc.clone();
        let err = add_todo(&mut doc, "  ab ", Some("Work"), None).unwrap_err();
        assert!(matches!(err, ItemError::TextTooShort { min: 3, len: 2 }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_rejects_multi_line_text() {
        let mut doc = sample();
        let before = doc.clone();
        for text in ["Buy milk\n# Hijacked\n- [x] ghost", "Buy\rmilk"] {
            let err = add_todo(&mut doc, text, Some("Home"), None).unwrap_err();
            assert!(matches!(err, ItemError::MultiLineText));
        }
        assert_eq!(doc, before);
        assert!(!doc.has_tag("Home"));
    }

    #[test]
    fn test_add_trailing_newline_is_trimmed() {
        let mut doc = sample();
        let ids = add_todo(&mut doc, "Buy milk\n", None, None).unwrap();
        assert_eq!(texts(&doc, &ids), vec!["Buy milk"]);
    }

    #[test]
    fn test_add_rejects_bad_tag() {
        let mut doc = sample();
        for tag in ["", "   ", "Home\n- [x] ghost"] {
            let err = add_todo(&mut doc, "Buy milk", Some(tag), None).unwrap_err();
            assert!(matches!(err, ItemError::InvalidTag(_)));
        }
        assert_eq!(doc.tags().count(), 1);
    }

    #[test]
    fn test_add_counts_characters_not_bytes() {
        let mut doc = Document::new();
        assert!(add_todo(&mut doc, "été", None, None).is_ok());
        assert!(add_todo(&mut doc, "éé", None, None).is_err());
    }

    #[test]
    fn test_add_child_reopens_done_ancestors() {
        let mut doc = sample();
        let c = id(&doc, 3);
        let changed = add_todo(&mut doc, "Sub task", None, Some(3)).unwrap();

        // C and B were done; A already todo
        assert_eq!(texts(&doc, &changed), vec!["C", "B", "Sub task"]);
        let new_item = *changed.last().unwrap();
        assert_eq!(doc.item(new_item).parent, Some(c));
        assert_eq!(doc.item(c).children.last(), Some(&new_item));
        assert_eq!(doc.item(new_item).status, Todo);
        assert_eq!(doc.item(id(&doc, 2)).status, Todo);
    }

    #[test]
    fn test_add_child_under_todo_parent_changes_nothing_else() {
        let mut doc = sample();
        let changed = add_todo(&mut doc, "Another", None, Some(4)).unwrap();
        assert_eq!(texts(&doc, &changed), vec!["Another"]);
    }

    #[test]
    fn test_add_child_ignores_tag() {
        let mut doc = sample();
        add_todo(&mut doc, "Nested", Some("Elsewhere"), Some(1)).unwrap();
        assert!(!doc.has_tag("Elsewhere"));
    }

    #[test]
    fn test_add_child_missing_parent() {
        let mut doc = sample();
        let before = doc.clone();
        let err = add_todo(&mut doc, "Orphan", None, Some(42)).unwrap_err();
        assert!(matches!(err, ItemError::NotFound(42)));
        assert_eq!(doc, before);
    }

    // --- toggle ---

    #[test]
    fn test_toggle_leaf_done_leaves_siblings() {
        let mut doc = sample();
        let e = id(&doc, 5);
        let affected = toggle_status(&mut doc, e);
        assert_eq!(affected, vec![e]);
        assert_eq!(statuses(&doc), vec![Todo, Done, Done, Todo, Done, Done]);
    }

    #[test]
    fn test_toggle_mid_tree_done_cascades_down_only() {
        let mut doc = sample();
        let a = id(&doc, 1);
        let affected = toggle_status(&mut doc, a);
        // B and C already done, F is not a descendant
        assert_eq!(texts(&doc, &affected), vec!["A", "D", "E"]);
        assert_eq!(statuses(&doc), vec![Done; 6]);
    }

    #[test]
    fn test_toggle_done_with_done_descendants_reports_only_itself() {
        let mut doc = sample();
        let b = id(&doc, 2);
        toggle_status(&mut doc, b); // B -> todo (reopens A? already todo)
        let affected = toggle_status(&mut doc, b); // B -> done, C already done
        assert_eq!(affected, vec![b]);
    }

    #[test]
    fn test_toggle_todo_cascades_up_only() {
        let mut doc = parse_document("# W\n- [x] A\n  - [x] B\n    - [x] C\n      - [x] D\n").0;
        let c = id(&doc, 3);
        let affected = toggle_status(&mut doc, c);
        assert_eq!(texts(&doc, &affected), vec!["C", "B", "A"]);
        // D stays done
        assert_eq!(statuses(&doc), vec![Todo, Todo, Todo, Done]);
    }

    #[test]
    fn test_toggle_root_to_todo() {
        let mut doc = sample();
        let f = id(&doc, 6);
        assert_eq!(toggle_status(&mut doc, f), vec![f]);
        assert_eq!(doc.item(f).status, Todo);
    }

    // --- delete ---

    #[test]
    fn test_delete_child_takes_subtree() {
        let mut doc = sample();
        let b = id(&doc, 2);
        assert!(delete_item(&mut doc, b));
        doc.renumber();
        let remaining: Vec<String> = doc.rows().into_iter().map(|r| r.text).collect();
        assert_eq!(remaining, vec!["A", "D", "E", "F"]);
    }

    #[test]
    fn test_delete_root() {
        let mut doc = sample();
        let f = id(&doc, 6);
        assert!(delete_item(&mut doc, f));
        assert_eq!(doc.roots("Work").unwrap().len(), 1);
    }
}
