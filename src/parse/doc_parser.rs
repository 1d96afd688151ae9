use crate::model::document::Document;
use crate::model::item::{Item, ItemId, Status};

/// Prefix of a tag heading line
pub const TAG_PREFIX: &str = "# ";

/// Spaces per nesting level
pub const INDENT_SIZE: usize = 2;

/// Parse a task file from its source text.
///
/// Returns the document (ordinals assigned) and the non-blank lines that
/// could not be placed: anything before the first tag heading, and lines
/// inside a tag that are not checkbox items.
///
/// Indentation deeper than one level past the previous item is clamped to
/// become a child of the most recent item.
pub fn parse_document(source: &str) -> (Document, Vec<String>) {
    let mut doc = Document::new();
    let mut dropped = Vec::new();
    let mut current_tag: Option<String> = None;
    // stack[n] = most recent item seen at depth n
    let mut stack: Vec<ItemId> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix(TAG_PREFIX) {
            doc.insert_tag(name);
            current_tag = Some(name.to_string());
            stack.clear();
            continue;
        }

        let Some(tag) = current_tag.as_deref() else {
            dropped.push(line.to_string());
            continue;
        };

        let indent = count_indent(line);
        let Some((status, text)) = parse_item_line(&line[indent..]) else {
            dropped.push(line.to_string());
            continue;
        };

        let level = (indent / INDENT_SIZE).min(stack.len());
        stack.truncate(level);
        let item = Item::new(status, text);
        let id = match level.checked_sub(1) {
            Some(parent_level) => doc.push_child(stack[parent_level], item),
            None => doc.push_root(tag, item),
        };
        stack.push(id);
    }

    doc.renumber();
    (doc, dropped)
}

/// Parse `- [ ] text` / `- [x] text` with the indent already removed.
fn parse_item_line(content: &str) -> Option<(Status, &str)> {
    let (status, rest) = if let Some(rest) = content.strip_prefix(Status::Todo.marker()) {
        (Status::Todo, rest)
    } else if let Some(rest) = content
        .strip_prefix(Status::Done.marker())
        .or_else(|| content.strip_prefix("- [X]"))
    {
        (Status::Done, rest)
    } else {
        return None;
    };

    match rest.strip_prefix(' ') {
        Some(text) => Some((status, text)),
        None if rest.is_empty() => Some((status, "")),
        None => None,
    }
}

/// Count leading spaces
fn count_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(doc: &Document) -> Vec<String> {
        doc.rows()
            .iter()
            .map(|r| format!("{}|{}{} {}", r.tag, "  ".repeat(r.depth), r.status, r.text))
            .collect()
    }

    #[test]
    fn test_parse_nested_items() {
        let (doc, dropped) = parse_document("# Work\n- [ ] A\n  - [x] B\n- [x] C\n");
        assert!(dropped.is_empty());
        let roots = doc.roots("Work").unwrap();
        assert_eq!(roots.len(), 2);

        let a = doc.item(roots[0]);
        assert_eq!(a.text, "A");
        assert_eq!(a.status, Status::Todo);
        assert_eq!(a.children.len(), 1);

        let b = doc.item(a.children[0]);
        assert_eq!(b.text, "B");
        assert_eq!(b.status, Status::Done);
        assert_eq!(b.parent, Some(roots[0]));

        let c = doc.item(roots[1]);
        assert_eq!(c.text, "C");
        assert_eq!(c.status, Status::Done);
        assert!(c.children.is_empty());
    }

    #[test]
    fn test_parse_assigns_ordinals() {
        let (doc, _) = parse_document("# Work\n- [ ] A\n  - [x] B\n# Home\n- [x] C\n");
        let ordinals: Vec<(String, usize)> =
            doc.rows().into_iter().map(|r| (r.text, r.ordinal)).collect();
        assert_eq!(
            ordinals,
            vec![("A".into(), 1), ("B".into(), 2), ("C".into(), 3)]
        );
    }

    #[test]
    fn test_blank_lines_ignored() {
        let (doc, dropped) = parse_document("\n# Work\n\n- [ ] A\n\n  - [ ] B\n\n");
        assert!(dropped.is_empty());
        assert_eq!(outline(&doc), vec!["Work|todo A", "Work|  todo B"]);
    }

    #[test]
    fn test_lines_before_first_tag_dropped() {
        let (doc, dropped) = parse_document("stray\n- [ ] orphan\n# Work\n- [ ] A\n");
        assert_eq!(dropped, vec!["stray", "- [ ] orphan"]);
        assert_eq!(outline(&doc), vec!["Work|todo A"]);
        assert!(!doc.has_tag("Untagged"));
    }

    #[test]
    fn test_non_item_line_inside_tag_dropped() {
        let (doc, dropped) = parse_document("# Work\n- [ ] A\nsome prose\n- [ ] B\n");
        assert_eq!(dropped, vec!["some prose"]);
        assert_eq!(outline(&doc), vec!["Work|todo A", "Work|todo B"]);
    }

    #[test]
    fn test_indent_jump_clamped() {
        let (doc, _) = parse_document("# Work\n- [ ] A\n      - [ ] deep\n  - [ ] B\n");
        assert_eq!(
            outline(&doc),
            vec!["Work|todo A", "Work|  todo deep", "Work|  todo B"]
        );
    }

    #[test]
    fn test_indented_first_item_becomes_root() {
        let (doc, _) = parse_document("# Work\n    - [ ] A\n");
        assert_eq!(outline(&doc), vec!["Work|todo A"]);
    }

    #[test]
    fn test_odd_indent_rounds_down() {
        let (doc, _) = parse_document("# Work\n- [ ] A\n   - [ ] B\n - [ ] C\n");
        assert_eq!(
            outline(&doc),
            vec!["Work|todo A", "Work|  todo B", "Work|todo C"]
        );
    }

    #[test]
    fn test_stack_resets_per_tag() {
        let (doc, _) = parse_document("# One\n- [ ] A\n# Two\n  - [ ] B\n");
        assert_eq!(outline(&doc), vec!["One|todo A", "Two|todo B"]);
        let b = doc.roots("Two").unwrap()[0];
        assert_eq!(doc.item(b).parent, None);
    }

    #[test]
    fn test_uppercase_done_marker() {
        let (doc, _) = parse_document("# Work\n- [X] shouted\n");
        assert_eq!(outline(&doc), vec!["Work|done shouted"]);
    }

    #[test]
    fn test_empty_tag_kept_until_save() {
        let (doc, _) = parse_document("# Empty\n# Work\n- [ ] A\n");
        let tags: Vec<&str> = doc.tags().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["Empty", "Work"]);
    }

    #[test]
    fn test_repeated_tag_appends() {
        let (doc, _) = parse_document("# Work\n- [ ] A\n# Home\n- [ ] B\n# Work\n- [ ] C\n");
        let tags: Vec<&str> = doc.tags().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["Work", "Home"]);
        assert_eq!(doc.roots("Work").unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let (doc, _) = parse_document("# Work  \n- [ ] A   \n");
        assert_eq!(outline(&doc), vec!["Work|todo A"]);
    }

    #[test]
    fn test_marker_without_space_rejected() {
        let (doc, dropped) = parse_document("# Work\n- [ ]A\n- [ ]\n");
        assert_eq!(dropped, vec!["- [ ]A"]);
        assert_eq!(outline(&doc), vec!["Work|todo "]);
    }
}
