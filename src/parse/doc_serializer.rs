use crate::model::document::Document;
use crate::model::item::ItemId;
use crate::parse::doc_parser::{INDENT_SIZE, TAG_PREFIX};

/// Serialize a document to its markdown representation.
/// Every line, including the last, ends with `\n`.
pub fn serialize_document(doc: &Document) -> String {
    let mut lines = Vec::new();
    for (tag, roots) in doc.tags() {
        lines.push(format!("{}{}", TAG_PREFIX, tag));
        for &root in roots {
            serialize_item(doc, root, 0, &mut lines);
        }
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn serialize_item(doc: &Document, id: ItemId, depth: usize, lines: &mut Vec<String>) {
    let item = doc.item(id);
    let indent = " ".repeat(depth * INDENT_SIZE);
    if item.text.is_empty() {
        lines.push(format!("{}{}", indent, item.status.marker()));
    } else {
        lines.push(format!("{}{} {}", indent, item.status.marker(), item.text));
    }
    for &child in &item.children {
        serialize_item(doc, child, depth + 1, lines);
    }
}
