use crate::model::document::Document;
use crate::model::item::Status;

/// Reorder every item list so todo items come before done items, at every
/// depth. The sort is stable: items with the same status keep their order.
///
/// Returns the number of lists whose order changed.
pub fn cleanup(doc: &mut Document) -> usize {
    let mut reordered = 0;
    doc.for_each_list(|arena, list| {
        let before = list.clone();
        list.sort_by_key(|&id| arena[id].status.rank());
        if *list != before {
            reordered += 1;
        }
    });
    reordered
}

/// Remove every done item at every depth. A done item's subtree goes with it,
/// whatever the children's own status.
///
/// Returns the number of items removed, subtrees included.
pub fn purge(doc: &mut Document) -> usize {
    let before = doc.len();
    doc.for_each_list(|arena, list| list.retain(|&id| arena[id].status == Status::Todo));
    before - doc.len()
}
