use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::item::{Item, ItemId, Status};

/// Backing storage for every item a document has issued an id for.
///
/// Slots are never reused or removed. Detached items stay in the arena but
/// are unreachable from any tag, and disappear on the next save/load cycle.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    slots: Vec<Item>,
}

impl Arena {
    fn alloc(&mut self, item: Item) -> ItemId {
        self.slots.push(item);
        ItemId(self.slots.len() - 1)
    }
}

impl Index<ItemId> for Arena {
    type Output = Item;

    fn index(&self, id: ItemId) -> &Item {
        &self.slots[id.0]
    }
}

impl IndexMut<ItemId> for Arena {
    fn index_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.slots[id.0]
    }
}

/// One line of the read-only export, in depth-first display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub tag: String,
    #[serde(skip)]
    pub id: ItemId,
    pub status: Status,
    pub text: String,
    pub ordinal: usize,
    /// Nesting depth (0 = root of its tag)
    pub depth: usize,
}

/// The whole task file in memory: tags in file order, each with its root items.
#[derive(Debug, Clone, Default)]
pub struct Document {
    arena: Arena,
    tags: IndexMap<String, Vec<ItemId>>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.arena[id]
    }

    pub fn item_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.arena[id]
    }

    /// Declare a tag without items. Existing tags keep their position.
    pub fn insert_tag(&mut self, tag: &str) {
        if !self.tags.contains_key(tag) {
            self.tags.insert(tag.to_string(), Vec::new());
        }
    }

    /// Append a root item to `tag`, creating the tag at the end if missing.
    pub fn push_root(&mut self, tag: &str, mut item: Item) -> ItemId {
        item.parent = None;
        let id = self.arena.alloc(item);
        self.insert_tag(tag);
        if let Some(roots) = self.tags.get_mut(tag) {
            roots.push(id);
        }
        id
    }

    /// Append `item` as the last child of `parent`.
    pub fn push_child(&mut self, parent: ItemId, mut item: Item) -> ItemId {
        item.parent = Some(parent);
        let id = self.arena.alloc(item);
        self.arena[parent].children.push(id);
        id
    }

    /// Tags in display order with their root items
    pub fn tags(&self) -> impl Iterator<Item = (&str, &[ItemId])> {
        self.tags.iter().map(|(tag, roots)| (tag.as_str(), roots.as_slice()))
    }

    pub fn roots(&self, tag: &str) -> Option<&[ItemId]> {
        self.tags.get(tag).map(|roots| roots.as_slice())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Run `f` over every ordered item list: each tag's roots, then every
    /// item's children. Lists of detached items are visited too, which is
    /// harmless since nothing reaches them.
    pub fn for_each_list(&mut self, mut f: impl FnMut(&Arena, &mut Vec<ItemId>)) {
        for roots in self.tags.values_mut() {
            f(&self.arena, roots);
        }
        for idx in 0..self.arena.slots.len() {
            let mut children = std::mem::take(&mut self.arena.slots[idx].children);
            f(&self.arena, &mut children);
            self.arena.slots[idx].children = children;
        }
    }

    /// Remove `id` from whichever list holds it. Its subtree goes with it.
    /// Returns false if the item was not found where its parent link says it lives.
    pub fn detach(&mut self, id: ItemId) -> bool {
        let list = match self.arena[id].parent {
            Some(parent) => &mut self.arena[parent].children,
            None => match self.tags.values_mut().find(|roots| roots.contains(&id)) {
                Some(roots) => roots,
                None => return false,
            },
        };
        match list.iter().position(|&c| c == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Drop tags whose root list is empty. Returns the removed tag names.
    pub fn prune_empty_tags(&mut self) -> Vec<String> {
        let empty: Vec<String> = self
            .tags
            .iter()
            .filter(|(_, roots)| roots.is_empty())
            .map(|(tag, _)| tag.clone())
            .collect();
        self.tags.retain(|_, roots| !roots.is_empty());
        empty
    }

    /// Every reachable item as `(tag, id, depth)`, depth-first:
    /// tag order, then root order, then child order.
    pub fn preorder(&self) -> Vec<(&str, ItemId, usize)> {
        let mut out = Vec::new();
        for (tag, roots) in &self.tags {
            for &root in roots {
                self.preorder_from(tag, root, 0, &mut out);
            }
        }
        out
    }

    fn preorder_from<'a>(
        &self,
        tag: &'a str,
        id: ItemId,
        depth: usize,
        out: &mut Vec<(&'a str, ItemId, usize)>,
    ) {
        out.push((tag, id, depth));
        for &child in &self.arena[id].children {
            self.preorder_from(tag, child, depth + 1, out);
        }
    }

    /// Number of reachable items
    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    /// Reassign ordinals 1..=n in depth-first order.
    pub fn renumber(&mut self) {
        let order: Vec<ItemId> = self.preorder().into_iter().map(|(_, id, _)| id).collect();
        for (n, id) in order.into_iter().enumerate() {
            self.arena[id].ordinal = n + 1;
        }
    }

    pub fn find_by_ordinal(&self, ordinal: usize) -> Option<ItemId> {
        self.preorder()
            .into_iter()
            .map(|(_, id, _)| id)
            .find(|&id| self.arena[id].ordinal == ordinal)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut current = self.arena[id].parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.arena[parent].parent;
        }
        out
    }

    /// Content fingerprint of an item: its text plus its parent's text.
    ///
    /// Used to find items again after a reload, when ordinals may have
    /// shifted. Identical text under identically named parents collides.
    pub fn signature(&self, id: ItemId) -> String {
        let item = &self.arena[id];
        let parent_text = item
            .parent
            .map(|p| self.arena[p].text.as_str())
            .unwrap_or("");
        let digest = Sha256::digest(format!("{}|{}", item.text, parent_text).as_bytes());
        hex::encode(digest)
    }

    /// Flat export of every reachable item for display
    pub fn rows(&self) -> Vec<Row> {
        self.preorder()
            .into_iter()
            .map(|(tag, id, depth)| {
                let item = &self.arena[id];
                Row {
                    tag: tag.to_string(),
                    id,
                    status: item.status,
                    text: item.text.clone(),
                    ordinal: item.ordinal,
                    depth,
                }
            })
            .collect()
    }

    fn same_forest(&self, ids: &[ItemId], other: &Document, other_ids: &[ItemId]) -> bool {
        ids.len() == other_ids.len()
            && ids.iter().zip(other_ids).all(|(&a, &b)| {
                let (x, y) = (&self.arena[a], &other.arena[b]);
                x.status == y.status
                    && x.text == y.text
                    && self.same_forest(&x.children, other, &y.children)
            })
    }
}

/// Structural equality: same tags in the same order holding the same trees.
/// Ordinals and detached arena slots are ignored.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.tags.len() == other.tags.len()
            && self
                .tags
                .iter()
                .zip(&other.tags)
                .all(|((a, ra), (b, rb))| a == b && self.same_forest(ra, other, rb))
    }
}

impl Eq for Document {}
