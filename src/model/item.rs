use serde::{Deserialize, Serialize};

/// Shortest accepted item text, counted in characters after trimming
pub const MIN_TEXT_LEN: usize = 3;

/// Checkbox state of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Done,
}

impl Status {
    /// The markdown marker written before the item text
    pub fn marker(self) -> &'static str {
        match self {
            Status::Todo => "- [ ]",
            Status::Done => "- [x]",
        }
    }

    pub fn toggled(self) -> Status {
        match self {
            Status::Todo => Status::Done,
            Status::Done => Status::Todo,
        }
    }

    /// Sort key used by cleanup: todo before done
    pub fn rank(self) -> u8 {
        match self {
            Status::Todo => 0,
            Status::Done => 1,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Todo => write!(f, "todo"),
            Status::Done => write!(f, "done"),
        }
    }
}

/// Handle to an item slot in a [`Document`](super::document::Document) arena.
///
/// Only meaningful for the document that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

/// A single task node
#[derive(Debug, Clone)]
pub struct Item {
    pub status: Status,
    pub text: String,
    /// Depth-first position, 1-based. Recomputed after every load and mutation.
    pub ordinal: usize,
    pub parent: Option<ItemId>,
    /// Children in display order
    pub children: Vec<ItemId>,
}

impl Item {
    /// Create a detached item with no ordinal assigned yet
    pub fn new(status: Status, text: impl Into<String>) -> Self {
        Item {
            status,
            text: text.into(),
            ordinal: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    pub fn is_todo(&self) -> bool {
        self.status == Status::Todo
    }
}
