pub mod config_io;
pub mod recovery;
pub mod store;

pub use store::{StoreError, TaskTree, backup, restore};
