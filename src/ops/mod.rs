pub mod clean;
pub mod item_ops;

pub use clean::{cleanup, purge};
pub use item_ops::{DEFAULT_TAG, ItemError};
