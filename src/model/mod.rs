pub mod config;
pub mod document;
pub mod item;

pub use config::*;
pub use document::*;
pub use item::*;
