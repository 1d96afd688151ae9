//! Plain-text todo tracking.
//!
//! A task file is a small markdown subset: `# Tag` headings, each followed
//! by `- [ ]` / `- [x]` checkbox items nested two spaces per level.
//! [`io::TaskTree`] loads such a file, applies one change, and writes it back.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
