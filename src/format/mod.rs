//! Outgoing message formatting.
//!
//! Splits long formatted texts into message-size-bounded chunks without
//! leaving dangling Markdown markers at chunk boundaries.

mod splitter;

pub use splitter::{TRAILING_MARKERS, split_message};
