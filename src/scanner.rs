//! Line-oriented scanner that builds a [`Node`](crate::Node) tree
//!
//! Parsing reads one logical line at a time ([`line`]), recognizes the tag
//! that starts it ([`tag`]) and recurses into children until the matching
//! closing tag ([`builder`]). The scan position is an explicit [`Cursor`]
//! value handed from call to call.

pub mod builder;
pub mod config;
pub mod cursor;
pub mod line;
pub mod tag;

pub use builder::{Parser, Scan};
pub use config::{
    Config, DEFAULT_MAX_CONTINUATION_LINES, DEFAULT_MAX_DEPTH, DEFAULT_MAX_SIZE,
};
pub use cursor::Cursor;
pub use line::{Join, LineState, LogicalLine, Scanned};
