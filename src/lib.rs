//! linexml: a small line-oriented parser for configuration-style XML
//!
//! This crate provides functionality to:
//! - Parse a constrained XML subset into an owned [`Node`] tree
//! - Look up attributes and children without ever failing on absence
//! - Read documents from disk with a single call
//!
//! Supported input is one element per line (or several compact ones on a
//! line), self-closing tags, inline text, and opening tags whose attribute
//! list wraps onto a second line. Namespaces, comments, CDATA and entity
//! decoding are not supported.
//!
//! # Examples
//! ```
//! use linexml::{from_str, Result};
//!
//! fn example() -> Result<()> {
//!     let root = from_str("<server host=\"localhost\">\n  <port>8080</port>\n</server>")?;
//!     assert_eq!(root.attribute("host"), Some("localhost"));
//!     assert_eq!(root.child("port").and_then(|p| p.data()), Some("8080"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::{debug, info, instrument};

pub mod error;
pub mod node;
pub mod scanner;
pub mod utils;

// Re-exports
pub use error::{Error, ErrorKind, Pos, Result};
pub use node::Node;
pub use scanner::{Config, Cursor, Parser, Scan};

/// Read and parse the document at `path`
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_document(path: impl AsRef<Path>) -> Result<Node> {
    load_document_with_config(path, Config::default())
}

/// Read and parse the document at `path` with custom limits
pub fn load_document_with_config(path: impl AsRef<Path>, config: Config) -> Result<Node> {
    let path = path.as_ref();
    debug!("Starting to parse file: {}", path.display());

    let content = utils::read_file(path)?;
    info!("File read successfully, parsing");

    let root = from_str_with_config(&content, config)?;
    debug!("Parsing completed");
    Ok(root)
}

/// Parse a document from a string
pub fn from_str(s: &str) -> Result<Node> {
    Parser::new(s).parse()
}

/// Parse a document from bytes, which must be UTF-8
pub fn from_bytes(bytes: &[u8]) -> Result<Node> {
    let s = std::str::from_utf8(bytes).map_err(|e| {
        Error::with_message(
            ErrorKind::InvalidUtf8,
            Pos::new(e.valid_up_to(), 0, 0),
            format!("invalid utf-8 at byte {}", e.valid_up_to()),
        )
    })?;
    from_str(s)
}

/// Parse with custom configuration
pub fn from_str_with_config(s: &str, config: Config) -> Result<Node> {
    Parser::with_config(s, config).parse()
}
