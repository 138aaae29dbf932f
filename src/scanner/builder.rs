//! Recursive descent from logical lines to a [`Node`] tree

use tracing::{debug, instrument, trace};

use super::line::{self, LogicalLine, Scanned};
use super::tag::{self, Unit};
use super::{Config, Cursor};
use crate::error::{Error, ErrorKind, Pos, Result};
use crate::node::Node;

const BOM: char = '\u{feff}';

/// Outcome of one scan step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scan {
    /// A complete element, children included
    Element(Node),
    /// A closing tag; ends the sibling list of the enclosing element
    Closing(String),
    /// No element here: blank line or end of input
    Empty,
}

/// Where the next scan step reads from
#[derive(Debug)]
enum Position {
    /// A logical line still has to be extracted at this cursor
    Line(Cursor),
    /// More markup at text offset `at` of a logical line already extracted.
    /// `start` is the cursor the line was read from, `after` the one past it.
    Within {
        line: LogicalLine,
        at: usize,
        start: Cursor,
        after: Cursor,
    },
}

impl Position {
    /// Where scanning continues after a unit ending at text offset `end`:
    /// the next markup on the same logical line, or the line after it.
    fn after_unit(line: LogicalLine, end: usize, start: Cursor, after: Cursor) -> Self {
        let rest = line.text().get(end..).unwrap_or("");
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Self::Line(after);
        }
        let at = end + (rest.len() - trimmed.len());
        Self::Within {
            line,
            at,
            start,
            after,
        }
    }

    fn source_offset(&self) -> usize {
        match self {
            Self::Line(cursor) => cursor.offset(),
            Self::Within { line, at, .. } => line
                .source_offset(*at)
                .unwrap_or_else(|| line.source_start()),
        }
    }

    fn is_eof(&self, input: &str) -> bool {
        matches!(self, Self::Line(cursor) if cursor.is_eof(input))
    }

    fn into_cursor(self, input: &str) -> Cursor {
        match self {
            Self::Line(cursor) => cursor,
            Self::Within {
                line,
                at,
                start,
                after,
            } => line
                .source_offset(at)
                .map_or(after, |offset| start.advance_to(input, offset)),
        }
    }
}

/// Line-oriented XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a str,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default limits
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub const fn with_config(input: &'a str, config: Config) -> Self {
        Self { input, config }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parse the whole document and return its root element
    #[instrument(skip(self), fields(len = self.input.len()))]
    pub fn parse(&self) -> Result<Node> {
        if self.config.size_exceeded(self.input.len()) {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Pos::default(),
            ));
        }

        let mut position = Position::Line(self.start());
        loop {
            let offset = position.source_offset();
            let at_eof = position.is_eof(self.input);
            let (scan, next) = self.scan(position, 1)?;
            match scan {
                Scan::Element(root) => {
                    if let Position::Line(next) = next {
                        if !next.remaining(self.input).trim().is_empty() {
                            debug!(line = next.line(), "ignoring content after root element");
                        }
                    } else {
                        debug!("ignoring content after root element");
                    }
                    debug!(root = root.name(), "document parsed");
                    return Ok(root);
                }
                Scan::Closing(name) => {
                    return Err(self.error_at(
                        ErrorKind::MalformedTag,
                        offset,
                        format!("unexpected closing tag </{name}> before root element"),
                    ));
                }
                Scan::Empty if at_eof => {
                    return Err(self.error_at(ErrorKind::EmptyInput, offset, "no root element"));
                }
                Scan::Empty => position = next,
            }
        }
    }

    /// Cursor at the first line after an optional byte-order mark and
    /// `<?...?>` declaration line
    pub fn start(&self) -> Cursor {
        let cursor = Cursor::start();
        let cursor = if self.input.starts_with(BOM) {
            cursor.advance_to(self.input, BOM.len_utf8())
        } else {
            cursor
        };
        if cursor.remaining(self.input).starts_with("<?") {
            cursor.skip_line(self.input)
        } else {
            cursor
        }
    }

    /// Parse one element starting at `cursor`.
    ///
    /// Returns what was found together with the cursor past it. A non-terminal
    /// element is returned only after its closing tag has been consumed.
    pub fn load_node(&self, cursor: Cursor) -> Result<(Scan, Cursor)> {
        let (scan, next) = self.scan(Position::Line(cursor), 1)?;
        Ok((scan, next.into_cursor(self.input)))
    }

    fn scan(&self, position: Position, depth: usize) -> Result<(Scan, Position)> {
        let (line, at, start, after_line) = match position {
            Position::Line(cursor) => {
                let (scanned, after_line) =
                    line::next_line(self.input, cursor, self.config.max_continuation_lines)?;
                match scanned {
                    Scanned::Empty => return Ok((Scan::Empty, Position::Line(after_line))),
                    Scanned::Line(line) => (line, 0, cursor, after_line),
                }
            }
            Position::Within {
                line,
                at,
                start,
                after,
            } => (line, at, start, after),
        };

        let origin = line
            .source_offset(at)
            .unwrap_or_else(|| line.source_start());
        let tag = match tag::scan_unit(&line, at, self.input)? {
            Unit::Closing { name, end } => {
                let next = Position::after_unit(line, end, start, after_line);
                return Ok((Scan::Closing(name), next));
            }
            Unit::Element(tag) => tag,
        };

        if self.config.depth_exceeded(depth) {
            return Err(self.error_at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                origin,
                format!("element <{}> nested {depth} deep", tag.name),
            ));
        }

        let mut node = Node::try_new(tag.name).ok_or_else(|| {
            self.error_at(ErrorKind::MalformedTag, origin, "element has no name")
        })?;
        for (key, value) in tag.attributes {
            node.add_attribute(key, value);
        }
        if let Some(data) = tag.data {
            node.set_data(data);
        }
        trace!(name = node.name(), depth, line = start.line(), "element opened");

        let mut position = Position::after_unit(line, tag.end, start, after_line);
        if tag.terminal {
            return Ok((Scan::Element(node), position));
        }

        loop {
            let offset = position.source_offset();
            let at_eof = position.is_eof(self.input);
            let (scan, next) = self.scan(position, depth + 1)?;
            match scan {
                Scan::Element(child) => node.add_child(child),
                Scan::Closing(name) if name == node.name() => return Ok((Scan::Element(node), next)),
                Scan::Closing(name) => {
                    return Err(self.error_at(
                        ErrorKind::MalformedTag,
                        offset,
                        format!(
                            "mismatched closing tag: expected </{}>, found </{name}>",
                            node.name()
                        ),
                    ));
                }
                Scan::Empty if at_eof => {
                    return Err(self.error_at(
                        ErrorKind::UnexpectedEndOfInput,
                        origin,
                        format!("element <{}> is never closed", node.name()),
                    ));
                }
                Scan::Empty => {}
            }
            position = next;
        }
    }

    fn error_at(&self, kind: ErrorKind, offset: usize, message: impl Into<String>) -> Error {
        Error::at(kind, self.input, offset, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Node> {
        Parser::new(input).parse()
    }

    fn kind(input: &str) -> Option<ErrorKind> {
        parse(input).err().map(|e| e.kind().clone())
    }

    #[test]
    fn test_parse_single_element() -> Result<()> {
        let root = parse("<a/>")?;
        assert_eq!(root.name(), "a");
        assert!(!root.has_attributes());
        assert_eq!(root.data(), None);
        assert_eq!(root.child_count(), 0);
        Ok(())
    }

    #[test]
    fn test_parse_nested_lines() -> Result<()> {
        let input = "<?xml version=\"1.0\"?>\n<config>\n  <server name=\"a\">\n    <port>80</port>\n  </server>\n</config>\n";
        let root = parse(input)?;
        assert_eq!(root.name(), "config");
        let port = root.lookup("server/port");
        assert_eq!(port.and_then(Node::data), Some("80"));
        Ok(())
    }

    #[test]
    fn test_load_node_returns_cursor_after_element() -> Result<()> {
        let input = "<a/>\n<b/>\n";
        let parser = Parser::new(input);
        let (scan, cursor) = parser.load_node(parser.start())?;
        assert!(matches!(scan, Scan::Element(ref node) if node.name() == "a"));
        assert_eq!(cursor.remaining(input), "<b/>\n");

        let (scan, cursor) = parser.load_node(cursor)?;
        assert!(matches!(scan, Scan::Element(ref node) if node.name() == "b"));
        let (scan, _) = parser.load_node(cursor)?;
        assert_eq!(scan, Scan::Empty);
        Ok(())
    }

    #[test]
    fn test_load_node_reports_closing_tag() -> Result<()> {
        let input = "</a>\n<b/>";
        let parser = Parser::new(input);
        let (scan, cursor) = parser.load_node(parser.start())?;
        assert_eq!(scan, Scan::Closing("a".to_string()));
        assert_eq!(cursor.remaining(input), "<b/>");
        Ok(())
    }

    #[test]
    fn test_compact_line_resumes_mid_line() -> Result<()> {
        let root = parse("<a><b/><b/><c/></a>")?;
        assert_eq!(root.children("b").len(), 2);
        assert_eq!(root.children("c").len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_node_cursor_stops_at_markup_on_same_line() -> Result<()> {
        let input = "<a/> <b/>\n<c/>";
        let parser = Parser::new(input);
        let (scan, cursor) = parser.load_node(parser.start())?;
        assert!(matches!(scan, Scan::Element(ref node) if node.name() == "a"));
        assert_eq!(cursor.remaining(input), "<b/>\n<c/>");
        assert_eq!(cursor.line(), 1);
        Ok(())
    }

    #[test]
    fn test_compact_siblings_match_indented() -> Result<()> {
        let compact: String = std::iter::once("<list>".to_string())
            .chain((0..50).map(|i| format!("<item id=\"{i}\"/>")))
            .chain(std::iter::once("</list>".to_string()))
            .collect();
        let indented = compact.replace("><", ">\n<");
        assert_eq!(parse(&compact)?, parse(&indented)?);
        Ok(())
    }

    #[test]
    fn test_start_skips_bom_and_declaration() {
        let input = "\u{feff}<?xml version=\"1.0\"?>\n<a/>";
        let parser = Parser::new(input);
        assert_eq!(parser.start().remaining(input), "<a/>");
    }

    #[test]
    fn test_errors() {
        assert_eq!(kind(""), Some(ErrorKind::EmptyInput));
        assert_eq!(kind("<?xml?>\n\n"), Some(ErrorKind::EmptyInput));
        assert_eq!(kind("<a>\n<b/>\n"), Some(ErrorKind::UnexpectedEndOfInput));
        assert_eq!(kind("<a>\n</b>\n"), Some(ErrorKind::MalformedTag));
        assert_eq!(kind("</a>\n"), Some(ErrorKind::MalformedTag));
    }

    #[test]
    fn test_depth_limit() {
        let config = Config::default().with_max_depth(2);
        let ok = Parser::with_config("<a>\n<b></b>\n</a>", config).parse();
        assert!(ok.is_ok());
        let err = Parser::with_config("<a>\n<b>\n<c/>\n</b>\n</a>", config).parse();
        assert_eq!(
            err.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 2 })
        );
    }

    #[test]
    fn test_size_limit() {
        let config = Config::default().with_max_size(4);
        let err = Parser::with_config("<abc/>", config).parse();
        assert_eq!(
            err.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 4 })
        );
    }
}
