//! Logical line extraction
//!
//! The scanner reads its input one *logical* line at a time. Usually that is a
//! single physical line, but an opening tag whose attribute list wraps, or an
//! element whose text sits on its own line, is stitched together from several
//! physical lines:
//!
//! ```text
//! <server host="example.org"          <description>
//!         port="8080">                    Primary node
//!                                     </description>
//! ```
//!
//! Extraction runs as a small state machine over [`LineState`]. Each physical
//! line break swallowed into a logical line is recorded as a [`Join`].

use tracing::trace;

use super::Cursor;
use crate::error::{Error, ErrorKind, Result};

/// States of the line extraction machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    /// A physical line was just appended; decide whether the logical line is closed
    ScanningLine,
    /// The logical line does not end with `>` and may continue on the next line
    TagOpenUnclosed,
    /// Nothing more belongs to this logical line
    LineComplete,
}

/// How a physical line break was folded into a logical line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Join {
    /// Break replaced by a single space (wrapped attribute list or text)
    Space,
    /// Text-only line appended directly after an opening tag
    Fragment,
    /// Closing tag appended; marks that no text data continues past this point
    TagBoundary,
}

/// Result of asking for the next logical line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scanned {
    /// End of input, or an empty / whitespace-only line
    Empty,
    Line(LogicalLine),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    text_start: usize,
    source_start: usize,
    len: usize,
}

/// One logical line, with enough bookkeeping to map text offsets back into the
/// source buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalLine {
    text: String,
    segments: Vec<Segment>,
    joins: Vec<Join>,
    boundary: Option<usize>,
}

impl LogicalLine {
    fn begin(source_start: usize, content: &str) -> Self {
        let mut line = Self {
            text: String::with_capacity(content.len()),
            segments: Vec::new(),
            joins: Vec::new(),
            boundary: None,
        };
        line.append(source_start, content);
        line
    }

    fn append(&mut self, source_start: usize, content: &str) {
        self.segments.push(Segment {
            text_start: self.text.len(),
            source_start,
            len: content.len(),
        });
        self.text.push_str(content);
    }

    fn join(&mut self, join: Join, physical: &Physical, input: &str) {
        let (source_start, content) = physical.trimmed(input);
        match join {
            Join::Space => self.text.push(' '),
            Join::TagBoundary => self.boundary = Some(self.text.len()),
            Join::Fragment => {}
        }
        self.joins.push(join);
        self.append(source_start, content);
    }

    /// Line text with leading whitespace and every line break removed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Text offset of the tag-boundary sentinel, if a closing tag was joined
    pub fn boundary(&self) -> Option<usize> {
        self.boundary
    }

    /// Source offset where the line text starts
    pub fn source_start(&self) -> usize {
        self.segments.first().map_or(0, |s| s.source_start)
    }

    /// Map an offset into [`LogicalLine::text`] back to the source buffer.
    ///
    /// Offsets that fall on an inserted join space have no source position.
    pub fn source_offset(&self, text_offset: usize) -> Option<usize> {
        self.segments
            .iter()
            .find(|s| text_offset >= s.text_start && text_offset < s.text_start + s.len)
            .map(|s| s.source_start + (text_offset - s.text_start))
    }

    /// Closed when one of the last two characters is `>`
    fn is_closed(&self) -> bool {
        self.text.chars().rev().take(2).any(|c| c == '>')
    }

    /// Whether the text ends with a tag that opens an element, such as
    /// `<name attr="v">`, as opposed to `<name/>` or `</name>`.
    fn ends_with_open_tag(&self) -> bool {
        let Some(body) = self.text.strip_suffix('>') else {
            return false;
        };
        if body.ends_with('/') {
            return false;
        }
        body.rfind('<')
            .and_then(|lt| body.get(lt + 1..))
            .is_some_and(|tag| !tag.starts_with('/') && !tag.is_empty())
    }
}

/// One physical line: `start..end` is its content without trailing
/// whitespace, `next` is the offset just past its terminator.
#[derive(Clone, Copy, Debug)]
struct Physical {
    start: usize,
    end: usize,
    next: usize,
}

impl Physical {
    fn at(input: &str, start: usize) -> Option<Self> {
        let rest = input.get(start..).filter(|rest| !rest.is_empty())?;
        let (raw_len, next) = match rest.find('\n') {
            Some(nl) => (nl, start + nl + 1),
            None => (rest.len(), input.len()),
        };
        let raw = rest.get(..raw_len)?;
        Some(Self {
            start,
            end: start + raw.trim_end().len(),
            next,
        })
    }

    /// Content with leading whitespace removed, and the source offset it starts at
    fn trimmed<'a>(&self, input: &'a str) -> (usize, &'a str) {
        let content = input.get(self.start..self.end).unwrap_or("");
        let trimmed = content.trim_start();
        (self.start + (content.len() - trimmed.len()), trimmed)
    }

    fn is_blank(&self, input: &str) -> bool {
        self.trimmed(input).1.is_empty()
    }

    /// Non-blank text that contains no markup at all
    fn is_data_fragment(&self, input: &str) -> bool {
        let (_, content) = self.trimmed(input);
        !content.is_empty() && !content.contains('<')
    }
}

/// Extract the logical line starting at `cursor`.
///
/// Returns the line and the cursor just past its last physical line.
/// `max_continuations` bounds how many physical lines may be folded in with a
/// [`Join::Space`]; going past it is a [`ErrorKind::MalformedTag`] failure.
pub fn next_line(
    input: &str,
    cursor: Cursor,
    max_continuations: usize,
) -> Result<(Scanned, Cursor)> {
    let Some(first) = Physical::at(input, cursor.offset()) else {
        return Ok((Scanned::Empty, cursor));
    };
    if first.is_blank(input) {
        return Ok((Scanned::Empty, cursor.advance_to(input, first.next)));
    }

    let (start, content) = first.trimmed(input);
    let mut line = LogicalLine::begin(start, content);
    let mut next = first.next;
    let mut continuations = 0;
    let mut state = LineState::ScanningLine;

    while state != LineState::LineComplete {
        let following = Physical::at(input, next);
        state = match state {
            LineState::ScanningLine if line.is_closed() => match following {
                Some(fragment) if line.ends_with_open_tag() && fragment.is_data_fragment(input) => {
                    trace!(offset = fragment.start, "joining text fragment");
                    line.join(Join::Fragment, &fragment, input);
                    next = fragment.next;
                    LineState::TagOpenUnclosed
                }
                _ => LineState::LineComplete,
            },
            LineState::ScanningLine => LineState::TagOpenUnclosed,
            LineState::TagOpenUnclosed => match following {
                None => LineState::LineComplete,
                Some(physical) => {
                    let (_, content) = physical.trimmed(input);
                    if content.starts_with("</") {
                        trace!(offset = physical.start, "joining closing tag");
                        line.join(Join::TagBoundary, &physical, input);
                        next = physical.next;
                        LineState::LineComplete
                    } else if content.is_empty() || content.starts_with('<') {
                        LineState::LineComplete
                    } else {
                        continuations += 1;
                        if continuations > max_continuations {
                            return Err(Error::at(
                                ErrorKind::MalformedTag,
                                input,
                                physical.start,
                                format!(
                                    "line continues past {max_continuations} continuation line(s)"
                                ),
                            ));
                        }
                        trace!(offset = physical.start, "joining continuation line");
                        line.join(Join::Space, &physical, input);
                        next = physical.next;
                        LineState::ScanningLine
                    }
                }
            },
            LineState::LineComplete => LineState::LineComplete,
        };
    }

    Ok((Scanned::Line(line), cursor.advance_to(input, next)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_at(input: &str, offset: usize) -> Result<(Scanned, Cursor)> {
        let cursor = Cursor::start().advance_to(input, offset);
        next_line(input, cursor, 1)
    }

    fn logical(input: &str) -> Result<(LogicalLine, Cursor)> {
        match line_at(input, 0)? {
            (Scanned::Line(line), cursor) => Ok((line, cursor)),
            (Scanned::Empty, _) => Err(Error::new(ErrorKind::EmptyInput, Default::default())),
        }
    }

    #[test]
    fn test_single_physical_line() -> Result<()> {
        let input = "  <a x=\"1\">hi</a>\n<b/>";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), "<a x=\"1\">hi</a>");
        assert!(line.joins().is_empty());
        assert_eq!(line.source_start(), 2);
        assert_eq!(cursor.remaining(input), "<b/>");
        Ok(())
    }

    #[test]
    fn test_empty_and_blank_lines() -> Result<()> {
        let (scanned, cursor) = line_at("", 0)?;
        assert_eq!(scanned, Scanned::Empty);
        assert_eq!(cursor.offset(), 0);

        let input = "\n   \n<a/>";
        let (scanned, cursor) = line_at(input, 0)?;
        assert_eq!(scanned, Scanned::Empty);
        assert_eq!(cursor.offset(), 1);
        let (scanned, cursor) = next_line(input, cursor, 1)?;
        assert_eq!(scanned, Scanned::Empty);
        assert_eq!(cursor.remaining(input), "<a/>");
        Ok(())
    }

    #[test]
    fn test_wrapped_attribute_list_joins_with_space() -> Result<()> {
        let input = "<a x=\"1\"\n   y=\"2\">\n</a>";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), "<a x=\"1\" y=\"2\">");
        assert_eq!(line.joins(), &[Join::Space]);
        assert_eq!(cursor.remaining(input), "</a>");
        assert_eq!(cursor.line(), 3);
        Ok(())
    }

    #[test]
    fn test_unclosed_line_absorbs_closing_tag_with_boundary() -> Result<()> {
        let input = "<name>value\n  </name>\n";
        let (line, _) = logical(input)?;
        assert_eq!(line.text(), "<name>value</name>");
        assert_eq!(line.joins(), &[Join::TagBoundary]);
        assert_eq!(line.boundary(), Some(11));
        Ok(())
    }

    #[test]
    fn test_unclosed_line_stops_before_new_tag() -> Result<()> {
        let input = "<name>value\n<other/>\n</name>";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), "<name>value");
        assert!(line.joins().is_empty());
        assert_eq!(cursor.remaining(input), "<other/>\n</name>");
        Ok(())
    }

    #[test]
    fn test_text_fragment_on_its_own_line() -> Result<()> {
        let input = "<d>\n    some text\n</d>";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), "<d>some text</d>");
        assert_eq!(line.joins(), &[Join::Fragment, Join::TagBoundary]);
        assert!(cursor.is_eof(input));
        Ok(())
    }

    #[test]
    fn test_fragment_not_absorbed_after_self_closing_tag() -> Result<()> {
        let input = "<d/>\ntext\n";
        let (line, _) = logical(input)?;
        assert_eq!(line.text(), "<d/>");
        Ok(())
    }

    #[test]
    fn test_too_many_continuations_is_an_error() {
        let input = "<a x=\"1\"\ny=\"2\"\nz=\"3\">\n</a>";
        let err = line_at(input, 0).err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::MalformedTag));
    }

    #[test]
    fn test_unterminated_last_line_runs_to_end() -> Result<()> {
        let input = "<a x=\"1\"";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), input);
        assert!(cursor.is_eof(input));
        Ok(())
    }

    #[test]
    fn test_crlf_line_endings() -> Result<()> {
        let input = "<a>\r\n<b/>\r\n</a>";
        let (line, cursor) = logical(input)?;
        assert_eq!(line.text(), "<a>");
        assert_eq!(cursor.remaining(input), "<b/>\r\n</a>");
        Ok(())
    }

    #[test]
    fn test_source_offset_maps_through_joins() -> Result<()> {
        let input = "<a x=\"1\"\n  y=\"2\"><b/>";
        let (line, _) = logical(input)?;
        let b = line.text().find("<b/>").unwrap_or_default();
        assert_eq!(line.source_offset(b), input.find("<b/>"));
        assert_eq!(line.source_offset(8), None);
        Ok(())
    }
}
