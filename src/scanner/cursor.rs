//! Scan cursor threaded through the recursive descent

/// Position of the next unconsumed byte of the input.
///
/// The cursor is a plain value: every scan step takes one and hands back the
/// advanced cursor together with its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
    line: u32,
}

impl Cursor {
    /// Cursor at the start of the input
    pub const fn start() -> Self {
        Self { offset: 0, line: 1 }
    }

    /// Get current byte offset
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Get current line number (1-based)
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Check if at end of input
    pub const fn is_eof(&self, input: &str) -> bool {
        self.offset >= input.len()
    }

    /// Get the unconsumed part of the input
    pub fn remaining<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.offset..).unwrap_or("")
    }

    /// Move forward to `offset`, counting the line breaks passed on the way.
    /// Offsets behind the cursor leave it unchanged.
    #[must_use]
    pub fn advance_to(self, input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        if offset <= self.offset {
            return self;
        }
        let passed = input
            .get(self.offset..offset)
            .map_or(0, |s| s.matches('\n').count());
        Self {
            offset,
            line: self
                .line
                .saturating_add(u32::try_from(passed).unwrap_or(u32::MAX)),
        }
    }

    /// Move past the current physical line, including its terminator
    #[must_use]
    pub fn skip_line(self, input: &str) -> Self {
        let rest = self.remaining(input);
        let target = rest
            .find('\n')
            .map_or(input.len(), |nl| self.offset + nl + 1);
        self.advance_to(input, target)
    }
}
