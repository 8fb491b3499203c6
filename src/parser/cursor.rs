use crate::{IniError, IniErrorKind};

/// Maximum length in bytes of the source line snippet attached to [`errors`](struct.IniError.html).
pub const MAX_SNIPPET_LEN: usize = 127;

/// Line terminators. Unicode `LS` / `PS` / `NEL` are not included.
pub(super) fn is_eol(c: u8) -> bool {
    matches!(c, b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Whitespace, including line terminators.
pub(super) fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t' || is_eol(c)
}

/// A snapshot of the cursor, used to report errors at a position the cursor has since left.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) struct Position {
    offset: usize,
    line: u32,
    line_start: usize,
}

/// Walks the `.ini` source bytes, normalizing line terminators
/// and keeping track of the current line.
///
/// Never reads past the end of the source; once the end is reached
/// all accessors return `None`.
pub(super) struct Cursor<'s> {
    source: &'s [u8],
    /// Offset of the current byte. `source.len()` at the end of input.
    offset: usize,
    /// Current line, 1-based.
    line: u32,
    /// Offset of the first byte of the current line.
    line_start: usize,
}

impl<'s> Cursor<'s> {
    pub(super) fn new(source: &'s [u8]) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Returns the current byte, or `None` at the end of input.
    pub(super) fn current(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    /// Returns the byte `distance` bytes after the current one, if any.
    pub(super) fn peek(&self, distance: usize) -> Option<u8> {
        self.offset
            .checked_add(distance)
            .and_then(|offset| self.source.get(offset).copied())
    }

    pub(super) fn line(&self) -> u32 {
        self.line
    }

    pub(super) fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            line_start: self.line_start,
        }
    }

    /// Moves to the next byte and returns it.
    /// Does not process line terminators; the caller guarantees
    /// the current byte is not one, or processes them with [`settle`](#method.settle).
    pub(super) fn bump(&mut self) -> Option<u8> {
        if self.offset < self.source.len() {
            self.offset += 1;
        }

        self.current()
    }

    /// Steps over any line terminators at the current position
    /// (and any whitespace, if `skip_whitespace` is `true`),
    /// returning the first byte which is not skipped.
    ///
    /// `\r\n` counts as a single line.
    pub(super) fn settle(&mut self, skip_whitespace: bool) -> Option<u8> {
        while let Some(c) = self.current() {
            if is_eol(c) {
                self.offset += if c == b'\r' && self.peek(1) == Some(b'\n') {
                    2
                } else {
                    1
                };
                self.line = self.line.saturating_add(1);
                self.line_start = self.offset;
            } else if skip_whitespace && is_space(c) {
                self.offset += 1;
            } else {
                return Some(c);
            }
        }

        None
    }

    /// Moves past the current byte, then [`settles`](#method.settle).
    ///
    /// The returned byte, if any, is never a line terminator.
    pub(super) fn advance(&mut self, skip_whitespace: bool) -> Option<u8> {
        if self.offset >= self.source.len() {
            return None;
        }

        self.offset += 1;
        self.settle(skip_whitespace)
    }

    /// If the current byte is a backslash immediately followed by a line terminator,
    /// steps over both, as well as over any whitespace at the start of the following line(s),
    /// and returns `true`.
    pub(super) fn line_continuation(&mut self) -> bool {
        if self.current() == Some(b'\\') && self.peek(1).map_or(false, is_eol) {
            self.advance(true);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the first byte on the current line after the current position,
    /// not counting spaces and tabs, is `c`.
    pub(super) fn next_on_line_is(&self, c: u8) -> bool {
        self.source[self.offset.min(self.source.len())..]
            .iter()
            .find(|&&b| b != b' ' && b != b'\t')
            == Some(&c)
    }

    /// Builds an error at the current position.
    pub(super) fn error(&self, error: IniErrorKind) -> IniError {
        self.error_at(self.position(), error)
    }

    /// Builds an error at the previously recorded position `at`.
    pub(super) fn error_at(&self, at: Position, error: IniErrorKind) -> IniError {
        let column = at.offset.saturating_sub(at.line_start) + 1;

        IniError {
            line: at.line,
            column: column.min(u32::MAX as usize) as u32,
            snippet: self.snippet(at.line_start),
            error,
        }
    }

    fn snippet(&self, line_start: usize) -> String {
        let line = &self.source[line_start.min(self.source.len())..];
        let len = line
            .iter()
            .take(MAX_SNIPPET_LEN)
            .position(|&c| is_eol(c))
            .unwrap_or_else(|| line.len().min(MAX_SNIPPET_LEN));

        String::from_utf8_lossy(&line[..len]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_skips_line_terminators() {
        let mut cursor = Cursor::new(b"a\nb\r\nc\x0bd\x0ce\rf");

        assert_eq!(cursor.settle(false), Some(b'a'));
        assert_eq!(cursor.line(), 1);

        assert_eq!(cursor.advance(false), Some(b'b'));
        assert_eq!(cursor.line(), 2);

        // `\r\n` is a single line.
        assert_eq!(cursor.advance(false), Some(b'c'));
        assert_eq!(cursor.line(), 3);

        assert_eq!(cursor.advance(false), Some(b'd'));
        assert_eq!(cursor.line(), 4);

        assert_eq!(cursor.advance(false), Some(b'e'));
        assert_eq!(cursor.line(), 5);

        assert_eq!(cursor.advance(false), Some(b'f'));
        assert_eq!(cursor.line(), 6);

        assert_eq!(cursor.advance(false), None);
        assert_eq!(cursor.advance(false), None);
        assert_eq!(cursor.line(), 6);
    }

    #[test]
    fn line_count_saturates() {
        let mut cursor = Cursor::new(b"a\n\n\nb");
        cursor.line = u32::MAX - 1;

        assert_eq!(cursor.advance(false), Some(b'b'));
        assert_eq!(cursor.line(), u32::MAX);
        assert_eq!(cursor.error(IniErrorKind::EmptyKey).line, u32::MAX);
    }

    #[test]
    fn advance_skips_whitespace() {
        let mut cursor = Cursor::new(b"a \t\n\n  b c");

        assert_eq!(cursor.settle(true), Some(b'a'));
        assert_eq!(cursor.advance(true), Some(b'b'));
        assert_eq!(cursor.line(), 3);
        assert_eq!(cursor.advance(false), Some(b' '));
        assert_eq!(cursor.advance(false), Some(b'c'));
        assert_eq!(cursor.advance(true), None);
    }

    #[test]
    fn leading_line_terminators_are_counted() {
        let mut cursor = Cursor::new(b"\r\n\nk");

        assert_eq!(cursor.settle(true), Some(b'k'));
        assert_eq!(cursor.line(), 3);
    }

    #[test]
    fn line_continuation() {
        let mut cursor = Cursor::new(b"\\\n   x\\y");

        assert!(cursor.line_continuation());
        assert_eq!(cursor.current(), Some(b'x'));
        assert_eq!(cursor.line(), 2);

        assert_eq!(cursor.advance(false), Some(b'\\'));
        assert!(!cursor.line_continuation());
    }

    #[test]
    fn backslash_at_end_is_not_a_continuation() {
        let mut cursor = Cursor::new(b"\\");

        assert!(!cursor.line_continuation());
        assert_eq!(cursor.bump(), None);
        assert_eq!(cursor.bump(), None);
    }

    #[test]
    fn error_position_and_snippet() {
        let mut cursor = Cursor::new(b"first\n  second line\nthird");

        assert_eq!(cursor.settle(true), Some(b'f'));
        for _ in 0..4 {
            cursor.advance(false);
        }
        assert_eq!(cursor.current(), Some(b't'));

        assert_eq!(cursor.advance(true), Some(b's'));
        assert_eq!(cursor.advance(false), Some(b'e'));

        let error = cursor.error(IniErrorKind::EmptyKey);
        assert_eq!(error.line, 2);
        assert_eq!(error.column, 4);
        assert_eq!(error.snippet, "  second line");
    }

    #[test]
    fn snippet_is_bounded() {
        let source = vec![b'x'; 1000];
        let cursor = Cursor::new(&source);

        let error = cursor.error(IniErrorKind::EmptyKey);
        assert_eq!(error.snippet.len(), MAX_SNIPPET_LEN);
        assert_eq!(error.column, 1);
    }

    #[test]
    fn next_on_line() {
        let cursor = Cursor::new(b" \t= x");
        assert!(cursor.next_on_line_is(b'='));

        let cursor = Cursor::new(b" x =");
        assert!(!cursor.next_on_line_is(b'='));
    }
}
