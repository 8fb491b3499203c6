mod cursor;
mod escape;
mod productions;

use {
    crate::*,
    cursor::Cursor,
    tracing::debug,
};

pub use cursor::MAX_SNIPPET_LEN;

/// Maximum supported length in bytes of section names and keys.
const MAX_NAME_LEN: usize = i32::MAX as usize;

/// Transient state of a single parse pass.
struct ParseState<'s> {
    cursor: Cursor<'s>,
    options: IniOptions,
    delimiter: char,
    /// Current section name. Empty before the first section header.
    section: String,
    /// Current key.
    key: String,
    /// Scratch buffer for section names and keys.
    name: Vec<u8>,
    /// Accumulator for the current value. Moved into the document on commit.
    value: Vec<u8>,
    /// High UTF-16 surrogate waiting for its low half, if any.
    utf16_hi: Option<u16>,
    /// Number of entries committed during this pass.
    committed: usize,
}

impl<'s> ParseState<'s> {
    fn new(source: &'s [u8], options: IniOptions, delimiter: char) -> Self {
        Self {
            cursor: Cursor::new(source),
            options,
            delimiter,
            section: String::new(),
            key: String::new(),
            name: Vec::new(),
            value: Vec::new(),
            utf16_hi: None,
            committed: 0,
        }
    }
}

/// Parses the `.ini` source into an [`.ini document`](struct.IniDocument.html),
/// using the user-provided [`parsing options`](struct.IniOptions.html).
///
/// Parsing does not stop at the first error: every error is reported
/// to the document's reporter, if any, and parsing resumes after the offending construct.
pub struct IniParser<'s> {
    /// Source `.ini` bytes.
    source: &'s [u8],
    /// Parsing options as provided by the user.
    options: IniOptions,
}

impl<'s> IniParser<'s> {
    /// Creates a new [`parser`](struct.IniParser.html) from the `.ini` config `string`
    /// with all [`parsing options`](struct.IniOptions.html) disabled.
    pub fn new(string: &'s str) -> Self {
        Self::from_bytes(string.as_bytes())
    }

    /// Creates a new [`parser`](struct.IniParser.html) from the `.ini` config `source` bytes
    /// with all [`parsing options`](struct.IniOptions.html) disabled.
    ///
    /// The source need not be valid UTF-8 (values are byte strings),
    /// but section names and keys must be.
    pub fn from_bytes(source: &'s [u8]) -> Self {
        Self {
            source,
            options: IniOptions::empty(),
        }
    }

    /// Replaces all [`parsing options`](struct.IniOptions.html).
    pub fn options(mut self, options: IniOptions) -> Self {
        self.options = options;
        self
    }

    /// See [`ESCAPING`](struct.IniOptions.html#associatedconstant.ESCAPING).
    ///
    /// Default: `false`.
    pub fn escaping(mut self, escaping: bool) -> Self {
        self.options.set(IniOptions::ESCAPING, escaping);
        self
    }

    /// See [`QUOTED_STRINGS`](struct.IniOptions.html#associatedconstant.QUOTED_STRINGS).
    ///
    /// Default: `false`.
    pub fn quoted_strings(mut self, quoted_strings: bool) -> Self {
        self.options.set(IniOptions::QUOTED_STRINGS, quoted_strings);
        self
    }

    /// See [`EMPTY_VALUES`](struct.IniOptions.html#associatedconstant.EMPTY_VALUES).
    ///
    /// Default: `false`.
    pub fn empty_values(mut self, empty_values: bool) -> Self {
        self.options.set(IniOptions::EMPTY_VALUES, empty_values);
        self
    }

    /// See [`EMPTY_KEYS`](struct.IniOptions.html#associatedconstant.EMPTY_KEYS).
    ///
    /// Default: `false`.
    pub fn empty_keys(mut self, empty_keys: bool) -> Self {
        self.options.set(IniOptions::EMPTY_KEYS, empty_keys);
        self
    }

    /// Consumes the parser and parses the `.ini` source, adding the parsed entries to the `document`.
    ///
    /// Returns all reported errors if any construct in the source failed to parse.
    /// Entries which parsed successfully are added to the `document` regardless.
    pub fn parse(self, document: &mut IniDocument) -> Result<(), IniErrors> {
        debug!(
            len = self.source.len(),
            options = ?self.options,
            "parsing INI source"
        );

        let mut state = ParseState::new(self.source, self.options, document.delimiter());
        let mut errors = Vec::new();

        while let Some(c) = state.cursor.settle(true) {
            let result = match c {
                b'[' => state.parse_section(),
                b';' | b'#' => {
                    state.parse_comment();
                    Ok(())
                }
                _ => state.parse_key(document),
            };

            if let Err(error) = result {
                debug!(
                    line = error.line,
                    column = error.column,
                    "{}",
                    error.error
                );
                document.report(&error);
                errors.push(error);
            }
        }

        debug!(
            committed = state.committed,
            errors = errors.len(),
            "finished parsing INI source"
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(IniErrors(errors))
        }
    }
}
