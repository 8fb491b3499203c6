use std::{
    error::Error,
    fmt::{Display, Formatter},
    io,
    path::PathBuf,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum IniErrorKind {
    /// No section end delimiter (`']'`) was found on the section's line.
    UnterminatedSection,
    /// The section end delimiter (`']'`) is on a different line than the section start delimiter (`'['`).
    NewLineInSectionName,
    /// Section names may not contain whitespace.
    WhitespaceInSectionName,
    /// Empty section names are invalid.
    EmptySectionName,
    /// Section name exceeds the maximum supported length.
    SectionNameTooLong,
    /// Section names must be valid UTF-8.
    InvalidUtf8InSectionName,
    /// No key-value separator (`'='`) was found on the key's line
    /// and valueless keys are not allowed by options.
    UnterminatedKey,
    /// The key-value separator (`'='`) is on a different line than the key.
    NewLineInKey,
    /// Keys may not contain whitespace.
    WhitespaceInKey,
    /// Keys may not contain the path delimiter.
    /// Contains the delimiter.
    InvalidCharacterInKey(char),
    /// Empty keys are invalid.
    EmptyKey,
    /// Key exceeds the maximum supported length.
    KeyTooLong,
    /// Keys must be valid UTF-8.
    InvalidUtf8InKey,
    /// Empty values are not allowed by options.
    EmptyValue,
    /// End of input encountered when parsing a quoted value.
    UnterminatedQuotedString,
    /// End of input encountered right after an escape character (`'\'`).
    UnexpectedEndOfInputInEscapeSequence,
    /// A `\u` escape sequence decoded to zero.
    InvalidUtf16Escape,
    /// A `\U` escape sequence decoded to zero or to a value above `0x1FFFFF`.
    InvalidUnicodeEscape,
    /// A high UTF-16 surrogate was not followed by a low surrogate.
    ExpectedLowSurrogate,
    /// A low UTF-16 surrogate was not preceded by a high surrogate.
    ExpectedHighSurrogate,
    /// The path is already set in the document.
    /// Contains the path.
    DuplicateKey(String),
    /// Memory allocation failed when storing the value at the path.
    /// Contains the path, as far as it could be composed.
    OutOfMemory(String),
}

impl Display for IniErrorKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        use IniErrorKind::*;

        match self {
            UnterminatedSection => "Section does not end up with ']'".fmt(f),
            NewLineInSectionName => "Section contains newline".fmt(f),
            WhitespaceInSectionName => "Section contains whitespace".fmt(f),
            EmptySectionName => "Section is empty".fmt(f),
            SectionNameTooLong => "Section name too long".fmt(f),
            InvalidUtf8InSectionName => "Section contains invalid UTF-8".fmt(f),
            UnterminatedKey => "Key does not end up with '='".fmt(f),
            NewLineInKey => "Key contains newline".fmt(f),
            WhitespaceInKey => "Key contains whitespace".fmt(f),
            InvalidCharacterInKey(delimiter) => {
                write!(f, "Key contains invalid characters [{}]", delimiter)
            }
            EmptyKey => "Key is empty".fmt(f),
            KeyTooLong => "Key name too long".fmt(f),
            InvalidUtf8InKey => "Key contains invalid UTF-8".fmt(f),
            EmptyValue => "Value should not be empty".fmt(f),
            UnterminatedQuotedString => "Unterminated quoted string".fmt(f),
            UnexpectedEndOfInputInEscapeSequence => {
                "Unexpected end of input in escape sequence".fmt(f)
            }
            InvalidUtf16Escape => "Invalid \\u escape".fmt(f),
            InvalidUnicodeEscape => "Invalid \\U escape".fmt(f),
            ExpectedLowSurrogate => "Expected low UTF16 surrogate after high surrogate".fmt(f),
            ExpectedHighSurrogate => "Expected high UTF16 surrogate before low surrogate".fmt(f),
            DuplicateKey(path) => write!(f, "Key '{}' is already set", path),
            OutOfMemory(path) => write!(f, "Could not set key '{}' (out of memory?)", path),
        }
    }
}

/// A single diagnostic reported by the `.ini` parser.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IniError {
    /// Line in the source where the error occured (1-based).
    pub line: u32,
    /// Column in the source line where the error occured (1-based).
    pub column: u32,
    /// Source line where the error occured, truncated to at most
    /// [`MAX_SNIPPET_LEN`](constant.MAX_SNIPPET_LEN.html) bytes.
    pub snippet: String,
    /// Actual error.
    pub error: IniErrorKind,
}

impl IniError {
    /// Returns the human-readable message of the error.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl Error for IniError {}

impl Display for IniError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "INI parse error. Line: {}, column: {}. {}",
            self.line, self.column, self.error
        )
    }
}

/// All diagnostics reported during a failed parse pass, in report order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IniErrors(pub Vec<IniError>);

impl IniErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IniError> {
        self.0.iter()
    }
}

impl Error for IniErrors {}

impl Display for IniErrors {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} error(s) when parsing the INI source", self.0.len())?;

        for error in self.0.iter() {
            write!(f, "\n{}", error)?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a IniErrors {
    type Item = &'a IniError;
    type IntoIter = std::slice::Iter<'a, IniError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An error returned by [`parse_file`](struct.IniDocument.html#method.parse_file).
#[derive(Debug)]
pub enum IniFileError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// The file is empty.
    Empty(PathBuf),
    /// The file was read but contained errors.
    Parse(IniErrors),
}

impl Error for IniFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IniFileError::Io { source, .. } => Some(source),
            IniFileError::Empty(_) => None,
            IniFileError::Parse(errors) => Some(errors),
        }
    }
}

impl Display for IniFileError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        use IniFileError::*;

        match self {
            Io { path, source } => write!(f, "failed to read \"{}\": {}", path.display(), source),
            Empty(path) => write!(f, "\"{}\" is empty", path.display()),
            Parse(errors) => errors.fmt(f),
        }
    }
}

impl From<IniErrors> for IniFileError {
    fn from(errors: IniErrors) -> Self {
        IniFileError::Parse(errors)
    }
}
