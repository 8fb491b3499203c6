use {
    crate::*,
    std::{
        collections::{
            hash_map::{Entry, Iter as HashMapIter},
            HashMap,
        },
        fmt::{Debug, Display, Formatter},
        fs,
        iter::Iterator,
        path::Path,
    },
    tracing::debug,
};

/// Diagnostics callback invoked for every error reported during parsing.
/// The document is not passed in, as it is mutably borrowed by the running parse.
pub type IniReporter = Box<dyn FnMut(&IniError)>;

/// A flat store of `.ini` values, keyed by `section + delimiter + key` paths.
///
/// Keys which precede any section header have an empty section:
/// with the `.` delimiter, `key` before any section is stored at `.key`,
/// and `key` in `[section]` at `section.key`.
pub struct IniDocument {
    entries: HashMap<String, IniValue>,
    delimiter: char,
    reporter: Option<IniReporter>,
}

impl IniDocument {
    /// Creates a new empty [`document`](struct.IniDocument.html) which joins section names and keys
    /// with the `delimiter`, with space for at least `capacity` entries.
    pub fn new(delimiter: char, capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            delimiter,
            reporter: None,
        }
    }

    /// Creates a new empty [`document`](struct.IniDocument.html), see [`new`](#method.new),
    /// which passes every parse error to the `reporter`.
    pub fn with_reporter<R: FnMut(&IniError) + 'static>(
        delimiter: char,
        capacity: usize,
        reporter: R,
    ) -> Self {
        let mut document = Self::new(delimiter, capacity);
        document.set_reporter(reporter);
        document
    }

    /// Sets the diagnostics callback, replacing the previous one, if any.
    pub fn set_reporter<R: FnMut(&IniError) + 'static>(&mut self, reporter: R) {
        self.reporter.replace(Box::new(reporter));
    }

    /// Removes and returns the diagnostics callback, if any.
    /// Errors are still returned by the parse methods.
    pub fn take_reporter(&mut self) -> Option<IniReporter> {
        self.reporter.take()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Parses the `.ini` `source` bytes with the `options` and adds the parsed entries to the document.
    ///
    /// Returns all reported errors if any construct in the source failed to parse.
    /// Entries which parsed successfully are added regardless;
    /// discard the document on error if all-or-nothing semantics are required.
    /// A path already present in the document, from this or a previous call, is a duplicate key error.
    pub fn parse_bytes(&mut self, source: &[u8], options: IniOptions) -> Result<(), IniErrors> {
        IniParser::from_bytes(source).options(options).parse(self)
    }

    /// See [`parse_bytes`](#method.parse_bytes).
    pub fn parse_str(&mut self, source: &str, options: IniOptions) -> Result<(), IniErrors> {
        self.parse_bytes(source.as_bytes(), options)
    }

    /// Reads the whole file at `path` and parses it, see [`parse_bytes`](#method.parse_bytes).
    ///
    /// Empty files are an error.
    pub fn parse_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: IniOptions,
    ) -> Result<(), IniFileError> {
        let path = path.as_ref();

        debug!(path = %path.display(), "reading INI file");

        let source = fs::read(path).map_err(|source| IniFileError::Io {
            path: path.to_owned(),
            source,
        })?;

        if source.is_empty() {
            return Err(IniFileError::Empty(path.to_owned()));
        }

        self.parse_bytes(&source, options)?;

        Ok(())
    }

    /// Returns the value at the `path`, if any.
    pub fn get<P: AsRef<str>>(&self, path: P) -> Option<&IniValue> {
        self.entries.get(path.as_ref())
    }

    /// Returns `true` if the document contains a value at the `path`.
    pub fn contains<P: AsRef<str>>(&self, path: P) -> bool {
        self.get(path).is_some()
    }

    /// Returns the number of entries in the document.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all `(path, value)` entries in the document, in unspecified order.
    pub fn iter(&self) -> IniIter<'_> {
        IniIter(self.entries.iter())
    }

    /// Removes all entries, keeping the allocated storage for reuse.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Frees all entries and the storage.
    pub fn release(self) {}

    /// Prints all entries to stdout, one `path = value` per line.
    pub fn print(&self) {
        print!("{}", self);
    }

    pub(crate) fn report(&mut self, error: &IniError) {
        if let Some(reporter) = self.reporter.as_mut() {
            reporter(error);
        }
    }

    /// Adds the `value` at the `path` unless the `path` is already set.
    /// The document is not modified on error.
    pub(crate) fn try_insert(&mut self, path: String, value: IniValue) -> Result<(), IniErrorKind> {
        if self.entries.try_reserve(1).is_err() {
            return Err(IniErrorKind::OutOfMemory(path));
        }

        match self.entries.entry(path) {
            Entry::Occupied(entry) => Err(IniErrorKind::DuplicateKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }
}

/// Entries are written sorted by path.
impl Display for IniDocument {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(path, _)| *path);

        for (path, value) in entries {
            writeln!(f, "{} = {}", path, value)?;
        }

        Ok(())
    }
}

impl Debug for IniDocument {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("IniDocument")
            .field("delimiter", &self.delimiter)
            .field("entries", &self.entries)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

/// Iterator over the `(path, value)` entries of an [`.ini document`](struct.IniDocument.html).
pub struct IniIter<'a>(HashMapIter<'a, String, IniValue>);

impl<'a> Iterator for IniIter<'a> {
    type Item = (&'a str, &'a IniValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(path, value)| (path.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoIterator for &'a IniDocument {
    type Item = (&'a str, &'a IniValue);
    type IntoIter = IniIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
