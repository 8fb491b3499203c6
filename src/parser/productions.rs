use {
    super::{
        cursor::{is_space, Position},
        escape::decode_escape,
        ParseState, MAX_NAME_LEN,
    },
    crate::*,
    std::mem,
    tracing::trace,
};

/// Returns `true` if the `name` contains the UTF-8 encoding of the `delimiter`.
fn contains_delimiter(name: &[u8], delimiter: char) -> bool {
    let mut buffer = [0; 4];
    let delimiter = delimiter.encode_utf8(&mut buffer).as_bytes();

    name.windows(delimiter.len()).any(|window| window == delimiter)
}

/// Composes the `section + delimiter + key` document path.
/// Returns `None` if the allocation fails.
fn compose_path(section: &str, delimiter: char, key: &str) -> Option<String> {
    let mut path = String::new();
    path.try_reserve_exact(section.len() + delimiter.len_utf8() + key.len())
        .ok()?;

    path.push_str(section);
    path.push(delimiter);
    path.push_str(key);

    Some(path)
}

impl<'s> ParseState<'s> {
    /// Parses a `[section]` header at the cursor and makes it the current section.
    pub(super) fn parse_section(&mut self) -> Result<(), IniError> {
        use IniErrorKind::*;

        debug_assert_eq!(self.cursor.current(), Some(b'['));

        let before = self.cursor.position();
        let mut line = self.cursor.line();
        let mut has_whitespace = false;
        self.name.clear();

        let mut c = self.cursor.advance(false);

        while let Some(ch) = c {
            if ch == b']' || self.cursor.line() != line {
                break;
            }

            if self.options.escaping() && self.cursor.line_continuation() {
                line = self.cursor.line();
                c = self.cursor.current();
                continue;
            }

            if is_space(ch) {
                has_whitespace = true;
            } else {
                self.name.push(ch);
            }

            c = self.cursor.advance(false);
        }

        if c != Some(b']') {
            return Err(self.cursor.error_at(before, UnterminatedSection));
        }

        // Skip the closing `]`.
        self.cursor.bump();

        if self.cursor.line() != line {
            return Err(self.cursor.error_at(before, NewLineInSectionName));
        }

        if has_whitespace {
            return Err(self.cursor.error(WhitespaceInSectionName));
        }

        if self.name.len() > MAX_NAME_LEN {
            return Err(self.cursor.error(SectionNameTooLong));
        }

        if self.name.is_empty() {
            return Err(self.cursor.error(EmptySectionName));
        }

        match std::str::from_utf8(&self.name) {
            Ok(section) => {
                self.section.clear();
                self.section.push_str(section);
            }
            Err(_) => return Err(self.cursor.error(InvalidUtf8InSectionName)),
        }

        trace!(section = %self.section, "entering section");

        Ok(())
    }

    /// Skips a `;` / `#` comment at the cursor.
    pub(super) fn parse_comment(&mut self) {
        debug_assert!(matches!(self.cursor.current(), Some(b';') | Some(b'#')));

        self.skip_line();
    }

    /// Skips the rest of the logical line, following line continuations.
    fn skip_line(&mut self) {
        let mut line = self.cursor.line();
        let mut c = self.cursor.current();

        while c.is_some() && self.cursor.line() == line {
            if self.options.escaping() && self.cursor.line_continuation() {
                line = self.cursor.line();
                c = self.cursor.current();
                continue;
            }

            c = self.cursor.advance(false);
        }
    }

    /// Parses a key at the cursor, followed by its value, if any,
    /// and adds the entry to the `document`.
    pub(super) fn parse_key(&mut self, document: &mut IniDocument) -> Result<(), IniError> {
        use IniErrorKind::*;

        let before = self.cursor.position();
        let mut line = self.cursor.line();
        // Whether whitespace was encountered after the last key character.
        let mut trailing_whitespace = false;
        let mut has_whitespace = false;
        self.name.clear();

        let mut c = self.cursor.current();

        while let Some(ch) = c {
            if ch == b'=' || self.cursor.line() != line {
                break;
            }

            if self.options.escaping() && self.cursor.line_continuation() {
                line = self.cursor.line();
                c = self.cursor.current();
                continue;
            }

            if is_space(ch) {
                trailing_whitespace = true;
            } else {
                if trailing_whitespace {
                    has_whitespace = true;
                    trailing_whitespace = false;
                }
                self.name.push(ch);
            }

            c = self.cursor.advance(false);
        }

        let at_separator = c == Some(b'=') && self.cursor.line() == line;

        if !at_separator {
            // The separator starts the next line.
            if self.cursor.line() != line && self.cursor.next_on_line_is(b'=') {
                let error = self.cursor.error_at(before, NewLineInKey);
                self.cursor.settle(true);
                self.skip_value();
                return Err(error);
            }

            if !self.options.empty_keys() {
                return Err(self.cursor.error_at(before, UnterminatedKey));
            }
        }

        let error = if has_whitespace {
            Some(self.cursor.error_at(before, WhitespaceInKey))
        } else if contains_delimiter(&self.name, self.delimiter) {
            Some(self.cursor.error(InvalidCharacterInKey(self.delimiter)))
        } else if self.name.len() > MAX_NAME_LEN {
            Some(self.cursor.error(KeyTooLong))
        } else if self.name.is_empty() {
            Some(self.cursor.error(EmptyKey))
        } else {
            match std::str::from_utf8(&self.name) {
                Ok(key) => {
                    self.key.clear();
                    self.key.push_str(key);
                    None
                }
                Err(_) => Some(self.cursor.error(InvalidUtf8InKey)),
            }
        };

        if let Some(error) = error {
            if at_separator {
                self.skip_value();
            }
            return Err(error);
        }

        if at_separator {
            self.parse_value(document)
        } else {
            self.commit(document, before, IniValue::Valueless)
        }
    }

    /// Parses the value following the key-value separator at the cursor
    /// and adds the entry to the `document`.
    fn parse_value(&mut self, document: &mut IniDocument) -> Result<(), IniError> {
        let before = self.cursor.position();

        self.scan_value(before)?;

        if self.value.is_empty() && !self.options.empty_values() {
            return Err(self.cursor.error_at(before, IniErrorKind::EmptyValue));
        }

        let value = IniValue::from(mem::take(&mut self.value));
        self.commit(document, before, value)
    }

    /// Scans past the value following the key-value separator at the cursor without storing it.
    fn skip_value(&mut self) {
        let before = self.cursor.position();

        // Errors in the value are not reported; the construct already failed.
        let _ = self.scan_value(before);
        self.value.clear();
    }

    /// Accumulates the decoded value following the key-value separator at the cursor.
    ///
    /// On return the cursor is past the value: at the start of the next line for unquoted values,
    /// right after the closing quote for quoted values, or at the end of input.
    /// Escape sequence errors do not stop the scan; the first one is returned once the value ends.
    fn scan_value(&mut self, before: Position) -> Result<(), IniError> {
        use IniErrorKind::*;

        debug_assert_eq!(self.cursor.current(), Some(b'='));

        self.value.clear();
        self.utf16_hi = None;

        let escaping = self.options.escaping();
        let mut line = self.cursor.line();
        let mut started = false;
        let mut quoted = false;
        let mut closed = false;
        // Length of the unquoted value without trailing unescaped whitespace.
        let mut trimmed_len = 0;
        let mut error = None;

        let mut c = self.cursor.advance(false);

        while let Some(ch) = c {
            let current_line = self.cursor.line();

            if current_line != line {
                if !quoted {
                    break;
                }

                if self.utf16_hi.take().is_some() {
                    error.get_or_insert_with(|| self.cursor.error(ExpectedLowSurrogate));
                }

                for _ in line..current_line {
                    self.value.push(b'\n');
                }
                line = current_line;
            }

            if quoted && ch == b'"' {
                closed = true;
                break;
            }

            if escaping && self.cursor.line_continuation() {
                line = self.cursor.line();
                c = self.cursor.current();
                continue;
            }

            if !started {
                if is_space(ch) {
                    c = self.cursor.advance(false);
                    continue;
                }

                started = true;

                if ch == b'"' && self.options.quoted_strings() {
                    quoted = true;
                    c = self.cursor.advance(false);
                    continue;
                }
            }

            if escaping && ch == b'\\' {
                if let Err(kind) =
                    decode_escape(&mut self.cursor, &mut self.value, &mut self.utf16_hi)
                {
                    error.get_or_insert_with(|| self.cursor.error(kind));
                }
                trimmed_len = self.value.len();
            } else {
                if self.utf16_hi.take().is_some() {
                    error.get_or_insert_with(|| self.cursor.error(ExpectedLowSurrogate));
                }

                self.value.push(ch);

                if quoted || !is_space(ch) {
                    trimmed_len = self.value.len();
                }
            }

            c = self.cursor.advance(false);
        }

        if quoted {
            if !closed {
                return Err(self.cursor.error_at(before, UnterminatedQuotedString));
            }

            // Skip the closing quote.
            self.cursor.bump();
        } else {
            self.value.truncate(trimmed_len);
        }

        if self.utf16_hi.take().is_some() {
            error.get_or_insert_with(|| self.cursor.error(ExpectedLowSurrogate));
        }

        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Adds the `value` at the path composed of the current section and key to the `document`.
    /// Errors are reported at `before`.
    fn commit(
        &mut self,
        document: &mut IniDocument,
        before: Position,
        value: IniValue,
    ) -> Result<(), IniError> {
        let path = match compose_path(&self.section, self.delimiter, &self.key) {
            Some(path) => path,
            None => {
                let path = format!("{}{}{}", self.section, self.delimiter, self.key);
                return Err(self
                    .cursor
                    .error_at(before, IniErrorKind::OutOfMemory(path)));
            }
        };

        document
            .try_insert(path, value)
            .map_err(|error| self.cursor.error_at(before, error))?;

        self.committed += 1;
        trace!(section = %self.section, key = %self.key, "committed entry");

        Ok(())
    }
}
