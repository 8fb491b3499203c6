#![allow(non_upper_case_globals)]

use bitflags::bitflags;

bitflags! {
    /// Configuration options for the `.ini` parser.
    ///
    /// Every option is disabled by default (see [`empty`](#method.empty)).
    #[derive(Default)]
    pub struct IniOptions: u8 {
        /// Whether escape sequences (a character sequence following a backslash (`'\'`))
        /// in values are supported.
        /// If set, the following escape sequences are supported:
        ///     `'\"'` (double quotes),
        ///     `'\0'` (kept as the two characters `\` and `0`, NOT a null character),
        ///     `'\b'` (backspace),
        ///     `'\t'` (horizontal tab),
        ///     `'\r'` (carriage return),
        ///     `'\n'` (new line / line feed),
        ///     `'\u????'` (up to 4 hexadecimal digits) (UTF-16 code unit, surrogate pairs are combined),
        ///     `'\U????????'` (up to 8 hexadecimal digits) (Unicode code point).
        /// Any other character following a backslash is taken literally.
        /// A backslash followed by a new line is a line continuation
        /// in section names, keys, values and comments.
        /// If not set, backslash (`'\'`) is treated as a normal character.
        const ESCAPING = 0b0001;
        /// Whether values enclosed in double quotes (`'"'`) are supported.
        /// Quoted values may span multiple lines.
        /// If not set, a leading double quote is a normal value character.
        const QUOTED_STRINGS = 0b0010;
        /// Whether keys with empty values (`key =`) are allowed.
        const EMPTY_VALUES = 0b0100;
        /// Whether keys without a key-value separator (a lone `key` line) are allowed.
        /// Such keys are stored as [`valueless`](enum.IniValue.html#variant.Valueless).
        const EMPTY_KEYS = 0b1000;
    }
}

impl IniOptions {
    pub(crate) fn escaping(self) -> bool {
        self.contains(IniOptions::ESCAPING)
    }

    pub(crate) fn quoted_strings(self) -> bool {
        self.contains(IniOptions::QUOTED_STRINGS)
    }

    pub(crate) fn empty_values(self) -> bool {
        self.contains(IniOptions::EMPTY_VALUES)
    }

    pub(crate) fn empty_keys(self) -> bool {
        self.contains(IniOptions::EMPTY_KEYS)
    }
}
