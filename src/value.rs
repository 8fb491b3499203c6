use std::fmt::{Display, Formatter};

/// Represents a value stored in an [`.ini document`](struct.IniDocument.html).
///
/// Values are owned byte strings and never borrow from the parsed source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum IniValue {
    /// A key without a key-value separator, allowed by
    /// [`EMPTY_KEYS`](struct.IniOptions.html#associatedconstant.EMPTY_KEYS).
    Valueless,
    /// A (maybe empty) decoded value.
    Bytes(Box<[u8]>),
}

impl IniValue {
    /// Returns the value bytes. Empty for [`Valueless`](#variant.Valueless) values.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IniValue::Valueless => &[],
            IniValue::Bytes(bytes) => bytes,
        }
    }

    /// Returns the value as a string slice if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn is_valueless(&self) -> bool {
        matches!(self, IniValue::Valueless)
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for IniValue {
    fn from(bytes: Vec<u8>) -> Self {
        IniValue::Bytes(bytes.into_boxed_slice())
    }
}

impl AsRef<[u8]> for IniValue {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Display for IniValue {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        String::from_utf8_lossy(self.as_bytes()).fmt(f)
    }
}
