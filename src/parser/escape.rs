use {super::cursor::Cursor, crate::IniErrorKind};

/// Maximum number of hexadecimal digits in a `\u` escape sequence.
const MAX_UTF16_ESCAPE_HEX_DIGITS: usize = 4;
/// Maximum number of hexadecimal digits in a `\U` escape sequence.
const MAX_UNICODE_ESCAPE_HEX_DIGITS: usize = 8;

fn try_byte_to_hex_digit(c: u8) -> Option<u32> {
    let digit = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => return None,
    };

    Some(digit as u32)
}

fn is_high_surrogate(unit: u32) -> bool {
    (unit & 0xfc00) == 0xd800
}

fn is_low_surrogate(unit: u32) -> bool {
    (unit & 0xfc00) == 0xdc00
}

fn combine_surrogates(high: u16, low: u32) -> u32 {
    (((high as u32) & 0x3ff) << 10) + (low & 0x3ff) + 0x10000
}

/// Consumes up to `max_digits` hexadecimal digits following the current byte
/// and returns their value.
/// Stops at the first non-hexadecimal byte, which is left unconsumed;
/// no digits at all read as `0`.
fn read_hex_digits(cursor: &mut Cursor<'_>, max_digits: usize) -> u32 {
    let mut result = 0;

    for _ in 0..max_digits {
        match cursor.peek(1).and_then(try_byte_to_hex_digit) {
            Some(digit) => {
                cursor.bump();
                result = (result << 4) | digit;
            }
            None => break,
        }
    }

    result
}

/// Largest code point the four byte UTF-8 form can hold.
const MAX_ENCODABLE_CODE_POINT: u32 = 0x1f_ffff;

/// Appends the UTF-8 form of `code_point`, chosen by its range only.
///
/// Surrogates and code points above `U+10FFFF` are encoded as is,
/// so the result is not necessarily valid UTF-8.
fn push_code_point(value: &mut Vec<u8>, code_point: u32) -> Result<(), IniErrorKind> {
    let continuation = |shift: u32| 0x80 | ((code_point >> shift) & 0x3f) as u8;

    match code_point {
        0 => return Err(IniErrorKind::InvalidUnicodeEscape),
        0x1..=0x7f => value.push(code_point as u8),
        0x80..=0x7ff => {
            value.extend_from_slice(&[0xc0 | (code_point >> 6) as u8, continuation(0)])
        }
        0x800..=0xffff => value.extend_from_slice(&[
            0xe0 | (code_point >> 12) as u8,
            continuation(6),
            continuation(0),
        ]),
        0x1_0000..=MAX_ENCODABLE_CODE_POINT => value.extend_from_slice(&[
            0xf0 | (code_point >> 18) as u8,
            continuation(12),
            continuation(6),
            continuation(0),
        ]),
        _ => return Err(IniErrorKind::InvalidUnicodeEscape),
    }

    Ok(())
}

fn push_char(value: &mut Vec<u8>, c: char) {
    let mut buffer = [0; 4];
    value.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
}

/// Processes a UTF-16 code unit from a `\u` escape sequence.
///
/// High surrogates are stored in `pending` until the following low surrogate arrives.
fn push_utf16_unit(
    value: &mut Vec<u8>,
    pending: &mut Option<u16>,
    unit: u32,
) -> Result<(), IniErrorKind> {
    use IniErrorKind::*;

    if unit == 0 {
        return Err(InvalidUtf16Escape);
    }

    let code_point = match pending.take() {
        Some(high) => {
            if !is_low_surrogate(unit) {
                return Err(ExpectedLowSurrogate);
            }
            combine_surrogates(high, unit)
        }
        None => {
            if is_high_surrogate(unit) {
                *pending = Some(unit as u16);
                return Ok(());
            } else if is_low_surrogate(unit) {
                return Err(ExpectedHighSurrogate);
            }
            unit
        }
    };

    push_char(
        value,
        std::char::from_u32(code_point).ok_or(InvalidUtf16Escape)?,
    );

    Ok(())
}

/// Decodes the escape sequence starting at the backslash under the `cursor`
/// and appends its expansion to `value`.
///
/// Leaves the `cursor` on the last byte of the escape sequence.
/// `pending` holds the high UTF-16 surrogate of an incomplete `\u` surrogate pair, if any;
/// any escape sequence other than `\u` completing the pair is an error.
pub(super) fn decode_escape(
    cursor: &mut Cursor<'_>,
    value: &mut Vec<u8>,
    pending: &mut Option<u16>,
) -> Result<(), IniErrorKind> {
    use IniErrorKind::*;

    debug_assert_eq!(cursor.current(), Some(b'\\'));

    let c = cursor.bump().ok_or(UnexpectedEndOfInputInEscapeSequence)?;

    if pending.is_some() && c != b'u' {
        *pending = None;
        return Err(ExpectedLowSurrogate);
    }

    match c {
        b'"' => value.push(b'"'),
        // Passed through as is.
        b'0' => value.extend_from_slice(b"\\0"),
        b'b' => value.push(b'\x08'),
        b't' => value.push(b'\t'),
        b'r' => value.push(b'\r'),
        b'n' => value.push(b'\n'),
        b'u' => {
            let unit = read_hex_digits(cursor, MAX_UTF16_ESCAPE_HEX_DIGITS);
            push_utf16_unit(value, pending, unit)?;
        }
        b'U' => {
            let code_point = read_hex_digits(cursor, MAX_UNICODE_ESCAPE_HEX_DIGITS);
            push_code_point(value, code_point)?;
        }
        c => value.push(c),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*};

    /// Decodes all escape sequences in `src`, which must consist of escape sequences only.
    fn decode(src: &str) -> Result<Vec<u8>, IniErrorKind> {
        let mut cursor = Cursor::new(src.as_bytes());
        let mut value = Vec::new();
        let mut pending = None;

        while cursor.current().is_some() {
            decode_escape(&mut cursor, &mut value, &mut pending)?;
            cursor.bump();
        }

        if pending.is_some() {
            return Err(IniErrorKind::ExpectedLowSurrogate);
        }

        Ok(value)
    }

    #[test]
    fn try_byte_to_hex_digit_test() {
        assert_eq!(try_byte_to_hex_digit(b'0'), Some(0));
        assert_eq!(try_byte_to_hex_digit(b'9'), Some(9));
        assert_eq!(try_byte_to_hex_digit(b'a'), Some(10));
        assert_eq!(try_byte_to_hex_digit(b'F'), Some(15));
        assert_eq!(try_byte_to_hex_digit(b'g'), None);
        assert_eq!(try_byte_to_hex_digit(b' '), None);
    }

    #[test]
    fn single_character_escapes() {
        assert_eq!(decode("\\\"").unwrap(), b"\"");
        assert_eq!(decode("\\0").unwrap(), b"\\0");
        assert_eq!(decode("\\b").unwrap(), b"\x08");
        assert_eq!(decode("\\t").unwrap(), b"\t");
        assert_eq!(decode("\\r").unwrap(), b"\r");
        assert_eq!(decode("\\n").unwrap(), b"\n");

        // Identity escapes.
        assert_eq!(decode("\\\\").unwrap(), b"\\");
        assert_eq!(decode("\\=").unwrap(), b"=");
        assert_eq!(decode("\\a").unwrap(), b"a");
        assert_eq!(decode("\\ ").unwrap(), b" ");
    }

    #[test]
    fn utf16_escapes() {
        let parse_unicode = |src: &str, res: &str| {
            assert_eq!(decode(src).unwrap(), res.as_bytes());
        };

        parse_unicode("\\u0020", " ");
        parse_unicode("\\u0024", "$");
        parse_unicode("\\u002c", ",");
        parse_unicode("\\u00b5", "µ");
        parse_unicode("\\u00E9", "é");
        parse_unicode("\\u017D", "Ž");
        parse_unicode("\\u2030", "‰");

        // Surrogate pairs.
        parse_unicode("\\uD83C\\uDFE9", "🏩");
        parse_unicode("\\ud83d\\ude39", "😹");
    }

    #[test]
    fn truncated_hex_digits() {
        let mut cursor = Cursor::new(b"\\u41x");
        let mut value = Vec::new();
        let mut pending = None;

        decode_escape(&mut cursor, &mut value, &mut pending).unwrap();
        assert_eq!(value, b"A");
        // The non-hex byte is not consumed.
        assert_eq!(cursor.peek(1), Some(b'x'));

        assert_eq!(decode("\\U1F3E9").unwrap(), "🏩".as_bytes());
    }

    #[test]
    fn invalid_escapes() {
        use IniErrorKind::*;

        assert_eq!(decode("\\u"), Err(InvalidUtf16Escape));
        assert_eq!(decode("\\u0000"), Err(InvalidUtf16Escape));
        assert_eq!(decode("\\U"), Err(InvalidUnicodeEscape));
        assert_eq!(decode("\\U00000000"), Err(InvalidUnicodeEscape));
        assert_eq!(decode("\\U00200000"), Err(InvalidUnicodeEscape));
        assert_eq!(decode("\\UFFFFFFFF"), Err(InvalidUnicodeEscape));
        assert_eq!(decode("\\"), Err(UnexpectedEndOfInputInEscapeSequence));
    }

    #[test]
    fn unicode_escapes_are_encoded_by_range() {
        assert_eq!(decode("\\U41").unwrap(), b"A");
        assert_eq!(decode("\\U7FF").unwrap(), b"\xdf\xbf");
        assert_eq!(decode("\\U0000D800").unwrap(), b"\xed\xa0\x80");
        assert_eq!(decode("\\U0000DFFF").unwrap(), b"\xed\xbf\xbf");
        assert_eq!(decode("\\U00110000").unwrap(), b"\xf4\x90\x80\x80");
        assert_eq!(decode("\\U001FFFFF").unwrap(), b"\xf7\xbf\xbf\xbf");
    }

    #[test]
    fn surrogate_pairing() {
        use IniErrorKind::*;

        // Lone low surrogate.
        assert_eq!(decode("\\uDC00"), Err(ExpectedHighSurrogate));
        // High surrogate followed by a non-surrogate.
        assert_eq!(decode("\\uD800\\u0041"), Err(ExpectedLowSurrogate));
        // High surrogate followed by another high surrogate.
        assert_eq!(decode("\\uD800\\uD800"), Err(ExpectedLowSurrogate));
        // High surrogate followed by a different escape.
        assert_eq!(decode("\\uD800\\n"), Err(ExpectedLowSurrogate));
        // Lone high surrogate.
        assert_eq!(decode("\\uD800"), Err(ExpectedLowSurrogate));
    }

    proptest! {
        #[test]
        fn unicode_escape_round_trip(c in any::<char>().prop_filter("non-zero", |c| *c != '\0')) {
            let src = format!("\\U{:08X}", c as u32);
            let mut expected = [0; 4];

            prop_assert_eq!(decode(&src).unwrap(), c.encode_utf8(&mut expected).as_bytes());
        }

        #[test]
        fn surrogate_pair_round_trip(c in (0x10000u32..=0x10ffff).prop_filter_map("scalar value", std::char::from_u32)) {
            let mut units = [0; 2];
            let units = c.encode_utf16(&mut units);
            let src = format!("\\u{:04x}\\u{:04x}", units[0], units[1]);
            let mut expected = [0; 4];

            prop_assert_eq!(decode(&src).unwrap(), c.encode_utf8(&mut expected).as_bytes());
        }
    }
}
