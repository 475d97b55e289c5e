use std::ffi::OsStr;
use std::str;

/// Escapes arbitrary bytes into a human readable string.
///
/// This converts `\t`, `\r` and `\n` into their escaped forms. It also
/// converts the non-printable subset of ASCII in addition to invalid
/// UTF-8 bytes to hexadecimal escape sequences. Everything else is left
/// as is.
///
/// The dual of this routine is [`unescape`].
///
/// # Example
///
/// This example shows how to convert a byte string that contains a `\n`
/// and invalid UTF-8 bytes into a `String`.
///
/// Pay special attention to the use of raw strings. That is, `r"\n"` is
/// equivalent to `"\\n"`.
///
/// ```
/// use unigrep_cli::escape;
///
/// assert_eq!(r"foo\nbar\xFFbaz", escape(b"foo\nbar\xFFbaz"));
/// ```
pub fn escape(mut bytes: &[u8]) -> String {
    let mut escaped = String::new();
    while let Some(result) = decode_utf8(bytes) {
        match result {
            Ok(cp) => {
                escape_char(cp, &mut escaped);
                bytes = &bytes[cp.len_utf8()..];
            }
            Err(byte) => {
                escape_byte(byte, &mut escaped);
                bytes = &bytes[1..];
            }
        }
    }
    escaped
}

/// Escapes an OS string into a human readable string.
///
/// This is like [`escape`], but accepts an OS string.
pub fn escape_os(string: &OsStr) -> String {
    #[cfg(unix)]
    fn imp(string: &OsStr) -> String {
        use std::os::unix::ffi::OsStrExt;

        escape(string.as_bytes())
    }

    #[cfg(not(unix))]
    fn imp(string: &OsStr) -> String {
        escape(string.to_string_lossy().as_bytes())
    }

    imp(string)
}

/// Unescapes a string.
///
/// It supports a limited set of escape sequences:
///
/// * `\t`, `\r` and `\n` are mapped to their corresponding ASCII bytes.
/// * `\xZZ` hexadecimal escapes are mapped to their byte.
///
/// Everything else is left as is, including non-hexadecimal escapes like
/// `\xGG`.
///
/// This is useful when it is desirable for a command line argument to be
/// capable of specifying arbitrary bytes or otherwise make it easier to
/// specify non-printable characters.
///
/// The dual of this routine is [`escape`].
///
/// # Example
///
/// ```
/// use unigrep_cli::unescape;
///
/// assert_eq!(&b"foo\nbar\xFFbaz"[..], &*unescape(r"foo\nbar\xFFbaz"));
/// ```
pub fn unescape(s: &str) -> Vec<u8> {
    let chars: Vec<char> = s.chars().collect();
    let mut bytes = vec![];
    let mut utf8 = [0u8; 4];
    let mut push_char =
        |bytes: &mut Vec<u8>, c: char| match c.len_utf8() {
            1 => bytes.push(c as u8),
            _ => bytes
                .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes()),
        };

    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            push_char(&mut bytes, chars[i]);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            // A trailing backslash is itself.
            None => {
                bytes.push(b'\\');
                i += 1;
            }
            Some('n') => {
                bytes.push(b'\n');
                i += 2;
            }
            Some('r') => {
                bytes.push(b'\r');
                i += 2;
            }
            Some('t') => {
                bytes.push(b'\t');
                i += 2;
            }
            Some('\\') => {
                bytes.push(b'\\');
                i += 2;
            }
            Some('x') => match hex_pair(&chars, i + 2) {
                Some(byte) => {
                    bytes.push(byte);
                    i += 4;
                }
                None => {
                    // Not a two digit escape: keep the `\x` verbatim
                    // and let the following characters speak for
                    // themselves.
                    bytes.extend_from_slice(b"\\x");
                    i += 2;
                }
            },
            Some(&other) => {
                // An unrecognized escape passes through untouched.
                bytes.push(b'\\');
                push_char(&mut bytes, other);
                i += 2;
            }
        }
    }
    bytes
}

/// Decode two hexadecimal digits starting at `at`, if both are present
/// and valid.
fn hex_pair(chars: &[char], at: usize) -> Option<u8> {
    let hi = chars.get(at)?.to_digit(16)?;
    let lo = chars.get(at + 1)?.to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Unescapes an OS string.
///
/// This is like [`unescape`], but accepts an OS string.
///
/// Note that this first lossily decodes the given OS string as UTF-8.
/// That is, an escaped string (the thing given) should be valid UTF-8.
pub fn unescape_os(string: &OsStr) -> Vec<u8> {
    unescape(&string.to_string_lossy())
}

/// Adds the given codepoint to the given string, escaping it if
/// necessary.
fn escape_char(cp: char, into: &mut String) {
    if cp.is_ascii() {
        escape_byte(cp as u8, into);
    } else {
        into.push(cp);
    }
}

/// Adds the given byte to the given string, escaping it if necessary.
fn escape_byte(byte: u8, into: &mut String) {
    match byte {
        0x21..=0x5B | 0x5D..=0x7D => into.push(byte as char),
        b'\n' => into.push_str(r"\n"),
        b'\r' => into.push_str(r"\r"),
        b'\t' => into.push_str(r"\t"),
        b'\\' => into.push_str(r"\\"),
        _ => into.push_str(&format!(r"\x{:02X}", byte)),
    }
}

/// Decodes the next UTF-8 encoded codepoint from the given byte slice.
///
/// If no valid encoding of a codepoint exists at the beginning of the
/// given byte slice, then the first byte is returned instead.
///
/// This returns `None` if and only if `bytes` is empty.
fn decode_utf8(bytes: &[u8]) -> Option<Result<char, u8>> {
    if bytes.is_empty() {
        return None;
    }
    let len = match utf8_len(bytes[0]) {
        None => return Some(Err(bytes[0])),
        Some(len) if len > bytes.len() => return Some(Err(bytes[0])),
        Some(len) => len,
    };
    match str::from_utf8(&bytes[..len]) {
        Ok(s) => Some(Ok(s.chars().next().unwrap())),
        Err(_) => Some(Err(bytes[0])),
    }
}

/// Given a UTF-8 leading byte, this returns the total number of code
/// units in the following encoded codepoint.
///
/// If the given byte is not a valid UTF-8 leading byte, then this
/// returns `None`.
fn utf8_len(byte: u8) -> Option<usize> {
    if byte <= 0x7F {
        Some(1)
    } else if byte <= 0b1011_1111 {
        None
    } else if byte <= 0b1101_1111 {
        Some(2)
    } else if byte <= 0b1110_1111 {
        Some(3)
    } else if byte <= 0b1111_0111 {
        Some(4)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{escape, unescape};

    fn b(bytes: &'static [u8]) -> Vec<u8> {
        bytes.to_vec()
    }

    #[test]
    fn empty() {
        assert_eq!(b(b""), unescape(r""));
        assert_eq!(r"", escape(b""));
    }

    #[test]
    fn backslash() {
        assert_eq!(b(b"\\"), unescape(r"\\"));
        assert_eq!(r"\\", escape(b"\\"));
    }

    #[test]
    fn nul() {
        assert_eq!(b(b"\x00"), unescape(r"\x00"));
        assert_eq!(r"\x00", escape(b"\x00"));
    }

    #[test]
    fn nl() {
        assert_eq!(b(b"\n"), unescape(r"\n"));
        assert_eq!(r"\n", escape(b"\n"));
    }

    #[test]
    fn roundtrip_mixed() {
        let original = b"a\xFFz\n";
        assert_eq!(b(original), unescape(&escape(original)));
    }

    #[test]
    fn trailing_incomplete() {
        assert_eq!(b(b"\\"), unescape(r"\"));
        assert_eq!(b(b"\\x"), unescape(r"\x"));
        assert_eq!(b(b"\\xA"), unescape(r"\xA"));
    }
}
