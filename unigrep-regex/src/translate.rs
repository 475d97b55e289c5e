/// Translate a POSIX basic regular expression into the extended syntax
/// that the matcher accepts.
///
/// In basic syntax, `+`, `?`, `|`, `(`, `)`, `{` and `}` are ordinary
/// characters, and their operator forms are spelled with a leading
/// backslash. The translation therefore swaps the escaping of those
/// characters in both directions. Everything else, including `*`, `.`,
/// `[...]` and the anchors, carries over unchanged.
pub fn translate_basic(pattern: &str) -> String {
    fn is_swapped(c: char) -> bool {
        matches!(c, '+' | '?' | '|' | '(' | ')' | '{' | '}')
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(c) if is_swapped(c) => out.push(c),
                Some(c) => {
                    out.push('\\');
                    out.push(c);
                }
                None => out.push('\\'),
            },
            c if is_swapped(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::translate_basic;

    #[test]
    fn swaps_operators() {
        assert_eq!(translate_basic(r"a\(b\)c"), "a(b)c");
        assert_eq!(translate_basic(r"a(b)c"), r"a\(b\)c");
        assert_eq!(translate_basic(r"a\{1,2\}"), "a{1,2}");
        assert_eq!(translate_basic(r"a{b}"), r"a\{b\}");
        assert_eq!(translate_basic(r"a\+"), "a+");
        assert_eq!(translate_basic(r"a+b?"), r"a\+b\?");
        assert_eq!(translate_basic(r"a\|b"), "a|b");
    }

    #[test]
    fn leaves_the_rest_alone() {
        assert_eq!(translate_basic(r"^a.*b$"), r"^a.*b$");
        assert_eq!(translate_basic(r"[a-z]\."), r"[a-z]\.");
        assert_eq!(translate_basic(r"a\\b"), r"a\\b");
    }
}
