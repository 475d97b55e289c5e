use std::fmt;

/// A single ANSI SGR sequence, stored in its fully rendered form (that
/// is, `ESC [ body m`), or nothing at all.
///
/// The printers write these sequences verbatim, but only when the
/// underlying writer reports color support.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sgr(Vec<u8>);

/// The sequence that turns all attributes off.
pub const SGR_OFF: &[u8] = b"\x1b[0m";

impl Sgr {
    /// Create a sequence from an SGR body such as `01;31`.
    ///
    /// The body must consist of digits and `;` only; anything else
    /// produces an empty (disabled) sequence.
    pub fn from_body(body: &str) -> Sgr {
        if body.is_empty()
            || !body.bytes().all(|b| b.is_ascii_digit() || b == b';')
        {
            return Sgr(vec![]);
        }
        let mut seq = Vec::with_capacity(body.len() + 3);
        seq.extend_from_slice(b"\x1b[");
        seq.extend_from_slice(body.as_bytes());
        seq.push(b'm');
        Sgr(seq)
    }

    /// Returns true if and only if this sequence is empty, i.e., no
    /// styling is requested.
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// The rendered escape sequence. Empty when `is_none` is true.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Sgr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A parsed set of color declarations for every styled piece of output.
///
/// The declaration format is the one used by the `GREP_COLORS`
/// environment variable: `key=val[;val...]` fields joined by `:`, where
/// each value is an SGR parameter. Recognized keys:
///
/// * `sl` - selected lines
/// * `cx` - context lines
/// * `mt` - matching text in any line
/// * `ms` - matching text in a selected line (inherits `mt` when absent)
/// * `mc` - matching text in a context line (inherits `mt` when absent)
/// * `fn` - file names
/// * `ln` - line numbers
/// * `cn` - column numbers
/// * `bn` - byte offsets
/// * `se` - separators
/// * `rv` - a flag requesting that `sl`/`cx` swap when inverting
///
/// Unrecognized keys and malformed values are ignored, which mirrors how
/// grep treats `GREP_COLORS`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ColorSpecs {
    sl: Sgr,
    cx: Sgr,
    mt: Sgr,
    ms: Sgr,
    mc: Sgr,
    path: Sgr,
    line: Sgr,
    column: Sgr,
    byte_offset: Sgr,
    separator: Sgr,
    reverse_video: bool,
}

impl ColorSpecs {
    /// Parse a `GREP_COLORS` style declaration string.
    ///
    /// Inheritance of `mt` into absent `ms`/`mc` is applied here.
    pub fn from_grep_colors(s: &str) -> ColorSpecs {
        let mut specs = ColorSpecs::default();
        for field in s.split(':') {
            let (key, val) = match field.find('=') {
                Some(i) => (&field[..i], &field[i + 1..]),
                None => {
                    if field == "rv" {
                        specs.reverse_video = true;
                    }
                    continue;
                }
            };
            let sgr = Sgr::from_body(val);
            match key {
                "sl" => specs.sl = sgr,
                "cx" => specs.cx = sgr,
                "mt" => specs.mt = sgr,
                "ms" => specs.ms = sgr,
                "mc" => specs.mc = sgr,
                "fn" => specs.path = sgr,
                "ln" => specs.line = sgr,
                "cn" => specs.column = sgr,
                "bn" => specs.byte_offset = sgr,
                "se" => specs.separator = sgr,
                _ => {}
            }
        }
        specs.inherit();
        specs
    }

    /// The default colors, matching what grep uses when `GREP_COLORS` is
    /// not set.
    pub fn default_colors() -> ColorSpecs {
        ColorSpecs::from_grep_colors("ms=01;31:mc=01;31:fn=35:ln=32:cn=32:bn=32:se=36")
    }

    /// Fill in absent `ms`/`mc` from `mt`.
    fn inherit(&mut self) {
        if self.ms.is_none() {
            self.ms = self.mt.clone();
        }
        if self.mc.is_none() {
            self.mc = self.mt.clone();
        }
    }

    /// Swap the selected line and context line colors. Callers apply
    /// this when inversion is in effect and `rv` was declared.
    pub fn swap_line_colors(&mut self) {
        std::mem::swap(&mut self.sl, &mut self.cx);
    }

    /// Whether `rv` was declared.
    pub fn reverse_video(&self) -> bool {
        self.reverse_video
    }

    /// The color of a selected line's non-matching text.
    pub fn selected_line(&self) -> &Sgr {
        &self.sl
    }

    /// The color of a context line's non-matching text.
    pub fn context_line(&self) -> &Sgr {
        &self.cx
    }

    /// The color of matching text within a selected line.
    pub fn matched_selected(&self) -> &Sgr {
        &self.ms
    }

    /// The color of matching text within a context line.
    pub fn matched_context(&self) -> &Sgr {
        &self.mc
    }

    /// The color of file names.
    pub fn path(&self) -> &Sgr {
        &self.path
    }

    /// The color of line numbers.
    pub fn line(&self) -> &Sgr {
        &self.line
    }

    /// The color of column numbers.
    pub fn column(&self) -> &Sgr {
        &self.column
    }

    /// The color of byte offsets.
    pub fn byte_offset(&self) -> &Sgr {
        &self.byte_offset
    }

    /// The color of field separators.
    pub fn separator(&self) -> &Sgr {
        &self.separator
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorSpecs, Sgr};

    #[test]
    fn sgr_rendering() {
        assert_eq!(Sgr::from_body("01;31").as_bytes(), b"\x1b[01;31m");
        assert_eq!(Sgr::from_body("7").as_bytes(), b"\x1b[7m");
        assert!(Sgr::from_body("").is_none());
        assert!(Sgr::from_body("bold").is_none());
    }

    #[test]
    fn parses_fields() {
        let specs = ColorSpecs::from_grep_colors("ms=01;31:fn=35:se=36");
        assert_eq!(specs.matched_selected().as_bytes(), b"\x1b[01;31m");
        assert_eq!(specs.path().as_bytes(), b"\x1b[35m");
        assert_eq!(specs.separator().as_bytes(), b"\x1b[36m");
        assert!(specs.selected_line().is_none());
        assert!(!specs.reverse_video());
    }

    #[test]
    fn mt_inherits_into_ms_and_mc() {
        let specs = ColorSpecs::from_grep_colors("mt=01;31");
        assert_eq!(specs.matched_selected().as_bytes(), b"\x1b[01;31m");
        assert_eq!(specs.matched_context().as_bytes(), b"\x1b[01;31m");

        // Explicit ms wins over mt.
        let specs = ColorSpecs::from_grep_colors("mt=01;31:ms=4");
        assert_eq!(specs.matched_selected().as_bytes(), b"\x1b[4m");
        assert_eq!(specs.matched_context().as_bytes(), b"\x1b[01;31m");
    }

    #[test]
    fn reverse_video_swaps() {
        let mut specs = ColorSpecs::from_grep_colors("sl=1:cx=2:rv");
        assert!(specs.reverse_video());
        assert_eq!(specs.selected_line().as_bytes(), b"\x1b[1m");
        specs.swap_line_colors();
        assert_eq!(specs.selected_line().as_bytes(), b"\x1b[2m");
        assert_eq!(specs.context_line().as_bytes(), b"\x1b[1m");
    }

    #[test]
    fn unknown_keys_ignored() {
        let specs = ColorSpecs::from_grep_colors("zz=01:ms=31:what");
        assert_eq!(specs.matched_selected().as_bytes(), b"\x1b[31m");
    }
}
