use std::io::{self, Write};

use termcolor::WriteColor;

use crate::color::{ColorSpecs, Sgr, SGR_OFF};

/// How a byte staged into the hex dumper should be colored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexMode {
    /// A byte belonging to a match in a selected line.
    Match,
    /// A byte belonging to the non-matching part of a selected line.
    Line,
    /// A byte belonging to a match shown in a context line.
    ContextMatch,
    /// A byte belonging to the non-matching part of a context line.
    ContextLine,
}

impl HexMode {
    fn color<'a>(&self, colors: &'a ColorSpecs) -> &'a Sgr {
        match *self {
            HexMode::Match => colors.matched_selected(),
            HexMode::Line => colors.selected_line(),
            HexMode::ContextMatch => colors.matched_context(),
            HexMode::ContextLine => colors.context_line(),
        }
    }
}

/// A staging buffer for hex output.
///
/// Bytes are staged into a sixteen slot row keyed by their absolute
/// offset; a row is written out whenever the cursor crosses a sixteen
/// byte boundary, when the staged offsets become discontiguous, or when
/// the caller signals the end of a dump. Each slot remembers the mode of
/// its byte so that matches stay highlighted in the rendered rows.
#[derive(Clone, Debug)]
pub struct HexDumper {
    /// Staged `(mode, byte)` pairs; `None` marks an empty slot, which
    /// renders as ` --`.
    row: [Option<(HexMode, u8)>; 16],
    /// The absolute offset one past the last staged byte.
    offset: u64,
}

impl HexDumper {
    /// Create a new dumper with an empty row.
    pub fn new() -> HexDumper {
        HexDumper { row: [None; 16], offset: 0 }
    }

    /// Reset the dumper for a new source. Any staged bytes are
    /// discarded.
    pub fn reset(&mut self) {
        self.row = [None; 16];
        self.offset = 0;
    }

    /// Returns true when a partial row is staged but not yet written.
    pub fn has_pending(&self) -> bool {
        self.offset & 0xF != 0 && self.row.iter().any(|slot| slot.is_some())
    }

    /// The absolute offset at which the next staged byte would land.
    pub fn next_offset(&self) -> u64 {
        self.offset
    }

    /// Stage the given bytes at the given absolute offset, flushing
    /// complete rows as they fill up.
    ///
    /// If the offset is discontiguous with previously staged bytes, the
    /// pending partial row is written out first.
    pub fn dump<W: WriteColor>(
        &mut self,
        wtr: &mut W,
        colors: &ColorSpecs,
        separator: &[u8],
        mode: HexMode,
        offset: u64,
        data: &[u8],
    ) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        if self.offset != offset && self.has_pending() {
            self.flush_row(wtr, colors, separator)?;
        }
        self.offset = offset;
        for &byte in data {
            self.row[(self.offset & 0xF) as usize] = Some((mode, byte));
            self.offset += 1;
            if self.offset & 0xF == 0 {
                self.flush_row(wtr, colors, separator)?;
            }
        }
        Ok(())
    }

    /// Write out any staged partial row.
    pub fn done<W: WriteColor>(
        &mut self,
        wtr: &mut W,
        colors: &ColorSpecs,
        separator: &[u8],
    ) -> io::Result<()> {
        if self.has_pending() {
            self.flush_row(wtr, colors, separator)?;
        }
        Ok(())
    }

    fn flush_row<W: WriteColor>(
        &mut self,
        wtr: &mut W,
        colors: &ColorSpecs,
        separator: &[u8],
    ) -> io::Result<()> {
        let color = wtr.supports_color();
        let row_base = (self.offset.wrapping_sub(1)) & !0xF;

        write_spec(wtr, color, colors.byte_offset(), {
            format!("{:08x}", row_base).as_bytes()
        })?;
        write_spec(wtr, color, colors.separator(), separator)?;
        wtr.write_all(b" ")?;

        for slot in self.row.iter() {
            match *slot {
                None => {
                    write_spec(wtr, color, colors.context_line(), b" --")?;
                }
                Some((mode, byte)) => {
                    let text = format!(" {:02x}", byte);
                    write_spec(
                        wtr,
                        color,
                        mode.color(colors),
                        text.as_bytes(),
                    )?;
                }
            }
        }

        wtr.write_all(b"  ")?;

        for slot in self.row.iter() {
            match *slot {
                None => {
                    write_spec(wtr, color, colors.context_line(), b"-")?;
                }
                Some((mode, byte)) => {
                    let spec = mode.color(colors);
                    if !spec.is_none() && color {
                        wtr.write_all(spec.as_bytes())?;
                    }
                    if byte < 0x20 && color {
                        // Control characters render as reverse video
                        // `@` + byte, matching the classic dump format.
                        wtr.write_all(b"\x1b[7m")?;
                        wtr.write_all(&[b'@' + byte])?;
                    } else if byte == 0x7F && color {
                        wtr.write_all(b"\x1b[7m~")?;
                    } else if byte < 0x20 || byte >= 0x7F {
                        wtr.write_all(b" ")?;
                    } else {
                        wtr.write_all(&[byte])?;
                    }
                    if color {
                        wtr.write_all(SGR_OFF)?;
                    }
                }
            }
        }

        wtr.write_all(b"\n")?;
        self.row = [None; 16];
        Ok(())
    }
}

fn write_spec<W: WriteColor>(
    wtr: &mut W,
    color: bool,
    spec: &Sgr,
    bytes: &[u8],
) -> io::Result<()> {
    if color && !spec.is_none() {
        wtr.write_all(spec.as_bytes())?;
        wtr.write_all(bytes)?;
        wtr.write_all(SGR_OFF)
    } else {
        wtr.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use super::{HexDumper, HexMode};
    use crate::color::ColorSpecs;

    fn dump_all(chunks: &[(HexMode, u64, &[u8])]) -> String {
        let mut wtr = NoColor::new(vec![]);
        let colors = ColorSpecs::default();
        let mut dumper = HexDumper::new();
        for &(mode, offset, data) in chunks {
            dumper.dump(&mut wtr, &colors, b":", mode, offset, data).unwrap();
        }
        dumper.done(&mut wtr, &colors, b":").unwrap();
        String::from_utf8(wtr.into_inner()).unwrap()
    }

    #[test]
    fn single_partial_row() {
        let got = dump_all(&[(HexMode::Match, 0, b"abc")]);
        let expected = "\
00000000:  61 62 63 -- -- -- -- -- -- -- -- -- -- -- -- --  abc-------------
";
        assert_eq!(expected, got);
    }

    #[test]
    fn exactly_one_row() {
        let got = dump_all(&[(HexMode::Line, 0, b"0123456789abcdef")]);
        let expected = "\
00000000:  30 31 32 33 34 35 36 37 38 39 61 62 63 64 65 66  0123456789abcdef
";
        assert_eq!(expected, got);
    }

    #[test]
    fn row_crossing() {
        let got = dump_all(&[(HexMode::Line, 0, b"0123456789abcdefgh")]);
        let expected = "\
00000000:  30 31 32 33 34 35 36 37 38 39 61 62 63 64 65 66  0123456789abcdef
00000010:  67 68 -- -- -- -- -- -- -- -- -- -- -- -- -- --  gh--------------
";
        assert_eq!(expected, got);
    }

    #[test]
    fn unaligned_start() {
        let got = dump_all(&[(HexMode::Match, 20, b"xy")]);
        let expected = "\
00000010:  -- -- -- -- 78 79 -- -- -- -- -- -- -- -- -- --  ----xy----------
";
        assert_eq!(expected, got);
    }

    #[test]
    fn contiguous_chunks_share_rows() {
        let got = dump_all(&[
            (HexMode::Line, 0, b"ab"),
            (HexMode::Match, 2, b"cd"),
            (HexMode::Line, 4, b"ef"),
        ]);
        let expected = "\
00000000:  61 62 63 64 65 66 -- -- -- -- -- -- -- -- -- --  abcdef----------
";
        assert_eq!(expected, got);
    }

    #[test]
    fn discontiguous_offset_flushes() {
        let got = dump_all(&[
            (HexMode::Match, 0, b"ab"),
            (HexMode::Match, 40, b"cd"),
        ]);
        let expected = "\
00000000:  61 62 -- -- -- -- -- -- -- -- -- -- -- -- -- --  ab--------------
00000020:  -- -- -- -- -- -- -- -- 63 64 -- -- -- -- -- --  --------cd------
";
        assert_eq!(expected, got);
    }

    #[test]
    fn nonprintable_gutter() {
        let got = dump_all(&[(HexMode::Line, 0, b"a\x00\x7f\xffz")]);
        // Without color support, control bytes render as spaces.
        let expected = "\
00000000:  61 00 7f ff 7a -- -- -- -- -- -- -- -- -- -- --  a   z-----------
";
        assert_eq!(expected, got);
    }
}
