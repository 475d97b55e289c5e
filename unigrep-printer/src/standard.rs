use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use unigrep_matcher::Match;
use unigrep_searcher::{End, Flow, Line, Report};
use termcolor::{NoColor, WriteColor};

use crate::color::{ColorSpecs, SGR_OFF};
use crate::hex::{HexDumper, HexMode};
use crate::util::{tab_expanded_column, PrinterPath};

/// The configuration for the standard printer.
///
/// This is manipulated by the StandardBuilder and then referenced by
/// the sink. Once a printer is built, the configuration is frozen.
#[derive(Debug, Clone)]
struct Config {
    colors: ColorSpecs,
    path: bool,
    only_matching: bool,
    only_line_number: bool,
    per_match: bool,
    column: bool,
    byte_offset: bool,
    initial_tab: bool,
    tab_width: u64,
    hex: bool,
    hex_offset: bool,
    break_lines: bool,
    separator_group: Arc<Option<Vec<u8>>>,
    separator_field_match: Arc<Vec<u8>>,
    separator_field_context: Arc<Vec<u8>>,
    path_terminator: Option<u8>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            colors: ColorSpecs::default(),
            path: true,
            only_matching: false,
            only_line_number: false,
            per_match: false,
            column: false,
            byte_offset: false,
            initial_tab: false,
            tab_width: 8,
            hex: false,
            hex_offset: false,
            break_lines: false,
            separator_group: Arc::new(Some(b"--".to_vec())),
            separator_field_match: Arc::new(b":".to_vec()),
            separator_field_context: Arc::new(b"-".to_vec()),
            path_terminator: None,
        }
    }
}

/// A builder for the "standard" grep-like printer.
///
/// The configurable behavior covers the header fields (file name, line
/// number, column, byte offset), separators, coloring, only-matching
/// and per-match record shapes, and the hex rendering of binary lines.
///
/// Whether lines carry numbers, how much context appears and how binary
/// input is classified are all engine decisions that arrive with each
/// record; this printer only renders.
#[derive(Clone, Debug)]
pub struct StandardBuilder {
    config: Config,
}

impl StandardBuilder {
    /// Return a new builder for configuring the standard printer.
    pub fn new() -> StandardBuilder {
        StandardBuilder { config: Config::default() }
    }

    /// Build a printer using any implementation of
    /// `termcolor::WriteColor`.
    ///
    /// The implementation of `WriteColor` used here controls whether
    /// colors are used or not when colors have been configured using
    /// the `color_specs` method.
    pub fn build<W: WriteColor>(&self, wtr: W) -> Standard<W> {
        Standard { config: self.config.clone(), wtr }
    }

    /// Build a printer from any implementation of `io::Write` and
    /// never emit any colors.
    pub fn build_no_color<W: io::Write>(&self, wtr: W) -> Standard<NoColor<W>> {
        self.build(NoColor::new(wtr))
    }

    /// Set the color specifications to use for coloring in this
    /// printer.
    pub fn color_specs(&mut self, specs: ColorSpecs) -> &mut StandardBuilder {
        self.config.colors = specs;
        self
    }

    /// When enabled, if a path was given to the printer, then it is
    /// shown as a prefix to each emitted record. When disabled, then no
    /// paths are ever included in the output even when a path is
    /// provided to the printer.
    ///
    /// This is enabled by default.
    pub fn path(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.path = yes;
        self
    }

    /// Only print the matched parts of lines instead of the whole
    /// lines. Every match is printed on its own line; a second match on
    /// the same line carries a `+` header separator, and a match
    /// continuing from a previous line carries a `|` one.
    pub fn only_matching(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.only_matching = yes;
        self
    }

    /// Only print the header fields of matches, with no line content at
    /// all.
    pub fn only_line_number(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.only_line_number = yes;
        self
    }

    /// Print one full-line record for every match instead of one
    /// consolidated record per matching line.
    pub fn per_match(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.per_match = yes;
        self
    }

    /// Print the column number of the first match in a line.
    ///
    /// Column numbers are computed from the start of the line being
    /// printed, with tabs expanded to the configured tab width, and are
    /// shown 1-based.
    ///
    /// This is disabled by default.
    pub fn column(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.column = yes;
        self
    }

    /// Print the absolute byte offset of the beginning of each line
    /// printed, or of each match when only-matching is in effect.
    pub fn byte_offset(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.byte_offset = yes;
        self
    }

    /// When enabled, a tab follows the final field separator, and the
    /// numeric header fields are padded (line numbers to width 6,
    /// columns to 3, offsets to 7) so that output aligns.
    pub fn initial_tab(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.initial_tab = yes;
        self
    }

    /// Set the tab width used for computing column numbers.
    pub fn tab_width(&mut self, width: u64) -> &mut StandardBuilder {
        self.config.tab_width = width;
        self
    }

    /// Render lines the engine flagged as binary as hex dump rows
    /// instead of text.
    ///
    /// This is disabled by default.
    pub fn hex(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.hex = yes;
        self
    }

    /// Print byte offsets in hexadecimal instead of decimal.
    pub fn hex_offset(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.hex_offset = yes;
        self
    }

    /// When enabled, a blank line is printed after each source that
    /// produced output.
    pub fn break_lines(&mut self, yes: bool) -> &mut StandardBuilder {
        self.config.break_lines = yes;
        self
    }

    /// Set the separator printed on its own line between non-contiguous
    /// blocks of context output. `None` suppresses it entirely.
    ///
    /// By default, this is set to `--`.
    pub fn separator_group(
        &mut self,
        sep: Option<Vec<u8>>,
    ) -> &mut StandardBuilder {
        self.config.separator_group = Arc::new(sep);
        self
    }

    /// Set the separator that follows every header field of a selected
    /// line.
    ///
    /// By default, this is set to `:`.
    pub fn separator_field_match(
        &mut self,
        sep: Vec<u8>,
    ) -> &mut StandardBuilder {
        self.config.separator_field_match = Arc::new(sep);
        self
    }

    /// Set the separator that follows every header field of a context
    /// line.
    ///
    /// By default, this is set to `-`.
    pub fn separator_field_context(
        &mut self,
        sep: Vec<u8>,
    ) -> &mut StandardBuilder {
        self.config.separator_field_context = Arc::new(sep);
        self
    }

    /// Set a byte printed after every file path in place of the field
    /// separator, for NUL terminated file name output.
    pub fn path_terminator(
        &mut self,
        terminator: Option<u8>,
    ) -> &mut StandardBuilder {
        self.config.path_terminator = terminator;
        self
    }
}

/// The standard printer, which implements grep-like formatting,
/// including color support, header fields and hex rendering of binary
/// lines.
///
/// This type is generic over `W`, any implementation of the
/// `termcolor::WriteColor` trait.
#[derive(Debug)]
pub struct Standard<W> {
    config: Config,
    wtr: W,
}

impl<W: WriteColor> Standard<W> {
    /// Return a standard printer with a default configuration that
    /// writes matches to the given writer.
    pub fn new(wtr: W) -> Standard<W> {
        StandardBuilder::new().build(wtr)
    }
}

impl<W: io::Write> Standard<NoColor<W>> {
    /// Return a standard printer with a default configuration that
    /// writes matches to the given writer, never emitting colors.
    pub fn new_no_color(wtr: W) -> Standard<NoColor<W>> {
        StandardBuilder::new().build_no_color(wtr)
    }
}

impl<W: WriteColor> Standard<W> {
    /// Return a `Report` for one search that never prints a file path.
    pub fn sink<'s>(&'s mut self) -> StandardSink<'static, 's, W> {
        StandardSink::new(self, None)
    }

    /// Return a `Report` for one search associated with a file path.
    ///
    /// The path is retained even when the configuration suppresses path
    /// fields, because the binary file notice always names its source.
    pub fn sink_with_path<'p, 's, P>(
        &'s mut self,
        path: &'p P,
    ) -> StandardSink<'p, 's, W>
    where
        P: ?Sized + AsRef<Path>,
    {
        StandardSink::new(self, Some(PrinterPath::new(path.as_ref())))
    }
}

impl<W> Standard<W> {
    /// Return a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.wtr
    }

    /// Consume this printer and return back ownership of the underlying
    /// writer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// Which color a piece of output is painted with.
#[derive(Clone, Copy, Debug)]
enum Paint {
    Path,
    LineNumber,
    Column,
    Offset,
    Separator,
    SelectedLine,
    ContextLine,
    SelectedMatch,
    ContextMatch,
}

/// The `Report` implementation of the standard printer, covering one
/// search.
///
/// After the search, the sink can be queried for whether a match
/// occurred and for the counts a session aggregates.
#[derive(Debug)]
pub struct StandardSink<'p, 's, W: 's> {
    standard: &'s mut Standard<W>,
    path: Option<PrinterPath<'p>>,
    selected: u64,
    match_total: u64,
    bytes_searched: u64,
    binary_notice: bool,
    wrote: bool,
    hex: HexDumper,
    hex_open: bool,
}

impl<'p, 's, W: WriteColor> StandardSink<'p, 's, W> {
    fn new(
        standard: &'s mut Standard<W>,
        path: Option<PrinterPath<'p>>,
    ) -> StandardSink<'p, 's, W> {
        StandardSink {
            standard,
            path,
            selected: 0,
            match_total: 0,
            bytes_searched: 0,
            binary_notice: false,
            wrote: false,
            hex: HexDumper::new(),
            hex_open: false,
        }
    }

    /// Returns true if and only if this search found a match. A binary
    /// file notice counts as a match.
    pub fn has_match(&self) -> bool {
        self.selected > 0 || self.binary_notice
    }

    /// The number of selected line records in this search.
    pub fn selected_lines(&self) -> u64 {
        self.selected
    }

    /// The number of individual matches in this search. Only populated
    /// when the engine collected spans.
    pub fn match_count(&self) -> u64 {
        self.match_total
    }

    /// The number of bytes the engine fed to the matcher.
    pub fn bytes_searched(&self) -> u64 {
        self.bytes_searched
    }

    /// Write raw bytes, remembering that this search produced output.
    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.wrote = true;
        self.standard.wtr.write_all(bytes)
    }

    /// Write bytes in the given paint, when the writer supports color
    /// and a sequence was configured.
    fn put_colored(&mut self, paint: Paint, bytes: &[u8]) -> io::Result<()> {
        self.wrote = true;
        let std = &mut *self.standard;
        let colors = &std.config.colors;
        let spec = match paint {
            Paint::Path => colors.path(),
            Paint::LineNumber => colors.line(),
            Paint::Column => colors.column(),
            Paint::Offset => colors.byte_offset(),
            Paint::Separator => colors.separator(),
            Paint::SelectedLine => colors.selected_line(),
            Paint::ContextLine => colors.context_line(),
            Paint::SelectedMatch => colors.matched_selected(),
            Paint::ContextMatch => colors.matched_context(),
        };
        if std.wtr.supports_color() && !spec.is_none() {
            std.wtr.write_all(spec.as_bytes())?;
            std.wtr.write_all(bytes)?;
            std.wtr.write_all(SGR_OFF)
        } else {
            std.wtr.write_all(bytes)
        }
    }

    /// Write the header fields of one record: file name, line number,
    /// column and byte offset, each followed by the separator. With the
    /// initial tab option, the fields are padded and a tab follows the
    /// final separator.
    fn header(
        &mut self,
        sep: Separator,
        number: Option<u64>,
        column: Option<u64>,
        offset: u64,
    ) -> io::Result<()> {
        let config = &self.standard.config;
        let sep_bytes: Arc<Vec<u8>> = match sep {
            Separator::Match => config.separator_field_match.clone(),
            Separator::Context => config.separator_field_context.clone(),
            Separator::SameLine => Arc::new(b"+".to_vec()),
            Separator::Continuation => Arc::new(b"|".to_vec()),
        };
        let initial_tab = config.initial_tab;
        let show_column = config.column;
        let show_offset = config.byte_offset;
        let hex_offset = config.hex_offset;
        let path_terminator = config.path_terminator;
        let show_path = config.path && self.path.is_some();

        let mut any = false;
        if show_path {
            let path = self.path.as_ref().unwrap().as_bytes().to_vec();
            self.put_colored(Paint::Path, &path)?;
            match path_terminator {
                Some(term) => self.put(&[term])?,
                None => self.put_colored(Paint::Separator, &sep_bytes)?,
            }
            any = true;
        }
        if let Some(n) = number {
            let n = if initial_tab {
                format!("{:6}", n)
            } else {
                n.to_string()
            };
            self.put_colored(Paint::LineNumber, n.as_bytes())?;
            self.put_colored(Paint::Separator, &sep_bytes)?;
            any = true;
        }
        if show_column {
            if let Some(n) = column {
                let n = if initial_tab {
                    format!("{:3}", n)
                } else {
                    n.to_string()
                };
                self.put_colored(Paint::Column, n.as_bytes())?;
                self.put_colored(Paint::Separator, &sep_bytes)?;
                any = true;
            }
        }
        if show_offset {
            let n = match (hex_offset, initial_tab) {
                (true, true) => format!("{:7x}", offset),
                (true, false) => format!("{:x}", offset),
                (false, true) => format!("{:7}", offset),
                (false, false) => offset.to_string(),
            };
            self.put_colored(Paint::Offset, n.as_bytes())?;
            self.put_colored(Paint::Separator, &sep_bytes)?;
            any = true;
        }
        if any && initial_tab {
            self.put(b"\t")?;
        }
        Ok(())
    }

    /// The column, 1-based and tab expanded, of the given byte position
    /// within the line.
    fn column_of(&self, line: &Line, pos: usize) -> u64 {
        tab_expanded_column(
            line.bytes(),
            pos,
            self.standard.config.tab_width,
        ) + 1
    }

    /// Emit a whole line with its match spans highlighted.
    fn content(&mut self, line: &Line) -> io::Result<()> {
        self.content_spans(line, line.spans())
    }

    /// Emit a whole line, highlighting only the given spans.
    fn content_spans(
        &mut self,
        line: &Line,
        spans: &[Match],
    ) -> io::Result<()> {
        let (line_paint, match_paint) = paints(line);
        let bytes = line.bytes();
        let content_len = trim_terminator(bytes).len();
        let mut written = 0;
        for span in spans {
            let start = span.start().min(content_len);
            let end = span.end().min(content_len);
            if start > written {
                self.put_colored(line_paint, &bytes[written..start])?;
            }
            if end > start {
                self.put_colored(match_paint, &bytes[start..end])?;
            }
            written = written.max(end);
        }
        if written < content_len {
            self.put_colored(line_paint, &bytes[written..content_len])?;
        }
        self.put(b"\n")
    }

    /// The consolidated one-record-per-line shape.
    fn grouped(&mut self, line: &Line) -> io::Result<()> {
        let column = line.spans().first().map(|s| self.column_of(line, s.start()));
        self.header(
            separator_for(line),
            line.number(),
            column,
            line.offset(),
        )?;
        self.content(line)
    }

    /// One full-line record per match.
    fn per_match(&mut self, line: &Line) -> io::Result<()> {
        if line.spans().is_empty() {
            return self.grouped(line);
        }
        for i in 0..line.spans().len() {
            let span = line.spans()[i];
            let column = Some(self.column_of(line, span.start()));
            self.header(
                separator_for(line),
                line.number(),
                column,
                line.offset() + span.start() as u64,
            )?;
            self.content_spans(line, &[span])?;
        }
        Ok(())
    }

    /// Only the matched parts, one record per match.
    fn only_matching(&mut self, line: &Line) -> io::Result<()> {
        if line.spans().is_empty() {
            return self.grouped(line);
        }
        let (_, match_paint) = paints(line);
        for i in 0..line.spans().len() {
            let span = line.spans()[i];
            let sep = if i > 0 {
                Separator::SameLine
            } else if line.is_continuation() {
                Separator::Continuation
            } else {
                separator_for(line)
            };
            let column = Some(self.column_of(line, span.start()));
            self.header(
                sep,
                line.number(),
                column,
                line.offset() + span.start() as u64,
            )?;
            let bytes = line.bytes();
            let end = span.end().min(trim_terminator(bytes).len());
            if end > span.start() {
                let piece = bytes[span.start()..end].to_vec();
                self.put_colored(match_paint, &piece)?;
            }
            self.put(b"\n")?;
        }
        Ok(())
    }

    /// Only the header fields.
    fn only_line_number(&mut self, line: &Line) -> io::Result<()> {
        let spans: &[Match] = line.spans();
        if spans.is_empty() || !self.standard.config.per_match {
            let (column, offset) = match spans.first() {
                Some(s) => (
                    Some(self.column_of(line, s.start())),
                    line.offset() + s.start() as u64,
                ),
                None => (Some(1), line.offset()),
            };
            self.header(separator_for(line), line.number(), column, offset)?;
            return self.put(b"\n");
        }
        for i in 0..spans.len() {
            let span = spans[i];
            let sep = if i > 0 {
                Separator::SameLine
            } else if line.is_continuation() {
                Separator::Continuation
            } else {
                separator_for(line)
            };
            let column = Some(self.column_of(line, span.start()));
            self.header(
                sep,
                line.number(),
                column,
                line.offset() + span.start() as u64,
            )?;
            self.put(b"\n")?;
        }
        Ok(())
    }

    /// Render a binary-flagged line as hex dump rows. Contiguous lines
    /// share rows; a header precedes each new dump region when there
    /// are header fields to show.
    fn hex_line(&mut self, line: &Line) -> io::Result<()> {
        let continues =
            self.hex_open && self.hex.next_offset() == line.offset();
        if !continues {
            self.hex_flush()?;
            let has_fields = (self.standard.config.path
                && self.path.is_some())
                || line.number().is_some()
                || self.standard.config.column
                || self.standard.config.byte_offset;
            if has_fields {
                let column = line
                    .spans()
                    .first()
                    .map(|s| self.column_of(line, s.start()));
                self.header(
                    separator_for(line),
                    line.number(),
                    column,
                    line.offset(),
                )?;
                self.put(b"\n")?;
            }
        }
        self.hex_open = true;
        self.wrote = true;

        let (line_mode, match_mode) = if line.class().is_context() {
            (HexMode::ContextLine, HexMode::ContextMatch)
        } else {
            (HexMode::Line, HexMode::Match)
        };
        let sep: Arc<Vec<u8>> = match separator_for(line) {
            Separator::Context => {
                self.standard.config.separator_field_context.clone()
            }
            _ => self.standard.config.separator_field_match.clone(),
        };

        let std = &mut *self.standard;
        let bytes = line.bytes();
        let offset = line.offset();
        let mut written = 0;
        for span in line.spans() {
            let start = span.start().min(bytes.len());
            let end = span.end().min(bytes.len());
            if start > written {
                self.hex.dump(
                    &mut std.wtr,
                    &std.config.colors,
                    &sep,
                    line_mode,
                    offset + written as u64,
                    &bytes[written..start],
                )?;
            }
            if end > written.max(start) {
                self.hex.dump(
                    &mut std.wtr,
                    &std.config.colors,
                    &sep,
                    match_mode,
                    offset + start as u64,
                    &bytes[start..end],
                )?;
            }
            written = written.max(end);
        }
        if written < bytes.len() {
            self.hex.dump(
                &mut std.wtr,
                &std.config.colors,
                &sep,
                line_mode,
                offset + written as u64,
                &bytes[written..],
            )?;
        }
        Ok(())
    }

    /// Write out any pending hex row before switching back to text
    /// output or finishing the source.
    fn hex_flush(&mut self) -> io::Result<()> {
        if !self.hex_open {
            return Ok(());
        }
        let std = &mut *self.standard;
        self.hex.done(
            &mut std.wtr,
            &std.config.colors,
            &std.config.separator_field_match,
        )?;
        self.hex_open = false;
        Ok(())
    }
}

impl<'p, 's, W: WriteColor> Report for StandardSink<'p, 's, W> {
    fn begin(&mut self) -> io::Result<Flow> {
        self.selected = 0;
        self.match_total = 0;
        self.bytes_searched = 0;
        self.binary_notice = false;
        self.wrote = false;
        self.hex.reset();
        self.hex_open = false;
        Ok(Flow::Continue)
    }

    fn line(&mut self, line: &Line) -> io::Result<Flow> {
        if line.class().is_selected() {
            self.selected += 1;
            self.match_total += line.spans().len() as u64;
        }
        if self.standard.config.only_line_number {
            self.only_line_number(line)?;
            return Ok(Flow::Continue);
        }
        if self.standard.config.hex && line.is_binary() {
            self.hex_line(line)?;
            return Ok(Flow::Continue);
        }
        self.hex_flush()?;
        if self.standard.config.only_matching {
            self.only_matching(line)?;
        } else if self.standard.config.per_match {
            self.per_match(line)?;
        } else {
            self.grouped(line)?;
        }
        Ok(Flow::Continue)
    }

    fn gap(&mut self) -> io::Result<Flow> {
        self.hex_flush()?;
        if let Some(sep) = (*self.standard.config.separator_group).clone() {
            self.put_colored(Paint::Separator, &sep)?;
            self.put(b"\n")?;
        }
        Ok(Flow::Continue)
    }

    fn binary_file(&mut self) -> io::Result<()> {
        self.hex_flush()?;
        self.binary_notice = true;
        self.put(b"Binary file ")?;
        let name = match self.path {
            Some(ref path) => path.as_bytes().to_vec(),
            None => b"(standard input)".to_vec(),
        };
        self.put(&name)?;
        self.put(b" matches\n")
    }

    fn end(&mut self, end: &End) -> io::Result<()> {
        self.hex_flush()?;
        self.bytes_searched = end.bytes_searched();
        if end.suppressed() {
            // The source was rejected as binary: it must look like it
            // contained nothing at all.
            self.selected = 0;
            self.match_total = 0;
            self.binary_notice = false;
            return Ok(());
        }
        if self.standard.config.break_lines && self.wrote {
            self.put(b"\n")?;
        }
        Ok(())
    }
}

/// Which separator a record's header fields use.
#[derive(Clone, Copy, Debug)]
enum Separator {
    /// The configured selected-line separator (`:` by default).
    Match,
    /// The context separator (`-`).
    Context,
    /// `+`, for a second match reported on the same line.
    SameLine,
    /// `|`, for a match continuing from a previous line.
    Continuation,
}

fn separator_for(line: &Line) -> Separator {
    if line.class().is_context() {
        Separator::Context
    } else {
        Separator::Match
    }
}

fn paints(line: &Line) -> (Paint, Paint) {
    if line.class().is_context() {
        (Paint::ContextLine, Paint::ContextMatch)
    } else {
        (Paint::SelectedLine, Paint::SelectedMatch)
    }
}

fn trim_terminator(bytes: &[u8]) -> &[u8] {
    match bytes.last() {
        Some(&b'\n') => &bytes[..bytes.len() - 1],
        _ => bytes,
    }
}

#[cfg(test)]
mod tests {
    use unigrep_regex::RegexMatcher;
    use unigrep_searcher::{BinaryPolicy, Engine, EngineBuilder};
    use termcolor::{Ansi, NoColor};

    use super::{Standard, StandardBuilder};
    use crate::color::ColorSpecs;

    const HAYSTACK: &'static str = "\
A ship in harbor is safe, kept dry by the pilots of the port,
but that is not what ships are built for, said the old keeper;
sail past the harbor wall and learn what the charts leave out.
Every storm writes a new coastline into the logbooks of a crew
and every pilot remembers the reef that taught him to slow up,
trading the glamour of deep water for a steady hand ashore.\
";

    fn rendered(printer: &mut Standard<NoColor<Vec<u8>>>) -> String {
        let bytes = printer.get_mut().get_ref().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn rendered_ansi(printer: &mut Standard<Ansi<Vec<u8>>>) -> String {
        let bytes = printer.get_mut().get_ref().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn run(
        engine: &Engine,
        pattern: &str,
        haystack: &[u8],
        printer: &mut Standard<NoColor<Vec<u8>>>,
    ) -> bool {
        let matcher = RegexMatcher::new(pattern).unwrap();
        let mut sink = printer.sink();
        engine.search_slice(&matcher, haystack, &mut sink).unwrap();
        sink.has_match()
    }

    #[test]
    fn reports_match() {
        let engine = EngineBuilder::new().line_number(false).build();

        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        assert!(run(&engine, "harbor", HAYSTACK.as_bytes(), &mut printer));

        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        assert!(!run(&engine, "zzzzz", HAYSTACK.as_bytes(), &mut printer));
    }

    #[test]
    fn line_mode() {
        let engine = EngineBuilder::new().line_number(false).build();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        run(&engine, "harbor", HAYSTACK.as_bytes(), &mut printer);

        let got = rendered(&mut printer);
        let want = "\
A ship in harbor is safe, kept dry by the pilots of the port,
sail past the harbor wall and learn what the charts leave out.
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn line_numbers() {
        let engine = Engine::new();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        run(&engine, "harbor", HAYSTACK.as_bytes(), &mut printer);

        let got = rendered(&mut printer);
        let want = "\
1:A ship in harbor is safe, kept dry by the pilots of the port,
3:sail past the harbor wall and learn what the charts leave out.
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn paths_prefix_records() {
        let matcher = RegexMatcher::new("harbor").unwrap();
        let engine = Engine::new();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        engine
            .search_slice(
                &matcher,
                HAYSTACK.as_bytes(),
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        let want = "\
logbook:1:A ship in harbor is safe, kept dry by the pilots of the port,
logbook:3:sail past the harbor wall and learn what the charts leave out.
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn path_terminator_replaces_separator() {
        let matcher = RegexMatcher::new("harbor").unwrap();
        let engine = EngineBuilder::new().line_number(false).build();
        let mut printer = StandardBuilder::new()
            .path_terminator(Some(b'\x00'))
            .build(NoColor::new(vec![]));
        engine
            .search_slice(
                &matcher,
                HAYSTACK.as_bytes(),
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert!(got.starts_with("logbook\x00A ship in harbor"));
    }

    #[test]
    fn context_with_separators() {
        let engine = EngineBuilder::new()
            .before_context(1)
            .after_context(1)
            .build();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        run(&engine, "pilot", HAYSTACK.as_bytes(), &mut printer);

        let got = rendered(&mut printer);
        let want = "\
1:A ship in harbor is safe, kept dry by the pilots of the port,
2-but that is not what ships are built for, said the old keeper;
--
4-Every storm writes a new coastline into the logbooks of a crew
5:and every pilot remembers the reef that taught him to slow up,
6-trading the glamour of deep water for a steady hand ashore.
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn no_group_separator() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .before_context(1)
            .after_context(1)
            .build();
        let mut printer = StandardBuilder::new()
            .separator_group(None)
            .build(NoColor::new(vec![]));
        run(&engine, "pilot", HAYSTACK.as_bytes(), &mut printer);

        let got = rendered(&mut printer);
        assert!(!got.contains("--\n"));
    }

    #[test]
    fn only_matching() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .collect_spans(true)
            .build();
        let mut printer = StandardBuilder::new()
            .only_matching(true)
            .build(NoColor::new(vec![]));
        run(&engine, r"\w+", b"one two three\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("one\ntwo\nthree\n", got);
    }

    #[test]
    fn only_matching_same_line_continuation() {
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut printer = StandardBuilder::new()
            .only_matching(true)
            .build(NoColor::new(vec![]));
        run(&engine, "o", b"hello world\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("1:o\n1+o\n", got);
    }

    #[test]
    fn only_matching_multi_line_continuation() {
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut printer = StandardBuilder::new()
            .only_matching(true)
            .build(NoColor::new(vec![]));
        run(
            &engine,
            r"(?s)strike.+smoke",
            b"the strike of\nthe smoke rose\n",
            &mut printer,
        );

        let got = rendered(&mut printer);
        let want = "\
1:strike of
2|the smoke
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn only_line_number() {
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut printer = StandardBuilder::new()
            .only_line_number(true)
            .column(true)
            .build(NoColor::new(vec![]));
        run(&engine, "world", b"hello\nworld\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("2:1:\n", got);
    }

    #[test]
    fn per_match_records() {
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut printer = StandardBuilder::new()
            .per_match(true)
            .column(true)
            .build(NoColor::new(vec![]));
        run(&engine, "o", b"hello world\n", &mut printer);

        let got = rendered(&mut printer);
        let want = "\
1:5:hello world
1:8:hello world
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn column_numbers_tab_expanded() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .collect_spans(true)
            .build();
        let mut printer = StandardBuilder::new()
            .column(true)
            .tab_width(8)
            .build(NoColor::new(vec![]));
        run(&engine, "x", b"\tx\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("9:\tx\n", got);
    }

    #[test]
    fn byte_offsets() {
        let engine = EngineBuilder::new().line_number(false).build();
        let mut printer = StandardBuilder::new()
            .byte_offset(true)
            .build(NoColor::new(vec![]));
        run(&engine, "world", b"hello\nworld\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("6:world\n", got);
    }

    #[test]
    fn initial_tab_pads_fields() {
        let engine = Engine::new();
        let mut printer = StandardBuilder::new()
            .initial_tab(true)
            .build(NoColor::new(vec![]));
        run(&engine, "world", b"hello\nworld\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("     2:\tworld\n", got);
    }

    #[test]
    fn binary_emits_message_and_halts() {
        let matcher = RegexMatcher::new("def").unwrap();
        let engine = EngineBuilder::new().line_number(false).build();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        let mut sink = printer.sink_with_path("blob");
        engine
            .search_slice(&matcher, b"abc\x00def\n", &mut sink)
            .unwrap();
        assert!(sink.has_match());

        let got = rendered(&mut printer);
        assert_eq_printed!("Binary file blob matches\n", got);
    }

    #[test]
    fn binary_text_mode_prints_raw() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .binary(BinaryPolicy::Text)
            .build();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        run(&engine, "def", b"abc\x00def\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("abc\x00def\n", got);
    }

    #[test]
    fn hex_mode_rows() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .collect_spans(true)
            .binary(BinaryPolicy::Hex)
            .build();
        let mut printer = StandardBuilder::new()
            .hex(true)
            .build(NoColor::new(vec![]));
        run(&engine, "world", b"hello world\n", &mut printer);

        let got = rendered(&mut printer);
        let want = "\
00000000:  68 65 6c 6c 6f 20 77 6f 72 6c 64 0a -- -- -- --  hello world ----
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn with_hex_leaves_text_lines_alone() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .collect_spans(true)
            .binary(BinaryPolicy::WithHex)
            .build();
        let mut printer = StandardBuilder::new()
            .hex(true)
            .build(NoColor::new(vec![]));
        run(&engine, "o", b"ok\nb\x00o\n", &mut printer);

        let got = rendered(&mut printer);
        // The binary line starts at offset 3, so its bytes land in the
        // middle of the first sixteen byte row.
        let want = "\
ok
00000000:  -- -- -- 62 00 6f 0a -- -- -- -- -- -- -- -- --  ---b o ---------
";
        assert_eq_printed!(want, got);
    }

    #[test]
    fn break_appends_blank_line() {
        let engine = EngineBuilder::new().line_number(false).build();
        let mut printer = StandardBuilder::new()
            .break_lines(true)
            .build(NoColor::new(vec![]));
        run(&engine, "hello", b"hello\n", &mut printer);

        let got = rendered(&mut printer);
        assert_eq_printed!("hello\n\n", got);
    }

    #[test]
    fn colors_highlight_matches() {
        let matcher = RegexMatcher::new("harbor").unwrap();
        let engine = EngineBuilder::new()
            .line_number(false)
            .collect_spans(true)
            .build();
        let mut printer = StandardBuilder::new()
            .color_specs(ColorSpecs::from_grep_colors("ms=01;31"))
            .build(Ansi::new(vec![]));
        engine
            .search_slice(&matcher, b"the harbor\n", &mut printer.sink())
            .unwrap();

        let got = rendered_ansi(&mut printer);
        assert_eq_printed!("the \x1b[01;31mharbor\x1b[0m\n", got);
    }

    #[test]
    fn invert_passthru_highlights_context_matches() {
        let matcher = RegexMatcher::new("hello").unwrap();
        let engine = EngineBuilder::new()
            .line_number(false)
            .invert_match(true)
            .passthru(true)
            .collect_spans(true)
            .build();
        let mut printer = StandardBuilder::new()
            .color_specs(ColorSpecs::from_grep_colors("mc=01;31"))
            .build(Ansi::new(vec![]));
        engine
            .search_slice(&matcher, b"hello\nworld\n", &mut printer.sink())
            .unwrap();

        let got = rendered_ansi(&mut printer);
        // `hello` does match, so under inversion it is emitted as a
        // passthrough line with its match highlighted in context
        // colors.
        assert_eq_printed!("\x1b[01;31mhello\x1b[0m\nworld\n", got);
    }

    #[test]
    fn suppressed_source_reports_no_match() {
        let matcher = RegexMatcher::new("abc").unwrap();
        let engine = EngineBuilder::new()
            .binary(BinaryPolicy::WithoutMatch)
            .build();
        let mut printer = StandardBuilder::new().build(NoColor::new(vec![]));
        let mut sink = printer.sink();
        engine
            .search_slice(&matcher, b"\x00abc\n", &mut sink)
            .unwrap();
        assert!(!sink.has_match());
        assert_eq!(sink.selected_lines(), 0);
    }
}
