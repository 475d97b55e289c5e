use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use unigrep_searcher::{End, Flow, Line, Report};
use termcolor::{NoColor, WriteColor};

use crate::color::{ColorSpecs, SGR_OFF};
use crate::util::PrinterPath;

/// What a summary search reports when it finishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SummaryKind {
    /// One line per source with the number of selected lines, prefixed
    /// by the source name when path output is enabled.
    Count,
    /// Like `Count`, but tallying every individual match instead of
    /// distinct selected lines. This requires the engine to collect
    /// spans.
    CountMatches,
    /// Just the source name, when the source had at least one selected
    /// line. The search stops at the first one.
    PathWithMatch,
    /// Just the source name, when the source had no selected line at
    /// all.
    PathWithoutMatch,
    /// Nothing at all; the search stops at the first selected line and
    /// only the exit status carries the answer.
    Quiet,
}

impl SummaryKind {
    /// Whether this kind cannot render without a source name.
    fn needs_path(self) -> bool {
        match self {
            SummaryKind::PathWithMatch | SummaryKind::PathWithoutMatch => {
                true
            }
            _ => false,
        }
    }

    /// Whether the first selected line already answers the question,
    /// so the rest of the source can be skipped.
    fn first_hit_suffices(self) -> bool {
        match self {
            SummaryKind::PathWithMatch | SummaryKind::Quiet => true,
            _ => false,
        }
    }
}

/// The frozen configuration of a summary printer.
#[derive(Clone, Debug)]
struct Config {
    kind: SummaryKind,
    colors: ColorSpecs,
    path: bool,
    separator_field: Arc<Vec<u8>>,
    path_terminator: Option<u8>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            kind: SummaryKind::Count,
            colors: ColorSpecs::default(),
            path: true,
            separator_field: Arc::new(b":".to_vec()),
            path_terminator: None,
        }
    }
}

/// A builder for the summary printer.
///
/// The summary printer has far fewer knobs than the standard printer
/// because nothing is rendered until a source is finished; it only
/// tallies what the engine pushes.
#[derive(Clone, Debug, Default)]
pub struct SummaryBuilder {
    config: Config,
}

impl SummaryBuilder {
    /// Return a new builder for configuring the summary printer.
    pub fn new() -> SummaryBuilder {
        SummaryBuilder::default()
    }

    /// Build a printer using any implementation of
    /// `termcolor::WriteColor`.
    pub fn build<W: WriteColor>(&self, wtr: W) -> Summary<W> {
        Summary { config: self.config.clone(), wtr }
    }

    /// Build a printer from any implementation of `io::Write` that
    /// never emits colors.
    pub fn build_no_color<W: io::Write>(&self, wtr: W) -> Summary<NoColor<W>> {
        self.build(NoColor::new(wtr))
    }

    /// Set what this printer reports. The default is `Count`.
    pub fn kind(&mut self, kind: SummaryKind) -> &mut SummaryBuilder {
        self.config.kind = kind;
        self
    }

    /// Set the color specifications used for source names and
    /// separators.
    pub fn color_specs(&mut self, specs: ColorSpecs) -> &mut SummaryBuilder {
        self.config.colors = specs;
        self
    }

    /// Whether counts are prefixed with the source name. Has no effect
    /// on the path kinds, which always print the name.
    ///
    /// Enabled by default.
    pub fn path(&mut self, yes: bool) -> &mut SummaryBuilder {
        self.config.path = yes;
        self
    }

    /// Set the separator between the source name and a count.
    ///
    /// By default, this is set to `:`.
    pub fn separator_field(&mut self, sep: Vec<u8>) -> &mut SummaryBuilder {
        self.config.separator_field = Arc::new(sep);
        self
    }

    /// Set a byte printed after every source name in place of the
    /// separator or line terminator, for NUL terminated output.
    pub fn path_terminator(
        &mut self,
        terminator: Option<u8>,
    ) -> &mut SummaryBuilder {
        self.config.path_terminator = terminator;
        self
    }
}

/// The summary printer: per-source counts, name listings, or silence.
#[derive(Debug)]
pub struct Summary<W> {
    config: Config,
    wtr: W,
}

impl<W: WriteColor> Summary<W> {
    /// Return a summary printer with a default configuration (counting
    /// selected lines) that writes to the given writer.
    pub fn new(wtr: W) -> Summary<W> {
        SummaryBuilder::new().build(wtr)
    }
}

impl<W: io::Write> Summary<NoColor<W>> {
    /// Return a summary printer with a default configuration that never
    /// emits colors.
    pub fn new_no_color(wtr: W) -> Summary<NoColor<W>> {
        SummaryBuilder::new().build_no_color(wtr)
    }
}

impl<W: WriteColor> Summary<W> {
    /// Return a `Report` for one search without a source name. The path
    /// kinds refuse to run this way.
    pub fn sink<'s>(&'s mut self) -> SummarySink<'static, 's, W> {
        SummarySink::new(self, None)
    }

    /// Return a `Report` for one search over the named source.
    pub fn sink_with_path<'p, 's, P>(
        &'s mut self,
        path: &'p P,
    ) -> SummarySink<'p, 's, W>
    where
        P: ?Sized + AsRef<Path>,
    {
        SummarySink::new(self, Some(PrinterPath::new(path.as_ref())))
    }
}

impl<W> Summary<W> {
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

/// The `Report` implementation of the summary printer, covering one
/// search.
#[derive(Debug)]
pub struct SummarySink<'p, 's, W: 's> {
    summary: &'s mut Summary<W>,
    path: Option<PrinterPath<'p>>,
    lines: u64,
    matches: u64,
    bytes_searched: u64,
}

impl<'p, 's, W: WriteColor> SummarySink<'p, 's, W> {
    fn new(
        summary: &'s mut Summary<W>,
        path: Option<PrinterPath<'p>>,
    ) -> SummarySink<'p, 's, W> {
        SummarySink { summary, path, lines: 0, matches: 0, bytes_searched: 0 }
    }

    /// Returns true if and only if this search answered positively:
    /// a selected line was seen, or, for the without-match kind, none
    /// was.
    pub fn has_match(&self) -> bool {
        match self.summary.config.kind {
            SummaryKind::PathWithoutMatch => self.lines == 0,
            _ => self.lines > 0,
        }
    }

    /// The number of selected line records in this search.
    pub fn selected_lines(&self) -> u64 {
        self.lines
    }

    /// The number of individual matches in this search. Only populated
    /// when the engine collected spans.
    pub fn match_count(&self) -> u64 {
        self.matches
    }

    /// The number of bytes the engine fed to the matcher.
    pub fn bytes_searched(&self) -> u64 {
        self.bytes_searched
    }

    /// Write the source name followed by the field separator (or the
    /// path terminator when one is configured).
    fn name_and_separator(&mut self) -> io::Result<()> {
        let terminator = self.summary.config.path_terminator;
        let sep = self.summary.config.separator_field.clone();
        if let Some(name) = self.name() {
            self.put_path(&name)?;
            match terminator {
                Some(term) => self.put(&[term])?,
                None => self.put_separator(&sep)?,
            }
        }
        Ok(())
    }

    /// Write the source name on a line of its own (or terminated by the
    /// path terminator when one is configured).
    fn name_line(&mut self) -> io::Result<()> {
        let terminator = self.summary.config.path_terminator;
        if let Some(name) = self.name() {
            self.put_path(&name)?;
            match terminator {
                Some(term) => self.put(&[term])?,
                None => self.put(b"\n")?,
            }
        }
        Ok(())
    }

    fn name(&self) -> Option<Vec<u8>> {
        self.path.as_ref().map(|p| p.as_bytes().to_vec())
    }

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.summary.wtr.write_all(bytes)
    }

    fn put_path(&mut self, bytes: &[u8]) -> io::Result<()> {
        let summary = &mut *self.summary;
        let spec = summary.config.colors.path();
        if summary.wtr.supports_color() && !spec.is_none() {
            summary.wtr.write_all(spec.as_bytes())?;
            summary.wtr.write_all(bytes)?;
            summary.wtr.write_all(SGR_OFF)
        } else {
            summary.wtr.write_all(bytes)
        }
    }

    fn put_separator(&mut self, bytes: &[u8]) -> io::Result<()> {
        let summary = &mut *self.summary;
        let spec = summary.config.colors.separator();
        if summary.wtr.supports_color() && !spec.is_none() {
            summary.wtr.write_all(spec.as_bytes())?;
            summary.wtr.write_all(bytes)?;
            summary.wtr.write_all(SGR_OFF)
        } else {
            summary.wtr.write_all(bytes)
        }
    }
}

impl<'p, 's, W: WriteColor> Report for SummarySink<'p, 's, W> {
    fn begin(&mut self) -> io::Result<Flow> {
        if self.path.is_none() && self.summary.config.kind.needs_path() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "output kind {:?} requires a file path",
                    self.summary.config.kind
                ),
            ));
        }
        self.lines = 0;
        self.matches = 0;
        self.bytes_searched = 0;
        Ok(Flow::Continue)
    }

    fn line(&mut self, line: &Line) -> io::Result<Flow> {
        if !line.class().is_selected() {
            return Ok(Flow::Continue);
        }
        self.lines += 1;
        self.matches += line.spans().len() as u64;
        if self.summary.config.kind.first_hit_suffices() {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn end(&mut self, end: &End) -> io::Result<()> {
        self.bytes_searched = end.bytes_searched();
        if end.suppressed() {
            // The source was rejected as binary, so it counts as
            // having no matches at all — but a count of zero for it is
            // misleading rather than informative, so nothing is
            // printed.
            self.lines = 0;
            self.matches = 0;
            return Ok(());
        }
        let show_path = self.summary.config.path;
        match self.summary.config.kind {
            SummaryKind::Count => {
                let count = self.lines.to_string();
                if show_path {
                    self.name_and_separator()?;
                }
                self.put(count.as_bytes())?;
                self.put(b"\n")?;
            }
            SummaryKind::CountMatches => {
                let count = self.matches.to_string();
                if show_path {
                    self.name_and_separator()?;
                }
                self.put(count.as_bytes())?;
                self.put(b"\n")?;
            }
            SummaryKind::PathWithMatch => {
                if self.lines > 0 {
                    self.name_line()?;
                }
            }
            SummaryKind::PathWithoutMatch => {
                if self.lines == 0 {
                    self.name_line()?;
                }
            }
            SummaryKind::Quiet => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use unigrep_regex::RegexMatcher;
    use unigrep_searcher::{
        BinaryPolicy, Engine, EngineBuilder,
    };
    use termcolor::NoColor;

    use super::{Summary, SummaryBuilder, SummaryKind};

    const HAYSTACK: &'static [u8] = b"\
A ship in harbor is safe, kept dry by the pilots of the port,
but that is not what ships are built for, said the old keeper;
sail past the harbor wall and learn what the charts leave out.
Every storm writes a new coastline into the logbooks of a crew
and every pilot remembers the reef that taught him to slow up,
trading the glamour of deep water for a steady hand ashore.
";

    fn rendered(printer: &mut Summary<NoColor<Vec<u8>>>) -> String {
        let bytes = printer.get_mut().get_ref().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn count_no_path() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(&matcher, HAYSTACK, &mut printer.sink())
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("2\n", got);
    }

    #[test]
    fn count_with_path() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(
                &matcher,
                HAYSTACK,
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("logbook:2\n", got);
    }

    #[test]
    fn count_zero() {
        let matcher = RegexMatcher::new(r"zzzz").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(&matcher, HAYSTACK, &mut printer.sink())
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("0\n", got);
    }

    #[test]
    fn count_matches() {
        let matcher = RegexMatcher::new(r"o").unwrap();
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::CountMatches)
            .build_no_color(vec![]);
        engine
            .search_slice(&matcher, b"foo boo\nzz\n", &mut printer.sink())
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("4\n", got);
    }

    #[test]
    fn path_with_match_requires_path() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::PathWithMatch)
            .build_no_color(vec![]);
        let res = Engine::new().search_slice(
            &matcher,
            HAYSTACK,
            &mut printer.sink(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn path_with_match() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::PathWithMatch)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(
                &matcher,
                HAYSTACK,
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("logbook\n", got);
    }

    #[test]
    fn path_without_match() {
        let matcher = RegexMatcher::new(r"zzzz").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::PathWithoutMatch)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(
                &matcher,
                HAYSTACK,
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("logbook\n", got);

        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::PathWithoutMatch)
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(
                &matcher,
                HAYSTACK,
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("", got);
    }

    #[test]
    fn path_terminator_nul() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::PathWithMatch)
            .path_terminator(Some(b'\x00'))
            .build_no_color(vec![]);
        Engine::new()
            .search_slice(
                &matcher,
                HAYSTACK,
                &mut printer.sink_with_path("logbook"),
            )
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("logbook\x00", got);
    }

    #[test]
    fn quiet_stops_early() {
        let matcher = RegexMatcher::new(r"pilot").unwrap();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Quiet)
            .build_no_color(vec![]);
        let mut sink = printer.sink_with_path("logbook");
        Engine::new()
            .search_slice(&matcher, HAYSTACK, &mut sink)
            .unwrap();
        let matched = sink.has_match();

        let got = rendered(&mut printer);
        assert_eq_printed!("", got);
        assert!(matched);
    }

    #[test]
    fn count_with_invert() {
        let matcher = RegexMatcher::new(r"harbor").unwrap();
        let engine = EngineBuilder::new().invert_match(true).build();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        engine
            .search_slice(&matcher, HAYSTACK, &mut printer.sink())
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("4\n", got);
    }

    #[test]
    fn max_count_bounds_count() {
        let matcher = RegexMatcher::new(r"harbor").unwrap();
        let engine = EngineBuilder::new().max_count(Some(1)).build();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        engine
            .search_slice(&matcher, HAYSTACK, &mut printer.sink())
            .unwrap();

        let got = rendered(&mut printer);
        assert_eq_printed!("1\n", got);
    }

    #[test]
    fn suppressed_source_prints_nothing() {
        let matcher = RegexMatcher::new(r"abc").unwrap();
        let engine = EngineBuilder::new()
            .binary(BinaryPolicy::WithoutMatch)
            .build();
        let mut printer = SummaryBuilder::new()
            .kind(SummaryKind::Count)
            .build_no_color(vec![]);
        let mut sink = printer.sink();
        engine
            .search_slice(&matcher, b"abc\nabc\n\x00abc\n", &mut sink)
            .unwrap();
        assert!(!sink.has_match());

        let got = rendered(&mut printer);
        assert_eq_printed!("", got);
    }
}
