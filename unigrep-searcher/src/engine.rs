/*!
The match-and-emit engine.

An [`Engine`] walks one source at a time and decides, line by line, what
to push to a [`Report`]: selected lines, leading context recalled from
the [`ContextRing`], trailing context while an after-window is open,
passthrough lines, block gaps, the binary file notice and the end
summary. Per source, emission moves between plain scanning, an open
match block and a draining after-window; a halt on binary input or an
exhausted match quota is terminal.

Two strategies feed the same per-line decision:

* When the matcher guarantees that no match contains a line terminator,
  the engine streams: it pulls one line at a time from the input and
  asks the matcher about that line only.
* Otherwise the whole source is bound at once (`read_all`, which is the
  memory map when one is available), the matcher's full lazy match
  sequence is collected up front, and the engine walks the lines of the
  buffer clipping each match to the lines it touches. A match that runs
  across lines produces one record per line, with the continuation
  marked.
*/

use std::cmp;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use unigrep_matcher::{LineTerminator, Match, Matcher};
use memchr::memchr;

use crate::decode::{DecodeBuilder, SourceEncoding};
use crate::input::{Input, MmapChoice};
use crate::report::{End, Flow, Line, LineClass, Report};
use crate::ring::ContextRing;

/// How non-text input is treated.
///
/// A line is considered binary when it contains a NUL byte or bytes
/// that are not valid UTF-8.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryPolicy {
    /// When a *selected* line is binary, notify the report once and
    /// halt the source. Lines selected before that point are emitted
    /// normally.
    ///
    /// This is the default.
    Binary,
    /// When *any* line is binary, abort the source and report it as
    /// containing no matches at all.
    WithoutMatch,
    /// Treat every line as text.
    Text,
    /// Flag every line as binary, so that formatters render everything
    /// as hex.
    Hex,
    /// Flag binary lines as such and leave text lines alone, for mixed
    /// hex/text rendering.
    WithHex,
}

impl Default for BinaryPolicy {
    fn default() -> BinaryPolicy {
        BinaryPolicy::Binary
    }
}

/// The frozen configuration of an engine.
#[derive(Clone, Debug)]
struct Config {
    invert: bool,
    before: usize,
    after: usize,
    passthru: bool,
    line_number: bool,
    max_count: Option<u64>,
    allow_empty: bool,
    collect_spans: bool,
    binary: BinaryPolicy,
    encoding: Option<SourceEncoding>,
    mmap: MmapChoice,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            invert: false,
            before: 0,
            after: 0,
            passthru: false,
            line_number: true,
            max_count: None,
            allow_empty: false,
            collect_spans: false,
            binary: BinaryPolicy::default(),
            encoding: None,
            mmap: MmapChoice::default(),
        }
    }
}

/// A builder for configuring an engine.
#[derive(Clone, Debug, Default)]
pub struct EngineBuilder {
    config: Config,
}

impl EngineBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Build the engine.
    pub fn build(&self) -> Engine {
        let mut config = self.config.clone();
        if config.passthru {
            // Passthrough is unbounded context, which makes the
            // windows meaningless.
            config.before = 0;
            config.after = 0;
        }
        let mut decode = DecodeBuilder::new();
        decode.encoding(config.encoding.clone());
        Engine { config, decode }
    }

    /// Select lines that do *not* match instead of lines that do.
    ///
    /// Disabled by default.
    pub fn invert_match(&mut self, yes: bool) -> &mut EngineBuilder {
        self.config.invert = yes;
        self
    }

    /// The number of leading context lines to report before every
    /// selected line. `0`, the default, disables leading context.
    pub fn before_context(&mut self, lines: usize) -> &mut EngineBuilder {
        self.config.before = lines;
        self
    }

    /// The number of trailing context lines to report after every
    /// selected line. `0`, the default, disables trailing context.
    pub fn after_context(&mut self, lines: usize) -> &mut EngineBuilder {
        self.config.after = lines;
        self
    }

    /// Report every line, emitting non-selected lines as passthrough
    /// context. Enabling this zeroes the context windows.
    ///
    /// Disabled by default.
    pub fn passthru(&mut self, yes: bool) -> &mut EngineBuilder {
        self.config.passthru = yes;
        self
    }

    /// Whether to count lines and attach 1-based line numbers to
    /// records.
    ///
    /// Enabled by default.
    pub fn line_number(&mut self, yes: bool) -> &mut EngineBuilder {
        self.config.line_number = yes;
        self
    }

    /// Stop a source after this many selected lines. Trailing context
    /// for the final selected line is still reported.
    ///
    /// No limit by default.
    pub fn max_count(&mut self, limit: Option<u64>) -> &mut EngineBuilder {
        self.config.max_count = limit;
        self
    }

    /// Permit zero width matches in collected spans. When disabled (the
    /// default), a zero width match ends span collection for its line,
    /// which also rules out unbounded runs of empty matches.
    pub fn allow_empty(&mut self, yes: bool) -> &mut EngineBuilder {
        self.config.allow_empty = yes;
        self
    }

    /// Whether to compute the individual match spans of every emitted
    /// line. Formatters that highlight, align columns or print matches
    /// on their own need this; plain line output does not.
    ///
    /// Disabled by default.
    pub fn collect_spans(&mut self, yes: bool) -> &mut EngineBuilder {
        self.config.collect_spans = yes;
        self
    }

    /// Set the binary policy. See [`BinaryPolicy`].
    pub fn binary(&mut self, policy: BinaryPolicy) -> &mut EngineBuilder {
        self.config.binary = policy;
        self
    }

    /// Set the declared source encoding. The source is transcoded
    /// before matching; a BOM overrides the declaration.
    pub fn encoding(
        &mut self,
        encoding: Option<SourceEncoding>,
    ) -> &mut EngineBuilder {
        self.config.encoding = encoding;
        self
    }

    /// Set the memory map policy used for whole file access.
    pub fn memory_map(&mut self, mmap: MmapChoice) -> &mut EngineBuilder {
        self.config.mmap = mmap;
        self
    }
}

/// The match-and-emit engine. See the module documentation.
///
/// An engine is cheap to build and holds no per-source state, so one
/// engine serves a whole session of searches.
#[derive(Clone, Debug)]
pub struct Engine {
    config: Config,
    decode: DecodeBuilder,
}

impl Engine {
    /// Build an engine with the default configuration.
    pub fn new() -> Engine {
        EngineBuilder::new().build()
    }

    /// Search the file at the given path.
    ///
    /// When the declared encoding permits searching raw bytes and the
    /// memory map policy admits the file, the file is mapped and
    /// searched in place; otherwise it is streamed (and transcoded when
    /// necessary).
    pub fn search_path<P, M, T>(
        &self,
        matcher: M,
        path: P,
        report: T,
    ) -> io::Result<()>
    where
        P: AsRef<Path>,
        M: Matcher,
        T: Report,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        if self.raw_encoding() {
            if let Some(mmap) = self.config.mmap.open(&file, Some(path)) {
                log::trace!("{}: searching via memory map", path.display());
                return self.run(matcher, Input::slice(&mmap), report);
            }
        }
        self.search_reader(matcher, file, report)
    }

    /// Search the contents of an arbitrary reader.
    pub fn search_reader<M, R, T>(
        &self,
        matcher: M,
        rdr: R,
        report: T,
    ) -> io::Result<()>
    where
        M: Matcher,
        R: Read,
        T: Report,
    {
        let mut scratch = vec![0; 8 * (1 << 10)];
        let decoded = self.decode.build_with_buffer(rdr, &mut scratch)?;
        self.run(matcher, Input::reader(Box::new(decoded)), report)
    }

    /// Search a slice of bytes already in memory.
    pub fn search_slice<M, T>(
        &self,
        matcher: M,
        data: &[u8],
        report: T,
    ) -> io::Result<()>
    where
        M: Matcher,
        T: Report,
    {
        if self.slice_needs_transcoding(data) {
            log::trace!("slice needs transcoding, using streaming reader");
            return self.search_reader(matcher, data, report);
        }
        self.run(matcher, Input::slice(data), report)
    }

    /// Returns true if and only if the declared encoding permits
    /// searching bytes in place.
    fn raw_encoding(&self) -> bool {
        self.config.encoding.as_ref().map_or(true, |enc| enc.is_raw())
    }

    fn slice_needs_transcoding(&self, data: &[u8]) -> bool {
        if !self.raw_encoding() {
            return true;
        }
        // A UTF-16 BOM takes over even for raw declarations.
        match encoding_rs::Encoding::for_bom(data) {
            Some((enc, _)) => {
                enc == encoding_rs::UTF_16LE || enc == encoding_rs::UTF_16BE
            }
            None => false,
        }
    }

    fn run<M: Matcher, T: Report>(
        &self,
        matcher: M,
        input: Input,
        report: T,
    ) -> io::Result<()> {
        if single_line_capable(&matcher) {
            log::trace!("searching line by line");
            self.run_stream(matcher, input, report)
        } else {
            log::trace!("matches may cross lines; binding whole source");
            self.run_buffer(matcher, input, report)
        }
    }

    /// The streaming strategy: read a line, ask the matcher about it,
    /// act.
    fn run_stream<M: Matcher, T: Report>(
        &self,
        matcher: M,
        mut input: Input,
        mut report: T,
    ) -> io::Result<()> {
        let config = &self.config;
        if report.begin()?.is_stop() || config.max_count == Some(0) {
            return report.end(&End::default());
        }

        let mut pass = Pass::default();
        let mut ring = ContextRing::new(config.before);
        let mut line: Vec<u8> = Vec::new();
        let mut spans: Vec<Match> = Vec::new();
        let mut offset = 0u64;
        let mut number = 0u64;

        while input.read_line(&mut line)? {
            number += 1;
            let line_offset = offset;
            offset += line.len() as u64;

            let content = trim_terminator(&line);
            let binary = classify(config.binary, content);
            if config.binary == BinaryPolicy::WithoutMatch && binary {
                return report.end(&End {
                    bytes_searched: offset,
                    suppressed: true,
                });
            }

            let matched =
                matcher.is_match(content).map_err(matcher_error)?;
            spans.clear();
            if matched && config.collect_spans {
                collect_line_spans(
                    &matcher,
                    content,
                    config.allow_empty,
                    &mut spans,
                )?;
            }
            let selected = matched != config.invert;
            let flow = step(
                config,
                &mut pass,
                &mut ring,
                &mut report,
                number,
                line_offset,
                &line,
                binary,
                selected,
                if matched { &spans } else { &[] },
                false,
            )?;
            if flow.is_stop() {
                break;
            }
        }
        report.end(&End { bytes_searched: offset, suppressed: false })
    }

    /// The whole-buffer strategy: bind the matcher to everything at
    /// once, then walk the lines with a cursor over the match sequence.
    fn run_buffer<M: Matcher, T: Report>(
        &self,
        matcher: M,
        mut input: Input,
        mut report: T,
    ) -> io::Result<()> {
        let config = &self.config;
        if report.begin()?.is_stop() || config.max_count == Some(0) {
            return report.end(&End::default());
        }
        let data = input.read_all()?;
        let bytes_searched = data.len() as u64;

        // Every match is kept here, including the zero width ones: an
        // empty match still selects its line. Whether empty spans are
        // *reported* is decided when clipping to a line.
        let mut spans: Vec<Match> = Vec::new();
        matcher
            .find_iter(data, |m| {
                spans.push(m);
                true
            })
            .map_err(matcher_error)?;
        if spans.last().map_or(false, |m| {
            m.is_empty() && m.start() >= data.len()
        }) {
            spans.pop();
        }

        let mut pass = Pass::default();
        let mut ring = ContextRing::new(config.before);
        let mut line_spans: Vec<Match> = Vec::new();
        let mut pos = 0;
        let mut number = 0u64;
        let mut idx = 0;

        while pos < data.len() {
            let end = match memchr(b'\n', &data[pos..]) {
                Some(i) => pos + i + 1,
                None => data.len(),
            };
            number += 1;
            let bytes = &data[pos..end];
            let content = trim_terminator(bytes);
            let content_end = pos + content.len();

            let binary = classify(config.binary, content);
            if config.binary == BinaryPolicy::WithoutMatch && binary {
                return report
                    .end(&End { bytes_searched, suppressed: true });
            }

            // Clip the matches touching this line. A match reaching
            // past the line keeps the cursor in place so the next line
            // sees it again, as a continuation.
            line_spans.clear();
            let mut hit = false;
            let mut continued = false;
            let mut i = idx;
            loop {
                if i >= spans.len() {
                    idx = i;
                    break;
                }
                let s = spans[i];
                if s.end() <= pos && !(s.is_empty() && s.start() == pos) {
                    i += 1;
                    continue;
                }
                if s.start() >= end {
                    idx = i;
                    break;
                }
                if !hit && s.start() < pos {
                    continued = true;
                }
                hit = true;
                let cs = cmp::max(s.start(), pos);
                let ce = cmp::max(cs, cmp::min(s.end(), content_end));
                if ce > cs || (s.is_empty() && config.allow_empty) {
                    line_spans.push(Match::new(cs - pos, ce - pos));
                }
                if s.end() > end {
                    idx = i;
                    break;
                }
                i += 1;
            }

            let selected = hit != config.invert;
            let flow = step(
                config,
                &mut pass,
                &mut ring,
                &mut report,
                number,
                pos as u64,
                bytes,
                binary,
                selected,
                if hit { &line_spans } else { &[] },
                continued,
            )?;
            if flow.is_stop() {
                break;
            }
            pos = end;
        }
        report.end(&End { bytes_searched, suppressed: false })
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

/// The mutable emission state of one source.
#[derive(Clone, Debug, Default)]
struct Pass {
    /// The number of the last line pushed to the report; `0` when
    /// nothing was pushed yet.
    last_emitted: u64,
    emitted_any: bool,
    /// How many trailing context lines are still owed.
    after_left: usize,
    /// How many selected lines were reported, for the match quota.
    selected: u64,
    /// Set once the quota is reached: the only thing left to do is
    /// drain the open after-window.
    draining: bool,
}

/// Decide what to do with one line. This is the shared heart of both
/// strategies.
fn step<T: Report>(
    config: &Config,
    pass: &mut Pass,
    ring: &mut ContextRing,
    report: &mut T,
    number: u64,
    offset: u64,
    bytes: &[u8],
    binary: bool,
    selected: bool,
    spans: &[Match],
    continued: bool,
) -> io::Result<Flow> {
    let line_number = |n: u64| if config.line_number { Some(n) } else { None };

    if selected {
        if pass.draining {
            // A fresh match after the quota: the after-window is all
            // that kept us going, and a new selected line closes it.
            return Ok(Flow::Stop);
        }
        if config.binary == BinaryPolicy::Binary && binary {
            report.binary_file()?;
            return Ok(Flow::Stop);
        }
        // Open a block: a gap marker when this block is not contiguous
        // with the previous output, then the leading context still held
        // in the ring, then the line itself.
        let window_start = cmp::max(
            pass.last_emitted + 1,
            number.saturating_sub(config.before as u64),
        );
        if pass.emitted_any
            && (config.before > 0 || config.after > 0)
            && window_start > pass.last_emitted + 1
        {
            if report.gap()?.is_stop() {
                return Ok(Flow::Stop);
            }
        }
        for n in window_start..number {
            if let Some(prev) = ring.recall(n) {
                let rec = Line {
                    bytes: prev.bytes,
                    offset: prev.offset,
                    number: line_number(n),
                    class: LineClass::Before,
                    binary: prev.binary,
                    spans: &[],
                    continued: false,
                };
                if report.line(&rec)?.is_stop() {
                    return Ok(Flow::Stop);
                }
                pass.last_emitted = n;
                pass.emitted_any = true;
            }
        }
        let rec = Line {
            bytes,
            offset,
            number: line_number(number),
            class: LineClass::Selected,
            binary,
            spans,
            continued,
        };
        if report.line(&rec)?.is_stop() {
            return Ok(Flow::Stop);
        }
        pass.last_emitted = number;
        pass.emitted_any = true;
        pass.selected += 1;
        pass.after_left = config.after;
        if let Some(limit) = config.max_count {
            if pass.selected >= limit {
                if config.after == 0 {
                    return Ok(Flow::Stop);
                }
                pass.draining = true;
            }
        }
    } else if pass.after_left > 0 {
        let rec = Line {
            bytes,
            offset,
            number: line_number(number),
            class: LineClass::After,
            binary,
            spans,
            continued,
        };
        if report.line(&rec)?.is_stop() {
            return Ok(Flow::Stop);
        }
        pass.last_emitted = number;
        pass.emitted_any = true;
        pass.after_left -= 1;
        if pass.after_left == 0 && pass.draining {
            return Ok(Flow::Stop);
        }
    } else if pass.draining {
        return Ok(Flow::Stop);
    } else if config.passthru {
        let rec = Line {
            bytes,
            offset,
            number: line_number(number),
            class: LineClass::Passthrough,
            binary,
            spans,
            continued,
        };
        if report.line(&rec)?.is_stop() {
            return Ok(Flow::Stop);
        }
        pass.last_emitted = number;
        pass.emitted_any = true;
    } else {
        ring.remember(number, offset, binary, bytes);
    }
    Ok(Flow::Continue)
}

/// Collect this line's match spans.
///
/// A zero width match ends the iteration unless empty matches were
/// allowed, and an empty match sitting exactly at the end of the
/// content is dropped as an artifact of line anchors.
fn collect_line_spans<M: Matcher>(
    matcher: &M,
    content: &[u8],
    allow_empty: bool,
    out: &mut Vec<Match>,
) -> io::Result<()> {
    matcher
        .find_iter(content, |m| {
            if m.is_empty() && !allow_empty {
                return false;
            }
            out.push(m);
            true
        })
        .map_err(matcher_error)?;
    if out.last().map_or(false, |m| {
        m.is_empty() && m.start() >= content.len()
    }) {
        out.pop();
    }
    Ok(())
}

/// Whether the matcher guarantees that no match contains a line
/// terminator, which is what the streaming strategy relies on.
fn single_line_capable<M: Matcher>(matcher: &M) -> bool {
    if matcher.line_terminator() == Some(LineTerminator::byte(b'\n')) {
        return true;
    }
    matcher.non_matching_bytes().map_or(false, |set| set.contains(b'\n'))
}

/// The per-line binary test: a NUL byte or invalid UTF-8.
fn classify(policy: BinaryPolicy, content: &[u8]) -> bool {
    match policy {
        BinaryPolicy::Text => false,
        BinaryPolicy::Hex => true,
        BinaryPolicy::Binary
        | BinaryPolicy::WithoutMatch
        | BinaryPolicy::WithHex => {
            memchr(b'\x00', content).is_some()
                || std::str::from_utf8(content).is_err()
        }
    }
}

fn trim_terminator(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(&b'\n') => &line[..line.len() - 1],
        _ => line,
    }
}

fn matcher_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::report::{Flow, Line, Report};
    use crate::testutil::{transcript, transcript_reader, RegexMatcher};

    use super::{BinaryPolicy, Engine, EngineBuilder};

    const HAYSTACK: &'static str = "\
A ship in harbor is safe, kept dry by the pilots of the port,
but that is not what ships are built for, said the old keeper;
sail past the harbor wall and learn what the charts leave out.
Every storm writes a new coastline into the logbooks of a crew
and every pilot remembers the reef that taught him to slow up,
trading the glamour of deep water for a steady hand ashore.\
";

    #[test]
    fn stream_basic() {
        let engine = EngineBuilder::new().line_number(false).build();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
0:A ship in harbor is safe, kept dry by the pilots of the port,
125:sail past the harbor wall and learn what the charts leave out.
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn reader_and_slice_agree() {
        let engine = EngineBuilder::new()
            .before_context(1)
            .after_context(1)
            .build();
        let matcher = RegexMatcher::new("pilot");
        let a = transcript(&engine, &matcher, HAYSTACK);
        let b = transcript_reader(&engine, &matcher, HAYSTACK);
        assert_eq!(a, b);
    }

    #[test]
    fn line_numbers() {
        let engine = Engine::new();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
1:0:A ship in harbor is safe, kept dry by the pilots of the port,
3:125:sail past the harbor wall and learn what the charts leave out.
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn invert() {
        let engine = EngineBuilder::new().invert_match(true).build();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
2:62:but that is not what ships are built for, said the old keeper;
4:188:Every storm writes a new coastline into the logbooks of a crew
5:251:and every pilot remembers the reef that taught him to slow up,
6:314:trading the glamour of deep water for a steady hand ashore.
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn context_with_gap() {
        let engine = EngineBuilder::new()
            .before_context(1)
            .after_context(1)
            .build();
        let got = transcript(&engine, &RegexMatcher::new("pilot"), HAYSTACK);
        let expected = "\
1:0:A ship in harbor is safe, kept dry by the pilots of the port,
2+62+but that is not what ships are built for, said the old keeper;
--
4-188-Every storm writes a new coastline into the logbooks of a crew
5:251:and every pilot remembers the reef that taught him to slow up,
6+314+trading the glamour of deep water for a steady hand ashore.
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn after_context_only() {
        let engine = EngineBuilder::new().after_context(1).build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("m"),
            "m\nx\ny\nz\nw\nm\n",
        );
        let expected = "\
1:0:m
2+2+x
--
6:10:m
bytes:12
";
        assert_eq!(expected, got);
    }

    #[test]
    fn adjacent_blocks_have_no_gap() {
        let engine = EngineBuilder::new().after_context(1).build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("m"),
            "m\nx\nm\ny\n",
        );
        let expected = "\
1:0:m
2+2+x
3:4:m
4+6+y
bytes:8
";
        assert_eq!(expected, got);
    }

    #[test]
    fn passthru() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .passthru(true)
            .build();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
0:A ship in harbor is safe, kept dry by the pilots of the port,
62~but that is not what ships are built for, said the old keeper;
125:sail past the harbor wall and learn what the charts leave out.
188~Every storm writes a new coastline into the logbooks of a crew
251~and every pilot remembers the reef that taught him to slow up,
314~trading the glamour of deep water for a steady hand ashore.
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn max_count_stops_early() {
        let engine = EngineBuilder::new().max_count(Some(1)).build();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
1:0:A ship in harbor is safe, kept dry by the pilots of the port,
bytes:62
";
        assert_eq!(expected, got);
    }

    #[test]
    fn max_count_still_drains_after_context() {
        let engine = EngineBuilder::new()
            .max_count(Some(1))
            .after_context(1)
            .build();
        let got = transcript(&engine, &RegexMatcher::new("harbor"), HAYSTACK);
        let expected = "\
1:0:A ship in harbor is safe, kept dry by the pilots of the port,
2+62+but that is not what ships are built for, said the old keeper;
bytes:125
";
        assert_eq!(expected, got);
    }

    #[test]
    fn binary_policy_halts_on_selected_binary_line() {
        let engine = EngineBuilder::new().build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("def"),
            "abc\x00def\n",
        );
        assert_eq!("BINARY\nbytes:8\n", got);
    }

    #[test]
    fn binary_policy_keeps_earlier_text_matches() {
        let engine = EngineBuilder::new().build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("a"),
            "aaa\na\x00a\n",
        );
        assert_eq!("1:0:aaa\nBINARY\nbytes:8\n", got);
    }

    #[test]
    fn without_match_policy_suppresses() {
        let engine = EngineBuilder::new()
            .binary(BinaryPolicy::WithoutMatch)
            .build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("xyz"),
            "abc\nb\x00b\nxyz\n",
        );
        assert_eq!("bytes:8\nsuppressed\n", got);
    }

    #[test]
    fn text_policy_searches_binary_data() {
        let engine = EngineBuilder::new()
            .line_number(false)
            .binary(BinaryPolicy::Text)
            .build();
        let got = transcript(
            &engine,
            &RegexMatcher::new("def"),
            "abc\x00def\n",
        );
        assert_eq!("0:abc\x00def\nbytes:8\n", got);
    }

    #[test]
    fn buffer_strategy_splits_multi_line_matches() {
        let engine = Engine::new();
        // No line terminator guarantee, so the whole source is bound.
        let matcher = RegexMatcher::multi("(?s)harbor is safe.+keeper");
        let got = transcript(&engine, &matcher, HAYSTACK);
        let expected = "\
1:0:A ship in harbor is safe, kept dry by the pilots of the port,
2:62:but that is not what ships are built for, said the old keeper;
bytes:373
";
        assert_eq!(expected, got);
    }

    #[test]
    fn buffer_strategy_marks_continuations() {
        struct Spans(Vec<(u64, bool, Vec<(usize, usize)>)>);
        impl Report for Spans {
            fn line(&mut self, line: &Line) -> io::Result<Flow> {
                self.0.push((
                    line.number().unwrap(),
                    line.is_continuation(),
                    line.spans()
                        .iter()
                        .map(|s| (s.start(), s.end()))
                        .collect(),
                ));
                Ok(Flow::Continue)
            }
        }

        let engine = EngineBuilder::new().collect_spans(true).build();
        let matcher = RegexMatcher::multi("(?s)strike.+smoke");
        let mut spans = Spans(vec![]);
        engine
            .search_slice(
                &matcher,
                b"the strike of\nthe smoke rose\n",
                &mut spans,
            )
            .unwrap();
        // "strike of" on line 1, continuing into "the smoke" on line 2.
        assert_eq!(
            spans.0,
            vec![
                (1, false, vec![(4, 13)]),
                (2, true, vec![(0, 9)]),
            ]
        );
    }

    #[test]
    fn empty_match_ends_span_collection() {
        struct Spans(usize, bool);
        impl Report for Spans {
            fn line(&mut self, line: &Line) -> io::Result<Flow> {
                self.0 = line.spans().len();
                self.1 = line.class().is_selected();
                Ok(Flow::Continue)
            }
        }

        let matcher = RegexMatcher::new("x*");
        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut report = Spans(99, false);
        engine.search_slice(&matcher, b"abc\n", &mut report).unwrap();
        // The line is still selected, but no spans survive the zero
        // width cut-off.
        assert!(report.1);
        assert_eq!(report.0, 0);

        let engine = EngineBuilder::new()
            .collect_spans(true)
            .allow_empty(true)
            .build();
        let mut report = Spans(99, false);
        engine.search_slice(&matcher, b"abc\n", &mut report).unwrap();
        // Empty matches at offsets 0, 1 and 2; the one at the end of
        // the content is dropped.
        assert_eq!(report.0, 3);
    }

    #[test]
    fn report_can_stop_the_search() {
        struct StopAfterFirst(u64);
        impl Report for StopAfterFirst {
            fn line(&mut self, _: &Line) -> io::Result<Flow> {
                self.0 += 1;
                Ok(Flow::Stop)
            }
        }

        let engine = Engine::new();
        let mut report = StopAfterFirst(0);
        engine
            .search_slice(
                &RegexMatcher::new("harbor"),
                HAYSTACK.as_bytes(),
                &mut report,
            )
            .unwrap();
        assert_eq!(report.0, 1);
    }

    #[test]
    fn empty_input() {
        let engine = Engine::new();
        let got = transcript(&engine, &RegexMatcher::new("x"), "");
        assert_eq!("bytes:0\n", got);
    }

    #[test]
    fn spans_reported_for_selected_lines() {
        struct Spans(Vec<Vec<(usize, usize)>>);
        impl Report for Spans {
            fn line(&mut self, line: &Line) -> io::Result<Flow> {
                self.0.push(
                    line.spans()
                        .iter()
                        .map(|s| (s.start(), s.end()))
                        .collect(),
                );
                Ok(Flow::Continue)
            }
        }

        let engine = EngineBuilder::new().collect_spans(true).build();
        let mut report = Spans(vec![]);
        engine
            .search_slice(
                &RegexMatcher::new("o"),
                b"hello world\nnope\n",
                &mut report,
            )
            .unwrap();
        assert_eq!(report.0, vec![vec![(4, 5), (7, 8)], vec![(1, 2)]]);
    }
}
