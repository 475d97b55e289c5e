use std::io;
use std::str;

use unigrep_matcher::{LineTerminator, Match, Matcher, NoError};
use regex::bytes::Regex;

use crate::engine::Engine;
use crate::report::{End, Flow, Line, LineClass, Report};

/// A simple regex matcher for tests.
///
/// `new` claims the `\n` line terminator guarantee, which sends the
/// engine down the streaming strategy; `multi` makes no such claim, so
/// the engine binds the whole source. Tests pick whichever strategy
/// they mean to exercise.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    regex: Regex,
    line_term: Option<LineTerminator>,
}

impl RegexMatcher {
    /// A matcher that promises never to match through `\n`.
    pub fn new(pattern: &str) -> RegexMatcher {
        RegexMatcher {
            regex: Regex::new(pattern).unwrap(),
            line_term: Some(LineTerminator::byte(b'\n')),
        }
    }

    /// A matcher that may match through line terminators.
    pub fn multi(pattern: &str) -> RegexMatcher {
        RegexMatcher { regex: Regex::new(pattern).unwrap(), line_term: None }
    }
}

impl Matcher for RegexMatcher {
    type Error = NoError;

    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, NoError> {
        Ok(self
            .regex
            .find_at(haystack, at)
            .map(|m| Match::new(m.start(), m.end())))
    }

    fn line_terminator(&self) -> Option<LineTerminator> {
        self.line_term
    }
}

/// A report that records everything the engine pushes as a plain text
/// transcript:
///
/// * lines as `number<sep>offset<sep>text` (the number field is absent
///   when line counting is off), where the separator encodes the class:
///   `:` selected, `-` before, `+` after, `~` passthrough;
/// * gaps as `--`;
/// * the binary notice as `BINARY`;
/// * the end summary as `bytes:<n>`, followed by `suppressed` when the
///   source was rejected as binary.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    log: Vec<u8>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn transcript(&self) -> &str {
        str::from_utf8(&self.log).unwrap()
    }
}

impl Report for Recorder {
    fn line(&mut self, line: &Line) -> io::Result<Flow> {
        let sep = match line.class() {
            LineClass::Selected => b':',
            LineClass::Before => b'-',
            LineClass::After => b'+',
            LineClass::Passthrough => b'~',
        };
        if let Some(n) = line.number() {
            self.log.extend_from_slice(n.to_string().as_bytes());
            self.log.push(sep);
        }
        self.log.extend_from_slice(line.offset().to_string().as_bytes());
        self.log.push(sep);
        self.log.extend_from_slice(line.bytes());
        if line.bytes().last() != Some(&b'\n') {
            self.log.push(b'\n');
        }
        Ok(Flow::Continue)
    }

    fn gap(&mut self) -> io::Result<Flow> {
        self.log.extend_from_slice(b"--\n");
        Ok(Flow::Continue)
    }

    fn binary_file(&mut self) -> io::Result<()> {
        self.log.extend_from_slice(b"BINARY\n");
        Ok(())
    }

    fn end(&mut self, end: &End) -> io::Result<()> {
        self.log.extend_from_slice(b"bytes:");
        self.log
            .extend_from_slice(end.bytes_searched().to_string().as_bytes());
        self.log.push(b'\n');
        if end.suppressed() {
            self.log.extend_from_slice(b"suppressed\n");
        }
        Ok(())
    }
}

/// Search the haystack as a slice and return the transcript.
pub fn transcript(
    engine: &Engine,
    matcher: &RegexMatcher,
    haystack: &str,
) -> String {
    let mut recorder = Recorder::new();
    engine
        .search_slice(matcher, haystack.as_bytes(), &mut recorder)
        .unwrap();
    recorder.transcript().to_string()
}

/// Search the haystack through a streaming reader and return the
/// transcript.
pub fn transcript_reader(
    engine: &Engine,
    matcher: &RegexMatcher,
    haystack: &str,
) -> String {
    let mut recorder = Recorder::new();
    engine
        .search_reader(matcher, haystack.as_bytes(), &mut recorder)
        .unwrap();
    recorder.transcript().to_string()
}
