/*!
The push interface between the engine and its consumers.

The engine drives the search and pushes one record per emitted line to a
[`Report`] implementation, along with block gaps, the binary file
notice, and an end-of-source summary. Consumers never see the engine
itself: everything a formatter needs to render a record travels in the
[`Line`] value, including the match spans when span collection was
requested.
*/

use std::io;

use unigrep_matcher::Match;

/// Whether the engine keeps going after a record was delivered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Keep searching this source.
    Continue,
    /// Stop this source now; `end` is still delivered.
    Stop,
}

impl Flow {
    /// Returns true for [`Flow::Stop`].
    pub fn is_stop(&self) -> bool {
        *self == Flow::Stop
    }
}

/// Why a line is being reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass {
    /// A line selected by the pattern, or by its complement under
    /// inversion.
    Selected,
    /// Leading context recalled from the ring.
    Before,
    /// Trailing context within the after-window of a selected line.
    After,
    /// A non-selected line shown because passthrough is in effect.
    Passthrough,
}

impl LineClass {
    /// Returns true if and only if this is a [`LineClass::Selected`]
    /// record.
    pub fn is_selected(&self) -> bool {
        *self == LineClass::Selected
    }

    /// Returns true for any of the contextual classes.
    pub fn is_context(&self) -> bool {
        !self.is_selected()
    }
}

/// One reported line.
#[derive(Clone, Debug)]
pub struct Line<'b> {
    pub(crate) bytes: &'b [u8],
    pub(crate) offset: u64,
    pub(crate) number: Option<u64>,
    pub(crate) class: LineClass,
    pub(crate) binary: bool,
    pub(crate) spans: &'b [Match],
    pub(crate) continued: bool,
}

impl<'b> Line<'b> {
    /// The line's bytes, including its terminator when the source had
    /// one.
    pub fn bytes(&self) -> &'b [u8] {
        self.bytes
    }

    /// The absolute byte offset of the line's first byte, counted in
    /// the bytes actually searched (after transcoding or
    /// decompression).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The 1-based line number, when the engine was asked to count
    /// lines.
    pub fn number(&self) -> Option<u64> {
        self.number
    }

    /// Why this line was reported.
    pub fn class(&self) -> LineClass {
        self.class
    }

    /// Whether the line was classified as binary under the engine's
    /// binary policy. Formatters use this to choose hex rendering.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// The match spans within this line, relative to `bytes`, in order
    /// and non-overlapping. Empty unless span collection was requested
    /// (and the line actually matched).
    pub fn spans(&self) -> &'b [Match] {
        self.spans
    }

    /// True when the first span continues a match that began on an
    /// earlier line. Formatters render such records with a continuation
    /// header.
    pub fn is_continuation(&self) -> bool {
        self.continued
    }
}

/// The end-of-source summary.
#[derive(Clone, Debug, Default)]
pub struct End {
    pub(crate) bytes_searched: u64,
    pub(crate) suppressed: bool,
}

impl End {
    /// The number of bytes this source fed to the matcher.
    pub fn bytes_searched(&self) -> u64 {
        self.bytes_searched
    }

    /// True when the source was classified as binary under the
    /// without-match policy. Consumers must then report the source as
    /// having no matches at all.
    pub fn suppressed(&self) -> bool {
        self.suppressed
    }
}

/// A consumer of engine output.
///
/// The engine calls `begin` once per source, then any number of `line`,
/// `gap` and `binary_file` notifications, and finally `end` — which is
/// delivered both at the natural end of a source and after a consumer
/// asked to stop, but not when an error aborted the search.
///
/// All methods default to doing nothing and continuing, so a consumer
/// implements only what it renders.
pub trait Report {
    /// Called before any other notification for a source.
    fn begin(&mut self) -> io::Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Called for every emitted line.
    fn line(&mut self, _line: &Line) -> io::Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Called between non-contiguous blocks of output when context
    /// reporting is enabled.
    fn gap(&mut self) -> io::Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Called once when a selected line turned out to be binary under
    /// the `binary` policy; the source halts right after.
    fn binary_file(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Called when a source is done.
    fn end(&mut self, _end: &End) -> io::Result<()> {
        Ok(())
    }
}

impl<'a, T: Report> Report for &'a mut T {
    fn begin(&mut self) -> io::Result<Flow> {
        (**self).begin()
    }

    fn line(&mut self, line: &Line) -> io::Result<Flow> {
        (**self).line(line)
    }

    fn gap(&mut self) -> io::Result<Flow> {
        (**self).gap()
    }

    fn binary_file(&mut self) -> io::Result<()> {
        (**self).binary_file()
    }

    fn end(&mut self, end: &End) -> io::Result<()> {
        (**self).end(end)
    }
}
