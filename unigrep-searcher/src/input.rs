/*!
Uniform access to the bytes of a search source.

An [`Input`] wraps either a byte slice (typically a memory mapped file)
or a streaming reader (a plain file, standard input, or a transcoding or
decompressing wrapper), and offers the two access shapes the engine
needs: `read_line` hands out one line at a time for the streaming line
loop, and `read_all` produces the entire remaining contents for modes
that bind the matcher to the whole buffer.

The memory map policy also lives here, since whether `read_all` can be
zero copy is an input concern.
*/

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memmap2::Mmap;

use memchr::memchr;

/// The size a streaming line buffer starts out with.
const INITIAL_CAPACITY: usize = 8 * (1 << 10);

/// The largest file worth mapping into memory. Anything bigger falls
/// back to incremental reading, which also sidesteps needing more
/// address space than a 32 bit platform can give.
const MAX_MMAP_SIZE: u64 = 4 * (1 << 30);

/// Whether memory maps may be used for whole file access.
///
/// By default, memory maps are disabled.
#[derive(Clone, Debug)]
pub struct MmapChoice(bool);

impl Default for MmapChoice {
    fn default() -> MmapChoice {
        MmapChoice(false)
    }
}

impl MmapChoice {
    /// Use memory maps when a source qualifies: a regular file of at
    /// most 4 GiB whose declared encoding needs no transcoding.
    ///
    /// # Safety
    ///
    /// A file backed memory map is only sound while the underlying file
    /// is not truncated by another process. That cannot be guaranteed in
    /// general, so opting in is the caller's assertion that the risk of
    /// a `SIGBUS` is acceptable, as it usually is for a command line
    /// search tool.
    pub unsafe fn auto() -> MmapChoice {
        MmapChoice(true)
    }

    /// Never use memory maps. This is the default.
    pub fn never() -> MmapChoice {
        MmapChoice(false)
    }

    /// Map the given file if the policy and the file's size allow it.
    /// Any failure to map is reported as `None` so that the caller can
    /// silently fall back to buffered reading.
    pub(crate) fn open(&self, file: &File, path: Option<&Path>) -> Option<Mmap> {
        if !self.0 {
            return None;
        }
        match file.metadata() {
            Ok(md) if md.len() <= MAX_MMAP_SIZE => {}
            _ => return None,
        }
        // SAFETY: propagating the caller's `auto` assertion; see above.
        match unsafe { Mmap::map(file) } {
            Ok(mmap) => Some(mmap),
            Err(err) => {
                if let Some(path) = path {
                    log::debug!(
                        "{}: failed to open memory map: {}",
                        path.display(),
                        err
                    );
                } else {
                    log::debug!("failed to open memory map: {}", err);
                }
                None
            }
        }
    }
}

/// A source of bytes for one search.
pub struct Input<'s> {
    kind: Kind<'s>,
}

enum Kind<'s> {
    /// Contents that are already addressable, searched in place.
    Slice { data: &'s [u8], pos: usize },
    /// A stream, read incrementally through a growing line buffer.
    Stream(Stream<'s>),
}

struct Stream<'s> {
    rdr: Box<dyn Read + 's>,
    buf: Vec<u8>,
    /// The window of unconsumed bytes is `buf[start..end]`.
    start: usize,
    end: usize,
    eof: bool,
}

impl<'s> Input<'s> {
    /// Create an input over bytes that are already in memory.
    pub fn slice(data: &'s [u8]) -> Input<'s> {
        Input { kind: Kind::Slice { data, pos: 0 } }
    }

    /// Create an input over a streaming reader.
    pub fn reader(rdr: Box<dyn Read + 's>) -> Input<'s> {
        Input {
            kind: Kind::Stream(Stream {
                rdr,
                buf: vec![0; INITIAL_CAPACITY],
                start: 0,
                end: 0,
                eof: false,
            }),
        }
    }

    /// Copy the next line, including its terminator when present, into
    /// `line`. Returns false at the end of the source.
    ///
    /// A final line without a terminator is still returned. Lines longer
    /// than the internal buffer grow it as needed, so every line fits.
    pub fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        line.clear();
        match self.kind {
            Kind::Slice { data, ref mut pos } => {
                if *pos >= data.len() {
                    return Ok(false);
                }
                let upto = match memchr(b'\n', &data[*pos..]) {
                    Some(i) => *pos + i + 1,
                    None => data.len(),
                };
                line.extend_from_slice(&data[*pos..upto]);
                *pos = upto;
                Ok(true)
            }
            Kind::Stream(ref mut stream) => stream.read_line(line),
        }
    }

    /// Return all remaining contents of this input.
    ///
    /// For a slice this is the slice itself; for a stream the rest of
    /// the reader is pulled onto the heap first.
    pub fn read_all(&mut self) -> io::Result<&[u8]> {
        match self.kind {
            Kind::Slice { data, ref mut pos } => {
                let rest = &data[*pos..];
                *pos = data.len();
                Ok(rest)
            }
            Kind::Stream(ref mut stream) => stream.read_all(),
        }
    }
}

impl<'s> Stream<'s> {
    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        loop {
            if let Some(i) = memchr(b'\n', &self.buf[self.start..self.end]) {
                let upto = self.start + i + 1;
                line.extend_from_slice(&self.buf[self.start..upto]);
                self.start = upto;
                return Ok(true);
            }
            if self.eof {
                if self.start < self.end {
                    line.extend_from_slice(&self.buf[self.start..self.end]);
                    self.start = self.end;
                    return Ok(true);
                }
                return Ok(false);
            }
            // No terminator buffered yet: slide the partial line to the
            // front and pull in more bytes, growing when the line is
            // bigger than the whole buffer.
            if self.start > 0 {
                self.buf.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            }
            if self.end == self.buf.len() {
                let grown = self.buf.len() * 2;
                self.buf.resize(grown, 0);
            }
            match self.rdr.read(&mut self.buf[self.end..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.end += n,
                Err(ref err)
                    if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn read_all(&mut self) -> io::Result<&[u8]> {
        if !self.eof {
            // Keep whatever is buffered and append the rest.
            self.buf.truncate(self.end);
            loop {
                match self.rdr.read_to_end(&mut self.buf) {
                    Ok(_) => break,
                    Err(ref err)
                        if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => return Err(err),
                }
            }
            self.end = self.buf.len();
            self.eof = true;
        }
        Ok(&self.buf[self.start..self.end])
    }
}

#[cfg(test)]
mod tests {
    use super::Input;

    fn lines_of(mut input: Input) -> Vec<String> {
        let mut line = Vec::new();
        let mut all = vec![];
        while input.read_line(&mut line).unwrap() {
            all.push(String::from_utf8(line.clone()).unwrap());
        }
        all
    }

    #[test]
    fn slice_lines() {
        let input = Input::slice(b"a\nbb\nccc");
        assert_eq!(lines_of(input), vec!["a\n", "bb\n", "ccc"]);
    }

    #[test]
    fn slice_empty_and_blank() {
        assert_eq!(lines_of(Input::slice(b"")), Vec::<String>::new());
        assert_eq!(lines_of(Input::slice(b"\n")), vec!["\n"]);
        assert_eq!(lines_of(Input::slice(b"a\n\nb\n")), vec!["a\n", "\n", "b\n"]);
    }

    #[test]
    fn stream_lines() {
        let input = Input::reader(Box::new(&b"one\ntwo\nthree"[..]));
        assert_eq!(lines_of(input), vec!["one\n", "two\n", "three"]);
    }

    #[test]
    fn stream_line_longer_than_buffer() {
        // A line far bigger than the initial capacity must come back
        // whole.
        let big = "x".repeat(64 * 1024);
        let text = format!("{}\nend\n", big);
        let input = Input::reader(Box::new(text.as_bytes()));
        let got = lines_of(input);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], format!("{}\n", big));
        assert_eq!(got[1], "end\n");
    }

    #[test]
    fn read_all_slice_is_everything() {
        let mut input = Input::slice(b"a\nb\n");
        assert_eq!(input.read_all().unwrap(), b"a\nb\n");
    }

    #[test]
    fn read_all_stream_keeps_buffered_bytes() {
        let mut input = Input::reader(Box::new(&b"a\nb\nc\n"[..]));
        let mut line = Vec::new();
        // Consume one line, then drain the rest wholesale.
        assert!(input.read_line(&mut line).unwrap());
        assert_eq!(line, b"a\n");
        assert_eq!(input.read_all().unwrap(), b"b\nc\n");
    }
}
