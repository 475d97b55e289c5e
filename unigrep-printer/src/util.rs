use std::borrow::Cow;
use std::path::Path;

/// A simple encapsulation of a file path used by a printer.
///
/// This represents any transforms that we might want to perform on the
/// path, such as converting it to valid UTF-8. This allows us to
/// amortize work if we are printing the file path for every match.
///
/// In the common case, no transformation is needed, which lets us avoid
/// the allocation. Typically, only Windows requires a transform, since
/// we can't access the raw bytes of a path directly and first need to
/// lossily convert to UTF-8.
#[derive(Clone, Debug)]
pub struct PrinterPath<'a>(Cow<'a, [u8]>);

impl<'a> PrinterPath<'a> {
    /// Create a new path suitable for printing.
    pub fn new(path: &'a Path) -> PrinterPath<'a> {
        PrinterPath::new_impl(path)
    }

    #[cfg(unix)]
    fn new_impl(path: &'a Path) -> PrinterPath<'a> {
        use std::os::unix::ffi::OsStrExt;
        PrinterPath(Cow::Borrowed(path.as_os_str().as_bytes()))
    }

    #[cfg(not(unix))]
    fn new_impl(path: &'a Path) -> PrinterPath<'a> {
        PrinterPath(match path.to_string_lossy() {
            Cow::Owned(path) => Cow::Owned(path.into_bytes()),
            Cow::Borrowed(path) => Cow::Borrowed(path.as_bytes()),
        })
    }

    /// Return the raw bytes for this path.
    pub fn as_bytes(&self) -> &[u8] {
        &*self.0
    }
}

/// Compute the column of the byte at `pos` within `line`, expanding
/// tabs to the given width. Columns are zero based.
pub fn tab_expanded_column(line: &[u8], pos: usize, tab_width: u64) -> u64 {
    let tab_width = std::cmp::max(1, tab_width);
    let mut col = 0u64;
    for &b in line.iter().take(pos) {
        if b == b'\t' {
            col += tab_width - col % tab_width;
        } else {
            col += 1;
        }
    }
    col
}
