/*!
This crate provides the low level interface between a pattern matcher and
the search engine. The two principal exports are the [`Matcher`] trait,
which describes the smallest useful surface of a regex-like matcher over
bytes, and the [`Match`] type, which reports the byte range of a single
match.

The point of this interface is to decouple the engine that walks lines of
input from the engine that recognizes patterns, so that differently
implemented matchers (finite automata based, Perl compatible) can drive
the same search code.
*/

#![deny(missing_docs)]

use std::fmt;
use std::io;
use std::ops;

/// The type of a match.
///
/// The type of a match is a possibly empty range pointing to a contiguous
/// block of addressable memory.
///
/// Every `Match` is guaranteed to satisfy the invariant that
/// `start <= end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Match {
    start: usize,
    end: usize,
}

impl Match {
    /// Create a new match.
    ///
    /// # Panics
    ///
    /// This function panics if `start > end`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Match {
        assert!(start <= end);
        Match { start, end }
    }

    /// Creates a zero width match at the given offset.
    #[inline]
    pub fn zero(offset: usize) -> Match {
        Match { start: offset, end: offset }
    }

    /// Return the start offset of this match.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Return the end offset of this match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Return a new match with the start offset replaced by the given
    /// value.
    ///
    /// # Panics
    ///
    /// This method panics if `start > self.end`.
    #[inline]
    pub fn with_start(&self, start: usize) -> Match {
        assert!(start <= self.end);
        Match { start, ..*self }
    }

    /// Return a new match with the end offset replaced by the given
    /// value.
    ///
    /// # Panics
    ///
    /// This method panics if `end < self.start`.
    #[inline]
    pub fn with_end(&self, end: usize) -> Match {
        assert!(self.start <= end);
        Match { end, ..*self }
    }

    /// Offset this match by the given amount and return a new match.
    ///
    /// This adds the given offset to the start and end of this match, and
    /// returns the resulting match.
    ///
    /// # Panics
    ///
    /// This panics if adding the given amount to either the start or end
    /// offset would result in an overflow.
    #[inline]
    pub fn offset(&self, amount: usize) -> Match {
        Match {
            start: self.start.checked_add(amount).unwrap(),
            end: self.end.checked_add(amount).unwrap(),
        }
    }

    /// Returns the number of bytes in this match.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if and only if this match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ops::Index<Match> for [u8] {
    type Output = [u8];

    #[inline]
    fn index(&self, index: Match) -> &[u8] {
        &self[index.start..index.end]
    }
}

impl ops::IndexMut<Match> for [u8] {
    #[inline]
    fn index_mut(&mut self, index: Match) -> &mut [u8] {
        &mut self[index.start..index.end]
    }
}

impl ops::Index<Match> for str {
    type Output = str;

    #[inline]
    fn index(&self, index: Match) -> &str {
        &self[index.start..index.end]
    }
}

/// A line terminator.
///
/// A line terminator represents the end of a line: either a single byte
/// (most commonly `\n`) or the two byte `\r\n` sequence. It is stored
/// as a tiny fixed buffer plus a length, which makes the byte slice view
/// free.
///
/// The default line terminator is `\n` on all platforms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineTerminator {
    bytes: [u8; 2],
    len: u8,
}

impl LineTerminator {
    /// Return a new single-byte line terminator. Any byte is valid.
    #[inline]
    pub fn byte(byte: u8) -> LineTerminator {
        LineTerminator { bytes: [byte, 0], len: 1 }
    }

    /// Return a new line terminator represented by `\r\n`.
    ///
    /// When this is used, consumers may generally treat a lone `\n` as
    /// a line terminator in addition to `\r\n`.
    #[inline]
    pub fn crlf() -> LineTerminator {
        LineTerminator { bytes: [b'\r', b'\n'], len: 2 }
    }

    /// Returns true if and only if this line terminator is CRLF.
    #[inline]
    pub fn is_crlf(&self) -> bool {
        self.len == 2
    }

    /// Returns this line terminator as a single byte.
    ///
    /// For CRLF this is `\n`, which is the byte that actually ends a
    /// line; routines that split on a single byte rely on that.
    #[inline]
    pub fn as_byte(&self) -> u8 {
        self.bytes[usize::from(self.len) - 1]
    }

    /// Returns this line terminator as a sequence of bytes, of length
    /// one or two.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Returns true if and only if the given slice ends with this line
    /// terminator.
    ///
    /// For CRLF this only checks whether the last byte is `\n`.
    #[inline]
    pub fn is_suffix(&self, slice: &[u8]) -> bool {
        slice.last().map_or(false, |&b| b == self.as_byte())
    }
}

impl Default for LineTerminator {
    #[inline]
    fn default() -> LineTerminator {
        LineTerminator::byte(b'\n')
    }
}

/// A set of bytes.
///
/// In this crate, byte sets are used to express bytes that can never
/// appear anywhere in a match for a particular implementation of the
/// `Matcher` trait. If such a set can be determined, then it's possible
/// for callers to perform additional operations on the basis that
/// certain bytes may never match.
///
/// For example, if a search is configured to possibly produce results
/// that span multiple lines but a caller provided pattern can never match
/// across multiple lines, then it may make sense to divert to more
/// optimized line oriented routines that don't need to handle the
/// multi-line match case.
#[derive(Clone, Copy)]
pub struct ByteSet {
    /// One bit per byte value, split across two 128 bit halves.
    halves: [u128; 2],
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let members: Vec<u8> =
            (0..=255).filter(|&b| self.contains(b)).collect();
        f.debug_tuple("ByteSet").field(&members).finish()
    }
}

impl ByteSet {
    /// Create an empty set of bytes.
    #[inline]
    pub fn empty() -> ByteSet {
        ByteSet { halves: [0, 0] }
    }

    /// Create a full set of bytes such that every possible byte is in
    /// the set returned.
    #[inline]
    pub fn full() -> ByteSet {
        ByteSet { halves: [u128::MAX, u128::MAX] }
    }

    /// Add a byte to this set.
    ///
    /// If the given byte already belongs to this set, then this is a
    /// no-op.
    #[inline]
    pub fn add(&mut self, byte: u8) {
        self.halves[usize::from(byte >> 7)] |= 1u128 << (byte & 0x7F);
    }

    /// Remove a byte from this set.
    ///
    /// If the given byte is not in this set, then this is a no-op.
    #[inline]
    pub fn remove(&mut self, byte: u8) {
        self.halves[usize::from(byte >> 7)] &= !(1u128 << (byte & 0x7F));
    }

    /// Return true if and only if the given byte is in this set.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.halves[usize::from(byte >> 7)] & (1u128 << (byte & 0x7F)) != 0
    }
}

/// The type of match for a line oriented matcher.
#[derive(Clone, Copy, Debug)]
pub enum LineMatchKind {
    /// A position inside a line that is known to contain a match.
    ///
    /// This position can be anywhere in the line. It does not need to
    /// point at the location of the match.
    Confirmed(usize),
    /// A position inside a line that may contain a match, and must be
    /// searched for verification.
    ///
    /// This position can be anywhere in the line. It does not need to
    /// point at the location of the match.
    Candidate(usize),
}

/// A matcher defines an interface for regular expression implementations.
///
/// While this trait is not small, there is only one required method that
/// implementors must provide: `find_at` (along with a definition of the
/// error type). All other methods have default implementations in terms
/// of `find_at`, although specific implementations may provide faster
/// variants.
pub trait Matcher {
    /// The error type used by this matcher.
    ///
    /// For matchers in which an error is impossible, it is recommended to
    /// use the `NoError` type in this crate.
    type Error: fmt::Display;

    /// Returns the start and end byte range of the first match in
    /// `haystack` after `at`, where the byte offsets are relative to that
    /// start of `haystack` (and not `at`). If no match exists, then
    /// `None` is returned.
    ///
    /// The significance of the starting point is that it takes the
    /// surrounding context into consideration. For example, the `\A`
    /// anchor can only match when `at == 0`.
    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Self::Error>;

    /// Returns the start and end byte range of the first match in
    /// `haystack`. If no match exists, then `None` is returned.
    fn find(&self, haystack: &[u8]) -> Result<Option<Match>, Self::Error> {
        self.find_at(haystack, 0)
    }

    /// Executes the given function over successive non-overlapping
    /// matches in `haystack`. If no match exists, then the given function
    /// is never called. If the function returns `false`, then iteration
    /// stops.
    fn find_iter<F>(
        &self,
        haystack: &[u8],
        mut matched: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut(Match) -> bool,
    {
        self.try_find_iter(haystack, |m| Ok(matched(m)))
            .map(|r: Result<(), ()>| r.unwrap())
    }

    /// Executes the given function over successive non-overlapping
    /// matches in `haystack`. If no match exists, then the given function
    /// is never called. If the function returns `false`, then iteration
    /// stops. Similarly, if the function returns an error then iteration
    /// stops and the error is yielded.
    fn try_find_iter<F, E>(
        &self,
        haystack: &[u8],
        mut matched: F,
    ) -> Result<Result<(), E>, Self::Error>
    where
        F: FnMut(Match) -> Result<bool, E>,
    {
        let mut at = 0;
        let mut prev_end: Option<usize> = None;
        while at <= haystack.len() {
            let m = match self.find_at(haystack, at)? {
                None => break,
                Some(m) => m,
            };
            if m.is_empty() {
                // An empty match makes no progress on its own, so the
                // next search starts one past it. An empty match sitting
                // right where the previous match ended is an artifact of
                // that stepping and is not reported.
                at = m.end() + 1;
                if prev_end == Some(m.end()) {
                    continue;
                }
            } else {
                at = m.end();
            }
            prev_end = Some(m.end());
            match matched(m) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return Ok(Err(err)),
            }
        }
        Ok(Ok(()))
    }

    /// Returns true if and only if the matcher matches the given
    /// haystack.
    ///
    /// By default, this method is implemented by calling
    /// `shortest_match`.
    fn is_match(&self, haystack: &[u8]) -> Result<bool, Self::Error> {
        Ok(self.shortest_match(haystack)?.is_some())
    }

    /// Returns an end location of the first match in `haystack`. If no
    /// match exists, then `None` is returned.
    ///
    /// Note that the end location reported by this method may be less
    /// than the same end location reported by `find`. For example,
    /// running `find` with the pattern `a+` on the haystack `aaa` should
    /// report a range of `[0, 3)`, but `shortest_match` may report `1` as
    /// the ending location since that is the place at which a match is
    /// determined to exist.
    ///
    /// This method should never report false positives or false
    /// negatives. The point of this method is that some implementors may
    /// be able to provide a faster implementation of this than what
    /// `find` does.
    fn shortest_match(
        &self,
        haystack: &[u8],
    ) -> Result<Option<usize>, Self::Error> {
        Ok(self.find(haystack)?.map(|m| m.end()))
    }

    /// If available, return a line terminator that this matcher will
    /// never produce a match that contains.
    ///
    /// When available, this enables callers to run a line oriented search
    /// without resorting to handling the case of a match spanning
    /// multiple lines.
    ///
    /// By default, this returns `None`.
    fn line_terminator(&self) -> Option<LineTerminator> {
        None
    }

    /// If available, return a set of bytes that will never appear in a
    /// match produced by an implementation.
    ///
    /// By default, this returns `None`.
    fn non_matching_bytes(&self) -> Option<&ByteSet> {
        None
    }

    /// Return one of the following: a confirmed line match, a candidate
    /// line match (which may be a false positive) or no match at all
    /// (which **must not** be a false negative). When reporting a
    /// confirmed or candidate match, the position returned can be any
    /// position in the line.
    ///
    /// By default, this never returns a candidate match, and always
    /// either returns a confirmed match or no match at all.
    ///
    /// When a matcher can match spans over multiple lines, then the
    /// behavior of this method is unspecified. Namely, use of this method
    /// only makes sense in a context where the caller is looking for the
    /// next matching line. That is, callers should only use this method
    /// when `line_terminator` does not return `None`.
    fn find_candidate_line(
        &self,
        haystack: &[u8],
    ) -> Result<Option<LineMatchKind>, Self::Error> {
        Ok(self.shortest_match(haystack)?.map(LineMatchKind::Confirmed))
    }
}

impl<'a, M: Matcher> Matcher for &'a M {
    type Error = M::Error;

    #[inline]
    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Self::Error> {
        (*self).find_at(haystack, at)
    }

    #[inline]
    fn find(&self, haystack: &[u8]) -> Result<Option<Match>, Self::Error> {
        (*self).find(haystack)
    }

    #[inline]
    fn find_iter<F>(
        &self,
        haystack: &[u8],
        matched: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut(Match) -> bool,
    {
        (*self).find_iter(haystack, matched)
    }

    #[inline]
    fn try_find_iter<F, E>(
        &self,
        haystack: &[u8],
        matched: F,
    ) -> Result<Result<(), E>, Self::Error>
    where
        F: FnMut(Match) -> Result<bool, E>,
    {
        (*self).try_find_iter(haystack, matched)
    }

    #[inline]
    fn is_match(&self, haystack: &[u8]) -> Result<bool, Self::Error> {
        (*self).is_match(haystack)
    }

    #[inline]
    fn shortest_match(
        &self,
        haystack: &[u8],
    ) -> Result<Option<usize>, Self::Error> {
        (*self).shortest_match(haystack)
    }

    #[inline]
    fn line_terminator(&self) -> Option<LineTerminator> {
        (*self).line_terminator()
    }

    #[inline]
    fn non_matching_bytes(&self) -> Option<&ByteSet> {
        (*self).non_matching_bytes()
    }

    #[inline]
    fn find_candidate_line(
        &self,
        haystack: &[u8],
    ) -> Result<Option<LineMatchKind>, Self::Error> {
        (*self).find_candidate_line(haystack)
    }
}

/// An error type used for methods that can never error.
///
/// This error type cannot be constructed, and is used as the
/// `Matcher::Error` associated type for matcher implementations that can
/// never fail at search time.
#[derive(Debug, Eq, PartialEq)]
pub struct NoError(());

impl ::std::error::Error for NoError {
    fn description(&self) -> &str {
        "no error"
    }
}

impl fmt::Display for NoError {
    fn fmt(&self, _: &mut fmt::Formatter) -> fmt::Result {
        panic!("BUG for NoError: an impossible error occurred")
    }
}

impl From<NoError> for io::Error {
    fn from(_: NoError) -> io::Error {
        panic!("BUG for NoError: an impossible error occurred")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_set_full_and_empty() {
        let set = ByteSet::empty();
        for b in 0..=255u8 {
            assert!(!set.contains(b));
        }
        let set = ByteSet::full();
        for b in 0..=255u8 {
            assert!(set.contains(b));
        }
    }

    #[test]
    fn byte_set_add_remove() {
        let mut set = ByteSet::empty();
        set.add(b'\n');
        set.add(0);
        set.add(255);
        assert!(set.contains(b'\n'));
        assert!(set.contains(0));
        assert!(set.contains(255));
        assert!(!set.contains(b'a'));
        set.remove(b'\n');
        assert!(!set.contains(b'\n'));
        assert!(set.contains(0));
    }

    #[test]
    fn line_terminator_suffix() {
        let lf = LineTerminator::byte(b'\n');
        assert!(lf.is_suffix(b"abc\n"));
        assert!(!lf.is_suffix(b"abc"));
        assert!(!lf.is_suffix(b""));

        let crlf = LineTerminator::crlf();
        assert_eq!(crlf.as_byte(), b'\n');
        assert_eq!(crlf.as_bytes(), b"\r\n");
        assert!(crlf.is_suffix(b"abc\n"));
    }

    #[test]
    fn match_slicing() {
        let haystack = b"hello world";
        let m = Match::new(6, 11);
        assert_eq!(&haystack[m], b"world");
        assert_eq!(m.len(), 5);
        assert!(!m.is_empty());
        assert_eq!(m.offset(1), Match::new(7, 12));
    }
}
