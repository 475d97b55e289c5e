use std::cell::RefCell;

use unigrep_matcher::{Match, Matcher, NoError};
use regex::bytes::{CaptureLocations, Regex};

use crate::config::ConfiguredHIR;
use crate::error::Error;

/// A matcher for implementing "word match" semantics.
#[derive(Clone, Debug)]
pub struct WordMatcher {
    /// The regex which is roughly `(?:^|\W)(<original pattern>)(?:$|\W)`.
    regex: Regex,
    /// A reusable buffer for finding the match location of the inner
    /// group. Searches are single threaded, so a plain `RefCell` is all
    /// the caching we need.
    locs: RefCell<CaptureLocations>,
}

impl WordMatcher {
    /// Create a new matcher from the given pattern that only produces
    /// matches that are considered "words."
    ///
    /// The given options are used to construct the regular expression
    /// internally.
    pub fn new(expr: &ConfiguredHIR) -> Result<WordMatcher, Error> {
        let word_expr = expr.with_pattern(|pat| {
            format!(r"(?:(?m:^)|\W)({})(?:(?m:$)|\W)", pat)
        })?;
        let regex = word_expr.regex()?;
        let locs = RefCell::new(regex.capture_locations());
        Ok(WordMatcher { regex, locs })
    }
}

impl Matcher for WordMatcher {
    type Error = NoError;

    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, NoError> {
        // To make this easy to get right, we extract captures here
        // instead of calling `find_at`. The actual match is at capture
        // group `1` instead of `0`. We *could* use `find_at` here and
        // then trim the match after the fact, but that's a bit harder to
        // get right, and it's not clear if it's worth it.
        let mut caps = self.locs.borrow_mut();
        self.regex.captures_read_at(&mut caps, haystack, at);
        Ok(caps.get(1).map(|m| Match::new(m.0, m.1)))
    }

    // We specifically do not implement other methods like find_iter.
    // Namely, the iter methods are guaranteed to be correct by virtue of
    // implementing find_at above.
}

#[cfg(test)]
mod tests {
    use unigrep_matcher::Matcher;

    use super::WordMatcher;
    use crate::config::Config;

    fn matcher(pattern: &str) -> WordMatcher {
        let chir = Config::default().hir(pattern).unwrap();
        WordMatcher::new(&chir).unwrap()
    }

    fn find(pattern: &str, haystack: &str) -> Option<(usize, usize)> {
        matcher(pattern)
            .find(haystack.as_bytes())
            .unwrap()
            .map(|m| (m.start(), m.end()))
    }

    #[test]
    fn various() {
        assert_eq!(Some((0, 3)), find(r"foo", "foo"));
        assert_eq!(Some((0, 3)), find(r"foo", "foo("));
        assert_eq!(Some((1, 4)), find(r"foo", "!foo("));
        assert_eq!(None, find(r"foo", "!afoo("));
        assert_eq!(Some((0, 3)), find(r"foo", "foo☃"));
        assert_eq!(None, find(r"foo", "fooб"));

        // A `\b` assertion would reject this, since `-` is not a word
        // character.
        assert_eq!(Some((0, 2)), find(r"-2", "-2"));
    }
}
