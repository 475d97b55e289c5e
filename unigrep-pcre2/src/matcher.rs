use unigrep_matcher::{Match, Matcher};
use pcre2::bytes::{Regex, RegexBuilder};

use crate::error::Error;

/// A builder for configuring the compilation of a PCRE2 regex.
#[derive(Clone, Debug)]
pub struct RegexMatcherBuilder {
    builder: RegexBuilder,
    case_smart: bool,
    word: bool,
    whole_line: bool,
}

impl RegexMatcherBuilder {
    /// Create a new matcher builder with a default configuration.
    pub fn new() -> RegexMatcherBuilder {
        RegexMatcherBuilder {
            builder: RegexBuilder::new(),
            case_smart: false,
            word: false,
            whole_line: false,
        }
    }

    /// Compile the given pattern into a PCRE matcher using the current
    /// configuration.
    ///
    /// If there was a problem compiling the pattern, then an error is
    /// returned.
    pub fn build(&self, pattern: &str) -> Result<RegexMatcher, Error> {
        let mut builder = self.builder.clone();
        if self.case_smart && !has_uppercase_literal(pattern) {
            builder.caseless(true);
        }
        let pattern = if self.whole_line {
            format!(r"(?m:^)(?:{})(?m:$)", pattern)
        } else if self.word {
            // We make this option exclusive with whole_line because
            // when whole_line is enabled, all matches necessarily start
            // at a word boundary.
            format!(r"(?<![\w])(?:{})(?![\w])", pattern)
        } else {
            pattern.to_string()
        };
        builder
            .build(&pattern)
            .map_err(Error::regex)
            .map(|regex| RegexMatcher { regex })
    }

    /// Enables case insensitive matching.
    ///
    /// If the `utf` option is also set, then Unicode case folding is
    /// used to determine case insensitivity. When the `utf` option is
    /// not set, then only standard ASCII case insensitivity is
    /// considered.
    pub fn caseless(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.caseless(yes);
        self
    }

    /// Whether to enable "smart case" or not.
    ///
    /// When smart case is enabled, the builder will automatically enable
    /// case insensitive matching based on how the pattern is written.
    /// Namely, case insensitive mode is enabled when the pattern
    /// contains no uppercase literal.
    pub fn case_smart(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.case_smart = yes;
        self
    }

    /// Enables multi-line matching mode.
    ///
    /// When enabled, the `^` and `$` anchors will match both at the
    /// beginning and end of a subject string, in addition to matching at
    /// the start of a line and the end of a line, respectively.
    pub fn multi_line(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.multi_line(yes);
        self
    }

    /// Require that all matches occur on word boundaries.
    ///
    /// Enabling this option is subtly different than putting `\b`
    /// assertions on both sides of your pattern.
    pub fn word(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.word = yes;
        self
    }

    /// Require that all matches span entire lines.
    pub fn whole_line(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.whole_line = yes;
        self
    }

    /// Enable Unicode matching mode.
    ///
    /// When enabled, the following patterns become Unicode aware: `\b`,
    /// `\B`, `\d`, `\D`, `\s`, `\S`, `\w`, `\W`.
    ///
    /// When set, this implies UTF matching mode. It is not possible to
    /// enable Unicode matching mode without enabling UTF matching mode.
    ///
    /// This is disabled by default.
    pub fn ucp(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.ucp(yes);
        self
    }

    /// Enable UTF matching mode.
    ///
    /// When enabled, characters are treated as sequences of code units
    /// that make up a single codepoint instead of as single bytes. For
    /// example, this will cause `.` to match any single UTF-8 encoded
    /// codepoint, where as when this is disabled, `.` will any single
    /// byte (except for `\n` in both cases, unless "dot all" mode is
    /// enabled).
    ///
    /// This is disabled by default.
    pub fn utf(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.utf(yes);
        self
    }

    /// Enable PCRE2's JIT and return an error if it's not available.
    ///
    /// This generally speeds up matching quite a bit. The downside is
    /// that it can increase the time it takes to compile a pattern.
    ///
    /// If the JIT isn't available or if JIT compilation returns an
    /// error, then regex compilation will fail with the corresponding
    /// error.
    ///
    /// This is disabled by default, and always overrides
    /// `jit_if_available`.
    pub fn jit(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.jit(yes);
        self
    }

    /// Enable PCRE2's JIT if it's available.
    ///
    /// This generally speeds up matching quite a bit. The downside is
    /// that it can increase the time it takes to compile a pattern.
    ///
    /// If the JIT isn't available or if JIT compilation returns an
    /// error, then a debug message with the error will be emitted and
    /// the regex will otherwise silently fall back to non-JIT matching.
    ///
    /// This is disabled by default, and always overrides `jit`.
    pub fn jit_if_available(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.builder.jit_if_available(yes);
        self
    }
}

/// An implementation of the `Matcher` trait using PCRE2.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Create a new matcher from the given pattern using the default
    /// configuration.
    pub fn new(pattern: &str) -> Result<RegexMatcher, Error> {
        RegexMatcherBuilder::new().build(pattern)
    }
}

impl Matcher for RegexMatcher {
    type Error = Error;

    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Error> {
        Ok(self
            .regex
            .find_at(haystack, at)
            .map_err(Error::regex)?
            .map(|m| Match::new(m.start(), m.end())))
    }
}

/// Returns true if and only if the given pattern contains an uppercase
/// literal, scanning past backslash escapes.
fn has_uppercase_literal(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if c.is_uppercase() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use unigrep_matcher::Matcher;

    use super::RegexMatcherBuilder;

    #[test]
    fn word() {
        let m = RegexMatcherBuilder::new()
            .word(true)
            .build(r"-2")
            .unwrap();
        assert!(m.is_match(b"abc -2 foo").unwrap());

        let m = RegexMatcherBuilder::new()
            .word(false)
            .build(r"-2")
            .unwrap();
        assert!(m.is_match(b"abc -2 foo").unwrap());

        let m = RegexMatcherBuilder::new()
            .word(true)
            .build(r"2")
            .unwrap();
        assert!(!m.is_match(b"abc -2 foo").unwrap());
    }

    #[test]
    fn whole_line() {
        let m = RegexMatcherBuilder::new()
            .whole_line(true)
            .build(r"foo")
            .unwrap();
        assert!(m.is_match(b"foo").unwrap());
        assert!(!m.is_match(b"foo bar").unwrap());
    }

    #[test]
    fn case_smart() {
        let m = RegexMatcherBuilder::new()
            .case_smart(true)
            .build(r"abc")
            .unwrap();
        assert!(m.is_match(b"ABC").unwrap());

        let m = RegexMatcherBuilder::new()
            .case_smart(true)
            .build(r"aBc")
            .unwrap();
        assert!(!m.is_match(b"ABC").unwrap());
    }

    #[test]
    fn look_around() {
        // The whole point of the PCRE2 engine: syntax the default
        // engine rejects.
        let m = RegexMatcherBuilder::new()
            .build(r"foo(?!bar)")
            .unwrap();
        assert!(m.is_match(b"foobaz").unwrap());
        assert!(!m.is_match(b"foobar").unwrap());
    }
}
