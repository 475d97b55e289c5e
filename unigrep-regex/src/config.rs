use unigrep_matcher::{ByteSet, LineTerminator};
use regex::bytes::{Regex, RegexBuilder};
use regex_syntax::ast::{self, Ast};
use regex_syntax::hir::Hir;

use crate::ast::{case_analysis, CaseAnalysis};
use crate::error::Error;
use crate::non_matching::non_matching_bytes;
use crate::strip::strip_from_match;

/// Config represents the configuration of a regex matcher in this crate.
/// The configuration is itself a rough combination of the knobs found in
/// the `regex` crate itself, along with additional `unigrep-matcher`
/// specific options.
///
/// The configuration can be used to build a "configured" HIR expression.
/// A configured HIR expression is an HIR expression that is aware of the
/// configuration which generated it, and provides transformation on that
/// HIR such that the configuration is preserved.
#[derive(Clone, Debug)]
pub struct Config {
    pub case_insensitive: bool,
    pub case_smart: bool,
    pub multi_line: bool,
    pub ignore_whitespace: bool,
    pub unicode: bool,
    pub size_limit: usize,
    pub nest_limit: u32,
    pub line_terminator: Option<LineTerminator>,
    pub word: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            case_insensitive: false,
            case_smart: false,
            multi_line: false,
            ignore_whitespace: false,
            unicode: true,
            // This size limit is much bigger than what's in the regex
            // crate.
            size_limit: 100 * (1 << 20),
            nest_limit: 250,
            line_terminator: None,
            word: false,
        }
    }
}

impl Config {
    /// Parse the given pattern and returned its HIR expression along with
    /// the current configuration.
    ///
    /// If there was a problem parsing the given expression then an error
    /// is returned.
    pub fn hir(&self, pattern: &str) -> Result<ConfiguredHIR, Error> {
        let analysis = case_analysis(&self.ast(pattern)?);
        let expr = regex_syntax::ParserBuilder::new()
            .nest_limit(self.nest_limit)
            .allow_invalid_utf8(true)
            .ignore_whitespace(self.ignore_whitespace)
            .case_insensitive(self.is_case_insensitive(&analysis))
            .multi_line(self.multi_line)
            .unicode(self.unicode)
            .build()
            .parse(pattern)
            .map_err(Error::regex)?;
        let expr = match self.line_terminator {
            None => expr,
            Some(line_term) => strip_from_match(expr, line_term)?,
        };
        Ok(ConfiguredHIR {
            original: pattern.to_string(),
            config: self.clone(),
            expr,
        })
    }

    /// Accounting for the `case_smart` config knob, return true if and only
    /// if this pattern should be matched case insensitively.
    fn is_case_insensitive(&self, analysis: &CaseAnalysis) -> bool {
        if self.case_insensitive {
            return true;
        }
        if !self.case_smart {
            return false;
        }
        analysis.any_literal && !analysis.any_uppercase
    }

    /// Parse the given pattern into its abstract syntax.
    ///
    /// This returns an error if the given pattern failed to parse.
    fn ast(&self, pattern: &str) -> Result<Ast, Error> {
        ast::parse::ParserBuilder::new()
            .nest_limit(self.nest_limit)
            .ignore_whitespace(self.ignore_whitespace)
            .build()
            .parse(pattern)
            .map_err(Error::regex)
    }
}

/// A "configured" HIR expression, which is aware of the configuration
/// which produced this HIR.
///
/// Since the configuration is tracked, values with this type can be
/// transformed into other HIR expressions (or regular expressions) in a
/// way that preserves the configuration. For example, the `with_pattern`
/// method can wrap the concrete syntax of this HIR while propagating the
/// size and nesting limits to the regex eventually compiled from it.
#[derive(Clone, Debug)]
pub struct ConfiguredHIR {
    original: String,
    config: Config,
    expr: Hir,
}

impl ConfiguredHIR {
    /// Return the configuration for this HIR expression.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute the set of non-matching bytes for this HIR expression.
    pub fn non_matching_bytes(&self) -> ByteSet {
        non_matching_bytes(&self.expr)
    }

    /// Builds a regular expression from this HIR expression.
    pub fn regex(&self) -> Result<Regex, Error> {
        self.pattern_to_regex(&self.expr.to_string())
    }

    /// Applies the given function to the concrete syntax of this HIR and
    /// then generates a new HIR based on the result of the function in a
    /// way that preserves the configuration.
    ///
    /// For example, this can be used to wrap a user provided regular
    /// expression with additional semantics. e.g., See the `WordMatcher`.
    pub fn with_pattern<F: FnMut(&str) -> String>(
        &self,
        mut f: F,
    ) -> Result<ConfiguredHIR, Error> {
        self.pattern_to_hir(&f(&self.expr.to_string()))
    }

    /// Create a regex from the given pattern using this HIR's
    /// configuration.
    fn pattern_to_regex(&self, pattern: &str) -> Result<Regex, Error> {
        // The settings we explicitly set here are intentionally a subset
        // of the settings we have. The key point here is that our HIR
        // expression is computed with the settings in mind, such that
        // setting them again here could actually lead to unintended
        // behavior. For example, `case_insensitive` is already folded
        // into the HIR, so applying it again would just be redundant
        // work. `ignore_whitespace` would be outright wrong, since the
        // concrete syntax emitted by the HIR printer never needs it.
        RegexBuilder::new(pattern)
            .nest_limit(self.config.nest_limit)
            .multi_line(self.config.multi_line)
            .unicode(self.config.unicode)
            .size_limit(self.config.size_limit)
            .build()
            .map_err(Error::regex)
    }

    /// Create an HIR expression from the given pattern using this HIR's
    /// configuration.
    fn pattern_to_hir(&self, pattern: &str) -> Result<ConfiguredHIR, Error> {
        // See `pattern_to_regex` comment for why we only set a subset of
        // knobs here.
        let expr = regex_syntax::ParserBuilder::new()
            .nest_limit(self.config.nest_limit)
            .allow_invalid_utf8(true)
            .multi_line(self.config.multi_line)
            .unicode(self.config.unicode)
            .build()
            .parse(pattern)
            .map_err(Error::regex)?;
        Ok(ConfiguredHIR {
            original: self.original.clone(),
            config: self.config.clone(),
            expr,
        })
    }
}
