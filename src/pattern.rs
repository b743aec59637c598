use regex::{Regex, RegexBuilder};

use crate::error::FanscanError;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// How a raw pattern string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntax {
    /// DOS-style wildcards: `*` is any run of characters, `?` is exactly one.
    /// The whole candidate must match.
    Wildcard,

    /// A regular expression, used verbatim. Matches anywhere in the candidate
    /// unless the expression anchors itself.
    Regex,
}

/// One compiled, case-insensitive name matcher.
///
/// Immutable once built and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw:    String,
    syntax: PatternSyntax,
    regex:  Regex,
}

impl Pattern {
    /// Compile `raw` as a wildcard pattern or, with `regex_mode`, as a regex.
    pub fn compile(raw: &str, regex_mode: bool) -> Result<Self, FanscanError> {
        if regex_mode {
            Self::regex(raw)
        } else {
            Self::wildcard(raw)
        }
    }

    /// Compile a DOS wildcard pattern such as `*.log` or `file?.txt`.
    pub fn wildcard(raw: &str) -> Result<Self, FanscanError> {
        let translated = wildcard_to_regex(raw);
        let regex = RegexBuilder::new(&translated)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| invalid(raw, e))?;

        Ok(Self {
            raw: raw.to_string(),
            syntax: PatternSyntax::Wildcard,
            regex,
        })
    }

    /// Compile a user-supplied regular expression.
    pub fn regex(raw: &str) -> Result<Self, FanscanError> {
        let regex = RegexBuilder::new(raw)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid(raw, e))?;

        Ok(Self {
            raw: raw.to_string(),
            syntax: PatternSyntax::Regex,
            regex,
        })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern as the user typed it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn syntax(&self) -> PatternSyntax {
        self.syntax
    }
}

/// Escape everything, then reinstate `*` and `?`, anchored at both ends.
fn wildcard_to_regex(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 2 + 2);
    out.push('^');
    let mut buf = [0u8; 4];
    for ch in raw.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c   => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}

fn invalid(raw: &str, err: regex::Error) -> FanscanError {
    FanscanError::InvalidPattern {
        pattern: raw.to_string(),
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// PatternSet
// ---------------------------------------------------------------------------

/// An ordered list of patterns. A candidate matches if any pattern does.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every raw pattern with the same syntax.
    ///
    /// Fails on the first pattern that doesn't compile, or if there are none.
    pub fn compile<I, S>(raws: I, regex_mode: bool) -> Result<Self, FanscanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raws
            .into_iter()
            .map(|raw| Pattern::compile(raw.as_ref(), regex_mode))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(patterns)
    }

    pub fn new(patterns: Vec<Pattern>) -> Result<Self, FanscanError> {
        if patterns.is_empty() {
            return Err(FanscanError::NoPatterns);
        }
        Ok(Self { patterns })
    }

    /// First match wins, in declaration order.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(candidate))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Matcher for PatternSet {
    fn is_match(&self, candidate: &str) -> bool {
        PatternSet::is_match(self, candidate)
    }
}
