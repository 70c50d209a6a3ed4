//! Option-string parsing for matchers and patterns.
//!
//! Both parsers accept tokens separated by `;` or simply adjacent, e.g.
//! `"AN"`, `"A;N;T=4"`, `"imsx"` or `"m;f=dump.gv,dump.txt"`.

use crate::{LexioError, LexioErrorKind, Result};

/// Options accepted by a matcher constructor and by `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatcherOptions {
    /// `A`: return all matches, including negative patterns.
    pub(crate) all: bool,
    /// `N`: permit zero-width (null) matches during `find`.
    pub(crate) nul: bool,
    /// `T=<digit>`: tab width used for column arithmetic, 1..=9.
    pub(crate) tab: u8,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            all: false,
            nul: false,
            tab: 8,
        }
    }
}

impl MatcherOptions {
    /// Parse a matcher option string of the form `(A|N|T(=[1-9])?|;)*`.
    pub(crate) fn parse(opt: &str) -> Result<Self> {
        let mut options = Self::default();
        let mut chars = opt.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                'A' => options.all = true,
                'N' => options.nul = true,
                'T' => {
                    if chars.peek() == Some(&'=') {
                        chars.next();
                    }
                    match chars.next() {
                        Some(d @ '1'..='9') => options.tab = d as u8 - b'0',
                        _ => {
                            return Err(LexioError::new(LexioErrorKind::InvalidOption(
                                "T requires a tab width of 1..9".to_string(),
                            )))
                        }
                    }
                }
                ';' | ' ' => {}
                other => {
                    return Err(LexioError::new(LexioErrorKind::InvalidOption(
                        other.to_string(),
                    )))
                }
            }
        }
        Ok(options)
    }
}

/// Options accepted by the pattern compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PatternOptions {
    /// `i`: case-insensitive matching.
    pub(crate) case_insensitive: bool,
    /// `m`: multi-line `^` and `$`.
    pub(crate) multi_line: bool,
    /// `s`: dot matches newline.
    pub(crate) dot_matches_new_line: bool,
    /// `x`: extended syntax with insignificant whitespace and comments.
    pub(crate) ignore_whitespace: bool,
    /// `q`: `"..."` sections in the pattern are matched literally.
    pub(crate) quote_mode: bool,
    /// `l`: a top-level `/` separates a rule from its trailing context.
    pub(crate) lookahead_slash: bool,
    /// `f=<file>[,<file>]`: dump the compiled pattern to the given files.
    pub(crate) dump_files: Vec<String>,
}

impl PatternOptions {
    /// Parse a pattern option string of the form `(i|m|s|x|q|l|f=<files>|;)*`.
    pub(crate) fn parse(opt: &str) -> Result<Self> {
        let mut options = Self::default();
        let mut chars = opt.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                'i' => options.case_insensitive = true,
                'm' => options.multi_line = true,
                's' => options.dot_matches_new_line = true,
                'x' => options.ignore_whitespace = true,
                'q' => options.quote_mode = true,
                'l' => options.lookahead_slash = true,
                'f' => {
                    if chars.next() != Some('=') {
                        return Err(LexioError::new(LexioErrorKind::InvalidOption(
                            "f requires '=<file>'".to_string(),
                        )));
                    }
                    let mut files = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == ';' {
                            break;
                        }
                        files.push(next);
                        chars.next();
                    }
                    options
                        .dump_files
                        .extend(files.split(',').filter(|f| !f.is_empty()).map(String::from));
                }
                ';' | ' ' => {}
                other => {
                    return Err(LexioError::new(LexioErrorKind::InvalidOption(
                        other.to_string(),
                    )))
                }
            }
        }
        Ok(options)
    }
}
