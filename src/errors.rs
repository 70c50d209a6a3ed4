use thiserror::Error;

/// The result type for the `lexio` crate.
pub type Result<T> = std::result::Result<T, LexioError>;

/// The error type for the `lexio` crate.
#[derive(Error, Debug)]
pub struct LexioError {
    /// The source of the error.
    pub source: Box<LexioErrorKind>,
}

impl LexioError {
    /// Create a new `LexioError`.
    pub fn new(kind: LexioErrorKind) -> Self {
        LexioError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for LexioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum LexioErrorKind {
    /// A pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// A feature was requested that the engine does not support.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// An invalid option token was found in an option string.
    #[error("invalid option '{0}'")]
    InvalidOption(String),
}

impl From<PatternError> for LexioError {
    fn from(error: PatternError) -> Self {
        LexioError::new(LexioErrorKind::Pattern(error))
    }
}

impl From<std::io::Error> for LexioError {
    fn from(error: std::io::Error) -> Self {
        LexioError::new(LexioErrorKind::IoError(error))
    }
}

/// An error raised while compiling a pattern.
/// It carries the offending rule text and the byte offset of the error
/// within it.
#[derive(Error, Debug)]
#[error("error at position {offset} in pattern '{pattern}': {kind}")]
pub struct PatternError {
    /// What went wrong.
    pub kind: PatternErrorKind,
    /// The text of the rule that failed to compile.
    pub pattern: String,
    /// Byte offset of the error within the rule text.
    pub offset: usize,
}

impl PatternError {
    pub(crate) fn new(kind: PatternErrorKind, pattern: &str, offset: usize) -> Self {
        Self {
            kind,
            pattern: pattern.to_string(),
            offset,
        }
    }
}

/// The kinds of pattern compilation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternErrorKind {
    /// Unbalanced `(` and `)`.
    MismatchedParens,
    /// Unbalanced `{` and `}`.
    MismatchedBraces,
    /// Unbalanced `[` and `]`.
    MismatchedBrackets,
    /// Unbalanced `\Q...\E` or `"..."` quotation.
    MismatchedQuotation,
    /// An empty alternative in a multi-rule pattern.
    EmptyExpression,
    /// An empty character class.
    EmptyClass,
    /// An invalid character class.
    InvalidClass,
    /// An invalid character class range.
    InvalidClassRange,
    /// An invalid escape sequence.
    InvalidEscape,
    /// An invalid use of an anchor.
    InvalidAnchor,
    /// An invalid repetition such as `a{2,1}`.
    InvalidRepeat,
    /// A quantifier without an operand.
    InvalidQuantifier,
    /// An invalid inline modifier group.
    InvalidModifier,
    /// A syntax error not covered by a more specific kind.
    InvalidSyntax,
    /// The pattern exceeds the complexity limits of the engine.
    ExceedsLimits,
    /// An undefined `{name}` macro reference.
    UndefinedName,
}

impl std::fmt::Display for PatternErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            PatternErrorKind::MismatchedParens => "mismatched ( )",
            PatternErrorKind::MismatchedBraces => "mismatched { }",
            PatternErrorKind::MismatchedBrackets => "mismatched [ ]",
            PatternErrorKind::MismatchedQuotation => "mismatched quotation",
            PatternErrorKind::EmptyExpression => "empty expression",
            PatternErrorKind::EmptyClass => "empty character class",
            PatternErrorKind::InvalidClass => "invalid character class",
            PatternErrorKind::InvalidClassRange => "invalid character class range",
            PatternErrorKind::InvalidEscape => "invalid escape",
            PatternErrorKind::InvalidAnchor => "invalid anchor",
            PatternErrorKind::InvalidRepeat => "invalid repeat",
            PatternErrorKind::InvalidQuantifier => "invalid quantifier",
            PatternErrorKind::InvalidModifier => "invalid modifier",
            PatternErrorKind::InvalidSyntax => "invalid syntax",
            PatternErrorKind::ExceedsLimits => "exceeds complexity limits",
            PatternErrorKind::UndefinedName => "undefined macro name",
        };
        f.write_str(msg)
    }
}

/// Classify a `regex-syntax` error into the crate's taxonomy, keeping the
/// offset into the offending rule text.
pub(crate) fn classify_syntax_error(pattern: &str, error: &regex_syntax::Error) -> PatternError {
    use regex_syntax::ast::ErrorKind as Ast;
    match error {
        regex_syntax::Error::Parse(e) => {
            let offset = e.span().start.offset;
            let kind = match e.kind() {
                Ast::GroupUnclosed | Ast::GroupUnopened => PatternErrorKind::MismatchedParens,
                Ast::RepetitionCountUnclosed => PatternErrorKind::MismatchedBraces,
                Ast::ClassUnclosed => PatternErrorKind::MismatchedBrackets,
                Ast::ClassEscapeInvalid | Ast::UnicodeClassInvalid => PatternErrorKind::InvalidClass,
                Ast::ClassRangeInvalid | Ast::ClassRangeLiteral => {
                    PatternErrorKind::InvalidClassRange
                }
                Ast::EscapeHexEmpty
                | Ast::EscapeHexInvalid
                | Ast::EscapeHexInvalidDigit
                | Ast::EscapeUnexpectedEof
                | Ast::EscapeUnrecognized => PatternErrorKind::InvalidEscape,
                Ast::RepetitionCountInvalid
                | Ast::RepetitionCountDecimalEmpty
                | Ast::DecimalEmpty
                | Ast::DecimalInvalid => PatternErrorKind::InvalidRepeat,
                Ast::RepetitionMissing => PatternErrorKind::InvalidQuantifier,
                Ast::FlagDanglingNegation
                | Ast::FlagDuplicate { .. }
                | Ast::FlagRepeatedNegation { .. }
                | Ast::FlagUnexpectedEof
                | Ast::FlagUnrecognized => PatternErrorKind::InvalidModifier,
                Ast::SpecialWordBoundaryUnclosed | Ast::SpecialWordBoundaryUnrecognized => {
                    PatternErrorKind::InvalidAnchor
                }
                Ast::NestLimitExceeded(_) | Ast::CaptureLimitExceeded => {
                    PatternErrorKind::ExceedsLimits
                }
                _ => PatternErrorKind::InvalidSyntax,
            };
            PatternError::new(kind, pattern, offset)
        }
        regex_syntax::Error::Translate(e) => {
            let offset = e.span().start.offset;
            PatternError::new(PatternErrorKind::InvalidClass, pattern, offset)
        }
        _ => PatternError::new(PatternErrorKind::InvalidSyntax, pattern, 0),
    }
}
