#![forbid(missing_docs)]
//! # `lexio`
//! The `lexio` crate is a streaming regular-expression lexer engine. A
//! [`Pattern`] compiles an ordered set of alternative rules; a [`Matcher`]
//! scans an [`Input`] — a string, a wide string, a file with encoding
//! detection, or a generic byte stream — and reports which rule matched at
//! each position. Matching is buffered and bounded: input is pulled into a
//! growable window on demand, partial matches at the window edge trigger a
//! refill and retry, and matches never silently stop at a buffer boundary.
//!
//! The four matching methods are `scan` (anchored at the current position),
//! `find` (search forward), `split` (text between matches) and `matches`
//! (the whole remaining input). On top of the matcher, [`Lexer`] adds the
//! start-condition stack, saved-matcher stack, echoing and error policy
//! that tokenizers need.
//!
//! # Example with a simple rule alternation
//! ```rust
//! use lexio::{Matcher, Pattern};
//!
//! // Rules are the top-level alternatives; accepts are their 1-based
//! // positions.
//! let pattern = Pattern::new(r"[0-9]+|[a-z_][a-z0-9_]*|=|;").unwrap();
//! let mut matcher = Matcher::new(&pattern, "a = 10;");
//!
//! let mut tokens = Vec::new();
//! loop {
//!     match matcher.find() {
//!         0 => break,
//!         accept => tokens.push((accept, matcher.text_lossy().into_owned())),
//!     }
//! }
//! assert_eq!(
//!     tokens,
//!     vec![
//!         (2, "a".to_string()),
//!         (3, "=".to_string()),
//!         (1, "10".to_string()),
//!         (4, ";".to_string()),
//!     ]
//! );
//! ```
//!
//! # Example splitting an input
//! ```rust
//! use lexio::{Matcher, Pattern, EMPTY};
//!
//! let pattern = Pattern::new(r"[ \t]+").unwrap();
//! let mut matcher = Matcher::new(&pattern, "ab c  d");
//! let mut fields = Vec::new();
//! loop {
//!     match matcher.split() {
//!         0 => break,
//!         accept => {
//!             fields.push(matcher.text_lossy().into_owned());
//!             if accept == EMPTY {
//!                 break;
//!             }
//!         }
//!     }
//! }
//! assert_eq!(fields, vec!["ab", "c", "d"]);
//! ```
//!
//! # Example scanning a wide input
//! ```rust
//! use lexio::{Input, Matcher, Pattern};
//!
//! // Wide sources are converted to UTF-8 while scanning.
//! let wide: Vec<u16> = "Copyright ©".encode_utf16().collect();
//! let pattern = Pattern::new(r"\w+|©| ").unwrap();
//! let mut matcher = Matcher::new(&pattern, Input::from_utf16(wide.as_slice()));
//! let mut accepts = Vec::new();
//! loop {
//!     match matcher.scan() {
//!         0 => break,
//!         accept => accepts.push(accept),
//!     }
//! }
//! assert_eq!(accepts, vec![1, 3, 2]);
//! ```

/// Module with the encoding constants and code pages for file input.
pub mod encoding;
pub use encoding::{CodePage, Encoding};

/// Module with the error types.
mod errors;
pub use errors::{LexioError, LexioErrorKind, PatternError, PatternErrorKind, Result};

/// Module with the unified input source.
mod input;
pub use input::Input;

/// The module with internal implementation details.
mod internal;

/// The module with the lexer surface.
mod lexer;
pub use lexer::{ErrorHandler, Lexer};

/// Module that provides the Match type and the EMPTY accept sentinel.
mod match_type;
pub use match_type::{Match, EMPTY};

/// The module with the streaming matcher.
mod matcher;
pub use matcher::Matcher;

/// Module with the option-string parsers.
mod options;

/// The module with the pattern compiler front end.
mod pattern;
pub use pattern::{Pattern, PatternBuilder};

/// Module that provides a position type.
mod position;
pub use position::{Position, PositionProvider};

/// Module that provides a Span type.
mod span;
pub use span::Span;
