//! The lexer surface on top of the matcher.
//!
//! A [`Lexer`] owns a [`Matcher`] and adds what generated or hand-written
//! tokenizers need around it: a start-condition stack selecting the active
//! pattern, a stack of saved matchers for nested inputs, an output sink for
//! echoing matched text, a debug flag, and an overridable error policy.

use std::io::Write;
use std::sync::Arc;

use log::debug;

use crate::{Matcher, Pattern};

/// Handler invoked by [`Lexer::lexer_error`].
pub type ErrorHandler<'i> = Box<dyn FnMut(&str) + 'i>;

/// A lexer: a matcher plus start conditions, a matcher stack and output.
///
/// ```rust
/// use lexio::{Lexer, Matcher, Pattern};
///
/// let pattern = Pattern::new(r"\w+|\s+").unwrap();
/// let mut lexer = Lexer::new(Matcher::new(&pattern, "one two"));
/// assert_eq!(lexer.scan(), 1);
/// assert_eq!(lexer.matcher().text(), b"one");
/// ```
pub struct Lexer<'i> {
    matcher: Matcher<'i>,
    stack: Vec<Matcher<'i>>,
    conditions: Vec<Arc<Pattern>>,
    start: usize,
    state_stack: Vec<usize>,
    out: Box<dyn Write + 'i>,
    debug: bool,
    on_error: Option<ErrorHandler<'i>>,
}

impl<'i> Lexer<'i> {
    /// Create a lexer around a matcher. The initial start condition is 0.
    pub fn new(matcher: Matcher<'i>) -> Self {
        Self {
            matcher,
            stack: Vec::new(),
            conditions: Vec::new(),
            start: 0,
            state_stack: Vec::new(),
            out: Box::new(std::io::stdout()),
            debug: false,
            on_error: None,
        }
    }

    /// The current matcher.
    pub fn matcher(&self) -> &Matcher<'i> {
        &self.matcher
    }

    /// The current matcher, mutably.
    pub fn matcher_mut(&mut self) -> &mut Matcher<'i> {
        &mut self.matcher
    }

    /// Register the pattern of the next start condition; returns its number.
    /// Condition 0 is the matcher's initial pattern unless registered
    /// explicitly before the first `begin`.
    pub fn add_condition(&mut self, pattern: &Arc<Pattern>) -> usize {
        self.conditions.push(pattern.clone());
        self.conditions.len() - 1
    }

    /// The current start condition.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Set the start condition. When a pattern is registered for it, the
    /// matcher switches pattern in place, keeping the input position.
    pub fn begin(&mut self, condition: usize) {
        if self.debug {
            debug!("begin condition {}", condition);
        }
        self.start = condition;
        if let Some(pattern) = self.conditions.get(condition).cloned() {
            self.matcher.set_pattern(&pattern);
        }
    }

    /// Push the current start condition and enter `condition`.
    pub fn push_state(&mut self, condition: usize) {
        self.state_stack.push(self.start);
        self.begin(condition);
    }

    /// Return to the most recently pushed start condition.
    pub fn pop_state(&mut self) {
        if let Some(condition) = self.state_stack.pop() {
            self.begin(condition);
        }
    }

    /// The start condition below the current one on the stack.
    pub fn top_state(&self) -> usize {
        self.state_stack.last().copied().unwrap_or(0)
    }

    /// Save the current matcher and scan with `matcher` instead. The full
    /// scan-loop state (buffer, cursors, line and column) travels with it.
    pub fn push_matcher(&mut self, matcher: Matcher<'i>) {
        let old = std::mem::replace(&mut self.matcher, matcher);
        self.stack.push(old);
    }

    /// Restore the most recently pushed matcher. Returns false when the
    /// stack is empty.
    pub fn pop_matcher(&mut self) -> bool {
        match self.stack.pop() {
            Some(matcher) => {
                self.matcher = matcher;
                true
            }
            None => false,
        }
    }

    /// Exchange the current matcher, returning the previous one.
    pub fn switch_matcher(&mut self, matcher: Matcher<'i>) -> Matcher<'i> {
        std::mem::replace(&mut self.matcher, matcher)
    }

    /// Whether saved matchers remain on the stack.
    pub fn has_matcher(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Scan with the current matcher; logs the accept when debug is on.
    pub fn scan(&mut self) -> usize {
        let accept = self.matcher.scan();
        if self.debug {
            debug!(
                "accept {} text {:?} at {}:{}",
                accept,
                self.matcher.text_lossy(),
                self.matcher.lineno(),
                self.matcher.columno()
            );
        }
        accept
    }

    /// Consume one byte of input, bypassing the pattern.
    pub fn input(&mut self) -> Option<u8> {
        self.matcher.input()
    }

    /// Push one byte back onto the input.
    pub fn unput(&mut self, byte: u8) {
        self.matcher.unput(byte);
    }

    /// Write the current match text to the output sink.
    pub fn echo(&mut self) -> std::io::Result<()> {
        let text = self.matcher.text().to_vec();
        self.out.write_all(&text)
    }

    /// Write one byte to the output sink.
    pub fn output(&mut self, byte: u8) -> std::io::Result<()> {
        self.out.write_all(&[byte])
    }

    /// Replace the output sink (standard output by default).
    pub fn set_out(&mut self, out: impl Write + 'i) {
        self.out = Box::new(out);
    }

    /// Turn accept logging on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether accept logging is on.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Replace the error policy invoked by [`lexer_error`](Self::lexer_error).
    pub fn set_error_handler(&mut self, handler: impl FnMut(&str) + 'i) {
        self.on_error = Some(Box::new(handler));
    }

    /// Report a scanner error. The default policy writes the message to
    /// standard error and terminates the process with status 2; installing
    /// an error handler overrides it.
    pub fn lexer_error(&mut self, message: &str) {
        match self.on_error.as_mut() {
            Some(handler) => handler(message),
            None => {
                eprintln!("lexer error: {}", message);
                std::process::exit(2);
            }
        }
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("start", &self.start)
            .field("stacked_matchers", &self.stack.len())
            .field("debug", &self.debug)
            .finish()
    }
}
