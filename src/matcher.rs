//! The streaming matcher.
//!
//! A [`Matcher`] drives a compiled [`Pattern`] over a growable byte window
//! fed from an [`Input`]. The four methods differ only in how they anchor
//! and advance:
//!
//! - [`scan`](Matcher::scan): match anchored at the current position;
//! - [`find`](Matcher::find): search forward for the next match;
//! - [`split`](Matcher::split): return the text between matches;
//! - [`matches`](Matcher::matches): match the entire remaining input.
//!
//! All four return the accept index: the 1-based number of the winning rule,
//! 0 for no match, or [`EMPTY`] for the terminating segment of a split run.
//! A match whose end touches the fill frontier is treated as partial: the
//! window is refilled (shifting or growing as needed, which regenerates all
//! engine state) and the attempt is retried, so matches never silently stop
//! at a buffer boundary. At end of input the [wrap](Matcher::set_wrap) hook
//! may install a fresh input and resume the loop.

use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::Arc;

use log::{trace, warn};
use regex_automata::nfa::thompson::pikevm;

use crate::internal::driver::{self, AnchorContext, Candidate};
use crate::internal::{Buffer, IndentKind};
use crate::match_type::EMPTY;
use crate::options::MatcherOptions;
use crate::{Input, Match, Pattern, Position, PositionProvider, Result, Span};

/// The four matching methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Scan,
    Find,
    Split,
    Matches,
}

/// Result of trying to add bytes to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    /// New bytes arrived.
    Got,
    /// The source is exhausted and `wrap` declined; `eof` is now set.
    Dry,
    /// The buffer hard limit prevents further growth.
    Limit,
}

/// A streaming matcher over one input.
///
/// ```rust
/// use lexio::{Matcher, Pattern};
///
/// let pattern = Pattern::new("ab|xy").unwrap();
/// let mut matcher = Matcher::new(&pattern, "abxy");
/// assert_eq!(matcher.scan(), 1);
/// assert_eq!(matcher.scan(), 2);
/// assert_eq!(matcher.scan(), 0);
/// ```
pub struct Matcher<'i> {
    pattern: Arc<Pattern>,
    input: Input<'i>,
    buf: Buffer,
    opts: MatcherOptions,
    caches: RefCell<Vec<pikevm::Cache>>,
    wrap: Option<Box<dyn FnMut() -> Option<Input<'i>> + 'i>>,
    /// Length of the accepted text (which spans `txt..txt+len`).
    len: usize,
    /// The last accept index.
    cap: usize,
    /// 0-based index of the winning rule, for capture resolution.
    winning_rule: Option<usize>,
    /// Buffer offsets of the last regex match proper (for split this is the
    /// separator, not the segment).
    match_span: (usize, usize),
    /// Logical end offset of the last committed match.
    prev_match_end: Option<usize>,
    more: bool,
    /// Source exhausted and `wrap` declined.
    eof: bool,
    /// The terminating split segment was emitted.
    split_done: bool,
    indent_stack: Vec<usize>,
    /// Fill block size; 0 requests as much as fits, 1 is interactive.
    blk: usize,
    /// Hard limit on the window capacity; 0 is unlimited.
    buffer_limit: usize,
}

impl<'i> Matcher<'i> {
    /// Create a matcher for a pattern over an input, with default options.
    pub fn new(pattern: &Arc<Pattern>, input: impl Into<Input<'i>>) -> Self {
        Self::build(pattern.clone(), input.into(), MatcherOptions::default())
    }

    /// Create a matcher with an option string: `A` (report all matches,
    /// including negative patterns), `N` (permit zero-width matches in
    /// `find`), `T=<1..9>` (tab width, default 8).
    pub fn with_options(
        pattern: &Arc<Pattern>,
        input: impl Into<Input<'i>>,
        opt: &str,
    ) -> Result<Self> {
        Ok(Self::build(
            pattern.clone(),
            input.into(),
            MatcherOptions::parse(opt)?,
        ))
    }

    /// Compile `regex` on the fly and match it over `input`.
    pub fn from_regex(regex: &str, input: impl Into<Input<'i>>) -> Result<Self> {
        Ok(Self::build(
            Pattern::new(regex)?,
            input.into(),
            MatcherOptions::default(),
        ))
    }

    fn build(pattern: Arc<Pattern>, input: Input<'i>, opts: MatcherOptions) -> Self {
        let caches = RefCell::new(pattern.create_caches());
        let buf = Buffer::new(opts.tab);
        Self {
            pattern,
            input,
            buf,
            opts,
            caches,
            wrap: None,
            len: 0,
            cap: 0,
            winning_rule: None,
            match_span: (0, 0),
            prev_match_end: None,
            more: false,
            eof: false,
            split_done: false,
            indent_stack: Vec::new(),
            blk: 0,
            buffer_limit: 0,
        }
    }

    /// The pattern this matcher uses.
    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// Switch to another pattern, keeping the input position.
    pub fn set_pattern(&mut self, pattern: &Arc<Pattern>) {
        self.pattern = pattern.clone();
        self.caches = RefCell::new(self.pattern.create_caches());
        self.winning_rule = None;
        self.cap = 0;
        self.len = 0;
    }

    /// Assign a new input and restart from a fresh stream position.
    pub fn set_input(&mut self, input: impl Into<Input<'i>>) {
        self.input = input.into();
        self.buf.reset();
        self.eof = false;
        self.split_done = false;
        self.prev_match_end = None;
        self.more = false;
        self.len = 0;
        self.cap = 0;
        self.winning_rule = None;
        self.match_span = (0, 0);
        self.indent_stack.clear();
    }

    /// Re-parse the option string and clear the match state. The buffered
    /// input position is kept.
    pub fn reset(&mut self, opt: &str) -> Result<()> {
        self.opts = MatcherOptions::parse(opt)?;
        self.buf.set_tab(self.opts.tab);
        self.more = false;
        self.len = 0;
        self.cap = 0;
        self.winning_rule = None;
        self.split_done = false;
        self.prev_match_end = None;
        self.indent_stack.clear();
        Ok(())
    }

    /// Install the end-of-input continuation hook. When the source is
    /// exhausted the hook runs; returning a new input resumes the scan loop
    /// without terminating it.
    pub fn set_wrap(&mut self, wrap: impl FnMut() -> Option<Input<'i>> + 'i) {
        self.wrap = Some(Box::new(wrap));
    }

    /// Request single-byte reads, for tty-style input that must not block
    /// on large buffers.
    pub fn interactive(&mut self) {
        self.blk = 1;
    }

    /// Set the fill block size: 0 reads as much as fits, 1 is interactive.
    pub fn buffer(&mut self, blk: usize) {
        self.blk = blk;
    }

    /// Cap the window capacity in bytes; 0 is unlimited. When the cap stops
    /// a refill, the pending partial match is finalised as definitive.
    pub fn set_buffer_limit(&mut self, limit: usize) {
        self.buffer_limit = limit;
    }

    /// Scan: match anchored at the current position. Advances past the
    /// match on success; a failure leaves the position unchanged.
    pub fn scan(&mut self) -> usize {
        self.do_match(Method::Scan)
    }

    /// Find: search forward for the next match.
    pub fn find(&mut self) -> usize {
        self.do_match(Method::Find)
    }

    /// Split: like `find`, but the accepted text is the span between the
    /// previous match and this one. At end of input one final segment with
    /// accept [`EMPTY`] carries the trailing text.
    pub fn split(&mut self) -> usize {
        self.do_match(Method::Split)
    }

    /// Match the entire remaining input; succeeds only when a rule covers
    /// every byte through end of input.
    pub fn matches(&mut self) -> usize {
        self.do_match(Method::Matches)
    }

    /// The last accept index: 1-based rule number, 0 for no match, or
    /// [`EMPTY`].
    #[inline]
    pub fn accept(&self) -> usize {
        self.cap
    }

    /// The accepted text. Raw bytes: undecodable input passes through.
    pub fn text(&self) -> &[u8] {
        let txt = self.buf.txt();
        &self.buf.window()[txt..txt + self.len]
    }

    /// The accepted text, lossily decoded for display.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.text())
    }

    /// The length of the accepted text in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// The line number of the match start, 1-based.
    #[inline]
    pub fn lineno(&self) -> usize {
        self.buf.line()
    }

    /// The column of the match start: 0-based, tab-expanded, UTF-8
    /// continuation bytes not counted.
    #[inline]
    pub fn columno(&self) -> usize {
        self.buf.col()
    }

    /// Logical stream offset of the first byte of the accepted text.
    #[inline]
    pub fn first(&self) -> usize {
        self.buf.base() + self.buf.txt()
    }

    /// Logical stream offset just past the accepted text.
    #[inline]
    pub fn last(&self) -> usize {
        self.first() + self.len
    }

    /// The last match as a value, or None when nothing matched.
    pub fn matched(&self) -> Option<Match> {
        (self.cap != 0).then(|| {
            Match::new(
                self.cap,
                Span::new(self.first(), self.last()),
                self.position(),
            )
        })
    }

    /// The span of capture group `n` as logical stream offsets. Group 0 is
    /// the whole match; groups are numbered across the whole alternation.
    /// Returns None when the group is in a rule that did not win or did not
    /// participate in the match.
    pub fn group(&self, n: usize) -> Option<(usize, usize)> {
        let (start, end) = self.group_offsets(n)?;
        Some((self.buf.base() + start, self.buf.base() + end))
    }

    /// The bytes of capture group `n`; see [`group`](Matcher::group).
    pub fn group_bytes(&self, n: usize) -> Option<&[u8]> {
        let (start, end) = self.group_offsets(n)?;
        Some(&self.buf.window()[start..end])
    }

    fn group_offsets(&self, n: usize) -> Option<(usize, usize)> {
        if self.cap == 0 {
            return None;
        }
        if n == 0 {
            let txt = self.buf.txt();
            return Some((txt, txt + self.len));
        }
        let rule = self.winning_rule?;
        let (offset, count) = self.pattern.group_range(rule);
        if n <= offset || n > offset + count {
            return None;
        }
        let mut caches = self.caches.borrow_mut();
        self.pattern.rules()[rule].captures_at(
            &mut caches[rule],
            self.buf.window(),
            self.match_span.0..self.match_span.1,
            n - offset,
        )
    }

    /// True when the position is at end of input: everything is consumed,
    /// the source is exhausted and `wrap` declined a continuation.
    pub fn at_end(&mut self) -> bool {
        if self.buf.cur() < self.buf.end() {
            return false;
        }
        if self.eof {
            return true;
        }
        let mut at = self.buf.cur();
        self.fill_more(&mut at) != Fill::Got
    }

    /// True when the position is at the beginning of a line.
    pub fn at_bol(&self) -> bool {
        self.buf.at_bol(self.buf.cur())
    }

    /// Consume and return the next byte, bypassing the pattern.
    pub fn input(&mut self) -> Option<u8> {
        while self.buf.cur() == self.buf.end() {
            let mut at = self.buf.cur();
            if self.fill_more(&mut at) != Fill::Got {
                return None;
            }
        }
        let cur = self.buf.cur();
        let byte = self.buf.window()[cur];
        self.buf.set_cur(cur + 1);
        self.buf.advance_txt_to(cur + 1);
        self.len = 0;
        Some(byte)
    }

    /// Push one byte back so the next read returns it.
    pub fn unput(&mut self, byte: u8) {
        if !self.buf.insert_at_cur(byte, self.buffer_limit) {
            warn!("unput dropped a byte: the buffer hard limit is reached");
        }
    }

    /// Buffer the remaining input in full and expose it.
    pub fn rest(&mut self) -> &[u8] {
        while !self.eof {
            let mut at = self.buf.cur();
            if self.fill_more(&mut at) == Fill::Limit {
                break;
            }
        }
        &self.buf.window()[self.buf.cur()..]
    }

    /// Append the next match to the current one: the next accepted text
    /// spans both.
    pub fn more(&mut self) {
        self.more = true;
    }

    /// Truncate the accepted text to `n` bytes and reposition so the next
    /// match continues from there.
    pub fn less(&mut self, n: usize) {
        if n <= self.len {
            self.len = n;
            let to = self.buf.txt() + n;
            self.buf.set_cur(to);
            self.match_span.1 = self.match_span.1.min(to);
        }
    }

    fn do_match(&mut self, method: Method) -> usize {
        trace!("match {:?} at cur {}", method, self.buf.cur());
        loop {
            match method {
                Method::Scan => {
                    if !self.more {
                        let cur = self.buf.cur();
                        self.buf.advance_txt_to(cur);
                    }
                    let mut at = self.buf.cur();
                    let candidate = self
                        .attempt_at(&mut at)
                        .filter(|c| c.end > at || c.anchored);
                    match candidate {
                        Some(c) => match self.commit(at, c) {
                            Some(accept) => return accept,
                            None => continue,
                        },
                        None => return self.no_match(),
                    }
                }
                Method::Matches => {
                    if !self.more {
                        let cur = self.buf.cur();
                        self.buf.advance_txt_to(cur);
                    }
                    let mut at = self.buf.cur();
                    while !self.eof {
                        if self.fill_more(&mut at) == Fill::Limit {
                            break;
                        }
                    }
                    let candidate = self
                        .attempt_at(&mut at)
                        .filter(|c| self.eof && c.end == self.buf.end());
                    match candidate {
                        Some(c) => match self.commit(at, c) {
                            Some(accept) => return accept,
                            None => continue,
                        },
                        None => return self.no_match(),
                    }
                }
                Method::Find => return self.find_loop(),
                Method::Split => return self.split_loop(),
            }
        }
    }

    fn find_loop(&mut self) -> usize {
        if self.eof && self.buf.cur() == self.buf.end() {
            return self.no_match();
        }
        if !self.more {
            let cur = self.buf.cur();
            self.buf.advance_txt_to(cur);
        }
        let mut at = self.buf.cur();
        loop {
            let candidate = self.attempt_at(&mut at).filter(|c| {
                if c.end > at || c.anchored {
                    return true;
                }
                // A zero-width match needs the N option, must not repeat at
                // the previous match end (begin-of-buffer excepted), and is
                // suppressed at end of input.
                self.opts.nul
                    && (self.buf.at_bob(at)
                        || self.prev_match_end != Some(self.buf.base() + at))
                    && !(self.eof && at == self.buf.end())
            });
            if let Some(c) = candidate {
                let empty = c.end == at && !c.anchored;
                match self.commit(at, c) {
                    Some(accept) => {
                        if empty {
                            // Advance one byte so the loop makes progress.
                            let cur = self.buf.cur();
                            if cur < self.buf.end() {
                                self.buf.set_cur(cur + 1);
                            }
                        }
                        return accept;
                    }
                    None => {
                        at = self.buf.cur();
                        continue;
                    }
                }
            }
            if at < self.buf.end() {
                at += 1;
            } else {
                // attempt_at only settles at the frontier once EOF is known
                // or the buffer limit blocks a refill.
                let end = self.buf.end();
                self.buf.advance_txt_to(self.buf.cur());
                self.buf.set_cur(end);
                return self.no_match();
            }
        }
    }

    fn split_loop(&mut self) -> usize {
        {
            let cur = self.buf.cur();
            self.buf.advance_txt_to(cur);
        }
        if self.split_done {
            return self.no_match();
        }
        if self.eof && self.buf.cur() == self.buf.end() {
            return self.emit_trailing_segment();
        }
        let mut at = self.buf.cur();
        loop {
            let candidate = self.attempt_at(&mut at).filter(|c| {
                if c.end > at {
                    return true;
                }
                // An empty separator neither repeats at the previous
                // separator end nor sits at end of input with no text
                // before it (that is the trailing segment).
                self.prev_match_end != Some(self.buf.base() + at)
                    && !(self.eof && at == self.buf.end() && at == self.buf.cur())
            });
            if let Some(c) = candidate {
                match self.commit_split(at, c) {
                    Some(accept) => return accept,
                    None => {
                        at = self.buf.cur();
                        continue;
                    }
                }
            }
            if at < self.buf.end() {
                at += 1;
            } else {
                return self.emit_trailing_segment();
            }
        }
    }

    /// Commit a candidate for scan, find and matches.
    fn commit(&mut self, start: usize, candidate: Candidate) -> Option<usize> {
        let rule = &self.pattern.rules()[candidate.rule];
        let negative = rule.negative();
        let anchor = rule.anchor();
        if !self.more {
            self.buf.advance_txt_to(start);
        }
        self.more = false;
        self.len = candidate.end - self.buf.txt();
        self.match_span = (start, candidate.end);
        self.buf.set_cur(candidate.end);
        self.prev_match_end = Some(self.buf.base() + candidate.end);
        self.apply_indent(anchor, &candidate);
        self.winning_rule = Some(candidate.rule);
        if negative && !self.opts.all {
            trace!("negative match consumed silently");
            self.cap = 0;
            return None;
        }
        self.cap = if negative { EMPTY } else { candidate.rule + 1 };
        Some(self.cap)
    }

    /// Commit a separator for split: the accepted text is the segment
    /// before it.
    fn commit_split(&mut self, start: usize, candidate: Candidate) -> Option<usize> {
        let rule = &self.pattern.rules()[candidate.rule];
        let negative = rule.negative();
        let anchor = rule.anchor();
        self.more = false;
        self.len = start - self.buf.txt();
        self.match_span = (start, candidate.end);
        self.buf.set_cur(candidate.end);
        self.prev_match_end = Some(self.buf.base() + candidate.end);
        self.apply_indent(anchor, &candidate);
        self.winning_rule = Some(candidate.rule);
        if negative && !self.opts.all {
            self.cap = 0;
            return None;
        }
        self.cap = if negative { EMPTY } else { candidate.rule + 1 };
        Some(self.cap)
    }

    fn emit_trailing_segment(&mut self) -> usize {
        let end = self.buf.end();
        self.len = end - self.buf.txt();
        self.match_span = (end, end);
        self.buf.set_cur(end);
        self.winning_rule = None;
        self.more = false;
        self.split_done = true;
        self.cap = EMPTY;
        EMPTY
    }

    fn apply_indent(&mut self, anchor: Option<IndentKind>, candidate: &Candidate) {
        if !candidate.anchored {
            return;
        }
        match anchor {
            Some(IndentKind::Indent) => {
                trace!("indent to column {}", candidate.indent_col);
                self.indent_stack.push(candidate.indent_col);
            }
            Some(IndentKind::Dedent) => {
                let from = self.indent_stack.pop();
                trace!("dedent from column {:?}", from);
            }
            _ => {}
        }
    }

    fn no_match(&mut self) -> usize {
        self.len = 0;
        self.cap = 0;
        self.winning_rule = None;
        self.more = false;
        0
    }

    /// One attempt at `at`, refilling on partial matches until the outcome
    /// is definitive.
    fn attempt_at(&mut self, at: &mut usize) -> Option<Candidate> {
        loop {
            let ctx = AnchorContext {
                bol: self.buf.at_bol(*at),
                stack_top: self.indent_stack.last().copied(),
                tab: self.opts.tab,
            };
            let attempt = driver::attempt(
                self.pattern.rules(),
                self.buf.window(),
                *at,
                self.buf.prev_byte(*at),
                self.eof,
                &ctx,
            );
            if attempt.need_more && !self.eof {
                match self.fill_more(at) {
                    // Dry sets eof; retry once more with the EOI transition.
                    Fill::Got | Fill::Dry => continue,
                    Fill::Limit => return attempt.candidate,
                }
            }
            return attempt.candidate;
        }
    }

    /// Add bytes to the window, invoking `wrap` when the source dries up.
    fn fill_more(&mut self, at: &mut usize) -> Fill {
        loop {
            match self.fill_once(at) {
                Fill::Got => return Fill::Got,
                Fill::Limit => return Fill::Limit,
                Fill::Dry => {
                    if let Some(wrap) = self.wrap.as_mut() {
                        if let Some(input) = wrap() {
                            trace!("wrap installed a new input");
                            self.input = input;
                            continue;
                        }
                    }
                    self.eof = true;
                    return Fill::Dry;
                }
            }
        }
    }

    fn fill_once(&mut self, at: &mut usize) -> Fill {
        if self.buf.room() == 0 {
            let (ok, delta) = self.buf.make_room(self.buffer_limit);
            if delta > 0 {
                *at -= delta;
                self.match_span.0 = self.match_span.0.saturating_sub(delta);
                self.match_span.1 = self.match_span.1.saturating_sub(delta);
            }
            if !ok {
                return Fill::Limit;
            }
        }
        let want = if self.blk > 0 {
            self.blk.min(self.buf.room())
        } else {
            self.buf.room()
        };
        let n = self.input.get(&mut self.buf.space()[..want]);
        self.buf.commit_fill(n);
        trace!("fill got {} bytes, end {}", n, self.buf.end());
        if n > 0 {
            Fill::Got
        } else {
            Fill::Dry
        }
    }
}

impl PositionProvider for Matcher<'_> {
    fn position(&self) -> Position {
        Position::new(self.buf.line(), self.buf.col() + 1)
    }
}

impl std::fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern)
            .field("accept", &self.cap)
            .field("len", &self.len)
            .field("pos", &self.buf.pos())
            .field("eof", &self.eof)
            .finish()
    }
}
