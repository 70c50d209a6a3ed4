//! Per-rule compiled engines.
//!
//! Each rule compiles to an anchored byte-oriented dense DFA that the driver
//! advances by hand, so that a match pending at the fill frontier is
//! observable as a partial match. Rules carrying a lookahead are compiled
//! with `MatchKind::All` so that every accepting end is visible and a failed
//! lookahead can fall back to another end; all other rules keep
//! `MatchKind::LeftmostFirst`, which preserves the preference order of lazy
//! quantifiers. A `PikeVM` over the same HIR resolves capture groups on
//! demand over a committed match span.

use regex_automata::dfa::{dense, Automaton, StartKind};
use regex_automata::nfa::thompson::pikevm::{self, PikeVM};
use regex_automata::nfa::thompson::{self, WhichCaptures};
use regex_automata::util::start;
use regex_automata::{Anchored, MatchKind, PatternID};

use crate::errors::{classify_syntax_error, PatternError, PatternErrorKind};
use crate::internal::rule_parser::{IndentKind, RuleSpec};
use crate::options::PatternOptions;

/// The walk of one rule over the valid buffer range.
#[derive(Debug, Default)]
pub(crate) struct RuleWalk {
    /// The preferred match end (leftmost-first rules).
    pub(crate) preferred: Option<usize>,
    /// All accepting ends in ascending order (lookahead rules).
    pub(crate) ends: Vec<usize>,
    /// True when the DFA was still live at the fill frontier without EOF;
    /// more input could produce a further or longer match.
    pub(crate) live: bool,
}

/// The reply of a lookahead check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LookReply {
    /// The condition holds.
    Sat,
    /// The condition does not hold.
    Unsat,
    /// Undecidable without more input.
    NeedMore,
}

/// A compiled lookahead condition.
#[derive(Debug)]
pub(crate) struct CompiledLookahead {
    dfa: dense::DFA<Vec<u32>>,
    positive: bool,
}

impl CompiledLookahead {
    /// Check the condition at `at`, with `look_behind` being the byte just
    /// before `at` in the logical stream.
    pub(crate) fn check(
        &self,
        hay: &[u8],
        at: usize,
        look_behind: Option<u8>,
        eoi: bool,
    ) -> LookReply {
        let config = start::Config::new()
            .anchored(Anchored::Yes)
            .look_behind(look_behind);
        let Ok(mut sid) = self.dfa.start_state(&config) else {
            return if self.positive {
                LookReply::Unsat
            } else {
                LookReply::Sat
            };
        };
        let mut found = false;
        let mut alive = true;
        for &b in &hay[at..] {
            sid = self.dfa.next_state(sid, b);
            if self.dfa.is_special_state(sid) {
                if self.dfa.is_match_state(sid) {
                    found = true;
                    break;
                } else if self.dfa.is_dead_state(sid) || self.dfa.is_quit_state(sid) {
                    alive = false;
                    break;
                }
            }
        }
        if !found && alive {
            if eoi {
                found = self.dfa.is_match_state(self.dfa.next_eoi_state(sid));
            } else {
                return LookReply::NeedMore;
            }
        }
        match (found, self.positive) {
            (true, true) | (false, false) => LookReply::Sat,
            _ => LookReply::Unsat,
        }
    }
}

/// One compiled rule of a pattern.
pub(crate) struct CompiledRule {
    display: String,
    dfa: dense::DFA<Vec<u32>>,
    vm: PikeVM,
    lookahead: Option<CompiledLookahead>,
    anchor: Option<IndentKind>,
    negative: bool,
    group_count: usize,
    collect_all: bool,
}

impl std::fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRule")
            .field("display", &self.display)
            .field("anchor", &self.anchor)
            .field("negative", &self.negative)
            .field("group_count", &self.group_count)
            .finish()
    }
}

impl CompiledRule {
    /// Compile a rule spec with the pattern options.
    pub(crate) fn compile(spec: &RuleSpec, opts: &PatternOptions) -> Result<Self, PatternError> {
        let hir = parse_hir(&spec.pattern, opts)?;
        let collect_all = spec.lookahead.is_some();
        let match_kind = if collect_all {
            MatchKind::All
        } else {
            MatchKind::LeftmostFirst
        };
        let dfa = build_dfa(&hir, match_kind, &spec.pattern)?;
        let nfa = thompson::Compiler::new()
            .configure(
                thompson::Config::new()
                    .utf8(false)
                    .which_captures(WhichCaptures::All),
            )
            .build_from_hir(&hir)
            .map_err(|_| {
                PatternError::new(PatternErrorKind::ExceedsLimits, &spec.pattern, 0)
            })?;
        let vm = PikeVM::builder()
            .configure(pikevm::Config::new().match_kind(MatchKind::LeftmostFirst))
            .build_from_nfa(nfa)
            .map_err(|_| {
                PatternError::new(PatternErrorKind::ExceedsLimits, &spec.pattern, 0)
            })?;
        let group_count = vm
            .get_nfa()
            .group_info()
            .group_len(PatternID::ZERO)
            .saturating_sub(1);
        let lookahead = spec
            .lookahead
            .as_ref()
            .map(|la| {
                let hir = parse_hir(&la.pattern, opts)?;
                Ok(CompiledLookahead {
                    dfa: build_dfa(&hir, MatchKind::LeftmostFirst, &la.pattern)?,
                    positive: la.positive,
                })
            })
            .transpose()?;
        Ok(Self {
            display: spec.display.clone(),
            dfa,
            vm,
            lookahead,
            anchor: spec.anchor,
            negative: spec.negative,
            group_count,
            collect_all,
        })
    }

    /// The rule as written.
    pub(crate) fn display(&self) -> &str {
        &self.display
    }

    /// The rule's indent anchor, if any.
    #[inline]
    pub(crate) fn anchor(&self) -> Option<IndentKind> {
        self.anchor
    }

    /// Whether this is a negative rule.
    #[inline]
    pub(crate) fn negative(&self) -> bool {
        self.negative
    }

    pub(crate) fn lookahead(&self) -> Option<&CompiledLookahead> {
        self.lookahead.as_ref()
    }

    /// The number of explicit capture groups in this rule.
    #[inline]
    pub(crate) fn group_count(&self) -> usize {
        self.group_count
    }

    /// Advance the rule DFA over `hay[at..]`, anchored at `at`.
    ///
    /// Match states of the underlying DFA are delayed by one byte: a match
    /// ending exactly at the frontier is only provable through the EOI
    /// transition, which is applied when `eoi` is set. Otherwise a DFA that
    /// is still live at the frontier reports `live` so the caller can refill
    /// and retry.
    pub(crate) fn walk(
        &self,
        hay: &[u8],
        at: usize,
        look_behind: Option<u8>,
        eoi: bool,
    ) -> RuleWalk {
        let mut walk = RuleWalk::default();
        let config = start::Config::new()
            .anchored(Anchored::Yes)
            .look_behind(look_behind);
        let Ok(mut sid) = self.dfa.start_state(&config) else {
            return walk;
        };
        let mut alive = true;
        for (i, &b) in hay[at..].iter().enumerate() {
            sid = self.dfa.next_state(sid, b);
            if self.dfa.is_special_state(sid) {
                if self.dfa.is_match_state(sid) {
                    self.record(&mut walk, at + i);
                } else if self.dfa.is_dead_state(sid) || self.dfa.is_quit_state(sid) {
                    alive = false;
                    break;
                }
            }
        }
        if alive {
            if eoi {
                let sid = self.dfa.next_eoi_state(sid);
                if self.dfa.is_match_state(sid) {
                    self.record(&mut walk, hay.len());
                }
            } else {
                walk.live = true;
            }
        }
        walk
    }

    #[inline]
    fn record(&self, walk: &mut RuleWalk, end: usize) {
        if self.collect_all {
            walk.ends.push(end);
        } else {
            walk.preferred = Some(end);
        }
    }

    /// Resolve capture group `group` (0 = whole match) of this rule over a
    /// committed match span. Returns absolute offsets into `hay`.
    pub(crate) fn captures_at(
        &self,
        cache: &mut pikevm::Cache,
        hay: &[u8],
        span: std::ops::Range<usize>,
        group: usize,
    ) -> Option<(usize, usize)> {
        let input = regex_automata::Input::new(hay)
            .range(span)
            .anchored(Anchored::Yes);
        let mut caps = self.vm.create_captures();
        self.vm.search(cache, &input, &mut caps);
        if !caps.is_match() {
            return None;
        }
        caps.get_group(group).map(|span| (span.start, span.end))
    }

    /// Create the mutable search cache a matcher needs for this rule.
    pub(crate) fn create_cache(&self) -> pikevm::Cache {
        self.vm.create_cache()
    }

    /// A textual dump of the compiled DFA, for the `f=` option.
    pub(crate) fn dump_dfa(&self) -> String {
        format!("{:?}", self.dfa)
    }
}

fn parse_hir(
    pattern: &str,
    opts: &PatternOptions,
) -> Result<regex_syntax::hir::Hir, PatternError> {
    regex_syntax::ParserBuilder::new()
        .unicode(false)
        .utf8(false)
        .case_insensitive(opts.case_insensitive)
        .multi_line(opts.multi_line)
        .dot_matches_new_line(opts.dot_matches_new_line)
        .ignore_whitespace(opts.ignore_whitespace)
        .build()
        .parse(pattern)
        .map_err(|e| classify_syntax_error(pattern, &e))
}

fn build_dfa(
    hir: &regex_syntax::hir::Hir,
    match_kind: MatchKind,
    pattern: &str,
) -> Result<dense::DFA<Vec<u32>>, PatternError> {
    let nfa = thompson::Compiler::new()
        .configure(
            thompson::Config::new()
                .utf8(false)
                .which_captures(WhichCaptures::None),
        )
        .build_from_hir(hir)
        .map_err(|_| PatternError::new(PatternErrorKind::ExceedsLimits, pattern, 0))?;
    dense::Builder::new()
        .configure(
            dense::Config::new()
                .start_kind(StartKind::Anchored)
                .match_kind(match_kind),
        )
        .build_from_nfa(&nfa)
        .map_err(|_| PatternError::new(PatternErrorKind::ExceedsLimits, pattern, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::rule_parser::parse_rules;

    fn compile_one(pattern: &str) -> CompiledRule {
        let opts = PatternOptions::default();
        let specs = parse_rules(pattern, &opts).unwrap();
        CompiledRule::compile(&specs[0], &opts).unwrap()
    }

    #[test]
    fn test_walk_greedy() {
        let rule = compile_one(r"a+");
        let walk = rule.walk(b"aaab", 0, None, true);
        assert_eq!(walk.preferred, Some(3));
        assert!(!walk.live);
    }

    #[test]
    fn test_walk_lazy_prefers_shortest() {
        let rule = compile_one(r"(a|b)*?a");
        let walk = rule.walk(b"bbaaac", 0, None, true);
        assert_eq!(walk.preferred, Some(3));
    }

    #[test]
    fn test_walk_live_at_frontier() {
        let rule = compile_one(r"ab");
        let walk = rule.walk(b"a", 0, None, false);
        assert_eq!(walk.preferred, None);
        assert!(walk.live);
        let walk = rule.walk(b"a", 0, None, true);
        assert_eq!(walk.preferred, None);
        assert!(!walk.live);
    }

    #[test]
    fn test_match_at_eoi_needs_eoi_transition() {
        let rule = compile_one(r"ab");
        let walk = rule.walk(b"ab", 0, None, false);
        // The delayed match is not provable without the EOI transition.
        assert_eq!(walk.preferred, None);
        assert!(walk.live);
        let walk = rule.walk(b"ab", 0, None, true);
        assert_eq!(walk.preferred, Some(2));
    }

    #[test]
    fn test_word_boundary_look_behind() {
        let rule = compile_one(r"\bend");
        let walk = rule.walk(b"end", 0, Some(b'x'), true);
        assert_eq!(walk.preferred, None);
        let walk = rule.walk(b"end", 0, Some(b' '), true);
        assert_eq!(walk.preferred, Some(3));
        let walk = rule.walk(b"end", 0, None, true);
        assert_eq!(walk.preferred, Some(3));
    }

    #[test]
    fn test_lookahead_collects_all_ends() {
        let rule = compile_one(r"ab(?=d)");
        let walk = rule.walk(b"abd", 0, None, true);
        assert_eq!(walk.ends, vec![2]);
        let la = rule.lookahead().unwrap();
        assert_eq!(la.check(b"abd", 2, Some(b'b'), true), LookReply::Sat);
        assert_eq!(la.check(b"abc", 2, Some(b'b'), true), LookReply::Unsat);
        assert_eq!(la.check(b"ab", 2, Some(b'b'), false), LookReply::NeedMore);
    }

    #[test]
    fn test_captures() {
        let rule = compile_one(r"a(p|q)z");
        assert_eq!(rule.group_count(), 1);
        let mut cache = rule.create_cache();
        let hay = b"aqz";
        assert_eq!(rule.captures_at(&mut cache, hay, 0..3, 0), Some((0, 3)));
        assert_eq!(rule.captures_at(&mut cache, hay, 0..3, 1), Some((1, 2)));
    }
}
