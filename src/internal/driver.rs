//! One match attempt over the buffer window.
//!
//! The driver advances all rule DFAs at a buffer position, applies
//! lookahead and indent-anchor conditions, and selects the winning
//! candidate: longest match first, a satisfied indent anchor outranking an
//! equal-length plain match, rule order breaking remaining ties. It also
//! reports whether any rule was still live at the fill frontier, which is
//! the partial-match signal that makes the caller refill and retry.
//!
//! Context is communicated the way the engine expects it: the byte just
//! before the attempt position (or none at the beginning of the stream)
//! selects the DFA start state, which resolves begin-of-buffer,
//! begin-of-line and word-boundary conditions.

use log::trace;

use crate::internal::buffer::expand_columns;
use crate::internal::compiled_rule::{CompiledRule, LookReply};
use crate::internal::rule_parser::IndentKind;

/// Indent context of the attempt position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnchorContext {
    /// Whether the attempt position is at the beginning of a line.
    pub(crate) bol: bool,
    /// The top of the indent stack, if any.
    pub(crate) stack_top: Option<usize>,
    /// Tab width for column arithmetic.
    pub(crate) tab: u8,
}

/// A winning candidate of one attempt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    /// 0-based rule index.
    pub(crate) rule: usize,
    /// Match end as a buffer offset.
    pub(crate) end: usize,
    /// Whether an indent anchor was satisfied.
    pub(crate) anchored: bool,
    /// The column at the match end, for indent bookkeeping.
    pub(crate) indent_col: usize,
}

/// The outcome of one attempt.
#[derive(Debug)]
pub(crate) struct Attempt {
    /// The best candidate, if any rule matched.
    pub(crate) candidate: Option<Candidate>,
    /// True when some rule (or lookahead) could not be decided without more
    /// input.
    pub(crate) need_more: bool,
}

/// Run all rules anchored at `at` over `hay[at..]`.
pub(crate) fn attempt(
    rules: &[CompiledRule],
    hay: &[u8],
    at: usize,
    look_behind: Option<u8>,
    eoi: bool,
    ctx: &AnchorContext,
) -> Attempt {
    let mut need_more = false;
    let mut best: Option<Candidate> = None;
    let mut best_score = 0usize;
    for (index, rule) in rules.iter().enumerate() {
        let walk = rule.walk(hay, at, look_behind, eoi);
        need_more |= walk.live;
        let end = if let Some(lookahead) = rule.lookahead() {
            let mut passing = None;
            for &end in walk.ends.iter().rev() {
                let la_behind = if end > 0 {
                    Some(hay[end - 1])
                } else {
                    look_behind
                };
                match lookahead.check(hay, end, la_behind, eoi) {
                    LookReply::Sat => {
                        passing = Some(end);
                        break;
                    }
                    LookReply::NeedMore => need_more = true,
                    LookReply::Unsat => {}
                }
            }
            passing
        } else {
            walk.preferred
        };
        let Some(end) = end else {
            continue;
        };
        let mut anchored = false;
        let mut indent_col = 0;
        if let Some(kind) = rule.anchor() {
            // Indent anchors are only meaningful at the start of a line, and
            // a blank line establishes no indent level.
            if !ctx.bol {
                continue;
            }
            if end < hay.len() && hay[end] == b'\n' {
                continue;
            }
            let col = expand_columns(&hay[at..end], ctx.tab);
            let top = ctx.stack_top;
            let valid = match kind {
                IndentKind::Indent => col > top.unwrap_or(0),
                IndentKind::Dedent => top.map(|t| col < t).unwrap_or(false),
                IndentKind::Undent => col != top.unwrap_or(0),
            };
            if !valid {
                continue;
            }
            anchored = true;
            indent_col = col;
        }
        // Longest wins, where a satisfied indent anchor or a negative rule
        // counts as one further virtual character; earlier rules win
        // remaining ties.
        let bonus = (anchored || rule.negative()) as usize;
        let score = 2 * (end - at + bonus) + bonus + 1;
        if score > best_score {
            best_score = score;
            best = Some(Candidate {
                rule: index,
                end,
                anchored,
                indent_col,
            });
        }
    }
    if let Some(c) = &best {
        trace!(
            "attempt at {}: rule {} ends {} (anchored: {})",
            at,
            c.rule,
            c.end,
            c.anchored
        );
    }
    Attempt {
        candidate: best,
        need_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::rule_parser::parse_rules;
    use crate::options::PatternOptions;

    fn compile(pattern: &str) -> Vec<CompiledRule> {
        let opts = PatternOptions::default();
        parse_rules(pattern, &opts)
            .unwrap()
            .iter()
            .map(|spec| CompiledRule::compile(spec, &opts).unwrap())
            .collect()
    }

    fn ctx() -> AnchorContext {
        AnchorContext {
            bol: true,
            stack_top: None,
            tab: 8,
        }
    }

    #[test]
    fn test_longest_wins_over_rule_order() {
        let rules = compile("a|ab");
        let attempt = attempt(&rules, b"ab", 0, None, true, &ctx());
        let c = attempt.candidate.unwrap();
        assert_eq!((c.rule, c.end), (1, 2));
    }

    #[test]
    fn test_rule_order_breaks_ties() {
        let rules = compile(r"\w+|[a-z]+");
        let attempt = attempt(&rules, b"abc", 0, None, true, &ctx());
        let c = attempt.candidate.unwrap();
        assert_eq!((c.rule, c.end), (0, 3));
    }

    #[test]
    fn test_partial_reported() {
        let rules = compile("abc|x");
        let attempt = attempt(&rules, b"ab", 0, None, false, &ctx());
        assert!(attempt.candidate.is_none());
        assert!(attempt.need_more);
    }

    #[test]
    fn test_lookahead_fallback_to_shorter_end() {
        // The preferred end of a(?=bc) fails at 'd'; rule 2 takes over.
        let rules = compile("a(?=bc)|ab(?=d)|bc|d");
        let attempt = attempt(&rules, b"abd", 0, None, true, &ctx());
        let c = attempt.candidate.unwrap();
        assert_eq!((c.rule, c.end), (1, 2));
    }

    #[test]
    fn test_indent_anchor_outranks_equal_plain() {
        let rules = compile(r"^[ \t]+|[ \t]+\i");
        let attempt = attempt(&rules, b"  a", 0, None, true, &ctx());
        let c = attempt.candidate.unwrap();
        assert_eq!((c.rule, c.end), (1, 2));
        assert!(c.anchored);
        assert_eq!(c.indent_col, 2);
    }

    #[test]
    fn test_indent_needs_bol() {
        let rules = compile(r"[ \t]+\i");
        let mid_line = AnchorContext {
            bol: false,
            stack_top: None,
            tab: 8,
        };
        let attempt = attempt(&rules, b"  ", 0, Some(b'a'), true, &mid_line);
        assert!(attempt.candidate.is_none());
    }

    #[test]
    fn test_dedent_requires_smaller_column() {
        let rules = compile(r"[ \t]*\j");
        let deeper = AnchorContext {
            bol: true,
            stack_top: Some(4),
            tab: 8,
        };
        let attempt_hit = attempt(&rules, b"  a", 0, None, true, &deeper);
        let c = attempt_hit.candidate.unwrap();
        assert!(c.anchored);
        assert_eq!(c.end, 2);
        let level = AnchorContext {
            bol: true,
            stack_top: Some(2),
            tab: 8,
        };
        let attempt_miss = attempt(&rules, b"  a", 0, None, true, &level);
        assert!(attempt_miss.candidate.is_none());
    }
}
