//! Module with the pattern type: an ordered set of alternative rules
//! compiled for the matcher.

use std::fs::File;
use std::sync::Arc;

use log::debug;

use crate::internal::rule_parser::parse_rules;
use crate::internal::{dot, CompiledRule};
use crate::options::PatternOptions;
use crate::Result;

/// A compiled pattern: an ordered set of alternative rules.
///
/// The regex given to [`Pattern::new`] is split at top-level `|` into rules;
/// the 1-based position of a rule is its accept index. A `Pattern` is
/// immutable after compilation and is shared by matchers through an
/// [`Arc`]; it must outlive every matcher that holds it.
///
/// ```rust
/// use lexio::Pattern;
///
/// let pattern = Pattern::new("ab|xy").unwrap();
/// assert_eq!(pattern.size(), 2);
/// assert_eq!(pattern.rule(2), Some("xy"));
/// ```
pub struct Pattern {
    regex: String,
    rules: Vec<CompiledRule>,
    /// Cumulative explicit-group offsets, one entry per rule. Group numbers
    /// are global across the whole alternation.
    group_offsets: Vec<usize>,
}

impl Pattern {
    /// Compile a pattern with default options.
    pub fn new(regex: &str) -> Result<Arc<Self>> {
        Self::with_options(regex, "")
    }

    /// Compile a pattern with an option string.
    ///
    /// Recognised option tokens, separated by `;` or adjacent: `i` (case
    /// insensitive), `m` (multi-line `^`/`$`), `s` (dot matches newline),
    /// `x` (extended syntax), `q` (`"..."` matches literally), `l` (`/`
    /// separates trailing context), `f=<file>[,<file>]` (dump the compiled
    /// pattern; `.gv`/`.dot` files get a graph, others a textual dump).
    pub fn with_options(regex: &str, opt: &str) -> Result<Arc<Self>> {
        let opts = PatternOptions::parse(opt)?;
        let specs = parse_rules(regex, &opts)?;
        let mut rules = Vec::with_capacity(specs.len());
        let mut group_offsets = Vec::with_capacity(specs.len());
        let mut groups = 0;
        for spec in &specs {
            let rule = CompiledRule::compile(spec, &opts)?;
            group_offsets.push(groups);
            groups += rule.group_count();
            rules.push(rule);
        }
        debug!("compiled pattern with {} rules", rules.len());
        let pattern = Self {
            regex: regex.to_string(),
            rules,
            group_offsets,
        };
        for file in &opts.dump_files {
            pattern.dump_to(file)?;
        }
        Ok(Arc::new(pattern))
    }

    /// Start building a pattern from an explicit rule list.
    pub fn builder() -> PatternBuilder {
        PatternBuilder::default()
    }

    /// The number of rules. Accept indexes run from 1 to `size()`.
    pub fn size(&self) -> usize {
        self.rules.len()
    }

    /// The text of rule `index` (1-based).
    pub fn rule(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.rules.get(i))
            .map(|r| r.display())
    }

    /// The pattern as given.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub(crate) fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// The global numbers of rule `index`'s explicit groups are
    /// `offset+1 ..= offset+count`.
    pub(crate) fn group_range(&self, index: usize) -> (usize, usize) {
        (self.group_offsets[index], self.rules[index].group_count())
    }

    pub(crate) fn create_caches(&self) -> Vec<regex_automata::nfa::thompson::pikevm::Cache> {
        self.rules.iter().map(|r| r.create_cache()).collect()
    }

    fn dump_to(&self, file: &str) -> Result<()> {
        let mut out = File::create(file)?;
        if file.ends_with(".gv") || file.ends_with(".dot") {
            dot::pattern_render(&self.rules, &self.regex.escape_default().to_string(), &mut out);
        } else {
            dot::pattern_dump(&self.rules, &mut out)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("regex", &self.regex)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.regex)
    }
}

/// A builder that assembles a pattern from an explicit, ordered rule list.
/// Rule decorations (lookahead, negative wrapper, indent anchors) apply per
/// added rule; a top-level `|` inside one added rule stays inside that rule.
///
/// ```rust
/// use lexio::Pattern;
///
/// let pattern = Pattern::builder()
///     .add_rule(r"[0-9]+")
///     .add_rule(r"[a-z_]\w*")
///     .build()
///     .unwrap();
/// assert_eq!(pattern.size(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternBuilder {
    rules: Vec<String>,
    options: String,
}

impl PatternBuilder {
    /// Creates a new pattern builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rule. Its accept index is its 1-based position.
    pub fn add_rule(mut self, rule: &str) -> Self {
        self.rules.push(rule.to_string());
        self
    }

    /// Append several rules in order.
    pub fn add_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules
            .extend(rules.into_iter().map(|r| r.as_ref().to_string()));
        self
    }

    /// Set the pattern option string (see [`Pattern::with_options`]).
    pub fn options(mut self, opt: &str) -> Self {
        self.options = opt.to_string();
        self
    }

    /// Compile the rule list.
    pub fn build(self) -> Result<Arc<Pattern>> {
        let opts = PatternOptions::parse(&self.options)?;
        let mut rules = Vec::with_capacity(self.rules.len());
        let mut group_offsets = Vec::with_capacity(self.rules.len());
        let mut groups = 0;
        let mut regex = String::new();
        for (index, text) in self.rules.iter().enumerate() {
            if index > 0 {
                regex.push('|');
            }
            regex.push_str(text);
            let mut specs = parse_rules(text, &opts)?;
            if specs.len() != 1 {
                // An unguarded top-level alternation stays one rule here.
                specs = parse_rules(&format!("(?:{})", text), &opts)?;
            }
            let rule = CompiledRule::compile(&specs[0], &opts)?;
            group_offsets.push(groups);
            groups += rule.group_count();
            rules.push(rule);
        }
        let pattern = Pattern {
            regex,
            rules,
            group_offsets,
        };
        for file in &opts.dump_files {
            pattern.dump_to(file)?;
        }
        Ok(Arc::new(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_access() {
        let pattern = Pattern::new("ab|xy|z").unwrap();
        assert_eq!(pattern.size(), 3);
        assert_eq!(pattern.rule(1), Some("ab"));
        assert_eq!(pattern.rule(3), Some("z"));
        assert_eq!(pattern.rule(0), None);
        assert_eq!(pattern.rule(4), None);
    }

    #[test]
    fn test_group_numbering_across_rules() {
        let pattern = Pattern::new("a(p|q)z|x(y)(z)").unwrap();
        assert_eq!(pattern.group_range(0), (0, 1));
        assert_eq!(pattern.group_range(1), (1, 2));
    }

    #[test]
    fn test_builder_keeps_alternation_in_rule() {
        let pattern = Pattern::builder()
            .add_rule("ab|xy")
            .add_rule("z")
            .build()
            .unwrap();
        assert_eq!(pattern.size(), 2);
    }

    #[test]
    fn test_compile_error_carries_offset() {
        let err = Pattern::new("ab(cd").unwrap_err();
        let text = format!("{}", err);
        assert!(text.contains("mismatched ( )"), "got: {text}");
    }
}
