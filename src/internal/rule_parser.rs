//! Splitting a pattern into its ordered rules.
//!
//! The pattern given to [`crate::Pattern::new`] is an ordered set of
//! alternative rules separated by top-level `|`. Before splitting, quotation
//! (`\Q...\E` always, `"..."` under option `q`) is resolved into escaped
//! literals and comment groups `(?#...)` are stripped. During splitting,
//! flag-only groups such as `(?i)` are propagated to the rules that follow
//! them, and each rule is stripped of its decorations: a trailing lookahead
//! `(?=X)`/`(?!X)` (or `/X` trailing context under option `l`), a negative
//! wrapper `(?^X)`, and the indent anchors `\i`, `\j` and `\k`.

use crate::errors::{PatternError, PatternErrorKind};
use crate::options::PatternOptions;

/// The indent pseudo-anchors a rule can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndentKind {
    /// `\i`: the match column must exceed the indent stack top; push it.
    Indent,
    /// `\j`: the match column must be below the stack top; pop one level.
    Dedent,
    /// `\k`: the match column must differ from the stack top.
    Undent,
}

/// A lookahead condition extracted from a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LookaheadSpec {
    /// The lookahead pattern; its match text is not part of the rule match.
    pub(crate) pattern: String,
    /// Positive (`(?=X)`, `/X`) or negative (`(?!X)`).
    pub(crate) positive: bool,
}

/// One rule of a pattern, with its decorations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuleSpec {
    /// The rule as written, for display and diagnostics.
    pub(crate) display: String,
    /// The core regex, with propagated flag groups prepended.
    pub(crate) pattern: String,
    /// A trailing lookahead condition, if any.
    pub(crate) lookahead: Option<LookaheadSpec>,
    /// A trailing indent anchor, if any.
    pub(crate) anchor: Option<IndentKind>,
    /// Negative rules are consumed but suppressed from the accept stream.
    pub(crate) negative: bool,
}

/// Parse a whole pattern into its rules.
pub(crate) fn parse_rules(
    regex: &str,
    opts: &PatternOptions,
) -> Result<Vec<RuleSpec>, PatternError> {
    let quoted = apply_quotes(regex, opts.quote_mode)?;
    let stripped = strip_comments(&quoted)?;
    check_macro_names(&stripped)?;
    let segments = split_alternation(&stripped)?;
    let multi = segments.len() > 1;
    let mut rules = Vec::with_capacity(segments.len());
    for (prefix, text) in segments {
        let rule = extract_decorations(&prefix, &text, opts)?;
        if multi
            && rule.pattern.len() == prefix.len()
            && rule.lookahead.is_none()
            && rule.anchor.is_none()
        {
            return Err(PatternError::new(PatternErrorKind::EmptyExpression, regex, 0));
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// Resolve `\Q...\E` spans, and `"..."` spans when `quote_mode` is set, into
/// escaped literal text. `(?q:...)` groups enable quote mode locally.
fn apply_quotes(regex: &str, quote_mode: bool) -> Result<String, PatternError> {
    let chars: Vec<char> = regex.chars().collect();
    let mut out = String::with_capacity(regex.len());
    let mut i = 0;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            if !in_class && chars[i + 1] == 'Q' {
                let mut j = i + 2;
                let mut literal = String::new();
                loop {
                    if j + 1 < chars.len() && chars[j] == '\\' && chars[j + 1] == 'E' {
                        break;
                    }
                    match chars.get(j) {
                        Some(&c) => literal.push(c),
                        None => {
                            return Err(PatternError::new(
                                PatternErrorKind::MismatchedQuotation,
                                regex,
                                i,
                            ))
                        }
                    }
                    j += 1;
                }
                out.push_str(&regex_syntax::escape(&literal));
                i = j + 2;
                continue;
            }
            out.push(c);
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if !in_class && c == '"' && quote_mode {
            let mut j = i + 1;
            let mut literal = String::new();
            loop {
                match chars.get(j) {
                    Some('\\') if chars.get(j + 1) == Some(&'"') => {
                        literal.push('"');
                        j += 2;
                    }
                    Some('"') => break,
                    Some(&c) => {
                        literal.push(c);
                        j += 1;
                    }
                    None => {
                        return Err(PatternError::new(
                            PatternErrorKind::MismatchedQuotation,
                            regex,
                            i,
                        ))
                    }
                }
            }
            out.push_str(&regex_syntax::escape(&literal));
            i = j + 1;
            continue;
        }
        if !in_class && regex_slice_starts_with(&chars, i, "(?q:") {
            let close = find_group_close(&chars, i).ok_or_else(|| {
                PatternError::new(PatternErrorKind::MismatchedParens, regex, i)
            })?;
            let inner: String = chars[i + 4..close].iter().collect();
            out.push_str("(?:");
            out.push_str(&apply_quotes(&inner, true)?);
            out.push(')');
            i = close + 1;
            continue;
        }
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ => {}
        }
        out.push(c);
        i += 1;
    }
    Ok(out)
}

/// Remove `(?#...)` comment groups. A comment runs to the first `)`.
fn strip_comments(regex: &str) -> Result<String, PatternError> {
    let chars: Vec<char> = regex.chars().collect();
    let mut out = String::with_capacity(regex.len());
    let mut i = 0;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            out.push(c);
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if !in_class && regex_slice_starts_with(&chars, i, "(?#") {
            match chars[i..].iter().position(|&c| c == ')') {
                Some(off) => {
                    i += off + 1;
                    continue;
                }
                None => {
                    return Err(PatternError::new(
                        PatternErrorKind::MismatchedParens,
                        regex,
                        i,
                    ))
                }
            }
        }
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ => {}
        }
        out.push(c);
        i += 1;
    }
    Ok(out)
}

/// An unescaped `{name}` outside a class refers to a lexer-tool macro, which
/// the engine does not define.
fn check_macro_names(regex: &str) -> Result<(), PatternError> {
    let chars: Vec<char> = regex.chars().collect();
    let mut i = 0;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => {
                let mut j = i + 1;
                let mut name = String::new();
                while let Some(&c) = chars.get(j) {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                    j += 1;
                }
                let is_name = !name.is_empty()
                    && name
                        .chars()
                        .next()
                        .map(|c| c.is_ascii_alphabetic() || c == '_')
                        .unwrap_or(false)
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if chars.get(j) == Some(&'}') && is_name {
                    return Err(PatternError::new(
                        PatternErrorKind::UndefinedName,
                        regex,
                        i,
                    ));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

/// Split at top-level `|`, propagating flag-only groups like `(?i)` to the
/// rules that follow them. Returns (flag prefix, rule text) pairs.
fn split_alternation(regex: &str) -> Result<Vec<(String, String)>, PatternError> {
    let chars: Vec<char> = regex.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut flags = String::new();
    let mut current_prefix = String::new();
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            current.push(c);
            current.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if in_class {
            if c == ']' {
                in_class = false;
            }
            current.push(c);
            i += 1;
            continue;
        }
        match c {
            '[' => {
                in_class = true;
                current.push(c);
                // A leading '^' and/or ']' is part of the class.
                let mut j = i + 1;
                if chars.get(j) == Some(&'^') {
                    current.push('^');
                    j += 1;
                }
                if chars.get(j) == Some(&']') {
                    current.push(']');
                    j += 1;
                }
                i = j;
                continue;
            }
            '(' => {
                if depth == 0 {
                    if let Some(end) = flag_group_end(&chars, i) {
                        let group: String = chars[i..=end].iter().collect();
                        flags.push_str(&group);
                        current.push_str(&group);
                        i = end + 1;
                        continue;
                    }
                }
                depth += 1;
                current.push(c);
            }
            ')' => {
                if depth == 0 {
                    return Err(PatternError::new(
                        PatternErrorKind::MismatchedParens,
                        regex,
                        i,
                    ));
                }
                depth -= 1;
                current.push(c);
            }
            '|' if depth == 0 => {
                segments.push((current_prefix.clone(), std::mem::take(&mut current)));
                current_prefix = flags.clone();
                current = flags.clone();
            }
            _ => current.push(c),
        }
        i += 1;
    }
    if depth != 0 {
        return Err(PatternError::new(
            PatternErrorKind::MismatchedParens,
            regex,
            regex.len(),
        ));
    }
    if in_class {
        return Err(PatternError::new(
            PatternErrorKind::MismatchedBrackets,
            regex,
            regex.len(),
        ));
    }
    segments.push((current_prefix, current));
    Ok(segments)
}

/// If a flag-only group `(?imsxU-...)` starts at `at`, return the index of
/// its closing paren.
fn flag_group_end(chars: &[char], at: usize) -> Option<usize> {
    if chars.get(at) != Some(&'(') || chars.get(at + 1) != Some(&'?') {
        return None;
    }
    let mut j = at + 2;
    let mut seen = false;
    while let Some(&c) = chars.get(j) {
        match c {
            'i' | 'm' | 's' | 'x' | 'u' | 'U' | 'R' | '-' => {
                seen = true;
                j += 1;
            }
            ')' if seen => return Some(j),
            _ => return None,
        }
    }
    None
}

/// Find the closing paren of the group starting at `at`.
fn find_group_close(chars: &[char], at: usize) -> Option<usize> {
    debug_assert_eq!(chars.get(at), Some(&'('));
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = at;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if in_class {
            if c == ']' {
                in_class = false;
            }
            i += 1;
            continue;
        }
        match c {
            '[' => in_class = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Strip a rule's decorations and build its spec.
fn extract_decorations(
    prefix: &str,
    text: &str,
    opts: &PatternOptions,
) -> Result<RuleSpec, PatternError> {
    let display = text.to_string();
    // The propagated prefix is already part of `text`; work on the body.
    let mut body = text[prefix.len()..].to_string();
    let mut negative = false;

    if body.starts_with("(?^") {
        let chars: Vec<char> = body.chars().collect();
        match find_group_close(&chars, 0) {
            Some(close) if close == chars.len() - 1 => {
                negative = true;
                body = chars[3..close].iter().collect();
            }
            _ => {
                return Err(PatternError::new(
                    PatternErrorKind::InvalidSyntax,
                    text,
                    0,
                ))
            }
        }
    }

    let mut lookahead = None;
    if opts.lookahead_slash {
        if let Some(at) = top_level_slash(&body) {
            let after: String = body.chars().skip(at + 1).collect();
            lookahead = Some(LookaheadSpec {
                pattern: neutralize_negatives(&after),
                positive: true,
            });
            body = body.chars().take(at).collect();
        }
    }
    if lookahead.is_none() && body.ends_with(')') {
        let chars: Vec<char> = body.chars().collect();
        if let Some(open) = trailing_group_open(&chars) {
            let positive = regex_slice_starts_with(&chars, open, "(?=");
            let is_negative_la = regex_slice_starts_with(&chars, open, "(?!");
            if positive || is_negative_la {
                let inner: String = chars[open + 3..chars.len() - 1].iter().collect();
                lookahead = Some(LookaheadSpec {
                    pattern: neutralize_negatives(&inner),
                    positive,
                });
                body = chars[..open].iter().collect();
            }
        }
    }

    let mut anchor = None;
    for (escape, kind) in [
        ("\\i", IndentKind::Indent),
        ("\\j", IndentKind::Dedent),
        ("\\k", IndentKind::Undent),
    ] {
        if ends_with_escape(&body, escape) {
            anchor = Some(kind);
            body.truncate(body.len() - 2);
            break;
        }
    }

    let mut pattern = String::with_capacity(prefix.len() + body.len());
    pattern.push_str(prefix);
    pattern.push_str(&body);
    let lookahead = lookahead.map(|la| LookaheadSpec {
        pattern: format!("{}{}", prefix, la.pattern),
        positive: la.positive,
    });
    Ok(RuleSpec {
        display,
        pattern,
        lookahead,
        anchor,
        negative,
    })
}

/// Position of the first top-level unescaped `/` (trailing context).
fn top_level_slash(body: &str) -> Option<usize> {
    let chars: Vec<char> = body.chars().collect();
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if in_class {
            if c == ']' {
                in_class = false;
            }
            i += 1;
            continue;
        }
        match c {
            '[' => in_class = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// If the final `)` of the rule closes a group opened at top level, return
/// the index of that `(`.
fn trailing_group_open(chars: &[char]) -> Option<usize> {
    let mut stack = Vec::new();
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if in_class {
            if c == ']' {
                in_class = false;
            }
            i += 1;
            continue;
        }
        match c {
            '[' => in_class = true,
            '(' => stack.push(i),
            ')' => {
                let open = stack.pop()?;
                if i == chars.len() - 1 && stack.is_empty() {
                    return Some(open);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Inside a lookahead, a negative wrapper has no effect; make the group
/// syntactically plain.
fn neutralize_negatives(pattern: &str) -> String {
    pattern.replace("(?^", "(?:")
}

/// Does `body` end with the two-character escape `esc`, with the backslash
/// itself not escaped?
fn ends_with_escape(body: &str, esc: &str) -> bool {
    if !body.ends_with(esc) {
        return false;
    }
    let before = &body[..body.len() - esc.len()];
    before.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
}

fn regex_slice_starts_with(chars: &[char], at: usize, what: &str) -> bool {
    what.chars()
        .enumerate()
        .all(|(k, c)| chars.get(at + k) == Some(&c))
}
