//! Accept-sequence tests for the scan method over a large table of rule
//! sets: quantifiers (greedy and lazy), anchors, word boundaries,
//! lookaheads and trailing contexts, negative patterns, indent handling and
//! pattern options.

use std::sync::Once;

use lexio::{Matcher, Pattern, EMPTY};

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Test data for the scan tests: a pattern with pattern options, matcher
/// options, an input, and the expected accept sequence (without the
/// terminating 0).
#[derive(Debug)]
struct TestData {
    pattern: &'static str,
    popts: &'static str,
    mopts: &'static str,
    input: &'static str,
    accepts: &'static [usize],
}

// A macro to easily create a TestData struct.
macro_rules! td {
    ($pattern:expr, $popts:expr, $mopts:expr, $input:expr, $accepts:expr) => {
        TestData {
            pattern: $pattern,
            popts: $popts,
            mopts: $mopts,
            input: $input,
            accepts: $accepts,
        }
    };
}

const TEST_DATA: &[TestData] = &[
    td!("ab", "", "", "ab", &[1]),
    td!("ab", "", "", "abab", &[1, 1]),
    td!("ab|xy", "", "", "abxy", &[1, 2]),
    td!("a(p|q)z", "", "", "apzaqz", &[1, 1]),
    // DFA edge compaction
    td!("[a-cg-ik]z|d|[e-g]|j|y|[x-z]|.|\\n", "", "", "azz", &[1, 6]),
    // POSIX character classes
    td!(
        "[[:ascii:]]-[[:space:]]-[[:xdigit:]]-[[:cntrl:]]-[[:print:]]-[[:alnum:]]-\
         [[:alpha:]]-[[:blank:]]-[[:digit:]]-[[:graph:]]-[[:lower:]]-[[:punct:]]-\
         [[:upper:]]-[[:word:]]",
        "",
        "",
        "\x7E-\r-F-\x01-&-0-A-\t-0-#-l-.-U-_",
        &[1]
    ),
    // Pattern option q and quotation
    td!("\"(^|$)\\\"\\.+\"", "q", "", "(^|$)\"\\.+", &[1]),
    td!("(?q:\"(^|$)\\\"\\.+\")", "", "", "(^|$)\"\\.+", &[1]),
    td!("\\Q(^|$)\"\\.+\\E", "", "", "(^|$)\"\\.+", &[1]),
    // Pattern option i, scoped and propagated
    td!("(?i:abc)", "", "", "abcABC", &[1, 1]),
    td!("(?i)abc|xyz", "", "", "abcABCxyzXYZ", &[1, 1, 2, 2]),
    td!("(?i:abc)|xyz", "", "", "abcABCxyz", &[1, 1, 2]),
    td!("(?i:abc)|(?i:xyz)", "", "", "abcABCxyzXYZ", &[1, 1, 2, 2]),
    td!(
        "(?i)abc|(?-i:xyz)|(?-i:XYZ)",
        "",
        "",
        "abcABCxyzXYZ",
        &[1, 1, 2, 3]
    ),
    td!(
        "(?i:abc(?-i:xyz))|ABCXYZ",
        "",
        "",
        "abcxyzABCxyzABCXYZ",
        &[1, 1, 2]
    ),
    // Pattern option x
    td!("(?x) a\tb\n c | ( xy ) z ?", "", "", "abcxy", &[1, 2]),
    td!("(?x: a b\n c)", "", "", "abc", &[1]),
    td!("(?x) a b c\n|\n# COMMENT\n x y z", "", "", "abcxyz", &[1, 2]),
    td!(
        "(?# test option (?x:... )(?x: a b c)|x y z",
        "",
        "",
        "abcx y z",
        &[1, 2]
    ),
    // Pattern option s
    td!("(?s).", "", "", "a\n", &[1, 1]),
    // Anchors
    td!("\\Aa\\z", "", "", "a", &[1]),
    td!("^a$", "", "", "a", &[1]),
    td!("^a$|\\n", "m", "", "a\na", &[1, 2, 1]),
    td!("^a|a$|a|\\n", "m", "", "aa\naaa", &[1, 2, 4, 1, 3, 2]),
    td!(
        "\\Aa\\z|\\Aa|a\\z|^a$|^a|a$|a|^ab$|^ab|ab$|ab|\\n",
        "m",
        "",
        "a\na\naa\naaa\nab\nabab\nababab\na",
        &[2, 12, 4, 12, 5, 6, 12, 5, 7, 6, 12, 8, 12, 9, 10, 12, 9, 11, 10, 12, 3]
    ),
    // Optional, closures, iterations
    td!("a?z", "", "", "azz", &[1, 1]),
    td!("a*z", "", "", "azaazz", &[1, 1, 1]),
    td!("a+z", "", "", "azaaz", &[1, 1]),
    td!("ab{2}", "", "", "abbabb", &[1, 1]),
    td!("ab{2,3}", "", "", "abbabbb", &[1, 1]),
    td!("ab{2,}", "", "", "abbabbbabbbb", &[1, 1, 1]),
    td!("ab{0,}", "", "", "a", &[1]),
    td!("(ab{0,2}c){2}", "", "", "abbcacabcabc", &[1, 1]),
    // Lazy optional
    td!("(a|b)??a", "", "", "aaba", &[1, 1, 1]),
    td!("a(a|b)??(?=a|ab)|ac", "", "", "aababac", &[1, 1, 1, 2]),
    td!("a(a|b)??/(a|ab)|ac", "l", "", "aababac", &[1, 1, 1, 2]),
    td!("(a|b)??(a|b)??aa", "", "", "baaaabbaa", &[1, 1, 1]),
    td!("(a|b)??(a|b)??(a|b)??aaa", "", "", "baaaaaa", &[1, 1]),
    td!("a??b?a", "", "", "aba", &[1, 1]),
    td!("a??b?b", "", "", "abb", &[1]),
    // Lazy closure
    td!("a*?a", "", "", "aaaa", &[1, 1, 1, 1]),
    td!("a*?|a|b", "", "", "aab", &[2, 2, 3]),
    td!("(a|bb)*?abb", "", "", "abbbbabb", &[1, 1]),
    td!("ab*?|b", "", "", "ab", &[1, 2]),
    td!("(ab)*?|b", "", "", "b", &[2]),
    td!("a(ab)*?|b", "", "", "ab", &[1, 2]),
    td!("(a|b)*?a|c?", "", "", "bbaaac", &[1, 1, 1, 2]),
    td!("a(a|b)*?a", "", "", "aaaba", &[1, 1]),
    td!("a(a|b)*?a??|b", "", "", "aaaba", &[1, 1, 1, 2, 1]),
    td!("a(a|b)*?a?", "", "", "aa", &[1]),
    td!("a(a|b)*?a|a", "", "", "aaaba", &[1, 1]),
    td!("a(a|b)*?a|a?", "", "", "aaaba", &[1, 1]),
    td!("a(a|b)*?a|a??", "", "", "aaaba", &[1, 1]),
    td!("a(a|b)*?a|aa?", "", "", "aaaba", &[1, 1]),
    td!("a(a|b)*?a|aa??", "", "", "aaaba", &[1, 1]),
    td!("ab(ab|cd)*?ab|ab", "", "", "abababcdabab", &[1, 1, 2]),
    td!("(a|b)(a|b)*?a|a", "", "", "aaabaa", &[1, 1, 2]),
    td!("(ab|cd)(ab|cd)*?ab|ab", "", "", "abababcdabab", &[1, 1, 2]),
    td!("(ab)(ab)*?a|b", "", "", "abababa", &[1, 2, 1]),
    td!("^(a|b)*?a", "", "", "bba", &[1]),
    td!("(a|b)*?a$", "", "", "bba", &[1]),
    td!("(a|b)*?a\\b", "", "", "bba", &[1]),
    // Lazy positive closure
    td!("a+?a", "", "", "aaaa", &[1, 1]),
    td!("(a|b)+?", "", "", "ab", &[1, 1]),
    td!("(a|b)+?a", "", "", "bbaaa", &[1, 1]),
    td!("(a|b)+?a|c?", "", "", "bbaaa", &[1, 1]),
    td!("(ab|cd)+?ab|d?", "", "", "cdcdababab", &[1, 1]),
    td!("(ab)+?a|b", "", "", "abababa", &[1, 2, 1]),
    td!("(ab)+?ac", "", "", "ababac", &[1]),
    td!("ABB*?|ab+?|A|a", "", "", "ABab", &[1, 2]),
    td!("(a|b)+?a|a", "", "", "bbaaa", &[1, 1]),
    td!("^(a|b)+?a", "", "", "abba", &[1]),
    td!("(a|b)+?a$", "", "", "abba", &[1]),
    // Lazy iterations
    td!("(a|b){0,3}?aaa", "", "", "baaaaaa", &[1, 1]),
    td!("(a|b){1,3}?aaa", "", "", "baaaaaaa", &[1, 1]),
    td!("(a|b){1,3}?aaa", "", "", "bbbaaaaaaa", &[1, 1]),
    td!("(ab|cd){0,3}?ababab", "", "", "cdabababababab", &[1, 1]),
    td!("(ab|cd){1,3}?ababab", "", "", "cdababababababab", &[1, 1]),
    td!("(a|b){1,}?a|a", "", "", "bbaaa", &[1, 1]),
    td!("(a|b){2,}?a|aa", "", "", "bbbaaaa", &[1, 1]),
    // Bracket lists
    td!("[a-z]", "", "", "abcxyz", &[1, 1, 1, 1, 1, 1]),
    td!("[-z]", "", "", "-z", &[1, 1]),
    td!("[z-]", "", "", "-z", &[1, 1]),
    td!("[--z]", "", "", "-az", &[1, 1, 1]),
    td!("[ --]", "", "", " +-", &[1, 1, 1]),
    td!("[^a-z]", "", "", "A", &[1]),
    td!("[[:alpha:]]", "", "", "abcxyz", &[1, 1, 1, 1, 1, 1]),
    td!("[][]", "", "", "[]", &[1, 1]),
    // Lookahead and trailing context
    td!("a(?=bc)|ab(?=d)|bc|d", "", "", "abcdabd", &[1, 3, 4, 2, 4]),
    td!("a/bc|ab/d|bc|d", "l", "", "abcdabd", &[1, 3, 4, 2, 4]),
    td!("a(a|b)?/a|a", "l", "", "aba", &[1, 2]),
    td!("zx*/xy*|x?y*", "l", "", "zxxy", &[1, 2]),
    td!("a(?=b?)|bc", "m", "", "aabc", &[1, 1, 2]),
    td!("a(?=\\nb)|a|^b|\\n", "m", "", "aa\nb\n", &[2, 1, 4, 3, 4]),
    td!("^a(?=b$)|b|\\n", "m", "", "ab\n", &[1, 2, 3]),
    td!("^a/b$|b|\\n", "ml", "", "ab\n", &[1, 2, 3]),
    td!("a(?=\\n)|a|\\n", "m", "", "aa\n", &[2, 1, 3]),
    td!(
        "abc(?=\\w+|(?^def))|xyzabcdef",
        "",
        "",
        "abcxyzabcdef",
        &[1, 2]
    ),
    // Negative patterns and option A
    td!("(?^ab)|\\w+| ", "", "", "aa ab abab ababba", &[2, 3, 3, 2, 3, 2]),
    td!(
        "(?^ab)|\\w+| ",
        "",
        "A",
        "aa ab abab ababba",
        &[2, 3, EMPTY, 3, 2, 3, 2]
    ),
    td!("\\w+|(?^ab)| ", "", "", "aa ab abab ababba", &[1, 3, 3, 1, 3, 1]),
    td!("\\w+|(?^\\s)", "", "", "99 Luftballons", &[1, 1]),
    // Word boundaries
    td!("\\<a\\>|\\<a|a\\>|a|-", "", "", "a-aaa", &[1, 5, 2, 4, 3]),
    td!("\\<.*\\>", "", "", "abc def", &[1]),
    td!("\\<.*\\>|-", "", "", "abc-", &[1, 2]),
    td!("\\b.*\\b|-", "", "", "abc-", &[1, 2]),
    td!("-|\\<.*\\>", "", "", "-abc-", &[1, 2, 1]),
    td!("-|\\b.*\\b", "", "", "-abc-", &[1, 2, 1]),
    td!("\\<(-|a)(-|a)\\>| ", "", "", "aa aa", &[1, 2, 1]),
    td!("\\b(-|a)(-|a)\\b| ", "", "", "aa aa", &[1, 2, 1]),
    td!("\\B(-|a)(-|a)\\B|b|#", "", "", "baab#--#", &[2, 1, 2, 3, 1, 3]),
    // Indent, dedent and matcher option T
    td!(
        "^[ \\t]+|[ \\t]+\\i|[ \\t]*\\j|a|[ \\n]",
        "m",
        "",
        "a\n  a\n  a\n    a\n",
        &[4, 5, 2, 4, 5, 1, 4, 5, 2, 4, 5, 3, 3]
    ),
    td!(
        "^[ \\t]+|[ \\t]*\\i|[ \\t]*\\j|a|[ \\n]",
        "m",
        "",
        "a\n  a\n  a\n    a\na\n",
        &[4, 5, 2, 4, 5, 1, 4, 5, 2, 4, 5, 3, 3, 4, 5]
    ),
    td!(
        "^[ \\t]+|[ \\t]*\\i|[ \\t]*\\j|a|[ \\n]",
        "m",
        "",
        "a\n  a\n  a\n    a\n  a\na\n",
        &[4, 5, 2, 4, 5, 1, 4, 5, 2, 4, 5, 3, 4, 5, 3, 4, 5]
    ),
    td!(
        "^[ \\t]+|[ \\t]*\\i|[ \\t]*\\j|a|[ \\n]",
        "m",
        "T=2",
        "a\n  a\n\ta\n    a\n\ta\na\n",
        &[4, 5, 2, 4, 5, 1, 4, 5, 2, 4, 5, 3, 4, 5, 3, 4, 5]
    ),
    td!(
        "^[ \\t]+|[ \\t]*\\i|[ \\t]*\\j|a|(?^[ \\n])",
        "m",
        "",
        "a\n\n  a\n\n  a\n\n    a\n\n  a\na\n",
        &[4, 2, 4, 1, 4, 2, 4, 3, 4, 3, 4]
    ),
    td!(
        "[ \\t]*\\i|^[ \\t]+|[ \\t]*\\j|a|(?^[ \\n])",
        "m",
        "",
        "a\n  a\n  a\n    a\n  a\na\n",
        &[4, 1, 4, 2, 4, 1, 4, 3, 4, 3, 4]
    ),
    td!(
        "_*\\i|^_+|_*\\j|\\w|(?^[ \\n])",
        "m",
        "",
        "a\n__a\n__a\n____a\n__a\na\n",
        &[4, 1, 4, 2, 4, 1, 4, 3, 4, 3, 4]
    ),
    td!(
        "[ \\t]*\\i|^[ \\t]+|[ \\t]*\\j|a|[ \\n]|(?^^[ \\t]*#\\n)",
        "m",
        "",
        "a\n  a\n    #\n  a\n    a\n#\n  a\na\n",
        &[4, 5, 1, 4, 5, 2, 4, 5, 1, 4, 5, 3, 4, 5, 3, 4, 5]
    ),
    td!(
        "[ \\t]*\\i|^[ \\t]+|[ \\t]*\\j|a|[ \\n]|(?^\\\\\n[ \\t]+)",
        "m",
        "",
        "a\n  a\n  a\\\n      a a\n    a\n  a\na\n",
        &[4, 5, 1, 4, 5, 2, 4, 4, 5, 4, 5, 1, 4, 5, 3, 4, 5, 3, 4, 5]
    ),
    // UTF-8 multibyte input
    td!("(©)+", "", "", "©", &[1]),
    td!("(©)+", "", "", "©©", &[1]),
];

#[test]
fn test_scan_accept_sequences() {
    init();
    for (index, test) in TEST_DATA.iter().enumerate() {
        let pattern =
            Pattern::with_options(test.pattern, test.popts).unwrap_or_else(|e| {
                panic!("#{index} pattern '{}' failed to compile: {e}", test.pattern)
            });
        let mut matcher = Matcher::with_options(&pattern, test.input, test.mopts)
            .unwrap_or_else(|e| panic!("#{index} matcher options '{}': {e}", test.mopts));
        let mut accepts = Vec::new();
        loop {
            let accept = matcher.scan();
            if accept == 0 {
                break;
            }
            accepts.push(accept);
            assert!(
                accepts.len() <= test.accepts.len() + 8,
                "#{index} pattern '{}' on '{}' does not terminate: {accepts:?}",
                test.pattern,
                test.input.escape_default()
            );
        }
        assert_eq!(
            accepts,
            test.accepts,
            "#{index} pattern '{}' with popts '{}' mopts '{}' on '{}'",
            test.pattern,
            test.popts,
            test.mopts,
            test.input.escape_default()
        );
    }
}

#[test]
fn test_scan_reports_text_and_location() {
    init();
    let pattern = Pattern::new(r"(a|b)*?a|c|\n").unwrap();
    let mut matcher = Matcher::new(&pattern, "bbaaac\nc");
    let mut seen = Vec::new();
    while matcher.scan() != 0 {
        seen.push((
            matcher.accept(),
            matcher.text_lossy().into_owned(),
            matcher.lineno(),
            matcher.columno(),
            matcher.first(),
            matcher.last(),
        ));
    }
    assert_eq!(
        seen,
        vec![
            (1, "bba".to_string(), 1, 0, 0, 3),
            (1, "a".to_string(), 1, 3, 3, 4),
            (1, "a".to_string(), 1, 4, 4, 5),
            (2, "c".to_string(), 1, 5, 5, 6),
            (3, "\n".to_string(), 1, 6, 6, 7),
            (2, "c".to_string(), 2, 0, 7, 8),
        ]
    );
    assert!(matcher.at_end());
}
