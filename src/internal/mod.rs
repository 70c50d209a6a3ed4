/// Module with the growable byte window over the input.
pub(crate) mod buffer;
pub(crate) use buffer::Buffer;

/// Module with the per-rule compiled engines.
pub(crate) mod compiled_rule;
pub(crate) use compiled_rule::CompiledRule;

/// Module with conversion of compiled patterns to graphviz dot format.
pub(crate) mod dot;

/// Module with the per-attempt walk and candidate selection.
pub(crate) mod driver;

/// Module with the pattern-to-rules splitter.
pub(crate) mod rule_parser;
pub(crate) use rule_parser::IndentKind;
