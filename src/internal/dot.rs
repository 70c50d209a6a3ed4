//! Conversion of a compiled pattern to graphviz dot format.
//! Used by the `f=<file>` pattern option for debugging rule sets.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::internal::compiled_rule::CompiledRule;

/// Render the rule set as a graph: one node per rule, with its accept index
/// on the edge label.
pub(crate) fn pattern_render<W: Write>(rules: &[CompiledRule], label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    let start_name = "start".to_string();
    {
        let mut start = digraph.node_named(&start_name);
        start
            .set_shape(dot_writer::Shape::Circle)
            .set_color(dot_writer::Color::Blue)
            .set_pen_width(3.0);
    }
    for (index, rule) in rules.iter().enumerate() {
        let name = format!("rule_{}", index + 1);
        {
            let mut node = digraph.node_named(&name);
            node.set_label(&rule.display().escape_default().to_string());
            if rule.negative() {
                node.set_color(dot_writer::Color::Red);
            }
        }
        digraph
            .edge(start_name.clone(), name)
            .attributes()
            .set_label(&format!("{}", index + 1));
    }
}

/// Write a textual dump of the per-rule DFAs.
pub(crate) fn pattern_dump<W: Write>(
    rules: &[CompiledRule],
    output: &mut W,
) -> std::io::Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        writeln!(
            output,
            "rule[{}] = \"{}\"",
            index + 1,
            rule.display().escape_default()
        )?;
        writeln!(output, "{}", rule.dump_dfa())?;
    }
    Ok(())
}
