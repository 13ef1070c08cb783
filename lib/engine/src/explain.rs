use itertools::Itertools;
use rdf_tuples_common::Tuples;

/// Describes a single relation on one line.
///
/// The summary holds the operator name, a materialization marker (`=` for rows held in memory,
/// `~` otherwise) followed by the row upper bound, and the variables. Relations with a mandatory
/// binding also list the variables they require.
pub fn tuples_summary(tuples: &dyn Tuples) -> String {
    let marker = if tuples.is_materialized() { '=' } else { '~' };
    let upper_bound = tuples
        .row_upper_bound()
        .map_or_else(|_| "?".to_owned(), |upper_bound| upper_bound.to_string());
    let variables = tuples.variables().iter().join(" ");

    let mut summary = format!("{}[{marker}{upper_bound}] {{{variables}}}", tuples.name());
    if let Some(requirement) = tuples.mandatory_binding() {
        let required = requirement.required_variables().iter().join(" ");
        summary.push_str(&format!(" :: MBA{{{required}}}"));
    }
    summary
}

/// Renders the operator tree of `tuples`, one relation per line. Operands are indented by two
/// spaces relative to the relation that owns them.
pub fn format_tuples_tree(tuples: &dyn Tuples) -> String {
    let mut lines = Vec::new();
    collect_lines(tuples, 0, &mut lines);
    lines.join("\n")
}

fn collect_lines(tuples: &dyn Tuples, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", "  ".repeat(depth), tuples_summary(tuples)));
    for operand in tuples.operands() {
        collect_lines(operand, depth + 1, lines);
    }
}
