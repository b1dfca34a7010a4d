//! Graphviz DOT export of the dependency graph.
//!
//! Nodes are filled with their category color and labelled with the file
//! name; the full path goes into the tooltip. Parallel imports between the
//! same pair of files are drawn as one edge labelled with the count.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::error;

use crate::render::color::category_color;
use crate::types::CodebaseGraph;

/// Escapes `"` and `\` for a quoted DOT identifier.
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generate a Graphviz DOT representation of the graph.
pub fn generate_dot(graph: &CodebaseGraph) -> String {
    // ~160 bytes/node (long absolute ids appear twice) + ~120 bytes/edge
    let estimated_capacity = graph.nodes.len() * 160 + graph.links.len() * 120 + 150;
    let mut dot = String::with_capacity(estimated_capacity);

    if let Err(e) = write_dot_content(&mut dot, graph) {
        error!(error = %e, "failed to generate DOT string");
        return "digraph atlasic {\n}\n".to_string();
    }

    dot
}

fn write_dot_content(dot: &mut String, graph: &CodebaseGraph) -> std::fmt::Result {
    writeln!(dot, "digraph atlasic {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(
        dot,
        "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];"
    )?;
    writeln!(dot)?;

    for node in &graph.nodes {
        writeln!(
            dot,
            "  \"{}\" [label=\"{}\", tooltip=\"{}\", fillcolor=\"{}\"];",
            quote(&node.id),
            quote(&node.label),
            quote(&node.id),
            category_color(node.category).css()
        )?;
    }

    writeln!(dot)?;

    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for link in &graph.links {
        let key = (link.source.as_str(), link.target.as_str());
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    for key in order {
        let (source, target) = key;
        match counts.get(&key).copied().unwrap_or(1) {
            1 => writeln!(dot, "  \"{}\" -> \"{}\";", quote(source), quote(target))?,
            n => writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"×{}\"];",
                quote(source),
                quote(target),
                n
            )?,
        }
    }

    writeln!(dot, "}}")?;
    Ok(())
}
