use super::{EdgeKind, Graph, Vertex};
use std::fmt;

/// A wrapper that displays a [`Graph`] in Graphviz DOT form.
pub struct DisplayGraph<'a> {
    pub graph: &'a Graph,
}

impl<'a> fmt::Display for DisplayGraph<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph argmap {{")?;
        writeln!(f, "    rankdir=LR;")?;

        for (id, vertex) in self.graph.vertices() {
            let shape = match vertex {
                Vertex::Root => "doublecircle",
                Vertex::Value { .. } => "box",
                Vertex::TypedArg(_) | Vertex::TypedOutput(_) => "ellipse",
                Vertex::Operation { .. } => "component",
            };
            let mut label = vertex.to_string();
            if vertex.is_bound() {
                label.push_str(" (bound)");
            }
            writeln!(
                f,
                "    v{} [label=\"{}\", shape={}];",
                id,
                escape(&label),
                shape
            )?;
        }

        for edge in self.graph.edges() {
            writeln!(
                f,
                "    v{} -> v{} [label=\"{} {}\"];",
                edge.from,
                edge.to,
                edge.weight,
                kind_label(edge.kind)
            )?;
        }

        writeln!(f, "}}")
    }
}

/// Renders the graph in DOT form for debugging.
pub fn to_dot(graph: &Graph) -> String {
    DisplayGraph { graph }.to_string()
}

fn kind_label(kind: EdgeKind) -> String {
    match kind {
        EdgeKind::Supply { field } => format!("supply #{}", field),
        EdgeKind::NameMatch { field } => format!("name #{}", field),
        EdgeKind::Typed { field } => format!("typed #{}", field),
        EdgeKind::Accept => "accept".to_string(),
        EdgeKind::Produce { field } => format!("produce #{}", field),
        EdgeKind::Inherit => "inherit".to_string(),
        EdgeKind::Demand { field } => format!("demand #{}", field),
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
