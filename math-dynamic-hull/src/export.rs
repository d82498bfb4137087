//! Export functions for hull trees

use crate::tree::HullTree;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Render a hull tree as a Graphviz digraph
///
/// Routers are labelled with their routing key and the size of their cached
/// chain, leaves are drawn as boxes labelled with their point. Edges carry
/// `left`/`right` labels.
pub fn tree_to_dot(tree: &HullTree) -> String {
    let mut dot = String::from("digraph g {\n");
    let mut stack: Vec<_> = tree.root().into_iter().collect();

    while let Some(id) = stack.pop() {
        let name = id.index();
        let anchor = tree.anchor_point(id);
        // Writing into a String cannot fail.
        match tree.children(id) {
            Some((left, right)) => {
                let _ = writeln!(
                    dot,
                    "  n{} [label = \"{}\\nchain {} bridge {}\"]",
                    name,
                    anchor,
                    tree.merged_chain(id).len(),
                    tree.bridge_index(id)
                );
                let _ = writeln!(dot, "  n{} -> n{} [label = \"left\"]", name, left.index());
                let _ = writeln!(dot, "  n{} -> n{} [label = \"right\"]", name, right.index());
                stack.push(right);
                stack.push(left);
            }
            None => {
                let _ = writeln!(dot, "  n{} [shape = box, label = \"{}\"]", name, anchor);
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Write a hull tree to a Graphviz DOT file
pub fn export_dot<P: AsRef<Path>>(tree: &HullTree, path: P) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(tree_to_dot(tree).as_bytes())?;
    Ok(())
}
