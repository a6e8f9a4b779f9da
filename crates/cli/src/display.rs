//! Plain-text catalog listings for `--tree` and `--list`.

use itertools::Itertools;

use command_deck_core::catalog::{Catalog, NodeId};

fn describe(name: &str, description: &str) -> String {
    if description.is_empty() {
        name.to_string()
    } else {
        format!("{name} - {description}")
    }
}

fn push_children(catalog: &Catalog, node: NodeId, prefix: &str, lines: &mut Vec<String>) {
    let children = catalog.children(node);

    for (position, child) in children.iter().enumerate() {
        let last = position + 1 == children.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        let child_node = catalog.node(*child);
        let mut line = format!(
            "{prefix}{branch}{}",
            describe(&child_node.name, &child_node.short_description)
        );
        if !child_node.available {
            line.push_str(" (unavailable)");
        }
        lines.push(line);

        push_children(catalog, *child, &format!("{prefix}{indent}"), lines);
    }
}

/// The catalog as an indented tree, root first.
#[must_use]
pub fn format_tree(catalog: &Catalog) -> String {
    let root = catalog.node(catalog.root());
    let mut lines = vec![describe(&root.name, &root.short_description)];
    push_children(catalog, catalog.root(), "", &mut lines);
    lines.iter().join("\n")
}

/// Every runnable command, numbered from 1, with its full path.
#[must_use]
pub fn format_list(catalog: &Catalog) -> String {
    let entries = catalog.flatten();
    let width = entries.len().to_string().len();

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{:>width$}. {}",
                index + 1,
                describe(&entry.display_path, &entry.short_description)
            )
        })
        .join("\n")
}
