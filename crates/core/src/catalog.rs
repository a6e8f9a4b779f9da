//! The command catalog: an arena of nodes built once from a [`CommandSource`].
//!
//! Nodes are stored in pre-order and addressed by [`NodeId`]. The catalog is
//! read-only after [`Catalog::build`], so any number of sessions can borrow it.

use std::collections::HashSet;
use std::hash::Hash;

use log::debug;

use crate::command_definitions::{CommandMetadata, ParameterDefinition};
use crate::error::{Error, Result};
use crate::parameters::ParameterSpec;

/// Read access to a host's command tree.
///
/// Keys only need to be hashable so the builder can detect a node that is
/// reported as its own descendant.
pub trait CommandSource {
    type Key: Clone + Eq + Hash;

    fn root(&self) -> Self::Key;

    /// # Errors
    ///
    /// Returns a structural error when `key` does not resolve to a node.
    fn describe(&self, key: &Self::Key) -> Result<SourceNode>;

    /// Child keys in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a structural error when `key` does not resolve to a node.
    fn children(&self, key: &Self::Key) -> Result<Vec<Self::Key>>;
}

/// What a source reports about a single node.
#[derive(Debug, Clone, Default)]
pub struct SourceNode {
    pub name: String,
    pub usage: String,
    pub short_description: String,
    pub long_description: String,
    pub runnable: bool,
    pub hidden: bool,
    pub available: bool,
    pub parameters: Vec<ParameterDefinition>,
    pub metadata: Option<CommandMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct CommandNode {
    pub id: NodeId,
    pub name: String,
    pub usage: String,
    pub short_description: String,
    pub long_description: String,
    pub runnable: bool,
    pub available: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub parameters: Vec<ParameterSpec>,
    pub metadata: Option<CommandMetadata>,
    /// Child-index path from the source root to this node, counting hidden siblings.
    pub origin: Vec<usize>,
}

impl CommandNode {
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One runnable command in the flattened view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    pub id: NodeId,
    pub display_path: String,
    pub short_description: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    nodes: Vec<CommandNode>,
}

struct Builder<'a, S: CommandSource> {
    source: &'a S,
    nodes: Vec<CommandNode>,
    on_stack: HashSet<S::Key>,
}

impl<S: CommandSource> Builder<'_, S> {
    fn visit(
        &mut self,
        key: &S::Key,
        parent: Option<NodeId>,
        origin: Vec<usize>,
        described: SourceNode,
    ) -> Result<NodeId> {
        if described.name.is_empty() {
            return Err(Error::EmptyName);
        }

        if !self.on_stack.insert(key.clone()) {
            return Err(Error::CyclicCatalog {
                name: described.name,
            });
        }

        if let Some(metadata) = &described.metadata {
            metadata.validate()?;
        }

        let parameters = described
            .parameters
            .iter()
            .map(|definition| ParameterSpec::from_definition(definition, &described.name))
            .collect::<Result<Vec<_>>>()?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            id,
            name: described.name.clone(),
            usage: described.usage,
            short_description: described.short_description,
            long_description: described.long_description,
            runnable: described.runnable,
            available: described.available,
            parent,
            children: Vec::new(),
            parameters,
            metadata: described.metadata,
            origin: origin.clone(),
        });

        let mut sibling_names: HashSet<String> = HashSet::new();
        for (index, child_key) in self.source.children(key)?.iter().enumerate() {
            let child = self.source.describe(child_key)?;
            if child.hidden {
                continue;
            }

            if !sibling_names.insert(child.name.clone()) {
                return Err(Error::NonUniqueCommandName(
                    described.name.clone(),
                    child.name,
                ));
            }

            let mut child_origin = origin.clone();
            child_origin.push(index);
            let child_id = self.visit(child_key, Some(id), child_origin, child)?;
            self.nodes[id.0].children.push(child_id);
        }

        self.on_stack.remove(key);
        Ok(id)
    }
}

impl Catalog {
    /// Mirrors `source` into an arena of nodes.
    ///
    /// Hidden nodes and their subtrees are left out. The root is always kept.
    ///
    /// # Errors
    ///
    /// Fails when a node is reachable from itself, when a node name is empty,
    /// when visible siblings share a name, when a parameter pattern does not
    /// compile, or when the source cannot resolve one of its own keys.
    pub fn build<S: CommandSource>(source: &S) -> Result<Self> {
        let root_key = source.root();
        let root = source.describe(&root_key)?;

        let mut builder = Builder {
            source,
            nodes: Vec::new(),
            on_stack: HashSet::new(),
        };
        builder.visit(&root_key, None, Vec::new(), root)?;

        debug!("Built catalog with {} node(s)", builder.nodes.len());

        Ok(Self {
            nodes: builder.nodes,
        })
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this catalog.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.iter()
    }

    /// `id` followed by each of its ancestors, ending with the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        chain
    }

    /// Path of ids from just below the root down to `id`.
    ///
    /// The root's own lineage is `[root]`.
    #[must_use]
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        if id == self.root() {
            return vec![id];
        }

        let mut path: Vec<NodeId> = self
            .ancestors(id)
            .into_iter()
            .take_while(|ancestor| *ancestor != self.root())
            .collect();
        path.reverse();
        path
    }

    /// Space-joined names from below the root to `id`.
    #[must_use]
    pub fn display_path(&self, id: NodeId) -> String {
        if id == self.root() {
            return self.node(id).name.clone();
        }

        self.lineage(id)
            .iter()
            .map(|node| self.node(*node).name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Follows child names from the root. An empty path is the root.
    #[must_use]
    pub fn find_by_path<T: AsRef<str>>(&self, names: &[T]) -> Option<NodeId> {
        let mut current = self.root();
        for name in names {
            current = *self
                .children(current)
                .iter()
                .find(|child| self.node(**child).name == name.as_ref())?;
        }
        Some(current)
    }

    /// Every runnable node, in depth-first pre-order, with its display path.
    ///
    /// The arena is already in pre-order, so this is a filter over it.
    #[must_use]
    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.nodes
            .iter()
            .filter(|node| node.runnable)
            .map(|node| FlatEntry {
                id: node.id,
                display_path: self.display_path(node.id),
                short_description: node.short_description.clone(),
            })
            .collect()
    }
}
