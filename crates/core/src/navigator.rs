//! Walks the catalog until one runnable command is chosen.
//!
//! The navigator owns the path through the tree. Each level is shown through
//! [`Renderer::render_menu`], so searching within a level is the menu's job
//! and the navigator only sees which entry was picked.

use log::debug;

use crate::catalog::{Catalog, FlatEntry, NodeId};
use crate::config::NavigationMode;
use crate::error::Result;
use crate::menu::MenuEntry;
use crate::session::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    Browsing { level: usize },
    LeafSelected,
    Cancelled,
}

impl NavigatorState {
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, NavigatorState::Browsing { .. })
    }
}

pub struct Navigator<'a> {
    catalog: &'a Catalog,
    mode: NavigationMode,
    /// Node whose subtree is being browsed; the root unless started elsewhere.
    start: NodeId,
    path: Vec<NodeId>,
    flat: Vec<FlatEntry>,
    state: NavigatorState,
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, mode: NavigationMode) -> Self {
        Self::starting_at(catalog, mode, catalog.root())
    }

    /// Starts browsing at `node`.
    ///
    /// A node without children is selected at once when it can run, and
    /// cancels the navigation otherwise.
    #[must_use]
    pub fn starting_at(catalog: &'a Catalog, mode: NavigationMode, node: NodeId) -> Self {
        let path = if node == catalog.root() {
            Vec::new()
        } else {
            catalog.lineage(node)
        };

        let flat = match mode {
            NavigationMode::Tree => Vec::new(),
            NavigationMode::Flat => catalog
                .flatten()
                .into_iter()
                .filter(|entry| catalog.ancestors(entry.id).contains(&node))
                .collect(),
        };

        let mut navigator = Self {
            catalog,
            mode,
            start: node,
            state: NavigatorState::Browsing { level: path.len() },
            path,
            flat,
        };

        let start = catalog.node(node);
        if !start.has_children() {
            if start.runnable && start.available {
                navigator.path = catalog.lineage(node);
                navigator.state = NavigatorState::LeafSelected;
            } else {
                debug!("`{}` has nothing to browse or run", start.name);
                navigator.cancel();
            }
        }

        navigator
    }

    #[must_use]
    pub fn state(&self) -> NavigatorState {
        self.state
    }

    fn current(&self) -> NodeId {
        self.path.last().copied().unwrap_or(self.start)
    }

    #[must_use]
    pub fn title(&self) -> String {
        let root = &self.catalog.node(self.catalog.root()).name;
        match self.mode {
            NavigationMode::Flat => format!("{root}: all commands"),
            NavigationMode::Tree => {
                let current = self.current();
                if current == self.catalog.root() {
                    root.clone()
                } else {
                    format!("{root} {}", self.catalog.display_path(current))
                }
            }
        }
    }

    /// Entries for the current level, in catalog order.
    #[must_use]
    pub fn entries(&self) -> Vec<MenuEntry> {
        match self.mode {
            NavigationMode::Flat => self
                .flat
                .iter()
                .map(|entry| {
                    let node = self.catalog.node(entry.id);
                    MenuEntry::new(
                        entry.display_path.clone(),
                        entry.display_path.clone(),
                        entry.short_description.clone(),
                    )
                    .disabled(!node.available)
                    .with_metadata(node.metadata.clone())
                })
                .collect(),
            NavigationMode::Tree => self
                .catalog
                .children(self.current())
                .iter()
                .map(|child| {
                    let node = self.catalog.node(*child);
                    let dead_end = !node.has_children() && !node.runnable;
                    MenuEntry::new(
                        node.name.clone(),
                        node.name.clone(),
                        node.short_description.clone(),
                    )
                    .disabled(!node.available || dead_end)
                    .with_metadata(node.metadata.clone())
                })
                .collect(),
        }
    }

    /// Applies the choice of entry `index` at the current level.
    ///
    /// Out-of-range and disabled entries leave the state unchanged.
    pub fn choose(&mut self, index: usize) -> NavigatorState {
        let NavigatorState::Browsing { level } = self.state else {
            return self.state;
        };

        if self.entries().get(index).map_or(true, |entry| entry.disabled) {
            return self.state;
        }

        match self.mode {
            NavigationMode::Flat => {
                self.path = self.catalog.lineage(self.flat[index].id);
                self.state = NavigatorState::LeafSelected;
            }
            NavigationMode::Tree => {
                let child = self.catalog.children(self.current())[index];
                self.path.push(child);
                self.state = if self.catalog.node(child).has_children() {
                    NavigatorState::Browsing { level: level + 1 }
                } else {
                    NavigatorState::LeafSelected
                };
            }
        }

        self.state
    }

    pub fn cancel(&mut self) -> NavigatorState {
        self.path.clear();
        self.state = NavigatorState::Cancelled;
        self.state
    }

    /// The chosen path, from below the root down to the command.
    #[must_use]
    pub fn selected_path(&self) -> Option<&[NodeId]> {
        match self.state {
            NavigatorState::LeafSelected => Some(&self.path),
            _ => None,
        }
    }

    /// Shows menus until a command is chosen or the operator cancels.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the renderer.
    pub fn run<R: Renderer + ?Sized>(mut self, renderer: &mut R) -> Result<Option<Vec<NodeId>>> {
        while !self.state.is_final() {
            let title = self.title();
            debug!("Browsing {title}");

            match renderer.render_menu(&title, &self.entries())? {
                Some(index) => {
                    self.choose(index);
                }
                None => {
                    self.cancel();
                }
            }
        }

        Ok(self.selected_path().map(<[NodeId]>::to_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_definitions::CommandDefinition;

    fn catalog() -> Catalog {
        let yaml = r#"
name: app
commands:
  - name: status
    command: ["echo", "ok"]
  - name: deploy
    commands:
      - name: staging
        command: ["echo", "staging"]
      - name: production
        command: ["echo", "production"]
        available: false
  - name: docs
"#;
        let definition: CommandDefinition = serde_yaml::from_str(yaml).unwrap();
        Catalog::build(&definition).unwrap()
    }

    fn names(catalog: &Catalog, path: &[NodeId]) -> Vec<String> {
        path.iter().map(|id| catalog.node(*id).name.clone()).collect()
    }

    #[test]
    fn test_tree_descends_then_selects() {
        let catalog = catalog();
        let mut navigator = Navigator::new(&catalog, NavigationMode::Tree);
        assert_eq!(navigator.title(), "app");

        assert_eq!(navigator.choose(1), NavigatorState::Browsing { level: 1 });
        assert_eq!(navigator.title(), "app deploy");

        assert_eq!(navigator.choose(0), NavigatorState::LeafSelected);
        let path = navigator.selected_path().unwrap();
        assert_eq!(names(&catalog, path), vec!["deploy", "staging"]);
    }

    #[test]
    fn test_disabled_entries_cannot_be_chosen() {
        let catalog = catalog();
        let mut navigator = Navigator::new(&catalog, NavigationMode::Tree);

        let entries = navigator.entries();
        assert!(entries[2].disabled, "childless non-runnable entry");
        assert_eq!(navigator.choose(2), NavigatorState::Browsing { level: 0 });
        assert_eq!(navigator.choose(9), NavigatorState::Browsing { level: 0 });

        navigator.choose(1);
        assert!(navigator.entries()[1].disabled, "unavailable entry");
        assert_eq!(navigator.choose(1), NavigatorState::Browsing { level: 1 });
    }

    #[test]
    fn test_cancel_discards_path() {
        let catalog = catalog();
        let mut navigator = Navigator::new(&catalog, NavigationMode::Tree);
        navigator.choose(1);
        assert_eq!(navigator.cancel(), NavigatorState::Cancelled);
        assert!(navigator.selected_path().is_none());
        assert!(navigator.state().is_final());
    }

    #[test]
    fn test_flat_mode_lists_runnable_paths() {
        let catalog = catalog();
        let mut navigator = Navigator::new(&catalog, NavigationMode::Flat);
        let labels: Vec<String> = navigator.entries().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["status", "deploy staging", "deploy production"]);

        assert_eq!(navigator.choose(1), NavigatorState::LeafSelected);
        let path = navigator.selected_path().unwrap();
        assert_eq!(names(&catalog, path), vec!["deploy", "staging"]);
    }

    #[test]
    fn test_starting_at_group_and_leaf() {
        let catalog = catalog();
        let deploy = catalog.find_by_path(&["deploy"]).unwrap();
        let navigator = Navigator::starting_at(&catalog, NavigationMode::Tree, deploy);
        assert_eq!(navigator.state(), NavigatorState::Browsing { level: 1 });
        assert_eq!(navigator.entries().len(), 2);

        let status = catalog.find_by_path(&["status"]).unwrap();
        let navigator = Navigator::starting_at(&catalog, NavigationMode::Tree, status);
        assert_eq!(navigator.state(), NavigatorState::LeafSelected);
        assert_eq!(navigator.selected_path(), Some(&[status][..]));

        let navigator = Navigator::starting_at(&catalog, NavigationMode::Flat, deploy);
        assert_eq!(navigator.entries().len(), 2);
    }

    #[test]
    fn test_starting_at_dead_end_cancels() {
        let catalog = catalog();
        let docs = catalog.find_by_path(&["docs"]).unwrap();
        let navigator = Navigator::starting_at(&catalog, NavigationMode::Tree, docs);
        assert_eq!(navigator.state(), NavigatorState::Cancelled);
        assert!(navigator.selected_path().is_none());

        let production = catalog.find_by_path(&["deploy", "production"]).unwrap();
        let navigator = Navigator::starting_at(&catalog, NavigationMode::Flat, production);
        assert_eq!(navigator.state(), NavigatorState::Cancelled, "unavailable");
    }

    #[test]
    fn test_bare_root_cancels() {
        let definition: CommandDefinition = serde_yaml::from_str("name: bare\n").unwrap();
        let catalog = Catalog::build(&definition).unwrap();
        let navigator = Navigator::new(&catalog, NavigationMode::Tree);
        assert_eq!(navigator.state(), NavigatorState::Cancelled);
    }

    #[test]
    fn test_runnable_root_without_children() {
        let definition: CommandDefinition =
            serde_yaml::from_str("name: solo\ncommand: [\"true\"]\n").unwrap();
        let catalog = Catalog::build(&definition).unwrap();
        let navigator = Navigator::new(&catalog, NavigationMode::Tree);
        assert_eq!(navigator.selected_path(), Some(&[catalog.root()][..]));
    }
}
