//! Sequencing of one interactive session.
//!
//! A session runs navigation, parameter collection, the form and the
//! confirmation gate in order, stopping at the first cancellation. Drawing is
//! delegated to a [`Renderer`]; [`LoopRenderer`] provides one on top of any
//! [`Screen`].

use indexmap::IndexMap;
use log::{debug, warn};

use crate::catalog::{Catalog, NodeId};
use crate::command_definitions::ParameterType;
use crate::config::SessionConfig;
use crate::confirm::ConfirmModel;
use crate::engine::{run_model, Screen};
use crate::error::{Error, Result};
use crate::form::FormModel;
use crate::menu::{MenuEntry, MenuModel};
use crate::navigator::Navigator;
use crate::parameters::{apply, collect, ParameterSpec};

/// Host capability for presenting each stage.
///
/// `None` means the operator cancelled.
pub trait Renderer {
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Render`] when drawing or input fails.
    fn render_menu(&mut self, title: &str, entries: &[MenuEntry]) -> Result<Option<usize>>;

    /// # Errors
    ///
    /// Returns [`crate::error::Error::Render`] when drawing or input fails.
    fn render_form(
        &mut self,
        title: &str,
        parameters: &[ParameterSpec],
    ) -> Result<Option<IndexMap<String, String>>>;

    /// # Errors
    ///
    /// Returns [`crate::error::Error::Render`] when drawing or input fails.
    fn render_confirmation(&mut self, title: &str, message: &str) -> Result<Option<bool>>;

    /// Called exactly once when the session ends.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Render`] when the terminal cannot be restored.
    fn cleanup(&mut self) -> Result<()>;
}

/// Runs the menu, form and confirmation models on a [`Screen`].
///
/// The screen is entered on first use and restored by `cleanup`.
pub struct LoopRenderer<S: Screen> {
    screen: S,
    config: SessionConfig,
    entered: bool,
}

impl<S: Screen> LoopRenderer<S> {
    pub fn new(screen: S, config: SessionConfig) -> Self {
        Self {
            screen,
            config,
            entered: false,
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn into_screen(self) -> S {
        self.screen
    }

    fn ensure_entered(&mut self) -> Result<()> {
        if !self.entered {
            self.screen.enter()?;
            self.entered = true;
        }
        Ok(())
    }
}

impl<S: Screen> Renderer for LoopRenderer<S> {
    fn render_menu(&mut self, title: &str, entries: &[MenuEntry]) -> Result<Option<usize>> {
        self.ensure_entered()?;
        let model = MenuModel::new(title, entries.to_vec()).configured(&self.config);
        Ok(run_model(model, &mut self.screen)?.completed())
    }

    fn render_form(
        &mut self,
        title: &str,
        parameters: &[ParameterSpec],
    ) -> Result<Option<IndexMap<String, String>>> {
        self.ensure_entered()?;
        let model = FormModel::new(title, parameters.to_vec())
            .grouped(self.config.group_parameters_by_scope);
        Ok(run_model(model, &mut self.screen)?.completed())
    }

    fn render_confirmation(&mut self, title: &str, message: &str) -> Result<Option<bool>> {
        self.ensure_entered()?;
        Ok(run_model(ConfirmModel::new(title, message), &mut self.screen)?.completed())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.entered {
            self.entered = false;
            self.screen.restore()?;
        }
        Ok(())
    }
}

/// What a session hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionResult {
    /// Ids from below the root down to the chosen command; empty when cancelled.
    pub selected_path: Vec<NodeId>,
    pub values: IndexMap<String, String>,
    pub confirmed: bool,
    pub cancelled: bool,
}

impl SessionResult {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    /// The chosen command.
    #[must_use]
    pub fn command(&self) -> Option<NodeId> {
        self.selected_path.last().copied()
    }

    /// Whether the host should run the command.
    #[must_use]
    pub fn should_execute(&self) -> bool {
        !self.cancelled && self.confirmed
    }
}

pub struct Session<'a> {
    catalog: &'a Catalog,
    config: SessionConfig,
    presets: IndexMap<String, String>,
    start: Option<NodeId>,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, config: SessionConfig) -> Self {
        Self {
            catalog,
            config,
            presets: IndexMap::new(),
            start: None,
        }
    }

    /// Values to pre-fill; they are validated against the chosen command.
    #[must_use]
    pub fn with_presets(mut self, presets: IndexMap<String, String>) -> Self {
        self.presets = presets;
        self
    }

    #[must_use]
    pub fn starting_at(mut self, node: NodeId) -> Self {
        self.start = Some(node);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs every stage and then cleans up the renderer.
    ///
    /// # Errors
    ///
    /// Renderer failures abort the session. `cleanup` still runs, and the
    /// original failure is the one returned. Starting at a command that has
    /// no children and cannot run fails with [`Error::CommandNotFound`].
    pub fn run<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<SessionResult> {
        let result = self.run_stages(renderer);
        let cleanup = renderer.cleanup();

        let result = result?;
        cleanup?;
        Ok(result)
    }

    fn run_stages<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<SessionResult> {
        if let Some(node) = self.start {
            let target = self.catalog.node(node);
            if !target.has_children() && !(target.runnable && target.available) {
                return Err(Error::CommandNotFound(self.catalog.display_path(node)));
            }
        }

        let navigator = match self.start {
            Some(node) => Navigator::starting_at(self.catalog, self.config.navigation, node),
            None => Navigator::new(self.catalog, self.config.navigation),
        };

        let Some(path) = navigator.run(renderer)? else {
            debug!("Navigation cancelled");
            return Ok(SessionResult::cancelled());
        };
        let Some(&command) = path.last() else {
            return Ok(SessionResult::cancelled());
        };
        debug!("Selected `{}`", self.catalog.display_path(command));

        let mut parameters = collect(self.catalog, command);
        self.apply_presets(command, &mut parameters);

        let mut values: IndexMap<String, String> = parameters
            .iter()
            .map(|spec| (spec.name.clone(), spec.current_value.clone()))
            .collect();

        if self.config.show_parameters && !parameters.is_empty() {
            let title = format!("Configure: {}", self.catalog.display_path(command));
            match renderer.render_form(&title, &parameters)? {
                Some(submitted) => values = submitted,
                None => {
                    debug!("Parameter form cancelled");
                    return Ok(SessionResult::cancelled());
                }
            }
        }

        let confirmed = if self.config.confirm_before_execute {
            let line = command_line(self.catalog, &path, &parameters, &values);
            let message = format!("Command to execute:\n\n  {line}");
            match renderer.render_confirmation("Confirm Execution", &message)? {
                Some(confirmed) => confirmed,
                None => {
                    debug!("Confirmation cancelled");
                    return Ok(SessionResult::cancelled());
                }
            }
        } else {
            true
        };

        Ok(SessionResult {
            selected_path: path,
            values,
            confirmed,
            cancelled: false,
        })
    }

    fn apply_presets(&self, command: NodeId, parameters: &mut [ParameterSpec]) {
        if self.presets.is_empty() {
            return;
        }

        let outcome = apply(self.catalog, command, &self.presets);
        if let Some(e) = &outcome.error {
            warn!("Ignoring preset value: {e}");
        }

        for spec in parameters.iter_mut() {
            if outcome.bindings.contains_key(&spec.name) {
                if let Some(value) = self.presets.get(&spec.name) {
                    spec.current_value.clone_from(value);
                }
            }
        }
    }
}

fn is_shell_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c))
}

/// Quotes `value` for a POSIX shell unless it is made of safe characters only.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    if is_shell_safe(value) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// The invocation a session resolves to, as it would be typed.
///
/// Starts with the root name and the names along `path`, followed by one
/// flag per parameter whose value differs from its default.
#[must_use]
pub fn command_line(
    catalog: &Catalog,
    path: &[NodeId],
    parameters: &[ParameterSpec],
    values: &IndexMap<String, String>,
) -> String {
    let root = catalog.root();
    let mut parts = vec![catalog.node(root).name.clone()];
    parts.extend(
        path.iter()
            .filter(|id| **id != root)
            .map(|id| catalog.node(*id).name.clone()),
    );

    for spec in parameters {
        let value = values
            .get(&spec.name)
            .map_or(spec.current_value.as_str(), String::as_str);
        if value == spec.default_value {
            continue;
        }

        if spec.kind == ParameterType::Bool && value == "true" {
            parts.push(format!("--{}", spec.name));
        } else {
            parts.push(format!("--{}={}", spec.name, shell_quote(value)));
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use super::*;
    use crate::command_definitions::CommandDefinition;
    use crate::engine::testing::ScriptedScreen;
    use crate::engine::Key;

    const CATALOG: &str = r#"
name: app
parameters:
  - name: verbose
    type: bool
commands:
  - name: status
    command: ["echo", "ok"]
  - name: deploy
    parameters:
      - name: region
        default: eu
    commands:
      - name: web
        command: ["echo", "{region}"]
        parameters:
          - name: replicas
            type: int
            default: "2"
"#;

    fn catalog() -> Catalog {
        let definition: CommandDefinition = serde_yaml::from_str(CATALOG).unwrap();
        Catalog::build(&definition).unwrap()
    }

    enum Reply {
        Menu(Option<usize>),
        Form(Option<Vec<(&'static str, &'static str)>>),
        Confirm(Option<bool>),
        Fail,
    }

    /// Replays canned answers and records what it was asked.
    #[derive(Default)]
    struct ScriptedRenderer {
        replies: VecDeque<Reply>,
        titles: Vec<String>,
        forms: Vec<Vec<String>>,
        messages: Vec<String>,
        cleanups: usize,
    }

    impl ScriptedRenderer {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: replies.into(),
                ..Self::default()
            }
        }

        fn next(&mut self) -> Result<Reply> {
            match self.replies.pop_front() {
                Some(Reply::Fail) | None => Err(Error::Render(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "terminal gone",
                ))),
                Some(reply) => Ok(reply),
            }
        }
    }

    impl Renderer for ScriptedRenderer {
        fn render_menu(&mut self, title: &str, _: &[MenuEntry]) -> Result<Option<usize>> {
            self.titles.push(title.to_string());
            match self.next()? {
                Reply::Menu(choice) => Ok(choice),
                _ => panic!("unexpected menu"),
            }
        }

        fn render_form(
            &mut self,
            title: &str,
            parameters: &[ParameterSpec],
        ) -> Result<Option<IndexMap<String, String>>> {
            self.titles.push(title.to_string());
            self.forms
                .push(parameters.iter().map(|p| format!("{}={}", p.name, p.current_value)).collect());
            match self.next()? {
                Reply::Form(Some(changes)) => {
                    let mut values: IndexMap<String, String> = parameters
                        .iter()
                        .map(|p| (p.name.clone(), p.current_value.clone()))
                        .collect();
                    for (name, value) in changes {
                        values.insert(name.to_string(), value.to_string());
                    }
                    Ok(Some(values))
                }
                Reply::Form(None) => Ok(None),
                _ => panic!("unexpected form"),
            }
        }

        fn render_confirmation(&mut self, title: &str, message: &str) -> Result<Option<bool>> {
            self.titles.push(title.to_string());
            self.messages.push(message.to_string());
            match self.next()? {
                Reply::Confirm(answer) => Ok(answer),
                _ => panic!("unexpected confirmation"),
            }
        }

        fn cleanup(&mut self) -> Result<()> {
            self.cleanups += 1;
            Ok(())
        }
    }

    #[test]
    fn test_full_session() {
        let catalog = catalog();
        let mut renderer = ScriptedRenderer::new(vec![
            Reply::Menu(Some(1)),
            Reply::Menu(Some(0)),
            Reply::Form(Some(vec![("replicas", "4"), ("verbose", "true")])),
            Reply::Confirm(Some(true)),
        ]);

        let result = Session::new(&catalog, SessionConfig::default())
            .run(&mut renderer)
            .unwrap();

        assert!(result.should_execute());
        assert_eq!(catalog.display_path(result.command().unwrap()), "deploy web");
        assert_eq!(result.values["replicas"], "4");
        assert_eq!(result.values["region"], "eu");
        assert_eq!(
            renderer.forms[0],
            vec!["replicas=2", "region=eu", "verbose=false"]
        );
        assert_eq!(
            renderer.messages[0],
            "Command to execute:\n\n  app deploy web --replicas=4 --verbose"
        );
        assert_eq!(renderer.titles[2], "Configure: deploy web");
        assert_eq!(renderer.cleanups, 1);
    }

    #[test]
    fn test_cancel_at_any_stage() {
        let catalog = catalog();
        let scripts = vec![
            vec![Reply::Menu(None)],
            vec![Reply::Menu(Some(1)), Reply::Menu(None)],
            vec![Reply::Menu(Some(1)), Reply::Menu(Some(0)), Reply::Form(None)],
            vec![
                Reply::Menu(Some(1)),
                Reply::Menu(Some(0)),
                Reply::Form(Some(Vec::new())),
                Reply::Confirm(None),
            ],
        ];

        for script in scripts {
            let mut renderer = ScriptedRenderer::new(script);
            let result = Session::new(&catalog, SessionConfig::default())
                .run(&mut renderer)
                .unwrap();
            assert!(result.cancelled);
            assert!(result.selected_path.is_empty());
            assert!(!result.should_execute());
            assert_eq!(renderer.cleanups, 1);
            assert!(renderer.replies.is_empty());
        }
    }

    #[test]
    fn test_denied_confirmation_is_not_cancelled() {
        let catalog = catalog();
        let mut renderer = ScriptedRenderer::new(vec![
            Reply::Menu(Some(0)),
            Reply::Form(Some(Vec::new())),
            Reply::Confirm(Some(false)),
        ]);
        let result = Session::new(&catalog, SessionConfig::default())
            .run(&mut renderer)
            .unwrap();
        assert!(!result.cancelled);
        assert!(!result.confirmed);
        assert!(!result.should_execute());
    }

    #[test]
    fn test_stages_can_be_skipped() {
        let catalog = catalog();
        let config = SessionConfig {
            show_parameters: false,
            confirm_before_execute: false,
            ..SessionConfig::default()
        };
        let mut renderer = ScriptedRenderer::new(vec![Reply::Menu(Some(0))]);
        let result = Session::new(&catalog, config).run(&mut renderer).unwrap();
        assert!(result.confirmed);
        assert_eq!(result.values["verbose"], "false");
        assert!(renderer.forms.is_empty());
    }

    #[test]
    fn test_render_error_still_cleans_up() {
        let catalog = catalog();
        let mut renderer = ScriptedRenderer::new(vec![Reply::Menu(Some(1)), Reply::Fail]);
        let result = Session::new(&catalog, SessionConfig::default()).run(&mut renderer);
        assert!(matches!(result, Err(Error::Render(_))));
        assert_eq!(renderer.cleanups, 1);
    }

    #[test]
    fn test_dead_end_is_never_selected() {
        let definition: CommandDefinition = serde_yaml::from_str(
            "name: app\ncommands:\n  - name: docs\n  - name: s\n    command: [\"true\"]\n",
        )
        .unwrap();
        let catalog = Catalog::build(&definition).unwrap();
        let docs = catalog.find_by_path(&["docs"]).unwrap();

        let mut renderer = ScriptedRenderer::new(Vec::new());
        let result = Session::new(&catalog, SessionConfig::default())
            .starting_at(docs)
            .run(&mut renderer);
        assert!(matches!(result, Err(Error::CommandNotFound(path)) if path == "docs"));
        assert_eq!(renderer.cleanups, 1);

        let definition: CommandDefinition = serde_yaml::from_str("name: bare\n").unwrap();
        let catalog = Catalog::build(&definition).unwrap();
        let mut renderer = ScriptedRenderer::new(Vec::new());
        let result = Session::new(&catalog, SessionConfig::default())
            .run(&mut renderer)
            .unwrap();
        assert!(result.cancelled);
        assert!(!result.should_execute());
        assert!(renderer.titles.is_empty());
    }

    #[test]
    fn test_presets_prefill_form() {
        let catalog = catalog();
        let web = catalog.find_by_path(&["deploy", "web"]).unwrap();
        let presets: IndexMap<String, String> = [
            ("replicas", "9"),
            ("region", "us"),
            ("unknown", "x"),
            ("verbose", "maybe"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut renderer = ScriptedRenderer::new(vec![
            Reply::Form(Some(Vec::new())),
            Reply::Confirm(Some(true)),
        ]);
        let result = Session::new(&catalog, SessionConfig::default())
            .with_presets(presets)
            .starting_at(web)
            .run(&mut renderer)
            .unwrap();

        assert_eq!(
            renderer.forms[0],
            vec!["replicas=9", "region=us", "verbose=false"]
        );
        assert_eq!(result.values["region"], "us");
        assert!(renderer.titles.iter().all(|t| !t.starts_with("app")));
    }

    #[test]
    fn test_command_line_quotes_and_bools() {
        let catalog = catalog();
        let web = catalog.find_by_path(&["deploy", "web"]).unwrap();
        let parameters = collect(&catalog, web);
        let mut values: IndexMap<String, String> = parameters
            .iter()
            .map(|p| (p.name.clone(), p.default_value.clone()))
            .collect();

        let path = catalog.lineage(web);
        assert_eq!(command_line(&catalog, &path, &parameters, &values), "app deploy web");

        values.insert("region".to_string(), "eu west".to_string());
        assert_eq!(
            command_line(&catalog, &path, &parameters, &values),
            "app deploy web --region='eu west'"
        );
    }

    #[test]
    fn test_loop_renderer_drives_models() {
        let catalog = catalog();
        let mut keys = vec![Key::Down, Key::Enter, Key::Enter];
        keys.extend([Key::Char('e'), Key::Backspace, Key::Char('5'), Key::Enter, Key::Enter]);
        keys.push(Key::Char('y'));

        let mut renderer = LoopRenderer::new(ScriptedScreen::new(&keys), SessionConfig::default());
        let result = Session::new(&catalog, SessionConfig::default())
            .run(&mut renderer)
            .unwrap();

        assert!(result.should_execute());
        assert_eq!(result.values["replicas"], "5");
        assert!(renderer.screen().events.is_empty());
        assert!(renderer
            .screen()
            .last_frame()
            .text()
            .contains("app deploy web --replicas=5"));
    }
}
