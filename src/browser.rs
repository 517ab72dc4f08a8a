//! The single writer over all browser state.
//!
//! Front ends translate user actions into [`Command`]s (or call the plain
//! operations directly) and go through [`Browser::dispatch`]; enabling of
//! controls is derived from [`Browser::is_enabled`].

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::bounds::{DEFAULT_SCREEN, ScreenSize, WindowSettings};
use crate::entry::{ClassLocation, FileKind};
use crate::error::BrowserError;
use crate::history::NavigationControls;
use crate::prefs::PreferenceStore;
use crate::recent::RecentEntries;
use crate::resolver::{self, OpenedClass};
use crate::session::{SessionState, SplitMode};
use crate::store::{self, LoadedSession};
use crate::windows::{WindowHandle, WindowId, WindowRegistry};

pub const APPLICATION_TITLE: &str = "class-browser";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Back,
    Forward,
    NextWindow,
    PreviousWindow,
    NewWindow,
    CloseWindow,
    NewWorkspace,
    SaveWorkspace,
    SaveWorkspaceAs(PathBuf),
    Split(SplitMode),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Back => "Backward",
            Self::Forward => "Forward",
            Self::NextWindow => "Next window",
            Self::PreviousWindow => "Previous window",
            Self::NewWindow => "New window",
            Self::CloseWindow => "Close window",
            Self::NewWorkspace => "New workspace",
            Self::SaveWorkspace => "Save workspace",
            Self::SaveWorkspaceAs(_) => "Save workspace as",
            Self::Split(SplitMode::None) => "Unsplit",
            Self::Split(SplitMode::Horizontal) => "Split horizontally",
            Self::Split(SplitMode::Vertical) => "Split vertically",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigated(ClassLocation),
    WindowActivated(WindowHandle),
    Saved(PathBuf),
    Done,
    /// The last window was asked to close.
    Exit,
}

/// What a file opened through [`Browser::open_file`] turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    Class(OpenedClass),
    Workspace(PathBuf),
}

/// State of one top-level window.
#[derive(Debug, Default)]
pub struct Frame {
    pub session: SessionState,
    settings: WindowSettings,
    workspace_file: Option<PathBuf>,
    saved_fingerprint: Option<String>,
}

impl Frame {
    fn with_settings(settings: WindowSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn workspace_file(&self) -> Option<&Path> {
        self.workspace_file.as_deref()
    }

    pub fn settings(&self) -> WindowSettings {
        self.settings
    }
}

#[derive(Debug)]
pub struct Browser {
    screen: ScreenSize,
    windows: WindowRegistry,
    active_id: WindowId,
    active: Frame,
    inactive: HashMap<WindowId, Frame>,
    recent: RecentEntries,
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

impl Browser {
    pub fn new() -> Self {
        Self::with_screen(DEFAULT_SCREEN)
    }

    pub fn with_screen(screen: ScreenSize) -> Self {
        let mut windows = WindowRegistry::new();
        let first = windows.open();
        Self {
            screen,
            windows,
            active_id: first.id,
            active: Frame::with_settings(WindowSettings::centered(screen)),
            inactive: HashMap::new(),
            recent: RecentEntries::new(),
        }
    }

    pub fn with_preferences(store: &dyn PreferenceStore) -> Result<Self> {
        let mut browser = Self::new();
        browser.load_preferences(store)?;
        Ok(browser)
    }

    /// Restores recent workspaces and the placement of the active window.
    pub fn load_preferences(&mut self, store: &dyn PreferenceStore) -> Result<()> {
        self.recent.read(store)?;
        self.active.settings = WindowSettings::read(store, self.screen)?;
        Ok(())
    }

    /// Persists recent workspaces and the active window's placement.
    pub fn save_preferences(&self, store: &dyn PreferenceStore) -> Result<()> {
        self.recent.save(store)?;
        self.active.settings.save(store)
    }

    /// Records where the front end placed the active window.
    pub fn set_window_settings(&mut self, settings: WindowSettings) {
        self.active.settings = WindowSettings {
            bounds: settings.bounds.sanitize(self.screen),
            ..settings
        };
    }

    pub fn session(&self) -> &SessionState {
        &self.active.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.active.session
    }

    pub fn frame(&self) -> &Frame {
        &self.active
    }

    pub fn active_window(&self) -> Option<WindowHandle> {
        self.windows.get(self.active_id)
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn recent(&self) -> &RecentEntries {
        &self.recent
    }

    pub fn title(&self) -> String {
        match self
            .active
            .workspace_file
            .as_deref()
            .and_then(Path::file_name)
        {
            Some(name) => format!("{APPLICATION_TITLE} [{}]", name.to_string_lossy()),
            None => APPLICATION_TITLE.to_string(),
        }
    }

    /// True when the session differs from what was last saved or loaded.
    pub fn is_dirty(&self) -> bool {
        let current = self.active.session.fingerprint().ok();
        match &self.active.saved_fingerprint {
            Some(saved) => current.as_ref() != Some(saved),
            None => self.active.session != SessionState::default(),
        }
    }

    pub fn navigation_controls(&self) -> NavigationControls {
        self.active
            .session
            .active_tab()
            .map(|tab| tab.history.controls())
            .unwrap_or_default()
    }

    pub fn is_enabled(&self, command: &Command) -> bool {
        match command {
            Command::Back => self.navigation_controls().back,
            Command::Forward => self.navigation_controls().forward,
            Command::NextWindow | Command::PreviousWindow => self.windows.has_multiple(),
            Command::SaveWorkspace => self.active.workspace_file.is_some(),
            Command::Split(_) => self.active.session.active_tab().is_some(),
            Command::NewWindow
            | Command::CloseWindow
            | Command::NewWorkspace
            | Command::SaveWorkspaceAs(_) => true,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        if !self.is_enabled(&command) {
            bail!("Command is not available: {}", command.name());
        }
        tracing::debug!(command = command.name(), "dispatch");

        match command {
            Command::Back => self.step_history(true),
            Command::Forward => self.step_history(false),
            Command::NextWindow => {
                let target = self.windows.next(self.active_id);
                self.activate_handle(target)
            }
            Command::PreviousWindow => {
                let target = self.windows.previous(self.active_id);
                self.activate_handle(target)
            }
            Command::NewWindow => {
                let handle = self.windows.open();
                let next = Frame::with_settings(self.active.settings.next_window(self.screen));
                let previous = std::mem::replace(&mut self.active, next);
                self.inactive.insert(self.active_id, previous);
                self.active_id = handle.id;
                Ok(Outcome::WindowActivated(handle))
            }
            Command::CloseWindow => {
                if !self.windows.has_multiple() {
                    return Ok(Outcome::Exit);
                }
                let closing = self.active_id;
                let target = self.windows.next(closing);
                let outcome = self.activate_handle(target)?;
                self.windows.unregister(closing);
                self.inactive.remove(&closing);
                Ok(outcome)
            }
            Command::NewWorkspace => {
                self.active = Frame::with_settings(self.active.settings);
                Ok(Outcome::Done)
            }
            Command::SaveWorkspace => {
                let path = self
                    .active
                    .workspace_file
                    .clone()
                    .context("No workspace file to save to")?;
                self.save_workspace_to(&path).map(Outcome::Saved)
            }
            Command::SaveWorkspaceAs(path) => self.save_workspace_to(&path).map(Outcome::Saved),
            Command::Split(mode) => {
                if let Some(tab) = self.active.session.active_tab_mut() {
                    tab.split(mode);
                }
                Ok(Outcome::Done)
            }
        }
    }

    fn step_history(&mut self, back: bool) -> Result<Outcome> {
        let tab = self
            .active
            .session
            .active_tab_mut()
            .context("No open tab")?;
        let entry = if back {
            tab.history.back()
        } else {
            tab.history.forward()
        };
        let location = entry.map(|e| e.location.clone()).context("History boundary")?;
        Ok(Outcome::Navigated(location))
    }

    fn activate_handle(&mut self, target: Option<WindowHandle>) -> Result<Outcome> {
        let handle = target.context("Window is not registered")?;
        if handle.id != self.active_id {
            let next = self.inactive.remove(&handle.id).unwrap_or_default();
            let previous = std::mem::replace(&mut self.active, next);
            self.inactive.insert(self.active_id, previous);
            self.active_id = handle.id;
        }
        Ok(Outcome::WindowActivated(handle))
    }

    /// Opens a file by kind: class files get a tab, workspace files replace the session.
    pub fn open_file(&mut self, path: &Path) -> Result<Opened> {
        match FileKind::from_path(path) {
            FileKind::Class => Ok(Opened::Class(self.open_class_file(path)?)),
            FileKind::Workspace => {
                self.open_workspace(path)?;
                Ok(Opened::Workspace(path.to_path_buf()))
            }
            FileKind::Archive => {
                bail!("Select a class from the archive: {}", path.display())
            }
            FileKind::Other => bail!("Not a class file or workspace: {}", path.display()),
        }
    }

    pub fn open_class_file(&mut self, path: &Path) -> Result<OpenedClass> {
        let opened = resolver::open_class_file(&mut self.active.session.classpath, path)
            .with_context(|| format!("Failed to open class file: {}", path.display()))?;
        self.active.session.open_tab(opened.location.clone());
        Ok(opened)
    }

    pub fn open_archive_class(
        &mut self,
        archive: &Path,
        class_name: &str,
    ) -> Result<Option<ClassLocation>> {
        let location =
            resolver::open_archive_class(&mut self.active.session.classpath, archive, class_name)?;
        if let Some(location) = &location {
            self.active.session.open_tab(location.clone());
        }
        Ok(location)
    }

    /// Resolves `class_name` on the classpath and opens it in a new tab.
    pub fn open_class(
        &mut self,
        class_name: &str,
        prefer_module_path: bool,
    ) -> Option<ClassLocation> {
        let location =
            resolver::find_class(&self.active.session.classpath, class_name, prefer_module_path)?;
        self.active.session.open_tab(location.clone());
        Some(location)
    }

    /// Resolves `class_name` and records it in the active tab's history,
    /// opening a tab when none is open.
    pub fn navigate_to(
        &mut self,
        class_name: &str,
        prefer_module_path: bool,
    ) -> Option<ClassLocation> {
        let location =
            resolver::find_class(&self.active.session.classpath, class_name, prefer_module_path)?;
        match self.active.session.active_tab_mut() {
            Some(tab) => tab.visit(location.clone()),
            None => {
                self.active.session.open_tab(location.clone());
            }
        }
        Some(location)
    }

    /// Loads a workspace on a worker thread and applies it.
    ///
    /// On failure the current session is left untouched.
    pub fn open_workspace(&mut self, path: &Path) -> Result<(), BrowserError> {
        let loaded = store::spawn_load(path.to_path_buf()).wait()?;
        self.apply_loaded(loaded);
        Ok(())
    }

    pub fn apply_loaded(&mut self, loaded: LoadedSession) {
        let fingerprint = loaded.session.fingerprint().ok();
        self.recent.touch(&loaded.path);
        self.active = Frame {
            session: loaded.session,
            settings: self.active.settings,
            workspace_file: Some(loaded.path),
            saved_fingerprint: fingerprint,
        };
    }

    /// Saves the session, adding the workspace suffix when missing.
    ///
    /// A failed save keeps the in-memory session and its dirty state.
    pub fn save_workspace_to(&mut self, path: &Path) -> Result<PathBuf> {
        let path = store::workspace_file(path);
        store::save_session(&path, &self.active.session)?;
        self.active.saved_fingerprint = Some(self.active.session.fingerprint()?);
        self.active.workspace_file = Some(path.clone());
        self.recent.touch(&path);
        Ok(path)
    }
}
