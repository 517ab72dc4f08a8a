use anyhow::{Context, Result, bail};
use clap::Parser;
use class_browser::browser::{Browser, Command, Opened, Outcome};
use class_browser::catalog::list_classes;
use class_browser::cli::{ClasspathAction, Cli, Commands, HistoryAction, TabAction};
use class_browser::config::{LOG_ENV, prefs_db_path, resolve_home, resolve_workspace_path};
use class_browser::entry::FileKind;
use class_browser::prefs::{LmdbPreferences, PreferenceStore, keys};
use class_browser::resolver::find_class;
use class_browser::session::SessionState;
use serde_json::{Value, json};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let home = resolve_home(&cli)?;
    let workspace = resolve_workspace_path(&cli, &home);
    let prefs = LmdbPreferences::open(prefs_db_path(&home))?;

    let mut browser = Browser::with_preferences(&prefs)?;
    if workspace.exists() {
        browser
            .open_workspace(&workspace)
            .with_context(|| format!("Failed to open workspace: {}", workspace.display()))?;
    }

    let output = run(&mut browser, &prefs, cli.command, &workspace)?;

    if browser.is_dirty() {
        let target = browser
            .frame()
            .workspace_file()
            .map(Path::to_path_buf)
            .unwrap_or(workspace);
        browser.save_workspace_to(&target)?;
    }
    browser.save_preferences(&prefs)?;

    match output {
        Value::String(text) => print!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    browser: &mut Browser,
    prefs: &dyn PreferenceStore,
    command: Commands,
    workspace: &Path,
) -> Result<Value> {
    match command {
        Commands::Open { file, class } => {
            let output = open(browser, &file, class.as_deref())?;
            remember_chooser_path(prefs, &file)?;
            Ok(output)
        }
        Commands::Find {
            class_name,
            module_path,
        } => {
            let location = find_class(&browser.session().classpath, &class_name, module_path)
                .with_context(|| format!("Class not found: {class_name}"))?;
            Ok(json!({ "className": class_name, "location": location }))
        }
        Commands::Browse {
            class_name,
            module_path,
            new_tab,
        } => {
            let location = if new_tab {
                browser.open_class(&class_name, module_path)
            } else {
                browser.navigate_to(&class_name, module_path)
            }
            .with_context(|| format!("Class not found: {class_name}"))?;
            Ok(json!({
                "className": class_name,
                "location": location,
                "controls": browser.navigation_controls(),
            }))
        }
        Commands::Classpath { action } => {
            if let ClasspathAction::SetModuleRoot { path: Some(root) } = &action {
                prefs.remember_directory(keys::MODULE_ROOT_CHOOSER_PATH, root)?;
            }
            classpath(browser, action)
        }
        Commands::Tab { action } => tab(browser, action),
        Commands::History { action } => history(browser, action),
        Commands::Recent => Ok(json!(browser.recent().list())),
        Commands::New => {
            browser.dispatch(Command::NewWorkspace)?;
            let path = browser.save_workspace_to(workspace)?;
            Ok(json!({ "workspace": path }))
        }
        Commands::Show => Ok(Value::String(browser.session().to_document()?)),
    }
}

/// Remembers the directory of an opened file for the next file chooser.
fn remember_chooser_path(prefs: &dyn PreferenceStore, file: &Path) -> Result<()> {
    let Some(parent) = file.parent() else {
        return Ok(());
    };
    let key = match FileKind::from_path(file) {
        FileKind::Workspace => keys::WORKSPACE_CHOOSER_PATH,
        _ => keys::CLASSES_CHOOSER_PATH,
    };
    prefs.remember_directory(key, parent)
}

fn open(browser: &mut Browser, file: &Path, class: Option<&str>) -> Result<Value> {
    if FileKind::from_path(file) == FileKind::Archive {
        let Some(class) = class else {
            bail!("--class is required to open an archive: {}", file.display());
        };
        let location = browser
            .open_archive_class(file, class)?
            .with_context(|| format!("Class {class} not found in {}", file.display()))?;
        return Ok(json!({ "opened": "class", "location": location }));
    }

    match browser.open_file(file)? {
        Opened::Class(opened) => Ok(json!({
            "opened": "class",
            "location": opened.location,
            "className": opened.class_name,
            "root": opened.root,
        })),
        Opened::Workspace(path) => Ok(json!({
            "opened": "workspace",
            "workspace": path,
            "tabs": browser.session().tabs().len(),
        })),
    }
}

fn classpath(browser: &mut Browser, action: ClasspathAction) -> Result<Value> {
    let cp = &mut browser.session_mut().classpath;
    let added = match action {
        ClasspathAction::AddDir { path } => cp.add_directory(path),
        ClasspathAction::AddJar { path } => cp.add_archive(path),
        ClasspathAction::AddModule { name } => cp.add_module(name),
        ClasspathAction::SetModuleRoot { path } => {
            cp.set_module_root(path.as_deref());
            true
        }
        ClasspathAction::List => {
            return Ok(json!({ "entries": cp.entries(), "moduleRoot": cp.module_root() }));
        }
        ClasspathAction::Classes => return Ok(json!(list_classes(cp))),
    };
    Ok(json!({ "changed": added, "entries": cp.entries() }))
}

fn tab(browser: &mut Browser, action: TabAction) -> Result<Value> {
    match action {
        TabAction::List => Ok(tab_list(browser.session())),
        TabAction::Select { index } => {
            if !browser.session_mut().select_tab(index) {
                bail!("No tab at index {index}");
            }
            Ok(tab_list(browser.session()))
        }
        TabAction::Close { index } => {
            browser
                .session_mut()
                .close_tab(index)
                .with_context(|| format!("No tab at index {index}"))?;
            Ok(tab_list(browser.session()))
        }
        TabAction::Split { mode } => {
            browser.dispatch(Command::Split(mode.into()))?;
            Ok(tab_list(browser.session()))
        }
    }
}

fn tab_list(session: &SessionState) -> Value {
    let active = session.active_tab_index();
    let tabs: Vec<Value> = session
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            json!({
                "index": i,
                "active": active == Some(i),
                "location": tab.location,
                "current": tab.current_location(),
                "split": tab.split_mode(),
                "controls": tab.history.controls(),
            })
        })
        .collect();
    json!(tabs)
}

fn history(browser: &mut Browser, action: HistoryAction) -> Result<Value> {
    let command = match action {
        HistoryAction::Back => Command::Back,
        HistoryAction::Forward => Command::Forward,
        HistoryAction::Show => {
            let tab = browser.session().active_tab().context("No open tab")?;
            return Ok(json!({
                "entries": tab.history.entries(),
                "index": tab.history.index(),
                "controls": tab.history.controls(),
            }));
        }
    };

    if !browser.is_enabled(&command) {
        let tab = browser.session().active_tab().context("No open tab")?;
        return Ok(json!({
            "location": tab.current_location(),
            "controls": tab.history.controls(),
        }));
    }

    match browser.dispatch(command)? {
        Outcome::Navigated(location) => Ok(json!({
            "location": location,
            "controls": browser.navigation_controls(),
        })),
        other => bail!("Unexpected outcome: {other:?}"),
    }
}
