use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;

use crate::error::BrowserError;
use crate::session::SessionState;

pub const WORKSPACE_FILE_SUFFIX: &str = "cbw";

/// A session parsed off the coordinating thread, ready to be applied.
#[derive(Debug)]
pub struct LoadedSession {
    pub path: PathBuf,
    pub session: SessionState,
}

/// Appends the workspace suffix unless `path` already carries it.
pub fn workspace_file(path: &Path) -> PathBuf {
    let has_suffix = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(WORKSPACE_FILE_SUFFIX));
    if has_suffix {
        return path.to_path_buf();
    }
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(WORKSPACE_FILE_SUFFIX);
    PathBuf::from(os)
}

/// Writes `session` to `path` through a temporary file and a rename, so a
/// failed save never leaves a half-written workspace behind.
pub fn save_session(path: &Path, session: &SessionState) -> Result<(), BrowserError> {
    let document = session.to_document()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| BrowserError::storage(parent, e))?;
    }

    let mut tmp_os = path.as_os_str().to_os_string();
    tmp_os.push(".tmp");
    let tmp = PathBuf::from(tmp_os);
    std::fs::write(&tmp, document).map_err(|e| BrowserError::storage(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(BrowserError::storage(path, e));
    }

    tracing::info!(path = %path.display(), tabs = session.tabs().len(), "workspace saved");
    Ok(())
}

pub fn load_session(path: &Path) -> Result<LoadedSession, BrowserError> {
    let text = std::fs::read_to_string(path).map_err(|e| BrowserError::storage(path, e))?;
    let session = SessionState::from_document(&text)?;
    tracing::info!(
        path = %path.display(),
        entries = session.classpath.len(),
        tabs = session.tabs().len(),
        "workspace loaded"
    );
    Ok(LoadedSession {
        path: path.to_path_buf(),
        session,
    })
}

/// Reads and parses `path` on a worker thread.
///
/// The worker never touches live state; the caller applies the result.
pub fn spawn_load(path: PathBuf) -> PendingLoad {
    let (tx, rx) = std::sync::mpsc::channel();
    let worker_path = path.clone();
    let handle = std::thread::spawn(move || {
        let _ = tx.send(load_session(&worker_path));
    });
    PendingLoad {
        path,
        rx,
        handle: Some(handle),
    }
}

pub struct PendingLoad {
    path: PathBuf,
    rx: Receiver<Result<LoadedSession, BrowserError>>,
    handle: Option<JoinHandle<()>>,
}

impl PendingLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the result if the worker has finished, without blocking.
    pub fn try_take(&mut self) -> Option<Result<LoadedSession, BrowserError>> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(self.worker_lost()))
            }
        }
    }

    pub fn wait(mut self) -> Result<LoadedSession, BrowserError> {
        let result = self.rx.recv().unwrap_or_else(|_| Err(self.worker_lost()));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn worker_lost(&self) -> BrowserError {
        BrowserError::storage(
            &self.path,
            std::io::Error::other("workspace loader exited without a result"),
        )
    }
}
