use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{gateway::RouteInfo, resolver::Selection};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Only a selection with route, direction and stop can be saved")]
    IncompleteSelection,
}

/// A saved route, direction and stop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub route: RouteInfo,
    pub direction: usize,
    pub stop_id: String,
    pub stop_name: String,
}

impl Shortcut {
    pub fn from_selection(selection: &Selection) -> Option<Self> {
        Some(Self {
            route: selection.route.clone()?,
            direction: selection.direction?,
            stop_id: selection.stop_id.clone()?,
            stop_name: selection.stop_name.clone()?,
        })
    }

    /// Rebuilds the selection from the stored route record, no lookups needed.
    pub fn to_selection(&self) -> Selection {
        Selection {
            route: Some(self.route.clone()),
            direction: Some(self.direction),
            stop_id: Some(self.stop_id.clone()),
            stop_name: Some(self.stop_name.clone()),
        }
    }
}

/// Named shortcuts, written back to disk in full on every change.
#[derive(Debug, Clone, Default)]
pub struct ShortcutStore {
    path: Option<PathBuf>,
    shortcuts: BTreeMap<String, Shortcut>,
}

impl ShortcutStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Default::default()
    }

    /// Opens the store at `path`. A missing or unreadable file leaves the
    /// store empty; the failure is only logged.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let shortcuts = match load(&path) {
            Ok(shortcuts) => {
                info!("Loaded {} shortcuts from {}", shortcuts.len(), path.display());
                shortcuts
            }
            Err(self::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No shortcut file at {}", path.display());
                BTreeMap::new()
            }
            Err(err) => {
                warn!("Ignoring shortcut file {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            shortcuts,
        }
    }

    pub fn save(&mut self, name: &str, selection: &Selection) -> Result<(), self::Error> {
        let shortcut = Shortcut::from_selection(selection).ok_or(self::Error::IncompleteSelection)?;
        let mut shortcuts = self.shortcuts.clone();
        shortcuts.insert(name.to_string(), shortcut);
        self.commit(shortcuts)
    }

    /// Returns whether `name` existed. Removing an unknown name changes nothing.
    pub fn remove(&mut self, name: &str) -> Result<bool, self::Error> {
        if !self.shortcuts.contains_key(name) {
            return Ok(false);
        }
        let mut shortcuts = self.shortcuts.clone();
        shortcuts.remove(name);
        self.commit(shortcuts)?;
        Ok(true)
    }

    pub fn restore(&self, name: &str) -> Option<Selection> {
        self.shortcuts.get(name).map(Shortcut::to_selection)
    }

    pub fn get(&self, name: &str) -> Option<&Shortcut> {
        self.shortcuts.get(name)
    }

    /// Shortcut names in alphabetical order.
    pub fn list(&self) -> Vec<&str> {
        self.shortcuts.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    /// Adopts `shortcuts` once they are on disk. On a failed write the store
    /// keeps what the file still holds.
    fn commit(&mut self, shortcuts: BTreeMap<String, Shortcut>) -> Result<(), self::Error> {
        if let Some(path) = &self.path {
            write(path, &shortcuts)?;
        }
        self.shortcuts = shortcuts;
        Ok(())
    }
}

fn write(path: &Path, shortcuts: &BTreeMap<String, Shortcut>) -> Result<(), self::Error> {
    // Write aside and rename so a crash never leaves half a file behind
    let contents = serde_json::to_vec(shortcuts)?;
    let partial = path.with_extension("partial");
    fs::write(&partial, contents)?;
    fs::rename(&partial, path)?;
    debug!("Wrote {} shortcuts to {}", shortcuts.len(), path.display());
    Ok(())
}

fn load(path: &Path) -> Result<BTreeMap<String, Shortcut>, self::Error> {
    let contents = fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}
