//! Local flag remembering which user last logged in on this machine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const USERNAME_FILE: &str = "username";

enum Backing {
    File(PathBuf),
    Memory(Mutex<Option<String>>),
}

/// Username persistence, the only data the dashboard keeps between runs
pub struct LocalStore {
    backing: Backing,
}

impl LocalStore {
    /// Store the flag as `<state_dir>/username`
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        Self {
            backing: Backing::File(state_dir.as_ref().join(USERNAME_FILE)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backing: Backing::Memory(Mutex::new(None)),
        }
    }

    pub fn load_username(&self) -> Option<String> {
        match &self.backing {
            Backing::File(path) => fs::read_to_string(path)
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|name| !name.is_empty()),
            Backing::Memory(slot) => slot.lock().ok().and_then(|slot| slot.clone()),
        }
    }

    pub fn save_username(&self, username: &str) -> io::Result<()> {
        match &self.backing {
            Backing::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, username)
            }
            Backing::Memory(slot) => {
                let mut slot = slot
                    .lock()
                    .map_err(|_| io::Error::other("username store poisoned"))?;
                *slot = Some(username.to_string());
                Ok(())
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match &self.backing {
            Backing::File(path) => match fs::remove_file(path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            Backing::Memory(slot) => {
                let mut slot = slot
                    .lock()
                    .map_err(|_| io::Error::other("username store poisoned"))?;
                *slot = None;
                Ok(())
            }
        }
    }
}
