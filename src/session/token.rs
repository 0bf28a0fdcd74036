//! Persistence for the bearer token.
//!
//! A store holds exactly one value under the fixed key [`TOKEN_KEY`]. Stores do
//! not validate or expire tokens; validity is decided by the backend. Reads
//! are fail-closed: a store that cannot be read reports no token.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &SecretString) -> io::Result<()>;

    /// Current token, or `None` when absent or unreadable.
    fn read(&self) -> Option<SecretString>;

    /// Remove the token. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be updated.
    fn clear(&self) -> io::Result<()>;
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(SecretString::from(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &SecretString) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn read(&self) -> Option<SecretString> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.expose_secret().is_empty())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON key-value file; keys other than [`TOKEN_KEY`] are left untouched.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "session file is not a JSON object",
            )),
        }
    }

    fn store(&self, map: &Map<String, Value>) -> io::Result<()> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = open_private(&tmp)?;
            file.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &SecretString) -> io::Result<()> {
        let mut map = self.load().unwrap_or_else(|err| {
            warn!("discarding unreadable session file {}: {err}", self.path.display());
            Map::new()
        });
        map.insert(
            TOKEN_KEY.to_string(),
            Value::String(token.expose_secret().to_string()),
        );
        self.store(&map)?;
        debug!("token saved to {}", self.path.display());
        Ok(())
    }

    fn read(&self) -> Option<SecretString> {
        match self.load() {
            Ok(map) => map
                .get(TOKEN_KEY)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(|token| SecretString::from(token.to_string())),
            Err(err) => {
                warn!("ignoring unreadable session file {}: {err}", self.path.display());
                None
            }
        }
    }

    fn clear(&self) -> io::Result<()> {
        match self.load() {
            Ok(mut map) => {
                if map.remove(TOKEN_KEY).is_some() {
                    self.store(&map)?;
                    debug!("token removed from {}", self.path.display());
                }
                Ok(())
            }
            // A corrupt file may still hold a token; drop it entirely.
            Err(_) => match fs::remove_file(&self.path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            },
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
