use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::credentials::StoredCredentials;
use crate::error::AuthError;

const CREDENTIALS_DIR_NAME: &str = ".bitcompass";
const CREDENTIALS_FILE_NAME: &str = "token.json";

/// Persistence for the single cached session of this machine.
///
/// Handlers take a `&dyn CredentialStore` instead of touching the file
/// directly, so tests can swap in [`MemoryCredentialStore`].
pub trait CredentialStore: Send + Sync {
    /// Read the persisted record. Missing or unreadable records yield `None`.
    fn load(&self) -> Option<StoredCredentials>;

    /// Overwrite the persisted record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the record cannot be written.
    fn save(&self, creds: &StoredCredentials) -> Result<(), AuthError>;

    /// Delete the persisted record. Deleting a missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if an existing record cannot be removed.
    fn clear(&self) -> Result<(), AuthError>;

    /// Presence check only: `expires_at` is not consulted and the backend
    /// is not contacted.
    fn is_logged_in(&self) -> bool {
        self.load().is_some_and(|creds| creds.has_access_token())
    }
}

/// Default credential file: `~/.bitcompass/token.json`.
///
/// # Errors
///
/// Returns `AuthError::TokenStore` if the home directory cannot be resolved.
pub fn default_credentials_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|home| home.join(CREDENTIALS_DIR_NAME).join(CREDENTIALS_FILE_NAME))
        .ok_or_else(|| {
            AuthError::TokenStore("home directory not found, cannot locate credentials".into())
        })
}

/// JSON file store. Writes go through a temp file in the same directory and
/// an atomic rename, so readers never observe a partial record.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured override, or the default location.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if no override is set and the home
    /// directory cannot be resolved.
    pub fn from_config(config: &bitcompass_config::BitcompassConfig) -> Result<Self, AuthError> {
        match config.credentials_path_override() {
            Some(path) => Ok(Self::new(path)),
            None => default_credentials_path().map(Self::new),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<&Path, AuthError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if parent.is_dir() {
            // Existing directories may be shared; only the file gets locked down.
            return Ok(parent);
        }
        fs::create_dir_all(parent)
            .map_err(|e| AuthError::TokenStore(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
        Ok(parent)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<StoredCredentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %self.path.display(), %error, "credentials unreadable");
                }
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(creds) => Some(creds),
            Err(error) => {
                tracing::debug!(path = %self.path.display(), %error, "credentials unparsable");
                None
            }
        }
    }

    fn save(&self, creds: &StoredCredentials) -> Result<(), AuthError> {
        let parent = self.ensure_parent_dir()?;
        let json = serde_json::to_vec_pretty(creds)
            .map_err(|e| AuthError::TokenStore(format!("serialize credentials: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| AuthError::TokenStore(format!("temp file in {}: {e}", parent.display())))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| AuthError::TokenStore(format!("write temp credentials: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::TokenStore(format!("chmod {}: {e}", tmp.path().display()))
            })?;
        }

        tmp.persist(&self.path).map_err(|e| {
            AuthError::TokenStore(format!("rename into {}: {}", self.path.display(), e.error))
        })?;
        tracing::debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AuthError::TokenStore(format!(
                "failed to delete {}: {error}",
                self.path.display()
            ))),
        }
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credentials(creds: StoredCredentials) -> Self {
        Self {
            record: Mutex::new(Some(creds)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredCredentials> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, creds: &StoredCredentials) -> Result<(), AuthError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(creds.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
