// session/src/credentials.rs

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use models::{HmsError, HmsResult};

/// Email/password pair left behind by a "remember me" login.
///
/// The values are written in clear text, matching what the original web
/// client kept in browser storage. Anyone with file access can read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RememberedCredentials {
    #[serde(rename = "hms_remembered_email")]
    pub email: String,
    #[serde(rename = "hms_remembered_password")]
    pub password: String,
}

/// Two named string slots in a JSON file under the user's configuration
/// directory; read once at application start, written or cleared on every
/// login depending on the "remember me" toggle.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn open_default() -> HmsResult<Self> {
        let dir = dirs::config_dir().ok_or_else(|| {
            HmsError::Storage("No user configuration directory available".to_string())
        })?;
        Ok(Self::at(dir.join("hms-admin").join("credentials.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        CredentialStore { path }
    }

    /// `None` when no slots have been written; a corrupt file is a
    /// `Storage` error.
    pub fn load(&self) -> HmsResult<Option<RememberedCredentials>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(HmsError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    err
                )));
            }
        };
        let slots: RememberedCredentials = serde_json::from_str(&raw).map_err(|e| {
            HmsError::Storage(format!("Unreadable slots in {}: {}", self.path.display(), e))
        })?;
        Ok(Some(slots))
    }

    pub fn save(&self, credentials: &RememberedCredentials) -> HmsResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HmsError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let raw = serde_json::to_string_pretty(credentials)
            .map_err(|e| HmsError::Storage(format!("Failed to encode slots: {}", e)))?;
        fs::write(&self.path, raw).map_err(|e| {
            HmsError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    pub fn clear(&self) -> HmsResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(HmsError::Storage(format!(
                "Failed to clear {}: {}",
                self.path.display(),
                err
            ))),
        }
    }
}
