use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::constants::APP_CONFIG_DIR;
use crate::error::{RelocateError, RelocateResult};

/// Credentials file structure
///
/// Format:
/// ```toml
/// [mysql.profile_name]
/// password = "your_mysql_password_here"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub mysql: HashMap<String, CredentialProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialProfile {
    pub password: String,
}

/// Get the default credentials file path: ~/.config/audino_relocate/credentials.toml
pub fn get_credentials_path() -> RelocateResult<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| RelocateError::Config("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(APP_CONFIG_DIR)
        .join("credentials.toml"))
}

/// Parse credentials from TOML text
pub fn parse_credentials(content: &str) -> RelocateResult<Credentials> {
    toml::from_str(content)
        .map_err(|e| RelocateError::Config(format!("Failed to parse credentials file: {}", e)))
}

/// Load credentials from the default location
/// Returns None if the file doesn't exist
pub fn load_credentials() -> RelocateResult<Option<Credentials>> {
    let creds_path = get_credentials_path()?;

    if !creds_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&creds_path)?;
    parse_credentials(&content).map(Some)
}

/// Get the MySQL password for a credential profile
pub fn get_password(credentials: &Option<Credentials>, profile: &str) -> RelocateResult<String> {
    match credentials {
        Some(creds) => creds
            .mysql
            .get(profile)
            .map(|p| p.password.clone())
            .ok_or_else(|| {
                RelocateError::Config(format!(
                    "Credential profile '[mysql.{}]' not found in credentials file",
                    profile
                ))
            }),
        None => Err(RelocateError::Config(format!(
            "Credentials file not found. Expected at: {}",
            get_credentials_path()?.display()
        ))),
    }
}
