use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_MYSQL_PORT;
use crate::credentials::{self, Credentials};
use crate::error::{RelocateError, RelocateResult};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    /// Relocation configuration
    Relocate,
}

/// How transcript statuses are matched to data rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinMode {
    /// Match a transcript to the data row whose id equals its data_id
    #[default]
    Keyed,
    /// Match a transcript to the data row at offset `data_id - 1` in read order
    ///
    /// Only correct when data ids are dense and start at 1. Kept for reruns
    /// that must reproduce earlier migrations exactly.
    Positional,
}

/// How the relocation updates are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMode {
    /// Commit after every UPDATE; a failure leaves earlier updates applied
    #[default]
    PerStatement,
    /// Run all updates inside one transaction; a failure rolls everything back
    Transaction,
}

fn default_mysql_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

/// Relocation configuration file structure
#[derive(Debug, Deserialize)]
pub struct RelocateConfig {
    /// Configuration type (must be "relocate")
    pub config_type: ConfigType,
    /// Database to connect to (maps to [database] section in TOML)
    pub database: DatabaseConfig,
    /// Who to move records from and to (maps to [relocation] section in TOML)
    #[serde(default)]
    pub relocation: RelocationConfig,
}

/// Database section, selected by its `backend` key
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Live Audino MySQL database
    Mysql(MysqlConfig),
    /// Local SQLite copy of the Audino tables
    Sqlite {
        /// Path to the SQLite database file
        path: PathBuf,
    },
}

/// MySQL connection settings as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct MysqlConfig {
    /// MySQL server hostname or IP address
    pub host: String,
    /// MySQL server port (default: 3306)
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    /// MySQL user name
    pub user: String,
    /// Database (schema) name
    pub database: String,
    /// Inline password; prefer `credential_profile`
    pub password: Option<String>,
    /// Credential profile name to look up password from ~/.config/audino_relocate/credentials.toml
    pub credential_profile: Option<String>,
}

/// Fully resolved MySQL connection parameters
#[derive(Clone, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// Relocation section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelocationConfig {
    /// Usernames whose records are moved away
    #[serde(default)]
    pub from_users: Vec<String>,
    /// Username that receives the records
    pub to_user: Option<String>,
    /// Transcript join mode (default: keyed)
    pub join_mode: Option<JoinMode>,
    /// Commit mode for the updates (default: per-statement)
    pub commit_mode: Option<CommitMode>,
    /// Only consider data rows of this project
    pub project_id: Option<i64>,
}

impl MysqlConfig {
    /// Resolve the password, reading the credentials file only when a profile is named
    pub fn resolve(&self) -> RelocateResult<ConnectionConfig> {
        let credentials = match (&self.password, &self.credential_profile) {
            (Some(_), _) => None,
            (None, Some(_)) => credentials::load_credentials()?,
            (None, None) => {
                return Err(RelocateError::Config(
                    "[database] needs either password or credential_profile".to_string(),
                ))
            }
        };
        self.resolve_with(&credentials)
    }

    /// Resolve the password against already loaded credentials
    pub fn resolve_with(&self, credentials: &Option<Credentials>) -> RelocateResult<ConnectionConfig> {
        let password = match (&self.password, &self.credential_profile) {
            (Some(password), _) => password.clone(),
            (None, Some(profile)) => credentials::get_password(credentials, profile)?,
            (None, None) => {
                return Err(RelocateError::Config(
                    "[database] needs either password or credential_profile".to_string(),
                ))
            }
        };

        Ok(ConnectionConfig {
            host: self.host.clone(),
            user: self.user.clone(),
            password,
            database: self.database.clone(),
            port: self.port,
        })
    }
}

impl RelocationConfig {
    /// Validate the relocation section
    ///
    /// At least one source user and a target user are required, and the
    /// target must not also be a source.
    pub fn validate(&self) -> RelocateResult<()> {
        if self.from_users.is_empty() {
            return Err(RelocateError::Config(
                "relocation needs at least one source user (from_users or --from)".to_string(),
            ));
        }

        let target = match self.to_user.as_deref() {
            Some(target) if !target.is_empty() => target,
            _ => {
                return Err(RelocateError::Config(
                    "relocation needs a target user (to_user or --to)".to_string(),
                ))
            }
        };

        if self.from_users.iter().any(|u| u == target) {
            return Err(RelocateError::Config(format!(
                "target user '{}' is also listed as a source user",
                target
            )));
        }

        if self.project_id.is_some() && self.join_mode() == JoinMode::Positional {
            return Err(RelocateError::Config(
                "positional join needs the whole data table; drop project_id or use keyed join"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn join_mode(&self) -> JoinMode {
        self.join_mode.unwrap_or_default()
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode.unwrap_or_default()
    }
}

/// Parse a relocation config from TOML text
pub fn parse_config(content: &str) -> RelocateResult<RelocateConfig> {
    toml::from_str(content).map_err(|e| RelocateError::Config(e.to_string()))
}

/// Load a relocation config file
pub fn load_config(path: &Path) -> RelocateResult<RelocateConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RelocateError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    toml::from_str(&content).map_err(|e| {
        RelocateError::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYSQL_CONFIG: &str = r#"
config_type = "relocate"

[database]
backend = "mysql"
host = "172.18.0.2"
user = "audino"
database = "audino"
credential_profile = "audino"

[relocation]
from_users = ["alice", "carol"]
to_user = "bob"
commit_mode = "transaction"
"#;

    #[test]
    fn test_parse_mysql_config() {
        let config = parse_config(MYSQL_CONFIG).unwrap();
        assert_eq!(config.config_type, ConfigType::Relocate);

        match &config.database {
            DatabaseConfig::Mysql(mysql) => {
                assert_eq!(mysql.host, "172.18.0.2");
                assert_eq!(mysql.port, 3306);
                assert_eq!(mysql.credential_profile.as_deref(), Some("audino"));
            }
            other => panic!("expected mysql backend, got {:?}", other),
        }

        assert_eq!(config.relocation.from_users, vec!["alice", "carol"]);
        assert_eq!(config.relocation.join_mode(), JoinMode::Keyed);
        assert_eq!(config.relocation.commit_mode(), CommitMode::Transaction);
        config.relocation.validate().unwrap();
    }

    #[test]
    fn test_parse_sqlite_config_without_relocation() {
        let config = parse_config(
            r#"
config_type = "relocate"

[database]
backend = "sqlite"
path = "/tmp/audino.sqlite"
"#,
        )
        .unwrap();

        match config.database {
            DatabaseConfig::Sqlite { path } => assert_eq!(path, PathBuf::from("/tmp/audino.sqlite")),
            other => panic!("expected sqlite backend, got {:?}", other),
        }
        assert!(config.relocation.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_target_in_sources() {
        let relocation = RelocationConfig {
            from_users: vec!["alice".to_string(), "bob".to_string()],
            to_user: Some("bob".to_string()),
            ..Default::default()
        };
        let err = relocation.validate().unwrap_err();
        assert!(err.to_string().contains("also listed as a source"));
    }

    #[test]
    fn test_validate_rejects_positional_with_project() {
        let relocation = RelocationConfig {
            from_users: vec!["alice".to_string()],
            to_user: Some("bob".to_string()),
            join_mode: Some(JoinMode::Positional),
            project_id: Some(10),
            ..Default::default()
        };
        assert!(relocation.validate().is_err());
    }

    #[test]
    fn test_validate_requires_target() {
        let relocation = RelocationConfig {
            from_users: vec!["alice".to_string()],
            ..Default::default()
        };
        assert!(relocation.validate().is_err());
    }

    #[test]
    fn test_resolve_inline_password() {
        let mysql = MysqlConfig {
            host: "localhost".to_string(),
            port: 3307,
            user: "audino".to_string(),
            database: "audino".to_string(),
            password: Some("pw".to_string()),
            credential_profile: None,
        };
        let conn = mysql.resolve_with(&None).unwrap();
        assert_eq!(conn.password, "pw");
        assert_eq!(conn.port, 3307);
        assert!(!format!("{:?}", conn).contains("pw\""));
    }

    #[test]
    fn test_resolve_from_credentials() {
        let creds = credentials::parse_credentials("[mysql.audino]\npassword = \"from-file\"\n").unwrap();
        let mysql = MysqlConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "audino".to_string(),
            database: "audino".to_string(),
            password: None,
            credential_profile: Some("audino".to_string()),
        };
        let conn = mysql.resolve_with(&Some(creds)).unwrap();
        assert_eq!(conn.password, "from-file");
    }

    #[test]
    fn test_unknown_join_mode_rejected() {
        let err = parse_config(
            r#"
config_type = "relocate"

[database]
backend = "sqlite"
path = "a.sqlite"

[relocation]
join_mode = "fuzzy"
"#,
        );
        assert!(err.is_err());
    }
}
