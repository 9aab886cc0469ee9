use std::path::Path;

use serde::Deserialize;

use crate::connect::Credentials;

/// Top-level settings document.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// `PostgreSQL` connection parameters.
    pub postgres: PostgresSettings,
}

/// Connection parameters as written in the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role to authenticate as.
    pub user: String,
    /// Password for the role.
    pub password: String,
    /// Database to open; the server default applies when omitted.
    #[serde(default)]
    pub dbname: String,
    /// TLS mode, `disable` when omitted.
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
}

fn default_sslmode() -> String {
    "disable".to_string()
}

impl Settings {
    /// Parse a settings document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid settings JSON: {e}"))
    }

    /// Load settings from `path`, or from a `config.json` inside it when
    /// `path` names a directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let file = if path.is_dir() {
            path.join("config.json")
        } else {
            path.to_path_buf()
        };
        let contents = std::fs::read_to_string(&file)
            .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
        Self::from_json(&contents)
    }
}

impl PostgresSettings {
    /// Split into the credentials and the ssl mode the connection string
    /// needs.
    pub fn into_connection_parts(self) -> (Credentials, String) {
        let sslmode = self.sslmode;
        (
            Credentials {
                host: self.host,
                port: self.port,
                user: self.user,
                password: self.password,
                dbname: self.dbname,
            },
            sslmode,
        )
    }
}
