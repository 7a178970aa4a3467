//! Server and hook configuration.

use std::env;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ScmError;
use crate::models::Token;

/// Environment variable naming the servers file.
pub const ENV_SERVERS_CONFIG: &str = "GITLAB_SERVERS_CONFIG";

/// Environment variable with the automation server's public root URL.
pub const ENV_ROOT_URL: &str = "HOOKS_ROOT_URL";

/// Servers file used when [`ENV_SERVERS_CONFIG`] is unset.
pub const DEFAULT_SERVERS_FILE: &str = "gitlab-servers.toml";

/// A configured GitLab server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name navigators and sources refer to the server by.
    pub name: String,
    /// Server URL, e.g. `https://gitlab.com`.
    pub server_url: String,
    /// Whether system-managed hook registration is allowed on this server.
    pub manage_hooks: bool,
    /// Credential used for system-managed registration.
    pub credentials: Option<Token>,
}

/// Lookup of server configuration by name.
pub trait ServerDirectory: Send + Sync {
    fn find_server(&self, name: &str) -> Option<ServerConfig>;
}

impl ServerDirectory for Vec<ServerConfig> {
    fn find_server(&self, name: &str) -> Option<ServerConfig> {
        self.iter().find(|s| s.name == name).cloned()
    }
}

/// `[[servers]]` entry of the servers file.
#[derive(Debug, Clone, Deserialize)]
struct ServerEntry {
    name: String,
    server_url: String,
    #[serde(default)]
    manage_hooks: bool,
    #[serde(default)]
    token: Option<String>,
    /// Environment variable holding the token, preferred over `token`.
    #[serde(default)]
    token_env: Option<String>,
}

impl ServerEntry {
    fn into_config(self) -> ServerConfig {
        let from_env = self.token_env.as_deref().and_then(|var| {
            let value = env::var(var).ok().filter(|v| !v.is_empty());
            if value.is_none() {
                warn!(server = %self.name, env = %var, "Token environment variable is not set");
            }
            value
        });

        ServerConfig {
            credentials: from_env.or(self.token).map(Token::new),
            name: self.name,
            server_url: self.server_url,
            manage_hooks: self.manage_hooks,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServersDocument {
    #[serde(default)]
    servers: Vec<ServerEntry>,
}

/// Servers loaded from a TOML file.
///
/// ```toml
/// [[servers]]
/// name = "gitlab"
/// server_url = "https://gitlab.com"
/// manage_hooks = true
/// token_env = "GITLAB_TOKEN"
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServersFile {
    servers: Vec<ServerConfig>,
}

impl ServersFile {
    /// Parse a servers document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML, or names the same
    /// server twice.
    pub fn parse(contents: &str) -> Result<Self, ScmError> {
        let doc: ServersDocument =
            toml::from_str(contents).map_err(|e| ScmError::Config(e.to_string()))?;

        let mut servers: Vec<ServerConfig> = Vec::with_capacity(doc.servers.len());
        for entry in doc.servers {
            if servers.iter().any(|s| s.name == entry.name) {
                return Err(ScmError::Config(format!(
                    "server '{}' is defined more than once",
                    entry.name
                )));
            }
            servers.push(entry.into_config());
        }

        debug!(count = servers.len(), "Loaded GitLab servers");
        Ok(Self { servers })
    }

    /// Load a servers file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScmError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScmError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&contents)
    }

    /// Path from [`ENV_SERVERS_CONFIG`], falling back to [`DEFAULT_SERVERS_FILE`].
    #[must_use]
    pub fn default_path() -> String {
        env::var(ENV_SERVERS_CONFIG)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVERS_FILE.to_string())
    }

    #[must_use]
    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }
}

impl ServerDirectory for ServersFile {
    fn find_server(&self, name: &str) -> Option<ServerConfig> {
        self.servers.find_server(name)
    }
}

/// Settings of the automation server the hooks point at.
#[derive(Debug, Clone)]
pub struct HooksConfig {
    /// Public root URL of the automation server; empty when unknown.
    pub root_url: String,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            root_url: env::var(ENV_ROOT_URL).unwrap_or_default(),
        }
    }
}
