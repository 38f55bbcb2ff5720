use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Default cap on serialized request bodies (32 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

/// Default `User-Agent` sent to both roles
pub const DEFAULT_USER_AGENT: &str = "zonesync";

/// Connection settings for one server role
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RoleConfig {
    /// Base URL of the server's HTTP API, e.g. `http://nslord:8081/api/v1/servers/localhost`
    pub base_url: String,

    /// Value of the `X-API-Key` header
    pub api_token: String,
}

impl fmt::Debug for RoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl RoleConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }

    fn validate(&self, role: &str) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                role: role.to_string(),
                url: self.base_url.clone(),
            });
        }
        if self.api_token.is_empty() {
            return Err(ConfigError::Missing(format!("{} API token", role)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Editable primary the zones are written to and read from
    pub editor: RoleConfig,

    /// Serving primary that propagates zones to secondaries
    pub publisher: RoleConfig,

    /// Largest serialized request body, in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// NS records placed at the apex of newly created zones
    #[serde(default)]
    pub default_nameservers: Vec<String>,

    /// Addresses the publisher transfers zones from
    #[serde(default)]
    pub publisher_masters: Vec<String>,
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl SyncConfig {
    pub fn new(editor: RoleConfig, publisher: RoleConfig) -> Self {
        Self {
            editor,
            publisher,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: default_user_agent(),
            default_nameservers: vec![],
            publisher_masters: vec![],
        }
    }

    /// Create a SyncConfig from environment variables
    /// Returns Err if a required variable is missing or any value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let editor = RoleConfig::new(
            required("ZONESYNC_EDITOR_API")?,
            required("ZONESYNC_EDITOR_API_TOKEN")?,
        );
        let publisher = RoleConfig::new(
            required("ZONESYNC_PUBLISHER_API")?,
            required("ZONESYNC_PUBLISHER_API_TOKEN")?,
        );

        let mut config = Self::new(editor, publisher);

        if let Some(max_body_size) = lookup("ZONESYNC_MAX_BODY_SIZE") {
            config.max_body_size = max_body_size
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidBodySize(max_body_size.clone()))?;
        }

        if let Some(user_agent) = lookup("ZONESYNC_USER_AGENT") {
            if !user_agent.is_empty() {
                config.user_agent = user_agent;
            }
        }

        if let Some(nameservers) = lookup("ZONESYNC_DEFAULT_NS") {
            config.default_nameservers = parse_list(&nameservers);
        }

        if let Some(masters) = lookup("ZONESYNC_PUBLISHER_MASTERS") {
            config.publisher_masters = parse_list(&masters);
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document with `[editor]` and `[publisher]` tables
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.editor.validate("editor")?;
        self.publisher.validate("publisher")?;

        if self.max_body_size == 0 {
            return Err(ConfigError::InvalidBodySize(
                "Maximum body size must be greater than 0".to_string(),
            ));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Missing("user agent".to_string()));
        }

        // A request must never reach one role with the other's credential
        if self.editor == self.publisher {
            return Err(ConfigError::ConflatedRoles);
        }

        Ok(())
    }
}

/// Split a comma separated list, dropping empty entries
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
