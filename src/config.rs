//! Gate and server configuration.
//!
//! [`GateConfig`] is built programmatically by the embedding application and
//! captured by the gate for its whole lifetime. [`ServerConfig`] is the demo
//! server's environment-driven configuration, loaded with the `envy` crate and
//! converted into a [`GateConfig`].

use std::{collections::HashSet, fmt, sync::Arc};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    cookie::{SameSite, is_valid_cookie_name},
    session_id::{IdGenerator, UuidGenerator},
    token::{JwtCodec, TokenCodec},
};

/// Cookie name used when none is configured.
pub const DEFAULT_TOKEN_NAME: &str = "x-token";

/// Body returned on denial when none is configured.
pub fn default_denial() -> Value {
    json!({ "error": true, "message": "Permission Denied." })
}

/// Configuration captured by an access gate.
///
/// Optional fields get their defaults here, at construction, so the request
/// path never has to fall back on anything.
#[derive(Clone)]
pub struct GateConfig {
    /// Allowed origins. `None` means no origin is allowed.
    pub(crate) origins: Option<HashSet<String>>,
    pub(crate) api_key: String,
    pub(crate) token_name: String,
    pub(crate) same_site: SameSite,
    pub(crate) on_error: Value,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) codec: Arc<dyn TokenCodec>,
}

impl GateConfig {
    /// Create a configuration with the required API key and signing secret.
    ///
    /// No origins are allowed until [`GateConfig::origins`] is called.
    pub fn new(api_key: impl Into<String>, token_secret: &str) -> Self {
        Self {
            origins: None,
            api_key: api_key.into(),
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            same_site: SameSite::default(),
            on_error: default_denial(),
            ids: Arc::new(UuidGenerator),
            codec: Arc::new(JwtCodec::new(token_secret)),
        }
    }

    /// Set the allowed origins.
    #[must_use]
    pub fn origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    /// Set the session cookie name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TokenName` if `name` is not a valid cookie name
    /// (empty, or containing spaces, `;`, `=` or other separators).
    pub fn token_name(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if !is_valid_cookie_name(&name) {
            return Err(ConfigError::TokenName(name));
        }
        self.token_name = name;
        Ok(self)
    }

    /// Set the cookie `SameSite` policy.
    #[must_use]
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set the body returned on every denial.
    #[must_use]
    pub fn on_error(mut self, body: Value) -> Self {
        self.on_error = body;
        self
    }

    /// Replace the session identifier source.
    #[must_use]
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the token codec. The codec is then responsible for the secret.
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn TokenCodec>) -> Self {
        self.codec = codec;
        self
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("origins", &self.origins)
            .field("api_key", &"<redacted>")
            .field("token_name", &self.token_name)
            .field("same_site", &self.same_site)
            .field("on_error", &self.on_error)
            .finish_non_exhaustive()
    }
}

/// Errors building a gate configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid cookie name: {0:?}")]
    TokenName(String),

    #[error("ON_ERROR is not valid JSON: {0}")]
    OnError(#[from] serde_json::Error),
}

/// Demo server configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `API_KEY` (required): key callers must send in `x-api-key`
/// - `TOKEN_SECRET` (required): secret used to sign session tokens
/// - `ALLOWED_ORIGINS` (optional): comma-separated origins; unset denies every request
/// - `TOKEN_NAME` (optional): session cookie name, defaults to `x-token`
/// - `SAME_SITE` (optional): `none`, `lax` or `strict`, defaults to `none`
/// - `ON_ERROR` (optional): JSON body returned on denial
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    pub api_key: String,

    pub token_secret: String,

    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,

    #[serde(default)]
    pub token_name: Option<String>,

    #[serde(default)]
    pub same_site: Option<SameSite>,

    #[serde(default)]
    pub on_error: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(envy::from_env::<ServerConfig>()?)
    }

    /// Build the gate configuration these values describe.
    pub fn gate_config(&self) -> Result<GateConfig, ConfigError> {
        let mut config = GateConfig::new(self.api_key.clone(), &self.token_secret);

        if let Some(origins) = &self.allowed_origins {
            config = config.origins(
                origins
                    .iter()
                    .map(|o| o.trim())
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(name) = &self.token_name {
            config = config.token_name(name.clone())?;
        }
        if let Some(same_site) = self.same_site {
            config = config.same_site(same_site);
        }
        if let Some(body) = &self.on_error {
            config = config.on_error(serde_json::from_str(body)?);
        }

        Ok(config)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("allowed_origins", &self.allowed_origins)
            .field("token_name", &self.token_name)
            .field("same_site", &self.same_site)
            .field("server_port", &self.server_port)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_config() -> ServerConfig {
        ServerConfig {
            api_key: "K".to_string(),
            token_secret: "S".to_string(),
            allowed_origins: None,
            token_name: None,
            same_site: None,
            on_error: None,
            server_port: 3000,
        }
    }

    #[test]
    fn defaults_applied_at_construction() {
        let config = GateConfig::new("K", "S");

        assert!(config.origins.is_none());
        assert_eq!(config.token_name, "x-token");
        assert_eq!(config.same_site, SameSite::None);
        assert_eq!(
            config.on_error,
            json!({ "error": true, "message": "Permission Denied." })
        );
    }

    #[test]
    fn overrides_are_independent() {
        let config = GateConfig::new("K", "S").same_site(SameSite::Strict);
        assert_eq!(config.token_name, "x-token");
        assert_eq!(config.same_site, SameSite::Strict);

        let config = GateConfig::new("K", "S").token_name("session").unwrap();
        assert_eq!(config.token_name, "session");
        assert_eq!(config.same_site, SameSite::None);
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", GateConfig::new("super-secret-key", "S"));
        assert!(!rendered.contains("super-secret-key"));
    }

    #[test]
    fn env_values_become_gate_config() {
        let mut env = server_config();
        env.allowed_origins = Some(vec![" https://a.com".to_string(), String::new()]);
        env.token_name = Some("session".to_string());
        env.same_site = Some(SameSite::Lax);
        env.on_error = Some(r#"{"denied":true}"#.to_string());

        let config = env.gate_config().unwrap();

        let origins = config.origins.unwrap();
        assert_eq!(origins.len(), 1);
        assert!(origins.contains("https://a.com"));
        assert_eq!(config.token_name, "session");
        assert_eq!(config.same_site, SameSite::Lax);
        assert_eq!(config.on_error, json!({ "denied": true }));
    }

    #[test]
    fn missing_origins_stay_absent() {
        let config = server_config().gate_config().unwrap();
        assert!(config.origins.is_none());
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let mut env = server_config();
        env.on_error = Some("{not json".to_string());
        assert!(matches!(env.gate_config(), Err(ConfigError::OnError(_))));

        let mut env = server_config();
        env.token_name = Some("a; Domain=x".to_string());
        assert!(matches!(env.gate_config(), Err(ConfigError::TokenName(_))));
    }

    #[test]
    fn cookie_names_with_separators_are_rejected() {
        for name in ["a; Domain=x", "my token", "x; Domain=evil.com; Path", ""] {
            let err = GateConfig::new("K", "S").token_name(name).unwrap_err();
            assert!(matches!(err, ConfigError::TokenName(ref n) if n == name), "{name:?}");
        }
    }

    fn env_vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        [("API_KEY", "K"), ("TOKEN_SECRET", "S")]
            .iter()
            .chain(extra)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn same_site_is_read_from_environment() {
        let env: ServerConfig = envy::from_iter(env_vars(&[("SAME_SITE", "Strict")])).unwrap();
        assert_eq!(env.same_site, Some(SameSite::Strict));
        assert_eq!(env.server_port, 3000);

        let err = envy::from_iter::<_, ServerConfig>(env_vars(&[("SAME_SITE", "sometimes")]));
        assert!(err.is_err());
    }
}
