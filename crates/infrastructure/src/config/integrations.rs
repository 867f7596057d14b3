//! Integration configurations: CalDAV server and bridge behaviour.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

// ==============================
// CalDAV Configuration
// ==============================

/// CalDAV calendar server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CalDavAppConfig {
    /// CalDAV server URL (e.g., <https://cal.example.com/dav.php/calendars/resa>)
    #[serde(default = "default_caldav_url")]
    pub server_url: String,

    /// Username for authentication (empty disables basic auth)
    #[serde(default)]
    pub username: String,

    /// Password for authentication (sensitive - uses `SecretString`)
    #[serde(skip_serializing, default = "empty_secret")]
    pub password: SecretString,

    /// Verify TLS certificates (default: false)
    #[serde(default)]
    pub verify_certs: bool,

    /// Connection timeout in seconds (default: 30)
    #[serde(default = "default_caldav_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CalDavAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavAppConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("verify_certs", &self.verify_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for CalDavAppConfig {
    fn default() -> Self {
        Self {
            server_url: default_caldav_url(),
            username: String::new(),
            password: empty_secret(),
            verify_certs: false,
            timeout_secs: default_caldav_timeout(),
        }
    }
}

fn default_caldav_url() -> String {
    "http://localhost:5232".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

const fn default_caldav_timeout() -> u64 {
    30
}

impl CalDavAppConfig {
    /// Convert to `integration_caldav`'s `CalDavConfig`
    #[must_use]
    pub fn to_caldav_config(&self) -> integration_caldav::CalDavConfig {
        integration_caldav::CalDavConfig {
            server_url: self.server_url.clone(),
            username: self.username.clone(),
            password: self.password.expose_secret().to_string(),
            verify_certs: self.verify_certs,
            timeout_secs: self.timeout_secs,
        }
    }
}

// ==============================
// Bridge Configuration
// ==============================

/// Bridge behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeAppConfig {
    /// Prefix of generated event ids
    #[serde(default = "default_event_id_prefix")]
    pub event_id_prefix: String,
}

fn default_event_id_prefix() -> String {
    "jaresa".to_string()
}

impl Default for BridgeAppConfig {
    fn default() -> Self {
        Self {
            event_id_prefix: default_event_id_prefix(),
        }
    }
}

impl BridgeAppConfig {
    /// Check that generated ids stay plain resource names
    ///
    /// The prefix must be non-empty ASCII letters, digits, `-` or `_`.
    pub fn validate(&self) -> Result<(), String> {
        let prefix = &self.event_id_prefix;
        if prefix.is_empty()
            || !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "bridge.event_id_prefix {prefix:?} must only contain ASCII letters, digits, '-' or '_'"
            ));
        }
        Ok(())
    }

    /// Convert to the service settings
    #[must_use]
    pub fn to_settings(&self) -> application::services::BridgeSettings {
        application::services::BridgeSettings {
            event_id_prefix: self.event_id_prefix.clone(),
        }
    }
}
