//! Configuration for srm-bridge.
//!
//! TOML file plus `SRM_`-prefixed environment, password resolution
//! (env, keyring, plaintext), and translation to `srm_core::BridgeConfig`.
//! The binary layers its command-line overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use srm_core::{BridgeConfig, RetryPolicy, TlsVerification};

/// Keyring service name for stored router passwords.
pub const KEYRING_SERVICE: &str = "srm-bridge";

/// Environment variable checked first for the router password.
pub const PASSWORD_ENV: &str = "SRM_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for {username}@{host}")]
    NoCredentials { username: String, host: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub defaults: Defaults,
}

/// How to reach and log in to the router.
#[derive(Debug, Deserialize, Serialize)]
pub struct RouterSection {
    /// Router IPv4 address.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password (prefer keyring or `SRM_PASSWORD`).
    pub password: Option<String>,

    /// Path to a CA certificate for the router's TLS certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept the router's self-signed certificate.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Login timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: None,
            ca_cert: None,
            insecure: default_insecure(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "192.168.1.1".into()
}
fn default_port() -> u16 {
    8001
}
fn default_username() -> String {
    "admin".into()
}
fn default_insecure() -> bool {
    true
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_request_timeout() -> u64 {
    30
}

/// Poll pacing and reconnect behavior. Durations in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default = "default_interval")]
    pub interval: u64,

    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u64,

    #[serde(default = "default_write_settle")]
    pub write_settle: u64,

    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            reconnect_delay: default_reconnect_delay(),
            write_settle: default_write_settle(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

fn default_interval() -> u64 {
    60
}
fn default_reconnect_delay() -> u64 {
    60
}
fn default_write_settle() -> u64 {
    3
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Output format for `snapshot`.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "srm-bridge", "srm-bridge").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("srm-bridge");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from file + environment.
///
/// With `path` the file must exist; otherwise the platform config path is
/// used and may be absent. `SRM_ROUTER__HOST=10.0.0.1` sets `router.host`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound { path: p.to_owned() });
        }
        Some(p) => p.to_owned(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading config");

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("SRM_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_account(router: &RouterSection) -> String {
    format!("{}@{}", router.username, router.host)
}

/// Resolve the router password: `SRM_PASSWORD`, then the system keyring,
/// then plaintext in the config.
pub fn resolve_password(router: &RouterSection) -> Result<SecretString, ConfigError> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(router)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = router.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        username: router.username.clone(),
        host: router.host.clone(),
    })
}

/// Store the router password in the system keyring.
pub fn store_password(router: &RouterSection, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(router))?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

fn tls_from(router: &RouterSection) -> TlsVerification {
    if let Some(ref ca) = router.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else if router.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `BridgeConfig` from `cfg` with the given password.
///
/// Address validation and the interval floor are left to
/// `BridgeConfig::validated`.
pub fn bridge_config_with(cfg: &Config, password: SecretString) -> Result<BridgeConfig, ConfigError> {
    let router = &cfg.router;
    if router.port == 0 {
        return Err(ConfigError::Validation {
            field: "router.port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }
    if router.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation {
            field: "router.connect_timeout_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    Ok(BridgeConfig {
        host: router.host.clone(),
        port: router.port,
        username: router.username.clone(),
        password,
        tls: tls_from(router),
        interval: Duration::from_secs(cfg.polling.interval),
        connect_timeout: Duration::from_millis(router.connect_timeout_ms),
        request_timeout: Duration::from_secs(router.request_timeout),
        reconnect_delay: Duration::from_secs(cfg.polling.reconnect_delay),
        write_settle: Duration::from_secs(cfg.polling.write_settle),
        retry_policy: cfg.polling.retry_policy,
    })
}

/// Resolve the password and build a `BridgeConfig`.
pub fn to_bridge_config(cfg: &Config) -> Result<BridgeConfig, ConfigError> {
    let password = resolve_password(&cfg.router)?;
    bridge_config_with(cfg, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_bridge_defaults() {
        let cfg = Config::default();
        let bridge = bridge_config_with(&cfg, SecretString::from("pw")).unwrap();
        let expected = BridgeConfig::default();
        assert_eq!(bridge.host, expected.host);
        assert_eq!(bridge.port, expected.port);
        assert_eq!(bridge.username, expected.username);
        assert_eq!(bridge.interval, expected.interval);
        assert_eq!(bridge.connect_timeout, expected.connect_timeout);
        assert_eq!(bridge.reconnect_delay, expected.reconnect_delay);
        assert_eq!(bridge.write_settle, expected.write_settle);
        assert_eq!(bridge.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [router]
            host = "10.0.0.1"
            username = "ops"
            password = "hunter2"

            [polling]
            interval = 300
            retry_policy = "transient"
            "#,
        );

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.router.host, "10.0.0.1");
        assert_eq!(cfg.router.port, 8001);
        assert_eq!(cfg.polling.interval, 300);
        assert_eq!(cfg.polling.retry_policy, RetryPolicy::Transient);
        assert_eq!(cfg.defaults.output, "table");

        let bridge = bridge_config_with(&cfg, SecretString::from("x")).unwrap();
        assert_eq!(bridge.interval, Duration::from_secs(300));
        assert_eq!(bridge.username, "ops");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn bad_value_is_reported() {
        let file = write_config("[router]\nport = \"eighty\"\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.router.host = "192.168.50.1".into();
        cfg.polling.write_settle = 5;

        save_config(&cfg, &path).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.router.host, "192.168.50.1");
        assert_eq!(loaded.polling.write_settle, 5);
    }

    #[test]
    fn tls_mode_selection() {
        let mut router = RouterSection::default();
        assert_eq!(tls_from(&router), TlsVerification::DangerAcceptInvalid);

        router.insecure = false;
        assert_eq!(tls_from(&router), TlsVerification::SystemDefaults);

        router.ca_cert = Some(PathBuf::from("/etc/srm/ca.pem"));
        assert_eq!(
            tls_from(&router),
            TlsVerification::CustomCa(PathBuf::from("/etc/srm/ca.pem"))
        );
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = Config::default();
        cfg.router.port = 0;
        let err = bridge_config_with(&cfg, SecretString::from("x")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "router.port"));
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        if std::env::var(PASSWORD_ENV).is_ok() {
            return;
        }
        let router = RouterSection {
            host: "203.0.113.254".into(),
            username: "srm-bridge-test".into(),
            password: Some("from-file".into()),
            ..RouterSection::default()
        };
        let secret = resolve_password(&router).unwrap();
        assert_eq!(secret.expose_secret(), "from-file");
    }
}
