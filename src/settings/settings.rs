use crate::application_impl::MIN_SIGNING_KEY_LEN;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub token: Token,
    pub store: Store,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    /// Serve TLS when both paths are set.
    #[serde(default)]
    pub cert_path: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

impl Http {
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Token {
    /// Raw HMAC key bytes, at least `MIN_SIGNING_KEY_LEN` of them.
    pub secret: String,
    pub access_ttl_secs: u64,
    pub refresh_length: usize,
    pub refresh_ttl_secs: u64,
    pub blacklist_ttl_secs: u64,
}

// Keeps the secret out of the startup log line.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_length", &self.refresh_length)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("blacklist_ttl_secs", &self.blacklist_ttl_secs)
            .finish()
    }
}

impl Token {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }

    pub fn blacklist_ttl(&self) -> Duration {
        Duration::from_secs(self.blacklist_ttl_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "redis" or "memory"
    #[serde(default)]
    pub redis_url: String,
    pub op_timeout_ms: u64,
}

impl Store {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "mysql" or "memory"
    #[serde(default)]
    pub mysql_url: String,
    pub acquire_timeout_ms: u64,
}

impl User {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Environment overrides use `WARDEN__<SECTION>__<KEY>`, e.g. `WARDEN__TOKEN__SECRET`.
const ENV_PREFIX: &str = "WARDEN";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

/// One year.
const MAX_TTL_SECS: u64 = 366 * 24 * 60 * 60;

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.token.secret.len() < MIN_SIGNING_KEY_LEN {
            return Err(anyhow!(
                "token.secret must be at least {MIN_SIGNING_KEY_LEN} bytes"
            ));
        }
        if self.token.refresh_length == 0 {
            return Err(anyhow!("token.refresh_length must be positive"));
        }
        if self.token.access_ttl_secs == 0
            || self.token.refresh_ttl_secs == 0
            || self.token.blacklist_ttl_secs == 0
        {
            return Err(anyhow!("token ttls must be positive"));
        }
        if self.token.access_ttl_secs > MAX_TTL_SECS
            || self.token.refresh_ttl_secs > MAX_TTL_SECS
            || self.token.blacklist_ttl_secs > MAX_TTL_SECS
        {
            return Err(anyhow!("token ttls must not exceed {MAX_TTL_SECS} seconds"));
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            return Err(anyhow!("http.cert_path and http.key_path must be set together"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_parse() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.token.access_ttl(), Duration::from_secs(900));
        assert_eq!(settings.token.refresh_ttl(), Duration::from_secs(7 * 24 * 60 * 60));
        assert!(!format!("{:?}", settings.token).contains(&settings.token.secret));
        assert!(settings.http.tls_paths().is_none());
    }

    #[test]
    fn out_of_range_token_settings_are_rejected() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert!(settings.validate().is_ok());

        settings.token.access_ttl_secs = u64::MAX;
        assert!(settings.validate().is_err());
        settings.token.access_ttl_secs = 900;

        settings.token.refresh_ttl_secs = MAX_TTL_SECS + 1;
        assert!(settings.validate().is_err());
        settings.token.refresh_ttl_secs = MAX_TTL_SECS;
        assert!(settings.validate().is_ok());

        settings.token.secret = "x".repeat(MIN_SIGNING_KEY_LEN - 1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
