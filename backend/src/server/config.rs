//! Server settings loaded via OrthoConfig and the resolved server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use portal::outbound::persistence::{DbPool, PoolConfig};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration values for the HTTP server, read from `PORTAL_*`
/// environment variables, configuration files and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory repositories are used when absent.
    pub database_url: Option<String>,
    /// File holding at least 64 bytes of session key material.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway key when the key file cannot be read. Off when
    /// unset.
    pub allow_ephemeral_session_key: Option<bool>,
    /// Mark session cookies `Secure`. On when unset.
    pub cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    pub session_ttl_hours: Option<u64>,
    pub pool_max_size: Option<u32>,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    #[must_use]
    pub fn allow_ephemeral_session_key(&self) -> bool {
        self.allow_ephemeral_session_key.unwrap_or(false)
    }

    pub fn session_ttl(&self) -> Duration {
        let hours = self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS);
        Duration::from_secs(hours.saturating_mul(3_600))
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        session_ttl: Duration,
        bind_addr: SocketAddr,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database connection pool; Diesel repositories are used
    /// instead of the in-memory ones.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "PORTAL_BIND_ADDR",
        "PORTAL_DATABASE_URL",
        "PORTAL_SESSION_KEY_FILE",
        "PORTAL_ALLOW_EPHEMERAL_SESSION_KEY",
        "PORTAL_COOKIE_SECURE",
        "PORTAL_SAME_SITE",
        "PORTAL_SESSION_TTL_HOURS",
        "PORTAL_POOL_MAX_SIZE",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("portal")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:5000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.cookie_secure, None);
        assert!(settings.cookie_secure());
        assert!(!settings.allow_ephemeral_session_key());
        assert!(settings.pool_config().is_none());
        assert_eq!(settings.session_ttl(), Duration::from_secs(24 * 3_600));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PORTAL_BIND_ADDR", Some("127.0.0.1:8081".to_owned())),
            (
                "PORTAL_DATABASE_URL",
                Some("postgres://localhost/portal".to_owned()),
            ),
            ("PORTAL_SESSION_KEY_FILE", Some("/tmp/key".to_owned())),
            ("PORTAL_ALLOW_EPHEMERAL_SESSION_KEY", Some("true".to_owned())),
            ("PORTAL_COOKIE_SECURE", Some("false".to_owned())),
            ("PORTAL_SAME_SITE", Some("Strict".to_owned())),
            ("PORTAL_SESSION_TTL_HOURS", Some("2".to_owned())),
            ("PORTAL_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("override parses").port(),
            8081
        );
        assert!(!settings.cookie_secure());
        assert!(settings.allow_ephemeral_session_key());
        assert_eq!(settings.session_key_file, Some(PathBuf::from("/tmp/key")));
        assert_eq!(settings.same_site.as_deref(), Some("Strict"));
        assert_eq!(settings.session_ttl(), Duration::from_secs(7_200));
        let pool = settings.pool_config().expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://localhost/portal");
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn cookie_secure_follows_the_environment(#[case] raw: &str, #[case] expected: bool) {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[4].1 = Some(raw.to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(settings.cookie_secure(), expected);
        assert!(!settings.allow_ephemeral_session_key());
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let mut settings = load_from_empty_args();
        settings.bind_addr = Some("not an address".to_owned());
        assert!(settings.bind_addr().is_err());
    }
}
