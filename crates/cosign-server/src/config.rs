//! Server configuration.
//!
//! Every option can come from a flag or from its environment variable;
//! flags win. Defaults suit local development against an in-memory drive
//! stand-in or a real Drive token.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use cosign::core::ValidationError;
use cosign::drive::DriveConfig;
use cosign::store::{SqliteStore, StoreError};
use cosign::{CosignConfig, Email, DEFAULT_URL_BASE};

/// Database path that selects an ephemeral in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Two-party document co-signing service.
#[derive(Debug, Clone, Parser)]
#[command(name = "cosign-server", about = "Two-party document co-signing service")]
pub struct ServerConfig {
    /// Listen address (host:port).
    #[arg(long, env = "COSIGN_LISTEN", default_value = "0.0.0.0:5050")]
    pub listen: SocketAddr,

    /// SQLite database path, or `:memory:`.
    #[arg(long, env = "COSIGN_DATABASE", default_value = "cosign.db")]
    pub database: String,

    /// Drive v2 API root.
    #[arg(
        long,
        env = "COSIGN_DRIVE_URL",
        default_value = "https://www.googleapis.com/drive/v2"
    )]
    pub drive_url: String,

    /// OAuth bearer token for the Drive API.
    #[arg(long, env = "COSIGN_DRIVE_TOKEN", default_value = "", hide_env_values = true)]
    pub drive_token: String,

    /// Account granted `owner` on every created document.
    #[arg(long, env = "COSIGN_OWNER_ACCOUNT")]
    pub owner_account: Option<String>,

    /// Deadline for the external-store phase of one request.
    #[arg(long, env = "COSIGN_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Prefix of document URLs.
    #[arg(long, env = "COSIGN_URL_BASE", default_value = DEFAULT_URL_BASE)]
    pub url_base: String,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cosign_config(&self) -> Result<CosignConfig, ValidationError> {
        let owner_account = self
            .owner_account
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(Email::parse)
            .transpose()?;
        Ok(CosignConfig {
            request_timeout: self.request_timeout(),
            owner_account,
            url_base: self.url_base.clone(),
        })
    }

    /// Drive calls share the request deadline; each call gets all of it.
    pub fn drive_config(&self) -> DriveConfig {
        DriveConfig {
            base_url: self.drive_url.clone(),
            access_token: self.drive_token.clone(),
            timeout: self.request_timeout(),
        }
    }

    pub fn open_store(&self) -> Result<SqliteStore, StoreError> {
        if self.database == MEMORY_DATABASE {
            SqliteStore::open_memory()
        } else {
            SqliteStore::open(&self.database)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["cosign-server"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--listen",
            "127.0.0.1:9000",
            "--database",
            ":memory:",
            "--owner-account",
            "svc@x.com",
            "--request-timeout-secs",
            "5",
        ]);

        assert_eq!(config.listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let cosign = config.cosign_config().unwrap();
        assert_eq!(cosign.owner_account, Some(Email::parse("svc@x.com").unwrap()));
        assert_eq!(cosign.request_timeout, Duration::from_secs(5));
        assert!(config.open_store().is_ok());
    }

    #[test]
    fn test_invalid_owner_account_is_rejected() {
        let config = parse(&["--owner-account", "not-an-email"]);
        assert!(config.cosign_config().is_err());
    }

    #[test]
    fn test_bad_listen_address_fails_to_parse() {
        let result = ServerConfig::try_parse_from(["cosign-server", "--listen", "nowhere"]);
        assert!(result.is_err());
    }
}
