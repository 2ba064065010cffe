//! Runtime configuration read from `BOOKSTORE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use bookstore_catalog::DEFAULT_PAGE_SIZE;
use bookstore_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:80";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

const DB_FILE: &str = "storefront.db";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("no data directory available; set BOOKSTORE_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub page_size: usize,
    pub cart_debounce: Duration,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_url = get("BOOKSTORE_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let page_size = match get("BOOKSTORE_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(invalid("BOOKSTORE_PAGE_SIZE", raw)),
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let debounce_ms = parse_u64(get("BOOKSTORE_CART_DEBOUNCE_MS"), "BOOKSTORE_CART_DEBOUNCE_MS")?
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        let timeout_secs =
            parse_u64(get("BOOKSTORE_HTTP_TIMEOUT_SECS"), "BOOKSTORE_HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let data_dir = match get("BOOKSTORE_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("bookstore"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let log_format = match get("BOOKSTORE_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|_| invalid("BOOKSTORE_LOG_FORMAT", raw))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            auth_token: get("BOOKSTORE_AUTH_TOKEN"),
            page_size,
            cart_debounce: Duration::from_millis(debounce_ms),
            http_timeout: Duration::from_secs(timeout_secs),
            data_dir,
            log_format,
        })
    }

    /// Location of the SQLite key/value store.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { var, value }
}

fn parse_u64(raw: Option<String>, var: &'static str) -> Result<Option<u64>, ConfigError> {
    raw.map(|v| v.trim().parse::<u64>().map_err(|_| invalid(var, v)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[("BOOKSTORE_DATA_DIR", "/tmp/bs")]).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.auth_token, None);
        assert_eq!(cfg.page_size, 16);
        assert_eq!(cfg.cart_debounce, Duration::from_millis(300));
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/bs/storefront.db"));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("BOOKSTORE_API_URL", "https://books.example/"),
            ("BOOKSTORE_AUTH_TOKEN", "t0k"),
            ("BOOKSTORE_PAGE_SIZE", "8"),
            ("BOOKSTORE_CART_DEBOUNCE_MS", "50"),
            ("BOOKSTORE_HTTP_TIMEOUT_SECS", "3"),
            ("BOOKSTORE_DATA_DIR", "/var/lib/bs"),
            ("BOOKSTORE_LOG_FORMAT", "text"),
        ])
        .unwrap();

        assert_eq!(cfg.api_url, "https://books.example");
        assert_eq!(cfg.auth_token.as_deref(), Some("t0k"));
        assert_eq!(cfg.page_size, 8);
        assert_eq!(cfg.cart_debounce, Duration::from_millis(50));
        assert_eq!(cfg.http_timeout, Duration::from_secs(3));
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let err = config(&[("BOOKSTORE_DATA_DIR", "/x"), ("BOOKSTORE_PAGE_SIZE", "0")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "BOOKSTORE_PAGE_SIZE",
                value: "0".into()
            }
        );
    }

    #[test]
    fn non_numeric_debounce_is_invalid() {
        let err = config(&[
            ("BOOKSTORE_DATA_DIR", "/x"),
            ("BOOKSTORE_CART_DEBOUNCE_MS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "BOOKSTORE_CART_DEBOUNCE_MS", .. }
        ));
    }

    #[test]
    fn blank_token_counts_as_unset() {
        let cfg = config(&[("BOOKSTORE_DATA_DIR", "/x"), ("BOOKSTORE_AUTH_TOKEN", "  ")]).unwrap();
        assert_eq!(cfg.auth_token, None);
    }
}
