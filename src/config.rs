use std::{env, path::PathBuf, str::FromStr, time::Duration};

use chrono::FixedOffset;
use dotenvy::dotenv;
use strum_macros::EnumString;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where attendance data lives.
#[derive(Debug, Clone, PartialEq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    /// Folder of CSV sheets
    Sheet,
    Mysql,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub sheet_dir: PathBuf,

    /// The one zone every date and timestamp is read in
    pub utc_offset: FixedOffset,

    // Rate limiting
    pub rate_lookup_per_min: u32,
    pub rate_punch_per_min: u32,

    pub shift_cache_ttl: Duration,
    pub log_dir: PathBuf,
    pub log_level: Level,

    pub api_prefix: String,
}

/// Parses `+05:30`, `-0800`, `+5` style offsets.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first().copied()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => (1, raw),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        fn parsed<T: FromStr>(key: &str, raw: String) -> Result<T, ConfigError> {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw.clone()))
        }

        let store_backend: StoreBackend = parsed("STORE_BACKEND", or("STORE_BACKEND", "sheet"))?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let offset_raw = or("UTC_OFFSET", "+05:30");
        let utc_offset = parse_utc_offset(&offset_raw)
            .ok_or_else(|| ConfigError::InvalidValue("UTC_OFFSET".to_string(), offset_raw))?;

        let log_level_raw = or("LOG_LEVEL", "info");
        let log_level = log_level_raw.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "LOG_LEVEL".to_string(),
                format!("'{}' is not a valid log level", log_level_raw),
            )
        })?;

        Ok(Self {
            server_addr: or("SERVER_ADDR", "127.0.0.1:8080"),
            store_backend,
            database_url,
            sheet_dir: PathBuf::from(or("SHEET_DIR", "./sheets")),
            utc_offset,

            rate_lookup_per_min: parsed("RATE_LOOKUP_PER_MIN", or("RATE_LOOKUP_PER_MIN", "120"))?,
            rate_punch_per_min: parsed("RATE_PUNCH_PER_MIN", or("RATE_PUNCH_PER_MIN", "20"))?,

            shift_cache_ttl: Duration::from_secs(parsed(
                "SHIFT_CACHE_TTL_SECS",
                or("SHIFT_CACHE_TTL_SECS", "3600"),
            )?),
            log_dir: PathBuf::from(or("LOG_DIR", "logs")),
            log_level,

            api_prefix: or("API_PREFIX", "/api"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.server_addr, "127.0.0.1:8080");
        assert_eq!(c.store_backend, StoreBackend::Sheet);
        assert_eq!(c.utc_offset.local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(c.rate_lookup_per_min, 120);
        assert_eq!(c.rate_punch_per_min, 20);
        assert_eq!(c.shift_cache_ttl, Duration::from_secs(3600));
        assert_eq!(c.log_level, Level::INFO);
        assert_eq!(c.api_prefix, "/api");
    }

    #[test]
    fn mysql_needs_a_database_url() {
        let err = config(&[("STORE_BACKEND", "mysql")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DATABASE_URL"));

        let c = config(&[("STORE_BACKEND", "mysql"), ("DATABASE_URL", "mysql://localhost/hr")])
            .unwrap();
        assert_eq!(c.store_backend, StoreBackend::Mysql);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("STORE_BACKEND", "excel")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            config(&[("RATE_PUNCH_PER_MIN", "lots")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            config(&[("UTC_OFFSET", "Asia/Kolkata")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            config(&[("LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidValue(..))
        ));
    }

    #[test]
    fn offsets() {
        let secs = |raw: &str| parse_utc_offset(raw).map(|o| o.local_minus_utc());
        assert_eq!(secs("+05:30"), Some(19_800));
        assert_eq!(secs("0530"), Some(19_800));
        assert_eq!(secs("-08:00"), Some(-28_800));
        assert_eq!(secs("+5"), Some(18_000));
        assert_eq!(secs("UTC"), Some(0));
        assert_eq!(secs("+05:75"), None);
        assert_eq!(secs("+30:00"), None);
        assert_eq!(secs(""), None);
    }
}
