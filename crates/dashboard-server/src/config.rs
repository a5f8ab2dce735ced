use std::{
    env,
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use runtime::market_data::DEFAULT_YAHOO_BASE_URL;
use time::{macros::format_description, Date};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MODE: RunMode = RunMode::Serve;
const DEFAULT_SNAPSHOT_OUTPUT_PATH: &str = "artifacts/latest_analysis.csv";
const DEFAULT_SYMBOL: &str = "^DJI";
const DEFAULT_START_DATE: Date = time::macros::date!(2015 - 01 - 01);
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

const ENV_ADDR: &str = "DASHBOARD_ADDR";
const ENV_MODE: &str = "DASHBOARD_MODE";
const ENV_SNAPSHOT_OUTPUT: &str = "DASHBOARD_SNAPSHOT_OUTPUT";
const ENV_SYMBOL: &str = "DASHBOARD_SYMBOL";
const ENV_START_DATE: &str = "DASHBOARD_START_DATE";
const ENV_CACHE_TTL: &str = "DASHBOARD_CACHE_TTL_SECS";
const ENV_YAHOO_BASE_URL: &str = "DASHBOARD_YAHOO_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Once,
}

impl RunMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "serve" => Some(Self::Serve),
            "once" => Some(Self::Once),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Once => "once",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub mode: RunMode,
    pub snapshot_output_path: PathBuf,
    pub symbol: String,
    pub start_date: Date,
    /// Zero disables the price cache.
    pub cache_ttl: Duration,
    pub yahoo_base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DASHBOARD_ADDR is not a valid socket address: {0}")]
    InvalidListenAddr(#[source] AddrParseError),
    #[error("DASHBOARD_MODE must be one of: serve, once")]
    InvalidMode,
    #[error("DASHBOARD_SNAPSHOT_OUTPUT must not be empty or whitespace")]
    InvalidSnapshotOutputPath,
    #[error("DASHBOARD_SYMBOL must not be empty or whitespace")]
    InvalidSymbol,
    #[error("DASHBOARD_START_DATE must be a YYYY-MM-DD date")]
    InvalidStartDate,
    #[error("DASHBOARD_CACHE_TTL_SECS must be a whole number of seconds")]
    InvalidCacheTtl,
    #[error("DASHBOARD_YAHOO_BASE_URL must be an http(s) URL")]
    InvalidYahooBaseUrl,
    #[error("{0} contains non-unicode data")]
    NonUnicode(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env(ENV_ADDR)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(ConfigError::InvalidListenAddr)?,
        };

        let mode = match read_env(ENV_MODE)? {
            Some(value) => RunMode::parse(value.trim()).ok_or(ConfigError::InvalidMode)?,
            None => DEFAULT_MODE,
        };

        let snapshot_output_path = match read_env(ENV_SNAPSHOT_OUTPUT)? {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidSnapshotOutputPath);
            }
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_SNAPSHOT_OUTPUT_PATH),
        };

        let symbol = match read_env(ENV_SYMBOL)? {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::InvalidSymbol),
            Some(value) => value.trim().to_owned(),
            None => DEFAULT_SYMBOL.to_owned(),
        };

        let start_date = match read_env(ENV_START_DATE)? {
            Some(value) => parse_date(value.trim()).ok_or(ConfigError::InvalidStartDate)?,
            None => DEFAULT_START_DATE,
        };

        let cache_ttl = match read_env(ENV_CACHE_TTL)? {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidCacheTtl)?,
            None => Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        };

        let yahoo_base_url = match read_env(ENV_YAHOO_BASE_URL)? {
            Some(value) => {
                let value = value.trim();
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(ConfigError::InvalidYahooBaseUrl);
                }
                value.to_owned()
            }
            None => DEFAULT_YAHOO_BASE_URL.to_owned(),
        };

        Ok(Self {
            listen_addr,
            mode,
            snapshot_output_path,
            symbol,
            start_date,
            cache_ttl,
            yahoo_base_url,
        })
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode(key)),
    }
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}
