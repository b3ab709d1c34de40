use dotenv::dotenv;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

pub const API_URL_ENV_VAR: &str = "MEAL_PREP_API_URL";
pub const TOKEN_VAR_ENV_VAR: &str = "MEAL_PREP_TOKEN_VAR";
pub const DATA_DIR_ENV_VAR: &str = "MEAL_PREP_DATA_DIR";
pub const PREFER_METRIC_ENV_VAR: &str = "MEAL_PREP_PREFER_METRIC";

const DEFAULT_API_URL: &str = "http://localhost:4000/api";
const DEFAULT_TOKEN_ENV_VAR: &str = "MEAL_PREP_TOKEN";
const DEFAULT_DATA_DIR: &str = ".meal_prep";

const SECTION_ORDER_FILE: &str = "section_order.json";
const CUSTOM_ITEMS_FILE: &str = "custom_items.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    /// Name of the environment variable holding the bearer token, not the token.
    pub token_env_var: String,
    pub data_dir: PathBuf,
    pub prefer_metric: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token_env_var: DEFAULT_TOKEN_ENV_VAR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            prefer_metric: false,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads every setting from the environment,
    /// falling back to defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: lookup(API_URL_ENV_VAR).unwrap_or(defaults.api_base_url),
            token_env_var: lookup(TOKEN_VAR_ENV_VAR).unwrap_or(defaults.token_env_var),
            data_dir: lookup(DATA_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            prefer_metric: parse_or_default(&lookup, PREFER_METRIC_ENV_VAR, defaults.prefer_metric),
        }
    }

    pub fn section_order_path(&self) -> PathBuf {
        self.data_dir.join(SECTION_ORDER_FILE)
    }

    pub fn custom_items_path(&self) -> PathBuf {
        self.data_dir.join(CUSTOM_ITEMS_FILE)
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
    }
}
