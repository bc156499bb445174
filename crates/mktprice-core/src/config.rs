use std::path::Path;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Env file read when the caller does not name one.
pub const DEFAULT_ENV_FILE: &str = "config.env";

/// Run-log directory when `MKTPRICE_LOG_DIR` is unset.
pub const DEFAULT_LOG_DIR: &str = ".";

/// Log filter when neither `RUST_LOG` nor `MKTPRICE_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Values given on the command line; they win over the environment and
/// env files.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub campaign_id: Option<u64>,
}

impl ConfigOverrides {
    fn get(&self, var: &str) -> Option<String> {
        match var {
            "YANDEX_API_KEY" => self.api_key.clone(),
            "YANDEX_CAMPAIGN_ID" => self.campaign_id.map(|id| id.to_string()),
            _ => None,
        }
    }
}

/// Load application configuration from environment variables.
///
/// Loads `env_file` when given (a missing file is an error), otherwise tries
/// [`DEFAULT_ENV_FILE`] and then `.env`, both optional. Variables already set
/// in the process win over file values.
///
/// # Errors
///
/// Returns `ConfigError` if the named env file cannot be read, or if required
/// env vars are missing or values are invalid.
pub fn load_app_config(
    env_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    if let Some(path) = env_file {
        dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    } else if dotenvy::from_filename(DEFAULT_ENV_FILE).is_err() {
        dotenvy::dotenv().ok();
    }
    build_app_config(|key| overrides.get(key).map_or_else(|| std::env::var(key), Ok))
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load env files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests
/// can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_id = |var: &str, raw: &str| -> Result<u64, ConfigError> {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let optional_id = |var: &str| -> Result<Option<u64>, ConfigError> {
        match lookup(var) {
            Ok(raw) if !raw.trim().is_empty() => parse_id(var, &raw).map(Some),
            _ => Ok(None),
        }
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let api_key = require("YANDEX_API_KEY")?;
    let campaign_id = parse_id("YANDEX_CAMPAIGN_ID", &require("YANDEX_CAMPAIGN_ID")?)?;
    let business_id = optional_id("YANDEX_BUSINESS_ID")?;
    let express_campaign_id = optional_id("YANDEX_CAMPAIGN_ID_EXPRES")?;

    let default_batch_size = parse_usize("DEFAULT_BATCH_SIZE", "50")?;
    if default_batch_size == 0 {
        return Err(invalid("DEFAULT_BATCH_SIZE", "must be at least 1".to_string()));
    }
    let default_delay_secs = parse_u64("DEFAULT_DELAY", "1")?;

    let base_url = or_default(
        "MKTPRICE_BASE_URL",
        "https://api.partner.market.yandex.ru",
    );
    let request_timeout_secs = parse_u64("MKTPRICE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("MKTPRICE_MAX_RETRIES", "3")?;
    let retry_delay_ms = parse_u64("MKTPRICE_RETRY_DELAY_MS", "1000")?;
    let page_delay_ms = parse_u64("MKTPRICE_PAGE_DELAY_MS", "500")?;
    let page_size = parse_u32("MKTPRICE_PAGE_SIZE", "200")?;
    if page_size == 0 {
        return Err(invalid("MKTPRICE_PAGE_SIZE", "must be at least 1".to_string()));
    }
    let log_dir = PathBuf::from(or_default("MKTPRICE_LOG_DIR", DEFAULT_LOG_DIR));
    let log_level = or_default("MKTPRICE_LOG_LEVEL", DEFAULT_LOG_LEVEL);

    Ok(AppConfig {
        api_key,
        campaign_id,
        business_id,
        express_campaign_id,
        default_batch_size,
        default_delay_secs,
        base_url,
        request_timeout_secs,
        max_retries,
        retry_delay_ms,
        page_delay_ms,
        page_size,
        log_dir,
        log_level,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
