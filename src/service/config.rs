use std::{env, fmt, fs, io, path::Path, time::Duration};

const DEFAULT_BASE_URL: &str = "https://api.clashroyale.com/v1";
const DEFAULT_DATABASE_PATH: &str = "data/royaledata.db";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u64 = 3;
const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;

/// Runtime configuration, built once in `main` and passed by reference into
/// the client and storage constructors.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub api_base_url: String,
    pub database_path: String,
    pub log_level: String,
    pub request_timeout: Duration,
    pub max_retries: usize,
    pub update_interval: Duration,
}

impl Config {
    /// Reads configuration from the environment, loading a `.env` file first
    /// when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_token = env::var("CLASH_ROYALE_API_TOKEN").unwrap_or_default();
        let api_base_url = env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let request_timeout =
            Duration::from_secs(parse_var("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?);
        let max_retries = parse_var("MAX_RETRIES", DEFAULT_MAX_RETRIES)? as usize;
        let update_interval =
            Duration::from_secs(parse_var("UPDATE_INTERVAL", DEFAULT_UPDATE_INTERVAL_SECS)?);

        Ok(Self {
            api_token,
            api_base_url,
            database_path,
            log_level,
            request_timeout,
            max_retries,
            update_interval,
        })
    }

    /// Checks required settings and prepares the database directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        if let Some(dir) = Path::new(&self.database_path).parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|err| ConfigError::DirectoryCreation(dir.display().to_string(), err))?;
            }
        }

        Ok(())
    }
}

fn parse_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(name.to_string(), value)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingToken,
    InvalidNumber(String, String),
    DirectoryCreation(String, io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingToken => write!(f, "CLASH_ROYALE_API_TOKEN is required"),
            ConfigError::InvalidNumber(name, value) => {
                write!(f, "{} has an invalid value '{}'", name, value)
            }
            ConfigError::DirectoryCreation(dir, err) => {
                write!(f, "Cannot create directory {}: {}", dir, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(token: &str, database_path: &str) -> Config {
        Config {
            api_token: token.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            database_path: database_path.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES as usize,
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
        }
    }

    #[test]
    fn missing_token_fails_validation() {
        let config = config_with("", "royaledata.db");
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn validation_creates_the_database_directory() {
        let dir = env::temp_dir().join("royaledata_config_test");
        let _ = fs::remove_dir_all(&dir);
        let db_path = dir.join("collector.db");

        let config = config_with("token", db_path.to_str().unwrap());
        config.validate().unwrap();

        assert!(dir.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
