use std::fmt;

use tracing::info;

use super::{
    config::{Config, ConfigError},
    gameapi::client::{ApiClient, ClientInitError},
    storage::{Storage, StorageError},
};

/// Verifies configuration, database and API access before a first
/// collection run. Every step reports an explicit result; nothing panics.
pub fn run(config: &Config) -> bool {
    let steps: [(&str, fn(&Config) -> Result<(), CheckError>); 3] = [
        ("Configuration", check_configuration),
        ("Database", check_database),
        ("API", check_api),
    ];

    println!("Running setup checks");
    let mut all_passed = true;
    for (name, step) in steps {
        match step(config) {
            Ok(()) => println!("  {:<15} ok", name),
            Err(error) => {
                all_passed = false;
                println!("  {:<15} FAILED: {}", name, error);
            }
        }
    }

    if all_passed {
        println!("All checks passed, ready to collect.");
    } else {
        println!("Some checks failed. Verify the .env settings and that the API token matches this IP address.");
    }
    all_passed
}

fn check_configuration(config: &Config) -> Result<(), CheckError> {
    config.validate()?;
    Ok(())
}

fn check_database(config: &Config) -> Result<(), CheckError> {
    let mut storage = Storage::open(&config.database_path)?;
    let stats = storage.database_stats()?;
    info!(
        battles = stats.battles,
        players = stats.players,
        earliest_battle = ?stats.earliest_battle,
        latest_battle = ?stats.latest_battle,
        "database ready"
    );
    Ok(())
}

fn check_api(config: &Config) -> Result<(), CheckError> {
    let client = ApiClient::new(config)?;
    if client.test_connection() {
        Ok(())
    } else {
        Err(CheckError::ApiUnreachable)
    }
}

#[derive(Debug)]
enum CheckError {
    Config(ConfigError),
    Storage(StorageError),
    Client(ClientInitError),
    ApiUnreachable,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckError::Config(err) => write!(f, "{}", err),
            CheckError::Storage(err) => write!(f, "{}", err),
            CheckError::Client(err) => write!(f, "{}", err),
            CheckError::ApiUnreachable => write!(f, "API connection check did not succeed"),
        }
    }
}

impl From<ConfigError> for CheckError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<StorageError> for CheckError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ClientInitError> for CheckError {
    fn from(error: ClientInitError) -> Self {
        Self::Client(error)
    }
}
