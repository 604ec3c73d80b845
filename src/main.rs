use std::{env, process::ExitCode, thread};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::service::{config::Config, data_manager::DataManager, setup_check};

mod model;
mod service;

const LEADERBOARD_LOCATION: &str = "global";
const LEADERBOARD_LIMIT: u32 = 200;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error occured while loading configuration:\n{}\n", error);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    if env::args().nth(1).as_deref() == Some("check") {
        return if setup_check::run(&config) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    if let Err(error) = config.validate() {
        eprintln!("Error occured while validating configuration:\n{}\n", error);
        return ExitCode::FAILURE;
    }

    let mut manager = match DataManager::new(&config) {
        Ok(manager) => manager,
        Err(error) => {
            eprintln!("Error occured while initializing:\n{}\n", error);
            return ExitCode::FAILURE;
        }
    };

    let cards = manager.get_cards().len();
    info!(
        interval_secs = config.update_interval.as_secs(),
        cards,
        "collector started"
    );

    loop {
        match manager.collect_cycle(LEADERBOARD_LOCATION, LEADERBOARD_LIMIT) {
            Ok(report) => info!(
                battles = report.battles_collected,
                players = report.players_processed,
                "cycle stored"
            ),
            Err(error) => error!(%error, "collection cycle failed"),
        }

        thread::sleep(config.update_interval);
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
