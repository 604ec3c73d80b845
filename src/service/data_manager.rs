use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::model::card::Card;

use super::{
    config::Config,
    gameapi::client::{ApiClient, ClientInitError},
    storage::{DatabaseStats, Storage, StorageError},
};

pub struct DataManager {
    client: ApiClient,
    storage: Storage,
    cards_cache: OnceCell<Vec<Card>>,
}

impl DataManager {
    pub fn new(config: &Config) -> Result<Self, DataManagerInitError> {
        let client = ApiClient::new(config)?;
        let storage = Storage::open(&config.database_path)?;

        Ok(Self {
            client,
            storage,
            cards_cache: OnceCell::new(),
        })
    }

    /// Card catalog, fetched once per manager lifetime.
    pub fn get_cards(&self) -> &Vec<Card> {
        self.cards_cache.get_or_init(|| self.client.get_cards())
    }

    pub fn database_stats(&mut self) -> Result<DatabaseStats, StorageError> {
        self.storage.database_stats()
    }

    /// One full collection pass: leaderboard tags, then per player the
    /// profile and battle log, all persisted, closed out with a stats row.
    pub fn collect_cycle(&mut self, location: &str, limit: u32) -> Result<CycleReport, StorageError> {
        let started = Instant::now();
        let stats_before = self.client.get_api_stats();

        let tags = self.client.get_top_players(location, limit);
        info!(players = tags.len(), location, "collection cycle started");

        let mut battles_collected = 0;
        for tag in &tags {
            match self.client.get_player_info(tag) {
                Some(player) => self.storage.upsert_player(&player)?,
                None => warn!(%tag, "no profile data, skipping player update"),
            }

            let battles = self.client.get_player_battles(tag);
            let mut newly_collected = 0;
            for battle in &battles {
                if self.storage.insert_battle(battle)? {
                    newly_collected += 1;
                }
            }

            self.storage.mark_player_processed(tag, newly_collected)?;
            battles_collected += newly_collected;
        }

        let stats_after = self.client.get_api_stats();
        let report = CycleReport {
            date: Utc::now(),
            players_processed: tags.len() as i32,
            battles_collected,
            api_calls_made: (stats_after.total_requests - stats_before.total_requests) as i32,
            errors_encountered: (stats_after.failed_requests - stats_before.failed_requests) as i32,
            collection_time_minutes: (started.elapsed().as_secs() / 60) as i32,
        };
        self.storage.record_collection_stats(&report)?;

        info!(
            players = report.players_processed,
            battles = report.battles_collected,
            api_calls = report.api_calls_made,
            errors = report.errors_encountered,
            "collection cycle finished"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub date: DateTime<Utc>,
    pub players_processed: i32,
    pub battles_collected: i32,
    pub api_calls_made: i32,
    pub errors_encountered: i32,
    pub collection_time_minutes: i32,
}

#[derive(Debug)]
pub enum DataManagerInitError {
    ClientFailed(ClientInitError),
    StorageFailed(StorageError),
}

impl fmt::Display for DataManagerInitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataManagerInitError::ClientFailed(err) => write!(f, "Client error: {}", err),
            DataManagerInitError::StorageFailed(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl From<ClientInitError> for DataManagerInitError {
    fn from(error: ClientInitError) -> Self {
        Self::ClientFailed(error)
    }
}

impl From<StorageError> for DataManagerInitError {
    fn from(error: StorageError) -> Self {
        Self::StorageFailed(error)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
        time::Duration,
    };

    use super::*;

    fn serve(responses: Vec<String>) -> (String, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut served = 0;
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                stream.write_all(response.as_bytes()).unwrap();
                served += 1;
            }
            served
        });

        (format!("http://{}", addr), handle)
    }

    fn http_ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn test_manager(base_url: String) -> DataManager {
        let config = Config {
            api_token: "secret".to_string(),
            api_base_url: base_url,
            database_path: ":memory:".to_string(),
            log_level: "info".to_string(),
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            update_interval: Duration::from_secs(3600),
        };
        DataManager::new(&config).unwrap()
    }

    const RANKINGS: &str = r##"{"items": [{"tag": "#AAA", "name": "alice", "trophies": 7000, "rank": 1}]}"##;
    const PROFILE: &str = r##"{"tag": "#AAA", "name": "alice", "trophies": 7000, "bestTrophies": 7100, "wins": 2000, "losses": 1500}"##;
    const BATTLE_LOG: &str = r##"[{
        "type": "PvP",
        "battleTime": "20240301T101010.000Z",
        "gameMode": {"name": "Ladder"},
        "team": [{"tag": "#AAA", "name": "alice", "startingTrophies": 7000, "crowns": 3, "cards": [{"name": "Knight"}]}],
        "opponent": [{"tag": "#BBB", "name": "bob", "startingTrophies": 6900, "crowns": 0, "cards": [{"name": "Giant"}]}]
    }]"##;

    #[test]
    fn cycle_persists_players_battles_and_stats() {
        let (base_url, server) = serve(vec![
            http_ok(RANKINGS),
            http_ok(PROFILE),
            http_ok(BATTLE_LOG),
        ]);
        let mut manager = test_manager(base_url);

        let report = manager.collect_cycle("global", 10).unwrap();

        assert_eq!(server.join().unwrap(), 3);
        assert_eq!(report.players_processed, 1);
        assert_eq!(report.battles_collected, 1);
        assert_eq!(report.api_calls_made, 3);
        assert_eq!(report.errors_encountered, 0);

        let stats = manager.database_stats().unwrap();
        assert_eq!(stats.battles, 1);
        assert_eq!(stats.players, 1);
    }

    #[test]
    fn card_catalog_is_fetched_once() {
        let (base_url, server) = serve(vec![http_ok(
            r#"{"items": [{"id": 26000000, "name": "Knight", "maxLevel": 14, "elixirCost": 3}]}"#,
        )]);
        let manager = test_manager(base_url);

        assert_eq!(manager.get_cards().len(), 1);
        assert_eq!(manager.get_cards().len(), 1);
        assert_eq!(server.join().unwrap(), 1);
    }
}
