pub mod schema;

use std::fmt;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::model::{
    battle::{Battle, BattlePlayer, Winner},
    ids::PlayerTag,
    player::Player,
};
use crate::service::data_manager::CycleReport;

use self::schema::{battles, collection_stats, players};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub struct Storage {
    conn: SqliteConnection,
}

impl Storage {
    /// Opens (or creates) the database at the given path and brings the
    /// schema up to date.
    pub fn open(database_path: &str) -> Result<Self, StorageError> {
        let mut conn = SqliteConnection::establish(database_path)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| StorageError::Migration(err.to_string()))?;

        Ok(Self { conn })
    }

    /// Stores a battle unless one with the same id is already present.
    /// Reports whether a new row was written.
    pub fn insert_battle(&mut self, battle: &Battle) -> Result<bool, StorageError> {
        let record = NewBattle::from_battle(battle);
        let inserted = diesel::insert_into(battles::table)
            .values(&record)
            .on_conflict(battles::battle_id)
            .do_nothing()
            .execute(&mut self.conn)?;

        Ok(inserted > 0)
    }

    /// Inserts a player profile or refreshes the stored one on its unique
    /// tag.
    pub fn upsert_player(&mut self, player: &Player) -> Result<(), StorageError> {
        let now = Utc::now().naive_utc();
        let record = NewPlayer {
            player_tag: player.tag.as_str(),
            name: Some(player.name.as_str()),
            trophies: Some(player.trophies),
            best_trophies: Some(player.best_trophies),
            wins: Some(player.wins),
            losses: Some(player.losses),
            last_seen: Some(now),
            battles_collected: 0,
            is_processed: false,
            added_at: now,
            last_processed: None,
        };

        diesel::insert_into(players::table)
            .values(&record)
            .on_conflict(players::player_tag)
            .do_update()
            .set((
                players::name.eq(Some(player.name.as_str())),
                players::trophies.eq(Some(player.trophies)),
                players::best_trophies.eq(Some(player.best_trophies)),
                players::wins.eq(Some(player.wins)),
                players::losses.eq(Some(player.losses)),
                players::last_seen.eq(Some(now)),
            ))
            .execute(&mut self.conn)?;

        Ok(())
    }

    pub fn mark_player_processed(
        &mut self,
        tag: &PlayerTag,
        newly_collected: i32,
    ) -> Result<(), StorageError> {
        let now = Utc::now().naive_utc();
        diesel::update(players::table.filter(players::player_tag.eq(tag.as_str())))
            .set((
                players::battles_collected.eq(players::battles_collected + newly_collected),
                players::is_processed.eq(true),
                players::last_processed.eq(Some(now)),
            ))
            .execute(&mut self.conn)?;

        Ok(())
    }

    pub fn record_collection_stats(&mut self, report: &CycleReport) -> Result<(), StorageError> {
        let record = NewCollectionStats {
            date: report.date.naive_utc(),
            battles_collected: Some(report.battles_collected),
            players_processed: Some(report.players_processed),
            api_calls_made: Some(report.api_calls_made),
            errors_encountered: Some(report.errors_encountered),
            collection_time_minutes: Some(report.collection_time_minutes),
        };

        diesel::insert_into(collection_stats::table)
            .values(&record)
            .execute(&mut self.conn)?;

        Ok(())
    }

    pub fn database_stats(&mut self) -> Result<DatabaseStats, StorageError> {
        let battle_count: i64 = battles::table.count().get_result(&mut self.conn)?;
        let player_count: i64 = players::table.count().get_result(&mut self.conn)?;
        let earliest_battle: Option<NaiveDateTime> = battles::table
            .select(diesel::dsl::min(battles::battle_time))
            .first(&mut self.conn)?;
        let latest_battle: Option<NaiveDateTime> = battles::table
            .select(diesel::dsl::max(battles::battle_time))
            .first(&mut self.conn)?;

        Ok(DatabaseStats {
            battles: battle_count,
            players: player_count,
            earliest_battle,
            latest_battle,
        })
    }
}

#[derive(Debug)]
pub struct DatabaseStats {
    pub battles: i64,
    pub players: i64,
    pub earliest_battle: Option<NaiveDateTime>,
    pub latest_battle: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = battles)]
struct NewBattle<'a> {
    battle_id: &'a str,
    battle_time: NaiveDateTime,
    game_mode: &'a str,
    battle_type: Option<&'a str>,
    p1_tag: &'a str,
    p1_name: Option<&'a str>,
    p1_trophies: Option<i16>,
    p1_deck: Option<String>,
    p1_crowns: Option<i16>,
    p2_tag: &'a str,
    p2_name: Option<&'a str>,
    p2_trophies: Option<i16>,
    p2_deck: Option<String>,
    p2_crowns: Option<i16>,
    winner: Option<i16>,
    collected_at: NaiveDateTime,
}

impl<'a> NewBattle<'a> {
    fn from_battle(battle: &'a Battle) -> Self {
        let winner = battle.winner().map(|winner| match winner {
            Winner::Team => 1,
            Winner::Opponent => 2,
        });

        Self {
            battle_id: battle.id.as_str(),
            battle_time: battle.battle_time.naive_utc(),
            game_mode: battle.game_mode.as_str(),
            battle_type: battle.battle_type.as_deref(),
            p1_tag: battle.team.tag.as_str(),
            p1_name: Some(battle.team.name.as_str()),
            p1_trophies: stored_trophies(&battle.team),
            p1_deck: Some(stored_deck(&battle.team)),
            p1_crowns: Some(i16::from(battle.team.crowns)),
            p2_tag: battle.opponent.tag.as_str(),
            p2_name: Some(battle.opponent.name.as_str()),
            p2_trophies: stored_trophies(&battle.opponent),
            p2_deck: Some(stored_deck(&battle.opponent)),
            p2_crowns: Some(i16::from(battle.opponent.crowns)),
            winner,
            collected_at: Utc::now().naive_utc(),
        }
    }
}

fn stored_trophies(player: &BattlePlayer) -> Option<i16> {
    player.trophies.and_then(|trophies| i16::try_from(trophies).ok())
}

// Deck columns hold the card names as a JSON array string
fn stored_deck(player: &BattlePlayer) -> String {
    json::stringify(player.deck.clone())
}

#[derive(Insertable)]
#[diesel(table_name = players)]
struct NewPlayer<'a> {
    player_tag: &'a str,
    name: Option<&'a str>,
    trophies: Option<i32>,
    best_trophies: Option<i32>,
    wins: Option<i32>,
    losses: Option<i32>,
    last_seen: Option<NaiveDateTime>,
    battles_collected: i32,
    is_processed: bool,
    added_at: NaiveDateTime,
    last_processed: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = collection_stats)]
struct NewCollectionStats {
    date: NaiveDateTime,
    battles_collected: Option<i32>,
    players_processed: Option<i32>,
    api_calls_made: Option<i32>,
    errors_encountered: Option<i32>,
    collection_time_minutes: Option<i32>,
}

#[derive(Debug)]
pub enum StorageError {
    Connection(diesel::ConnectionError),
    Migration(String),
    Query(diesel::result::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageError::Connection(err) => write!(f, "Database connection failed: {}", err),
            StorageError::Migration(err) => write!(f, "Database migration failed: {}", err),
            StorageError::Query(err) => write!(f, "Database query failed: {}", err),
        }
    }
}

impl From<diesel::ConnectionError> for StorageError {
    fn from(error: diesel::ConnectionError) -> Self {
        Self::Connection(error)
    }
}

impl From<diesel::result::Error> for StorageError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Query(error)
    }
}
