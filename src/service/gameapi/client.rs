use std::{
    cell::{Cell, RefCell},
    fmt, thread,
    time::Duration,
};

use json::JsonValue;
use reqwest::{
    blocking::{Client, Response},
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue, RETRY_AFTER},
    StatusCode,
};
use tracing::{debug, info, warn};

use crate::model::{battle::Battle, card::Card, ids::PlayerTag, player::Player};
use crate::service::config::Config;

use super::{
    parsing::{
        battles::parse_battles, cards::parse_cards, player::parse_player,
        rankings::parse_rankings,
    },
    rate_limiter::RateLimiter,
};

const MAX_REQUESTS_PER_SECOND: usize = 10;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);
const MAINTENANCE_BACKOFF: Duration = Duration::from_secs(300);
const TRANSPORT_BACKOFF_STEP: Duration = Duration::from_secs(5);

pub struct ApiClient {
    client: Client,
    base_url: String,
    max_retries: usize,
    rate_limiter: RefCell<RateLimiter>,
    total_requests: Cell<u64>,
    failed_requests: Cell<u64>,
    rate_limit_hits: Cell<u64>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ClientInitError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", config.api_token))?;
        auth_value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            max_retries: config.max_retries,
            rate_limiter: RefCell::new(RateLimiter::new(MAX_REQUESTS_PER_SECOND)),
            total_requests: Cell::new(0),
            failed_requests: Cell::new(0),
            rate_limit_hits: Cell::new(0),
        })
    }

    /// Issues a GET for the given request, retrying within the configured
    /// attempt budget. Request-level failures never surface as errors; they
    /// are absorbed into the counters and the returned outcome.
    pub fn request(&self, request: &ApiRequest) -> FetchOutcome {
        let url = format!("{}{}", self.base_url, request.path());

        for attempt in 0..self.max_retries {
            self.rate_limiter.borrow_mut().wait_if_needed();

            let response = match self.client.get(&url).send() {
                Ok(response) => response,
                Err(err) => {
                    let backoff = TRANSPORT_BACKOFF_STEP * (attempt as u32 + 1);
                    warn!(
                        attempt = attempt + 1,
                        backoff_secs = backoff.as_secs(),
                        error = %err,
                        "transport error, backing off"
                    );
                    thread::sleep(backoff);
                    continue;
                }
            };

            self.total_requests.set(self.total_requests.get() + 1);

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            match classify_status(response.status(), retry_after.as_deref()) {
                StatusAction::Success => match read_payload(response) {
                    Ok(payload) => return FetchOutcome::Payload(payload),
                    Err(err) => {
                        self.failed_requests.set(self.failed_requests.get() + 1);
                        warn!(attempt = attempt + 1, error = ?err, "unreadable payload");
                    }
                },
                StatusAction::NotFound => return FetchOutcome::Absent,
                StatusAction::RateLimited(delay) => {
                    self.rate_limit_hits.set(self.rate_limit_hits.get() + 1);
                    warn!(delay_secs = delay.as_secs(), "rate limited, waiting");
                    thread::sleep(delay);
                }
                StatusAction::Maintenance => {
                    warn!(
                        delay_secs = MAINTENANCE_BACKOFF.as_secs(),
                        "API maintenance, waiting"
                    );
                    thread::sleep(MAINTENANCE_BACKOFF);
                }
                StatusAction::Failed(status) => {
                    self.failed_requests.set(self.failed_requests.get() + 1);
                    warn!(status = status.as_u16(), "unexpected API response");
                }
            }
        }

        self.failed_requests.set(self.failed_requests.get() + 1);
        FetchOutcome::Exhausted
    }

    /// Tags of the top players on a location's leaderboard, empty on any
    /// failure.
    pub fn get_top_players(&self, location: &str, limit: u32) -> Vec<PlayerTag> {
        let request = ApiRequest::TopPlayers {
            location: location.to_string(),
            limit,
        };

        match self.request(&request) {
            FetchOutcome::Payload(payload) => match parse_rankings(&payload) {
                Ok(players) => {
                    if let (Some(first), Some(last)) = (players.first(), players.last()) {
                        debug!(
                            top = %first.name,
                            top_trophies = first.trophies,
                            cutoff_rank = last.rank,
                            "leaderboard fetched"
                        );
                    }
                    players.into_iter().map(|player| player.tag).collect()
                }
                Err(err) => {
                    warn!(error = ?err, "leaderboard payload did not decode");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    pub fn get_player_info(&self, tag: &PlayerTag) -> Option<Player> {
        match self.request(&ApiRequest::PlayerInfo(tag.clone())) {
            FetchOutcome::Payload(payload) => match parse_player(&payload) {
                Ok(player) => Some(player),
                Err(err) => {
                    warn!(%tag, error = ?err, "player payload did not decode");
                    None
                }
            },
            _ => None,
        }
    }

    /// Recent battles of a player. A payload that is not a battle list
    /// decodes to an empty log.
    pub fn get_player_battles(&self, tag: &PlayerTag) -> Vec<Battle> {
        match self.request(&ApiRequest::BattleLog(tag.clone())) {
            FetchOutcome::Payload(payload) => match parse_battles(&payload) {
                Ok(battles) => battles,
                Err(err) => {
                    warn!(%tag, error = ?err, "battle log payload did not decode");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    pub fn get_cards(&self) -> Vec<Card> {
        match self.request(&ApiRequest::Cards) {
            FetchOutcome::Payload(payload) => match parse_cards(&payload) {
                Ok(cards) => cards,
                Err(err) => {
                    warn!(error = ?err, "card catalog payload did not decode");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    pub fn get_api_stats(&self) -> ApiStats {
        ApiStats {
            total_requests: self.total_requests.get(),
            failed_requests: self.failed_requests.get(),
            rate_limit_hits: self.rate_limit_hits.get(),
        }
    }

    /// Connection check against the global leaderboard.
    pub fn test_connection(&self) -> bool {
        let players = self.get_top_players("global", 5);
        let stats = self.get_api_stats();

        if players.is_empty() {
            warn!(
                total = stats.total_requests,
                failed = stats.failed_requests,
                "API connection check failed"
            );
            return false;
        }

        info!(
            players = players.len(),
            total = stats.total_requests,
            rate_limit_hits = stats.rate_limit_hits,
            success_rate = stats.success_rate(),
            "API connection verified"
        );
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    TopPlayers { location: String, limit: u32 },
    PlayerInfo(PlayerTag),
    BattleLog(PlayerTag),
    Cards,
}

impl ApiRequest {
    fn path(&self) -> String {
        match self {
            ApiRequest::TopPlayers { location, limit } => {
                let mut path = format!("/locations/{}/rankings/players", location);
                if *limit > 0 {
                    path.push_str(&format!("?limit={}", limit));
                }
                path
            }
            ApiRequest::PlayerInfo(tag) => format!("/players/{}", tag.encoded()),
            ApiRequest::BattleLog(tag) => format!("/players/{}/battlelog", tag.encoded()),
            ApiRequest::Cards => "/cards".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Payload(JsonValue),
    /// The resource does not exist (404); a terminal result, not a failure.
    Absent,
    /// The attempt budget ran out without a usable response.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
pub struct ApiStats {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub rate_limit_hits: u64,
}

impl ApiStats {
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests.max(1) as f64;
        (self.total_requests as f64 - self.failed_requests as f64) / total * 100.0
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StatusAction {
    Success,
    NotFound,
    RateLimited(Duration),
    Maintenance,
    Failed(StatusCode),
}

fn classify_status(status: StatusCode, retry_after: Option<&str>) -> StatusAction {
    match status.as_u16() {
        200 => StatusAction::Success,
        429 => StatusAction::RateLimited(parse_retry_after(retry_after)),
        404 => StatusAction::NotFound,
        503 => StatusAction::Maintenance,
        _ => StatusAction::Failed(status),
    }
}

fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[derive(Debug)]
enum PayloadError {
    Body(reqwest::Error),
    Parse(json::Error),
}

fn read_payload(response: Response) -> Result<JsonValue, PayloadError> {
    let text = response.text().map_err(PayloadError::Body)?;
    json::parse(&text).map_err(PayloadError::Parse)
}

#[derive(Debug)]
pub enum ClientInitError {
    InvalidAuthHeader(InvalidHeaderValue),
    ClientError(reqwest::Error),
}

impl fmt::Display for ClientInitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientInitError::InvalidAuthHeader(err) => {
                write!(f, "API token is not a valid header value: {}", err)
            }
            ClientInitError::ClientError(err) => write!(f, "Failed to create HTTP client: {}", err),
        }
    }
}

impl From<InvalidHeaderValue> for ClientInitError {
    fn from(error: InvalidHeaderValue) -> Self {
        Self::InvalidAuthHeader(error)
    }
}

impl From<reqwest::Error> for ClientInitError {
    fn from(error: reqwest::Error) -> Self {
        Self::ClientError(error)
    }
}
