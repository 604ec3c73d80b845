use super::ids::PlayerTag;

/// Single leaderboard entry for a location.
#[derive(Debug, Clone)]
pub struct RankedPlayer {
    pub tag: PlayerTag,
    pub name: String,
    pub trophies: i32,
    pub rank: i32,
}
