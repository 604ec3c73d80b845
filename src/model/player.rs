use super::ids::PlayerTag;

#[derive(Debug, Clone)]
pub struct Player {
    pub tag: PlayerTag,
    pub name: String,
    pub trophies: i32,
    pub best_trophies: i32,
    pub wins: i32,
    pub losses: i32,
}
