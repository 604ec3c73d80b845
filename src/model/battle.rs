use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::ids::{BattleId, PlayerTag};

#[derive(Debug, Clone)]
pub struct Battle {
    pub id: BattleId,
    pub battle_time: DateTime<Utc>,
    pub game_mode: String,
    pub battle_type: Option<String>,
    pub team: BattlePlayer,
    pub opponent: BattlePlayer,
}

#[derive(Debug, Clone)]
pub struct BattlePlayer {
    pub tag: PlayerTag,
    pub name: String,
    pub trophies: Option<i32>,
    pub deck: Vec<String>,
    pub crowns: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Team,
    Opponent,
}

impl Battle {
    /// Winner by crown count. A draw has no winner.
    pub fn winner(&self) -> Option<Winner> {
        match self.team.crowns.cmp(&self.opponent.crowns) {
            Ordering::Greater => Some(Winner::Team),
            Ordering::Less => Some(Winner::Opponent),
            Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn battle(team_crowns: u8, opponent_crowns: u8) -> Battle {
        let team_tag = PlayerTag::new("#AAA");
        let opponent_tag = PlayerTag::new("#BBB");
        Battle {
            id: BattleId::from_parts("20240301T101010.000Z", &team_tag, &opponent_tag),
            battle_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 10, 10).unwrap(),
            game_mode: "Ladder".to_string(),
            battle_type: Some("PvP".to_string()),
            team: BattlePlayer {
                tag: team_tag,
                name: "alice".to_string(),
                trophies: Some(6500),
                deck: vec!["Knight".to_string()],
                crowns: team_crowns,
            },
            opponent: BattlePlayer {
                tag: opponent_tag,
                name: "bob".to_string(),
                trophies: Some(6450),
                deck: vec!["Archers".to_string()],
                crowns: opponent_crowns,
            },
        }
    }

    #[test]
    fn winner_follows_crown_count() {
        assert_eq!(battle(3, 1).winner(), Some(Winner::Team));
        assert_eq!(battle(0, 2).winner(), Some(Winner::Opponent));
    }

    #[test]
    fn draw_has_no_winner() {
        assert_eq!(battle(1, 1).winner(), None);
    }
}
