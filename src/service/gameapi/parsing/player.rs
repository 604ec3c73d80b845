use json::JsonValue;

use crate::model::{ids::PlayerTag, player::Player};

use super::ParsingError;

pub fn parse_player(json: &JsonValue) -> Result<Player, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let tag = obj["tag"].as_str().ok_or(ParsingError::InvalidType("tag".into()))?;
        let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
        let trophies = obj["trophies"]
            .as_i32()
            .ok_or(ParsingError::InvalidType("trophies".into()))?;
        let best_trophies = obj["bestTrophies"]
            .as_i32()
            .ok_or(ParsingError::InvalidType("bestTrophies".into()))?;
        let wins = obj["wins"].as_i32().ok_or(ParsingError::InvalidType("wins".into()))?;
        let losses = obj["losses"]
            .as_i32()
            .ok_or(ParsingError::InvalidType("losses".into()))?;

        return Ok(Player {
            tag: PlayerTag::new(tag),
            name: name.to_string(),
            trophies,
            best_trophies,
            wins,
            losses,
        });
    }

    Err(ParsingError::InvalidType("root".into()))
}
