use json::JsonValue;

use crate::model::{ids::PlayerTag, ranking::RankedPlayer};

use super::ParsingError;

pub fn parse_rankings(json: &JsonValue) -> Result<Vec<RankedPlayer>, ParsingError> {
    if let JsonValue::Array(items) = &json["items"] {
        let mut players = Vec::new();

        for entry in items {
            if let JsonValue::Object(obj) = entry {
                let tag = obj["tag"].as_str().ok_or(ParsingError::InvalidType("tag".into()))?;
                let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
                let trophies = obj["trophies"]
                    .as_i32()
                    .ok_or(ParsingError::InvalidType("trophies".into()))?;
                let rank = obj["rank"].as_i32().ok_or(ParsingError::InvalidType("rank".into()))?;

                players.push(RankedPlayer {
                    tag: PlayerTag::new(tag),
                    name: name.to_string(),
                    trophies,
                    rank,
                });
            } else {
                return Err(ParsingError::InvalidType("ranking entry".into()));
            }
        }

        return Ok(players);
    }

    Err(ParsingError::InvalidType("items".into()))
}
