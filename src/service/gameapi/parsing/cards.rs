use json::JsonValue;

use crate::model::card::Card;

use super::ParsingError;

pub fn parse_cards(json: &JsonValue) -> Result<Vec<Card>, ParsingError> {
    if let JsonValue::Array(items) = &json["items"] {
        let mut cards = Vec::new();

        for entry in items {
            if let JsonValue::Object(obj) = entry {
                let id = obj["id"].as_i64().ok_or(ParsingError::InvalidType("id".into()))?;
                let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
                let max_level = obj["maxLevel"]
                    .as_u8()
                    .ok_or(ParsingError::InvalidType("maxLevel".into()))?;
                let elixir = obj["elixirCost"].as_u8();

                cards.push(Card {
                    id,
                    name: name.to_string(),
                    max_level,
                    elixir,
                });
            } else {
                return Err(ParsingError::InvalidType("card entry".into()));
            }
        }

        return Ok(cards);
    }

    Err(ParsingError::InvalidType("items".into()))
}
