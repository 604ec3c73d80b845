use chrono::{DateTime, NaiveDateTime, Utc};
use json::{object::Object, JsonValue};

use crate::model::{
    battle::{Battle, BattlePlayer},
    ids::{BattleId, PlayerTag},
};

use super::ParsingError;

const BATTLE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

pub fn parse_battles(json: &JsonValue) -> Result<Vec<Battle>, ParsingError> {
    if let JsonValue::Array(array) = json {
        let mut battles = Vec::new();

        for entry in array {
            if let JsonValue::Object(obj) = entry {
                let battle_opt = parse_battle_obj(obj)?;
                if let Some(battle) = battle_opt {
                    battles.push(battle);
                }
            } else {
                return Err(ParsingError::InvalidType("battle entry".into()));
            }
        }

        return Ok(battles);
    }

    Err(ParsingError::InvalidType("root".into()))
}

fn parse_battle_obj(obj: &Object) -> Result<Option<Battle>, ParsingError> {
    let raw_time = obj["battleTime"]
        .as_str()
        .ok_or(ParsingError::InvalidType("battleTime".into()))?;
    let naive = NaiveDateTime::parse_from_str(raw_time, BATTLE_TIME_FORMAT)
        .map_err(|_| ParsingError::InvalidType(format!("battleTime '{}'", raw_time)))?;
    let battle_time = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);

    let game_mode = obj["gameMode"]["name"]
        .as_str()
        .ok_or(ParsingError::InvalidType("gameMode".into()))?;
    let battle_type = obj["type"].as_str().map(str::to_string);

    // Sides without any member (boat battles, stale entries) are skipped
    let team = match parse_battle_player(&obj["team"])? {
        Some(player) => player,
        None => return Ok(None),
    };
    let opponent = match parse_battle_player(&obj["opponent"])? {
        Some(player) => player,
        None => return Ok(None),
    };

    let id = BattleId::from_parts(raw_time, &team.tag, &opponent.tag);
    Ok(Some(Battle {
        id,
        battle_time,
        game_mode: game_mode.to_string(),
        battle_type,
        team,
        opponent,
    }))
}

fn parse_battle_player(side: &JsonValue) -> Result<Option<BattlePlayer>, ParsingError> {
    if let JsonValue::Array(members) = side {
        let member = match members.first() {
            Some(member) => member,
            None => return Ok(None),
        };

        if let JsonValue::Object(obj) = member {
            let tag = obj["tag"].as_str().ok_or(ParsingError::InvalidType("tag".into()))?;
            let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
            let trophies = obj["startingTrophies"].as_i32();
            let crowns = obj["crowns"]
                .as_u8()
                .ok_or(ParsingError::InvalidType("crowns".into()))?;

            let mut deck = Vec::new();
            for card in obj["cards"].members() {
                let card_name = card["name"]
                    .as_str()
                    .ok_or(ParsingError::InvalidType("card name".into()))?;
                deck.push(card_name.to_string());
            }

            return Ok(Some(BattlePlayer {
                tag: PlayerTag::new(tag),
                name: name.to_string(),
                trophies,
                deck,
                crowns,
            }));
        }

        return Err(ParsingError::InvalidType("side member".into()));
    }

    Err(ParsingError::InvalidType("side".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATTLE_LOG: &str = r##"[
        {
            "type": "PvP",
            "battleTime": "20240301T101010.000Z",
            "gameMode": {"id": 72000006, "name": "Ladder"},
            "team": [{
                "tag": "#AAA",
                "name": "alice",
                "startingTrophies": 6500,
                "crowns": 2,
                "cards": [{"name": "Knight"}, {"name": "Archers"}]
            }],
            "opponent": [{
                "tag": "#BBB",
                "name": "bob",
                "startingTrophies": 6480,
                "crowns": 1,
                "cards": [{"name": "Giant"}]
            }]
        }
    ]"##;

    #[test]
    fn parses_a_battle_log() {
        let payload = json::parse(BATTLE_LOG).unwrap();
        let battles = parse_battles(&payload).unwrap();

        assert_eq!(battles.len(), 1);
        let battle = &battles[0];
        assert_eq!(battle.game_mode, "Ladder");
        assert_eq!(battle.battle_type.as_deref(), Some("PvP"));
        assert_eq!(battle.team.deck, vec!["Knight", "Archers"]);
        assert_eq!(battle.opponent.crowns, 1);
        assert_eq!(battle.id.as_str(), "20240301T101010.000Z_#AAA_#BBB");
        assert_eq!(
            battle.battle_time.to_rfc3339(),
            "2024-03-01T10:10:10+00:00"
        );
    }

    #[test]
    fn object_root_is_an_error() {
        let payload = json::parse(r#"{"reason": "notFound"}"#).unwrap();
        assert!(parse_battles(&payload).is_err());
    }

    #[test]
    fn entry_without_members_is_skipped() {
        let payload = json::parse(
            r#"[{
                "battleTime": "20240301T101010.000Z",
                "gameMode": {"name": "Boat Battle"},
                "team": [],
                "opponent": []
            }]"#,
        )
        .unwrap();

        let battles = parse_battles(&payload).unwrap();
        assert!(battles.is_empty());
    }

    #[test]
    fn empty_log_parses_to_nothing() {
        let payload = json::parse("[]").unwrap();
        assert!(parse_battles(&payload).unwrap().is_empty());
    }
}
