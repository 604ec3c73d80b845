use std::fmt::Display;

/// Player tag in canonical form, always carrying the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerTag(String);

impl PlayerTag {
    pub fn new(raw: &str) -> Self {
        let stripped = raw.trim().trim_start_matches('#');
        PlayerTag(format!("#{}", stripped))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encoded form for use as a URL path segment.
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl Display for PlayerTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerTag {
    fn from(value: &str) -> Self {
        PlayerTag::new(value)
    }
}

impl From<String> for PlayerTag {
    fn from(value: String) -> Self {
        PlayerTag::new(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BattleId(String);

impl BattleId {
    /// Battle log entries carry no identifier of their own, so one is
    /// derived from the raw battle time and both player tags.
    pub fn from_parts(raw_battle_time: &str, team: &PlayerTag, opponent: &PlayerTag) -> Self {
        BattleId(format!("{}_{}_{}", raw_battle_time, team, opponent))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BattleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
