#[derive(Debug, Clone)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub max_level: u8,
    pub elixir: Option<u8>,
}
