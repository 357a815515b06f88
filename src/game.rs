use crate::Chips;
use crate::cards::card::Card;
use serde::Deserialize;

/// Game describes the card space every component is built against:
/// how many ranks and suits the deck has, how many streets are played,
/// and how many board cards each street reveals. everything downstream
/// (board enumeration, bucket tables, strategy shapes) is sized from here.
///
/// unlike a fixed 52-card deck we keep these as runtime parameters so the
/// same tooling runs on toy games and full holdem alike.
#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    name: String,
    num_ranks: u8,
    num_suits: u8,
    max_street: usize,
    num_hole_cards: usize,
    /// board cards revealed on each street, index 0 ..= max_street.
    /// street 0 reveals none by construction.
    street_cards: Vec<usize>,
    stack_size: Chips,
}

impl Game {
    pub fn new(
        name: &str,
        num_ranks: u8,
        num_suits: u8,
        num_hole_cards: usize,
        street_cards: Vec<usize>,
        stack_size: Chips,
    ) -> Self {
        let game = Self {
            name: name.to_string(),
            num_ranks,
            num_suits,
            max_street: street_cards.len() - 1,
            num_hole_cards,
            street_cards,
            stack_size,
        };
        game.validate();
        game
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let game: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        game.validate();
        Ok(game)
    }

    /// constructed and deserialized games pass the same checks
    fn validate(&self) {
        assert!(self.num_ranks >= 1 && self.num_suits >= 1, "degenerate deck");
        assert!(
            self.street_cards.first() == Some(&0),
            "street 0 reveals no cards"
        );
        assert!(self.street_cards.iter().skip(1).all(|n| *n >= 1));
        assert!(self.num_hole_cards >= 1);
        assert!(self.street_cards.len() == self.max_street + 1);
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn num_ranks(&self) -> u8 {
        self.num_ranks
    }
    pub fn num_suits(&self) -> u8 {
        self.num_suits
    }
    pub fn max_street(&self) -> usize {
        self.max_street
    }
    pub fn num_hole_cards(&self) -> usize {
        self.num_hole_cards
    }
    pub fn stack_size(&self) -> Chips {
        self.stack_size
    }
    pub fn deck_size(&self) -> usize {
        self.num_ranks as usize * self.num_suits as usize
    }
    pub fn deck(&self) -> impl Iterator<Item = Card> + '_ {
        (0..self.deck_size() as u8).map(Card::from)
    }

    /// cards revealed on this street alone
    pub fn num_cards_for_street(&self, street: usize) -> usize {
        self.street_cards[street]
    }
    /// cumulative board size at this street
    pub fn num_board_cards(&self, street: usize) -> usize {
        self.street_cards[..=street].iter().sum()
    }
    /// distinct hole card sets once this street's board is dealt
    pub fn num_hole_card_pairs(&self, street: usize) -> usize {
        let n = self.deck_size() - self.num_board_cards(street);
        let k = self.num_hole_cards;
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Game {
        Game::new("toy", 3, 2, 1, vec![0, 1], 100)
    }

    #[test]
    fn deck_arithmetic() {
        let game = toy();
        assert!(game.deck_size() == 6);
        assert!(game.num_board_cards(0) == 0);
        assert!(game.num_board_cards(1) == 1);
        assert!(game.num_hole_card_pairs(0) == 6);
        assert!(game.num_hole_card_pairs(1) == 5);
    }

    #[test]
    fn loads_a_wellformed_config() {
        let path = std::env::temp_dir().join("endgame_game_ok.json");
        let json = r#"{"name":"toy","num_ranks":3,"num_suits":2,"max_street":1,
            "num_hole_cards":1,"street_cards":[0,1],"stack_size":100}"#;
        std::fs::write(&path, json).unwrap();
        let game = Game::load(path.to_str().unwrap()).unwrap();
        assert!(game.deck_size() == 6);
    }

    #[test]
    #[should_panic]
    fn malformed_config_is_rejected_at_load() {
        let path = std::env::temp_dir().join("endgame_game_bad.json");
        let json = r#"{"name":"bad","num_ranks":3,"num_suits":2,"max_street":1,
            "num_hole_cards":1,"street_cards":[1,1],"stack_size":100}"#;
        std::fs::write(&path, json).unwrap();
        let _ = Game::load(path.to_str().unwrap());
    }

    #[test]
    fn holdem_shape() {
        let game = Game::new("holdem", 13, 4, 2, vec![0, 3, 1, 1], 200);
        assert!(game.max_street() == 3);
        assert!(game.num_board_cards(3) == 5);
        assert!(game.num_hole_card_pairs(0) == 52 * 51 / 2);
        assert!(game.num_hole_card_pairs(3) == 47 * 46 / 2);
    }
}
