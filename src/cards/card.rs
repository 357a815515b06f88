/// a Card is its position in a rank-major, suit-minor deck ordering.
/// for a deck with S suits, card n has rank n / S and suit n % S.
/// rank and suit counts live on the Game, so decoding takes the suit
/// count as an argument rather than baking in a 52-card deck.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub fn new(rank: u8, suit: u8, num_suits: u8) -> Self {
        Self(rank * num_suits + suit)
    }
    pub fn rank(&self, num_suits: u8) -> u8 {
        self.0 / num_suits
    }
    pub fn suit(&self, num_suits: u8) -> u8 {
        self.0 % num_suits
    }
}

/// u8 isomorphism
/// each card is its location in the sorted deck
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self(n)
    }
}
impl From<Card> for u8 {
    fn from(c: Card) -> Self {
        c.0
    }
}

/// u64 isomorphism
/// each card is one bit turned on, so unordered sets of cards OR together
impl From<Card> for u64 {
    fn from(c: Card) -> Self {
        1u64 << c.0
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
