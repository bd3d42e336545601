use crate::Arbitrary;

/// one of the three playable kinds. capture follows the usual cycle,
/// Rock > Scissors > Paper > Rock, and equal kinds never capture.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Card {
    Rock,
    Paper,
    Scissors,
}

impl Card {
    /// would this card capture that one if they were adjacent?
    pub fn beats(&self, other: &Card) -> bool {
        matches!(
            (self, other),
            (Card::Rock, Card::Scissors)
                | (Card::Scissors, Card::Paper)
                | (Card::Paper, Card::Rock)
        )
    }
}

// u8 isomorphism
impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        match card {
            Card::Rock => 0,
            Card::Paper => 1,
            Card::Scissors => 2,
        }
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        match n % 3 {
            0 => Card::Rock,
            1 => Card::Paper,
            _ => Card::Scissors,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Card::Rock => write!(f, "R"),
            Card::Paper => write!(f, "P"),
            Card::Scissors => write!(f, "S"),
        }
    }
}

impl Arbitrary for Card {
    fn random() -> Self {
        use rand::Rng;
        Self::from(rand::rng().random_range(0..3u8))
    }
}
