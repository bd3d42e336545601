use crate::game::card::Card;
use rand::Rng;

/// the multiset of cards a player may still place. construction draws
/// uniformly with replacement; plays consume entries by index.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
pub struct Hand(Vec<Card>);

impl Hand {
    pub fn deal<R: Rng>(rng: &mut R, n: usize) -> Self {
        Self((0..n).map(|_| Card::from(rng.random_range(0..3u8))).collect())
    }
    pub fn get(&self, index: usize) -> Option<Card> {
        self.0.get(index).copied()
    }
    /// consume a card by index. callers validate bounds.
    pub fn remove(&mut self, index: usize) -> Card {
        self.0.remove(index)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in self.cards() {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn deal_fills_to_size() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let hand = Hand::deal(rng, 5);
        assert!(hand.len() == 5);
    }

    #[test]
    fn remove_consumes_in_place() {
        let mut hand = Hand::from(vec![Card::Rock, Card::Paper, Card::Scissors]);
        assert!(hand.remove(1) == Card::Paper);
        assert!(hand.cards() == &[Card::Rock, Card::Scissors]);
    }
}
