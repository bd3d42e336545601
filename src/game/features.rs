use crate::game::game::Game;
use crate::game::player::Player;
use crate::CHANNELS;
use crate::FEATURES;
use crate::SQUARES;

// one-hot channel layout per square. channels 7 and 8 are reserved and
// always zero, preserving the 81-length contract.
const EMPTY: usize = 0;
const P1_BASE: usize = 1;
const P2_BASE: usize = 4;

impl Game {
    /// encode the position as 9 squares x 9 one-hot channels. exactly one
    /// channel per square is hot; the networks never see hands or round.
    pub fn features(&self) -> [f32; FEATURES] {
        let mut features = [0f32; FEATURES];
        for square in 0..SQUARES {
            let channel = match self.board().get(square) {
                None => EMPTY,
                Some(slot) => {
                    let base = match slot.owner {
                        Player::P1 => P1_BASE,
                        Player::P2 => P2_BASE,
                    };
                    base + u8::from(slot.card) as usize
                }
            };
            features[square * CHANNELS + channel] = 1.0;
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;
    use crate::game::card::Card;
    use crate::game::hand::Hand;
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    #[test]
    fn one_hot_per_square() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let mut game = Game::root(rng);
        loop {
            let features = game.features();
            assert!(features.iter().filter(|&&x| x == 1.0).count() == SQUARES);
            assert!(features.iter().filter(|&&x| x == 0.0).count() == FEATURES - SQUARES);
            for square in 0..SQUARES {
                let hot = features[square * CHANNELS..(square + 1) * CHANNELS]
                    .iter()
                    .filter(|&&x| x == 1.0)
                    .count();
                assert!(hot == 1);
            }
            if game.is_terminal() {
                break;
            }
            game = game.apply(game.random(rng).unwrap()).unwrap();
        }
    }

    #[test]
    fn channels_identify_owner_and_kind() {
        let mut board = Board::default();
        board.place(0, Card::Rock, Player::P1);
        board.place(8, Card::Scissors, Player::P2);
        let game = Game::with(board, [Hand::default(), Hand::default()], Player::P1, 1);
        let features = game.features();
        assert!(features[0 * CHANNELS + 1] == 1.0); // P1 rock
        assert!(features[8 * CHANNELS + 6] == 1.0); // P2 scissors
        assert!(features[1 * CHANNELS + 0] == 1.0); // empty square
    }

    #[test]
    fn reserved_channels_stay_zero() {
        let ref mut rng = SmallRng::seed_from_u64(6);
        for _ in 0..16 {
            let mut game = Game::root(rng);
            while !game.is_terminal() && rng.random::<f32>() < 0.8 {
                game = game.apply(game.random(rng).unwrap()).unwrap();
            }
            let features = game.features();
            for square in 0..SQUARES {
                assert!(features[square * CHANNELS + 7] == 0.0);
                assert!(features[square * CHANNELS + 8] == 0.0);
            }
        }
    }
}
