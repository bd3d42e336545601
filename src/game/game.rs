use crate::error::Error;
use crate::error::Result;
use crate::game::action::Action;
use crate::game::board::Board;
use crate::game::hand::Hand;
use crate::game::player::Player;
use crate::DECK_SIZE;
use crate::HAND_SIZE;
use crate::MAX_ROUNDS;
use crate::SQUARES;
use rand::Rng;

/// per-game rule constants. one round is a full turn of both players.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Rules {
    pub hand: usize,
    pub deck: usize,
    pub rounds: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            hand: HAND_SIZE,
            deck: DECK_SIZE,
            rounds: MAX_ROUNDS,
        }
    }
}

/// complete game state. apply() yields a fresh copy, so tree nodes can
/// snapshot states without ever sharing mutation.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Game {
    board: Board,
    hands: [Hand; 2],
    turn: Player,
    round: usize,
    rules: Rules,
}

impl Game {
    /// fresh game with both hands drawn uniformly with replacement
    pub fn new<R: Rng>(rng: &mut R, rules: Rules) -> Self {
        Self {
            board: Board::default(),
            hands: [Hand::deal(rng, rules.hand), Hand::deal(rng, rules.hand)],
            turn: Player::P1,
            round: 1,
            rules,
        }
    }
    /// fresh game under default rules
    pub fn root<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng, Rules::default())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn hand(&self, player: Player) -> &Hand {
        &self.hands[player.index()]
    }
    pub fn turn(&self) -> Player {
        self.turn
    }
    pub fn round(&self) -> usize {
        self.round
    }
    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// every legal placement for the player to move, hand-index-major
    /// and position-minor, so move generation is deterministic
    pub fn options(&self) -> Vec<Action> {
        (0..self.hand(self.turn).len())
            .flat_map(|card| {
                self.board.empties().map(move |square| Action {
                    card,
                    square,
                    player: self.turn,
                })
            })
            .collect()
    }

    /// place, resolve captures, consume the hand card, pass the turn.
    /// only the freshly placed card triggers captures, captured cards
    /// never chain, and the placed card is immune this turn.
    pub fn apply(&self, action: Action) -> Result<Game> {
        if action.player != self.turn
            || action.square >= SQUARES
            || !self.board.is_empty(action.square)
            || self.hand(self.turn).get(action.card).is_none()
        {
            return Err(Error::IllegalMove(action));
        }
        let mut next = self.clone();
        let card = next.hands[self.turn.index()].remove(action.card);
        next.board.place(action.square, card, self.turn);
        for neighbor in Board::neighbors(action.square) {
            if let Some(slot) = next.board.get(neighbor) {
                if slot.owner != self.turn && card.beats(&slot.card) {
                    next.board.capture(neighbor, self.turn);
                }
            }
        }
        next.turn = self.turn.opponent();
        if self.turn == Player::P2 {
            next.round += 1;
        }
        Ok(next)
    }

    /// the game ends when the mover is out of cards, the board is full,
    /// or the round cap is exceeded
    pub fn is_terminal(&self) -> bool {
        self.hand(self.turn).is_empty() || self.board.is_full() || self.round > self.rules.rounds
    }

    /// majority owner of the board; equal counts are a draw
    pub fn winner(&self) -> Option<Player> {
        let p1 = self.board.count(Player::P1);
        let p2 = self.board.count(Player::P2);
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Some(Player::P1),
            std::cmp::Ordering::Less => Some(Player::P2),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// uniformly random legal move
    pub fn random<R: Rng>(&self, rng: &mut R) -> Result<Action> {
        let mut options = self.options();
        match options.len() {
            0 => Err(Error::NoMoves),
            n => Ok(options.remove(rng.random_range(0..n))),
        }
    }

    /// assemble an arbitrary position. test-only: live states only ever
    /// come out of new() and apply().
    #[cfg(test)]
    pub(crate) fn with(board: Board, hands: [Hand; 2], turn: Player, round: usize) -> Self {
        Self {
            board,
            hands,
            turn,
            round,
            rules: Rules::default(),
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "round {} of {}, {} to move", self.round, self.rules.rounds, self.turn)?;
        write!(f, "{}", self.board)?;
        writeln!(f, "P1: {}", self.hand(Player::P1))?;
        writeln!(f, "P2: {}", self.hand(Player::P2))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::Card;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn fixture(slots: &[(usize, Card, Player)], hands: [Vec<Card>; 2], turn: Player) -> Game {
        let mut board = Board::default();
        for &(square, card, owner) in slots {
            board.place(square, card, owner);
        }
        let [p1, p2] = hands;
        Game::with(board, [Hand::from(p1), Hand::from(p2)], turn, 1)
    }

    #[test]
    fn paper_captures_adjacent_rock() {
        let game = fixture(
            &[(4, Card::Rock, Player::P2)],
            [vec![Card::Paper], vec![Card::Rock]],
            Player::P1,
        );
        let next = game
            .apply(Action { card: 0, square: 3, player: Player::P1 })
            .unwrap();
        let placed = next.board().get(3).unwrap();
        let flipped = next.board().get(4).unwrap();
        assert!(placed.card == Card::Paper && placed.owner == Player::P1);
        assert!(flipped.card == Card::Rock && flipped.owner == Player::P1);
        assert!(next.hand(Player::P1).is_empty());
        assert!(next.turn() == Player::P2);
    }

    #[test]
    fn no_diagonal_capture() {
        let game = fixture(
            &[(0, Card::Rock, Player::P2)],
            [vec![Card::Paper], vec![Card::Rock]],
            Player::P1,
        );
        let next = game
            .apply(Action { card: 0, square: 4, player: Player::P1 })
            .unwrap();
        assert!(next.board().get(0).unwrap().owner == Player::P2);
    }

    #[test]
    fn equal_kinds_do_not_capture() {
        let game = fixture(
            &[(4, Card::Paper, Player::P2)],
            [vec![Card::Paper], vec![Card::Rock]],
            Player::P1,
        );
        let next = game
            .apply(Action { card: 0, square: 3, player: Player::P1 })
            .unwrap();
        assert!(next.board().get(4).unwrap().owner == Player::P2);
    }

    #[test]
    fn captures_do_not_chain() {
        // rock at 4 captures the scissors at 1; the rock at 0 stays P2
        // even though the freshly flipped card at 1 would beat it
        let game = fixture(
            &[(0, Card::Rock, Player::P2), (1, Card::Scissors, Player::P2)],
            [vec![Card::Rock], vec![Card::Rock]],
            Player::P1,
        );
        let next = game
            .apply(Action { card: 0, square: 4, player: Player::P1 })
            .unwrap();
        assert!(next.board().get(1).unwrap().owner == Player::P1);
        assert!(next.board().get(0).unwrap().owner == Player::P2);
    }

    #[test]
    fn exhausted_hands_terminate_and_majority_wins() {
        let game = fixture(
            &[
                (0, Card::Rock, Player::P1),
                (1, Card::Paper, Player::P1),
                (2, Card::Scissors, Player::P2),
            ],
            [vec![], vec![]],
            Player::P1,
        );
        assert!(game.is_terminal());
        assert!(game.winner() == Some(Player::P1));
    }

    #[test]
    fn placed_card_is_immune_to_present_neighbors() {
        // a P2 paper sits at 3; P1 places rock at 4. paper beats rock,
        // but only the placed card triggers, so the rock stays P1's.
        let game = fixture(
            &[(3, Card::Paper, Player::P2)],
            [vec![Card::Rock], vec![Card::Rock]],
            Player::P1,
        );
        let next = game
            .apply(Action { card: 0, square: 4, player: Player::P1 })
            .unwrap();
        assert!(next.board().get(4).unwrap().owner == Player::P1);
    }

    #[test]
    fn every_option_applies_and_nothing_else_does() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let game = Game::root(rng);
        for action in game.options() {
            assert!(game.apply(action).is_ok());
        }
        let occupied = game
            .apply(game.options()[0])
            .unwrap()
            .apply(Action { card: 0, square: game.options()[0].square, player: Player::P2 });
        assert!(matches!(occupied, Err(Error::IllegalMove(_))));
        let wrong_seat = game.apply(Action { card: 0, square: 0, player: Player::P2 });
        assert!(matches!(wrong_seat, Err(Error::IllegalMove(_))));
        let bad_index = game.apply(Action { card: 99, square: 0, player: Player::P1 });
        assert!(matches!(bad_index, Err(Error::IllegalMove(_))));
    }

    #[test]
    fn games_terminate_within_two_hands_of_moves() {
        for seed in 0..32 {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            let mut game = Game::root(rng);
            let mut moves = 0;
            while !game.is_terminal() {
                game = game.apply(game.random(rng).unwrap()).unwrap();
                moves += 1;
                assert!(moves <= 2 * HAND_SIZE);
                assert!(game.board().placed() == moves);
            }
        }
    }

    #[test]
    fn apply_touches_only_the_placement_and_neighbors() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let game = Game::root(rng);
        let action = game.options()[0];
        let next = game.apply(action).unwrap();
        let adjacent = Board::neighbors(action.square);
        for square in 0..SQUARES {
            if square == action.square || adjacent.contains(&square) {
                // kinds never change even where owners might
                if let (Some(before), Some(after)) =
                    (game.board().get(square), next.board().get(square))
                {
                    assert!(before.card == after.card);
                }
            } else {
                assert!(game.board().get(square) == next.board().get(square));
            }
        }
    }

    #[test]
    fn round_increments_after_second_seat_moves() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let game = Game::root(rng);
        let after_p1 = game.apply(game.options()[0]).unwrap();
        assert!(after_p1.round() == 1);
        let after_p2 = after_p1.apply(after_p1.options()[0]).unwrap();
        assert!(after_p2.round() == 2);
    }

    #[test]
    fn fresh_games_respect_their_rules() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let game = Game::root(rng);
        assert!(game.hand(Player::P1).len() == game.rules().hand);
        assert!(game.hand(Player::P2).len() == game.rules().hand);
        assert!(game.hand(Player::P1).len() + game.hand(Player::P2).len() <= game.rules().deck);
        assert!(game.round() == 1);
        assert!(!game.is_terminal());
    }

    #[test]
    fn random_move_on_dead_position_is_no_moves() {
        let game = fixture(&[], [vec![], vec![]], Player::P1);
        let ref mut rng = SmallRng::seed_from_u64(4);
        assert!(matches!(game.random(rng), Err(Error::NoMoves)));
    }
}
