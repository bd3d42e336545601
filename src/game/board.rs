use crate::game::card::Card;
use crate::game::player::Player;
use crate::COLS;
use crate::SQUARES;

/// a single occupied square. occupancy and ownership are inseparable
/// by construction, so owner = None iff the square is empty.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Slot {
    pub card: Card,
    pub owner: Player,
}

/// the 3x3 grid, row-major from the top-left.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Board([Option<Slot>; SQUARES]);

impl Board {
    pub fn get(&self, square: usize) -> Option<&Slot> {
        self.0[square].as_ref()
    }
    pub fn is_empty(&self, square: usize) -> bool {
        self.0[square].is_none()
    }
    pub fn is_full(&self) -> bool {
        self.0.iter().all(|slot| slot.is_some())
    }
    /// indices of empty squares, ascending
    pub fn empties(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(square, _)| square)
    }
    /// how many squares this player owns
    pub fn count(&self, owner: Player) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|slot| slot.owner == owner)
            .count()
    }
    /// how many squares are occupied at all
    pub fn placed(&self) -> usize {
        self.0.iter().flatten().count()
    }
    /// put a card on an empty square. callers validate emptiness.
    pub fn place(&mut self, square: usize, card: Card, owner: Player) {
        debug_assert!(self.is_empty(square));
        self.0[square] = Some(Slot { card, owner });
    }
    /// flip ownership of an occupied square. the kind never changes.
    pub fn capture(&mut self, square: usize, owner: Player) {
        if let Some(slot) = self.0[square].as_mut() {
            slot.owner = owner;
        }
    }
    /// the up-to-four orthogonal neighbors. no diagonals, no wraparound.
    pub fn neighbors(square: usize) -> Vec<usize> {
        let row = square / COLS;
        let col = square % COLS;
        let mut adjacent = Vec::with_capacity(4);
        if row > 0 {
            adjacent.push(square - COLS);
        }
        if row < COLS - 1 {
            adjacent.push(square + COLS);
        }
        if col > 0 {
            adjacent.push(square - 1);
        }
        if col < COLS - 1 {
            adjacent.push(square + 1);
        }
        adjacent
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in 0..COLS {
            for col in 0..COLS {
                match self.get(row * COLS + col) {
                    Some(slot) => write!(f, " {}{}", slot.card, slot.owner)?,
                    None => write!(f, " ..")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_edge_center_adjacency() {
        assert!(Board::neighbors(0) == vec![3, 1]);
        assert!(Board::neighbors(1) == vec![4, 0, 2]);
        assert!(Board::neighbors(4) == vec![1, 7, 3, 5]);
        assert!(Board::neighbors(8) == vec![5, 7]);
    }

    #[test]
    fn capture_preserves_kind() {
        let mut board = Board::default();
        board.place(4, Card::Rock, Player::P2);
        board.capture(4, Player::P1);
        let slot = board.get(4).unwrap();
        assert!(slot.card == Card::Rock);
        assert!(slot.owner == Player::P1);
    }

    #[test]
    fn empties_ascend() {
        let mut board = Board::default();
        board.place(4, Card::Paper, Player::P1);
        board.place(0, Card::Rock, Player::P2);
        assert!(board.empties().collect::<Vec<_>>() == vec![1, 2, 3, 5, 6, 7, 8]);
    }
}
