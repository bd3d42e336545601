use crate::game::player::Player;

/// placement of a hand card onto an empty square. the mover is carried
/// explicitly so apply() can reject out-of-turn placements.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Action {
    /// index into the mover's hand
    pub card: usize,
    /// board position, row-major
    pub square: usize,
    pub player: Player,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} hand[{}] -> square {}", self.player, self.card, self.square)
    }
}
