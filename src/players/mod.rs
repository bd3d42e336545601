pub mod mcts;
pub mod random;

use crate::error::Result;
use crate::game::action::Action;
use crate::game::game::Game;

/// the closed seam for move selection: anything that can pick a legal
/// move for the position in front of it. the engine ships the search
/// agent and a uniform baseline; external evaluators slot in through
/// the Evaluator trait rather than new Agent implementations.
pub trait Agent {
    fn choose(&self, game: &Game) -> Result<Action>;
}
