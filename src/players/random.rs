use crate::error::Result;
use crate::game::action::Action;
use crate::game::game::Game;
use crate::players::Agent;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// uniform baseline. draws are deterministic per position: the rng is
/// seeded from the position itself and the agent's seed, so the same
/// position always gets the same answer from the same agent.
pub struct RandomAgent {
    pub seed: u64,
}

impl Agent for RandomAgent {
    fn choose(&self, game: &Game) -> Result<Action> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hash;
        use std::hash::Hasher;
        let ref mut hasher = DefaultHasher::new();
        self.seed.hash(hasher);
        game.hash(hasher);
        let ref mut rng = SmallRng::seed_from_u64(hasher.finish());
        game.random(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_are_legal_and_deterministic() {
        let ref mut rng = SmallRng::seed_from_u64(40);
        let game = Game::root(rng);
        let agent = RandomAgent { seed: 1 };
        let action = agent.choose(&game).unwrap();
        assert!(game.apply(action).is_ok());
        assert!(agent.choose(&game).unwrap() == action);
    }
}
