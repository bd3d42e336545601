use crate::cancel::Cancel;
use crate::error::Result;
use crate::game::action::Action;
use crate::game::game::Game;
use crate::mcts::search::Search;
use crate::players::Agent;

/// the full search behind the Agent seam
pub struct MctsAgent<'a> {
    pub search: Search<'a>,
}

impl Agent for MctsAgent<'_> {
    fn choose(&self, game: &Game) -> Result<Action> {
        Ok(self.search.run(game, &Cancel::new())?.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nets::evaluator::NetEvaluator;
    use crate::nets::policy::PolicyNet;
    use crate::nets::value::ValueNet;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn searches_to_a_legal_move() {
        let ref mut rng = SmallRng::seed_from_u64(41);
        let policy = PolicyNet::new(rng, 8);
        let value = ValueNet::new(rng, 8);
        let nets = NetEvaluator::new(&policy, &value);
        let mut search = Search::new(&nets);
        search.simulations = 32;
        let agent = MctsAgent { search };
        let game = Game::root(rng);
        let action = agent.choose(&game).unwrap();
        assert!(game.apply(action).is_ok());
    }
}
