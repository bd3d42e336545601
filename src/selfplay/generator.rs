use crate::cancel::Cancel;
use crate::error::Error;
use crate::error::Result;
use crate::game::action::Action;
use crate::game::game::Game;
use crate::game::player::Player;
use crate::mcts::search::Decision;
use crate::mcts::search::Search;
use crate::nets::evaluator::Evaluator;
use crate::report::Event;
use crate::report::Sink;
use crate::selfplay::example::Example;
use crate::C_PUCT;
use crate::EXPLORE_MOVES;
use crate::MCTS_SIMULATIONS;
use crate::SELFPLAY_GAMES;
use crate::TEMPERATURE;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// self-play data generator. plays complete games against itself with
/// the same search on both seats, recording every visited state as a
/// training example. games are independent so they fan out across
/// rayon workers; the networks are shared read-only through the
/// evaluator and each game owns its rng, its state, and its tree.
pub struct Generator<'a> {
    pub evaluator: &'a dyn Evaluator,
    pub games: usize,
    pub simulations: usize,
    pub c_puct: f32,
    /// exploration temperature over root visit counts
    pub temperature: f32,
    /// how many opening moves sample under temperature before argmax
    pub explore: usize,
    pub seed: u64,
}

impl<'a> Generator<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self {
            evaluator,
            games: SELFPLAY_GAMES,
            simulations: MCTS_SIMULATIONS,
            c_puct: C_PUCT,
            temperature: TEMPERATURE,
            explore: EXPLORE_MOVES,
            seed: 0,
        }
    }

    /// play every game, merging examples game by game. cancelled games
    /// are discarded whole; completed games always land in the pool.
    pub fn generate(&self, cancel: &Cancel, sink: &dyn Sink) -> Result<Vec<Example>> {
        use rayon::iter::IntoParallelIterator;
        use rayon::iter::ParallelIterator;
        let mut pool = Vec::new();
        let games = (0..self.games)
            .into_par_iter()
            .map(|game| self.episode(game, cancel, sink))
            .collect::<Vec<_>>();
        for game in games {
            match game {
                Ok(examples) => pool.extend(examples),
                Err(Error::Cancelled) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(pool)
    }

    /// one complete game from a per-game deterministic rng. examples
    /// carry a placeholder outcome until the game ends, then every one
    /// is back-filled from its own mover's perspective.
    fn episode(&self, index: usize, cancel: &Cancel, sink: &dyn Sink) -> Result<Vec<Example>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let ref mut rng = self.rng(index);
        let search = Search {
            evaluator: self.evaluator,
            simulations: self.simulations,
            c_puct: self.c_puct,
            workers: 1,
        };
        let mut game = Game::root(rng);
        let mut moves = 0;
        let mut visited: Vec<(Vec<f32>, Decision, Player)> = Vec::new();
        while !game.is_terminal() {
            let clock = std::time::Instant::now();
            let decision = search.run(&game, cancel)?;
            sink.report(Event::SearchStats {
                simulations: self.simulations,
                visits: decision.visits,
                millis: clock.elapsed().as_millis(),
            });
            let action = self.select(rng, &decision, moves);
            visited.push((game.features().to_vec(), decision, game.turn()));
            game = game.apply(action)?;
            moves += 1;
        }
        let winner = game.winner();
        sink.report(Event::GameCompleted {
            game: index,
            moves,
            winner,
        });
        Ok(visited
            .into_iter()
            .map(|(features, decision, mover)| Example {
                features,
                policy: decision.policy,
                value: match winner {
                    None => 0.5,
                    Some(player) if player == mover => 1.,
                    Some(_) => 0.,
                },
            })
            .collect())
    }

    /// argmax by default; under temperature, sample the root children
    /// proportional to visits^(1/tau) for the first few moves
    fn select<R: Rng>(&self, rng: &mut R, decision: &Decision, moves: usize) -> Action {
        if self.temperature <= 0. || moves >= self.explore {
            return decision.action;
        }
        use rand::distr::weighted::WeightedIndex;
        use rand::distr::Distribution;
        let weights = decision
            .children
            .iter()
            .map(|(_, visits)| (*visits as f32).powf(1. / self.temperature))
            .map(|weight| weight.max(f32::MIN_POSITIVE))
            .collect::<Vec<_>>();
        match WeightedIndex::new(&weights) {
            Ok(distribution) => decision.children[distribution.sample(rng)].0,
            Err(_) => decision.action,
        }
    }

    /// deterministic per-game generator from the master seed
    fn rng(&self, game: usize) -> SmallRng {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hash;
        use std::hash::Hasher;
        let ref mut hasher = DefaultHasher::new();
        self.seed.hash(hasher);
        game.hash(hasher);
        SmallRng::seed_from_u64(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nets::evaluator::NetEvaluator;
    use crate::nets::policy::PolicyNet;
    use crate::nets::value::ValueNet;
    use crate::report::LogSink;
    use crate::FEATURES;
    use crate::HAND_SIZE;

    fn generator<'a>(nets: &'a NetEvaluator<'a>) -> Generator<'a> {
        let mut generator = Generator::new(nets);
        generator.games = 2;
        generator.simulations = 16;
        generator.seed = 42;
        generator
    }

    #[test]
    fn pool_is_complete_and_well_formed() {
        let ref mut rng = SmallRng::seed_from_u64(26);
        let policy = PolicyNet::new(rng, 8);
        let value = ValueNet::new(rng, 8);
        let ref nets = NetEvaluator::new(&policy, &value);
        let pool = generator(nets).generate(&Cancel::new(), &LogSink).unwrap();
        // a full 3x3 game under default rules always lasts 9 placements
        assert!(pool.len() == 2 * (2 * HAND_SIZE - 1));
        for example in pool.iter() {
            assert!(example.features.len() == FEATURES);
            assert!((example.policy.iter().sum::<f32>() - 1.).abs() < 1e-5);
            assert!([0., 0.5, 1.].contains(&example.value));
        }
    }

    #[test]
    fn same_seed_same_pool() {
        let ref mut rng = SmallRng::seed_from_u64(27);
        let policy = PolicyNet::new(rng, 8);
        let value = ValueNet::new(rng, 8);
        let ref nets = NetEvaluator::new(&policy, &value);
        let a = generator(nets).generate(&Cancel::new(), &LogSink).unwrap();
        let b = generator(nets).generate(&Cancel::new(), &LogSink).unwrap();
        assert!(a == b);
    }

    #[test]
    fn cancellation_flushes_nothing_but_errors_nothing() {
        let ref mut rng = SmallRng::seed_from_u64(28);
        let policy = PolicyNet::new(rng, 8);
        let value = ValueNet::new(rng, 8);
        let ref nets = NetEvaluator::new(&policy, &value);
        let cancel = Cancel::new();
        cancel.cancel();
        let pool = generator(nets).generate(&cancel, &LogSink).unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn temperature_sampling_still_plays_legal_moves() {
        let ref mut rng = SmallRng::seed_from_u64(29);
        let policy = PolicyNet::new(rng, 8);
        let value = ValueNet::new(rng, 8);
        let ref nets = NetEvaluator::new(&policy, &value);
        let mut generator = generator(nets);
        generator.games = 1;
        generator.temperature = 1.;
        generator.explore = 4;
        let pool = generator.generate(&Cancel::new(), &LogSink).unwrap();
        assert!(pool.len() == 2 * HAND_SIZE - 1);
    }
}
