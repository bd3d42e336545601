use crate::error::Error;
use crate::error::Result;
use crate::nets::policy::PolicyNet;
use crate::nets::value::ValueNet;
use crate::Probability;
use crate::Utility;
use crate::SQUARES;

/// the seam between search and inference. MCTS only ever sees this
/// trait, so the in-process networks can be swapped for a remote
/// service without touching the search.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, features: &[f32]) -> Result<(Vec<Probability>, Utility)>;
    fn evaluate_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<(Vec<Probability>, Utility)>> {
        batch.iter().map(|f| self.evaluate(f)).collect()
    }
}

/// in-process inference over a borrowed policy/value pair. validates
/// its own outputs so a malformed network surfaces as EvaluatorFailure
/// instead of corrupting the search.
pub struct NetEvaluator<'a> {
    policy: &'a PolicyNet,
    value: &'a ValueNet,
}

impl<'a> NetEvaluator<'a> {
    pub fn new(policy: &'a PolicyNet, value: &'a ValueNet) -> Self {
        Self { policy, value }
    }

    fn check(policy: Vec<Probability>, value: Utility) -> Result<(Vec<Probability>, Utility)> {
        if policy.len() != SQUARES {
            return Err(Error::EvaluatorFailure(format!(
                "policy length {}",
                policy.len()
            )));
        }
        if policy.iter().any(|p| !p.is_finite() || *p < 0.) {
            return Err(Error::EvaluatorFailure("non-finite policy".to_string()));
        }
        if !value.is_finite() {
            return Err(Error::EvaluatorFailure("non-finite value".to_string()));
        }
        Ok((policy, value))
    }
}

impl Evaluator for NetEvaluator<'_> {
    fn evaluate(&self, features: &[f32]) -> Result<(Vec<Probability>, Utility)> {
        Self::check(self.policy.forward(features)?, self.value.forward(features)?)
    }

    /// batched path through both heads at once
    fn evaluate_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<(Vec<Probability>, Utility)>> {
        let policies = self.policy.forward_batch(batch)?;
        let values = self.value.forward_batch(batch)?;
        policies
            .into_iter()
            .zip(values.into_iter())
            .map(|(policy, value)| Self::check(policy, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn evaluates_fresh_networks() {
        let ref mut rng = SmallRng::seed_from_u64(17);
        let policy = PolicyNet::new(rng, 16);
        let value = ValueNet::new(rng, 16);
        let nets = NetEvaluator::new(&policy, &value);
        let game = crate::game::game::Game::root(rng);
        let (probs, utility) = nets.evaluate(&game.features()).unwrap();
        assert!(probs.len() == SQUARES);
        assert!(utility > 0. && utility < 1.);
    }

    #[test]
    fn batch_matches_singles() {
        let ref mut rng = SmallRng::seed_from_u64(18);
        let policy = PolicyNet::new(rng, 16);
        let value = ValueNet::new(rng, 16);
        let nets = NetEvaluator::new(&policy, &value);
        let game = crate::game::game::Game::root(rng);
        let batch = vec![game.features().to_vec(), game.features().to_vec()];
        let results = nets.evaluate_batch(&batch).unwrap();
        let single = nets.evaluate(&batch[0]).unwrap();
        assert!(results.len() == 2);
        assert!(results[0].0 == single.0);
        assert!(results[1].1 == single.1);
    }
}
