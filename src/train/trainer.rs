use crate::cancel::Cancel;
use crate::error::Error;
use crate::error::Result;
use crate::nets::policy::PolicyNet;
use crate::nets::value::ValueNet;
use crate::report::Event;
use crate::report::Sink;
use crate::selfplay::example::Example;
use crate::train::adam::Adam;
use crate::Loss;
use crate::BATCH_SIZE;
use crate::EPOCHS;
use crate::HOLDOUT;
use crate::LEARNING_RATE;
use crate::PATIENCE;
use crate::POLICY_EPSILON;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// training hyperparameters. the learning rate feeds Adam, not raw SGD.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub lr: f32,
    pub batch: usize,
    pub epochs: usize,
    pub patience: usize,
    pub holdout: f32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            lr: LEARNING_RATE,
            batch: BATCH_SIZE,
            epochs: EPOCHS,
            patience: PATIENCE,
            holdout: HOLDOUT,
        }
    }
}

/// minibatch trainer over a pool of self-play examples. owns the Adam
/// moments and mutates both networks in place, so the enclosing loop
/// must serialize epochs against self-play phases reading the same
/// networks.
pub struct Trainer {
    pub schedule: Schedule,
    pub seed: u64,
    policy_adam: Adam,
    value_adam: Adam,
}

impl Trainer {
    pub fn new(policy: &PolicyNet, value: &ValueNet, schedule: Schedule, seed: u64) -> Self {
        Self {
            schedule,
            seed,
            policy_adam: Adam::new(policy.mlp()),
            value_adam: Adam::new(value.mlp()),
        }
    }

    /// resume with optimizer moments recovered from a checkpoint
    pub fn from_state(schedule: Schedule, seed: u64, policy_adam: Adam, value_adam: Adam) -> Self {
        Self {
            schedule,
            seed,
            policy_adam,
            value_adam,
        }
    }

    pub fn optimizers(&self) -> (&Adam, &Adam) {
        (&self.policy_adam, &self.value_adam)
    }

    /// run the whole schedule: shuffle, minibatch both heads, step Adam,
    /// and early-stop when the held-out split stops improving. returns
    /// the mean training losses of the last completed epoch.
    pub fn fit(
        &mut self,
        policy: &mut PolicyNet,
        value: &mut ValueNet,
        pool: &[Example],
        cancel: &Cancel,
        sink: &dyn Sink,
    ) -> Result<(Loss, Loss)> {
        if pool.is_empty() {
            log::warn!("training on an empty pool is a no-op");
            return Ok((0., 0.));
        }
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let mut indices = (0..pool.len()).collect::<Vec<_>>();
        indices.shuffle(rng);
        let held = (pool.len() as f32 * self.schedule.holdout) as usize;
        let (validation, training) = indices.split_at(held);
        let mut best = f32::INFINITY;
        let mut stale = 0;
        let mut report = (0., 0.);
        let mut completed = 0;
        for epoch in 0..self.schedule.epochs {
            if cancel.is_cancelled() {
                break;
            }
            let mut order = training.to_vec();
            order.shuffle(rng);
            let mut policy_loss = 0.;
            let mut value_loss = 0.;
            let mut batches = 0;
            for chunk in order.chunks(self.schedule.batch) {
                let examples = chunk
                    .iter()
                    .map(|&i| (pool[i].features.as_slice(), pool[i].policy.as_slice()))
                    .collect::<Vec<_>>();
                let (grads, loss) = policy.gradients(&examples)?;
                self.policy_adam.step(policy.mlp_mut(), &grads, self.schedule.lr);
                policy_loss += loss;
                let examples = chunk
                    .iter()
                    .map(|&i| (pool[i].features.as_slice(), pool[i].value))
                    .collect::<Vec<_>>();
                let (grads, loss) = value.gradients(&examples)?;
                self.value_adam.step(value.mlp_mut(), &grads, self.schedule.lr);
                value_loss += loss;
                batches += 1;
            }
            report = (
                policy_loss / batches.max(1) as f32,
                value_loss / batches.max(1) as f32,
            );
            completed += 1;
            sink.report(Event::EpochCompleted {
                epoch,
                policy: report.0,
                value: report.1,
            });
            if !validation.is_empty() {
                let loss = self.validate(policy, value, pool, validation)?;
                if loss < best {
                    best = loss;
                    stale = 0;
                } else {
                    stale += 1;
                    if stale >= self.schedule.patience {
                        log::info!("early stop after {} epochs (held-out {:.6})", epoch + 1, best);
                        break;
                    }
                }
            }
        }
        match completed {
            0 if cancel.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(report),
        }
    }

    /// combined held-out loss: policy cross-entropy plus value MSE
    fn validate(
        &self,
        policy: &PolicyNet,
        value: &ValueNet,
        pool: &[Example],
        indices: &[usize],
    ) -> Result<Loss> {
        let mut loss = 0.;
        for &i in indices {
            let probs = policy.forward(&pool[i].features)?;
            loss -= pool[i]
                .policy
                .iter()
                .zip(probs.iter())
                .map(|(t, p)| t * (p + POLICY_EPSILON).ln())
                .sum::<f32>();
            let y = value.forward(&pool[i].features)?;
            loss += (y - pool[i].value) * (y - pool[i].value);
        }
        Ok(loss / indices.len().max(1) as f32)
    }
}
