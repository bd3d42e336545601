use crate::error::Error;
use crate::error::Result;
use crate::nets::mlp::Gradients;
use crate::nets::mlp::Mlp;
use crate::Loss;
use crate::Probability;
use crate::FEATURES;
use crate::POLICY_EPSILON;
use crate::POLICY_OUTPUTS;
use rand::Rng;
use std::io::Read;
use std::io::Write;

/// move-distribution head: 81 features -> ReLU hidden -> 9 softmax
/// probabilities, one per board square.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyNet(Mlp);

/// numerically safe softmax, shifted by the max logit
pub fn softmax(logits: &[f32]) -> Vec<Probability> {
    let shift = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps = logits.iter().map(|z| (z - shift).exp()).collect::<Vec<_>>();
    let norm = exps.iter().sum::<f32>();
    exps.into_iter().map(|e| e / norm).collect()
}

impl PolicyNet {
    pub fn new<R: Rng>(rng: &mut R, hidden: usize) -> Self {
        Self(Mlp::init(rng, FEATURES, hidden, POLICY_OUTPUTS))
    }

    pub fn mlp(&self) -> &Mlp {
        &self.0
    }
    pub fn mlp_mut(&mut self) -> &mut Mlp {
        &mut self.0
    }

    /// probabilities over the 9 squares, summing to one
    pub fn forward(&self, features: &[f32]) -> Result<Vec<Probability>> {
        let hidden = self.0.activate(features)?;
        Ok(softmax(&self.0.logits(&hidden)))
    }

    pub fn forward_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<Probability>>> {
        batch.iter().map(|f| self.forward(f)).collect()
    }

    /// mean cross-entropy gradients over a batch of (features, target)
    /// pairs. the softmax/cross-entropy pair collapses to p - t at the
    /// logits, so backprop stays analytic.
    pub fn gradients(&self, batch: &[(&[f32], &[Probability])]) -> Result<(Gradients, Loss)> {
        let mut grads = Gradients::zeroed(&self.0);
        let mut loss = 0.;
        for &(features, target) in batch {
            let hidden = self.0.activate(features)?;
            let probs = softmax(&self.0.logits(&hidden));
            loss -= probs
                .iter()
                .zip(target.iter())
                .map(|(p, t)| t * (p + POLICY_EPSILON).ln())
                .sum::<f32>();
            let dlogits = probs
                .iter()
                .zip(target.iter())
                .map(|(p, t)| p - t)
                .collect::<Vec<_>>();
            self.0.accumulate(features, &hidden, &dlogits, &mut grads);
        }
        grads.scale(batch.len());
        Ok((grads, loss / batch.len().max(1) as f32))
    }

    /// one plain SGD step; the trainer prefers Adam but this is the
    /// baseline update
    pub fn train(&mut self, batch: &[(&[f32], &[Probability])], lr: f32) -> Result<Loss> {
        let (grads, loss) = self.gradients(batch)?;
        self.0.descend(&grads, lr);
        Ok(loss)
    }

    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.0.save(writer)
    }

    /// load and verify the head shape
    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let mlp = Mlp::load(reader)?;
        if mlp.input() != FEATURES {
            return Err(Error::ShapeMismatch {
                expected: FEATURES,
                found: mlp.input(),
            });
        }
        if mlp.output() != POLICY_OUTPUTS {
            return Err(Error::ShapeMismatch {
                expected: POLICY_OUTPUTS,
                found: mlp.output(),
            });
        }
        Ok(Self(mlp))
    }
}
