use crate::error::Error;
use crate::error::Result;
use crate::nets::mlp::Gradients;
use crate::nets::mlp::Mlp;
use crate::Loss;
use crate::Utility;
use crate::FEATURES;
use crate::VALUE_OUTPUTS;
use rand::Rng;
use std::io::Read;
use std::io::Write;

/// win-probability head: 81 features -> ReLU hidden -> one sigmoid
/// scalar in (0, 1), read as the chance the player to move wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNet(Mlp);

fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

impl ValueNet {
    pub fn new<R: Rng>(rng: &mut R, hidden: usize) -> Self {
        Self(Mlp::init(rng, FEATURES, hidden, VALUE_OUTPUTS))
    }

    pub fn mlp(&self) -> &Mlp {
        &self.0
    }
    pub fn mlp_mut(&mut self) -> &mut Mlp {
        &mut self.0
    }

    pub fn forward(&self, features: &[f32]) -> Result<Utility> {
        let hidden = self.0.activate(features)?;
        Ok(sigmoid(self.0.logits(&hidden)[0]))
    }

    pub fn forward_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Utility>> {
        batch.iter().map(|f| self.forward(f)).collect()
    }

    /// mean squared error gradients against outcome targets in {0, 1/2, 1}
    pub fn gradients(&self, batch: &[(&[f32], Utility)]) -> Result<(Gradients, Loss)> {
        let mut grads = Gradients::zeroed(&self.0);
        let mut loss = 0.;
        for &(features, target) in batch {
            let hidden = self.0.activate(features)?;
            let y = sigmoid(self.0.logits(&hidden)[0]);
            loss += (y - target) * (y - target);
            let dlogit = 2. * (y - target) * y * (1. - y);
            self.0.accumulate(features, &hidden, &[dlogit], &mut grads);
        }
        grads.scale(batch.len());
        Ok((grads, loss / batch.len().max(1) as f32))
    }

    pub fn train(&mut self, batch: &[(&[f32], Utility)], lr: f32) -> Result<Loss> {
        let (grads, loss) = self.gradients(batch)?;
        self.0.descend(&grads, lr);
        Ok(loss)
    }

    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.0.save(writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let mlp = Mlp::load(reader)?;
        if mlp.input() != FEATURES {
            return Err(Error::ShapeMismatch {
                expected: FEATURES,
                found: mlp.input(),
            });
        }
        if mlp.output() != VALUE_OUTPUTS {
            return Err(Error::ShapeMismatch {
                expected: VALUE_OUTPUTS,
                found: mlp.output(),
            });
        }
        Ok(Self(mlp))
    }
}
