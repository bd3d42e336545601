use crate::error::Result;
use crate::nets::mlp::Gradients;
use crate::nets::mlp::Mlp;
use crate::ADAM_BETA1;
use crate::ADAM_BETA2;
use crate::ADAM_EPSILON;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use std::io::Read;
use std::io::Write;

/// Adam state for one network: first and second moment estimates with
/// the same shapes as the parameter tensors, plus the step counter for
/// bias correction. checkpoints persist all of it so a resumed run
/// steps exactly where it left off.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    steps: u64,
    m: [Vec<f32>; 4],
    v: [Vec<f32>; 4],
}

impl Adam {
    pub fn new(net: &Mlp) -> Self {
        let shapes = net.tensors().map(|t| vec![0f32; t.len()]);
        Self {
            steps: 0,
            m: shapes.clone(),
            v: shapes,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// one bias-corrected update against mean gradients
    pub fn step(&mut self, net: &mut Mlp, grads: &Gradients, lr: f32) {
        self.steps += 1;
        let t = self.steps as f32;
        let correction1 = 1. - ADAM_BETA1.powf(t);
        let correction2 = 1. - ADAM_BETA2.powf(t);
        let tensors = net.tensors_mut();
        let gradients = [&grads.w1, &grads.b1, &grads.w2, &grads.b2];
        for (slot, (theta, grad)) in tensors.into_iter().zip(gradients).enumerate() {
            for (i, (t, g)) in theta.iter_mut().zip(grad.iter()).enumerate() {
                let m = &mut self.m[slot][i];
                let v = &mut self.v[slot][i];
                *m = ADAM_BETA1 * *m + (1. - ADAM_BETA1) * g;
                *v = ADAM_BETA2 * *v + (1. - ADAM_BETA2) * g * g;
                let mhat = *m / correction1;
                let vhat = *v / correction2;
                *t -= lr * mhat / (vhat.sqrt() + ADAM_EPSILON);
            }
        }
    }

    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<BE>(self.steps)?;
        for moments in [&self.m, &self.v] {
            for tensor in moments.iter() {
                for &x in tensor.iter() {
                    writer.write_f32::<BE>(x)?;
                }
            }
        }
        Ok(())
    }

    /// moment shapes come from the network the state belongs to
    pub fn load<R: Read>(reader: &mut R, net: &Mlp) -> Result<Self> {
        let steps = reader.read_u64::<BE>()?;
        let mut moments = || -> Result<[Vec<f32>; 4]> {
            let mut out = net.tensors().map(|t| vec![0f32; t.len()]);
            for tensor in out.iter_mut() {
                for x in tensor.iter_mut() {
                    *x = reader.read_f32::<BE>()?;
                }
            }
            Ok(out)
        };
        Ok(Self {
            steps,
            m: moments()?,
            v: moments()?,
        })
    }
}
