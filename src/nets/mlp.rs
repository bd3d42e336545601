use crate::error::Error;
use crate::error::Result;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Normal;
use std::io::Read;
use std::io::Write;

/// the dense two-layer core shared by the policy and value heads:
/// input -> ReLU hidden -> raw logits. weight matrices are row-major
/// by their first dimension, w1[input x hidden] and w2[hidden x output],
/// which is also the order they serialize in.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    input: usize,
    hidden: usize,
    output: usize,
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

/// gradient accumulator with the same shapes as the network it came from
#[derive(Debug, Clone)]
pub struct Gradients {
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

impl Gradients {
    pub fn zeroed(net: &Mlp) -> Self {
        Self {
            w1: vec![0.; net.w1.len()],
            b1: vec![0.; net.b1.len()],
            w2: vec![0.; net.w2.len()],
            b2: vec![0.; net.b2.len()],
        }
    }
    /// divide by batch size so updates use mean gradients
    pub fn scale(&mut self, n: usize) {
        let k = 1. / n.max(1) as f32;
        for slot in [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2] {
            for g in slot.iter_mut() {
                *g *= k;
            }
        }
    }
}

impl Mlp {
    /// zero-mean Gaussian weights scaled by sqrt(1 / fan_in), zero biases
    pub fn init<R: Rng>(rng: &mut R, input: usize, hidden: usize, output: usize) -> Self {
        let glorot1 = Normal::new(0., (1. / input as f32).sqrt()).expect("positive sigma");
        let glorot2 = Normal::new(0., (1. / hidden as f32).sqrt()).expect("positive sigma");
        Self {
            input,
            hidden,
            output,
            w1: (0..input * hidden).map(|_| glorot1.sample(rng)).collect(),
            b1: vec![0.; hidden],
            w2: (0..hidden * output).map(|_| glorot2.sample(rng)).collect(),
            b2: vec![0.; output],
        }
    }

    pub fn input(&self) -> usize {
        self.input
    }
    pub fn hidden(&self) -> usize {
        self.hidden
    }
    pub fn output(&self) -> usize {
        self.output
    }

    /// ReLU activations of the hidden layer
    pub fn activate(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.input {
            return Err(Error::ShapeMismatch {
                expected: self.input,
                found: input.len(),
            });
        }
        let mut hidden = self.b1.clone();
        for (i, &x) in input.iter().enumerate() {
            if x == 0. {
                continue;
            }
            for (h, a) in hidden.iter_mut().enumerate() {
                *a += self.w1[i * self.hidden + h] * x;
            }
        }
        for a in hidden.iter_mut() {
            *a = a.max(0.);
        }
        Ok(hidden)
    }

    /// raw output logits given hidden activations
    pub fn logits(&self, hidden: &[f32]) -> Vec<f32> {
        let mut logits = self.b2.clone();
        for (h, &a) in hidden.iter().enumerate() {
            if a == 0. {
                continue;
            }
            for (o, z) in logits.iter_mut().enumerate() {
                *z += self.w2[h * self.output + o] * a;
            }
        }
        logits
    }

    /// accumulate one example's gradients given the loss gradient with
    /// respect to the output logits. the ReLU mask comes for free from
    /// the activations themselves.
    pub fn accumulate(
        &self,
        input: &[f32],
        hidden: &[f32],
        dlogits: &[f32],
        grads: &mut Gradients,
    ) {
        for (o, &dz) in dlogits.iter().enumerate() {
            grads.b2[o] += dz;
            for (h, &a) in hidden.iter().enumerate() {
                grads.w2[h * self.output + o] += a * dz;
            }
        }
        let mut dhidden = vec![0.; self.hidden];
        for (h, dh) in dhidden.iter_mut().enumerate() {
            if hidden[h] > 0. {
                *dh = dlogits
                    .iter()
                    .enumerate()
                    .map(|(o, &dz)| self.w2[h * self.output + o] * dz)
                    .sum::<f32>();
            }
        }
        for (h, &dh) in dhidden.iter().enumerate() {
            if dh == 0. {
                continue;
            }
            grads.b1[h] += dh;
            for (i, &x) in input.iter().enumerate() {
                grads.w1[i * self.hidden + h] += x * dh;
            }
        }
    }

    /// plain SGD step against mean gradients
    pub fn descend(&mut self, grads: &Gradients, lr: f32) {
        for (theta, grad) in [
            (&mut self.w1, &grads.w1),
            (&mut self.b1, &grads.b1),
            (&mut self.w2, &grads.w2),
            (&mut self.b2, &grads.b2),
        ] {
            for (t, g) in theta.iter_mut().zip(grad.iter()) {
                *t -= lr * g;
            }
        }
    }

    /// the four parameter tensors, in serialization order
    pub fn tensors(&self) -> [&[f32]; 4] {
        [&self.w1, &self.b1, &self.w2, &self.b2]
    }
    pub fn tensors_mut(&mut self) -> [&mut Vec<f32>; 4] {
        [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }

    /// dense binary layout: three u32 dimensions then the four tensors
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BE>(self.input as u32)?;
        writer.write_u32::<BE>(self.hidden as u32)?;
        writer.write_u32::<BE>(self.output as u32)?;
        for tensor in self.tensors() {
            for &x in tensor {
                writer.write_f32::<BE>(x)?;
            }
        }
        Ok(())
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let input = reader.read_u32::<BE>()? as usize;
        let hidden = reader.read_u32::<BE>()? as usize;
        let output = reader.read_u32::<BE>()? as usize;
        let mut tensor = |n: usize| -> Result<Vec<f32>> {
            (0..n)
                .map(|_| Ok(reader.read_f32::<BE>()?))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            input,
            hidden,
            output,
            w1: tensor(input * hidden)?,
            b1: tensor(hidden)?,
            w2: tensor(hidden * output)?,
            b2: tensor(output)?,
        })
    }
}
