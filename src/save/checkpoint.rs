use crate::error::Error;
use crate::error::Result;
use crate::nets::policy::PolicyNet;
use crate::nets::value::ValueNet;
use crate::save::disk::Disk;
use crate::train::adam::Adam;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use std::io::Read;
use std::path::Path;

const MAGIC: &[u8; 4] = b"RPSZ";
const VERSION: u32 = 1;

/// everything needed to resume training: both networks, the optimizer
/// moments when Adam is in play, the iteration counter and the master
/// seed. the record is self-describing through its magic and version
/// tag, and network blocks carry their own dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub iteration: usize,
    pub seed: u64,
    pub policy: PolicyNet,
    pub value: ValueNet,
    pub optimizers: Option<(Adam, Adam)>,
}

impl Disk for Checkpoint {
    fn name() -> String {
        "checkpoint".to_string()
    }

    fn save(&self, path: &Path) -> Result<()> {
        let mut payload = Vec::new();
        payload.extend_from_slice(MAGIC);
        payload.write_u32::<BE>(VERSION)?;
        payload.write_u64::<BE>(self.iteration as u64)?;
        payload.write_u64::<BE>(self.seed)?;
        self.policy.save(&mut payload)?;
        self.value.save(&mut payload)?;
        match self.optimizers {
            None => payload.write_u8(0)?,
            Some((ref policy, ref value)) => {
                payload.write_u8(1)?;
                policy.save(&mut payload)?;
                value.save(&mut payload)?;
            }
        }
        Self::persist(path, &payload)?;
        log::info!("{:<32}{:<32}", "saving      checkpoint", path.display());
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        log::info!("{:<32}{:<32}", "loading     checkpoint", path.display());
        let ref mut reader = std::io::BufReader::new(std::fs::File::open(path)?);
        let ref mut magic = [0u8; 4];
        reader.read_exact(magic)?;
        if *magic != *MAGIC {
            return Err(Error::CheckpointIncompatible("unrecognized magic".to_string()));
        }
        let version = reader.read_u32::<BE>()?;
        if version != VERSION {
            return Err(Error::CheckpointIncompatible(format!(
                "version {} (expected {})",
                version, VERSION
            )));
        }
        let iteration = reader.read_u64::<BE>()? as usize;
        let seed = reader.read_u64::<BE>()?;
        let policy = PolicyNet::load(reader)?;
        let value = ValueNet::load(reader)?;
        let optimizers = match reader.read_u8()? {
            0 => None,
            _ => Some((
                Adam::load(reader, policy.mlp())?,
                Adam::load(reader, value.mlp())?,
            )),
        };
        Ok(Self {
            iteration,
            seed,
            policy,
            value,
            optimizers,
        })
    }
}
