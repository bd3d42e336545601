use crate::Probability;
use crate::Utility;
use crate::SQUARES;
use serde::Deserialize;
use serde::Serialize;

/// one supervised example: the position as the networks see it, the
/// square distribution the search settled on, and the eventual outcome
/// from the perspective of the player who was to move. serializable so
/// collaborators can stream pools as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub features: Vec<f32>,
    pub policy: [Probability; SQUARES],
    pub value: Utility,
}
