//! Dice roll results and classification.

use serde::{Deserialize, Serialize};

use super::Die;
use super::pool::DicePool;
use crate::error::{MechError, MechResult};

/// The faces produced by rolling a pool, in roll order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollResult {
    die: Die,
    faces: Vec<u32>,
}

impl DiceRollResult {
    /// Build a result from known faces, e.g. when replaying a log.
    ///
    /// Every face must lie in `[1, sides]`. An empty face list is allowed
    /// and classifies as zero successes.
    pub fn from_faces(die: Die, faces: Vec<u32>) -> MechResult<Self> {
        let sides = die.sides();
        if let Some(bad) = faces.iter().find(|&&f| f == 0 || f > sides) {
            return Err(MechError::InvalidArgument(format!(
                "face {bad} is not a face of a {die}"
            )));
        }
        Ok(Self { die, faces })
    }

    pub(crate) fn from_trusted_faces(die: Die, faces: Vec<u32>) -> Self {
        Self { die, faces }
    }

    /// The die type that was rolled.
    pub fn die(&self) -> Die {
        self.die
    }

    /// The pool this result corresponds to, if it holds at least one die.
    pub fn pool(&self) -> Option<DicePool> {
        DicePool::new(self.faces.len() as u32, self.die).ok()
    }

    /// Individual faces in roll order.
    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    /// Number of dice rolled.
    pub fn count(&self) -> usize {
        self.faces.len()
    }

    /// Count faces at or above the success threshold.
    pub fn success_count(&self, threshold: u32) -> u32 {
        self.faces.iter().filter(|&&f| f >= threshold).count() as u32
    }

    /// Count faces showing exactly the botch face (normally 1).
    pub fn botch_count(&self, botch_face: u32) -> u32 {
        self.faces.iter().filter(|&&f| f == botch_face).count() as u32
    }

    /// Sum of all faces.
    pub fn total(&self) -> u32 {
        self.faces.iter().sum()
    }

    /// The highest single face, or 0 if empty.
    pub fn highest(&self) -> u32 {
        self.faces.iter().copied().max().unwrap_or(0)
    }
}

impl std::fmt::Display for DiceRollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.faces.iter().map(|v| v.to_string()).collect();
        write!(f, "{}{} [{}]", self.faces.len(), self.die, values.join(", "))
    }
}
