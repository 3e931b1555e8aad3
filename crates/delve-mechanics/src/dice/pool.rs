//! Dice pool construction and rolling.

use std::collections::VecDeque;
use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::Die;
use super::roll::DiceRollResult;
use crate::error::{MechError, MechResult};

/// Anything that can produce a uniform die face in `[1, sides]`.
pub trait RandomSource {
    /// Produce the next face for a die with `sides` sides.
    fn next_face(&mut self, sides: u32) -> MechResult<u32>;
}

impl RandomSource for StdRng {
    fn next_face(&mut self, sides: u32) -> MechResult<u32> {
        if sides < 2 {
            return Err(MechError::InvalidArgument(format!(
                "a die needs at least 2 sides, got {sides}"
            )));
        }
        Ok(self.random_range(1..=sides))
    }
}

/// A replay source that hands out a fixed sequence of faces.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFaces {
    faces: VecDeque<u32>,
    consumed: usize,
}

impl ScriptedFaces {
    /// Script the given faces, consumed front to back.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomSource for ScriptedFaces {
    fn next_face(&mut self, sides: u32) -> MechResult<u32> {
        let face = self
            .faces
            .pop_front()
            .ok_or(MechError::ScriptExhausted(self.consumed))?;
        if face == 0 || face > sides {
            return Err(MechError::InvalidArgument(format!(
                "scripted face {face} is not a face of a d{sides}"
            )));
        }
        self.consumed += 1;
        Ok(face)
    }
}

/// A homogeneous pool: `count` dice of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DicePool {
    count: u32,
    die: Die,
}

impl DicePool {
    /// Create a pool. Needs at least one die with at least two sides.
    pub fn new(count: u32, die: Die) -> MechResult<Self> {
        if count == 0 {
            return Err(MechError::InvalidArgument(
                "dice pool needs at least one die".to_string(),
            ));
        }
        if die.sides() < 2 {
            return Err(MechError::InvalidArgument(format!(
                "a die needs at least 2 sides, got {}",
                die.sides()
            )));
        }
        Ok(Self { count, die })
    }

    /// Number of dice in the pool.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The die type.
    pub fn die(&self) -> Die {
        self.die
    }

    /// Lazily produce exactly `count` faces from the source.
    pub fn faces<'a, R>(
        &self,
        source: &'a mut R,
    ) -> impl Iterator<Item = MechResult<u32>> + use<'a, R>
    where
        R: RandomSource + ?Sized,
    {
        let sides = self.die.sides();
        (0..self.count).map(move |_| source.next_face(sides))
    }

    /// Roll every die in the pool.
    pub fn roll<R>(&self, source: &mut R) -> MechResult<DiceRollResult>
    where
        R: RandomSource + ?Sized,
    {
        let faces = self.faces(source).collect::<MechResult<Vec<u32>>>()?;
        tracing::trace!(pool = %self, ?faces, "rolled dice pool");
        Ok(DiceRollResult::from_trusted_faces(self.die, faces))
    }
}

impl std::fmt::Display for DicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.count, self.die)
    }
}

impl FromStr for DicePool {
    type Err = MechError;

    /// Parse notation like `"5d10"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (count, sides) = lower
            .split_once('d')
            .ok_or_else(|| MechError::InvalidArgument(format!("invalid dice notation: {s}")))?;
        let count = count
            .parse::<u32>()
            .map_err(|_| MechError::InvalidArgument(format!("invalid dice count in: {s}")))?;
        let die = Die::from_str_tag(&format!("d{sides}"))
            .ok_or_else(|| MechError::InvalidArgument(format!("invalid die in: {s}")))?;
        Self::new(count, die)
    }
}

impl TryFrom<String> for DicePool {
    type Error = MechError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DicePool> for String {
    fn from(pool: DicePool) -> Self {
        pool.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn rejects_empty_pool() {
        assert!(matches!(
            DicePool::new(0, Die::D10),
            Err(MechError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_degenerate_die() {
        assert!(DicePool::new(3, Die::Custom(1)).is_err());
        assert!(DicePool::new(3, Die::Custom(0)).is_err());
        assert!(DicePool::new(3, Die::Custom(2)).is_ok());
    }

    #[test]
    fn parses_notation() {
        let pool: DicePool = "5d10".parse().unwrap();
        assert_eq!(pool.count(), 5);
        assert_eq!(pool.die(), Die::D10);
        assert_eq!(pool.to_string(), "5d10");
        assert!("d10".parse::<DicePool>().is_err());
        assert!("0d6".parse::<DicePool>().is_err());
        assert!("3x6".parse::<DicePool>().is_err());
    }

    #[test]
    fn serializes_as_notation() {
        let pool = DicePool::new(3, Die::D6).unwrap();
        assert_eq!(serde_json::to_string(&pool).unwrap(), "\"3d6\"");
        let back: DicePool = serde_json::from_str("\"3D6\"").unwrap();
        assert_eq!(back, pool);
    }

    #[test]
    fn roll_deterministic_with_seed() {
        let pool = DicePool::new(6, Die::D20).unwrap();
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);
        let r1 = pool.roll(&mut rng1).unwrap();
        let r2 = pool.roll(&mut rng2).unwrap();
        assert_eq!(r1.faces(), r2.faces());
    }

    #[test]
    fn scripted_faces_replay_exactly() {
        let pool = DicePool::new(5, Die::D10).unwrap();
        let mut script = ScriptedFaces::new([8, 9, 10, 8, 5]);
        let result = pool.roll(&mut script).unwrap();
        assert_eq!(result.faces(), &[8, 9, 10, 8, 5]);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn scripted_faces_report_exhaustion() {
        let pool = DicePool::new(3, Die::D10).unwrap();
        let mut script = ScriptedFaces::new([4, 4]);
        assert!(matches!(
            pool.roll(&mut script),
            Err(MechError::ScriptExhausted(2))
        ));
    }

    #[test]
    fn scripted_faces_reject_impossible_face() {
        let pool = DicePool::new(1, Die::D6).unwrap();
        let mut script = ScriptedFaces::new([7]);
        assert!(matches!(
            pool.roll(&mut script),
            Err(MechError::InvalidArgument(_))
        ));
    }

    #[test]
    fn faces_are_lazy() {
        let pool = DicePool::new(4, Die::D6).unwrap();
        let mut script = ScriptedFaces::new([1, 2, 3, 4]);
        let first_two: Vec<u32> = pool
            .faces(&mut script)
            .take(2)
            .collect::<MechResult<_>>()
            .unwrap();
        assert_eq!(first_two, vec![1, 2]);
        assert_eq!(script.remaining(), 2);
    }

    proptest! {
        #[test]
        fn roll_yields_count_faces_in_range(count in 1u32..40, sides in 2u32..120, seed in any::<u64>()) {
            let die = Die::from_sides(sides).unwrap();
            let pool = DicePool::new(count, die).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let result = pool.roll(&mut rng).unwrap();
            prop_assert_eq!(result.faces().len(), count as usize);
            prop_assert!(result.faces().iter().all(|f| (1..=sides).contains(f)));
        }
    }
}
