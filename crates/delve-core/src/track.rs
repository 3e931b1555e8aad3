//! Clamped numeric resources such as hit points.
//!
//! A track never leaves its `[min, max]` range; damage and healing are
//! expressed as deltas and the track reports how much actually applied.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A named numeric resource clamped between min and max.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrackSnapshot")]
pub struct Track {
    /// Display name of the track.
    pub name: String,
    current: i32,
    max: i32,
    min: i32,
}

/// Wire form of a [`Track`], checked before it becomes one.
#[derive(Deserialize)]
struct TrackSnapshot {
    name: String,
    current: i32,
    max: i32,
    #[serde(default)]
    min: i32,
}

impl TryFrom<TrackSnapshot> for Track {
    type Error = CoreError;

    fn try_from(raw: TrackSnapshot) -> CoreResult<Self> {
        if raw.max <= 0 {
            return Err(CoreError::InvalidValue(format!(
                "track maximum must be positive, got {}",
                raw.max
            )));
        }
        if raw.min > raw.max {
            return Err(CoreError::InvalidValue(format!(
                "track minimum {} is above its maximum {}",
                raw.min, raw.max
            )));
        }
        if !(raw.min..=raw.max).contains(&raw.current) {
            return Err(CoreError::InvalidValue(format!(
                "track value {} is outside [{}, {}]",
                raw.current, raw.min, raw.max
            )));
        }
        Ok(Self {
            name: raw.name,
            current: raw.current,
            max: raw.max,
            min: raw.min,
        })
    }
}

impl Track {
    /// Create a new track starting full. `max` must be positive.
    pub fn new(name: impl Into<String>, max: i32) -> CoreResult<Self> {
        if max <= 0 {
            return Err(CoreError::InvalidValue(format!(
                "track maximum must be positive, got {max}"
            )));
        }
        Ok(Self {
            name: name.into(),
            current: max,
            max,
            min: 0,
        })
    }

    /// Create a track with an explicit starting value, clamped into range.
    pub fn with_current(name: impl Into<String>, current: i32, max: i32) -> CoreResult<Self> {
        let mut track = Self::new(name, max)?;
        track.current = current.clamp(track.min, track.max);
        Ok(track)
    }

    /// Current value.
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Maximum value.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Adjust the track by a delta, clamping to bounds. Returns the new value.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.current = self.current.saturating_add(delta).clamp(self.min, self.max);
        self.current
    }

    /// Remove up to `amount` points. Returns the amount actually removed.
    pub fn drain(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.adjust(-amount.max(0));
        before - self.current
    }

    /// Restore up to `amount` points. Returns the amount actually restored.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.adjust(amount.max(0));
        self.current - before
    }

    /// Returns true if the track is at its minimum value.
    pub fn is_empty(&self) -> bool {
        self.current <= self.min
    }

    /// Returns true if the track is at its maximum value.
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{}", self.name, self.current, self.max)
    }
}
