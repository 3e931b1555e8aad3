use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{SimError, SimResult};

/// Tracks encounter time: a monotonic round counter and the in-world instant.
#[derive(Debug, Clone)]
pub struct RoundClock {
    round: u32,
    start: DateTime<Utc>,
    round_length: TimeDelta,
}

impl RoundClock {
    /// Create a clock at round 0. `round_seconds` must be positive.
    pub fn new(start: DateTime<Utc>, round_seconds: i64) -> SimResult<Self> {
        let round_length = TimeDelta::try_seconds(round_seconds)
            .filter(|d| *d > TimeDelta::zero())
            .ok_or_else(|| {
                SimError::InvalidArgument(format!(
                    "round length must be a positive number of seconds, got {round_seconds}"
                ))
            })?;
        Ok(Self {
            round: 0,
            start,
            round_length,
        })
    }

    /// Advance the clock by one round. Returns the new round number.
    pub fn advance(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    /// Current round number.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// In-world length of one round.
    pub fn round_length(&self) -> TimeDelta {
        self.round_length
    }

    /// Total in-world time elapsed since round 0.
    pub fn elapsed(&self) -> TimeDelta {
        i32::try_from(self.round)
            .ok()
            .and_then(|rounds| self.round_length.checked_mul(rounds))
            .unwrap_or(TimeDelta::MAX)
    }

    /// The current in-world instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.start
            .checked_add_signed(self.elapsed())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
