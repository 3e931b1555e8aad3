//! Riddles and ordered-sequence puzzles with bounded attempts.
//!
//! Answers and sequence elements are normalized (trimmed, lowercased) once
//! when stored and once per guess, so matching is case-insensitive.

use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TurnTick;
use crate::error::{SimError, SimResult};

/// The kind of puzzle and its solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PuzzleKind {
    /// Solved by speaking the answer.
    Riddle {
        /// Expected answer.
        answer: String,
    },
    /// Solved by pressing elements in order.
    Sequence {
        /// Expected order of elements.
        expected: Vec<String>,
    },
}

/// Where a puzzle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleState {
    /// Open for attempts.
    Unsolved,
    /// Done.
    Solved,
    /// Out of attempts; may reset later.
    Failed,
}

/// Result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PuzzleOutcome {
    /// The puzzle is now solved.
    Solved,
    /// Wrong. `attempts_left` is `None` when attempts are unlimited.
    Incorrect {
        /// Attempts remaining before the puzzle fails.
        attempts_left: Option<u32>,
    },
    /// A correct sequence element; more are needed.
    Progress,
    /// Wrong, and out of attempts.
    Failed,
    /// Solved earlier.
    AlreadySolved,
    /// Failed earlier and not yet reset.
    Locked,
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A puzzle with an attempt budget and an optional delayed reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    puzzle_id: CatalogId,
    kind: PuzzleKind,
    state: PuzzleState,
    attempts: u32,
    max_attempts: Option<u32>,
    can_reset: bool,
    reset_delay: u32,
    reset_remaining: Option<u32>,
    progress: usize,
}

impl Puzzle {
    /// Create an unsolved puzzle with unlimited attempts.
    pub fn new(puzzle_id: CatalogId, kind: PuzzleKind) -> SimResult<Self> {
        let kind = match kind {
            PuzzleKind::Riddle { answer } => PuzzleKind::Riddle {
                answer: normalize(&answer),
            },
            PuzzleKind::Sequence { expected } => PuzzleKind::Sequence {
                expected: expected.iter().map(|e| normalize(e)).collect(),
            },
        };
        let empty = match &kind {
            PuzzleKind::Riddle { answer } => answer.is_empty(),
            PuzzleKind::Sequence { expected } => {
                expected.is_empty() || expected.iter().any(String::is_empty)
            }
        };
        if empty {
            return Err(SimError::InvalidArgument(format!(
                "puzzle '{puzzle_id}' has an empty solution"
            )));
        }
        Ok(Self {
            puzzle_id,
            kind,
            state: PuzzleState::Unsolved,
            attempts: 0,
            max_attempts: None,
            can_reset: false,
            reset_delay: 0,
            reset_remaining: None,
            progress: 0,
        })
    }

    /// Limit attempts. `-1` means unlimited; otherwise at least one.
    pub fn with_max_attempts(mut self, raw: i32) -> SimResult<Self> {
        self.max_attempts = match raw {
            -1 => None,
            n if n >= 1 => Some(n.unsigned_abs()),
            n => {
                return Err(SimError::InvalidArgument(format!(
                    "max attempts must be -1 (unlimited) or positive, got {n}"
                )));
            }
        };
        Ok(self)
    }

    /// Let a failed puzzle reset to unsolved after `delay` rounds (at least one).
    pub fn resettable(mut self, delay: u32) -> SimResult<Self> {
        if delay == 0 {
            return Err(SimError::InvalidArgument(format!(
                "puzzle '{}' reset delay must be at least one round",
                self.puzzle_id
            )));
        }
        self.can_reset = true;
        self.reset_delay = delay;
        Ok(self)
    }

    /// Replace the expected order of a sequence puzzle and clear progress.
    pub fn set_sequence<S: AsRef<str>>(&mut self, expected: &[S]) -> SimResult<()> {
        let PuzzleKind::Sequence { expected: current } = &mut self.kind else {
            return Err(SimError::InvalidOperation(format!(
                "puzzle '{}' is not a sequence puzzle",
                self.puzzle_id
            )));
        };
        let normalized: Vec<String> = expected.iter().map(|e| normalize(e.as_ref())).collect();
        if normalized.is_empty() || normalized.iter().any(String::is_empty) {
            return Err(SimError::InvalidArgument(format!(
                "puzzle '{}' needs a non-empty sequence",
                self.puzzle_id
            )));
        }
        *current = normalized;
        self.progress = 0;
        Ok(())
    }

    /// Answer a riddle.
    pub fn attempt(&mut self, answer: &str) -> SimResult<PuzzleOutcome> {
        let PuzzleKind::Riddle { answer: expected } = &self.kind else {
            return Err(SimError::InvalidOperation(format!(
                "puzzle '{}' is not a riddle",
                self.puzzle_id
            )));
        };
        if let Some(outcome) = self.closed_outcome() {
            return Ok(outcome);
        }
        if normalize(answer) == *expected {
            return Ok(self.solve());
        }
        Ok(self.register_failure())
    }

    /// Press the next element of a sequence puzzle. A wrong element costs
    /// an attempt and restarts the sequence.
    pub fn press(&mut self, element: &str) -> SimResult<PuzzleOutcome> {
        let PuzzleKind::Sequence { expected } = &self.kind else {
            return Err(SimError::InvalidOperation(format!(
                "puzzle '{}' is not a sequence puzzle",
                self.puzzle_id
            )));
        };
        if let Some(outcome) = self.closed_outcome() {
            return Ok(outcome);
        }
        let len = expected.len();
        if expected.get(self.progress).is_some_and(|e| *e == normalize(element)) {
            self.progress += 1;
            if self.progress == len {
                return Ok(self.solve());
            }
            return Ok(PuzzleOutcome::Progress);
        }
        self.progress = 0;
        Ok(self.register_failure())
    }

    fn closed_outcome(&self) -> Option<PuzzleOutcome> {
        match self.state {
            PuzzleState::Solved => Some(PuzzleOutcome::AlreadySolved),
            PuzzleState::Failed => Some(PuzzleOutcome::Locked),
            PuzzleState::Unsolved => None,
        }
    }

    fn solve(&mut self) -> PuzzleOutcome {
        self.state = PuzzleState::Solved;
        debug!(puzzle = %self.puzzle_id, attempts = self.attempts, "puzzle solved");
        PuzzleOutcome::Solved
    }

    fn register_failure(&mut self) -> PuzzleOutcome {
        self.attempts += 1;
        match self.max_attempts {
            Some(max) if self.attempts >= max => {
                self.state = PuzzleState::Failed;
                if self.can_reset {
                    self.reset_remaining = Some(self.reset_delay);
                }
                debug!(puzzle = %self.puzzle_id, can_reset = self.can_reset, "puzzle failed");
                PuzzleOutcome::Failed
            }
            max => PuzzleOutcome::Incorrect {
                attempts_left: max.map(|m| m - self.attempts),
            },
        }
    }

    /// Catalog id.
    pub fn puzzle_id(&self) -> &CatalogId {
        &self.puzzle_id
    }

    /// Kind and solution.
    pub fn kind(&self) -> &PuzzleKind {
        &self.kind
    }

    /// Current state.
    pub fn state(&self) -> PuzzleState {
        self.state
    }

    /// Failed attempts since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Attempts before failure, `None` when unlimited.
    pub fn attempts_left(&self) -> Option<u32> {
        self.max_attempts.map(|m| m.saturating_sub(self.attempts))
    }

    /// Correct sequence elements pressed so far.
    pub fn progress(&self) -> usize {
        self.progress
    }

    /// Rounds until a failed puzzle resets.
    pub fn reset_remaining(&self) -> Option<u32> {
        self.reset_remaining
    }
}

impl TurnTick for Puzzle {
    fn process_turn_tick(&mut self) -> bool {
        if self.state != PuzzleState::Failed {
            return false;
        }
        let Some(remaining) = self.reset_remaining.as_mut() else {
            return false;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return false;
        }
        self.reset_remaining = None;
        self.state = PuzzleState::Unsolved;
        self.attempts = 0;
        self.progress = 0;
        debug!(puzzle = %self.puzzle_id, "puzzle reset");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riddle() -> Puzzle {
        Puzzle::new(
            CatalogId::new("sphinx").unwrap(),
            PuzzleKind::Riddle {
                answer: "  Echo ".into(),
            },
        )
        .unwrap()
    }

    fn sequence() -> Puzzle {
        Puzzle::new(
            CatalogId::new("runes").unwrap(),
            PuzzleKind::Sequence {
                expected: vec!["Sun".into(), "Moon".into(), "Star".into()],
            },
        )
        .unwrap()
    }

    #[test]
    fn riddle_answers_match_case_insensitively() {
        let mut p = riddle();
        assert_eq!(
            p.attempt("wind").unwrap(),
            PuzzleOutcome::Incorrect { attempts_left: None }
        );
        assert_eq!(p.attempt("ECHO").unwrap(), PuzzleOutcome::Solved);
        assert_eq!(p.attempt("echo").unwrap(), PuzzleOutcome::AlreadySolved);
    }

    #[test]
    fn running_out_of_attempts_fails() {
        let mut p = riddle().with_max_attempts(2).unwrap();
        assert_eq!(
            p.attempt("a").unwrap(),
            PuzzleOutcome::Incorrect {
                attempts_left: Some(1)
            }
        );
        assert_eq!(p.attempt("b").unwrap(), PuzzleOutcome::Failed);
        assert_eq!(p.state(), PuzzleState::Failed);
        assert_eq!(p.attempt("echo").unwrap(), PuzzleOutcome::Locked);
        // Not resettable: ticking never reopens it.
        for _ in 0..5 {
            assert!(!p.process_turn_tick());
        }
        assert_eq!(p.state(), PuzzleState::Failed);
    }

    #[test]
    fn resettable_puzzle_reopens_after_delay() {
        let mut p = riddle().with_max_attempts(1).unwrap().resettable(2).unwrap();
        assert_eq!(p.attempt("nope").unwrap(), PuzzleOutcome::Failed);
        assert!(!p.process_turn_tick());
        assert!(p.process_turn_tick());
        assert_eq!(p.state(), PuzzleState::Unsolved);
        assert_eq!(p.attempts(), 0);
        assert!(!p.process_turn_tick());
        assert_eq!(p.attempt("echo").unwrap(), PuzzleOutcome::Solved);
    }

    #[test]
    fn sequence_progress_and_restart() {
        let mut p = sequence();
        assert_eq!(p.press("sun").unwrap(), PuzzleOutcome::Progress);
        assert_eq!(p.press("star").unwrap(), PuzzleOutcome::Incorrect { attempts_left: None });
        assert_eq!(p.progress(), 0);
        assert_eq!(p.press("sun").unwrap(), PuzzleOutcome::Progress);
        assert_eq!(p.press("moon").unwrap(), PuzzleOutcome::Progress);
        assert_eq!(p.press("STAR").unwrap(), PuzzleOutcome::Solved);
    }

    #[test]
    fn wrong_kind_operations_rejected() {
        let mut r = riddle();
        assert!(matches!(r.set_sequence(&["a"]), Err(SimError::InvalidOperation(_))));
        assert!(matches!(r.press("a"), Err(SimError::InvalidOperation(_))));
        let mut s = sequence();
        assert!(matches!(s.attempt("a"), Err(SimError::InvalidOperation(_))));
        s.set_sequence(&["left", "right"]).unwrap();
        assert_eq!(s.press("left").unwrap(), PuzzleOutcome::Progress);
        assert_eq!(s.press("right").unwrap(), PuzzleOutcome::Solved);
    }

    #[test]
    fn invalid_configuration_rejected() {
        assert!(riddle().with_max_attempts(0).is_err());
        assert!(riddle().with_max_attempts(-3).is_err());
        assert!(riddle().resettable(0).is_err());
        assert!(
            Puzzle::new(
                CatalogId::new("blank").unwrap(),
                PuzzleKind::Riddle { answer: "  ".into() }
            )
            .is_err()
        );
    }
}
