use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::view::{MountError, View};

/// Number of increments the score readout counts up in.
pub const SCORE_STEPS: u32 = 50;
/// Fixed interval between two increments.
pub const SCORE_TICK: Duration = Duration::from_millis(20);

/// Shared cancel flag. The count-up checks it before every write.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wrote an intermediate value; more ticks follow.
    Wrote(u32),
    /// Wrote the final value.
    Done(u32),
    Canceled,
}

/// Counts the score readout up from 0 to `target` in [`SCORE_STEPS`] ticks.
#[derive(Debug)]
pub struct CountUp {
    target: f64,
    increment: f64,
    current: f64,
    steps: u32,
    token: CancelToken,
}

impl CountUp {
    pub fn new(target: f64, token: CancelToken) -> Self {
        Self {
            target,
            increment: target / f64::from(SCORE_STEPS),
            current: 0.0,
            steps: 0,
            token,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.token.is_canceled() || self.steps >= SCORE_STEPS || self.current >= self.target
    }

    pub fn step<V: View>(&mut self, view: &mut V) -> Result<Step, MountError> {
        if self.token.is_canceled() {
            return Ok(Step::Canceled);
        }
        self.current += self.increment;
        self.steps += 1;
        let done = self.steps >= SCORE_STEPS || self.current >= self.target;
        if done {
            self.current = self.target;
        }
        let shown = self.current.round() as u32;
        view.set_score_readout(shown)?;
        Ok(if done {
            Step::Done(shown)
        } else {
            Step::Wrote(shown)
        })
    }
}
