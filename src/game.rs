//! The game engine: one `tick` call per loop iteration applies all the rules.

use crate::light::{LightController, Phase};
use crate::motion::MotionDetector;
use crate::sequence::{KeyOutcome, SequenceTracker};
use image::RgbImage;
use std::time::{Duration, Instant};
use tracing::debug;

pub const QUIT_KEY: char = 'q';
pub const COUNTDOWN_SECS: u32 = 10;
const GREEN_DWELL: Duration = Duration::from_secs(1);
const RED_DWELL: Duration = Duration::from_secs(1);

/// How the run ended. Assigned exactly once, by the tick that terminates the
/// game; a mid-game camera fault is an error on the loop's result instead,
/// never an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    /// Moved during red light.
    LossMovement,
    /// Pressed a key during red light.
    LossWrongSequence,
    /// Pressed the quit key.
    LossQuit,
    /// The countdown ran out before the sequence was completed.
    LossTimeout,
}

/// All mutable game state, owned by the loop and mutated only here.
pub struct Game {
    light: LightController,
    tracker: SequenceTracker,
    motion: MotionDetector,
    countdown: u32,
    last_second: Instant,
}

impl Game {
    pub fn new(tracker: SequenceTracker, motion: MotionDetector, now: Instant) -> Self {
        Self {
            light: LightController::new(GREEN_DWELL, RED_DWELL, now),
            tracker,
            motion,
            countdown: COUNTDOWN_SECS,
            last_second: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.light.phase()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn tracker(&self) -> &SequenceTracker {
        &self.tracker
    }

    /// Runs one tick of the rules against the freshly captured `frame` and
    /// the key read this tick, if any. Returns the outcome once the run ends.
    ///
    /// Order matters: the light may flip (capturing the motion reference on a
    /// switch to red), the countdown advances, then quit beats every phase
    /// rule, red light punishes keys before movement, and green light feeds
    /// the sequence tracker.
    pub fn tick(&mut self, now: Instant, frame: &RgbImage, key: Option<char>) -> Option<Outcome> {
        if self.light.tick(now) == Some(Phase::Red) {
            self.motion.capture_reference(frame);
        }

        if now.duration_since(self.last_second) >= Duration::from_secs(1) {
            self.countdown = self.countdown.saturating_sub(1);
            self.last_second = now;
            debug!(countdown = self.countdown, "countdown tick");
        }
        if self.countdown == 0 {
            return Some(Outcome::LossTimeout);
        }

        if key == Some(QUIT_KEY) {
            return Some(Outcome::LossQuit);
        }

        match self.light.phase() {
            Phase::Red => {
                if key.is_some() {
                    return Some(Outcome::LossWrongSequence);
                }
                let score = self.motion.score(frame);
                if self.motion.is_movement(score) {
                    debug!(score, limit = self.motion.limit(), "movement over limit");
                    return Some(Outcome::LossMovement);
                }
            }
            Phase::Green => {
                if let Some(key) = key {
                    if self.tracker.on_key(key) == KeyOutcome::Completed {
                        return Some(Outcome::Win);
                    }
                }
            }
        }
        None
    }
}
