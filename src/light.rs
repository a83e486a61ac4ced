//! The green/red light state machine.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green,
    Red,
}

/// Alternates between green and red on elapsed-time triggers. Each phase has
/// its own dwell duration; the game starts green.
///
/// The controller only flips phases. Capturing the motion reference frame on
/// a switch to red is the engine's job, since the controller never sees
/// camera frames.
#[derive(Debug)]
pub struct LightController {
    phase: Phase,
    green_dwell: Duration,
    red_dwell: Duration,
    switched_at: Instant,
}

impl LightController {
    pub fn new(green_dwell: Duration, red_dwell: Duration, now: Instant) -> Self {
        Self {
            phase: Phase::Green,
            green_dwell,
            red_dwell,
            switched_at: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn dwell(&self) -> Duration {
        match self.phase {
            Phase::Green => self.green_dwell,
            Phase::Red => self.red_dwell,
        }
    }

    /// Flips the light if the current phase has dwelt long enough. Returns
    /// the new phase when a switch fired, `None` otherwise.
    pub fn tick(&mut self, now: Instant) -> Option<Phase> {
        if now.duration_since(self.switched_at) < self.dwell() {
            return None;
        }
        self.phase = match self.phase {
            Phase::Green => Phase::Red,
            Phase::Red => Phase::Green,
        };
        self.switched_at = now;
        debug!(phase = ?self.phase, "light switched");
        Some(self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn starts_green_and_holds_until_dwell_elapses() {
        let t0 = Instant::now();
        let mut light = LightController::new(SECOND, SECOND, t0);
        assert_eq!(light.phase(), Phase::Green);
        assert_eq!(light.tick(t0 + Duration::from_millis(999)), None);
        assert_eq!(light.phase(), Phase::Green);
        assert_eq!(light.tick(t0 + SECOND), Some(Phase::Red));
    }

    #[test]
    fn phases_strictly_alternate() {
        let t0 = Instant::now();
        let mut light = LightController::new(SECOND, SECOND, t0);
        let mut previous = light.phase();
        let mut switches = 0;
        for ms in (0..10_000).step_by(10) {
            if let Some(phase) = light.tick(t0 + Duration::from_millis(ms)) {
                assert_ne!(phase, previous);
                previous = phase;
                switches += 1;
            }
        }
        assert!(switches >= 9);
    }

    #[test]
    fn per_phase_dwells_are_independent() {
        let t0 = Instant::now();
        let mut light =
            LightController::new(Duration::from_millis(500), Duration::from_millis(2000), t0);

        // Green half a second, then red for two full seconds.
        assert_eq!(light.tick(t0 + Duration::from_millis(500)), Some(Phase::Red));
        assert_eq!(light.tick(t0 + Duration::from_millis(2400)), None);
        assert_eq!(
            light.tick(t0 + Duration::from_millis(2500)),
            Some(Phase::Green)
        );
    }
}
