//! Physics-frame timing estimation.

use tracing::trace;

/// Acceptance window for one physics-time delta, in seconds.
///
/// Deltas at or below zero are resets, duplicate frames or clock
/// regressions; deltas of 0.1 s or more mean the simulation stalled and
/// resumed. Neither should pollute the average.
const DT_WINDOW_SEC: f64 = 0.1;

/// Threshold under which the smoothed average counts as unseeded.
const SEED_THRESHOLD_SEC: f64 = 1e-6;

/// Smoothed inter-frame duration derived from the simulator's own clock.
///
/// The estimator watches the physics timestamp of each received reply and
/// keeps an exponentially-weighted average of the deltas, which the control
/// loop can use to detect stalled or resumed simulation frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTiming {
    last_physics_time_s: f64,
    smoothed_dt_s: f64,
    socket_frames: u64,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the physics timestamp of a freshly received reply.
    ///
    /// The timestamp and the frame counter always advance; the smoothed
    /// average only absorbs deltas inside the acceptance window. The first
    /// accepted delta seeds the average directly so it does not have to
    /// climb up from zero.
    pub fn observe(&mut self, new_physics_time_s: f64) {
        let dt = new_physics_time_s - self.last_physics_time_s;
        if 0.0 < dt && dt < DT_WINDOW_SEC {
            if self.smoothed_dt_s < SEED_THRESHOLD_SEC {
                self.smoothed_dt_s = dt;
            } else {
                self.smoothed_dt_s = self.smoothed_dt_s * 0.98 + dt * 0.02;
            }
        } else {
            trace!(dt, "physics-time delta outside acceptance window");
        }
        self.last_physics_time_s = new_physics_time_s;
        self.socket_frames += 1;
    }

    /// Physics timestamp of the most recent reply, in seconds.
    pub fn last_physics_time_s(&self) -> f64 {
        self.last_physics_time_s
    }

    /// Smoothed inter-frame duration in seconds; 0.0 until seeded.
    pub fn smoothed_dt_s(&self) -> f64 {
        self.smoothed_dt_s
    }

    /// Number of replies observed, accepted or not.
    pub fn socket_frames(&self) -> u64 {
        self.socket_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_accepted_delta_seeds_the_average_exactly() {
        let mut timing = FrameTiming::new();
        timing.observe(0.0);
        assert_eq!(timing.smoothed_dt_s(), 0.0);

        timing.observe(0.02);
        // Seeded with dt directly, not blended up from zero.
        assert_eq!(timing.smoothed_dt_s(), 0.02);
    }

    #[test]
    fn subsequent_deltas_blend_at_two_percent() {
        let mut timing = FrameTiming::new();
        timing.observe(0.0);
        timing.observe(0.02);
        timing.observe(0.05);

        let expected = 0.02 * 0.98 + 0.03 * 0.02;
        assert!((timing.smoothed_dt_s() - expected).abs() < 1e-12);
        assert_eq!(timing.socket_frames(), 3);
    }

    #[test]
    fn regressions_update_the_clock_but_not_the_average() {
        let mut timing = FrameTiming::new();
        timing.observe(0.0);
        timing.observe(0.02);
        let smoothed = timing.smoothed_dt_s();

        timing.observe(-5.0);
        assert_eq!(timing.smoothed_dt_s(), smoothed);
        assert_eq!(timing.last_physics_time_s(), -5.0);
        assert_eq!(timing.socket_frames(), 3);
    }

    #[test]
    fn stalls_and_duplicates_are_rejected() {
        let mut timing = FrameTiming::new();
        timing.observe(0.0);
        timing.observe(0.02);
        let smoothed = timing.smoothed_dt_s();

        // Duplicate frame: dt == 0.
        timing.observe(0.02);
        assert_eq!(timing.smoothed_dt_s(), smoothed);

        // Stall-and-resume: dt at the window edge is rejected too.
        timing.observe(0.12);
        assert_eq!(timing.smoothed_dt_s(), smoothed);
        assert_eq!(timing.last_physics_time_s(), 0.12);
    }

    #[test]
    fn recovers_after_a_simulator_reset() {
        let mut timing = FrameTiming::new();
        timing.observe(100.0);
        timing.observe(100.02);

        // Reset: clock jumps back to zero, then resumes normally.
        timing.observe(0.0);
        timing.observe(0.02);
        let expected = 0.02 * 0.98 + 0.02 * 0.02;
        assert!((timing.smoothed_dt_s() - expected).abs() < 1e-12);
    }
}
