//! Timed transitions for hover feedback.
//!
//! Time is supplied by the host as milliseconds on any monotonic clock, so a
//! frame is a pure function of chart state and `now_ms`.

/// Duration of the marker grow/shrink animation.
pub const HOVER_TRANSITION_MS: f64 = 300.0;

/// Cubic ease-in-out over `t` in `0..=1`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A scalar animating from one value to another.
///
/// Starting a new transition while one is running picks up from the value
/// it had reached, so interrupted hovers never jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: f64,
    to: f64,
    start_ms: f64,
    duration_ms: f64,
}

impl Transition {
    /// A transition already at rest on `value`.
    pub fn settled(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start_ms: 0.0,
            duration_ms: 0.0,
        }
    }

    pub fn value_at(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 || now_ms >= self.start_ms + self.duration_ms {
            return self.to;
        }
        let t = ((now_ms - self.start_ms) / self.duration_ms).max(0.0);
        self.from + (self.to - self.from) * ease_cubic_in_out(t)
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_running(&self, now_ms: f64) -> bool {
        self.duration_ms > 0.0 && now_ms < self.start_ms + self.duration_ms && self.from != self.to
    }

    /// Retarget to `to`, starting from wherever the transition is at `now_ms`.
    pub fn retarget(&mut self, to: f64, now_ms: f64, duration_ms: f64) {
        let from = self.value_at(now_ms);
        *self = Self {
            from,
            to,
            start_ms: now_ms,
            duration_ms,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_is_symmetric_and_bounded() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transition_runs_for_its_duration() {
        let mut t = Transition::settled(0.0);
        t.retarget(1.0, 1000.0, HOVER_TRANSITION_MS);
        assert_eq!(t.value_at(1000.0), 0.0);
        assert_eq!(t.value_at(1150.0), 0.5);
        assert_eq!(t.value_at(1300.0), 1.0);
        assert!(t.is_running(1299.0));
        assert!(!t.is_running(1300.0));
    }

    #[test]
    fn interrupted_transition_starts_from_current_value() {
        let mut t = Transition::settled(0.0);
        t.retarget(1.0, 0.0, HOVER_TRANSITION_MS);
        t.retarget(0.0, 150.0, HOVER_TRANSITION_MS);
        assert_eq!(t.value_at(150.0), 0.5);
        assert_eq!(t.value_at(450.0), 0.0);
    }
}
