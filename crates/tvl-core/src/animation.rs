#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! Animations advance by explicit `dt` and never read the wall clock, so the
//! same tick sequence always produces the same frames.

use std::time::Duration;

/// A time-based animation producing normalized progress in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current normalized progress, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Spring
// ---------------------------------------------------------------------------

/// Physical parameters of a damped spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Stiffness. Higher values pull harder toward the target.
    pub tension: f64,
    /// Damping. Higher values bleed velocity faster.
    pub friction: f64,
    /// Mass of the moving value.
    pub mass: f64,
}

impl SpringConfig {
    /// Tension 170, friction 26: quick with no visible overshoot.
    pub const DEFAULT: Self = Self {
        tension: 170.0,
        friction: 26.0,
        mass: 1.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Integration step. Ticks are split into steps of at most this length.
const STEP: f64 = 0.001;

/// Distance and speed (in normalized units) below which the spring rests.
const REST_THRESHOLD: f64 = 1e-4;

/// A damped spring interpolating a value from `from` to `to`.
///
/// The spring integrates normalized progress from 0 to 1 and maps it onto
/// `[from, to]`, so settling time does not depend on the magnitude of the
/// values. A non-finite target still settles; [`Spring::position`] then
/// reports the target as-is.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    config: SpringConfig,
    from: f64,
    to: f64,
    progress: f64,
    velocity: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring resting at `value`.
    pub fn new(value: f64) -> Self {
        Self {
            config: SpringConfig::DEFAULT,
            from: value,
            to: value,
            progress: 1.0,
            velocity: 0.0,
            at_rest: true,
        }
    }

    /// Set the spring parameters.
    #[must_use]
    pub fn config(mut self, config: SpringConfig) -> Self {
        self.config = config;
        self
    }

    /// The spring parameters in use.
    pub fn spring_config(&self) -> SpringConfig {
        self.config
    }

    /// Start moving from the current position toward `target`.
    pub fn animate_to(&mut self, target: f64) {
        self.from = self.position();
        self.to = target;
        self.progress = 0.0;
        self.velocity = 0.0;
        self.at_rest = false;
    }

    /// The value the spring is moving toward.
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Current interpolated value.
    pub fn position(&self) -> f64 {
        if self.at_rest {
            self.to
        } else if self.progress == 0.0 {
            self.from
        } else {
            self.from + (self.to - self.from) * self.progress
        }
    }

    fn step(&mut self, h: f64) {
        let SpringConfig {
            tension,
            friction,
            mass,
        } = self.config;
        let displacement = self.progress - 1.0;
        let accel = (-tension * displacement - friction * self.velocity) / mass.max(f64::EPSILON);
        self.velocity += accel * h;
        self.progress += self.velocity * h;

        if (1.0 - self.progress).abs() < REST_THRESHOLD && self.velocity.abs() < REST_THRESHOLD {
            self.progress = 1.0;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        let mut remaining = dt.as_secs_f64();
        while !self.at_rest && remaining > 0.0 {
            let h = remaining.min(STEP);
            self.step(h);
            remaining -= h;
        }
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn value(&self) -> f32 {
        (self.progress as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.velocity = 0.0;
        self.at_rest = self.from == self.to;
        if self.at_rest {
            self.progress = 1.0;
        }
    }
}
