//! Gap Runner - simulation core of an endless side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (segment chain, generation, physics, camera framing)
//! - `settings`: Data-driven configuration with load-time validation

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, GameConfig};
pub use sim::{FrameInput, Game, GameEvent};

/// Default tunables
pub mod consts {
    /// Largest single integration step (120 Hz)
    pub const MAX_STEP: f32 = 1.0 / 120.0;

    /// Runner half-size
    pub const RUNNER_EXTENTS: f32 = 0.5;
    pub const RUNNER_START_SPEED: f32 = 5.0;
    pub const RUNNER_MAX_SPEED: f32 = 40.0;
    /// Horizontal acceleration at rest (falls off linearly to zero at max speed)
    pub const RUN_ACCELERATION: f32 = 10.0;
    pub const GRAVITY: f32 = 40.0;
    pub const JUMP_ACCELERATION: f32 = 100.0;
    /// Jump hold range (seconds)
    pub const JUMP_DURATION_MIN: f32 = 0.1;
    pub const JUMP_DURATION_MAX: f32 = 0.2;
    /// Tolerance when checking the body against the next aperture
    pub const COLLISION_EPSILON: f32 = 0.01;

    /// Extra coverage beyond the camera view on both sides
    pub const VIEW_BORDER: f32 = 10.0;

    /// Obstacle gap and sequence lengths grow with runner speed by these factors
    pub const EXTRA_GAP_FACTOR: f32 = 0.5;
    pub const EXTRA_SEQUENCE_FACTOR: f32 = 1.0;
}
