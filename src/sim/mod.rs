//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Bounded step size only
//! - Seeded RNG only
//! - Segments owned by pools, referenced by handle
//! - No rendering or platform dependencies

pub mod camera;
pub mod game;
pub mod generator;
pub mod interval;
pub mod runner;
pub mod segment;

pub use camera::{CameraConfig, TrackingCamera};
pub use game::{FrameInput, Game};
pub use generator::{FillOptions, GeneratorConfig, SkylineGenerator};
pub use interval::Interval;
pub use runner::{AccelerationCurve, GameEvent, Runner, RunnerConfig};
pub use segment::{
    Hazard, HazardPrefab, PrefabId, PrefabKind, Segment, SegmentId, SegmentKind, SegmentPool,
    SegmentPrefab,
};
