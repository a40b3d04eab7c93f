//! Game configuration
//!
//! Everything tunable lives in [`GameConfig`], loadable from JSON. Invariants
//! are checked once by [`GameConfig::validate`]; the simulation never
//! re-checks them per tick.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{
    CameraConfig, GeneratorConfig, HazardPrefab, Interval, PrefabKind, RunnerConfig,
    SegmentPrefab,
};

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite value greater than zero, got {value}")]
    NotPositive { field: String, value: f32 },
    #[error("{field} must be a finite value of at least zero, got {value}")]
    Negative { field: String, value: f32 },
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{field} is inverted or not finite: [{min}, {max}]")]
    InvalidInterval { field: String, min: f32, max: f32 },
    #[error("{field} needs at least one prefab")]
    NoPrefabs { field: String },
    #[error("{field} keys must be sorted by t")]
    UnsortedCurve { field: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for all generators
    pub seed: u64,
    /// Largest single integration step
    pub max_step: f32,
    /// Obstacle gaps grow by `speed_x * extra_gap_factor`
    pub extra_gap_factor: f32,
    /// Obstacle sequences grow by `speed_x * extra_sequence_factor`
    pub extra_sequence_factor: f32,
    pub runner: RunnerConfig,
    pub camera: CameraConfig,
    /// The chain the runner walks
    pub obstacles: GeneratorConfig,
    /// Purely visual backdrops at other depths
    pub skylines: Vec<GeneratorConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_step: MAX_STEP,
            extra_gap_factor: EXTRA_GAP_FACTOR,
            extra_sequence_factor: EXTRA_SEQUENCE_FACTOR,
            runner: RunnerConfig::default(),
            camera: CameraConfig::default(),
            obstacles: GeneratorConfig {
                prefabs: vec![
                    SegmentPrefab::plain(2.0, Interval::new(0.0, 8.0)),
                    SegmentPrefab::plain(4.0, Interval::new(0.0, 8.0)),
                    SegmentPrefab::hazard(
                        3.0,
                        Interval::new(0.0, 8.0),
                        HazardPrefab {
                            item_offset: Vec2::new(0.0, 1.5),
                            ..Default::default()
                        },
                    ),
                ],
                gap_prefab: Some(SegmentPrefab::gap(Interval::new(-4.0, 8.0))),
                distance: 0.0,
                altitude: Interval::new(-1.0, 2.0),
                gap_length: Interval::new(2.0, 4.0),
                sequence_length: Interval::new(10.0, 30.0),
                border: VIEW_BORDER,
            },
            skylines: vec![
                GeneratorConfig {
                    prefabs: vec![
                        SegmentPrefab::plain(3.0, Interval::new(-20.0, 0.0)),
                        SegmentPrefab::plain(5.0, Interval::new(-20.0, 0.0)),
                    ],
                    gap_prefab: None,
                    distance: 15.0,
                    altitude: Interval::new(2.0, 8.0),
                    gap_length: Interval::new(1.0, 3.0),
                    sequence_length: Interval::new(5.0, 15.0),
                    border: VIEW_BORDER,
                },
                GeneratorConfig {
                    prefabs: vec![SegmentPrefab::plain(6.0, Interval::new(-30.0, 0.0))],
                    gap_prefab: None,
                    distance: 40.0,
                    altitude: Interval::new(6.0, 16.0),
                    gap_length: Interval::new(0.0, 6.0),
                    sequence_length: Interval::new(10.0, 20.0),
                    border: VIEW_BORDER,
                },
            ],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_step", self.max_step)?;
        non_negative("extra_gap_factor", self.extra_gap_factor)?;
        non_negative("extra_sequence_factor", self.extra_sequence_factor)?;

        self.validate_runner()?;
        self.validate_camera()?;

        validate_generator("obstacles", &self.obstacles, &self.camera)?;
        for (i, skyline) in self.skylines.iter().enumerate() {
            validate_generator(&format!("skylines[{i}]"), skyline, &self.camera)?;
        }
        Ok(())
    }

    fn validate_runner(&self) -> Result<(), ConfigError> {
        let runner = &self.runner;
        positive("runner.extents", runner.extents)?;
        positive("runner.max_speed_x", runner.max_speed_x)?;
        in_range("runner.start_speed_x", runner.start_speed_x, 0.0, runner.max_speed_x)?;
        non_negative("runner.gravity", runner.gravity)?;
        non_negative("runner.jump_acceleration", runner.jump_acceleration)?;
        interval("runner.jump_duration", runner.jump_duration)?;
        non_negative("runner.jump_duration.min", runner.jump_duration.min)?;
        in_range("runner.collision_epsilon", runner.collision_epsilon, 0.0, runner.extents)?;
        if !runner.run_acceleration.is_sorted() {
            return Err(ConfigError::UnsortedCurve {
                field: "runner.run_acceleration".into(),
            });
        }
        Ok(())
    }

    fn validate_camera(&self) -> Result<(), ConfigError> {
        in_range("camera.field_of_view", self.camera.field_of_view, 0.0, 180.0)?;
        positive("camera.field_of_view", self.camera.field_of_view)?;
        positive("camera.aspect", self.camera.aspect)
    }
}

fn validate_generator(
    name: &str,
    config: &GeneratorConfig,
    camera: &CameraConfig,
) -> Result<(), ConfigError> {
    if config.prefabs.is_empty() {
        return Err(ConfigError::NoPrefabs {
            field: format!("{name}.prefabs"),
        });
    }
    for (i, prefab) in config.prefabs.iter().enumerate() {
        validate_prefab(&format!("{name}.prefabs[{i}]"), prefab)?;
    }

    interval(&format!("{name}.altitude"), config.altitude)?;
    interval(&format!("{name}.gap_length"), config.gap_length)?;
    interval(&format!("{name}.sequence_length"), config.sequence_length)?;
    non_negative(&format!("{name}.gap_length.min"), config.gap_length.min)?;
    non_negative(&format!("{name}.sequence_length.min"), config.sequence_length.min)?;
    non_negative(&format!("{name}.border"), config.border)?;
    positive(
        &format!("{name}.distance from camera"),
        config.distance - camera.offset.z,
    )?;

    if let Some(gap) = &config.gap_prefab {
        // Gap segments must have width to keep the chain strictly increasing
        positive(&format!("{name}.gap_length.min"), config.gap_length.min)?;
        interval(&format!("{name}.gap_prefab.aperture"), gap.aperture)?;
    }
    Ok(())
}

fn validate_prefab(name: &str, prefab: &SegmentPrefab) -> Result<(), ConfigError> {
    positive(&format!("{name}.extents"), prefab.extents)?;
    interval(&format!("{name}.aperture"), prefab.aperture)?;
    if let PrefabKind::Hazard(hazard) = &prefab.kind {
        non_negative(&format!("{name}.radius"), hazard.radius)?;
        positive(&format!("{name}.speed_factor"), hazard.speed_factor)?;
        in_range(&format!("{name}.speed_factor"), hazard.speed_factor, 0.0, 1.0)?;
        in_range(
            &format!("{name}.spawn_probability"),
            hazard.spawn_probability,
            0.0,
            1.0,
        )?;
    }
    Ok(())
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field: field.into(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field: field.into(),
            value,
        })
    }
}

fn in_range(field: &str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }
}

fn interval(field: &str, range: Interval) -> Result<(), ConfigError> {
    if range.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidInterval {
            field: field.into(),
            min: range.min,
            max: range.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "seed": 77, "max_step": 0.005 }"#).unwrap();
        assert_eq!(config.seed, 77);
        assert_eq!(config.max_step, 0.005);
        assert_eq!(config.runner, RunnerConfig::default());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_extent() {
        let mut config = GameConfig::default();
        config.obstacles.prefabs[1].extents = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { ref field, .. } if field == "obstacles.prefabs[1].extents"));
    }

    #[test]
    fn test_rejects_inverted_jump_duration() {
        let mut config = GameConfig::default();
        config.runner.jump_duration = Interval::new(0.3, 0.2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_aperture() {
        let mut config = GameConfig::default();
        config.skylines[0].prefabs[0].aperture = Interval::new(1.0, -1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval { ref field, .. }) if field == "skylines[0].prefabs[0].aperture"
        ));
    }

    #[test]
    fn test_rejects_empty_prefabs() {
        let mut config = GameConfig::default();
        config.obstacles.prefabs.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoPrefabs { .. })));
    }

    #[test]
    fn test_rejects_zero_gap_with_gap_prefab() {
        let mut config = GameConfig::default();
        config.obstacles.gap_length = Interval::new(0.0, 2.0);
        assert!(config.validate().is_err());

        config.obstacles.gap_prefab = None;
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_max_step() {
        let mut config = GameConfig::default();
        config.max_step = 0.0;
        assert!(config.validate().is_err());
        config.max_step = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_speedup_item() {
        let mut config = GameConfig::default();
        config.obstacles.prefabs[2] = SegmentPrefab::hazard(
            3.0,
            Interval::new(0.0, 8.0),
            HazardPrefab {
                speed_factor: 1.5,
                ..Default::default()
            },
        );
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_generator_behind_camera() {
        let mut config = GameConfig::default();
        config.obstacles.distance = config.camera.offset.z - 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unsorted_curve() {
        let mut config = GameConfig::default();
        config.runner.run_acceleration.keys = vec![(1.0, 0.0), (0.0, 1.0)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsortedCurve { .. })
        ));
    }
}
