//! Camera framing: turns a tracked focus point into a visible x range

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::interval::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera position relative to the focus point
    pub offset: Vec3,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Width over height of the viewport
    pub aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(5.0, 2.0, -20.0),
            field_of_view: 60.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Perspective camera that follows the runner at a fixed offset
#[derive(Debug, Clone)]
pub struct TrackingCamera {
    offset: Vec3,
    position: Vec3,
    /// Half-width of the view along x per unit of depth from the camera
    view_factor_x: f32,
}

impl TrackingCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let view_factor_y = (config.field_of_view * 0.5).to_radians().tan();
        Self {
            offset: config.offset,
            position: config.offset,
            view_factor_x: view_factor_y * config.aspect,
        }
    }

    /// Move back to the origin focus
    pub fn start_new_game(&mut self) {
        self.track(Vec3::ZERO);
    }

    pub fn track(&mut self, focus_point: Vec3) {
        self.position = focus_point + self.offset;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_factor_x(&self) -> f32 {
        self.view_factor_x
    }

    /// Visible x range on the plane at depth `z`
    pub fn visible_x(&self, z: f32) -> Interval {
        Interval::from_center_extent(self.position.x, self.view_factor_x * (z - self.position.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> TrackingCamera {
        TrackingCamera::new(&CameraConfig {
            offset: Vec3::new(0.0, 0.0, -10.0),
            field_of_view: 90.0,
            aspect: 2.0,
        })
    }

    #[test]
    fn test_view_factor() {
        // tan(45°) * 2
        assert!((camera().view_factor_x() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_visible_x_grows_with_depth() {
        let camera = camera();
        let near = camera.visible_x(0.0);
        let far = camera.visible_x(10.0);
        assert!((near.min + 20.0).abs() < 1e-4);
        assert!((near.max - 20.0).abs() < 1e-4);
        assert!((far.size() - 2.0 * near.size()).abs() < 1e-3);
    }

    #[test]
    fn test_track_applies_offset() {
        let mut camera = camera();
        camera.track(Vec3::new(7.0, 3.0, 0.0));
        assert_eq!(camera.position(), Vec3::new(7.0, 3.0, -10.0));
        let visible = camera.visible_x(0.0);
        assert!(((visible.min + visible.max) * 0.5 - 7.0).abs() < 1e-4);

        camera.start_new_game();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -10.0));
    }
}
