//! Procedural skyline generation
//!
//! A generator keeps a chain of segments covering the camera's visible x
//! range (plus a border) at a fixed depth. Segments that fall behind the view
//! are recycled into the pool, and new ones are appended as the view moves
//! right. Adjacent segments within a sequence share an altitude. Altitude
//! only changes across a gap, which is filled with a gap segment when a gap
//! prefab is configured.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::TrackingCamera;
use super::interval::Interval;
use super::segment::{Chain, PrefabId, SegmentId, SegmentPool, SegmentPrefab};
use crate::consts::VIEW_BORDER;

fn default_border() -> f32 {
    VIEW_BORDER
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Prefabs to pick from, uniformly at random
    pub prefabs: Vec<SegmentPrefab>,
    /// Segment that fills the space between sequences
    #[serde(default)]
    pub gap_prefab: Option<SegmentPrefab>,
    /// Depth (z) the segments are placed at
    pub distance: f32,
    pub altitude: Interval,
    pub gap_length: Interval,
    pub sequence_length: Interval,
    /// Extra coverage on both sides of the visible range
    #[serde(default = "default_border")]
    pub border: f32,
}

/// Tweaks for a single [`SkylineGenerator::fill_view_with`] call
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    /// Added to every gap length drawn during this fill
    pub extra_gap_length: f32,
    /// Added to every sequence length drawn during this fill
    pub extra_sequence_length: f32,
    /// Segment that must stay in the chain; recycling stops at it
    pub keep: Option<SegmentId>,
}

#[derive(Debug, Clone)]
pub struct SkylineGenerator {
    pool: SegmentPool,
    prefabs: Vec<PrefabId>,
    gap_prefab: Option<PrefabId>,
    distance: f32,
    altitude: Interval,
    gap_length: Interval,
    sequence_length: Interval,
    border: f32,
    /// Where the next segment goes
    end_position: Vec3,
    /// x past which the next sequence starts
    sequence_end_x: f32,
    leftmost: Option<SegmentId>,
    rightmost: Option<SegmentId>,
    rng: Pcg32,
}

impl SkylineGenerator {
    pub fn new(config: &GeneratorConfig, seed: u64) -> Self {
        let mut pool = SegmentPool::new();
        let prefabs = config.prefabs.iter().map(|p| pool.register(*p)).collect();
        let gap_prefab = config.gap_prefab.map(|p| pool.register(p));

        Self {
            pool,
            prefabs,
            gap_prefab,
            distance: config.distance,
            altitude: config.altitude,
            gap_length: config.gap_length,
            sequence_length: config.sequence_length,
            border: config.border,
            end_position: Vec3::new(0.0, 0.0, config.distance),
            sequence_end_x: 0.0,
            leftmost: None,
            rightmost: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut SegmentPool {
        &mut self.pool
    }

    pub fn leftmost(&self) -> Option<SegmentId> {
        self.leftmost
    }

    pub fn rightmost(&self) -> Option<SegmentId> {
        self.rightmost
    }

    pub fn end_position(&self) -> Vec3 {
        self.end_position
    }

    pub fn sequence_end_x(&self) -> f32 {
        self.sequence_end_x
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Segments from leftmost to rightmost
    pub fn segments(&self) -> Chain<'_> {
        self.pool.chain(self.leftmost)
    }

    /// Camera range at this generator's depth, grown by the border
    pub fn visible_range(&self, view: &TrackingCamera) -> Interval {
        view.visible_x(self.distance).grow(self.border)
    }

    /// Recycle the whole chain, place a fresh first segment at the left edge
    /// of the view and fill the rest. Returns the leftmost segment.
    pub fn start_new_game(&mut self, view: &TrackingCamera) -> SegmentId {
        let mut cursor = self.leftmost.take();
        while let Some(id) = cursor {
            cursor = self.pool.recycle(id);
        }
        self.rightmost = None;

        let visible = self.visible_range(view);
        self.end_position = Vec3::new(
            visible.min,
            self.altitude.random_value(&mut self.rng),
            self.distance,
        );
        self.sequence_end_x =
            self.end_position.x + self.sequence_length.random_value(&mut self.rng);

        let first = self.obtain_random();
        self.end_position = self.pool[first].place_after(self.end_position);
        self.leftmost = Some(first);
        self.rightmost = Some(first);

        self.fill_view(view);
        self.leftmost.unwrap_or(first)
    }

    pub fn fill_view(&mut self, view: &TrackingCamera) {
        self.fill_view_with(view, FillOptions::default());
    }

    /// Recycle segments behind the view, then extend the chain until the
    /// whole view is covered
    pub fn fill_view_with(&mut self, view: &TrackingCamera, options: FillOptions) {
        let visible = self.visible_range(view);

        while let (Some(left), Some(right)) = (self.leftmost, self.rightmost) {
            if left == right || options.keep == Some(left) || self.pool[left].max_x() >= visible.min
            {
                break;
            }
            self.leftmost = self.pool.recycle(left);
        }

        while self.end_position.x < visible.max {
            if self.end_position.x > self.sequence_end_x {
                let gap = self.gap_length.random_value(&mut self.rng) + options.extra_gap_length;
                let sequence = self.sequence_length.random_value(&mut self.rng)
                    + options.extra_sequence_length;
                self.start_new_sequence(gap, sequence);
            }
            let id = self.obtain_random();
            self.append(id);
            self.end_position = self.pool[id].place_after(self.end_position);
        }
    }

    fn start_new_sequence(&mut self, gap: f32, sequence: f32) {
        if let Some(prefab) = self.gap_prefab {
            let id = self.pool.obtain(prefab, &mut self.rng);
            self.append(id);
            self.pool[id].fill_gap(self.end_position, gap);
        }

        self.end_position.x += gap;
        self.end_position.y = self.altitude.random_value(&mut self.rng);
        self.sequence_end_x = self.end_position.x + sequence;
        log::debug!(
            "New sequence at x={:.2}: gap={:.2}, altitude={:.2}, ends at {:.2}",
            self.end_position.x - gap,
            gap,
            self.end_position.y,
            self.sequence_end_x
        );
    }

    fn obtain_random(&mut self) -> SegmentId {
        let prefab = self.prefabs[self.rng.random_range(0..self.prefabs.len())];
        self.pool.obtain(prefab, &mut self.rng)
    }

    fn append(&mut self, id: SegmentId) {
        match self.rightmost {
            Some(right) => self.pool.link(right, id),
            None => self.leftmost = Some(id),
        }
        self.rightmost = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::camera::CameraConfig;
    use proptest::prelude::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            prefabs: vec![
                SegmentPrefab::plain(1.0, Interval::new(0.0, 4.0)),
                SegmentPrefab::plain(2.5, Interval::new(0.0, 6.0)),
            ],
            gap_prefab: Some(SegmentPrefab::gap(Interval::new(-10.0, 10.0))),
            distance: 0.0,
            altitude: Interval::new(-2.0, 2.0),
            gap_length: Interval::new(1.0, 3.0),
            sequence_length: Interval::new(5.0, 15.0),
            border: 10.0,
        }
    }

    fn camera() -> TrackingCamera {
        TrackingCamera::new(&CameraConfig {
            offset: Vec3::new(0.0, 0.0, -10.0),
            field_of_view: 60.0,
            aspect: 1.5,
        })
    }

    /// Chain is contiguous, strictly increasing and spans the visible range
    fn assert_covers(generator: &SkylineGenerator, view: &TrackingCamera) {
        let visible = generator.visible_range(view);
        let chain: Vec<_> = generator.segments().collect();
        assert!(!chain.is_empty());
        assert_eq!(chain.last().map(|(id, _)| *id), generator.rightmost());

        let (_, first) = chain[0];
        assert!(first.min_x() <= visible.min + 1e-3);
        assert!(first.max_x() >= visible.min || chain.len() == 1);
        assert!(generator.end_position().x >= visible.max);

        for pair in chain.windows(2) {
            let (_, prev) = pair[0];
            let (_, next) = pair[1];
            assert!(next.max_x() > prev.max_x());
            assert!(
                (next.min_x() - prev.max_x()).abs() < 1e-3,
                "hole between {} and {}",
                prev.max_x(),
                next.min_x()
            );
        }
    }

    #[test]
    fn test_start_new_game_covers_view() {
        let view = camera();
        let mut generator = SkylineGenerator::new(&config(), 42);
        let first = generator.start_new_game(&view);

        assert_eq!(Some(first), generator.leftmost());
        let visible = generator.visible_range(&view);
        assert!((generator.pool()[first].min_x() - visible.min).abs() < 1e-4);
        assert_covers(&generator, &view);
    }

    #[test]
    fn test_restart_recycles_old_chain() {
        let mut view = camera();
        let mut generator = SkylineGenerator::new(&config(), 1);
        generator.start_new_game(&view);
        for step in 0..200 {
            view.track(Vec3::new(step as f32, 0.0, 0.0));
            generator.fill_view(&view);
        }

        view.start_new_game();
        generator.start_new_game(&view);
        assert_covers(&generator, &view);

        // Every allocated segment is either in the chain or waiting in a pool
        let live = generator.segments().count();
        let pooled: usize = (0..3).map(|i| generator.pool().pooled(PrefabId(i))).sum();
        assert_eq!(live + pooled, generator.pool().allocated());
    }

    #[test]
    fn test_scrolling_recycles_behind_view() {
        let mut view = camera();
        let mut generator = SkylineGenerator::new(&config(), 9);
        generator.start_new_game(&view);
        for step in 0..2000 {
            view.track(Vec3::new(step as f32 * 0.5, 0.0, 0.0));
            generator.fill_view(&view);
        }
        // Memory stays bounded by the view, not the distance travelled
        assert!(generator.pool().allocated() < 64);
        assert_covers(&generator, &view);
    }

    #[test]
    fn test_keep_blocks_recycling() {
        let mut view = camera();
        let mut generator = SkylineGenerator::new(&config(), 5);
        let first = generator.start_new_game(&view);

        view.track(Vec3::new(500.0, 0.0, 0.0));
        generator.fill_view_with(
            &view,
            FillOptions {
                keep: Some(first),
                ..Default::default()
            },
        );
        assert_eq!(generator.leftmost(), Some(first));
        assert!(generator.pool()[first].is_active());

        generator.fill_view(&view);
        assert_ne!(generator.leftmost(), Some(first));
        assert!(!generator.pool()[first].is_active());
    }

    #[test]
    fn test_sequences_share_altitude() {
        let mut view = camera();
        let mut generator = SkylineGenerator::new(&config(), 11);
        generator.start_new_game(&view);
        view.track(Vec3::new(100.0, 0.0, 0.0));
        generator.fill_view(&view);

        let chain: Vec<_> = generator.segments().map(|(_, s)| s.clone()).collect();
        for pair in chain.windows(2) {
            let gap_between = matches!(pair[0].kind(), crate::sim::SegmentKind::Gap)
                || matches!(pair[1].kind(), crate::sim::SegmentKind::Gap);
            if !gap_between {
                assert_eq!(pair[0].placement().y, pair[1].placement().y);
            }
        }
    }

    #[test]
    fn test_without_gap_prefab_leaves_holes() {
        let mut config = config();
        config.gap_prefab = None;
        config.sequence_length = Interval::new(2.0, 2.0);
        config.gap_length = Interval::new(4.0, 4.0);
        let view = camera();
        let mut generator = SkylineGenerator::new(&config, 3);
        generator.start_new_game(&view);

        let chain: Vec<_> = generator.segments().map(|(_, s)| s.clone()).collect();
        let holes = chain
            .windows(2)
            .filter(|pair| pair[1].min_x() - pair[0].max_x() > 3.9)
            .count();
        assert!(holes > 0);
    }

    #[test]
    fn test_extra_gap_length_widens_gaps() {
        let mut view = camera();
        let mut generator = SkylineGenerator::new(&config(), 8);
        generator.start_new_game(&view);
        view.track(Vec3::new(200.0, 0.0, 0.0));
        generator.fill_view_with(
            &view,
            FillOptions {
                extra_gap_length: 20.0,
                ..Default::default()
            },
        );

        let widest_gap = generator
            .segments()
            .filter(|(_, s)| matches!(s.kind(), crate::sim::SegmentKind::Gap))
            .map(|(_, s)| s.extents() * 2.0)
            .fold(0.0_f32, f32::max);
        assert!(widest_gap >= 21.0);
    }

    proptest! {
        #[test]
        fn prop_fill_view_keeps_coverage(
            seed in any::<u64>(),
            moves in prop::collection::vec(0.0f32..15.0, 1..60),
        ) {
            let mut view = camera();
            let mut generator = SkylineGenerator::new(&config(), seed);
            generator.start_new_game(&view);

            let mut x = 0.0;
            for dx in moves {
                x += dx;
                view.track(Vec3::new(x, 0.0, 0.0));
                generator.fill_view(&view);
                assert_covers(&generator, &view);
            }
        }
    }
}
