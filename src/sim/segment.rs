//! Skyline segments, their prefabs, and the recycling pool
//!
//! Segments form a singly linked chain through `next` handles. The pool owns
//! every segment ever allocated; the chain and the runner only hold
//! [`SegmentId`] handles into it. Recycled segments go back onto a free stack
//! keyed by the prefab they were built from and are reused before anything
//! new is allocated.

use std::ops::{Index, IndexMut};

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Handle to a segment owned by a [`SegmentPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(u32);

impl SegmentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a prefab within the pool it was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabId(pub usize);

/// Configuration of a slowdown item carried by hazard segments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardPrefab {
    /// Item position relative to the segment placement
    pub item_offset: Vec2,
    /// Pickup radius around the item
    pub radius: f32,
    /// Multiplier applied to the runner's horizontal speed on pickup
    pub speed_factor: f32,
    /// Chance that a freshly activated segment carries the item
    pub spawn_probability: f32,
}

impl Default for HazardPrefab {
    fn default() -> Self {
        Self {
            item_offset: Vec2::new(0.0, 1.0),
            radius: 1.0,
            speed_factor: 0.75,
            spawn_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PrefabKind {
    #[default]
    Plain,
    Gap,
    Hazard(HazardPrefab),
}

/// Template segments are instantiated from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPrefab {
    /// Half-width along the travel axis
    pub extents: f32,
    /// Open vertical range relative to the placement altitude
    pub aperture: Interval,
    #[serde(default)]
    pub kind: PrefabKind,
}

impl SegmentPrefab {
    pub fn plain(extents: f32, aperture: Interval) -> Self {
        Self {
            extents,
            aperture,
            kind: PrefabKind::Plain,
        }
    }

    /// Gap prefabs get their width from the generator at placement time
    pub fn gap(aperture: Interval) -> Self {
        Self {
            extents: 1.0,
            aperture,
            kind: PrefabKind::Gap,
        }
    }

    pub fn hazard(extents: f32, aperture: Interval, hazard: HazardPrefab) -> Self {
        Self {
            extents,
            aperture,
            kind: PrefabKind::Hazard(hazard),
        }
    }
}

/// Per-instance state of a hazard segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub item_active: bool,
    pub item_offset: Vec2,
    pub radius: f32,
    pub speed_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    Plain,
    Gap,
    Hazard(Hazard),
}

impl SegmentKind {
    fn activate<R: Rng + ?Sized>(prefab: &PrefabKind, rng: &mut R) -> Self {
        match prefab {
            PrefabKind::Plain => SegmentKind::Plain,
            PrefabKind::Gap => SegmentKind::Gap,
            PrefabKind::Hazard(h) => SegmentKind::Hazard(Hazard {
                item_active: rng.random::<f32>() < h.spawn_probability,
                item_offset: h.item_offset,
                radius: h.radius,
                speed_factor: h.speed_factor,
            }),
        }
    }
}

/// One link of the skyline chain
#[derive(Debug, Clone)]
pub struct Segment {
    extents: f32,
    aperture: Interval,
    placement: Vec3,
    next: Option<SegmentId>,
    kind: SegmentKind,
    active: bool,
    prefab: PrefabId,
}

impl Segment {
    /// Rightmost x covered by this segment
    #[inline]
    pub fn max_x(&self) -> f32 {
        self.placement.x + self.extents
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.placement.x - self.extents
    }

    /// Open vertical range in world space
    #[inline]
    pub fn aperture_y(&self) -> Interval {
        self.aperture.shift(self.placement.y)
    }

    pub fn extents(&self) -> f32 {
        self.extents
    }

    pub fn placement(&self) -> Vec3 {
        self.placement
    }

    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut SegmentKind {
        &mut self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn prefab(&self) -> PrefabId {
        self.prefab
    }

    /// Place this segment directly after `position` and return the position
    /// directly after itself
    pub fn place_after(&mut self, mut position: Vec3) -> Vec3 {
        position.x += self.extents;
        self.placement = position;
        position.x += self.extents;
        position
    }

    /// Stretch this segment over `[position.x, position.x + length]`
    pub fn fill_gap(&mut self, mut position: Vec3, length: f32) {
        self.extents = length * 0.5;
        position.x += self.extents;
        self.placement = position;
    }
}

/// Owner of all segments plus one free stack per prefab
#[derive(Debug, Clone, Default)]
pub struct SegmentPool {
    prefabs: Vec<SegmentPrefab>,
    segments: Vec<Segment>,
    free: Vec<Vec<SegmentId>>,
}

impl SegmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefab and get the id used to obtain instances of it
    pub fn register(&mut self, prefab: SegmentPrefab) -> PrefabId {
        self.prefabs.push(prefab);
        self.free.push(Vec::new());
        PrefabId(self.prefabs.len() - 1)
    }

    pub fn prefab(&self, id: PrefabId) -> &SegmentPrefab {
        &self.prefabs[id.0]
    }

    /// Pop a recycled instance of `prefab` or allocate a fresh one
    pub fn obtain<R: Rng + ?Sized>(&mut self, prefab: PrefabId, rng: &mut R) -> SegmentId {
        let template = self.prefabs[prefab.0];
        let kind = SegmentKind::activate(&template.kind, rng);

        if let Some(id) = self.free[prefab.0].pop() {
            let segment = &mut self.segments[id.index()];
            segment.extents = template.extents;
            segment.aperture = template.aperture;
            segment.kind = kind;
            segment.next = None;
            segment.active = true;
            return id;
        }

        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Segment {
            extents: template.extents,
            aperture: template.aperture,
            placement: Vec3::ZERO,
            next: None,
            kind,
            active: true,
            prefab,
        });
        id
    }

    /// Return `id` to its prefab's free stack, detaching and returning its
    /// former `next`
    pub fn recycle(&mut self, id: SegmentId) -> Option<SegmentId> {
        let segment = &mut self.segments[id.index()];
        debug_assert!(segment.active, "segment {id:?} recycled twice");
        segment.active = false;
        let next = segment.next.take();
        self.free[segment.prefab.0].push(id);
        next
    }

    /// Link `next` after `prev`
    pub fn link(&mut self, prev: SegmentId, next: SegmentId) {
        self.segments[prev.index()].next = Some(next);
    }

    pub fn get(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    pub fn get_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.index()]
    }

    /// Walk the chain starting at `from`
    pub fn chain(&self, from: Option<SegmentId>) -> Chain<'_> {
        Chain { pool: self, cursor: from }
    }

    /// Total number of segments ever allocated
    pub fn allocated(&self) -> usize {
        self.segments.len()
    }

    /// Number of recycled instances waiting for reuse
    pub fn pooled(&self, prefab: PrefabId) -> usize {
        self.free[prefab.0].len()
    }
}

impl Index<SegmentId> for SegmentPool {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Segment {
        self.get(id)
    }
}

impl IndexMut<SegmentId> for SegmentPool {
    fn index_mut(&mut self, id: SegmentId) -> &mut Segment {
        self.get_mut(id)
    }
}

/// Iterator over a chain of segments
pub struct Chain<'a> {
    pool: &'a SegmentPool,
    cursor: Option<SegmentId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let segment = self.pool.get(id);
        self.cursor = segment.next;
        Some((id, segment))
    }
}
