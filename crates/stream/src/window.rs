use std::collections::VecDeque;
use std::time::{Duration, Instant};

use highway_assets::PrototypeRegistry;
use highway_common::NodeId;
use highway_render::Scene;
use rand::Rng;

use crate::config::StreamConfig;
use crate::segment::{Segment, SegmentFactory};

/// Identity and position of a segment at the moment it was created or evicted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRecord {
    pub id: NodeId,
    pub position: f32,
    pub decorations: usize,
}

impl SegmentRecord {
    fn of(segment: &Segment) -> Self {
        Self {
            id: segment.id(),
            position: segment.position(),
            decorations: segment.decoration_count(),
        }
    }
}

/// What one `advance` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowUpdate {
    pub evicted: Vec<SegmentRecord>,
    pub created: Option<SegmentRecord>,
}

/// Per-frame window statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct WindowStats {
    pub segments_created_this_frame: usize,
    pub segments_evicted_this_frame: usize,
    pub live_segments: usize,
    pub total_created: u64,
    pub total_evicted: u64,
    pub frame_time: Duration,
}

/// The ordered queue of live road segments.
///
/// Segments move toward `-z` as the vehicle drives. The head is evicted once
/// it falls behind the cutoff; a new tail is appended once the tail comes
/// inside the extension threshold. Positions are strictly increasing from
/// head to tail and the queue never holds more than `visible_segments`.
pub struct SegmentWindow {
    config: StreamConfig,
    segments: VecDeque<Segment>,
    bootstrapped: bool,
    stats: WindowStats,
}

impl SegmentWindow {
    pub fn new(config: StreamConfig) -> Self {
        let capacity = config.visible_segments as usize + 1;
        Self {
            config,
            segments: VecDeque::with_capacity(capacity),
            bootstrapped: false,
            stats: WindowStats::default(),
        }
    }

    /// Populate the window with `visible_segments` tiles at
    /// `i * (tile_length - overlap_length)`. Runs once; later calls do nothing.
    /// Returns the records of the tiles created.
    pub fn bootstrap<R, S>(
        &mut self,
        factory: &SegmentFactory,
        prototypes: &PrototypeRegistry,
        rng: &mut R,
        scene: &mut S,
    ) -> Vec<SegmentRecord>
    where
        R: Rng + ?Sized,
        S: Scene + ?Sized,
    {
        if self.bootstrapped {
            tracing::warn!("window already bootstrapped; ignoring");
            return Vec::new();
        }
        let _span = tracing::info_span!("window_bootstrap").entered();
        self.bootstrapped = true;

        let spacing = self.config.spacing();
        let mut created = Vec::with_capacity(self.config.visible_segments as usize);
        for i in 0..self.config.visible_segments {
            let segment = factory.create(i as f32 * spacing, prototypes, rng);
            created.push(self.attach(segment, scene));
        }
        self.stats.total_created += created.len() as u64;
        self.stats.live_segments = self.segments.len();

        tracing::info!(
            segments = created.len(),
            tail = self.tail_position(),
            "window bootstrapped"
        );
        created
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Move every live segment back by `delta`.
    pub fn tick<S: Scene + ?Sized>(&mut self, delta: f32, scene: &mut S) {
        for segment in self.segments.iter_mut() {
            segment.shift(delta);
            scene.set_transform(segment.id(), segment.transform());
        }
    }

    /// Pop and detach every head segment positioned below `cutoff`.
    pub fn evict_behind<S: Scene + ?Sized>(&mut self, cutoff: f32, scene: &mut S) -> Vec<SegmentRecord> {
        let mut evicted = Vec::new();
        while self
            .segments
            .front()
            .is_some_and(|head| head.position() < cutoff)
        {
            let Some(segment) = self.segments.pop_front() else {
                break;
            };
            let record = SegmentRecord::of(&segment);
            if scene.remove(segment.id()).is_none() {
                tracing::warn!(id = %segment.id().short(), "evicted segment was not in the scene");
            }
            tracing::debug!(
                id = %record.id.short(),
                position = record.position,
                decorations = record.decorations,
                "evicting segment"
            );
            evicted.push(record);
            // Dropping the segment releases its strips and decorations.
        }
        evicted
    }

    /// Append one segment at `tail + tile_length - overlap_length` if the
    /// tail is inside the extension threshold and the window has room.
    pub fn extend_forward<R, S>(
        &mut self,
        factory: &SegmentFactory,
        prototypes: &PrototypeRegistry,
        rng: &mut R,
        scene: &mut S,
    ) -> Option<SegmentRecord>
    where
        R: Rng + ?Sized,
        S: Scene + ?Sized,
    {
        if self.segments.len() >= self.capacity() {
            return None;
        }
        let next = match self.tail_position() {
            Some(tail) if tail < self.extension_threshold() => {
                tail + self.config.tile_length - self.config.overlap_length
            }
            Some(_) => return None,
            // Everything was evicted in one frame; restart the road at the origin.
            None => 0.0,
        };
        let segment = factory.create(next, prototypes, rng);
        let record = self.attach(segment, scene);
        tracing::debug!(id = %record.id.short(), position = next, "creating segment");
        Some(record)
    }

    /// One frame of streaming: shift, evict, then extend.
    ///
    /// Eviction always runs before extension so the queue stays within
    /// capacity. Does nothing before bootstrap.
    pub fn advance<R, S>(
        &mut self,
        delta: f32,
        factory: &SegmentFactory,
        prototypes: &PrototypeRegistry,
        rng: &mut R,
        scene: &mut S,
    ) -> WindowUpdate
    where
        R: Rng + ?Sized,
        S: Scene + ?Sized,
    {
        if !self.bootstrapped {
            return WindowUpdate::default();
        }
        let _span = tracing::info_span!("window_advance").entered();
        let frame_start = Instant::now();

        self.tick(delta, scene);
        let evicted = self.evict_behind(self.eviction_cutoff(), scene);
        let created = self.extend_forward(factory, prototypes, rng, scene);

        self.stats = WindowStats {
            segments_created_this_frame: created.is_some() as usize,
            segments_evicted_this_frame: evicted.len(),
            live_segments: self.segments.len(),
            total_created: self.stats.total_created + created.is_some() as u64,
            total_evicted: self.stats.total_evicted + evicted.len() as u64,
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            delta,
            created = self.stats.segments_created_this_frame,
            evicted = self.stats.segments_evicted_this_frame,
            live = self.stats.live_segments,
            "window advance complete"
        );

        WindowUpdate { evicted, created }
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Most segments the window holds at once.
    pub fn capacity(&self) -> usize {
        self.config.visible_segments as usize
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Positions front to back.
    pub fn positions(&self) -> Vec<f32> {
        self.segments.iter().map(Segment::position).collect()
    }

    pub fn head_position(&self) -> Option<f32> {
        self.segments.front().map(Segment::position)
    }

    pub fn tail_position(&self) -> Option<f32> {
        self.segments.back().map(Segment::position)
    }

    pub fn eviction_cutoff(&self) -> f32 {
        self.config.eviction_cutoff()
    }

    pub fn extension_threshold(&self) -> f32 {
        self.config.extension_threshold()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Statistics from the last `advance`.
    pub fn stats(&self) -> &WindowStats {
        &self.stats
    }

    fn attach<S: Scene + ?Sized>(&mut self, segment: Segment, scene: &mut S) -> SegmentRecord {
        let record = SegmentRecord::of(&segment);
        scene.add(segment.scene_node());
        self.segments.push_back(segment);
        record
    }
}
