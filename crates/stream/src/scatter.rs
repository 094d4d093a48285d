use glam::Vec3;
use highway_assets::{Prototype, PrototypeKind, PrototypeRegistry};
use highway_common::{AssetId, Transform};
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::StreamConfig;

/// Grass blades grow to `base * (GRASS_BLADE_GROWTH + u)`.
const GRASS_BLADE_GROWTH: f32 = 1.5;

/// One placed clone of a prototype, in its segment's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub kind: PrototypeKind,
    pub prototype: AssetId,
    pub transform: Transform,
    /// Tagged for the environment lighting pass.
    pub reactive: bool,
}

/// What one or more `scatter` calls did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScatterReport {
    pub placed: usize,
    /// Objects whose prototype slot was empty.
    pub skipped_missing: usize,
    /// Objects dropped after the lateral resample budget ran out.
    pub skipped_exhausted: usize,
    /// Grass blades that landed outside the shoulder or on the road.
    pub blades_dropped: usize,
}

impl ScatterReport {
    pub fn merge(&mut self, other: ScatterReport) {
        self.placed += other.placed;
        self.skipped_missing += other.skipped_missing;
        self.skipped_exhausted += other.skipped_exhausted;
        self.blades_dropped += other.blades_dropped;
    }
}

/// Scatters roadside decoration over one shoulder strip.
///
/// Every accepted instance lies within the tile's half-length band, inside
/// its shoulder, and never closer to the road axis than the keep-out
/// half-width (itself never less than the drivable half-width).
pub struct Scatter<'a> {
    config: &'a StreamConfig,
    prototypes: &'a PrototypeRegistry,
}

impl<'a> Scatter<'a> {
    pub fn new(config: &'a StreamConfig, prototypes: &'a PrototypeRegistry) -> Self {
        Self { config, prototypes }
    }

    /// Place 2..=4 (by default) objects on the shoulder centred at
    /// `side_offset`. Appends to `out` and reports what was skipped.
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        side_offset: f32,
        out: &mut Vec<Decoration>,
        rng: &mut R,
    ) -> ScatterReport {
        let s = &self.config.scenery;
        let mut report = ScatterReport::default();
        let count = rng.gen_range(s.objects_min..=s.objects_max);

        for _ in 0..count {
            let roll: f32 = rng.gen_range(0.0f32..1.0);
            let kind = if roll < s.tree_probability {
                PrototypeKind::Tree
            } else if roll < s.tree_probability + s.rock_probability {
                PrototypeKind::Rock
            } else {
                PrototypeKind::Grass
            };

            let Some(prototype) = self.prototypes.prototype(kind) else {
                tracing::trace!(kind = kind.label(), "prototype not ready, placement skipped");
                report.skipped_missing += 1;
                continue;
            };

            let Some(x) = self.sample_lateral(side_offset, rng) else {
                tracing::debug!(
                    kind = kind.label(),
                    side_offset,
                    "lateral resample budget exhausted, object skipped"
                );
                report.skipped_exhausted += 1;
                continue;
            };

            match kind {
                PrototypeKind::Tree => {
                    let z = centred(rng, s.tree_spread);
                    let jitter = rng.gen_range(0.0f32..1.0) * s.tree_scale_jitter;
                    let scale = s.tree_scale * (1.0 + jitter);
                    let yaw = centred(rng, s.tree_yaw_jitter);
                    out.push(self.instance(prototype, x, z, scale, yaw));
                    report.placed += 1;
                }
                PrototypeKind::Rock => {
                    let z = centred(rng, self.config.tile_length);
                    let scale = rng.gen_range(s.rock_scale_min..=s.rock_scale_max);
                    let yaw = rng.gen_range(0.0..TAU);
                    out.push(self.instance(prototype, x, z, scale, yaw));
                    report.placed += 1;
                }
                PrototypeKind::Grass => {
                    let z = centred(rng, self.config.tile_length);
                    self.grass_patch(prototype, side_offset, x, z, out, &mut report, rng);
                }
            }
        }

        report
    }

    /// True if a point in segment space may hold decoration for the shoulder
    /// centred at `side_offset`.
    pub fn accepts(&self, side_offset: f32, x: f32, z: f32) -> bool {
        let half_len = self.config.tile_length / 2.0;
        let half_shoulder = self.config.shoulder_width / 2.0;
        z.abs() <= half_len
            && (x - side_offset).abs() <= half_shoulder
            && x.abs() >= self.config.lateral_keepout()
    }

    /// Bounded reject-and-resample of a lateral coordinate inside the shoulder.
    fn sample_lateral<R: Rng + ?Sized>(&self, side_offset: f32, rng: &mut R) -> Option<f32> {
        let width = self.config.shoulder_width;
        for _ in 0..self.config.scenery.max_resample_attempts {
            let x = side_offset + centred(rng, width);
            if self.accepts(side_offset, x, 0.0) {
                return Some(x);
            }
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn grass_patch<R: Rng + ?Sized>(
        &self,
        prototype: &Prototype,
        side_offset: f32,
        x: f32,
        z: f32,
        out: &mut Vec<Decoration>,
        report: &mut ScatterReport,
        rng: &mut R,
    ) {
        let s = &self.config.scenery;
        let base = rng.gen_range(s.grass_scale_min..=s.grass_scale_max);
        let blades = rng.gen_range(0..=s.grass_blades_max);
        let mut kept = 0;
        for _ in 0..blades {
            let bx = x + centred(rng, s.grass_patch_size);
            let bz = z + centred(rng, s.grass_patch_size);
            let scale = base * (GRASS_BLADE_GROWTH + rng.gen_range(0.0f32..1.0));
            let yaw = rng.gen_range(0.0..TAU);
            if !self.accepts(side_offset, bx, bz) {
                report.blades_dropped += 1;
                continue;
            }
            out.push(self.instance(prototype, bx, bz, scale, yaw));
            kept += 1;
        }
        if kept > 0 {
            report.placed += 1;
        }
    }

    fn instance(&self, prototype: &Prototype, x: f32, z: f32, scale: f32, yaw: f32) -> Decoration {
        let y = self.config.shoulder_height - prototype.base_offset * scale;
        Decoration {
            kind: prototype.kind,
            prototype: prototype.id,
            transform: Transform::from_translation(Vec3::new(x, y, z))
                .with_scale_and_yaw(scale, yaw),
            reactive: true,
        }
    }
}

/// Uniform sample in `[-span/2, span/2)`.
fn centred<R: Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    (rng.gen_range(0.0f32..1.0) - 0.5) * span
}
