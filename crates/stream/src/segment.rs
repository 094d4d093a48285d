use glam::Vec3;
use highway_assets::PrototypeRegistry;
use highway_common::{AssetId, NodeId, Transform};
use highway_render::{NodeKind, SceneNode};
use rand::Rng;

use crate::config::StreamConfig;
use crate::scatter::{Decoration, Scatter, ScatterReport};

/// Shared road surface material.
pub const ROAD_MATERIAL: AssetId = AssetId(0x0000_0000_0000_0001);
/// Plain soil material used while (or if) the soil texture never loaded.
pub const FALLBACK_SOIL_MATERIAL: AssetId = AssetId(0x0000_0000_0000_0002);

/// Which side of the road a shoulder sits on. `Left` is `+x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Materials shared by every tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceMaterials {
    pub road: AssetId,
    pub soil: AssetId,
}

impl SurfaceMaterials {
    pub fn resolve(prototypes: &PrototypeRegistry) -> Self {
        Self {
            road: ROAD_MATERIAL,
            soil: prototypes
                .soil_texture()
                .map(|t| t.id)
                .unwrap_or(FALLBACK_SOIL_MATERIAL),
        }
    }
}

/// A box strip in the segment's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Strip {
    pub center: Vec3,
    pub size: Vec3,
    pub material: AssetId,
}

impl Strip {
    fn scene_node(&self, name: &str) -> SceneNode {
        SceneNode::leaf(
            name,
            Transform::from_translation(self.center),
            NodeKind::Strip {
                size: self.size,
                material: self.material,
            },
        )
    }
}

/// A shoulder strip and the decoration scattered on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shoulder {
    pub side: Side,
    /// 1-based, counted outward from the road.
    pub band: u32,
    pub strip: Strip,
    pub decorations: Vec<Decoration>,
}

/// One road tile: drivable strip, shoulders, scenery.
///
/// The only thing that changes after creation is `position`, the tile
/// centre along the road.
#[derive(Debug, Clone)]
pub struct Segment {
    id: NodeId,
    position: f32,
    road: Strip,
    shoulders: Vec<Shoulder>,
    scatter: ScatterReport,
}

impl Segment {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub(crate) fn shift(&mut self, delta: f32) {
        self.position -= delta;
    }

    pub fn road(&self) -> &Strip {
        &self.road
    }

    pub fn shoulders(&self) -> &[Shoulder] {
        &self.shoulders
    }

    pub fn decorations(&self) -> impl Iterator<Item = &Decoration> {
        self.shoulders.iter().flat_map(|s| s.decorations.iter())
    }

    pub fn decoration_count(&self) -> usize {
        self.shoulders.iter().map(|s| s.decorations.len()).sum()
    }

    /// What scenery placement did while building this tile.
    pub fn scatter_report(&self) -> ScatterReport {
        self.scatter
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(Vec3::new(0.0, 0.0, self.position))
    }

    /// Group node for the scene: road, shoulders, then one instance per decoration.
    pub fn scene_node(&self) -> SceneNode {
        let mut group = SceneNode::group(self.id, "segment", self.transform())
            .with_child(self.road.scene_node("road"));
        for shoulder in &self.shoulders {
            group = group.with_child(shoulder.strip.scene_node("shoulder"));
            for d in &shoulder.decorations {
                group = group.with_child(SceneNode::leaf(
                    d.kind.label(),
                    d.transform,
                    NodeKind::Instance {
                        prototype: d.prototype,
                        reactive: d.reactive,
                    },
                ));
            }
        }
        group
    }
}

/// Builds road tiles.
///
/// A pure function of the requested position, the prototypes loaded so far,
/// and the random source. It knows nothing about the window.
#[derive(Debug, Clone)]
pub struct SegmentFactory {
    config: StreamConfig,
}

impl SegmentFactory {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn create<R: Rng + ?Sized>(
        &self,
        position: f32,
        prototypes: &PrototypeRegistry,
        rng: &mut R,
    ) -> Segment {
        let c = &self.config;
        let materials = SurfaceMaterials::resolve(prototypes);
        let scatter = Scatter::new(c, prototypes);

        let road = Strip {
            center: Vec3::ZERO,
            size: Vec3::new(c.road_width, c.road_thickness, c.tile_length),
            material: materials.road,
        };

        let mut report = ScatterReport::default();
        let mut shoulders = Vec::with_capacity(2 * c.shoulder_bands as usize);
        for band in 1..=c.shoulder_bands {
            let offset = c.shoulder_offset(band);
            for side in [Side::Right, Side::Left] {
                let x = side.sign() * offset;
                let mut decorations = Vec::new();
                report.merge(scatter.scatter(x, &mut decorations, rng));
                shoulders.push(Shoulder {
                    side,
                    band,
                    strip: Strip {
                        center: Vec3::new(x, c.shoulder_height, 0.0),
                        size: Vec3::new(c.shoulder_width, c.road_thickness, c.tile_length),
                        material: materials.soil,
                    },
                    decorations,
                });
            }
        }

        let segment = Segment {
            id: NodeId::new(),
            position,
            road,
            shoulders,
            scatter: report,
        };
        tracing::trace!(
            position,
            decorations = segment.decoration_count(),
            skipped_missing = report.skipped_missing,
            "segment built"
        );
        segment
    }
}
