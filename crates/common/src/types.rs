use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node attached to the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and text dumps.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a loaded asset (texture, model prototype, surface material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Spatial transform: position, rotation, scale.
///
/// Axis convention: `x` lateral, `y` up, `z` along the road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Uniform scale and a rotation about the vertical axis.
    pub fn with_scale_and_yaw(mut self, scale: f32, yaw: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self.rotation = Quat::from_rotation_y(yaw);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_uniqueness() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn scale_and_yaw_applies_uniform_scale() {
        let t = Transform::from_translation(Vec3::new(1.0, 0.0, 2.0))
            .with_scale_and_yaw(0.5, std::f32::consts::FRAC_PI_2);
        assert_eq!(t.scale, Vec3::splat(0.5));
        assert_eq!(t.position, Vec3::new(1.0, 0.0, 2.0));
        let forward = t.rotation * Vec3::Z;
        assert!((forward.x - 1.0).abs() < 1e-5);
    }
}
