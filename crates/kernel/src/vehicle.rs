use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Where a spotlight sits on the body and where it points, both relative to
/// the vehicle origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightMount {
    pub offset: Vec3,
    pub target: Vec3,
}

impl LightMount {
    pub const fn new(offset: Vec3, target: Vec3) -> Self {
        Self { offset, target }
    }

    /// The same mount reflected onto the other side of the body.
    pub fn mirrored(self) -> Self {
        Self {
            offset: self.offset * Vec3::new(-1.0, 1.0, 1.0),
            target: self.target * Vec3::new(-1.0, 1.0, 1.0),
        }
    }
}

/// Light layout of one body. Paired lights are given for the left (`+x`)
/// side and mirrored for the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub indicator: LightMount,
    pub headlight: LightMount,
    pub taillight: LightMount,
    /// Centre brake light; not every body has one.
    pub taillight_middle: Option<LightMount>,
    pub interior: LightMount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Indicator,
    Headlight,
    Taillight,
    TaillightMiddle,
    Interior,
}

/// A light resolved to world space for the current vehicle position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPlacement {
    pub kind: LightKind,
    pub position: Vec3,
    pub target: Vec3,
    pub visible: bool,
}

/// A selectable car body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleVariant {
    pub name: String,
    pub ride_height: f32,
    pub lights: LightRig,
}

impl VehicleVariant {
    fn with_taillights(name: &str, taillight_height: f32, middle: bool) -> Self {
        Self {
            name: name.to_string(),
            ride_height: 0.2,
            lights: LightRig {
                indicator: LightMount::new(
                    Vec3::new(0.855, 0.545, 2.25),
                    Vec3::new(0.85, 0.625, 2.15),
                ),
                headlight: LightMount::new(Vec3::new(0.75, 1.0, 1.55), Vec3::new(0.85, 0.25, 25.0)),
                taillight: LightMount::new(
                    Vec3::new(0.85, taillight_height, -2.275),
                    Vec3::new(0.75, taillight_height, -2.3),
                ),
                taillight_middle: middle.then(|| {
                    LightMount::new(Vec3::new(0.0, 0.725, -2.275), Vec3::new(0.0, 0.725, -2.3))
                }),
                interior: LightMount::new(Vec3::new(0.0, 0.725, 0.5), Vec3::new(0.0, 0.715, 0.0)),
            },
        }
    }

    /// Muscle-car body with a centre brake light.
    pub fn tomahawk() -> Self {
        Self::with_taillights("tomahawk", 0.7, true)
    }

    /// Low supercar body, no centre brake light.
    pub fn apollo() -> Self {
        Self::with_taillights("apollo", 0.6, false)
    }
}

impl Default for VehicleVariant {
    fn default() -> Self {
        Self::tomahawk()
    }
}

/// The player's car. Its `z` is pinned at the origin; the road moves instead.
#[derive(Debug, Clone)]
pub struct Vehicle {
    position: Vec3,
    variant: VehicleVariant,
    lights_on: bool,
    lateral_speed: f32,
    lateral_limit: f32,
}

impl Vehicle {
    /// `road_width` bounds steering to one unit inside each road edge.
    pub fn new(variant: VehicleVariant, road_width: f32) -> Self {
        Self {
            position: Vec3::new(0.0, variant.ride_height, 0.0),
            variant,
            lights_on: true,
            lateral_speed: 0.1,
            lateral_limit: (road_width / 2.0 - 1.0).max(0.0),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn lateral(&self) -> f32 {
        self.position.x
    }

    pub fn lateral_limit(&self) -> f32 {
        self.lateral_limit
    }

    pub fn variant(&self) -> &VehicleVariant {
        &self.variant
    }

    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    /// Slide by one lateral step in the direction of `steer` (`+1` left,
    /// `-1` right), clamped to the road.
    pub fn steer(&mut self, steer: f32) {
        if steer == 0.0 {
            return;
        }
        let x = self.position.x + steer.signum() * self.lateral_speed;
        self.position.x = x.clamp(-self.lateral_limit, self.lateral_limit);
    }

    pub fn toggle_lights(&mut self) -> bool {
        self.lights_on = !self.lights_on;
        self.lights_on
    }

    /// Swap the body, keeping lateral position and light state.
    pub fn switch_variant(&mut self, variant: VehicleVariant) {
        tracing::info!(from = %self.variant.name, to = %variant.name, "switching vehicle");
        self.position.y = variant.ride_height;
        self.variant = variant;
    }

    /// Every light the current body carries, in world space.
    pub fn light_placements(&self) -> Vec<LightPlacement> {
        let rig = &self.variant.lights;
        let mut mounts = vec![
            (LightKind::Indicator, rig.indicator),
            (LightKind::Indicator, rig.indicator.mirrored()),
            (LightKind::Headlight, rig.headlight),
            (LightKind::Headlight, rig.headlight.mirrored()),
            (LightKind::Taillight, rig.taillight),
            (LightKind::Taillight, rig.taillight.mirrored()),
        ];
        if let Some(middle) = rig.taillight_middle {
            mounts.push((LightKind::TaillightMiddle, middle));
        }
        mounts.push((LightKind::Interior, rig.interior));

        mounts
            .into_iter()
            .map(|(kind, mount)| LightPlacement {
                kind,
                position: self.position + mount.offset,
                target: self.position + mount.target,
                visible: self.lights_on,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_sits_at_origin_on_ride_height() {
        let v = Vehicle::new(VehicleVariant::tomahawk(), 10.0);
        assert_eq!(v.position(), Vec3::new(0.0, 0.2, 0.0));
        assert_eq!(v.lateral_limit(), 4.0);
        assert!(v.lights_on());
    }

    #[test]
    fn steering_moves_one_step_and_clamps() {
        let mut v = Vehicle::new(VehicleVariant::default(), 10.0);
        v.steer(1.0);
        assert!((v.lateral() - 0.1).abs() < 1e-6);
        v.steer(-1.0);
        v.steer(-1.0);
        assert!((v.lateral() + 0.1).abs() < 1e-6);
        v.steer(0.0);
        assert!((v.lateral() + 0.1).abs() < 1e-6);

        for _ in 0..1000 {
            v.steer(1.0);
        }
        assert_eq!(v.lateral(), 4.0);
        for _ in 0..1000 {
            v.steer(-1.0);
        }
        assert_eq!(v.lateral(), -4.0);
        assert_eq!(v.position().z, 0.0);
    }

    #[test]
    fn middle_taillight_depends_on_variant() {
        let tomahawk = Vehicle::new(VehicleVariant::tomahawk(), 10.0);
        let apollo = Vehicle::new(VehicleVariant::apollo(), 10.0);
        let count = |v: &Vehicle| {
            v.light_placements()
                .iter()
                .filter(|l| l.kind == LightKind::TaillightMiddle)
                .count()
        };
        assert_eq!(count(&tomahawk), 1);
        assert_eq!(count(&apollo), 0);
        assert_eq!(tomahawk.light_placements().len(), 8);
        assert_eq!(apollo.light_placements().len(), 7);
    }

    #[test]
    fn paired_lights_are_mirrored() {
        let v = Vehicle::new(VehicleVariant::tomahawk(), 10.0);
        let heads: Vec<_> = v
            .light_placements()
            .into_iter()
            .filter(|l| l.kind == LightKind::Headlight)
            .collect();
        assert_eq!(heads.len(), 2);
        assert_eq!(heads[0].position.x, -heads[1].position.x);
        assert_eq!(heads[0].target.z, 25.0);
    }

    #[test]
    fn lights_follow_the_car() {
        let mut v = Vehicle::new(VehicleVariant::apollo(), 10.0);
        for _ in 0..10 {
            v.steer(1.0);
        }
        let interior = v
            .light_placements()
            .into_iter()
            .find(|l| l.kind == LightKind::Interior)
            .unwrap();
        assert!((interior.position.x - v.lateral()).abs() < 1e-6);
        assert!((interior.position.y - (0.2 + 0.725)).abs() < 1e-6);
    }

    #[test]
    fn toggle_hides_every_light() {
        let mut v = Vehicle::new(VehicleVariant::tomahawk(), 10.0);
        assert!(!v.toggle_lights());
        assert!(v.light_placements().iter().all(|l| !l.visible));
        assert!(v.toggle_lights());
        assert!(v.light_placements().iter().all(|l| l.visible));
    }

    #[test]
    fn switch_variant_keeps_lateral_and_lights() {
        let mut v = Vehicle::new(VehicleVariant::tomahawk(), 10.0);
        v.steer(-1.0);
        v.toggle_lights();
        v.switch_variant(VehicleVariant::apollo());
        assert_eq!(v.variant().name, "apollo");
        assert!((v.lateral() + 0.1).abs() < 1e-6);
        assert!(!v.lights_on());
    }
}
