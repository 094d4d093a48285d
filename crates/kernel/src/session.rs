use std::collections::VecDeque;
use std::path::Path;

use highway_assets::{AssetInbox, AssetOutcome, AssetSlot, LoadGate, PrototypeRegistry};
use highway_input::{CruiseToggle, InputSnapshot};
use highway_render::Scene;
use highway_stream::{
    ConfigError, Decoration, SegmentFactory, SegmentRecord, SegmentWindow, StreamConfig,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::speed::{SpeedModel, SpeedParams};
use crate::vehicle::{Vehicle, VehicleVariant};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid stream config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid speed params: {0}")]
    Speed(&'static str),
    #[error("event_capacity must be at least 1")]
    EventCapacity,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Everything needed to start a drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub stream: StreamConfig,
    pub speed: SpeedParams,
    pub vehicle: VehicleVariant,
    /// Scenery RNG seed.
    pub seed: u64,
    /// Resolved loads to wait for before the road is built.
    pub required_assets: usize,
    /// Most events the session log keeps; the oldest are dropped first.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            speed: SpeedParams::default(),
            vehicle: VehicleVariant::default(),
            seed: 0,
            required_assets: AssetSlot::ALL.len(),
            event_capacity: 1024,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SessionError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        self.stream.validate()?;
        if !self.speed.is_valid() {
            return Err(SessionError::Speed(
                "need 0 < min < max, initial in [min, max], non-negative gains",
            ));
        }
        if self.event_capacity < 1 {
            return Err(SessionError::EventCapacity);
        }
        Ok(())
    }
}

/// Notable things that happened during a drive.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An asset load finished; `loaded` is false when it failed.
    AssetResolved { slot: AssetSlot, loaded: bool },
    /// The gate opened and the initial window was built.
    Bootstrapped { tick: u64, segments: usize },
    SegmentCreated { tick: u64, record: SegmentRecord },
    SegmentEvicted { tick: u64, record: SegmentRecord },
    CruiseChanged { tick: u64, engaged: bool, speed: f32 },
}

/// What one `step` did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    /// Speed after this tick; also the distance the road moved.
    pub speed: f32,
    pub lateral: f32,
    pub segments: usize,
    pub created: Option<SegmentRecord>,
    pub evicted: Vec<SegmentRecord>,
}

/// One drive: the road window and everything that feeds it.
///
/// All per-frame mutation happens inside `step(&mut self)`, so the window
/// is only ever touched from one place per frame.
pub struct Session<S: Scene> {
    config: SessionConfig,
    window: SegmentWindow,
    factory: SegmentFactory,
    prototypes: PrototypeRegistry,
    gate: LoadGate,
    speed: SpeedModel,
    vehicle: Vehicle,
    cruise_toggle: CruiseToggle,
    input: InputSnapshot,
    rng: StdRng,
    scene: S,
    tick: u64,
    event_log: VecDeque<SessionEvent>,
    dropped_events: u64,
}

impl<S: Scene> Session<S> {
    /// Validate `config` and wait for assets. If no assets are required the
    /// road is built immediately.
    pub fn new(config: SessionConfig, scene: S) -> Result<Self, SessionError> {
        config.validate()?;
        let mut session = Self {
            window: SegmentWindow::new(config.stream.clone()),
            factory: SegmentFactory::new(config.stream.clone()),
            prototypes: PrototypeRegistry::new(),
            gate: LoadGate::new(config.required_assets),
            speed: SpeedModel::new(config.speed),
            vehicle: Vehicle::new(config.vehicle.clone(), config.stream.road_width),
            cruise_toggle: CruiseToggle::new(),
            input: InputSnapshot::default(),
            rng: StdRng::seed_from_u64(config.seed),
            scene,
            tick: 0,
            event_log: VecDeque::with_capacity(config.event_capacity.min(1024)),
            dropped_events: 0,
            config,
        };
        tracing::info!(
            seed = session.config.seed,
            required_assets = session.gate.required(),
            "session created"
        );
        if session.gate.try_fire() {
            session.bootstrap();
        }
        Ok(session)
    }

    /// Record one finished asset load. The call that meets the required
    /// count builds the initial window.
    pub fn on_asset_ready(&mut self, outcome: AssetOutcome) {
        let slot = outcome.slot;
        let loaded = match outcome.result {
            Ok(asset) => {
                let what = asset.describe();
                match self.prototypes.insert(slot, asset) {
                    Ok(()) => {
                        tracing::info!(%slot, asset = %what, "asset ready");
                        true
                    }
                    Err(err) => {
                        tracing::error!(%slot, error = %err, "asset rejected");
                        false
                    }
                }
            }
            Err(err) => {
                tracing::error!(%slot, error = %err, "asset load failed; slot stays empty");
                false
            }
        };
        self.record(SessionEvent::AssetResolved { slot, loaded });

        if self.gate.resolve() {
            self.bootstrap();
        } else if !self.gate.is_open() {
            tracing::debug!(remaining = self.gate.remaining(), "waiting for assets");
        }
    }

    /// Apply every outcome waiting in `inbox`. Never blocks.
    pub fn drain_inbox(&mut self, inbox: &AssetInbox) -> usize {
        let outcomes = inbox.drain();
        let count = outcomes.len();
        for outcome in outcomes {
            self.on_asset_ready(outcome);
        }
        count
    }

    fn record(&mut self, event: SessionEvent) {
        if self.event_log.len() >= self.config.event_capacity {
            self.event_log.pop_front();
            self.dropped_events += 1;
        }
        self.event_log.push_back(event);
    }

    fn bootstrap(&mut self) {
        let created = self.window.bootstrap(
            &self.factory,
            &self.prototypes,
            &mut self.rng,
            &mut self.scene,
        );
        self.record(SessionEvent::Bootstrapped {
            tick: self.tick,
            segments: created.len(),
        });
    }

    /// Advance one frame: cruise toggle, speed, steering, then the road.
    pub fn step(&mut self, input: InputSnapshot) -> StepReport {
        self.tick += 1;
        let _span = tracing::info_span!("session_step", tick = self.tick).entered();
        self.input = input;

        if self.cruise_toggle.update(input.cruise_toggle) {
            let engaged = self.speed.toggle_cruise();
            tracing::info!(engaged, speed = self.speed.speed(), "cruise control");
            self.record(SessionEvent::CruiseChanged {
                tick: self.tick,
                engaged,
                speed: self.speed.speed(),
            });
        }

        let delta = self.speed.update(&input);
        self.vehicle.steer(input.steer());

        let update = self.window.advance(
            delta,
            &self.factory,
            &self.prototypes,
            &mut self.rng,
            &mut self.scene,
        );
        for record in &update.evicted {
            self.record(SessionEvent::SegmentEvicted {
                tick: self.tick,
                record: *record,
            });
        }
        if let Some(record) = update.created {
            self.record(SessionEvent::SegmentCreated {
                tick: self.tick,
                record,
            });
        }

        StepReport {
            tick: self.tick,
            speed: delta,
            lateral: self.vehicle.lateral(),
            segments: self.window.len(),
            created: update.created,
            evicted: update.evicted,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed.speed()
    }

    pub fn segment_count(&self) -> usize {
        self.window.len()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.window.is_bootstrapped()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn window(&self) -> &SegmentWindow {
        &self.window
    }

    pub fn prototypes(&self) -> &PrototypeRegistry {
        &self.prototypes
    }

    pub fn gate(&self) -> &LoadGate {
        &self.gate
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut Vehicle {
        &mut self.vehicle
    }

    pub fn cruise_control(&self) -> bool {
        self.speed.cruise_control()
    }

    /// Input applied on the last step.
    pub fn last_input(&self) -> InputSnapshot {
        self.input
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Live decorations that take part in environment lighting.
    pub fn reactive_decorations(&self) -> impl Iterator<Item = &Decoration> {
        self.window
            .segments()
            .flat_map(|s| s.decorations())
            .filter(|d| d.reactive)
    }

    /// Read-only access to the event log, oldest first.
    pub fn events(&self) -> &VecDeque<SessionEvent> {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.event_log.drain(..).collect()
    }

    /// Events pushed out of the full log since the session started.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Deterministic hash of the road layout and vehicle state.
    /// Node ids are excluded, so two sessions with the same seed and inputs
    /// hash equal.
    pub fn layout_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.speed.speed().to_le_bytes());
        mix(&mut h, &self.vehicle.lateral().to_le_bytes());
        for segment in self.window.segments() {
            mix(&mut h, &segment.position().to_le_bytes());
            for d in segment.decorations() {
                mix(&mut h, &d.prototype.0.to_le_bytes());
                let t = &d.transform;
                for v in t.position.to_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
                for v in t.rotation.to_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
                for v in t.scale.to_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
            }
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use highway_assets::{AssetError, LoadedAsset};
    use highway_render::RetainedScene;

    fn ready_session(seed: u64) -> Session<RetainedScene> {
        let mut session = Session::new(SessionConfig::with_seed(seed), RetainedScene::new()).unwrap();
        for slot in AssetSlot::ALL {
            session.on_asset_ready(AssetOutcome::loaded(slot, LoadedAsset::placeholder(slot)));
        }
        session
    }

    #[test]
    fn invalid_config_fails_before_bootstrap() {
        let mut config = SessionConfig::default();
        config.stream.shoulder_width = 0.0;
        let err = Session::new(config, RetainedScene::new()).err().unwrap();
        assert!(matches!(err, SessionError::Config(_)));

        let mut config = SessionConfig::default();
        config.speed.max = 0.05;
        let err = Session::new(config, RetainedScene::new()).err().unwrap();
        assert!(matches!(err, SessionError::Speed(_)));
    }

    #[test]
    fn bootstrap_waits_for_the_gate() {
        let mut session = Session::new(SessionConfig::default(), RetainedScene::new()).unwrap();
        for slot in &AssetSlot::ALL[..3] {
            session.on_asset_ready(AssetOutcome::loaded(*slot, LoadedAsset::placeholder(*slot)));
            assert!(!session.is_bootstrapped());
            assert_eq!(session.segment_count(), 0);
        }
        session.on_asset_ready(AssetOutcome::loaded(
            AssetSlot::Grass,
            LoadedAsset::placeholder(AssetSlot::Grass),
        ));
        assert!(session.is_bootstrapped());
        assert_eq!(session.segment_count(), 15);
        assert_eq!(session.scene().len(), 15);
    }

    #[test]
    fn extra_ready_calls_do_not_rebootstrap() {
        let mut session = ready_session(1);
        session.on_asset_ready(AssetOutcome::loaded(
            AssetSlot::Rock,
            LoadedAsset::placeholder(AssetSlot::Rock),
        ));
        let bootstraps = session
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::Bootstrapped { .. }))
            .count();
        assert_eq!(bootstraps, 1);
        assert_eq!(session.segment_count(), 15);
    }

    #[test]
    fn failed_loads_still_open_the_gate() {
        let mut session = Session::new(SessionConfig::default(), RetainedScene::new()).unwrap();
        session.on_asset_ready(AssetOutcome::loaded(
            AssetSlot::SoilTexture,
            LoadedAsset::placeholder(AssetSlot::SoilTexture),
        ));
        for slot in [AssetSlot::Tree, AssetSlot::Rock, AssetSlot::Grass] {
            session.on_asset_ready(AssetOutcome::failed(
                slot,
                AssetError::GltfParse("truncated".into()),
            ));
        }
        assert!(session.is_bootstrapped());
        assert_eq!(session.reactive_decorations().count(), 0);
        for _ in 0..200 {
            session.step(InputSnapshot::boosted());
        }
        assert_eq!(session.segment_count(), 15);
    }

    #[test]
    fn slot_mismatch_is_a_failed_load() {
        let mut session = Session::new(SessionConfig::default(), RetainedScene::new()).unwrap();
        session.on_asset_ready(AssetOutcome::loaded(
            AssetSlot::Tree,
            LoadedAsset::placeholder(AssetSlot::SoilTexture),
        ));
        assert_eq!(
            session.events()[0],
            SessionEvent::AssetResolved {
                slot: AssetSlot::Tree,
                loaded: false
            }
        );
        assert!(!session.prototypes().is_filled(AssetSlot::Tree));
        assert_eq!(session.gate().resolved(), 1);
    }

    #[test]
    fn zero_required_assets_bootstraps_immediately() {
        let config = SessionConfig {
            required_assets: 0,
            ..SessionConfig::default()
        };
        let session = Session::new(config, RetainedScene::new()).unwrap();
        assert!(session.is_bootstrapped());
        assert_eq!(session.segment_count(), 15);
    }

    #[test]
    fn drain_inbox_feeds_the_gate() {
        let mut session = Session::new(SessionConfig::default(), RetainedScene::new()).unwrap();
        let inbox = AssetInbox::new();
        let sender = inbox.sender();
        let handle = std::thread::spawn(move || {
            for slot in AssetSlot::ALL {
                sender.send(AssetOutcome::loaded(slot, LoadedAsset::placeholder(slot)));
            }
        });
        handle.join().unwrap();
        assert_eq!(session.drain_inbox(&inbox), 4);
        assert!(session.is_bootstrapped());
        assert_eq!(session.drain_inbox(&inbox), 0);
    }

    #[test]
    fn stepping_before_bootstrap_moves_nothing() {
        let mut session = Session::new(SessionConfig::default(), RetainedScene::new()).unwrap();
        let report = session.step(InputSnapshot::forward());
        assert_eq!(report.segments, 0);
        assert!(report.created.is_none());
        assert!(report.speed > 2.0);
        assert_eq!(session.tick(), 1);
    }

    #[test]
    fn window_stays_bounded_while_driving() {
        let mut session = ready_session(3);
        let inputs = [
            InputSnapshot::boosted(),
            InputSnapshot::forward(),
            InputSnapshot::idle(),
            InputSnapshot::braking(),
        ];
        for i in 0..4000 {
            let report = session.step(inputs[(i / 500) % inputs.len()]);
            assert!(report.segments <= 15);
            let positions = session.window().positions();
            assert!(positions.windows(2).all(|p| p[0] < p[1]));
        }
        let evicted = session
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::SegmentEvicted { .. }))
            .count();
        let created = session
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::SegmentCreated { .. }))
            .count();
        assert!(evicted > 0);
        assert_eq!(evicted, created);
    }

    #[test]
    fn held_cruise_key_toggles_once() {
        let mut session = ready_session(4);
        let hold = InputSnapshot {
            cruise_toggle: true,
            ..InputSnapshot::default()
        };
        session.step(hold);
        let pinned = session.speed();
        assert!(session.cruise_control());
        for _ in 0..20 {
            session.step(hold);
        }
        assert!(session.cruise_control());
        assert_eq!(session.speed(), pinned);

        session.step(InputSnapshot::idle());
        session.step(hold);
        assert!(!session.cruise_control());
        let changes = session
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::CruiseChanged { .. }))
            .count();
        assert_eq!(changes, 2);
    }

    #[test]
    fn steering_is_clamped_to_the_road() {
        let mut session = ready_session(5);
        let left = InputSnapshot {
            left: true,
            ..InputSnapshot::default()
        };
        for _ in 0..200 {
            session.step(left);
        }
        assert_eq!(session.vehicle().lateral(), 4.0);
        assert_eq!(session.last_input(), left);
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = ready_session(42);
        let mut b = ready_session(42);
        for i in 0..600 {
            let input = if i % 3 == 0 {
                InputSnapshot::boosted()
            } else {
                InputSnapshot::idle()
            };
            a.step(input);
            b.step(input);
        }
        assert_eq!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn different_seeds_diverge() {
        let a = ready_session(1);
        let b = ready_session(2);
        assert_ne!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn event_log_stays_bounded_on_a_long_drive() {
        let config = SessionConfig {
            event_capacity: 64,
            ..SessionConfig::with_seed(8)
        };
        let mut session = Session::new(config, RetainedScene::new()).unwrap();
        for slot in AssetSlot::ALL {
            session.on_asset_ready(AssetOutcome::loaded(slot, LoadedAsset::placeholder(slot)));
        }
        for _ in 0..100_000 {
            session.step(InputSnapshot::boosted());
            assert!(session.events().len() <= 64);
        }
        assert_eq!(session.events().len(), 64);
        assert!(session.dropped_events() > 0);
        assert_eq!(session.segment_count(), 15);
        // The newest event survives; the oldest were dropped.
        assert!(!matches!(
            session.events().front(),
            Some(SessionEvent::AssetResolved { .. })
        ));
    }

    #[test]
    fn zero_event_capacity_is_rejected() {
        let config = SessionConfig {
            event_capacity: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config, RetainedScene::new()),
            Err(SessionError::EventCapacity)
        ));
    }

    #[test]
    fn drain_events_clears_log() {
        let mut session = ready_session(6);
        let events = session.drain_events();
        assert_eq!(events.len(), 5); // four assets + bootstrap
        assert!(session.events().is_empty());
    }

    #[test]
    fn session_config_from_yaml() {
        let yaml = "seed: 9\nspeed:\n  initial: 3.0\nstream:\n  visible_segments: 10\n";
        let config = SessionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.speed.initial, 3.0);
        assert_eq!(config.speed.max, 5.0);
        assert_eq!(config.stream.visible_segments, 10);
        assert_eq!(config.required_assets, 4);

        let inf = "stream:\n  scenery:\n    rock_scale_max: .inf\n    tree_probability: 0.0\n    rock_probability: 1.0\n";
        assert!(matches!(
            SessionConfig::from_yaml_str(inf),
            Err(SessionError::Config(_))
        ));

        let bad = "speed:\n  initial: 9.0\n";
        assert!(matches!(
            SessionConfig::from_yaml_str(bad),
            Err(SessionError::Speed(_))
        ));
    }
}
