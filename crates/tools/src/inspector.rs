use highway_assets::PrototypeKind;
use highway_common::NodeId;
use highway_kernel::Session;
use highway_render::Scene;

/// Session inspector for developer tooling.
///
/// Read-only queries against a running session for debug overlays and the CLI.
pub struct SessionInspector;

impl SessionInspector {
    pub fn summary<S: Scene>(session: &Session<S>) -> SessionSummary {
        let window = session.window();
        SessionSummary {
            tick: session.tick(),
            speed: session.speed(),
            cruise_control: session.cruise_control(),
            bootstrapped: session.is_bootstrapped(),
            assets_resolved: session.gate().resolved(),
            assets_required: session.gate().required(),
            segments: session.segment_count(),
            decorations: window.segments().map(|s| s.decoration_count()).sum(),
            head: window.head_position(),
            tail: window.tail_position(),
            lateral: session.vehicle().lateral(),
            pending_events: session.events().len(),
        }
    }

    /// Live segments, head first.
    pub fn segments<S: Scene>(session: &Session<S>) -> Vec<SegmentInfo> {
        session
            .window()
            .segments()
            .map(|segment| {
                let count = |kind: PrototypeKind| segment.decorations().filter(|d| d.kind == kind).count();
                SegmentInfo {
                    id: segment.id(),
                    position: segment.position(),
                    trees: count(PrototypeKind::Tree),
                    rocks: count(PrototypeKind::Rock),
                    grass: count(PrototypeKind::Grass),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub tick: u64,
    pub speed: f32,
    pub cruise_control: bool,
    pub bootstrapped: bool,
    pub assets_resolved: usize,
    pub assets_required: usize,
    pub segments: usize,
    pub decorations: usize,
    pub head: Option<f32>,
    pub tail: Option<f32>,
    pub lateral: f32,
    pub pending_events: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session: tick={} speed={:.3} cruise={} assets={}/{} segments={} decorations={} lateral={:.2}",
            self.tick,
            self.speed,
            if self.cruise_control { "on" } else { "off" },
            self.assets_resolved,
            self.assets_required,
            self.segments,
            self.decorations,
            self.lateral,
        )?;
        match (self.head, self.tail) {
            (Some(head), Some(tail)) => write!(f, " span=[{head:.1}, {tail:.1}]"),
            _ if !self.bootstrapped => write!(f, " (waiting for assets)"),
            _ => Ok(()),
        }
    }
}

/// One live segment as the inspector sees it.
#[derive(Debug, Clone)]
pub struct SegmentInfo {
    pub id: NodeId,
    pub position: f32,
    pub trees: usize,
    pub rocks: usize,
    pub grass: usize,
}

impl SegmentInfo {
    pub fn decorations(&self) -> usize {
        self.trees + self.rocks + self.grass
    }
}

impl std::fmt::Display for SegmentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Segment [{}] z={:.2} trees={} rocks={} grass={}",
            self.id.short(),
            self.position,
            self.trees,
            self.rocks,
            self.grass,
        )
    }
}

/// Maps world speed to the dashboard dial.
#[derive(Debug, Clone, Copy)]
pub struct Speedometer {
    /// km/h per world unit per tick.
    pub kmh_per_unit: f32,
    /// Reading at full needle sweep.
    pub full_scale_kmh: f32,
}

impl Default for Speedometer {
    fn default() -> Self {
        Self {
            kmh_per_unit: 50.0,
            full_scale_kmh: 270.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedReading {
    pub kmh: f32,
    /// Degrees, `-90` at rest to `+90` at full scale.
    pub needle_degrees: f32,
    pub label: String,
}

impl Speedometer {
    pub fn reading(&self, speed: f32) -> SpeedReading {
        let kmh = speed * self.kmh_per_unit;
        SpeedReading {
            kmh,
            needle_degrees: -90.0 + kmh / self.full_scale_kmh * 180.0,
            label: format!("{} km/h", kmh.round() as i64),
        }
    }
}
