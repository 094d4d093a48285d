use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use highway_assets::{AssetInbox, AssetManifest, AssetOutcome, AssetSlot, LoadedAsset};
use highway_input::InputSnapshot;
use highway_kernel::{Session, SessionConfig, SessionEvent, VehicleVariant};
use highway_render::{DebugTextRenderer, RenderView, Renderer, RetainedScene};
use highway_tools::{SessionInspector, Speedometer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "highway-cli", about = "Headless driver for the endless road")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive for a number of ticks with a fixed throttle
    Drive {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Scenery RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Pedal held for the whole drive
        #[arg(long, value_enum, default_value_t = Throttle::Forward)]
        throttle: Throttle,
        /// Car body
        #[arg(long, value_enum, default_value_t = Body::Tomahawk)]
        body: Body,
        /// Session config (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Asset manifest (JSON); placeholders are used when absent
        #[arg(short, long)]
        assets: Option<PathBuf>,
        /// Print the scene at the end
        #[arg(long)]
        dump: bool,
    },
    /// Drive two sessions with the same seed and compare their layouts
    Replay {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "1000")]
        ticks: u64,
        /// RNG seed for deterministic replay
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Check a session config file
    Validate {
        /// Session config (YAML)
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Throttle {
    Coast,
    Forward,
    Boost,
    Brake,
}

impl Throttle {
    fn snapshot(self) -> InputSnapshot {
        match self {
            Throttle::Coast => InputSnapshot::idle(),
            Throttle::Forward => InputSnapshot::forward(),
            Throttle::Boost => InputSnapshot::boosted(),
            Throttle::Brake => InputSnapshot::braking(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Body {
    Tomahawk,
    Apollo,
}

impl Body {
    fn variant(self) -> VehicleVariant {
        match self {
            Body::Tomahawk => VehicleVariant::tomahawk(),
            Body::Apollo => VehicleVariant::apollo(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("highway-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", highway_kernel::crate_info());
            println!("stream: {}", highway_stream::crate_info());
            println!("assets: {}", highway_assets::crate_info());
            println!("render: {}", highway_render::crate_info());
            println!("input: {}", highway_input::crate_info());
            println!("tools: {}", highway_tools::crate_info());
            let config = SessionConfig::default();
            println!(
                "defaults: tile={} spacing={} visible={} cutoff={} threshold={}",
                config.stream.tile_length,
                config.stream.spacing(),
                config.stream.visible_segments,
                config.stream.eviction_cutoff(),
                config.stream.extension_threshold(),
            );
        }
        Commands::Drive {
            ticks,
            seed,
            throttle,
            body,
            config,
            assets,
            dump,
        } => {
            let mut config = match config {
                Some(path) => SessionConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SessionConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.vehicle = body.variant();

            let inbox = AssetInbox::new();
            let loader = match assets {
                Some(path) => {
                    let manifest = AssetManifest::load(&path)
                        .with_context(|| format!("loading manifest {}", path.display()))?;
                    config.required_assets = manifest.required();
                    let sender = inbox.sender();
                    Some(std::thread::spawn(move || {
                        for outcome in manifest.load_all() {
                            if !sender.send(outcome) {
                                break;
                            }
                        }
                    }))
                }
                None => {
                    let sender = inbox.sender();
                    for slot in AssetSlot::ALL {
                        sender.send(AssetOutcome::loaded(slot, LoadedAsset::placeholder(slot)));
                    }
                    None
                }
            };

            let mut session = Session::new(config, RetainedScene::new())?;
            let input = throttle.snapshot();
            let meter = Speedometer::default();
            println!("Driving: seed={}, ticks={ticks}", session.config().seed);

            let (mut created, mut evicted) = (0u64, 0u64);
            for _ in 0..ticks {
                session.drain_inbox(&inbox);
                let report = session.step(input);
                for event in session.drain_events() {
                    match event {
                        SessionEvent::SegmentCreated { .. } => created += 1,
                        SessionEvent::SegmentEvicted { .. } => evicted += 1,
                        other => tracing::debug!(?other, "session event"),
                    }
                }
                if report.tick % 100 == 0 {
                    println!(
                        "  tick {:>6}: {} segments={}",
                        report.tick,
                        meter.reading(report.speed).label,
                        report.segments
                    );
                }
            }

            if let Some(handle) = loader {
                if handle.join().is_err() {
                    tracing::error!("asset loader thread panicked");
                }
                session.drain_inbox(&inbox);
            }

            println!("{}", SessionInspector::summary(&session));
            println!("segments created={created} evicted={evicted}");
            println!("layout hash: {:#018x}", session.layout_hash());
            if dump {
                let renderer = DebugTextRenderer::new();
                print!("{}", renderer.render(session.scene(), &RenderView::default()));
                for info in SessionInspector::segments(&session) {
                    println!("{info}");
                }
            }
        }
        Commands::Replay { ticks, seed } => {
            println!("Deterministic replay: seed={seed}, ticks={ticks}");
            let script = [
                InputSnapshot::boosted(),
                InputSnapshot::forward(),
                InputSnapshot::idle(),
                InputSnapshot::braking(),
            ];

            let mut hashes = Vec::with_capacity(2);
            for run in 1..=2 {
                let mut session = Session::new(SessionConfig::with_seed(seed), RetainedScene::new())?;
                for slot in AssetSlot::ALL {
                    session.on_asset_ready(AssetOutcome::loaded(slot, LoadedAsset::placeholder(slot)));
                }
                for t in 0..ticks {
                    session.step(script[(t / 50) as usize % script.len()]);
                }
                let hash = session.layout_hash();
                println!(
                    "Run {run}: tick={}, segments={}, speed={:.3}, hash={hash:#018x}",
                    session.tick(),
                    session.segment_count(),
                    session.speed()
                );
                hashes.push(hash);
            }
            println!(
                "Match: {}",
                if hashes[0] == hashes[1] { "OK" } else { "MISMATCH" }
            );
        }
        Commands::Validate { config } => {
            let loaded = SessionConfig::load(&config)
                .with_context(|| format!("validating {}", config.display()))?;
            let stream = &loaded.stream;
            println!("{}: OK", config.display());
            println!(
                "  spacing={} visible={} span={} cutoff={} threshold={}",
                stream.spacing(),
                stream.visible_segments,
                stream.visible_span(),
                stream.eviction_cutoff(),
                stream.extension_threshold(),
            );
            println!(
                "  speed=[{}, {}] initial={} seed={} required_assets={}",
                loaded.speed.min,
                loaded.speed.max,
                loaded.speed.initial,
                loaded.seed,
                loaded.required_assets,
            );
        }
    }

    Ok(())
}
