mod config;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loam_io::JsonDirStore;
use loam_physics::{MoveInput, MoveMode};
use loam_runtime::{HeadlessBackend, WorldSession};
use loam_world::World;

use crate::config::{LoamConfig, load_config_from_path};

const FOG_RGB: [f32; 3] = [0.62, 0.72, 0.85];

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the loam voxel world", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// World seed name
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Directory holding the per-seed edit tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream and simulate a session with a scripted walk
    Run {
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// View radius in chunks (clamped to the configured bounds)
        #[arg(long)]
        radius: Option<i32>,
        /// Start in walk mode instead of flying
        #[arg(long)]
        walk: bool,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
    },
    /// Write the seed's edit table to a JSON file
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Replace the seed's edit table with a JSON file
    Import {
        #[arg(long)]
        from: PathBuf,
    },
    /// Delete every edit of the seed
    Clear,
}

fn open_session(cfg: &LoamConfig) -> Result<WorldSession<HeadlessBackend>, Box<dyn Error>> {
    let world = World::with_config(&cfg.seed, cfg.worldgen.clone())?;
    let store = JsonDirStore::new(&cfg.data_dir).with_world_height(world.world_height());
    Ok(WorldSession::new(
        world,
        cfg.stream.clone(),
        cfg.walker.clone(),
        Box::new(store),
        HeadlessBackend::new(),
    ))
}

/// Walks forward while slowly turning, jumping now and then, and edits the
/// terrain in front of the camera halfway through.
fn run(
    session: &mut WorldSession<HeadlessBackend>,
    cfg: &LoamConfig,
    frames: u32,
    dt: f32,
) -> Result<(), Box<dyn Error>> {
    for frame in 0..frames {
        let walking = session.walker().mode == MoveMode::Walk;
        let input = MoveInput {
            forward: 1.0,
            jump: walking && frame % 90 == 45,
            ..MoveInput::default()
        };
        session.walker_mut().yaw += 0.25 * dt;
        session.tick(dt, &input);

        if frame == frames / 2 {
            if let Some(v) = session.pick() {
                log::info!("picked {}", v.name());
            }
            if session.place_selected() {
                session.undo();
                session.redo();
            }
        }
        if frame % 120 == 0 {
            let st = session.stats();
            log::info!(
                "frame {frame}: {} resident, {} queued, {} buffers",
                st.resident_chunks,
                st.queued,
                st.live_buffers
            );
        }
    }
    session.flush_save()?;

    let st = session.stats();
    let w = session.walker();
    println!("seed        {}", session.world().seed_name());
    println!("frames      {} ({} ticks)", frames, st.tick);
    println!(
        "walker      {:.2}, {:.2}, {:.2} ({:?}, grounded {})",
        w.pos.x, w.pos.y, w.pos.z, w.mode, w.on_ground
    );
    println!(
        "chunks      {} resident, {} queued, {} built, {} evicted",
        st.resident_chunks, st.queued, st.chunks_built, st.chunks_evicted
    );
    println!(
        "buffers     {} live ({} uploads, {} deletes)",
        session.backend().live_buffers(),
        session.backend().uploads,
        session.backend().deletes
    );
    println!(
        "edits       {} in {} chunks (undo {}, redo {})",
        st.edits, st.edited_chunks, st.undo_depth, st.redo_depth
    );
    if cfg.horizon.enabled {
        let ring = session.horizon(&cfg.horizon, FOG_RGB);
        println!("horizon     {} vertices", ring.vertex_count());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => LoamConfig::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    let mut session = open_session(&cfg)?;

    match cli.command {
        Command::Run {
            frames,
            radius,
            walk,
            dt,
        } => {
            if let Some(r) = radius {
                session.set_view_radius(r);
            }
            if walk {
                session.toggle_walk();
            }
            run(&mut session, &cfg, frames, dt)?;
        }
        Command::Export { out } => {
            fs::write(&out, session.export()?)?;
            println!(
                "exported {} edits of {:?} to {}",
                session.edits().len(),
                cfg.seed,
                out.display()
            );
        }
        Command::Import { from } => {
            let json = fs::read_to_string(&from)?;
            let report = session.import(&json)?;
            session.flush_save()?;
            println!(
                "imported {} edits into {:?} ({} discarded)",
                report.entries.len(),
                cfg.seed,
                report.discarded
            );
        }
        Command::Clear => {
            let n = session.edits().len();
            session.clear_edits()?;
            println!("cleared {n} edits of {:?}", cfg.seed);
        }
    }
    Ok(())
}
