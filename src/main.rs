//! # Delve Main Entry Point
//!
//! Generates dungeons from the command line and prints their layouts.

use clap::Parser;
use delve::generation::utils;
use delve::{
    default_catalog, distribute_treasure, Charset, DelveResult, Dungeon, DungeonGenerator, DungeonStats,
    GenerationConfig, Generator, TextRenderer, TreasureInstance,
};
use log::{error, info};
use serde::Serialize;

/// Command line arguments for the Delve generator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon layouts with treasure distribution")]
#[command(version)]
struct Args {
    /// Number of dungeons to generate
    #[arg(default_value_t = 1)]
    count: u32,

    /// Random seed; each further dungeon continues the same stream
    #[arg(short, long)]
    seed: Option<u64>,

    /// Draw walls with box-drawing characters
    #[arg(short, long)]
    unicode: bool,

    /// List the doors of every room
    #[arg(short, long)]
    connections: bool,

    /// Distribute the default treasure catalog
    #[arg(short, long)]
    treasure: bool,

    /// Print dungeons as JSON instead of maps
    #[arg(long)]
    json: bool,

    /// Give up after this many failed attempts per dungeon
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct Report<'a> {
    dungeon: &'a Dungeon,
    stats: DungeonStats,
    treasure: &'a [TreasureInstance],
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("Generation Failed: {}", e);
        std::process::exit(1);
    }
}

/// Initializes logging; `RUST_LOG` overrides the command line level.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> DelveResult<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut config = GenerationConfig::new(seed);
    config.max_attempts = args.max_attempts;
    config.validate()?;

    info!("Delve v{} seed {}", delve::VERSION, seed);

    let generator = DungeonGenerator::new();
    let renderer = TextRenderer::new(if args.unicode { Charset::Unicode } else { Charset::Ascii });
    let catalog = default_catalog();
    let mut rng = utils::create_rng(&config);

    for n in 0..args.count {
        let dungeon = generator.generate(&config, &mut rng)?;
        generator.validate(&dungeon, &config)?;

        let treasure = if args.treasure {
            distribute_treasure(&catalog, &dungeon.rooms, &config, &mut rng)?
        } else {
            Vec::new()
        };

        if args.json {
            let report = Report {
                dungeon: &dungeon,
                stats: DungeonStats::of(&dungeon),
                treasure: &treasure,
            };
            println!("{}", serde_json::to_string(&report)?);
            continue;
        }

        if n > 0 {
            println!();
        }
        print!("{}", renderer.render_map(&dungeon));
        println!("{}", DungeonStats::of(&dungeon));
        if args.connections {
            print!("{}", renderer.render_connections(&dungeon));
        }
        if args.treasure {
            println!("Total treasures: {}", treasure.len());
            print!("{}", renderer.render_treasure(&dungeon, &catalog, &treasure));
        }
    }
    Ok(())
}
