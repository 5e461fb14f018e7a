use std::{error::Error, fs::File};

use clap::Parser;
use log::info;
use prism_json::serde_json;
use prism_random::rand::{rngs::StdRng, SeedableRng};

mod cli;

use cli::Args;
use prism_cli::init_logger;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_logger(args.log_level.into());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scene = prism_random::random_scene(args.prisms, args.sources, &mut rng);

    serde_json::to_writer_pretty(
        File::create(&args.file)?,
        &prism_json::serialize_scene(&scene),
    )?;

    info!(
        "wrote {} prism(s) and {} source(s) to {}",
        scene.prisms.len(),
        scene.sources.len(),
        args.file
    );

    Ok(())
}
