use std::{error::Error, fs::File, io};

use clap::Parser;
use log::{info, warn};
use prism::{PathResult, Scene};
use prism_json::{deserialize_scene, serde_json, serialize_results};

mod cli;

use cli::Args;
use prism_cli::init_logger;

fn log_summary(results: &[PathResult]) {
    for result in results {
        if let Some(error) = result.error {
            warn!("laser {}: {error}", result.source);
        }
        info!(
            "laser {}: {} hit(s), {} segment(s){}",
            result.source,
            result.sequence.len(),
            result.segments.len(),
            if result.is_looped() { ", looped" } else { "" },
        );
    }
}

fn run_scene(scene: &Scene, single: bool) -> Result<serde_json::Value, Box<dyn Error>> {
    Ok(if single {
        let paths = scene.trace_each()?;
        for path in &paths {
            info!(
                "laser {}: {:?} after {} hit(s)",
                path.source,
                path.termination(),
                path.sequence.len()
            );
        }
        serialize_results(&scene.config, &paths)
    } else {
        let results = scene.trace_all()?;
        log_summary(&results);
        serialize_results(&scene.config, &results)
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_logger(args.log_level.into());

    let mut scene = deserialize_scene(&serde_json::from_reader(File::open(&args.file)?)?)?;
    scene.config = args.apply_overrides(scene.config);

    info!(
        "{}: {} prism(s), {} laser(s)",
        args.file,
        scene.prisms.len(),
        scene.sources.len()
    );

    let json = run_scene(&scene, args.single)?;

    match &args.output {
        Some(path) => serde_json::to_writer_pretty(File::create(path)?, &json)?,
        None => serde_json::to_writer_pretty(io::stdout().lock(), &json)?,
    }

    Ok(())
}
