use clap::Parser;
use prism_cli::LogLevel;

#[derive(Parser)]
#[command(name = "gen_rand_scene")]
#[command(about = "Write a random prism scene file")]
pub struct Args {
    /// Where to write the scene
    pub file: String,

    #[arg(long, default_value = "12", help = "Number of prisms")]
    pub prisms: usize,

    #[arg(long, default_value = "2", help = "Number of laser sources")]
    pub sources: usize,

    /// Seed of the random generator, a random one is used otherwise
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}
