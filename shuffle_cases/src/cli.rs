use clap::Parser;
use prism_cli::LogLevel;

#[derive(Parser)]
#[command(name = "shuffle_cases")]
#[command(about = "Shuffle prism order and ids in a canonical test case file")]
pub struct Args {
    #[arg(default_value = "canonical-data.json")]
    pub input: String,

    #[arg(default_value = "shuffled-canonical-data.json")]
    pub output: String,

    /// Seed of the random generator, a random one is used otherwise
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}
