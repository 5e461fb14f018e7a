use clap::{Parser, ValueEnum};
use prism::{Float, TieBreak, TraceConfig};
use prism_cli::LogLevel;

#[derive(Debug, Clone, ValueEnum)]
pub enum TieBreakArg {
    InputOrder,
    LowestId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::LowestId => TieBreak::LowestId,
        }
    }
}

/// Everything but the file path overrides what the scene file says.
#[derive(Parser)]
#[command(name = "run_scene_json")]
#[command(about = "Trace every laser of a saved prism scene and print the results as JSON")]
pub struct Args {
    /// Scene file to trace
    pub file: String,

    /// Write the results here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Follow only the dominant ray of each source, ignoring prism types
    #[arg(long)]
    pub single: bool,

    #[arg(long, help = "Half-width of the hit cone, in degrees")]
    pub angle_tolerance: Option<Float>,

    #[arg(long, help = "Iteration budget")]
    pub max_iterations: Option<usize>,

    #[arg(long, help = "Fraction of intensity lost per unit of distance")]
    pub attenuation_factor: Option<Float>,

    #[arg(long, help = "Rays dimmer than this are dropped")]
    pub attenuation_threshold: Option<Float>,

    #[arg(long, help = "Which prism wins when two are equally close")]
    pub tie_break: Option<TieBreakArg>,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}

impl Args {
    /// `config`, with the values given on the command line.
    pub fn apply_overrides(&self, mut config: TraceConfig) -> TraceConfig {
        if let Some(tolerance) = self.angle_tolerance {
            config.angle_tolerance = tolerance;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if let Some(factor) = self.attenuation_factor {
            config.attenuation_factor = factor;
        }
        if let Some(threshold) = self.attenuation_threshold {
            config.attenuation_threshold = threshold;
        }
        if let Some(tie_break) = self.tie_break.clone() {
            config.tie_break = tie_break.into();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_what_was_given() {
        let args = Args::parse_from([
            "run_scene_json",
            "scene.json",
            "--max-iterations",
            "20",
            "--tie-break",
            "lowest-id",
        ]);
        let config = args.apply_overrides(TraceConfig::new().angle_tolerance(0.5));

        assert_eq!(
            config,
            TraceConfig::new()
                .angle_tolerance(0.5)
                .max_iterations(20)
                .tie_break(TieBreak::LowestId)
        );
        assert!(!args.single);
        assert!(args.output.is_none());
    }
}
