//! Command line plumbing shared by the prism binaries.

mod cli;
mod logger;

pub use cli::*;
pub use logger::*;
