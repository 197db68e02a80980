pub mod cli;
pub mod load_config;
pub mod runner;

pub use cli::{run, Cli, Commands};
