pub mod cli;
pub mod dry_run;
pub mod load_config;
pub mod s3;

pub use cli::{run, Cli, Commands};
