pub mod app;
pub mod cli;
pub mod input;
pub mod logging;
pub mod report;

pub use cli::Cli;
