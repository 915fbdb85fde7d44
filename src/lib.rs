pub mod config;
pub mod diagnostics;
pub mod error;
pub mod league;
pub mod logging;
pub mod results;
pub mod scheduler;
pub mod snapshot;

pub use error::{LeagueError, Result};
