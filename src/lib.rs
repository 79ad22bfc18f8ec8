pub mod analysis;
pub mod config;
pub mod error;
pub mod results;
pub mod shell_exec;
pub mod styling;
pub mod trace;
pub mod utils;

// Re-export the types most callers start from
pub use analysis::{Analysis, analyze};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
