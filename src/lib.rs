pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{AppConfig, AuthConfig, Cli};
pub use core::pipeline::{PublishTarget, RunOutcome, TrendPipeline};
pub use core::retry::RetryPolicy;
pub use utils::error::{Result, TrendError};
