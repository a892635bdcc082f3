pub mod ai;
pub mod config;
pub mod error;
pub mod paper;

pub use ai::{LlmSummarizer, SummaryOutcome};
pub use config::{Config, LlmConfig, StorageConfig};
pub use error::{Error, Result};
pub use paper::{Paper, PaperWithSummary};
