pub mod config;
pub mod error;
pub mod parse;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use types::{GroupKey, Metrics, RawRow};
