pub mod config;
pub mod error;
pub mod file_config;
pub mod types;

pub use config::{AppConfig, ProviderCredentials};
pub use error::HarvestError;
pub use file_config::{load_config, FileConfig, FlowConfig, SearchConfig};
pub use types::{extract_host, OutputRow, RowShape, SearchHit};
