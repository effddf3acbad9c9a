pub mod config;
pub mod history;
pub mod models;
pub mod plugins;
pub mod price_check;
pub mod price_log;
pub mod report;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
