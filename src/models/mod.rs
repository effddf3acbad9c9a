pub mod price_record;
pub mod sales;

// Re-exports for convenience
pub use price_record::*;
pub use sales::*;
