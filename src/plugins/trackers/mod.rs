// Listing parser implementations
pub mod price;

pub use price::SplitPriceParser;
