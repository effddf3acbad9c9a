use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Title and price as read off a product page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub title: String,
    /// `None` when the price elements were missing or malformed.
    pub price: Option<Decimal>,
}

/// One observation of a tracked product, as stored in the price log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    pub title: String,
    pub price: Option<Decimal>,
    pub date: NaiveDate,
    pub url: String,
}

impl PriceRecord {
    pub fn new(listing: Listing, date: NaiveDate, url: impl Into<String>) -> Self {
        Self {
            title: listing.title,
            price: listing.price,
            date,
            url: url.into(),
        }
    }

    /// Price as written to the log; blank when extraction failed.
    pub fn formatted_price(&self) -> String {
        self.price.map(|p| p.normalize().to_string()).unwrap_or_default()
    }
}
