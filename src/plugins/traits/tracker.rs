use crate::models::Listing;
use crate::utils::error::Result;

/// Turns a product page into a [`Listing`].
///
/// A missing title is an error; a missing or malformed price is not, and
/// comes back as `Listing { price: None, .. }`.
pub trait ListingParser: Send + Sync {
    fn name(&self) -> &str;
    fn parse(&self, html: &str) -> Result<Listing>;
}
