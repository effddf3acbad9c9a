pub mod tracker;
pub mod notifier;

pub use tracker::ListingParser;
pub use notifier::{CredentialProvider, Mailer, PriceAlert, SenderCredentials};
