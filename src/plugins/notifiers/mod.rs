// Notifier implementations
pub mod email;

pub use email::{EnvCredentials, NotifyOutcome, PriceAlertNotifier, SmtpMailer, StaticCredentials};
