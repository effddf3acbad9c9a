use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

/// Sender login for outbound alerts. Alerts go to the sender's own address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderCredentials {
    pub address: String,
    pub password: String,
}

/// Source of sender credentials. `None` means alerts are switched off.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Option<SenderCredentials>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAlert {
    pub title: String,
    pub price: Decimal,
    pub target_price: Decimal,
    pub url: String,
}

impl PriceAlert {
    pub fn subject(&self) -> String {
        format!("Price Alert: {}", self.title)
    }

    pub fn body(&self) -> String {
        format!("{} is now ${}\n{}", self.title, self.price.normalize(), self.url)
    }
}

/// Delivers a single alert message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, credentials: &SenderCredentials, alert: &PriceAlert) -> Result<()>;
}
